use chrono::{Datelike, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Indian fiscal year (runs 1 April to 31 March)
/// The year value represents the end year (e.g., 2025 = FY 2024-25, AY 2025-26)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub struct FiscalYear(pub i32);

impl FiscalYear {
    /// Fiscal year containing a date
    pub fn from_date(date: NaiveDate) -> Self {
        if date.month() >= 4 {
            FiscalYear(date.year() + 1)
        } else {
            FiscalYear(date.year())
        }
    }

    /// Start date of the fiscal year (1 April of the previous calendar year)
    pub fn start_date(&self) -> NaiveDate {
        self.date(4, 1)
    }

    /// End date of the fiscal year (31 March)
    pub fn end_date(&self) -> NaiveDate {
        self.date(3, 31)
    }

    /// Calendar date inside this fiscal year for a month and day.
    /// April to December fall in the first calendar year, January to March in the second.
    pub fn date(&self, month: u32, day: u32) -> NaiveDate {
        let year = if month >= 4 { self.0 - 1 } else { self.0 };
        // Only years outside chrono's range fail here.
        NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        FiscalYear::from_date(date) == *self
    }

    /// Display as "2024-25"
    pub fn display(&self) -> String {
        format!("{}-{:02}", self.0 - 1, self.0.rem_euclid(100))
    }

    /// Assessment year label, "2025-26" for FY 2024-25
    pub fn assessment_year(&self) -> String {
        format!("{}-{:02}", self.0, (self.0 + 1).rem_euclid(100))
    }
}

impl std::fmt::Display for FiscalYear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FY {}", self.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn fiscal_year_from_date_before_april() {
        // 31 March 2024 is in FY 2023-24
        assert_eq!(FiscalYear::from_date(ymd(2024, 3, 31)), FiscalYear(2024));
    }

    #[test]
    fn fiscal_year_from_date_on_april_1() {
        // 1 April 2024 starts FY 2024-25
        assert_eq!(FiscalYear::from_date(ymd(2024, 4, 1)), FiscalYear(2025));
    }

    #[test]
    fn fiscal_year_from_date_december() {
        assert_eq!(FiscalYear::from_date(ymd(2024, 12, 31)), FiscalYear(2025));
    }

    #[test]
    fn fiscal_year_start_end_dates() {
        let fy = FiscalYear(2025);
        assert_eq!(fy.start_date(), ymd(2024, 4, 1));
        assert_eq!(fy.end_date(), ymd(2025, 3, 31));
        assert!(fy.contains(ymd(2024, 9, 15)));
        assert!(!fy.contains(ymd(2025, 4, 1)));
    }

    #[test]
    fn fiscal_year_dates_split_across_calendar_years() {
        let fy = FiscalYear(2025);
        assert_eq!(fy.date(6, 15), ymd(2024, 6, 15));
        assert_eq!(fy.date(3, 15), ymd(2025, 3, 15));
    }

    #[test]
    fn fiscal_year_display() {
        assert_eq!(FiscalYear(2025).display(), "2024-25");
        assert_eq!(FiscalYear(2000).display(), "1999-00");
        assert_eq!(FiscalYear(2025).assessment_year(), "2025-26");
        assert_eq!(FiscalYear(2026).to_string(), "FY 2025-26");
    }
}
