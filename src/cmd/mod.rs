pub mod credit;
pub mod debt;
pub mod gains;
pub mod schema;
pub mod tax;

use anyhow::Context;
use fincalc::core::{round_to_paise, Money, Warning};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

/// Read a whole input file (or stdin with "-")
pub fn read_input(path: &Path) -> anyhow::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    if path.as_os_str() == "-" {
        let stdin = io::stdin();
        BufReader::new(stdin.lock()).read_to_end(&mut buffer)?;
        if buffer.is_empty() {
            anyhow::bail!("No input received. Provide a file or pipe data to stdin.");
        }
    } else {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        BufReader::new(file).read_to_end(&mut buffer)?;
    }
    Ok(buffer)
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let buffer = read_input(path)?;
    serde_json::from_slice(&buffer).with_context(|| format!("parsing {}", path.display()))
}

/// Optional rule table override, else the built-in one
pub fn read_rules<T: DeserializeOwned>(path: Option<&Path>, default: T) -> anyhow::Result<T> {
    match path {
        Some(path) => read_json(path),
        None => Ok(default),
    }
}

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_table<T: Tabled>(rows: Vec<T>) {
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub fn print_warnings(warnings: &[Warning]) {
    if warnings.is_empty() {
        return;
    }
    println!();
    println!("WARNINGS");
    for warning in warnings {
        println!("  - {warning}");
    }
}

/// Rupee amount with Indian digit grouping: `₹12,34,567.50`
pub fn format_inr(amount: Money) -> String {
    let rounded = round_to_paise(amount);
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::new();
    let head_len = digits.len().saturating_sub(3);
    for (idx, c) in digits[..head_len].iter().enumerate() {
        if idx > 0 && (head_len - idx) % 2 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }
    if head_len > 0 {
        grouped.push(',');
    }
    grouped.extend(&digits[head_len..]);

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    if frac_part == "00" {
        format!("{sign}₹{grouped}")
    } else {
        format!("{sign}₹{grouped}.{frac_part}")
    }
}

pub fn format_percent(rate: Money) -> String {
    format!("{}%", (rate * Money::ONE_HUNDRED).round_dp(2).normalize())
}
