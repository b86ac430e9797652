pub mod brokers;
pub mod credit;
pub mod dates;
pub mod debt;
pub mod error;
pub mod fiscal;
pub mod gains;
pub mod money;
pub mod table;
pub mod tax;
pub mod warnings;

// Flat public surface for domain types and functions.
pub use brokers::{detect_source, ingest, normalize_instrument, BrokerSource, Ingestion};
pub use credit::{
    loan_eligibility, simulate_change, AccountType, CreditAccount, CreditInquiry, CreditProfile,
    Factor, FactorScore, FactorStatus, LoanEligibility, PaymentEvent, Recommendation, ScoreBand,
    ScoreChange, ScoreFactors, ScoreReport, ScoringRules,
};
pub use dates::{parse_date, LenientDate};
pub use debt::{
    compare_strategies, read_debts_csv, simulate, Debt, DebtKind, RepaymentPlan, RepaymentStrategy,
    SimulationLimits, StrategyComparison, TimelineEntry,
};
pub use error::InputError;
pub use fiscal::FiscalYear;
pub use gains::{
    aggregate, classify, estimate_tax, CapitalGainsRules, Classification, GainRecord, GainsSummary,
    GainsTaxEstimate, HoldingPeriods, InstrumentClass, InvalidTradeError, Term, Trade, TradeKind, UnmatchedSellError,
};
pub use money::{parse_amount, round_to_paise, round_to_unit, Money, Rate};
pub use table::{RawTable, RowError, RowErrorKind};
pub use tax::{
    compare, tax_saving_tips, DeductionCode, Regime, RegimeResult, TaxComparison, TaxProfile,
    TaxRules, TaxSavingTip,
};
pub use warnings::Warning;
