//! fincalc - personal finance calculation engine
//!
//! Four independent calculators over in-memory records: an Indian income tax
//! regime comparator, a synthetic credit score model, a debt repayment
//! simulator and a capital gains analyzer with broker export adapters.
//! Every calculator is a pure function of its inputs and a caller-selected
//! rule table.

pub mod core;
