//! Expense analysis and progressive income tax over categorised bank transactions.
//!
//! [`core::analyze`] aggregates transactions into income, expense and per-category
//! totals. [`tax::calculate_tax`] applies a jurisdiction's slab table to income
//! after deductions. Both are pure; records coming from outside are validated
//! on the way in (see [`core::TransactionRecord::to_transaction`] and
//! [`tax::parse_identified`]).

pub mod core;
pub mod money;
pub mod tax;
