use super::transaction::{Transaction, TransactionKind};
use crate::money::{serialize_decimal, serialize_decimal_map};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::collections::BTreeMap;

/// Income/expense breakdown of a set of transactions
///
/// Maps are keyed by category label. Iteration order is an implementation
/// detail and carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    #[serde(serialize_with = "serialize_decimal")]
    pub total_income: Decimal,
    #[serde(serialize_with = "serialize_decimal")]
    pub total_expenses: Decimal,
    /// Expense total per category
    #[serde(serialize_with = "serialize_decimal_map")]
    pub categories: BTreeMap<String, Decimal>,
    /// Expenses as a percentage of income, 2dp. Zero when there is no income.
    #[serde(serialize_with = "serialize_decimal")]
    pub expense_to_income_ratio: Decimal,
    /// Category totals as a percentage of income, 2dp. Empty when there is no income.
    #[serde(serialize_with = "serialize_decimal_map")]
    pub category_percentages: BTreeMap<String, Decimal>,
}

/// Aggregate categorised transactions in a single pass
///
/// Amounts are expected to have passed intake ([`TransactionRecord::to_transaction`]),
/// which bounds them by [`MAX_AMOUNT`](crate::money::MAX_AMOUNT) and to whole paise.
///
/// [`TransactionRecord::to_transaction`]: super::transaction::TransactionRecord::to_transaction
pub fn analyze(transactions: &[Transaction]) -> AnalysisResult {
    let mut result = AnalysisResult::default();

    for tx in transactions {
        match &tx.kind {
            TransactionKind::Income => result.total_income += tx.amount,
            TransactionKind::Expense { category } => {
                result.total_expenses += tx.amount;
                *result
                    .categories
                    .entry(category.clone())
                    .or_insert(Decimal::ZERO) += tx.amount;
            }
        }
    }

    if result.total_income > Decimal::ZERO {
        let income = result.total_income;
        result.expense_to_income_ratio = percent_of(result.total_expenses, income);
        result.category_percentages = result
            .categories
            .iter()
            .map(|(category, amount)| (category.clone(), percent_of(*amount, income)))
            .collect();
    }

    log::debug!(
        "Analysed {} transactions: income={}, expenses={}, categories={}",
        transactions.len(),
        result.total_income,
        result.total_expenses,
        result.categories.len()
    );

    result
}

/// `part / whole * 100`, rounded half-to-even at 2dp. `whole` must be positive.
fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    (part / whole * dec!(100)).round_dp(2)
}
