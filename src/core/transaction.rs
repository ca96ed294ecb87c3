use crate::money::{is_whole_paise, serialize_decimal, MAX_AMOUNT};
use chrono::{NaiveDate, NaiveDateTime};
use coinwise_derive::CsvSchema;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// Category labels the upstream categoriser is asked to choose from.
pub const KNOWN_CATEGORIES: &[&str] = &[
    "Food",
    "Transport",
    "Housing",
    "Utilities",
    "Entertainment",
    "Healthcare",
    "Education",
    "Other",
];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TransactionError {
    #[error("invalid date '{date}' in transaction #{index}")]
    InvalidDate { index: usize, date: String },
    #[error("negative amount {amount} in transaction #{index}, direction is carried by type")]
    NegativeAmount { index: usize, amount: Decimal },
    #[error("amount {amount} in transaction #{index} exceeds the limit of {max}", max = MAX_AMOUNT)]
    AmountTooLarge { index: usize, amount: Decimal },
    #[error("amount {amount} in transaction #{index} is finer than one paisa")]
    FractionalPaise { index: usize, amount: Decimal },
    #[error("expense transaction #{index} has no category")]
    MissingCategory { index: usize },
}

/// One column of the CSV input format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvField {
    pub name: &'static str,
    pub required: bool,
    pub description: &'static str,
}

/// Input root for transaction JSON
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TransactionInput {
    pub transactions: Vec<TransactionRecord>,
}

/// Direction of money flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

/// Transaction as produced by statement extraction and categorisation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, CsvSchema)]
pub struct TransactionRecord {
    /// Transaction date (YYYY-MM-DD or YYYY-MM-DDThh:mm:ss)
    pub date: String,
    /// Statement narration
    #[serde(default)]
    pub description: String,
    /// Non-negative amount; direction comes from type
    #[serde(serialize_with = "serialize_decimal")]
    #[schemars(with = "f64")]
    pub amount: Decimal,
    /// income or expense
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Spending category (required for expenses)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Validated transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub kind: TransactionKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionKind {
    Income,
    Expense { category: String },
}

impl Transaction {
    pub fn income(date: NaiveDate, description: &str, amount: Decimal) -> Self {
        Transaction {
            date,
            description: description.to_string(),
            amount,
            kind: TransactionKind::Income,
        }
    }

    pub fn expense(date: NaiveDate, description: &str, amount: Decimal, category: &str) -> Self {
        Transaction {
            date,
            description: description.to_string(),
            amount,
            kind: TransactionKind::Expense {
                category: category.to_string(),
            },
        }
    }

    pub fn category(&self) -> Option<&str> {
        match &self.kind {
            TransactionKind::Income => None,
            TransactionKind::Expense { category } => Some(category),
        }
    }
}

impl TransactionRecord {
    /// Validate a raw record; `index` is its position in the input, used in errors.
    pub fn to_transaction(&self, index: usize) -> Result<Transaction, TransactionError> {
        let date = parse_date(&self.date).ok_or_else(|| TransactionError::InvalidDate {
            index,
            date: self.date.clone(),
        })?;

        if self.amount < Decimal::ZERO {
            return Err(TransactionError::NegativeAmount {
                index,
                amount: self.amount,
            });
        }
        if self.amount > MAX_AMOUNT {
            return Err(TransactionError::AmountTooLarge {
                index,
                amount: self.amount,
            });
        }
        if !is_whole_paise(self.amount) {
            return Err(TransactionError::FractionalPaise {
                index,
                amount: self.amount,
            });
        }

        let kind = match self.kind {
            TransactionType::Income => TransactionKind::Income,
            TransactionType::Expense => {
                let category = self
                    .category
                    .as_deref()
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .ok_or(TransactionError::MissingCategory { index })?;
                if !KNOWN_CATEGORIES.contains(&category) {
                    log::warn!("Transaction #{} uses unlisted category '{}'", index, category);
                }
                TransactionKind::Expense {
                    category: category.to_string(),
                }
            }
        };

        Ok(Transaction {
            date,
            description: self.description.clone(),
            amount: self.amount,
            kind,
        })
    }
}

impl From<&Transaction> for TransactionRecord {
    fn from(tx: &Transaction) -> Self {
        let (kind, category) = match &tx.kind {
            TransactionKind::Income => (TransactionType::Income, None),
            TransactionKind::Expense { category } => {
                (TransactionType::Expense, Some(category.clone()))
            }
        };
        TransactionRecord {
            date: tx.date.format("%Y-%m-%d").to_string(),
            description: tx.description.clone(),
            amount: tx.amount,
            kind,
            category,
        }
    }
}

/// Read transaction records from JSON, either `{"transactions": [...]}` or a bare array
pub fn read_transactions_json<R: Read>(reader: R) -> anyhow::Result<Vec<TransactionRecord>> {
    let value: serde_json::Value = serde_json::from_reader(reader)?;
    let records = if value.is_array() {
        serde_json::from_value(value)?
    } else {
        let input: TransactionInput = serde_json::from_value(value)?;
        input.transactions
    };
    log::info!("Read {} transaction records", records.len());
    Ok(records)
}

/// Read transaction records from CSV with a `date,description,amount,type,category` header
pub fn read_transactions_csv<R: Read>(reader: R) -> anyhow::Result<Vec<TransactionRecord>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let records = rdr
        .deserialize::<TransactionRecord>()
        .collect::<Result<Vec<_>, _>>()?;
    log::info!("Read {} csv records", records.len());
    Ok(records)
}

/// Validate every record, failing on the first bad one
pub fn records_to_transactions(
    records: &[TransactionRecord],
) -> Result<Vec<Transaction>, TransactionError> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| record.to_transaction(index))
        .collect()
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
}
