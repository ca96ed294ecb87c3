pub mod analysis;
pub mod transaction;

// Flat public surface for domain types and functions.
pub use analysis::{analyze, AnalysisResult};
pub use transaction::{
    read_transactions_csv, read_transactions_json, records_to_transactions, CsvField,
    Transaction, TransactionError, TransactionInput, TransactionKind, TransactionRecord,
    TransactionType, KNOWN_CATEGORIES,
};
