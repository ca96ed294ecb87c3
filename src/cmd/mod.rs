pub mod analyze;
pub mod itr;
pub mod schema;
pub mod slabs;
pub mod tax;

use coinwise::core::{
    read_transactions_csv, read_transactions_json, records_to_transactions, Transaction,
};
use coinwise::tax::SlabRegistry;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

/// Read and validate transactions from a JSON/CSV file (or stdin with "-")
pub fn read_transactions(path: &Path) -> anyhow::Result<Vec<Transaction>> {
    let bytes = read_input(path)?;
    let records = if is_csv(path) {
        read_transactions_csv(bytes.as_slice())?
    } else {
        read_transactions_json(bytes.as_slice())?
    };
    Ok(records_to_transactions(&records)?)
}

/// Builtin slab tables, extended by an optional JSON configuration file
pub fn load_registry(slabs: Option<&PathBuf>) -> anyhow::Result<SlabRegistry> {
    let mut registry = SlabRegistry::builtin();
    if let Some(path) = slabs {
        let file = File::open(path)?;
        registry.extend_from_json(BufReader::new(file))?;
    }
    Ok(registry)
}

/// Whole contents of a file, or of stdin when the path is "-"
pub fn read_input(path: &Path) -> anyhow::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    if path.as_os_str() == "-" {
        io::stdin().lock().read_to_end(&mut buffer)?;
        if buffer.is_empty() {
            anyhow::bail!("No input received. Provide a file or pipe data to stdin.");
        }
    } else {
        BufReader::new(File::open(path)?).read_to_end(&mut buffer)?;
    }
    Ok(buffer)
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}
