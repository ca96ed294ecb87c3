//! Schema command - print expected input formats

use clap::{Args, ValueEnum};
use coinwise::core::{TransactionInput, TransactionRecord, KNOWN_CATEGORIES};
use coinwise::tax::{DeductionSection, SlabConfig, TaxInput};
use schemars::schema_for;

#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// Output format: json-schema, csv-header or csv-fields
    #[arg(value_enum, default_value = "json-schema")]
    format: SchemaFormat,

    /// Input document the JSON schema describes
    #[arg(long, value_enum, default_value = "transactions")]
    input: SchemaInput,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SchemaFormat {
    /// JSON Schema for the input format
    JsonSchema,
    /// CSV header row with column names
    CsvHeader,
    /// CSV column descriptions
    CsvFields,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SchemaInput {
    /// Transactions for the analyze command
    Transactions,
    /// Income and deductions for the tax and itr commands
    Tax,
    /// Additional slab tables
    Slabs,
}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        match self.format {
            SchemaFormat::JsonSchema => self.print_json_schema(),
            SchemaFormat::CsvHeader => {
                println!("{}", TransactionRecord::csv_header());
                Ok(())
            }
            SchemaFormat::CsvFields => {
                self.print_csv_fields();
                Ok(())
            }
        }
    }

    fn print_json_schema(&self) -> anyhow::Result<()> {
        let schema = match self.input {
            SchemaInput::Transactions => schema_for!(TransactionInput),
            SchemaInput::Tax => schema_for!(TaxInput),
            SchemaInput::Slabs => schema_for!(SlabConfig),
        };
        println!("{}", serde_json::to_string_pretty(&schema)?);
        Ok(())
    }

    fn print_csv_fields(&self) {
        println!("CSV Input Format");
        println!("================");
        println!();
        for field in TransactionRecord::csv_schema() {
            let req = if field.required { "required" } else { "optional" };
            println!("{:20} ({:8})  {}", field.name, req, field.description);
        }
        println!();
        println!("Expense categories: {}", KNOWN_CATEGORIES.join(", "));
        let sections: Vec<&str> = DeductionSection::ALL.iter().map(|s| s.code()).collect();
        println!("Deduction sections: {}", sections.join(", "));
    }
}
