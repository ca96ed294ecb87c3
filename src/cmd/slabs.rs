//! Slabs command - list the slab tables available for tax computation

use crate::cmd::load_registry;
use clap::Args;
use coinwise::money::{format_inr, format_percent};
use coinwise::tax::SlabTable;
use std::path::PathBuf;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct SlabsCommand {
    /// Only show tables for this country
    #[arg(long)]
    country: Option<String>,

    /// Only show tables for this fiscal year
    #[arg(long)]
    fiscal_year: Option<String>,

    /// JSON file with additional slab tables
    #[arg(long)]
    slabs: Option<PathBuf>,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Tabled)]
struct SlabRow {
    #[tabled(rename = "From")]
    from: String,
    #[tabled(rename = "To")]
    to: String,
    #[tabled(rename = "Rate")]
    rate: String,
}

impl SlabsCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let registry = load_registry(self.slabs.as_ref())?;
        let tables: Vec<&SlabTable> = registry
            .tables()
            .filter(|t| matches(&self.country, &t.country))
            .filter(|t| matches(&self.fiscal_year, &t.fiscal_year))
            .collect();

        if tables.is_empty() {
            anyhow::bail!("No slab tables match the given country/fiscal year");
        }

        if self.json {
            println!("{}", serde_json::to_string_pretty(&tables)?);
            return Ok(());
        }

        for table in tables {
            println!();
            println!("{} {}", table.country, table.fiscal_year);
            let rows: Vec<SlabRow> = table
                .slabs
                .iter()
                .map(|slab| SlabRow {
                    from: format_inr(slab.min),
                    to: slab.max.map_or_else(|| "-".to_string(), format_inr),
                    rate: format_percent(slab.rate),
                })
                .collect();
            let rendered = Table::new(rows)
                .with(Style::rounded())
                .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
                .to_string();
            println!("{}", rendered);
        }
        Ok(())
    }
}

fn matches(filter: &Option<String>, value: &str) -> bool {
    filter
        .as_deref()
        .map_or(true, |f| f.trim().eq_ignore_ascii_case(value))
}
