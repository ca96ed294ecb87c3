//! Tax command - progressive slab tax on income after deductions

use crate::cmd::{load_registry, read_input};
use clap::Args;
use coinwise::money::{format_inr, format_inr_signed, format_percent};
use coinwise::tax::{
    calculate_tax, parse_identified, slab_breakdown, Deduction, TaxInput, TaxResult,
    DEFAULT_COUNTRY, DEFAULT_FISCAL_YEAR,
};
use rust_decimal::Decimal;
use std::path::PathBuf;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

/// Arguments shared by the commands that compute tax
#[derive(Args, Debug)]
pub struct TaxArgs {
    /// JSON file with total_income, deductions and/or transactions ("-" for stdin)
    #[arg(short, long)]
    input: PathBuf,

    /// Raw deduction identifier response (JSON, optionally wrapped in prose)
    #[arg(short, long)]
    deductions: Option<PathBuf>,

    /// Country whose slab table applies
    #[arg(long, default_value = DEFAULT_COUNTRY)]
    country: String,

    /// Fiscal year whose slab table applies
    #[arg(long, default_value = DEFAULT_FISCAL_YEAR)]
    fiscal_year: String,

    /// JSON file with additional slab tables
    #[arg(long)]
    slabs: Option<PathBuf>,
}

/// A computed tax result together with the income it was computed from
pub struct Computation {
    pub gross_income: Decimal,
    pub fiscal_year: String,
    pub result: TaxResult,
}

impl TaxArgs {
    pub fn compute(&self) -> anyhow::Result<Computation> {
        let registry = load_registry(self.slabs.as_ref())?;
        let table = registry.get(&self.country, &self.fiscal_year)?;

        let input = TaxInput::from_json(read_input(&self.input)?.as_slice())?;
        let identified = self.identified_deductions()?;
        let (gross_income, deductions) = input.resolve(identified)?;

        log::info!(
            "Computing {} {} tax on {} with {} deductions",
            table.country,
            table.fiscal_year,
            gross_income,
            deductions.len()
        );
        let result = calculate_tax(gross_income, &deductions, &table.slabs);

        Ok(Computation {
            gross_income,
            fiscal_year: table.fiscal_year.clone(),
            result,
        })
    }

    fn identified_deductions(&self) -> anyhow::Result<Vec<Deduction>> {
        let Some(path) = &self.deductions else {
            return Ok(Vec::new());
        };
        let response = String::from_utf8(read_input(path)?)?;
        let identified = parse_identified(&response)?;
        log::info!(
            "Read {} identified deductions from {}",
            identified.len(),
            path.display()
        );
        Ok(identified)
    }
}

#[derive(Args, Debug)]
pub struct TaxCommand {
    #[command(flatten)]
    args: TaxArgs,

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
    #[tabled(rename = "Taxed")]
    taxed: String,
    #[tabled(rename = "Tax")]
    tax: String,
}

#[derive(Debug, Clone, Tabled)]
struct DeductionRow {
    #[tabled(rename = "Section")]
    section: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Amount")]
    amount: String,
}

impl TaxCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let computation = self.args.compute()?;
        if self.json {
            println!("{}", serde_json::to_string_pretty(&computation.result)?);
        } else {
            self.print_summary(&computation);
        }
        Ok(())
    }

    fn print_summary(&self, computation: &Computation) {
        let result = &computation.result;

        println!();
        println!("TAX SUMMARY ({})", computation.fiscal_year);
        println!();
        println!("  Gross income:   {}", format_inr(computation.gross_income));
        println!(
            "  Deductions:     {}",
            format_inr(computation.gross_income - result.taxable_income)
        );
        println!("  Taxable income: {}", format_inr_signed(result.taxable_income));
        println!();

        if !result.deductions.is_empty() {
            let rows: Vec<DeductionRow> = result
                .deductions
                .iter()
                .map(|d| DeductionRow {
                    section: d.section.to_string(),
                    description: d.description.clone(),
                    amount: format_inr(d.amount),
                })
                .collect();
            println!("{}", styled(Table::new(rows)));
            println!();
        }

        let breakdown = slab_breakdown(result.taxable_income, &result.slabs_used);
        if !breakdown.is_empty() {
            let rows: Vec<SlabRow> = breakdown
                .iter()
                .map(|c| SlabRow {
                    from: format_inr(c.slab.min),
                    to: c.slab.max.map_or_else(|| "-".to_string(), format_inr),
                    rate: format_percent(c.slab.rate),
                    taxed: format_inr(c.taxed_amount),
                    tax: format_inr(c.tax),
                })
                .collect();
            println!("{}", styled(Table::new(rows)));
            println!();
        }

        println!("  Total tax: {}", format_inr(result.total_tax));
    }
}

fn styled(mut table: Table) -> String {
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
        .to_string()
}
