//! Analyze command - income, expenses and category breakdown

use crate::cmd::read_transactions;
use clap::Args;
use coinwise::core::{analyze, AnalysisResult, Transaction, TransactionRecord};
use coinwise::money::{format_inr, format_percent};
use serde::Serialize;
use std::path::PathBuf;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct AnalyzeCommand {
    /// JSON or CSV file containing categorised transactions ("-" for stdin)
    #[arg(short, long)]
    transactions: PathBuf,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

/// JSON output: the transactions analysed and their breakdown
#[derive(Debug, Serialize)]
struct AnalysisOutput {
    transaction_count: usize,
    transactions: Vec<TransactionRecord>,
    financial_analysis: AnalysisResult,
}

#[derive(Debug, Clone, Tabled)]
struct CategoryRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Spent")]
    spent: String,
    #[tabled(rename = "% of Income")]
    share: String,
}

impl AnalyzeCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let transactions = read_transactions(&self.transactions)?;
        let analysis = analyze(&transactions);

        if self.json {
            self.print_json(&transactions, analysis)
        } else {
            self.print_summary(transactions.len(), &analysis);
            Ok(())
        }
    }

    fn print_summary(&self, count: usize, analysis: &AnalysisResult) {
        println!();
        println!("FINANCIAL ANALYSIS ({} transactions)", count);
        println!();
        println!("  Income:   {}", format_inr(analysis.total_income));
        println!("  Expenses: {}", format_inr(analysis.total_expenses));
        println!(
            "  Expense to income: {}",
            format_percent(analysis.expense_to_income_ratio)
        );
        println!();

        if analysis.categories.is_empty() {
            println!("No expenses found");
            return;
        }

        let rows: Vec<CategoryRow> = analysis
            .categories
            .iter()
            .map(|(category, spent)| CategoryRow {
                category: category.clone(),
                spent: format_inr(*spent),
                share: analysis
                    .category_percentages
                    .get(category)
                    .map_or_else(|| "-".to_string(), |pct| format_percent(*pct)),
            })
            .collect();

        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
            .to_string();
        println!("{}", table);
    }

    fn print_json(
        &self,
        transactions: &[Transaction],
        analysis: AnalysisResult,
    ) -> anyhow::Result<()> {
        let output = AnalysisOutput {
            transaction_count: transactions.len(),
            transactions: transactions.iter().map(TransactionRecord::from).collect(),
            financial_analysis: analysis,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }
}
