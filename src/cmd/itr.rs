//! ITR command - ITR-1 field summary for a computed tax result

use crate::cmd::tax::TaxArgs;
use clap::Args;
use coinwise::money::format_inr;
use coinwise::tax::ItrForm;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct ItrCommand {
    #[command(flatten)]
    args: TaxArgs,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Amount")]
    amount: String,
}

impl ItrCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let computation = self.args.compute()?;
        let form = ItrForm::from_tax(
            &computation.result,
            computation.gross_income,
            &computation.fiscal_year,
        );

        if self.json {
            println!("{}", serde_json::to_string_pretty(&form)?);
        } else {
            self.print_form(&form);
        }
        Ok(())
    }

    fn print_form(&self, form: &ItrForm) {
        println!();
        match &form.assessment_year {
            Some(ay) => println!("{} (AY {})", form.form, ay),
            None => println!("{}", form.form),
        }
        println!();

        let income = &form.income_details;
        let mut rows = vec![FieldRow {
            field: "Gross total income".to_string(),
            amount: format_inr(income.gross_total_income),
        }];
        rows.extend(form.deductions.iter().map(|(section, amount)| FieldRow {
            field: format!("Deduction u/s {}", section),
            amount: format_inr(*amount),
        }));
        rows.push(FieldRow {
            field: "Total deductions".to_string(),
            amount: format_inr(income.total_deductions),
        });
        rows.push(FieldRow {
            field: "Total taxable income".to_string(),
            amount: format_inr(income.taxable_income),
        });
        rows.push(FieldRow {
            field: "Tax payable".to_string(),
            amount: format_inr(form.tax_payable),
        });

        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
            .to_string();
        println!("{}", table);
    }
}
