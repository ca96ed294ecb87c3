use super::deductions::{validate_deductions, Deduction, DeductionError, DeductionRecord};
use crate::core::{analyze, records_to_transactions, TransactionError, TransactionRecord};
use crate::money::MAX_AMOUNT;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::io::Read;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TaxInputError {
    #[error("total_income is missing and there are no transactions to derive it from")]
    MissingIncome,
    #[error("negative total_income {0}")]
    NegativeIncome(Decimal),
    #[error("total_income {0} exceeds the limit of {max}", max = MAX_AMOUNT)]
    IncomeTooLarge(Decimal),
    #[error(transparent)]
    Transaction(#[from] TransactionError),
    #[error(transparent)]
    Deduction(#[from] DeductionError),
}

/// Input root for tax computation
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct TaxInput {
    /// Gross income; derived from income transactions when omitted
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub total_income: Option<Decimal>,
    /// Deductions already identified for this income
    #[serde(default)]
    pub deductions: Vec<DeductionRecord>,
    /// Categorised transactions the income and deductions relate to
    #[serde(default)]
    pub transactions: Vec<TransactionRecord>,
}

impl TaxInput {
    pub fn from_json<R: Read>(reader: R) -> anyhow::Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Gross income and validated deductions. `identified` are deductions from a
    /// separate identifier response, appended after the inline ones.
    pub fn resolve(
        &self,
        identified: Vec<Deduction>,
    ) -> Result<(Decimal, Vec<Deduction>), TaxInputError> {
        let total_income = match self.total_income {
            Some(income) => income,
            None if self.transactions.is_empty() => return Err(TaxInputError::MissingIncome),
            None => {
                let transactions = records_to_transactions(&self.transactions)?;
                let income = analyze(&transactions).total_income;
                log::info!(
                    "Derived total income {} from {} transactions",
                    income,
                    transactions.len()
                );
                income
            }
        };
        if total_income < Decimal::ZERO {
            return Err(TaxInputError::NegativeIncome(total_income));
        }
        if total_income > MAX_AMOUNT {
            return Err(TaxInputError::IncomeTooLarge(total_income));
        }

        let mut deductions = validate_deductions(self.deductions.clone())?;
        deductions.extend(identified);
        if deductions.is_empty() {
            log::warn!("No deductions supplied; tax is computed on gross income");
        }
        Ok((total_income, deductions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TransactionType;
    use crate::tax::deductions::DeductionSection;
    use rust_decimal_macros::dec;

    #[test]
    fn explicit_income_and_deductions() {
        let input = TaxInput::from_json(
            r#"{"total_income": 1000000, "deductions": [{"section": "80C", "amount": 150000, "description": "EPF"}]}"#
                .as_bytes(),
        )
        .unwrap();
        let (income, deductions) = input.resolve(vec![]).unwrap();
        assert_eq!(income, dec!(1000000));
        assert_eq!(
            deductions,
            vec![Deduction::new(DeductionSection::Section80C, dec!(150000), "EPF")]
        );
    }

    #[test]
    fn income_derived_from_transactions() {
        let input = TaxInput::from_json(
            r#"{"transactions": [
                {"date": "2024-05-01", "description": "Salary", "amount": 75000, "type": "income"},
                {"date": "2024-06-01", "description": "Salary", "amount": 75000, "type": "income"},
                {"date": "2024-06-03", "description": "Rent", "amount": 20000, "type": "expense", "category": "Housing"}
            ]}"#
            .as_bytes(),
        )
        .unwrap();
        let (income, deductions) = input.resolve(vec![]).unwrap();
        assert_eq!(income, dec!(150000));
        assert!(deductions.is_empty());
    }

    #[test]
    fn identified_deductions_are_appended() {
        let input = TaxInput {
            total_income: Some(dec!(500000)),
            deductions: vec![DeductionRecord {
                section: "80D".to_string(),
                amount: dec!(25000),
                description: "Health Insurance".to_string(),
            }],
            transactions: vec![],
        };
        let identified = vec![Deduction::new(DeductionSection::Section24, dec!(100000), "Home loan")];
        let (_, deductions) = input.resolve(identified).unwrap();
        assert_eq!(deductions.len(), 2);
        assert_eq!(deductions[1].section, DeductionSection::Section24);
    }

    #[test]
    fn missing_income_errors() {
        assert_eq!(
            TaxInput::default().resolve(vec![]),
            Err(TaxInputError::MissingIncome)
        );
    }

    #[test]
    fn negative_income_errors() {
        let input = TaxInput {
            total_income: Some(dec!(-1)),
            ..TaxInput::default()
        };
        assert_eq!(
            input.resolve(vec![]),
            Err(TaxInputError::NegativeIncome(dec!(-1)))
        );
    }

    #[test]
    fn oversized_income_errors() {
        let explicit = TaxInput {
            total_income: Some(dec!(70000000000000000000000000000)),
            ..TaxInput::default()
        };
        assert_eq!(
            explicit.resolve(vec![]),
            Err(TaxInputError::IncomeTooLarge(dec!(70000000000000000000000000000)))
        );

        // Each transaction is within limits but their sum is not
        let record = TransactionRecord {
            date: "2024-05-01".to_string(),
            description: "Salary".to_string(),
            amount: MAX_AMOUNT,
            kind: TransactionType::Income,
            category: None,
        };
        let derived = TaxInput {
            transactions: vec![record.clone(), record],
            ..TaxInput::default()
        };
        assert_eq!(
            derived.resolve(vec![]),
            Err(TaxInputError::IncomeTooLarge(MAX_AMOUNT * dec!(2)))
        );
    }

    #[test]
    fn oversized_inline_deduction_errors() {
        let input = TaxInput {
            total_income: Some(dec!(100)),
            deductions: vec![DeductionRecord {
                section: "80C".to_string(),
                amount: dec!(70000000000000000000000000000),
                description: String::new(),
            }],
            transactions: vec![],
        };
        assert!(matches!(
            input.resolve(vec![]),
            Err(TaxInputError::Deduction(DeductionError::AmountTooLarge { .. }))
        ));
    }

    #[test]
    fn invalid_inline_deduction_errors() {
        let input = TaxInput {
            total_income: Some(dec!(100)),
            deductions: vec![DeductionRecord {
                section: "80Z".to_string(),
                amount: dec!(1),
                description: String::new(),
            }],
            transactions: vec![],
        };
        assert_eq!(
            input.resolve(vec![]),
            Err(TaxInputError::Deduction(DeductionError::UnknownSection(
                "80Z".to_string()
            )))
        );
    }
}
