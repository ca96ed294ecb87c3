//! ITR-1 field mapping built from a computed tax result.

use super::calculator::TaxResult;
use super::deductions::total_deductions;
use crate::money::{serialize_decimal, serialize_decimal_map};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncomeDetails {
    #[serde(serialize_with = "serialize_decimal")]
    pub gross_total_income: Decimal,
    #[serde(serialize_with = "serialize_decimal")]
    pub total_deductions: Decimal,
    /// Floored at zero; a return cannot declare negative total income
    #[serde(serialize_with = "serialize_decimal")]
    pub taxable_income: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItrForm {
    pub form: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assessment_year: Option<String>,
    pub income_details: IncomeDetails,
    /// Amount claimed per section
    #[serde(serialize_with = "serialize_decimal_map")]
    pub deductions: BTreeMap<String, Decimal>,
    #[serde(serialize_with = "serialize_decimal")]
    pub tax_payable: Decimal,
}

impl ItrForm {
    pub fn from_tax(result: &TaxResult, gross_total_income: Decimal, fiscal_year: &str) -> Self {
        let mut deductions = BTreeMap::new();
        for d in &result.deductions {
            *deductions.entry(d.section.to_string()).or_insert(Decimal::ZERO) += d.amount;
        }

        let assessment_year = assessment_year(fiscal_year);
        if assessment_year.is_none() {
            log::warn!("Cannot derive assessment year from fiscal year '{}'", fiscal_year);
        }

        ItrForm {
            form: "ITR-1".to_string(),
            assessment_year,
            income_details: IncomeDetails {
                gross_total_income,
                total_deductions: total_deductions(&result.deductions),
                taxable_income: result.taxable_income.max(Decimal::ZERO),
            },
            deductions,
            tax_payable: result.total_tax,
        }
    }
}

/// Assessment year following a fiscal year: `FY2024` -> `2025-26`
pub fn assessment_year(fiscal_year: &str) -> Option<String> {
    let trimmed = fiscal_year.trim();
    let digits = trimmed
        .get(..2)
        .filter(|prefix| prefix.eq_ignore_ascii_case("FY"))
        .map_or(trimmed, |_| &trimmed[2..]);
    let year: u32 = digits
        .get(..4)
        .filter(|year| year.bytes().all(|b| b.is_ascii_digit()))?
        .parse()
        .ok()?;
    Some(format!("{}-{:02}", year + 1, (year + 2) % 100))
}
