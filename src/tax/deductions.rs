//! Deduction taxonomy and intake of deductions identified by an external collaborator.
//!
//! The identifier is non-deterministic and its output is untrusted: it may wrap the
//! JSON in prose, invent sections, or report negative amounts. Everything that
//! reaches the tax calculator goes through [`validate_deductions`].

use crate::money::{serialize_decimal, MAX_AMOUNT};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DeductionError {
    #[error("no JSON found in deduction response")]
    NoJson,
    #[error("malformed deduction data: {0}")]
    Malformed(String),
    #[error("unknown deduction section '{0}'")]
    UnknownSection(String),
    #[error("negative amount {amount} for section {section}")]
    NegativeAmount { section: String, amount: Decimal },
    #[error("amount {amount} for section {section} exceeds the limit of {max}", max = MAX_AMOUNT)]
    AmountTooLarge { section: String, amount: Decimal },
}

/// Income tax act section a deduction is claimed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DeductionSection {
    /// Section 80C: provident funds, ELSS, life insurance premiums
    Section80C,
    /// Section 80D: health insurance premiums
    Section80D,
    /// Section 24: interest on a home loan
    Section24,
}

impl DeductionSection {
    pub const ALL: [DeductionSection; 3] = [
        DeductionSection::Section80C,
        DeductionSection::Section80D,
        DeductionSection::Section24,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            DeductionSection::Section80C => "80C",
            DeductionSection::Section80D => "80D",
            DeductionSection::Section24 => "24",
        }
    }

    /// Instruments that qualify under this section
    pub fn qualifying_items(&self) -> &'static [&'static str] {
        match self {
            DeductionSection::Section80C => &["EPF", "PPF", "ELSS", "Insurance"],
            DeductionSection::Section80D => &["Health Insurance"],
            DeductionSection::Section24 => &["Home Loan Interest"],
        }
    }
}

impl FromStr for DeductionSection {
    type Err = DeductionError;

    /// Accepts `80C`, `80c`, `Section 80C`, `sec 24`, ...
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let lower = trimmed.to_lowercase();
        let code = ["section", "sec.", "sec", "u/s"]
            .iter()
            .find_map(|prefix| lower.strip_prefix(prefix))
            .unwrap_or(lower.as_str())
            .trim();
        DeductionSection::ALL
            .into_iter()
            .find(|section| section.code().eq_ignore_ascii_case(code))
            .ok_or_else(|| DeductionError::UnknownSection(trimmed.to_string()))
    }
}

impl fmt::Display for DeductionSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl Serialize for DeductionSection {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for DeductionSection {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Validated deduction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Deduction {
    #[schemars(with = "String")]
    pub section: DeductionSection,
    #[serde(serialize_with = "serialize_decimal")]
    #[schemars(with = "f64")]
    pub amount: Decimal,
    #[serde(default)]
    pub description: String,
}

impl Deduction {
    pub fn new(section: DeductionSection, amount: Decimal, description: &str) -> Self {
        Deduction {
            section,
            amount,
            description: description.to_string(),
        }
    }
}

/// Deduction as reported by the identifier, before validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DeductionRecord {
    /// Section code, e.g. 80C
    pub section: String,
    #[schemars(with = "f64")]
    pub amount: Decimal,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
struct DeductionEnvelope {
    deductions: Vec<DeductionRecord>,
}

pub fn validate_deductions(records: Vec<DeductionRecord>) -> Result<Vec<Deduction>, DeductionError> {
    records
        .into_iter()
        .map(|record| {
            let section: DeductionSection = record.section.parse()?;
            if record.amount < Decimal::ZERO {
                return Err(DeductionError::NegativeAmount {
                    section: record.section,
                    amount: record.amount,
                });
            }
            if record.amount > MAX_AMOUNT {
                return Err(DeductionError::AmountTooLarge {
                    section: record.section,
                    amount: record.amount,
                });
            }
            Ok(Deduction {
                section,
                amount: record.amount,
                description: record.description.trim().to_string(),
            })
        })
        .collect()
}

/// Parse the identifier's response into validated deductions.
///
/// Accepts `{"deductions": [...]}`, a bare array, or either of those embedded in
/// surrounding text. When the text holds both an object and an array span, the
/// first one that decodes as deductions is used.
pub fn parse_identified(response: &str) -> Result<Vec<Deduction>, DeductionError> {
    let mut first_error = None;
    for span in json_spans(response) {
        match decode_records(span) {
            Ok(records) => {
                let deductions = validate_deductions(records)?;
                log::info!("Accepted {} identified deductions", deductions.len());
                return Ok(deductions);
            }
            Err(e) => {
                log::debug!("Skipping candidate JSON span: {}", e);
                first_error.get_or_insert(e);
            }
        }
    }
    Err(first_error.unwrap_or(DeductionError::NoJson))
}

fn decode_records(json: &str) -> Result<Vec<DeductionRecord>, DeductionError> {
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| DeductionError::Malformed(e.to_string()))?;
    if value.is_array() {
        serde_json::from_value::<Vec<DeductionRecord>>(value)
    } else {
        serde_json::from_value::<DeductionEnvelope>(value).map(|env| env.deductions)
    }
    .map_err(|e| DeductionError::Malformed(e.to_string()))
}

pub fn total_deductions(deductions: &[Deduction]) -> Decimal {
    deductions.iter().map(|d| d.amount).sum()
}

/// Widest `{...}` and `[...]` spans, earliest opening first
fn json_spans(text: &str) -> Vec<&str> {
    let mut spans: Vec<(usize, &str)> = [('{', '}'), ('[', ']')]
        .into_iter()
        .filter_map(|(open, close)| {
            let start = text.find(open)?;
            let end = text.rfind(close)?;
            (end > start).then(|| (start, &text[start..=end]))
        })
        .collect();
    spans.sort_by_key(|(start, _)| *start);
    spans.into_iter().map(|(_, span)| span).collect()
}
