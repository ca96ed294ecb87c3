use crate::money::{serialize_decimal, serialize_decimal_opt};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;

pub const DEFAULT_COUNTRY: &str = "INDIA";
pub const DEFAULT_FISCAL_YEAR: &str = "FY2024";

/// A progressive tax band: `rate` percent applies to income between `min` and `max`.
/// No `max` means the band is unbounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TaxSlab {
    #[serde(serialize_with = "serialize_decimal")]
    #[schemars(with = "f64")]
    pub min: Decimal,
    #[serde(
        default,
        serialize_with = "serialize_decimal_opt",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<f64>")]
    pub max: Option<Decimal>,
    /// Marginal rate in percent (0-100)
    #[serde(serialize_with = "serialize_decimal")]
    #[schemars(with = "f64")]
    pub rate: Decimal,
}

impl TaxSlab {
    pub fn bounded(min: Decimal, max: Decimal, rate: Decimal) -> Self {
        TaxSlab {
            min,
            max: Some(max),
            rate,
        }
    }

    pub fn unbounded(min: Decimal, rate: Decimal) -> Self {
        TaxSlab {
            min,
            max: None,
            rate,
        }
    }
}

/// Why a slab table is not a valid partition of income
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SlabError {
    #[error("slab table is empty")]
    Empty,
    #[error("first slab must start at 0, found {0}")]
    NonZeroStart(Decimal),
    #[error("slab {index} rate {rate} is outside 0..=100")]
    RateOutOfRange { index: usize, rate: Decimal },
    #[error("slab {index} max {max} must exceed its min {min}")]
    EmptyBand {
        index: usize,
        min: Decimal,
        max: Decimal,
    },
    #[error("slab {index} starts at {min}, expected {expected}")]
    Discontiguous {
        index: usize,
        min: Decimal,
        expected: Decimal,
    },
    #[error("slab {index} is unbounded but is not the last slab")]
    UnboundedBeforeEnd { index: usize },
    #[error("last slab must be unbounded")]
    BoundedTop,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TaxError {
    #[error("no slab table for {country}/{fiscal_year}")]
    UnknownSlabTable {
        country: String,
        fiscal_year: String,
    },
    #[error("invalid slab table {country}/{fiscal_year}: {source}")]
    InvalidSlabTable {
        country: String,
        fiscal_year: String,
        #[source]
        source: SlabError,
    },
}

/// Slabs for one jurisdiction and fiscal year
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SlabTable {
    pub country: String,
    pub fiscal_year: String,
    pub slabs: Vec<TaxSlab>,
}

impl SlabTable {
    /// India, FY2024 (old regime bands)
    pub fn india_fy2024() -> Self {
        SlabTable {
            country: DEFAULT_COUNTRY.to_string(),
            fiscal_year: DEFAULT_FISCAL_YEAR.to_string(),
            slabs: vec![
                TaxSlab::bounded(dec!(0), dec!(300000), dec!(0)),
                TaxSlab::bounded(dec!(300000), dec!(600000), dec!(5)),
                TaxSlab::bounded(dec!(600000), dec!(900000), dec!(10)),
                TaxSlab::bounded(dec!(900000), dec!(1200000), dec!(15)),
                TaxSlab::bounded(dec!(1200000), dec!(1500000), dec!(20)),
                TaxSlab::unbounded(dec!(1500000), dec!(30)),
            ],
        }
    }

    pub fn validate(&self) -> Result<(), TaxError> {
        validate_slabs(&self.slabs).map_err(|source| TaxError::InvalidSlabTable {
            country: self.country.clone(),
            fiscal_year: self.fiscal_year.clone(),
            source,
        })
    }

    fn key(&self) -> (String, String) {
        table_key(&self.country, &self.fiscal_year)
    }
}

/// Check that slabs partition `[0, ∞)` in ascending order with no gaps or overlaps.
pub fn validate_slabs(slabs: &[TaxSlab]) -> Result<(), SlabError> {
    let first = slabs.first().ok_or(SlabError::Empty)?;
    if !first.min.is_zero() {
        return Err(SlabError::NonZeroStart(first.min));
    }

    let last_index = slabs.len() - 1;
    let mut expected_min = Decimal::ZERO;
    for (index, slab) in slabs.iter().enumerate() {
        if slab.rate < Decimal::ZERO || slab.rate > dec!(100) {
            return Err(SlabError::RateOutOfRange {
                index,
                rate: slab.rate,
            });
        }
        if slab.min != expected_min {
            return Err(SlabError::Discontiguous {
                index,
                min: slab.min,
                expected: expected_min,
            });
        }
        match slab.max {
            Some(max) if max <= slab.min => {
                return Err(SlabError::EmptyBand {
                    index,
                    min: slab.min,
                    max,
                })
            }
            Some(_) if index == last_index => return Err(SlabError::BoundedTop),
            Some(max) => expected_min = max,
            None if index != last_index => return Err(SlabError::UnboundedBeforeEnd { index }),
            None => {}
        }
    }
    Ok(())
}

/// Root of a slab configuration file
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SlabConfig {
    pub tables: Vec<SlabTable>,
}

/// Slab tables keyed by (country, fiscal year), case-insensitive
#[derive(Debug, Clone, Default)]
pub struct SlabRegistry {
    tables: BTreeMap<(String, String), SlabTable>,
}

impl SlabRegistry {
    pub fn builtin() -> Self {
        let mut registry = SlabRegistry::default();
        let india = SlabTable::india_fy2024();
        registry.tables.insert(india.key(), india);
        registry
    }

    /// Add a validated table, returning the one it replaced
    pub fn insert(&mut self, table: SlabTable) -> Result<Option<SlabTable>, TaxError> {
        table.validate()?;
        let replaced = self.tables.insert(table.key(), table);
        if let Some(old) = &replaced {
            log::warn!(
                "Slab table {}/{} overridden by configuration",
                old.country,
                old.fiscal_year
            );
        }
        Ok(replaced)
    }

    /// Merge tables from a `{"tables": [...]}` JSON document, returning how many were read.
    /// Nothing is merged unless every table in the document is valid.
    pub fn extend_from_json<R: Read>(&mut self, reader: R) -> anyhow::Result<usize> {
        let config: SlabConfig = serde_json::from_reader(reader)?;
        for table in &config.tables {
            table.validate()?;
        }
        let count = config.tables.len();
        for table in config.tables {
            self.insert(table)?;
        }
        log::info!("Loaded {} slab tables", count);
        Ok(count)
    }

    pub fn get(&self, country: &str, fiscal_year: &str) -> Result<&SlabTable, TaxError> {
        self.tables
            .get(&table_key(country, fiscal_year))
            .ok_or_else(|| TaxError::UnknownSlabTable {
                country: country.to_string(),
                fiscal_year: fiscal_year.to_string(),
            })
    }

    pub fn tables(&self) -> impl Iterator<Item = &SlabTable> {
        self.tables.values()
    }
}

fn table_key(country: &str, fiscal_year: &str) -> (String, String) {
    (
        country.trim().to_uppercase(),
        fiscal_year.trim().to_uppercase(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slabs(bands: &[(i64, Option<i64>, i64)]) -> Vec<TaxSlab> {
        bands
            .iter()
            .map(|&(min, max, rate)| TaxSlab {
                min: Decimal::from(min),
                max: max.map(Decimal::from),
                rate: Decimal::from(rate),
            })
            .collect()
    }

    #[test]
    fn builtin_india_table_is_valid() {
        let table = SlabTable::india_fy2024();
        assert_eq!(table.slabs.len(), 6);
        assert_eq!(table.validate(), Ok(()));
        assert_eq!(table.slabs[5].max, None);
        assert_eq!(table.slabs[5].rate, dec!(30));
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let registry = SlabRegistry::builtin();
        assert!(registry.get("india", "fy2024").is_ok());
        assert!(registry.get(" INDIA ", "FY2024").is_ok());
    }

    #[test]
    fn unknown_table_errors() {
        let registry = SlabRegistry::builtin();
        assert_eq!(
            registry.get("INDIA", "FY2030"),
            Err(TaxError::UnknownSlabTable {
                country: "INDIA".to_string(),
                fiscal_year: "FY2030".to_string()
            })
        );
    }

    #[test]
    fn rejects_empty_table() {
        assert_eq!(validate_slabs(&[]), Err(SlabError::Empty));
    }

    #[test]
    fn rejects_non_zero_start() {
        let bad = slabs(&[(100, None, 10)]);
        assert_eq!(validate_slabs(&bad), Err(SlabError::NonZeroStart(dec!(100))));
    }

    #[test]
    fn rejects_gap_between_slabs() {
        let bad = slabs(&[(0, Some(300000), 0), (300001, None, 5)]);
        assert_eq!(
            validate_slabs(&bad),
            Err(SlabError::Discontiguous {
                index: 1,
                min: dec!(300001),
                expected: dec!(300000)
            })
        );
    }

    #[test]
    fn rejects_overlap() {
        let bad = slabs(&[(0, Some(300000), 0), (250000, None, 5)]);
        assert!(matches!(
            validate_slabs(&bad),
            Err(SlabError::Discontiguous { index: 1, .. })
        ));
    }

    #[test]
    fn rejects_bounded_top_slab() {
        let bad = slabs(&[(0, Some(300000), 0), (300000, Some(600000), 5)]);
        assert_eq!(validate_slabs(&bad), Err(SlabError::BoundedTop));
    }

    #[test]
    fn rejects_unbounded_middle_slab() {
        let bad = slabs(&[(0, None, 0), (300000, None, 5)]);
        assert_eq!(
            validate_slabs(&bad),
            Err(SlabError::UnboundedBeforeEnd { index: 0 })
        );
    }

    #[test]
    fn rejects_empty_band_and_bad_rate() {
        let empty = slabs(&[(0, Some(0), 0), (0, None, 5)]);
        assert!(matches!(
            validate_slabs(&empty),
            Err(SlabError::EmptyBand { index: 0, .. })
        ));

        let rate = slabs(&[(0, None, 120)]);
        assert_eq!(
            validate_slabs(&rate),
            Err(SlabError::RateOutOfRange {
                index: 0,
                rate: dec!(120)
            })
        );
    }

    #[test]
    fn config_file_adds_and_overrides_tables() {
        let json = r#"{
            "tables": [
                {"country": "india", "fiscal_year": "FY2025", "slabs": [
                    {"min": 0, "max": 400000, "rate": 0},
                    {"min": 400000, "rate": 10}
                ]},
                {"country": "INDIA", "fiscal_year": "FY2024", "slabs": [
                    {"min": 0, "rate": 12.5}
                ]}
            ]
        }"#;
        let mut registry = SlabRegistry::builtin();
        assert_eq!(registry.extend_from_json(json.as_bytes()).unwrap(), 2);
        assert_eq!(registry.tables().count(), 2);
        assert_eq!(registry.get("INDIA", "FY2025").unwrap().slabs.len(), 2);
        assert_eq!(
            registry.get("INDIA", "FY2024").unwrap().slabs,
            vec![TaxSlab::unbounded(dec!(0), dec!(12.5))]
        );
    }

    #[test]
    fn config_file_with_invalid_table_is_rejected() {
        let json = r#"{"tables": [{"country": "X", "fiscal_year": "Y", "slabs": [{"min": 5, "rate": 1}]}]}"#;
        let mut registry = SlabRegistry::builtin();
        let err = registry.extend_from_json(json.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("X/Y"), "unexpected error: {err}");
    }

    #[test]
    fn config_file_is_merged_all_or_nothing() {
        let json = r#"{"tables": [
            {"country": "INDIA", "fiscal_year": "FY2025", "slabs": [{"min": 0, "rate": 10}]},
            {"country": "INDIA", "fiscal_year": "FY2024", "slabs": [{"min": 0, "max": 100, "rate": 5}]}
        ]}"#;
        let mut registry = SlabRegistry::builtin();
        assert!(registry.extend_from_json(json.as_bytes()).is_err());
        assert_eq!(registry.tables().count(), 1);
        assert_eq!(
            registry.get("INDIA", "FY2025"),
            Err(TaxError::UnknownSlabTable {
                country: "INDIA".to_string(),
                fiscal_year: "FY2025".to_string(),
            })
        );
        assert_eq!(
            registry.get("india", "fy2024").unwrap(),
            &SlabTable::india_fy2024()
        );
    }

    #[test]
    fn unbounded_slab_omits_max_in_json() {
        let json = serde_json::to_value(TaxSlab::unbounded(dec!(1500000), dec!(30))).unwrap();
        assert_eq!(json, serde_json::json!({"min": 1500000.0, "rate": 30.0}));
    }
}
