//! Per-layer via design rules.
//!
//! A [`RuleTable`] holds one [`LayerRule`] per via layer. Via layer `i`
//! connects metal `i` to metal `i + 1`; both are 1-based.

use std::path::Path;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{with_err_context, ErrorContext, ErrorSource, Result};

/// DRC minimums for a single via layer.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Builder, Serialize, Deserialize)]
pub struct LayerRule {
    /// Side length of the (square) via.
    pub min_via_size: i64,
    /// Distance from the lower-left corner of one via to that of its neighbor.
    pub min_pitch: i64,
    /// Minimum enclosure of a via by the metal on either side.
    pub min_border: i64,
}

impl LayerRule {
    #[inline]
    pub fn builder() -> LayerRuleBuilder {
        LayerRuleBuilder::default()
    }

    pub fn new(min_via_size: i64, min_pitch: i64, min_border: i64) -> Self {
        Self {
            min_via_size,
            min_pitch,
            min_border,
        }
    }

    /// The smallest metal extent that holds one via with legal enclosure.
    ///
    /// Returns [`None`] if the result does not fit in an `i64`, as do the
    /// other derived quantities below.
    #[inline]
    pub fn single_via_extent(&self) -> Option<i64> {
        self.min_via_size.checked_add(self.min_border.checked_mul(2)?)
    }

    /// The metal extent below which an axis is considered too small for two vias.
    #[inline]
    pub fn two_via_extent(&self) -> Option<i64> {
        self.min_via_size
            .checked_mul(2)?
            .checked_add(self.min_pitch)?
            .checked_add(self.min_border.checked_mul(2)?)
    }

    /// Number of vias that fit along an axis of length `extent`.
    #[inline]
    pub fn via_count(&self, extent: i64) -> Option<i64> {
        extent
            .checked_sub(self.min_border.checked_mul(2)?)?
            .checked_add(self.min_pitch - self.min_via_size)
            .map(|span| span / self.min_pitch)
    }

    /// Offset of the first via that centers `count` vias along an axis of length `extent`.
    #[inline]
    pub fn centering_offset(&self, extent: i64, count: i64) -> Option<i64> {
        extent
            .checked_sub(count.checked_mul(self.min_pitch)?)?
            .checked_add(self.min_pitch - self.min_via_size)
            .map(|span| span / 2)
    }

    fn check(&self, via: usize) -> std::result::Result<(), RuleTableError> {
        for (field, value) in [
            ("min_via_size", self.min_via_size),
            ("min_pitch", self.min_pitch),
            ("min_border", self.min_border),
        ] {
            if value <= 0 {
                return Err(RuleTableError::NonPositive { via, field, value });
            }
        }
        if self.min_pitch < self.min_via_size {
            return Err(RuleTableError::PitchBelowSize {
                via,
                pitch: self.min_pitch,
                size: self.min_via_size,
            });
        }
        Ok(())
    }
}

/// Errors produced while building a [`RuleTable`].
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum RuleTableError {
    #[error("rule table must contain at least one via layer")]
    Empty,

    #[error("via{via}: {field} must be positive (got {value})")]
    NonPositive {
        via: usize,
        field: &'static str,
        value: i64,
    },

    #[error("via{via}: pitch {pitch} is smaller than the via size {size}")]
    PitchBelowSize { via: usize, pitch: i64, size: i64 },

    #[error("via layers must be numbered consecutively from 1: expected via{expected}, found via{found}")]
    NonContiguous { expected: usize, found: usize },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RuleRecord {
    via: usize,
    size: i64,
    pitch: i64,
    border: i64,
}

#[derive(Debug, Deserialize)]
struct RuleFile {
    rules: Vec<RuleRecord>,
}

/// An immutable, ordered set of via rules.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct RuleTable {
    rules: Vec<LayerRule>,
}

impl RuleTable {
    /// Creates a table from rules for via layers `1..=rules.len()`.
    pub fn new(rules: Vec<LayerRule>) -> Result<Self> {
        if rules.is_empty() {
            return Err(RuleTableError::Empty.into());
        }
        for (i, rule) in rules.iter().enumerate() {
            rule.check(i + 1)?;
        }
        Ok(Self { rules })
    }

    /// Parses a table from CSV with a `via,size,pitch,border` header.
    pub fn from_csv(csv: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(csv.as_bytes());
        let records = reader
            .deserialize::<RuleRecord>()
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Self::from_records(records)
    }

    /// Parses a table from TOML containing a `[[rules]]` array.
    ///
    /// ```toml
    /// [[rules]]
    /// via = 1
    /// size = 26
    /// pitch = 32
    /// border = 3
    /// ```
    pub fn from_toml(toml: &str) -> Result<Self> {
        let file: RuleFile = toml::from_str(toml)?;
        Self::from_records(file.rules)
    }

    /// Loads a table from a `.toml` or `.csv` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = crate::io::read_to_string(path)?;
        let table = match path.extension().and_then(|ext| ext.to_str()) {
            Some("csv") => Self::from_csv(&data),
            _ => Self::from_toml(&data),
        };
        with_err_context(table, || ErrorContext::LoadRules(path.to_path_buf()))
    }

    fn from_records(mut records: Vec<RuleRecord>) -> Result<Self> {
        records.sort_by_key(|r| r.via);
        for (i, record) in records.iter().enumerate() {
            if record.via != i + 1 {
                return Err(RuleTableError::NonContiguous {
                    expected: i + 1,
                    found: record.via,
                }
                .into());
            }
        }
        Self::new(
            records
                .into_iter()
                .map(|r| LayerRule::new(r.size, r.pitch, r.border))
                .collect(),
        )
    }

    /// Looks up the rule for via layer `via_layer`.
    pub fn rule_for(&self, via_layer: usize) -> Result<&LayerRule> {
        via_layer
            .checked_sub(1)
            .and_then(|i| self.rules.get(i))
            .ok_or_else(|| ErrorSource::UnknownLayer(via_layer).into())
    }

    /// The number of via layers in the table.
    #[inline]
    pub fn num_vias(&self) -> usize {
        self.rules.len()
    }

    /// The number of metal layers the table can connect.
    #[inline]
    pub fn num_metals(&self) -> usize {
        self.rules.len() + 1
    }

    /// Iterates over `(via_layer, rule)` pairs, lowest layer first.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &LayerRule)> {
        self.rules.iter().enumerate().map(|(i, r)| (i + 1, r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULES_CSV: &str = "via,size,pitch,border\n1,26,32,3\n2,26,40,5\n";

    #[test]
    fn lookup_is_one_based() {
        let table = RuleTable::from_csv(RULES_CSV).unwrap();
        assert_eq!(table.num_vias(), 2);
        assert_eq!(table.num_metals(), 3);
        assert_eq!(*table.rule_for(1).unwrap(), LayerRule::new(26, 32, 3));
        assert_eq!(*table.rule_for(2).unwrap(), LayerRule::new(26, 40, 5));
        for layer in [0, 3] {
            let err = table.rule_for(layer).unwrap_err();
            assert!(matches!(err.source(), ErrorSource::UnknownLayer(l) if *l == layer));
        }
    }

    #[test]
    fn toml_and_csv_agree() {
        let toml = r#"
            [[rules]]
            via = 2
            size = 26
            pitch = 40
            border = 5

            [[rules]]
            via = 1
            size = 26
            pitch = 32
            border = 3
        "#;
        assert_eq!(
            RuleTable::from_toml(toml).unwrap(),
            RuleTable::from_csv(RULES_CSV).unwrap()
        );
    }

    #[test]
    fn rejects_gaps_and_bad_values() {
        let err =
            RuleTable::from_csv("via,size,pitch,border\n1,26,32,3\n3,26,40,5\n").unwrap_err();
        assert!(matches!(
            err.source(),
            ErrorSource::RuleTable(RuleTableError::NonContiguous {
                expected: 2,
                found: 3
            })
        ));

        let err = RuleTable::new(vec![LayerRule::new(26, 0, 3)]).unwrap_err();
        assert!(matches!(
            err.source(),
            ErrorSource::RuleTable(RuleTableError::NonPositive {
                via: 1,
                field: "min_pitch",
                ..
            })
        ));

        let err = RuleTable::new(vec![LayerRule::new(26, 20, 3)]).unwrap_err();
        assert!(matches!(
            err.source(),
            ErrorSource::RuleTable(RuleTableError::PitchBelowSize { via: 1, .. })
        ));

        let err = RuleTable::new(Vec::new()).unwrap_err();
        assert!(matches!(
            err.source(),
            ErrorSource::RuleTable(RuleTableError::Empty)
        ));
    }

    #[test]
    fn builder_and_derived_extents() {
        let rule = LayerRule::builder()
            .min_via_size(26)
            .min_pitch(32)
            .min_border(3)
            .build()
            .unwrap();
        assert_eq!(rule.single_via_extent(), Some(32));
        assert_eq!(rule.two_via_extent(), Some(90));
        assert_eq!(rule.via_count(32), Some(1));
        assert_eq!(rule.via_count(64), Some(2));
        assert_eq!(rule.centering_offset(32, 1), Some(3));
    }

    #[test]
    fn derived_extents_report_overflow() {
        let rule = LayerRule::new(26, 40, 5);
        assert_eq!(rule.via_count(i64::MAX), None);
        assert_eq!(rule.via_count(i64::MAX - 4), Some((i64::MAX - 4 - 10 + 14) / 40));

        let huge = LayerRule::new(i64::MAX / 2, i64::MAX / 2, i64::MAX / 2);
        assert_eq!(huge.single_via_extent(), None);
        assert_eq!(huge.two_via_extent(), None);
        assert_eq!(rule.centering_offset(100, i64::MAX), None);
    }
}
