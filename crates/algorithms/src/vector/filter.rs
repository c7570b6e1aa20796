//! Region selection by attribute value
//!
//! Boundary files often carry regions a map does not want (overseas
//! territories, far-off islands). A [`RegionFilter`] removes records whose
//! attribute matches a `FIELD=VALUE` condition, or keeps only the matching
//! ones, before any geometry work happens.

use geoslim_core::{BoundaryLayer, Error, Feature, Result};
use shapefile::dbase::FieldValue;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// A `FIELD=VALUE` condition on one attribute
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeMatch {
    pub field: String,
    pub value: String,
}

impl AttributeMatch {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Whether the feature's attribute equals the value.
    ///
    /// Text is compared after trimming the dBase padding; numbers compare
    /// numerically, so `PRUID=62` matches both `"62"` and `62.0`.
    pub fn matches(&self, feature: &Feature) -> bool {
        let Some(text) = feature.get_property(&self.field).and_then(field_text) else {
            return false;
        };
        match (text.parse::<f64>(), self.value.parse::<f64>()) {
            (Ok(a), Ok(b)) => a == b,
            _ => text == self.value,
        }
    }
}

impl FromStr for AttributeMatch {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once('=') {
            Some((field, value)) if !field.trim().is_empty() && !value.trim().is_empty() => {
                Ok(Self::new(field.trim(), value.trim()))
            }
            _ => Err(Error::InvalidParameter {
                name: "filter",
                value: s.to_string(),
                reason: "expected FIELD=VALUE".to_string(),
            }),
        }
    }
}

impl fmt::Display for AttributeMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.field, self.value)
    }
}

fn field_text(value: &FieldValue) -> Option<String> {
    match value {
        FieldValue::Character(Some(s)) => Some(s.trim().to_string()),
        FieldValue::Memo(s) => Some(s.trim().to_string()),
        FieldValue::Numeric(Some(n)) => Some(n.to_string()),
        FieldValue::Float(Some(n)) => Some(n.to_string()),
        FieldValue::Integer(n) => Some(n.to_string()),
        FieldValue::Double(n) => Some(n.to_string()),
        FieldValue::Logical(Some(b)) => Some(if *b { "T" } else { "F" }.to_string()),
        _ => None,
    }
}

/// Which records of a layer to process
#[derive(Debug, Clone, Default)]
pub struct RegionFilter {
    /// Records matching any of these are removed
    pub drop: Vec<AttributeMatch>,
    /// When not empty, only records matching one of these are kept
    pub keep: Vec<AttributeMatch>,
}

impl RegionFilter {
    pub fn is_empty(&self) -> bool {
        self.drop.is_empty() && self.keep.is_empty()
    }

    fn retains(&self, feature: &Feature) -> bool {
        let kept = self.keep.is_empty() || self.keep.iter().any(|m| m.matches(feature));
        kept && !self.drop.iter().any(|m| m.matches(feature))
    }

    /// Remove the records the filter excludes. Returns the filtered layer
    /// and the number of records removed.
    ///
    /// Field names are matched case-insensitively against the layer schema;
    /// an unknown field is an error rather than a filter that never matches.
    pub fn apply(&self, mut layer: BoundaryLayer) -> Result<(BoundaryLayer, usize)> {
        if self.is_empty() {
            return Ok((layer, 0));
        }
        let resolved = RegionFilter {
            drop: self.resolve(&layer, &self.drop)?,
            keep: self.resolve(&layer, &self.keep)?,
        };

        let before = layer.features.len();
        layer.features.retain(|feature| resolved.retains(feature));
        let removed = before - layer.features.len();
        debug!("{}: filter removed {} of {} records", layer.name, removed, before);
        Ok((layer, removed))
    }

    fn resolve(&self, layer: &BoundaryLayer, matches: &[AttributeMatch]) -> Result<Vec<AttributeMatch>> {
        let names = layer.field_names();
        matches
            .iter()
            .map(|m| {
                names
                    .iter()
                    .find(|name| name.eq_ignore_ascii_case(&m.field))
                    .map(|name| AttributeMatch::new(*name, m.value.clone()))
                    .ok_or_else(|| Error::InvalidParameter {
                        name: "filter",
                        value: m.to_string(),
                        reason: format!("no field '{}' in {}; fields: {}", m.field, layer.name, names.join(", ")),
                    })
            })
            .collect()
    }
}
