// src/schema/types.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// Positional layout of the survey export.
///
/// The export starts with `metadata_columns` non-survey columns, followed by the
/// general questions (`SQ`), then the business (`BQ`), data-sourcing (`DQ`) and
/// modeling (`MQ`) batteries, in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnLayout {
    pub metadata_columns: usize,
    pub general_questions: usize,
    pub business_questions: usize,
    pub sourcing_questions: usize,
    pub modeling_questions: usize,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            metadata_columns: 1,
            general_questions: 18,
            business_questions: 5,
            sourcing_questions: 5,
            modeling_questions: 5,
        }
    }
}

impl ColumnLayout {
    /// Total header count the export must have.
    pub fn width(&self) -> usize {
        self.metadata_columns + self.encoded_width()
    }

    /// Number of columns that receive an encoded key.
    pub fn encoded_width(&self) -> usize {
        self.families().iter().map(|(_, n)| n).sum()
    }

    pub fn battery_questions(&self, battery: Battery) -> usize {
        match battery {
            Battery::Business => self.business_questions,
            Battery::Sourcing => self.sourcing_questions,
            Battery::Modeling => self.modeling_questions,
        }
    }

    /// Key prefix and column count of each family, in header order.
    pub fn families(&self) -> [(&'static str, usize); 4] {
        [
            ("SQ", self.general_questions),
            (Battery::Business.prefix(), self.business_questions),
            (Battery::Sourcing.prefix(), self.sourcing_questions),
            (Battery::Modeling.prefix(), self.modeling_questions),
        ]
    }
}

/// One of the three objective-question batteries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Battery {
    Business,
    Sourcing,
    Modeling,
}

impl Battery {
    pub const ALL: [Battery; 3] = [Battery::Business, Battery::Sourcing, Battery::Modeling];

    pub fn prefix(self) -> &'static str {
        match self {
            Battery::Business => "BQ",
            Battery::Sourcing => "DQ",
            Battery::Modeling => "MQ",
        }
    }

    /// Encoded column name of question `n` (1-based).
    pub fn column(self, n: usize) -> String {
        format!("{}{}", self.prefix(), n)
    }
}

/// An encoded key and the raw header it replaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub key: String,
    pub original: String,
}

/// Ordered encoded-key → original-header map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnNameMap {
    entries: Vec<ColumnMapping>,
}

impl ColumnNameMap {
    pub(crate) fn from_entries(entries: Vec<ColumnMapping>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnMapping> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|m| m.key.as_str())
    }

    /// Original header for an encoded key.
    pub fn original(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|m| m.key == key)
            .map(|m| m.original.as_str())
    }
}

impl fmt::Display for ColumnNameMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for m in &self.entries {
            writeln!(f, "  {:<5} <- {}", m.key, m.original)?;
        }
        Ok(())
    }
}
