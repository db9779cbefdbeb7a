use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Column headers of the tabular output, in order.
pub const COLUMNS: [&str; 4] = [
    "especie_cientifica",
    "nombre_comun",
    "uso_precolombino",
    "archivo_origen",
];

/// A species/use pair produced from one chunk, before the source document is known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesUse {
    pub species: String,
    pub common_name: String,
    pub usage: String,
}

impl SpeciesUse {
    #[must_use]
    pub fn new(species: &str, common_name: &str, usage: &str) -> Self {
        Self {
            species: species.trim().to_string(),
            common_name: common_name.trim().to_string(),
            usage: usage.trim().to_string(),
        }
    }

    #[must_use]
    pub fn with_source(self, source: &str) -> CanonicalRecord {
        CanonicalRecord {
            species: self.species,
            common_name: self.common_name,
            usage: self.usage,
            source: source.to_string(),
        }
    }
}

/// One output row. Species and usage are never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanonicalRecord {
    #[serde(rename = "especie_cientifica")]
    pub species: String,
    #[serde(rename = "nombre_comun")]
    pub common_name: String,
    #[serde(rename = "uso_precolombino")]
    pub usage: String,
    #[serde(rename = "archivo_origen")]
    pub source: String,
}

impl CanonicalRecord {
    pub fn columns(&self) -> [&str; 4] {
        [&self.species, &self.common_name, &self.usage, &self.source]
    }
}

/// Records accumulated over a run. Uniqueness is only enforced by [`ResultSet::deduplicated`].
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    records: Vec<CanonicalRecord>,
}

impl ResultSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = CanonicalRecord>) {
        self.records.extend(records);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[CanonicalRecord] {
        &self.records
    }

    pub fn count_for(&self, source: &str) -> usize {
        self.records.iter().filter(|r| r.source == source).count()
    }

    /// Drops repeated rows, keeping the first occurrence of each.
    #[must_use]
    pub fn deduplicated(self) -> Vec<CanonicalRecord> {
        let mut seen = HashSet::new();
        self.records
            .into_iter()
            .filter(|r| seen.insert(r.clone()))
            .collect()
    }
}
