// src/shortgame/table.rs
//! Immutable short-game modifier table, keyed by the four condition labels.

use bevy::log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::ModifierTableError;

pub const NO_MATCH_RATIONALE: &str = "no matching condition";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModifierRecord {
    /// Strokes added to (or removed from) the base surface cost.
    pub modifier: f64,
    /// 1 (routine) .. 10 (very hard).
    #[serde(default)]
    pub difficulty: u8,
    #[serde(default)]
    pub rationale: String,
}

impl ModifierRecord {
    pub fn no_match() -> Self {
        Self { modifier: 0.0, difficulty: 0, rationale: NO_MATCH_RATIONALE.to_string() }
    }
}

/// On-disk row.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModifierEntry {
    pub key: String,
    pub modifier: f64,
    #[serde(default)]
    pub difficulty: u8,
    #[serde(default)]
    pub rationale: String,
}

/// Result of a lookup: the record and the key spelling that matched.
#[derive(Clone, Debug, PartialEq)]
pub struct ModifierLookup {
    pub record: ModifierRecord,
    pub matched_key: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct ModifierTable {
    records: HashMap<String, ModifierRecord>,
}

impl ModifierTable {
    pub fn empty() -> Self { Self::default() }

    #[inline]
    pub fn len(&self) -> usize { self.records.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    pub fn from_entries(entries: Vec<ModifierEntry>) -> Result<Self, ModifierTableError> {
        let mut first_seen: HashMap<String, usize> = HashMap::with_capacity(entries.len());
        let mut records = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.into_iter().enumerate() {
            if let Some(&first) = first_seen.get(&entry.key) {
                return Err(ModifierTableError::DuplicateKey { key: entry.key, first, second: i });
            }
            first_seen.insert(entry.key.clone(), i);
            let ModifierEntry { key, modifier, difficulty, rationale } = entry;
            records.insert(key, ModifierRecord { modifier, difficulty, rationale });
        }
        Ok(Self { records })
    }

    pub fn from_ron_bytes(bytes: &[u8]) -> Result<Self, ModifierTableError> {
        let entries: Vec<ModifierEntry> =
            ron::de::from_bytes(bytes).map_err(|e| ModifierTableError::Ron(e.to_string()))?;
        Self::from_entries(entries)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModifierTableError> {
        let bytes = std::fs::read(path)?;
        Self::from_ron_bytes(&bytes)
    }

    /// Load, or an empty table (every lookup falls back) on any failure.
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(table) => {
                info!("Short-game modifiers: {} entries from {}", table.len(), path.display());
                table
            }
            Err(e) => {
                warn!("Short-game modifiers unavailable ({}): {} - using zero modifiers", path.display(), e);
                Self::empty()
            }
        }
    }

    /// Exact key first, then three whitespace spellings seen in source
    /// tables, then the zero-modifier fallback.
    pub fn lookup(&self, key: &str) -> ModifierLookup {
        let compact = key.split(',').map(str::trim).collect::<Vec<_>>();
        let candidates = [
            key.to_string(),
            compact.join(","),
            compact.join(" , "),
            format!("{key} "),
        ];
        candidates
            .into_iter()
            .find_map(|k| self.records.get(&k).map(|r| ModifierLookup { record: r.clone(), matched_key: Some(k) }))
            .unwrap_or_else(|| ModifierLookup { record: ModifierRecord::no_match(), matched_key: None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = r#"[
        (key: "Flat, Flat, Flat, >45%", modifier: -0.05, difficulty: 1, rationale: "routine chip"),
        (key: "Downhill,Downhill,Downhill,<20%", modifier: 0.4, difficulty: 9, rationale: "nothing to stop it"),
    ]"#;

    #[test]
    fn exact_variant_and_fallback() {
        let t = ModifierTable::from_ron_bytes(TABLE.as_bytes()).unwrap();
        assert_eq!(t.len(), 2);

        let exact = t.lookup("Flat, Flat, Flat, >45%");
        assert_eq!(exact.record.modifier, -0.05);
        assert_eq!(exact.matched_key.as_deref(), Some("Flat, Flat, Flat, >45%"));

        let variant = t.lookup("Downhill, Downhill, Downhill, <20%");
        assert_eq!(variant.record.difficulty, 9);
        assert_eq!(variant.matched_key.as_deref(), Some("Downhill,Downhill,Downhill,<20%"));

        let miss = t.lookup("Sidehill, Flat, Flat, <20%");
        assert_eq!(miss.record, ModifierRecord::no_match());
        assert!(miss.matched_key.is_none());
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let text = r#"[(key: "a", modifier: 0.0), (key: "a", modifier: 1.0)]"#;
        assert!(matches!(
            ModifierTable::from_ron_bytes(text.as_bytes()),
            Err(ModifierTableError::DuplicateKey { first: 0, second: 1, .. })
        ));
    }

    #[test]
    fn missing_file_degrades_to_empty() {
        let t = ModifierTable::load_or_empty("does/not/exist.ron");
        assert!(t.is_empty());
        assert_eq!(t.lookup("Flat, Flat, Flat, <20%").record.rationale, NO_MATCH_RATIONALE);
    }
}
