//! Per-provider asset index

use crate::types::{AssetType, Metadata};
use std::collections::HashMap;

/// One indexed asset: where the provider keeps it, plus its metadata record.
#[derive(Debug, Clone)]
pub struct AssetEntry {
    /// Provider-local locator: a root-relative path for directory providers,
    /// the archive entry name for pack providers.
    pub path: String,
    pub meta: Metadata,
}

/// Index mapping (asset name, asset type) to a metadata record,
/// enumerable by type. Populated when the owning provider is constructed
/// and read-only afterwards.
#[derive(Debug, Default)]
pub struct AssetDatabase {
    tables: HashMap<AssetType, HashMap<String, AssetEntry>>,
}

impl AssetDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entry under (name, kind). A repeated name within the
    /// same type replaces the earlier entry.
    pub fn insert(&mut self, name: impl Into<String>, kind: AssetType, entry: AssetEntry) {
        self.tables.entry(kind).or_default().insert(name.into(), entry);
    }

    pub fn get(&self, name: &str, kind: AssetType) -> Option<&AssetEntry> {
        self.tables.get(&kind).and_then(|t| t.get(name))
    }

    pub fn contains(&self, name: &str, kind: AssetType) -> bool {
        self.get(name, kind).is_some()
    }

    /// All names under one type, sorted for deterministic listings.
    pub fn enumerate(&self, kind: AssetType) -> Vec<String> {
        let mut names: Vec<String> = self
            .tables
            .get(&kind)
            .map(|t| t.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    /// Every name in the database, across all types. A name indexed under
    /// two types appears twice.
    pub fn names(&self) -> Vec<String> {
        self.tables
            .values()
            .flat_map(|t| t.keys().cloned())
            .collect()
    }

    /// Iterate every (kind, name, entry) triple.
    pub fn iter(&self) -> impl Iterator<Item = (AssetType, &str, &AssetEntry)> {
        self.tables
            .iter()
            .flat_map(|(kind, t)| t.iter().map(|(name, e)| (*kind, name.as_str(), e)))
    }

    pub fn len(&self) -> usize {
        self.tables.values().map(|t| t.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MetaValue;

    fn entry(path: &str) -> AssetEntry {
        AssetEntry {
            path: path.to_string(),
            meta: Metadata::new(),
        }
    }

    #[test]
    fn test_insert_and_get() {
        let mut db = AssetDatabase::new();
        db.insert("sprite.png", AssetType::Texture, entry("sprite.png"));

        assert!(db.contains("sprite.png", AssetType::Texture));
        assert!(!db.contains("sprite.png", AssetType::Audio));
        assert_eq!(db.len(), 1);
    }

    #[test]
    fn test_enumerate_is_sorted_per_type() {
        let mut db = AssetDatabase::new();
        db.insert("b.png", AssetType::Texture, entry("b.png"));
        db.insert("a.png", AssetType::Texture, entry("a.png"));
        db.insert("theme.ogg", AssetType::Audio, entry("theme.ogg"));

        assert_eq!(db.enumerate(AssetType::Texture), vec!["a.png", "b.png"]);
        assert_eq!(db.enumerate(AssetType::Audio), vec!["theme.ogg"]);
        assert!(db.enumerate(AssetType::Font).is_empty());
    }

    #[test]
    fn test_names_spans_types() {
        let mut db = AssetDatabase::new();
        db.insert("sprite.png", AssetType::Texture, entry("sprite.png"));
        db.insert("settings", AssetType::Config, entry("settings.toml"));

        let mut names = db.names();
        names.sort();
        assert_eq!(names, vec!["settings", "sprite.png"]);
    }

    #[test]
    fn test_metadata_survives_insert() {
        let mut db = AssetDatabase::new();
        let mut meta = Metadata::new();
        meta.insert("width".to_string(), MetaValue::Int(64));
        db.insert(
            "sprite.png",
            AssetType::Texture,
            AssetEntry {
                path: "sprite.png".to_string(),
                meta,
            },
        );

        let entry = db.get("sprite.png", AssetType::Texture).unwrap();
        assert_eq!(entry.meta.get("width"), Some(&MetaValue::Int(64)));
    }
}
