//! Directory-backed resource provider

use crate::data::{ResourceData, StaticData, StreamData};
use crate::database::{AssetDatabase, AssetEntry};
use crate::provider::ResourceProvider;
use crate::types::{metadata_from_toml, AssetType, Metadata};
use kiln_core::{KilnError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Suffix marking a metadata sidecar file (`hero.png.meta.toml` describes
/// `hero.png`). Sidecars are never indexed as assets themselves.
const SIDECAR_SUFFIX: &str = ".meta.toml";

/// Serves loose assets from a directory tree.
///
/// Asset names are root-relative paths with `/` separators; the type is
/// inferred from the file extension. An optional `<file>.meta.toml` sidecar
/// of scalar values supplies the asset's metadata record.
#[derive(Debug)]
pub struct DirectoryProvider {
    root: PathBuf,
    priority: i32,
    database: AssetDatabase,
}

impl DirectoryProvider {
    /// Scan `root` and build the provider's database. Fails if `root` is
    /// not an existing directory.
    pub fn new<P: AsRef<Path>>(root: P, priority: i32) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(KilnError::ProviderRegistrationFailed {
                path: root.display().to_string(),
                reason: "not a directory".to_string(),
            });
        }

        let mut database = AssetDatabase::new();
        scan_directory(&mut database, root, "")?;

        Ok(Self {
            root: root.to_path_buf(),
            priority,
            database,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn scan_directory(database: &mut AssetDatabase, dir: &Path, prefix: &str) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        let name = if prefix.is_empty() {
            file_name.to_string()
        } else {
            format!("{}/{}", prefix, file_name)
        };

        if path.is_dir() {
            scan_directory(database, &path, &name)?;
        } else if !file_name.ends_with(SIDECAR_SUFFIX) {
            let kind = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| AssetType::from_extension(&e.to_ascii_lowercase()))
                .unwrap_or(AssetType::Binary);
            let meta = load_sidecar(&path)?;
            database.insert(
                name.clone(),
                kind,
                AssetEntry { path: name, meta },
            );
        }
    }
    Ok(())
}

fn load_sidecar(asset_path: &Path) -> Result<Metadata> {
    let mut sidecar = asset_path.as_os_str().to_owned();
    sidecar.push(SIDECAR_SUFFIX);
    let sidecar = PathBuf::from(sidecar);
    if !sidecar.exists() {
        return Ok(Metadata::new());
    }

    let content = fs::read_to_string(&sidecar)?;
    let table: toml::value::Table = toml::from_str(&content).map_err(|e| {
        KilnError::TomlParseError(format!("{}: {}", sidecar.display(), e))
    })?;
    Ok(metadata_from_toml(&table))
}

impl ResourceProvider for DirectoryProvider {
    fn name(&self) -> &str {
        "directory"
    }

    fn database(&self) -> &AssetDatabase {
        &self.database
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn fetch(&self, name: &str, kind: AssetType, want_stream: bool) -> Option<ResourceData> {
        let entry = self.database.get(name, kind)?;
        let path = self.root.join(&entry.path);

        if want_stream {
            let file = fs::File::open(&path).ok()?;
            let len = file.metadata().ok()?.len();
            Some(ResourceData::Stream(StreamData::new(len, Box::new(file))))
        } else {
            let bytes = fs::read(&path).ok()?;
            Some(ResourceData::Static(StaticData::new(bytes)))
        }
    }

    // Stateless; nothing to purge.
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MetaValue;
    use std::io::Read;

    fn sample_tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sprites")).unwrap();
        fs::write(dir.path().join("sprites/hero.png"), b"png-bytes").unwrap();
        fs::write(
            dir.path().join("sprites/hero.png.meta.toml"),
            "width = 32\ngroup = \"player\"\n",
        )
        .unwrap();
        fs::write(dir.path().join("theme.ogg"), b"ogg-bytes").unwrap();
        dir
    }

    #[test]
    fn test_scan_indexes_by_type_and_skips_sidecars() {
        let dir = sample_tree();
        let provider = DirectoryProvider::new(dir.path(), 0).unwrap();

        let db = provider.database();
        assert_eq!(db.enumerate(AssetType::Texture), vec!["sprites/hero.png"]);
        assert_eq!(db.enumerate(AssetType::Audio), vec!["theme.ogg"]);
        assert_eq!(db.len(), 2);
    }

    #[test]
    fn test_sidecar_metadata() {
        let dir = sample_tree();
        let provider = DirectoryProvider::new(dir.path(), 0).unwrap();

        let entry = provider
            .database()
            .get("sprites/hero.png", AssetType::Texture)
            .unwrap();
        assert_eq!(entry.meta.get("width"), Some(&MetaValue::Int(32)));
        assert_eq!(
            entry.meta.get("group"),
            Some(&MetaValue::Str("player".to_string()))
        );
    }

    #[test]
    fn test_fetch_static_and_stream() {
        let dir = sample_tree();
        let provider = DirectoryProvider::new(dir.path(), 0).unwrap();

        match provider.fetch("sprites/hero.png", AssetType::Texture, false) {
            Some(ResourceData::Static(data)) => assert_eq!(data.bytes(), b"png-bytes"),
            other => panic!("expected static data, got {:?}", other),
        }

        match provider.fetch("theme.ogg", AssetType::Audio, true) {
            Some(ResourceData::Stream(mut stream)) => {
                assert_eq!(stream.len(), 9);
                let mut buf = Vec::new();
                stream.read_to_end(&mut buf).unwrap();
                assert_eq!(buf, b"ogg-bytes");
            }
            other => panic!("expected stream data, got {:?}", other),
        }
    }

    #[test]
    fn test_fetch_unknown_or_vanished_is_none() {
        let dir = sample_tree();
        let provider = DirectoryProvider::new(dir.path(), 0).unwrap();

        assert!(provider.fetch("missing.png", AssetType::Texture, false).is_none());

        // Indexed, then removed from disk: claims membership, cannot deliver.
        fs::remove_file(dir.path().join("theme.ogg")).unwrap();
        assert!(provider.fetch("theme.ogg", AssetType::Audio, false).is_none());
    }

    #[test]
    fn test_new_rejects_missing_root() {
        let err = DirectoryProvider::new("/nonexistent/kiln-test-root", 0).unwrap_err();
        assert!(matches!(err, KilnError::ProviderRegistrationFailed { .. }));
    }
}
