//! Pack building command

use anyhow::Result;
use kiln_asset::{DirectoryProvider, PackWriter, ResourceProvider};
use std::fs;
use std::path::Path;

/// Scan `input` the same way the directory provider does (type inference,
/// metadata sidecars) and seal everything into a pack archive at `output`.
pub fn pack(input: &Path, output: &Path, key: Option<&str>) -> Result<()> {
    let provider = DirectoryProvider::new(input, 0)?;

    // Stable entry order keeps pack builds reproducible.
    let mut items: Vec<_> = provider
        .database()
        .iter()
        .map(|(kind, name, entry)| (name.to_string(), kind, entry.clone()))
        .collect();
    items.sort_by(|a, b| a.0.cmp(&b.0));

    let mut writer = PackWriter::new(key);
    for (name, kind, entry) in items {
        let bytes = fs::read(provider.root().join(&entry.path))?;
        writer.add(name, kind, entry.meta, bytes);
    }

    writer.write_file(output)?;
    println!("Packed {} assets into {}", writer.len(), output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_asset::{AssetType, MetaValue, Resolver};

    #[test]
    fn test_pack_roundtrips_through_resolver() {
        let dir = tempfile::tempdir().unwrap();

        let assets = dir.path().join("assets");
        fs::create_dir(&assets).unwrap();
        fs::write(assets.join("hero.png"), b"hero-bytes").unwrap();
        fs::write(assets.join("hero.png.meta.toml"), "width = 32\n").unwrap();

        let packed = dir.path().join("sealed.kpak");
        pack(&assets, &packed, Some("hunter2")).unwrap();

        let mut resolver = Resolver::new();
        resolver.add_pack(&packed, Some("hunter2"), 0, false, false).unwrap();

        let data = resolver.get_static("hero.png", AssetType::Texture).unwrap();
        assert_eq!(data.bytes(), b"hero-bytes");
        let meta = resolver.metadata("hero.png", AssetType::Texture).unwrap();
        assert_eq!(meta.get("width"), Some(&MetaValue::Int(32)));
    }
}
