//! Asset type and metadata definitions

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Kinds of assets the resolver can manage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    Texture,
    Audio,
    Font,
    Config,
    Binary,
}

impl AssetType {
    /// Every asset type, in declaration order
    pub const ALL: [AssetType; 5] = [
        AssetType::Texture,
        AssetType::Audio,
        AssetType::Font,
        AssetType::Config,
        AssetType::Binary,
    ];

    /// Infer an asset type from a file extension (lowercase, without the dot).
    /// Unrecognized extensions fall back to `Binary`.
    pub fn from_extension(ext: &str) -> AssetType {
        match ext {
            "png" | "jpg" | "jpeg" | "tga" | "bmp" => AssetType::Texture,
            "ogg" | "wav" | "mp3" | "flac" => AssetType::Audio,
            "ttf" | "otf" => AssetType::Font,
            "toml" | "json" | "ron" | "ini" | "cfg" => AssetType::Config,
            _ => AssetType::Binary,
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetType::Texture => write!(f, "texture"),
            AssetType::Audio => write!(f, "audio"),
            AssetType::Font => write!(f, "font"),
            AssetType::Config => write!(f, "config"),
            AssetType::Binary => write!(f, "binary"),
        }
    }
}

impl FromStr for AssetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "texture" => Ok(AssetType::Texture),
            "audio" => Ok(AssetType::Audio),
            "font" => Ok(AssetType::Font),
            "config" => Ok(AssetType::Config),
            "binary" => Ok(AssetType::Binary),
            _ => Err(format!(
                "Unknown asset type '{}'. Available: texture, audio, font, config, binary",
                s
            )),
        }
    }
}

/// A scalar metadata value.
///
/// A closed enum rather than `toml::Value` so the same record serializes
/// through the bincode pack header, which cannot carry self-describing
/// values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MetaValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl MetaValue {
    /// Convert a TOML value, if it is a scalar. Tables, arrays and
    /// datetimes have no metadata representation and yield `None`.
    pub fn from_toml(value: &toml::Value) -> Option<MetaValue> {
        match value {
            toml::Value::Boolean(b) => Some(MetaValue::Bool(*b)),
            toml::Value::Integer(i) => Some(MetaValue::Int(*i)),
            toml::Value::Float(f) => Some(MetaValue::Float(*f)),
            toml::Value::String(s) => Some(MetaValue::Str(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaValue::Bool(b) => write!(f, "{}", b),
            MetaValue::Int(i) => write!(f, "{}", i),
            MetaValue::Float(v) => write!(f, "{}", v),
            MetaValue::Str(s) => write!(f, "{}", s),
        }
    }
}

/// Open string-keyed mapping of scalar values attached to one asset.
/// Produced by providers, read-only everywhere else.
pub type Metadata = HashMap<String, MetaValue>;

/// Build a metadata record from a TOML table, keeping scalar entries only.
pub fn metadata_from_toml(table: &toml::value::Table) -> Metadata {
    table
        .iter()
        .filter_map(|(k, v)| MetaValue::from_toml(v).map(|v| (k.clone(), v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_type_from_extension() {
        assert_eq!(AssetType::from_extension("png"), AssetType::Texture);
        assert_eq!(AssetType::from_extension("ogg"), AssetType::Audio);
        assert_eq!(AssetType::from_extension("ttf"), AssetType::Font);
        assert_eq!(AssetType::from_extension("toml"), AssetType::Config);
        assert_eq!(AssetType::from_extension("dat"), AssetType::Binary);
    }

    #[test]
    fn test_asset_type_roundtrip_str() {
        for kind in AssetType::ALL {
            let parsed: AssetType = kind.to_string().parse().unwrap();
            assert_eq!(parsed, kind);
        }
        assert!("mesh".parse::<AssetType>().is_err());
    }

    #[test]
    fn test_metadata_from_toml_keeps_scalars() {
        let table: toml::value::Table = toml::from_str(
            r#"
width = 64
scale = 1.5
premultiplied = true
group = "ui"

[nested]
ignored = 1
"#,
        )
        .unwrap();

        let meta = metadata_from_toml(&table);
        assert_eq!(meta.get("width"), Some(&MetaValue::Int(64)));
        assert_eq!(meta.get("scale"), Some(&MetaValue::Float(1.5)));
        assert_eq!(meta.get("premultiplied"), Some(&MetaValue::Bool(true)));
        assert_eq!(meta.get("group"), Some(&MetaValue::Str("ui".to_string())));
        assert!(!meta.contains_key("nested"));
    }
}
