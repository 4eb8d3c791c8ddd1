//! Error types for Kiln

use thiserror::Error;

/// The main error type for Kiln operations
#[derive(Debug, Error)]
pub enum KilnError {
    /// No registered provider ever listed this asset name.
    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    /// A provider claimed the asset but its fetch produced no data
    /// (I/O failure, corrupted entry, file vanished after indexing).
    #[error("Unable to load asset: {0}")]
    AssetLoadFailed(String),

    /// The fetched data's variant (static vs stream) does not match
    /// the accessor the caller used.
    #[error("Asset {asset} was fetched as {actual} data, but {requested} data was requested")]
    ResourceTypeMismatch {
        asset: String,
        requested: &'static str,
        actual: &'static str,
    },

    /// A provider's backing source could not be opened at registration.
    #[error("Failed to register provider for \"{path}\": {reason}")]
    ProviderRegistrationFailed { path: String, reason: String },

    /// The resolver index has a winner for this name, but that provider's
    /// database has no record under the requested type. Distinct from
    /// `AssetNotFound`: the name is known, just under another type.
    #[error("Metadata missing for {name} ({kind})")]
    MetadataMissing { name: String, kind: String },

    #[error("Invalid pack archive: {0}")]
    InvalidPack(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),
}

/// Result type alias for Kiln operations
pub type Result<T> = std::result::Result<T, KilnError>;

impl From<toml::de::Error> for KilnError {
    fn from(err: toml::de::Error) -> Self {
        KilnError::TomlParseError(err.to_string())
    }
}
