//! Resource provider trait

use crate::data::ResourceData;
use crate::database::AssetDatabase;
use crate::types::AssetType;

/// Trait implemented by each backing asset source (directory, pack archive).
///
/// A provider owns an `AssetDatabase` built at construction time and a
/// priority used by the resolver to arbitrate overlapping names.
pub trait ResourceProvider: Send + Sync {
    /// Provider kind for diagnostics (e.g. "directory", "pack")
    fn name(&self) -> &str;

    /// Read-only view of this provider's asset index
    fn database(&self) -> &AssetDatabase;

    /// Arbitration priority. Higher wins; ties keep the first-registered
    /// provider.
    fn priority(&self) -> i32;

    /// Produce the asset's bytes, buffered (`want_stream == false`) or as a
    /// live stream. `None` means the provider claims the name in its
    /// database but cannot deliver bytes right now (corrupted entry, file
    /// removed after indexing); the resolver reports that as a load failure.
    fn fetch(&self, name: &str, kind: AssetType, want_stream: bool) -> Option<ResourceData>;

    /// Drop any provider-local cached bytes or handles. Idempotent; never
    /// touches the database.
    fn purge(&mut self) {}
}
