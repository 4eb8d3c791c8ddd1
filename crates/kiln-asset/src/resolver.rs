//! Central asset registry
//!
//! Providers register once, at startup or incrementally; the resolver folds
//! every provider's database into a single name-to-provider index using
//! priority arbitration, then dispatches fetch, purge, enumerate and
//! metadata calls to the winning provider.
//!
//! Registration and purge take `&mut self`, lookups take `&self`, so the
//! mandated serialization between index mutation and concurrent reads is
//! enforced by the borrow checker. Callers that keep registering after
//! queries begin wrap the resolver in their own lock; there is no global
//! instance.

use crate::data::{ResourceData, StaticData, StreamData};
use crate::fs::DirectoryProvider;
use crate::pack::PackProvider;
use crate::provider::ResourceProvider;
use crate::types::{AssetType, Metadata};
use kiln_core::{KilnError, Result};
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

/// Aggregated registry over every backing asset source.
///
/// Providers live in an append-only list; the index maps each asset name to
/// the list position of its winning provider. Providers are never removed,
/// and an index entry is only ever overwritten by a strictly
/// higher-priority registration.
#[derive(Default)]
pub struct Resolver {
    providers: Vec<Box<dyn ResourceProvider>>,
    index: HashMap<String, usize>,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider. For every name in its database, the provider
    /// becomes the winner if no winner exists yet or its priority is
    /// strictly higher than the current winner's; on a tie the earlier
    /// registration is kept. The provider is retained even if it wins
    /// nothing, so broadcast purge and enumerate still reach it.
    pub fn register(&mut self, provider: Box<dyn ResourceProvider>) {
        let slot = self.providers.len();
        let priority = provider.priority();
        for name in provider.database().names() {
            match self.index.get(&name).copied() {
                Some(winner) if self.providers[winner].priority() >= priority => {}
                _ => {
                    self.index.insert(name, slot);
                }
            }
        }
        self.providers.push(provider);
    }

    /// Scan a directory and register it as a provider.
    pub fn add_directory<P: AsRef<Path>>(&mut self, path: P, priority: i32) -> Result<()> {
        let provider = DirectoryProvider::new(path, priority)?;
        self.register(Box::new(provider));
        Ok(())
    }

    /// Open a pack archive and register it as a provider.
    ///
    /// With `allow_failure`, an archive that cannot be opened or validated
    /// degrades to a logged warning and the provider is simply not added;
    /// without it the failure propagates as `ProviderRegistrationFailed`.
    pub fn add_pack<P: AsRef<Path>>(
        &mut self,
        path: P,
        key: Option<&str>,
        priority: i32,
        preload: bool,
        allow_failure: bool,
    ) -> Result<()> {
        let path = path.as_ref();
        match PackProvider::new(path, key, priority, preload) {
            Ok(provider) => {
                self.register(Box::new(provider));
                Ok(())
            }
            Err(err) if allow_failure => {
                warn!(path = %path.display(), error = %err, "resource pack not found, skipping");
                Ok(())
            }
            Err(err) => Err(KilnError::ProviderRegistrationFailed {
                path: path.display().to_string(),
                reason: err.to_string(),
            }),
        }
    }

    /// Fetch an asset from its winning provider, as buffered or streamed
    /// data per `want_stream`.
    ///
    /// `AssetNotFound` if no provider's database lists the name;
    /// `AssetLoadFailed` if the winner claims the name but produces no
    /// bytes.
    pub fn resolve(
        &self,
        name: &str,
        kind: AssetType,
        want_stream: bool,
    ) -> Result<ResourceData> {
        let winner = *self
            .index
            .get(name)
            .ok_or_else(|| KilnError::AssetNotFound(name.to_string()))?;
        self.providers[winner]
            .fetch(name, kind, want_stream)
            .ok_or_else(|| KilnError::AssetLoadFailed(name.to_string()))
    }

    /// Fetch as a fully buffered blob; a stream-only result is dropped
    /// (releasing its handle) and reported as `ResourceTypeMismatch`.
    pub fn get_static(&self, name: &str, kind: AssetType) -> Result<StaticData> {
        match self.resolve(name, kind, false)? {
            ResourceData::Static(data) => Ok(data),
            data @ ResourceData::Stream(_) => {
                let actual = data.variant();
                drop(data);
                Err(KilnError::ResourceTypeMismatch {
                    asset: name.to_string(),
                    requested: "static",
                    actual,
                })
            }
        }
    }

    /// Fetch as an incrementally read stream; symmetric to `get_static`.
    pub fn get_stream(&self, name: &str, kind: AssetType) -> Result<StreamData> {
        match self.resolve(name, kind, true)? {
            ResourceData::Stream(data) => Ok(data),
            data @ ResourceData::Static(_) => {
                let actual = data.variant();
                drop(data);
                Err(KilnError::ResourceTypeMismatch {
                    asset: name.to_string(),
                    requested: "stream",
                    actual,
                })
            }
        }
    }

    /// Invalidate cached bytes for an asset. A known name purges only its
    /// winning provider; an unknown name (possibly new since the index was
    /// built) purges every registered provider. Never fails.
    pub fn purge(&mut self, name: &str, _kind: AssetType) {
        match self.index.get(name) {
            Some(&winner) => self.providers[winner].purge(),
            None => {
                for provider in &mut self.providers {
                    provider.purge();
                }
            }
        }
    }

    /// List every provider's assets of one type, concatenated.
    ///
    /// This is a raw union in registration order: a name shadowed for
    /// fetches still appears once per provider that lists it, so duplicates
    /// are possible and the result does not reflect resolution priority.
    pub fn enumerate(&self, kind: AssetType) -> Vec<String> {
        let mut result = Vec::new();
        for provider in &self.providers {
            result.extend(provider.database().enumerate(kind));
        }
        result
    }

    /// Whether the index has a winner for `name`. Does not probe providers;
    /// a winner can still fail at fetch time.
    pub fn exists(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Metadata record for (name, kind) from the winning provider's
    /// database. `AssetNotFound` if no winner exists; `MetadataMissing` if
    /// the winner's database has no record under this type (the name won
    /// its slot under a different type).
    pub fn metadata(&self, name: &str, kind: AssetType) -> Result<&Metadata> {
        let winner = *self
            .index
            .get(name)
            .ok_or_else(|| KilnError::AssetNotFound(name.to_string()))?;
        self.providers[winner]
            .database()
            .get(name, kind)
            .map(|entry| &entry.meta)
            .ok_or_else(|| KilnError::MetadataMissing {
                name: name.to_string(),
                kind: kind.to_string(),
            })
    }

    /// Number of registered providers.
    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }
}
