//! Kiln Asset - Layered asset resolution
//!
//! This crate locates assets across independently loaded backing sources:
//! loose directories and sealed pack archives, each exposing an indexed
//! database and a priority. A central `Resolver` arbitrates which source
//! owns each asset name and serves the bytes as either a fully buffered
//! blob or an incrementally read stream.

mod data;
mod database;
mod fs;
mod pack;
mod pack_format;
mod provider;
mod resolver;
mod types;

pub use data::{ResourceData, StaticData, StreamData};
pub use database::{AssetDatabase, AssetEntry};
pub use fs::DirectoryProvider;
pub use pack::PackProvider;
pub use pack_format::{read_header, PackEntry, PackHeader, PackWriter, PACK_MAGIC, PACK_VERSION};
pub use provider::ResourceProvider;
pub use resolver::Resolver;
pub use types::{metadata_from_toml, AssetType, MetaValue, Metadata};
