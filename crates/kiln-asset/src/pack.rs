//! Pack-backed resource provider

use crate::data::{ResourceData, StaticData, StreamData};
use crate::database::{AssetDatabase, AssetEntry};
use crate::pack_format::{read_header, Keystream, PackEntry};
use crate::provider::ResourceProvider;
use crate::types::AssetType;
use kiln_core::Result;
use std::collections::HashMap;
use std::fs;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Serves assets out of a sealed pack archive.
///
/// The database comes from the pack header, validated at construction.
/// Fetches read the entry's byte range lazily; `preload` instead
/// materializes every entry into an in-memory cache up front. `purge`
/// drops that cache, so later fetches fall back to lazy range reads.
#[derive(Debug)]
pub struct PackProvider {
    path: PathBuf,
    key: Option<String>,
    priority: i32,
    payload_base: u64,
    database: AssetDatabase,
    entries: HashMap<AssetType, HashMap<String, PackEntry>>,
    cache: HashMap<AssetType, HashMap<String, Arc<[u8]>>>,
}

impl PackProvider {
    /// Open `path`, decode and validate its header, and build the
    /// provider's database. With `preload`, also read every payload into
    /// memory; a payload that cannot be read fails construction.
    pub fn new<P: AsRef<Path>>(
        path: P,
        key: Option<&str>,
        priority: i32,
        preload: bool,
    ) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = fs::File::open(&path)?;
        let mut reader = BufReader::new(file);
        let header = read_header(&mut reader, key)?;

        let mut database = AssetDatabase::new();
        let mut entries: HashMap<AssetType, HashMap<String, PackEntry>> = HashMap::new();
        for entry in header.entries {
            database.insert(
                entry.name.clone(),
                entry.kind,
                AssetEntry {
                    path: entry.name.clone(),
                    meta: entry.meta.clone(),
                },
            );
            entries
                .entry(entry.kind)
                .or_default()
                .insert(entry.name.clone(), entry);
        }

        let mut provider = Self {
            path,
            key: key.map(str::to_string),
            priority,
            payload_base: header.payload_base,
            database,
            entries,
            cache: HashMap::new(),
        };

        if preload {
            for table in provider.entries.values() {
                for entry in table.values() {
                    let bytes = read_payload(
                        &mut reader,
                        provider.payload_base,
                        provider.key.as_deref(),
                        entry,
                    )?;
                    provider
                        .cache
                        .entry(entry.kind)
                        .or_default()
                        .insert(entry.name.clone(), bytes.into());
                }
            }
        }

        Ok(provider)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn entry(&self, name: &str, kind: AssetType) -> Option<&PackEntry> {
        self.entries.get(&kind).and_then(|t| t.get(name))
    }

    fn cached(&self, name: &str, kind: AssetType) -> Option<Arc<[u8]>> {
        self.cache.get(&kind).and_then(|t| t.get(name)).cloned()
    }
}

fn read_payload<R: Read + Seek>(
    reader: &mut R,
    payload_base: u64,
    key: Option<&str>,
    entry: &PackEntry,
) -> std::io::Result<Vec<u8>> {
    reader.seek(SeekFrom::Start(payload_base + entry.offset))?;
    let mut buf = vec![0u8; entry.len as usize];
    reader.read_exact(&mut buf)?;
    if let Some(key) = key {
        Keystream::new(key, &entry.name).apply(&mut buf);
    }
    Ok(buf)
}

/// Live reader over one pack entry's byte range, decoding as it goes.
/// Holds its own file handle until dropped.
struct PackStream {
    inner: std::io::Take<fs::File>,
    keystream: Option<Keystream>,
}

impl Read for PackStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        if let Some(ks) = &mut self.keystream {
            ks.apply(&mut buf[..n]);
        }
        Ok(n)
    }
}

impl ResourceProvider for PackProvider {
    fn name(&self) -> &str {
        "pack"
    }

    fn database(&self) -> &AssetDatabase {
        &self.database
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn fetch(&self, name: &str, kind: AssetType, want_stream: bool) -> Option<ResourceData> {
        let entry = self.entry(name, kind)?;

        if want_stream {
            if let Some(bytes) = self.cached(name, kind) {
                let len = bytes.len() as u64;
                return Some(ResourceData::Stream(StreamData::new(
                    len,
                    Box::new(std::io::Cursor::new(bytes)),
                )));
            }
            let mut file = fs::File::open(&self.path).ok()?;
            file.seek(SeekFrom::Start(self.payload_base + entry.offset))
                .ok()?;
            let stream = PackStream {
                inner: file.take(entry.len),
                keystream: self
                    .key
                    .as_deref()
                    .map(|key| Keystream::new(key, &entry.name)),
            };
            Some(ResourceData::Stream(StreamData::new(
                entry.len,
                Box::new(stream),
            )))
        } else {
            if let Some(bytes) = self.cached(name, kind) {
                return Some(ResourceData::Static(StaticData::from(bytes)));
            }
            let mut file = fs::File::open(&self.path).ok()?;
            let bytes =
                read_payload(&mut file, self.payload_base, self.key.as_deref(), entry).ok()?;
            Some(ResourceData::Static(StaticData::new(bytes)))
        }
    }

    fn purge(&mut self) {
        self.cache.clear();
    }
}
