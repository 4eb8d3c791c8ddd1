//! Pack archive format
//!
//! A pack is a sealed archive of assets: a fixed prelude, a bincode entry
//! table, then the payload bytes. Keyed packs scramble the entry table and
//! every payload with a SHA-256 counter keystream; the keystream is seeded
//! per entry, so a streamed read decodes incrementally from the entry start.
//!
//! ```text
//! [magic "KPAK"] [version u16] [flags u8] [header_len u32]
//! [sha256 of plaintext header] [header bytes] [payload bytes...]
//! ```
//!
//! Entry offsets are relative to the payload base (end of the header), so
//! the table can be serialized without knowing its own length.

use crate::types::{AssetType, Metadata};
use kiln_core::{KilnError, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::{Read, Write};
use std::path::Path;

pub const PACK_MAGIC: [u8; 4] = *b"KPAK";
pub const PACK_VERSION: u16 = 1;

const FLAG_ENCRYPTED: u8 = 1;

/// Fixed bytes before the entry table: magic + version + flags +
/// header length + header checksum.
const PRELUDE_LEN: u64 = 4 + 2 + 1 + 4 + 32;

/// One asset in the pack's entry table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackEntry {
    pub name: String,
    pub kind: AssetType,
    /// Byte offset relative to the payload base.
    pub offset: u64,
    pub len: u64,
    pub meta: Metadata,
}

/// Decoded and validated pack header.
#[derive(Debug)]
pub struct PackHeader {
    pub encrypted: bool,
    /// Absolute file offset where payload bytes begin.
    pub payload_base: u64,
    pub entries: Vec<PackEntry>,
}

/// SHA-256 counter keystream, seeded from the pack key and a per-entry
/// label. Obfuscation for sealed packs, not authenticated encryption.
pub(crate) struct Keystream {
    seed: [u8; 32],
    counter: u64,
    block: [u8; 32],
    pos: usize,
}

impl Keystream {
    pub(crate) fn new(key: &str, label: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        hasher.update([0u8]);
        hasher.update(label.as_bytes());
        let mut ks = Self {
            seed: hasher.finalize().into(),
            counter: 0,
            block: [0; 32],
            pos: 0,
        };
        ks.refill();
        ks
    }

    fn refill(&mut self) {
        let mut hasher = Sha256::new();
        hasher.update(self.seed);
        hasher.update(self.counter.to_le_bytes());
        self.block = hasher.finalize().into();
        self.counter += 1;
        self.pos = 0;
    }

    /// XOR the next keystream bytes over `buf`, in place. Applying twice
    /// at the same stream position restores the original bytes.
    pub(crate) fn apply(&mut self, buf: &mut [u8]) {
        for byte in buf {
            if self.pos == self.block.len() {
                self.refill();
            }
            *byte ^= self.block[self.pos];
            self.pos += 1;
        }
    }
}

/// Keystream label for the entry table itself.
const HEADER_LABEL: &str = "\0header";

/// Builds pack archives from in-memory asset records. Used by the `kiln
/// pack` command and by tests that need throwaway archives.
#[derive(Default)]
pub struct PackWriter {
    key: Option<String>,
    assets: Vec<(String, AssetType, Metadata, Vec<u8>)>,
}

impl PackWriter {
    pub fn new(key: Option<&str>) -> Self {
        Self {
            key: key.map(str::to_string),
            assets: Vec::new(),
        }
    }

    pub fn add(
        &mut self,
        name: impl Into<String>,
        kind: AssetType,
        meta: Metadata,
        bytes: Vec<u8>,
    ) {
        self.assets.push((name.into(), kind, meta, bytes));
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        let mut entries = Vec::with_capacity(self.assets.len());
        let mut offset = 0u64;
        for (name, kind, meta, bytes) in &self.assets {
            entries.push(PackEntry {
                name: name.clone(),
                kind: *kind,
                offset,
                len: bytes.len() as u64,
                meta: meta.clone(),
            });
            offset += bytes.len() as u64;
        }

        let mut header = bincode::serialize(&entries)
            .map_err(|e| KilnError::InvalidPack(format!("failed to encode header: {}", e)))?;
        if header.len() > u32::MAX as usize {
            return Err(KilnError::InvalidPack("header too large".to_string()));
        }

        let checksum: [u8; 32] = Sha256::digest(&header).into();
        if let Some(key) = &self.key {
            Keystream::new(key, HEADER_LABEL).apply(&mut header);
        }

        writer.write_all(&PACK_MAGIC)?;
        writer.write_all(&PACK_VERSION.to_le_bytes())?;
        let flags = if self.key.is_some() { FLAG_ENCRYPTED } else { 0 };
        writer.write_all(&[flags])?;
        writer.write_all(&(header.len() as u32).to_le_bytes())?;
        writer.write_all(&checksum)?;
        writer.write_all(&header)?;

        for (name, _, _, bytes) in &self.assets {
            if let Some(key) = &self.key {
                let mut scrambled = bytes.clone();
                Keystream::new(key, name).apply(&mut scrambled);
                writer.write_all(&scrambled)?;
            } else {
                writer.write_all(bytes)?;
            }
        }
        Ok(())
    }

    pub fn write_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut file = std::fs::File::create(path)?;
        self.write_to(&mut file)
    }
}

/// Read and validate a pack header from the start of `reader`.
///
/// Fails with `InvalidPack` on a bad magic, unsupported version, missing
/// key for a keyed pack, or a checksum mismatch (corruption or wrong key).
pub fn read_header<R: Read>(reader: &mut R, key: Option<&str>) -> Result<PackHeader> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if magic != PACK_MAGIC {
        return Err(KilnError::InvalidPack("bad magic".to_string()));
    }

    let mut version = [0u8; 2];
    reader.read_exact(&mut version)?;
    let version = u16::from_le_bytes(version);
    if version != PACK_VERSION {
        return Err(KilnError::InvalidPack(format!(
            "unsupported version {}",
            version
        )));
    }

    let mut flags = [0u8; 1];
    reader.read_exact(&mut flags)?;
    let encrypted = flags[0] & FLAG_ENCRYPTED != 0;

    let mut header_len = [0u8; 4];
    reader.read_exact(&mut header_len)?;
    let header_len = u32::from_le_bytes(header_len);

    let mut checksum = [0u8; 32];
    reader.read_exact(&mut checksum)?;

    let mut header = vec![0u8; header_len as usize];
    reader.read_exact(&mut header)?;

    if encrypted {
        let key = key.ok_or_else(|| {
            KilnError::InvalidPack("pack is keyed and no key was supplied".to_string())
        })?;
        Keystream::new(key, HEADER_LABEL).apply(&mut header);
    }

    let actual: [u8; 32] = Sha256::digest(&header).into();
    if actual != checksum {
        return Err(KilnError::InvalidPack(
            "header checksum mismatch (corrupt pack or wrong key)".to_string(),
        ));
    }

    let entries: Vec<PackEntry> = bincode::deserialize(&header)
        .map_err(|e| KilnError::InvalidPack(format!("failed to decode header: {}", e)))?;

    Ok(PackHeader {
        encrypted,
        payload_base: PRELUDE_LEN + header_len as u64,
        entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MetaValue;
    use std::io::Cursor;

    fn sample_writer(key: Option<&str>) -> PackWriter {
        let mut writer = PackWriter::new(key);
        let mut meta = Metadata::new();
        meta.insert("width".to_string(), MetaValue::Int(16));
        writer.add("sprite.png", AssetType::Texture, meta, b"sprite-bytes".to_vec());
        writer.add(
            "theme.ogg",
            AssetType::Audio,
            Metadata::new(),
            b"theme-bytes".to_vec(),
        );
        writer
    }

    fn payload_of(bytes: &[u8], header: &PackHeader, entry: &PackEntry) -> Vec<u8> {
        let start = (header.payload_base + entry.offset) as usize;
        bytes[start..start + entry.len as usize].to_vec()
    }

    #[test]
    fn test_roundtrip_plain() {
        let mut bytes = Vec::new();
        sample_writer(None).write_to(&mut bytes).unwrap();

        let header = read_header(&mut Cursor::new(&bytes), None).unwrap();
        assert!(!header.encrypted);
        assert_eq!(header.entries.len(), 2);

        let sprite = &header.entries[0];
        assert_eq!(sprite.name, "sprite.png");
        assert_eq!(sprite.kind, AssetType::Texture);
        assert_eq!(sprite.meta.get("width"), Some(&MetaValue::Int(16)));
        assert_eq!(payload_of(&bytes, &header, sprite), b"sprite-bytes");

        let theme = &header.entries[1];
        assert_eq!(theme.offset, 12);
        assert_eq!(payload_of(&bytes, &header, theme), b"theme-bytes");
    }

    #[test]
    fn test_roundtrip_keyed() {
        let mut bytes = Vec::new();
        sample_writer(Some("hunter2")).write_to(&mut bytes).unwrap();

        let header = read_header(&mut Cursor::new(&bytes), Some("hunter2")).unwrap();
        assert!(header.encrypted);

        let sprite = &header.entries[0];
        let mut payload = payload_of(&bytes, &header, sprite);
        assert_ne!(payload, b"sprite-bytes", "payload must be scrambled on disk");
        Keystream::new("hunter2", "sprite.png").apply(&mut payload);
        assert_eq!(payload, b"sprite-bytes");
    }

    #[test]
    fn test_wrong_key_is_checksum_mismatch() {
        let mut bytes = Vec::new();
        sample_writer(Some("hunter2")).write_to(&mut bytes).unwrap();

        let err = read_header(&mut Cursor::new(&bytes), Some("wrong")).unwrap_err();
        assert!(matches!(err, KilnError::InvalidPack(_)));
    }

    #[test]
    fn test_keyed_pack_requires_key() {
        let mut bytes = Vec::new();
        sample_writer(Some("hunter2")).write_to(&mut bytes).unwrap();

        let err = read_header(&mut Cursor::new(&bytes), None).unwrap_err();
        assert!(matches!(err, KilnError::InvalidPack(_)));
    }

    #[test]
    fn test_bad_magic() {
        let err = read_header(&mut Cursor::new(b"NOPE\0\0\0\0"), None).unwrap_err();
        assert!(matches!(err, KilnError::InvalidPack(_)));
    }

    #[test]
    fn test_keystream_is_positional_and_involutive() {
        let mut buf = b"some payload bytes".to_vec();
        Keystream::new("key", "entry").apply(&mut buf);
        assert_ne!(buf, b"some payload bytes");

        // One-shot and chunked application agree.
        let mut chunked = buf.clone();
        let mut ks = Keystream::new("key", "entry");
        let (a, b) = chunked.split_at_mut(7);
        ks.apply(a);
        ks.apply(b);
        assert_eq!(chunked, b"some payload bytes");
    }
}
