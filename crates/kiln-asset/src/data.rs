//! Resource data returned by the resolver
//!
//! A provider decides at fetch time whether it delivers a fully buffered
//! blob or a live stream, and the result carries that decision as a tagged
//! variant. Callers that need a specific variant go through
//! `Resolver::get_static` / `Resolver::get_stream`, which reject the other
//! variant without leaking its backing handle.

use std::io::Read;
use std::sync::Arc;

/// Fully materialized, immutable asset bytes. Cheap to clone.
#[derive(Debug, Clone)]
pub struct StaticData {
    bytes: Arc<[u8]>,
}

impl StaticData {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl From<Arc<[u8]>> for StaticData {
    fn from(bytes: Arc<[u8]>) -> Self {
        Self { bytes }
    }
}

/// An incrementally read byte sequence with a declared total length.
///
/// Owns its live connection to the backing file or archive; dropping the
/// value releases the handle.
pub struct StreamData {
    len: u64,
    reader: Box<dyn Read + Send>,
}

impl StreamData {
    pub fn new(len: u64, reader: Box<dyn Read + Send>) -> Self {
        Self { len, reader }
    }

    /// Declared total length of the stream, known up front.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Read for StreamData {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.reader.read(buf)
    }
}

impl std::fmt::Debug for StreamData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamData").field("len", &self.len).finish()
    }
}

/// Result of a provider fetch: either buffered bytes or a live stream.
#[derive(Debug)]
pub enum ResourceData {
    Static(StaticData),
    Stream(StreamData),
}

impl ResourceData {
    /// Variant name for diagnostics ("static" or "stream").
    pub fn variant(&self) -> &'static str {
        match self {
            ResourceData::Static(_) => "static",
            ResourceData::Stream(_) => "stream",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_static_data_shares_bytes() {
        let data = StaticData::new(vec![1, 2, 3]);
        let copy = data.clone();
        assert_eq!(data.bytes(), copy.bytes());
        assert_eq!(data.len(), 3);
    }

    #[test]
    fn test_stream_data_reads_incrementally() {
        let payload = b"hello stream".to_vec();
        let mut stream = StreamData::new(payload.len() as u64, Box::new(Cursor::new(payload)));
        assert_eq!(stream.len(), 12);

        let mut first = [0u8; 5];
        stream.read_exact(&mut first).unwrap();
        assert_eq!(&first, b"hello");

        let mut rest = Vec::new();
        stream.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, b" stream");
    }

    #[test]
    fn test_variant_names() {
        let s = ResourceData::Static(StaticData::new(vec![]));
        assert_eq!(s.variant(), "static");
        let t = ResourceData::Stream(StreamData::new(0, Box::new(Cursor::new(Vec::new()))));
        assert_eq!(t.variant(), "stream");
    }
}
