use std::hash::Hasher;

use fnv::FnvHasher;

use crate::record::RecordError;

// Control character prefix; the codecs never produce it for ordinary values.
const MARKER_PREFIX: &str = "\u{1}chunks:";

/// Sentinel written at a chunked value's own key, announcing how many chunks
/// follow under `{key}.{index}`, how long the reassembled value is, and a
/// fingerprint of its content.
///
/// Chunks of an older write can still sit at `{key}.{index}` while a newer
/// one is being sent. The fingerprint lets a reader tell a mix of the two
/// apart from the value the marker describes, even when count and length agree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkMarker {
    pub count: usize,
    pub total_len: usize,
    pub fingerprint: u64,
}

impl ChunkMarker {
    /// Marker for `value` split into `count` chunks
    pub fn describe(value: &str, count: usize) -> Self {
        Self {
            count,
            total_len: value.len(),
            fingerprint: fingerprint(value),
        }
    }

    pub fn to_wire(&self) -> String {
        format!(
            "{}{}:{}:{:016x}",
            MARKER_PREFIX, self.count, self.total_len, self.fingerprint
        )
    }

    /// `Ok(None)` if `value` is an ordinary value rather than a marker
    pub fn parse(key: &str, value: &str) -> Result<Option<Self>, RecordError> {
        let Some(body) = value.strip_prefix(MARKER_PREFIX) else {
            return Ok(None);
        };

        let malformed = || RecordError::MalformedChunkMarker {
            key: key.to_string(),
            marker: value.to_string(),
        };

        let mut parts = body.split(':');
        let (Some(count), Some(total_len), Some(hash), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(malformed());
        };
        let count = count.parse::<usize>().map_err(|_| malformed())?;
        let total_len = total_len.parse::<usize>().map_err(|_| malformed())?;
        let fingerprint = u64::from_str_radix(hash, 16).map_err(|_| malformed())?;
        if count == 0 {
            return Err(malformed());
        }

        Ok(Some(Self {
            count,
            total_len,
            fingerprint,
        }))
    }
}

/// 64-bit FNV-1a of the value's bytes
pub fn fingerprint(value: &str) -> u64 {
    let mut hasher = FnvHasher::default();
    hasher.write(value.as_bytes());
    hasher.finish()
}

/// Relay key of chunk `index` (1-based) of the value at `key`
pub fn chunk_key(key: &str, index: usize) -> String {
    format!("{}.{}", key, index)
}

/// Splits `value` into pieces of at most `max_len` bytes, never inside a
/// UTF-8 sequence. A piece always holds at least one character, so a
/// `max_len` smaller than a character still makes progress.
pub fn split_into_chunks(value: &str, max_len: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut rest = value;

    while !rest.is_empty() {
        let mut end = max_len.min(rest.len());
        while end > 0 && !rest.is_char_boundary(end) {
            end -= 1;
        }
        if end == 0 {
            end = rest.chars().next().map_or(rest.len(), char::len_utf8);
        }

        let (head, tail) = rest.split_at(end);
        chunks.push(head.to_string());
        rest = tail;
    }

    chunks
}

/// Reads the value at `key` through `lookup`, reassembling it if a chunk
/// marker is found there. A chunked value is returned whole or not at all.
pub fn read_reassembled(
    key: &str,
    lookup: &dyn Fn(&str) -> Option<String>,
) -> Result<Option<String>, RecordError> {
    let Some(value) = lookup(key) else {
        return Ok(None);
    };
    let Some(marker) = ChunkMarker::parse(key, &value)? else {
        return Ok(Some(value));
    };

    let mut output = String::with_capacity(marker.total_len);
    for index in 1..=marker.count {
        match lookup(&chunk_key(key, index)) {
            Some(chunk) => output.push_str(&chunk),
            None => {
                return Err(RecordError::IncompleteChunks {
                    key: key.to_string(),
                    expected: marker.count,
                    found: index - 1,
                });
            }
        }
    }

    if output.len() != marker.total_len {
        return Err(RecordError::ChunkLengthMismatch {
            key: key.to_string(),
            expected: marker.total_len,
            actual: output.len(),
        });
    }

    if fingerprint(&output) != marker.fingerprint {
        return Err(RecordError::ChunkFingerprintMismatch {
            key: key.to_string(),
        });
    }

    Ok(Some(output))
}
