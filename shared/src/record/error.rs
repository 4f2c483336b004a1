use lobbykit_serde::DecodeError;
use thiserror::Error;

/// Errors that can occur while moving a record on or off the relay
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// A field's wire value could not be decoded
    #[error("Failed to decode field {key:?} of record {record}: {source}")]
    Decode {
        record: &'static str,
        key: String,
        source: DecodeError,
    },

    /// Two fields of a record flatten to the same wire key
    #[error("Record {record} maps more than one field to wire key {key:?}")]
    DuplicateWireKey { record: &'static str, key: String },

    /// A chunked value is missing one or more of its chunks
    #[error("Chunked value at key {key:?} expects {expected} chunks, only {found} are present")]
    IncompleteChunks {
        key: String,
        expected: usize,
        found: usize,
    },

    /// Reassembled chunks do not add up to the length the marker announced
    #[error("Chunked value at key {key:?} should be {expected} bytes long, reassembled {actual}")]
    ChunkLengthMismatch {
        key: String,
        expected: usize,
        actual: usize,
    },

    /// Reassembled chunks are not the value the marker describes, usually
    /// because chunks of an older value are still in place
    #[error("Chunked value at key {key:?} does not match its marker's fingerprint")]
    ChunkFingerprintMismatch { key: String },

    /// A value carries the chunk marker prefix but is not a valid marker
    #[error("Malformed chunk marker at key {key:?}: {marker:?}")]
    MalformedChunkMarker { key: String, marker: String },
}
