//! # Lobbykit Shared
//! Record transfer, replication channels and scheduling shared by lobbykit
//! hosts & clients.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub use lobbykit_serde::{
    escape_element, join_escaped, split_escaped, wire_enum, DecodeError, FieldCodec,
};

mod channel;
mod config;
mod record;
mod relay;
mod scheduler;
mod throttled_log;
mod types;

pub use channel::{
    chunk_key, read_reassembled, split_into_chunks, ChunkMarker, DedupCache, DrainStatus,
    ExportSummary, LobbyChannel, MemberChannel, PendingWrite, RelaySource, ReplicationField,
};
pub use config::ReplicationConfig;
#[doc(hidden)]
pub use record::__nested_keys;
pub use record::{
    check_unique_wire_keys, export_record, import_record, record_wire_keys, wire_key,
    FieldDescriptor, FieldKind, Record, RecordError, RecordLog, RecordSink, RecordSource,
};
pub use relay::{Relay, RelayError};
pub use scheduler::{PeriodicJob, Scheduler};
pub use throttled_log::ThrottledLog;
pub use types::{LobbyId, LobbyVisibility, MemberId, Scope};
