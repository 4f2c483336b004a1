mod chunk;
mod dedup_cache;
mod lobby_channel;
mod member_channel;
mod pending_write;
mod relay_source;

pub use chunk::{chunk_key, read_reassembled, split_into_chunks, ChunkMarker};
pub use dedup_cache::{DedupCache, ReplicationField};
pub use lobby_channel::{DrainStatus, LobbyChannel};
pub use member_channel::{ExportSummary, MemberChannel};
pub use pending_write::PendingWrite;
pub use relay_source::RelaySource;
