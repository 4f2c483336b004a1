use std::collections::VecDeque;

use log::{debug, warn};

use crate::{
    channel::{dedup_cache::DedupCache, pending_write::PendingWrite, relay_source::RelaySource},
    record::{export_record, import_record, Record, RecordError},
    LobbyId, Relay, RelayError, ReplicationConfig, Scope,
};

/// Outcome of a single [`LobbyChannel::drain`] call
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DrainStatus {
    /// Every queued write, including any chunked value, has reached the relay
    Done,
    /// The write budget ran out with writes still queued
    Pending { remaining: usize },
    /// The relay refused a write; the queue is unchanged from that write on
    Failed { key: String, error: RelayError },
}

impl DrainStatus {
    pub fn is_done(&self) -> bool {
        matches!(self, DrainStatus::Done)
    }
}

/// Replicates records into a lobby's shared data. Only the lobby owner can
/// write there, so only the host drains this channel; every peer may import
/// from it.
///
/// Exports pass through a dedup cache and land in an ordered queue, which a
/// separate [`LobbyChannel::drain`] step flushes under the relay's rate limit.
pub struct LobbyChannel {
    lobby: LobbyId,
    config: ReplicationConfig,
    cache: DedupCache,
    pending: VecDeque<PendingWrite>,
}

impl LobbyChannel {
    pub fn new(lobby: LobbyId, config: ReplicationConfig) -> Self {
        Self {
            lobby,
            config,
            cache: DedupCache::new(),
            pending: VecDeque::new(),
        }
    }

    pub fn lobby(&self) -> LobbyId {
        self.lobby
    }

    /// Queues every field of `record` whose value changed since it was last
    /// queued. Returns the number of fields queued.
    pub fn export_to<R: Record>(&mut self, record: &R, prefix: Option<&str>) -> usize {
        let mut wire: Vec<(String, String)> = Vec::new();
        export_record(record, prefix, &mut wire);

        let mut queued = 0;
        for (key, value) in wire {
            if self.cache.is_unchanged(&key, &value) {
                continue;
            }
            self.cache.record_sent(&key, &value);
            self.enqueue(&key, value);
            queued += 1;
        }
        queued
    }

    /// Queues a single write. A queued write for the same key that has not
    /// started sending takes the new value in place.
    pub fn enqueue(&mut self, key: &str, value: String) {
        let max_value_len = self.config.max_value_len;
        if let Some(waiting) = self
            .pending
            .iter_mut()
            .find(|write| write.key() == key && !write.is_started())
        {
            waiting.replace_value(value, max_value_len);
            return;
        }

        let write = PendingWrite::new(key, value, max_value_len);
        if write.is_chunked() {
            debug!(
                "{}: chunking {:?} into {} writes",
                self.lobby,
                key,
                write.write_count()
            );
        }
        self.pending.push_back(write);
    }

    /// Sends queued writes in order, up to the configured per-drain budget.
    /// Stops at the first refused write without reordering the queue, so the
    /// next call resumes at exactly that write.
    pub fn drain(&mut self, relay: &mut dyn Relay) -> DrainStatus {
        let scope = Scope::Lobby(self.lobby);
        let mut budget = self.config.writes_per_drain.max(1);

        while budget > 0 {
            let Some(front) = self.pending.front_mut() else {
                break;
            };
            let Some((key, value)) = front.next_write() else {
                self.pending.pop_front();
                continue;
            };

            if let Err(error) = relay.set(scope, &key, &value) {
                debug!("{}: write of {:?} failed: {}", self.lobby, key, error);
                return DrainStatus::Failed { key, error };
            }

            front.mark_sent();
            budget -= 1;
            if front.is_complete() {
                self.pending.pop_front();
            }
        }

        if self.pending.is_empty() {
            DrainStatus::Done
        } else {
            DrainStatus::Pending {
                remaining: self.pending.len(),
            }
        }
    }

    /// Imports a record from the lobby's data, or `None` (logged) if any
    /// field fails to decode
    pub fn import_from<R: Record>(&self, relay: &dyn Relay, prefix: Option<&str>) -> Option<R> {
        match self.try_import_from(relay, prefix) {
            Ok(record) => Some(record),
            Err(error) => {
                warn!("{}: import of {} failed: {}", self.lobby, R::NAME, error);
                None
            }
        }
    }

    pub fn try_import_from<R: Record>(
        &self,
        relay: &dyn Relay,
        prefix: Option<&str>,
    ) -> Result<R, RecordError> {
        import_record(prefix, &RelaySource::new(relay, Scope::Lobby(self.lobby)))
    }

    /// Number of keys still waiting to be fully sent
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_flushed(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drops every queued write and forgets every sent value
    pub fn reset(&mut self) {
        self.pending.clear();
        self.cache.clear();
    }
}
