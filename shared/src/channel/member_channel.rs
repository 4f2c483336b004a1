use log::warn;

use crate::{
    channel::{dedup_cache::DedupCache, relay_source::RelaySource},
    record::{export_record, import_record, Record, RecordError},
    LobbyId, MemberId, Relay, ReplicationConfig, Scope,
};

/// Counts from one [`MemberChannel::export_to`] call
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub written: usize,
    pub unchanged: usize,
    pub failed: usize,
    /// Values over the relay bound, which member data does not chunk
    pub oversized: usize,
}

/// Replicates a record into the local member's own data, writing each
/// changed field immediately
pub struct MemberChannel {
    lobby: LobbyId,
    member: MemberId,
    config: ReplicationConfig,
    cache: DedupCache,
}

impl MemberChannel {
    pub fn new(lobby: LobbyId, member: MemberId, config: ReplicationConfig) -> Self {
        Self {
            lobby,
            member,
            config,
            cache: DedupCache::new(),
        }
    }

    pub fn member(&self) -> MemberId {
        self.member
    }

    pub fn export_to<R: Record>(
        &mut self,
        relay: &mut dyn Relay,
        record: &R,
        prefix: Option<&str>,
    ) -> ExportSummary {
        let scope = Scope::Member(self.lobby, self.member);
        let mut wire: Vec<(String, String)> = Vec::new();
        export_record(record, prefix, &mut wire);

        let mut summary = ExportSummary::default();
        for (key, value) in wire {
            if self.cache.is_unchanged(&key, &value) {
                summary.unchanged += 1;
                continue;
            }

            if value.len() > self.config.max_value_len {
                warn!(
                    "{}: value of {:?} is {} bytes, over the relay bound of {}; not sent",
                    self.member,
                    key,
                    value.len(),
                    self.config.max_value_len
                );
                // cached so the warning repeats only when the value changes
                self.cache.record_sent(&key, &value);
                summary.oversized += 1;
                continue;
            }

            match relay.set(scope, &key, &value) {
                Ok(()) => {
                    self.cache.record_sent(&key, &value);
                    summary.written += 1;
                }
                Err(error) => {
                    warn!("{}: write of {:?} failed: {}", self.member, key, error);
                    self.cache.force_resend(&key);
                    summary.failed += 1;
                }
            }
        }
        summary
    }

    /// Imports a record from any member's data, or `None` (logged) if any
    /// field fails to decode
    pub fn import_member<R: Record>(
        relay: &dyn Relay,
        lobby: LobbyId,
        member: MemberId,
        prefix: Option<&str>,
    ) -> Option<R> {
        match Self::try_import_member(relay, lobby, member, prefix) {
            Ok(record) => Some(record),
            Err(error) => {
                warn!("{}: import of {} failed: {}", member, R::NAME, error);
                None
            }
        }
    }

    pub fn try_import_member<R: Record>(
        relay: &dyn Relay,
        lobby: LobbyId,
        member: MemberId,
        prefix: Option<&str>,
    ) -> Result<R, RecordError> {
        import_record(prefix, &RelaySource::new(relay, Scope::Member(lobby, member)))
    }

    pub fn reset(&mut self) {
        self.cache.clear();
    }
}
