use crate::{
    channel::chunk::read_reassembled,
    record::{RecordError, RecordSource},
    Relay, Scope,
};

/// Reads record fields from one relay scope, reassembling chunked values
pub struct RelaySource<'r> {
    relay: &'r dyn Relay,
    scope: Scope,
}

impl<'r> RelaySource<'r> {
    pub fn new(relay: &'r dyn Relay, scope: Scope) -> Self {
        Self { relay, scope }
    }
}

impl RecordSource for RelaySource<'_> {
    fn get(&self, key: &str) -> Result<Option<String>, RecordError> {
        read_reassembled(key, &|key| self.relay.get(self.scope, key))
    }
}
