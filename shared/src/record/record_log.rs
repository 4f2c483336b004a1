use std::collections::HashMap;

use log::{debug, log_enabled, Level};

use crate::{
    channel::DedupCache,
    record::{export_record, Record},
};

/// Traces replicated records at debug level, logging only the fields whose
/// wire value changed since the last call with the same label
#[derive(Default)]
pub struct RecordLog {
    seen: HashMap<String, DedupCache>,
}

impl RecordLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Logs the changed fields of `record` and returns how many there were
    pub fn log_changes<R: Record>(&mut self, label: &str, record: &R) -> usize {
        if !log_enabled!(Level::Debug) {
            return 0;
        }

        let mut wire: Vec<(String, String)> = Vec::new();
        export_record(record, None, &mut wire);

        let cache = self.seen.entry(label.to_string()).or_default();
        let mut changed = 0;
        for (key, value) in wire {
            if cache.is_unchanged(&key, &value) {
                continue;
            }
            debug!("{} {}.{} = {:?}", label, R::NAME, key, value);
            cache.record_sent(&key, &value);
            changed += 1;
        }
        changed
    }

    pub fn clear(&mut self) {
        self.seen.clear();
    }
}
