use std::collections::HashMap;

/// Last value handed to the relay for a single key
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplicationField {
    pub key: String,
    pub last_sent_value: String,
    /// Set after an observed write failure; the next offer is sent even if
    /// unchanged
    pub force_resend: bool,
}

/// Per-key cache of last-sent values, used to drop unchanged writes before
/// they reach the relay.
#[derive(Default)]
pub struct DedupCache {
    fields: HashMap<String, ReplicationField>,
}

impl DedupCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `value` matches what was last sent for `key` and no resend is
    /// forced
    pub fn is_unchanged(&self, key: &str, value: &str) -> bool {
        match self.fields.get(key) {
            Some(field) => !field.force_resend && field.last_sent_value == value,
            None => false,
        }
    }

    /// Records `value` as the last value sent for `key`, clearing any forced
    /// resend
    pub fn record_sent(&mut self, key: &str, value: &str) {
        match self.fields.get_mut(key) {
            Some(field) => {
                field.last_sent_value.clear();
                field.last_sent_value.push_str(value);
                field.force_resend = false;
            }
            None => {
                self.fields.insert(
                    key.to_string(),
                    ReplicationField {
                        key: key.to_string(),
                        last_sent_value: value.to_string(),
                        force_resend: false,
                    },
                );
            }
        }
    }

    /// Marks `key` so its next offer is sent regardless of the cached value
    pub fn force_resend(&mut self, key: &str) {
        if let Some(field) = self.fields.get_mut(key) {
            field.force_resend = true;
        }
    }

    pub fn get(&self, key: &str) -> Option<&ReplicationField> {
        self.fields.get(key)
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
