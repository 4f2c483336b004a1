/// Contains Config properties which will be used by replication channels
#[derive(Clone, Debug)]
pub struct ReplicationConfig {
    /// Longest value, in bytes, the relay accepts for a single key. Longer
    /// lobby values are chunked.
    pub max_value_len: usize,
    /// Most relay writes a single lobby drain issues before yielding
    pub writes_per_drain: usize,
}

impl Default for ReplicationConfig {
    fn default() -> Self {
        Self {
            max_value_len: 8192,
            writes_per_drain: 8,
        }
    }
}
