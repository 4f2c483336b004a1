use crate::channel::chunk::{chunk_key, split_into_chunks, ChunkMarker};

/// A queued lobby write. A value longer than the relay bound is carried as
/// chunks and goes out as a sequence: the marker at `key`, then each chunk at
/// `{key}.{index}` in index order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingWrite {
    key: String,
    value: String,
    chunks: Option<Vec<String>>,
    /// Position in the write sequence of the last write the relay accepted,
    /// where 0 is the marker (or the whole value when unchunked)
    last_sent_chunk_index: Option<usize>,
}

impl PendingWrite {
    pub fn new(key: &str, value: String, max_value_len: usize) -> Self {
        let chunks = if value.len() > max_value_len {
            Some(split_into_chunks(&value, max_value_len))
        } else {
            None
        };

        Self {
            key: key.to_string(),
            value,
            chunks,
            last_sent_chunk_index: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_chunked(&self) -> bool {
        self.chunks.is_some()
    }

    /// Number of relay writes needed to send this value
    pub fn write_count(&self) -> usize {
        match &self.chunks {
            Some(chunks) => chunks.len() + 1,
            None => 1,
        }
    }

    pub fn last_sent_chunk_index(&self) -> Option<usize> {
        self.last_sent_chunk_index
    }

    fn next_index(&self) -> usize {
        self.last_sent_chunk_index.map_or(0, |index| index + 1)
    }

    /// The next `(key, value)` to hand to the relay, or `None` once every
    /// write has been accepted
    pub fn next_write(&self) -> Option<(String, String)> {
        let index = self.next_index();
        match &self.chunks {
            None if index == 0 => Some((self.key.clone(), self.value.clone())),
            None => None,
            Some(chunks) if index == 0 => {
                let marker = ChunkMarker::describe(&self.value, chunks.len());
                Some((self.key.clone(), marker.to_wire()))
            }
            Some(chunks) => chunks
                .get(index - 1)
                .map(|chunk| (chunk_key(&self.key, index), chunk.clone())),
        }
    }

    /// Advances past the write last returned by [`PendingWrite::next_write`]
    pub fn mark_sent(&mut self) {
        if !self.is_complete() {
            self.last_sent_chunk_index = Some(self.next_index());
        }
    }

    pub fn is_complete(&self) -> bool {
        self.next_index() >= self.write_count()
    }

    /// Whether any part of this value already reached the relay
    pub fn is_started(&self) -> bool {
        self.last_sent_chunk_index.is_some()
    }

    /// Swaps in a newer value for a write that has not started
    pub fn replace_value(&mut self, value: String, max_value_len: usize) {
        *self = Self::new(&self.key, value, max_value_len);
    }
}
