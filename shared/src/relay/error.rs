use thiserror::Error;

/// A write the relay did not accept. All of these are transient from the
/// caller's point of view: the same write may succeed on a later attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// The relay refused the write without a more specific reason
    #[error("Relay rejected write to key {key:?}")]
    Rejected { key: String },

    /// Too many writes were issued in the current rate-limit window
    #[error("Relay rate limit reached while writing key {key:?}")]
    RateLimited { key: String },

    /// The value is longer than the relay's per-field bound
    #[error("Value of {len} bytes for key {key:?} exceeds the relay bound of {max} bytes")]
    ValueTooLong { key: String, len: usize, max: usize },

    /// The local member is not in the lobby addressed by the write
    #[error("Cannot write key {key:?}: not a member of the addressed lobby")]
    NotInLobby { key: String },

    /// The local member may not write the addressed scope
    #[error("Cannot write key {key:?}: scope is owned by another member")]
    NotPermitted { key: String },
}
