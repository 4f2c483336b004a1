use lobbykit_shared::MemberId;
use thiserror::Error;

use crate::session::SessionState;

/// Errors returned by session commands issued in the wrong situation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Cannot {operation} while the session is {state:?}")]
    WrongState {
        operation: &'static str,
        state: SessionState,
    },

    #[error("Only the lobby host can {operation}")]
    NotHost { operation: &'static str },

    #[error("Only a lobby client can {operation}")]
    NotClient { operation: &'static str },

    #[error("Cannot {operation} outside of a lobby")]
    NotInLobby { operation: &'static str },

    #[error("No refused level start is waiting for confirmation")]
    NoStartPending,

    #[error("{member} is not a member of the current lobby")]
    UnknownMember { member: MemberId },

    #[error("The host cannot kick itself")]
    CannotKickSelf,
}

/// The game could not apply match settings received from the host, usually
/// because a content cache is behind the host's
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
    #[error("Map index {index} is not in the cached map list")]
    MapNotCached { index: i32 },

    #[error("No custom map named {name:?} is installed")]
    UnknownMap { name: String },

    #[error("{kind} index {index} is not in the content cache")]
    ContentNotCached { kind: &'static str, index: i32 },
}
