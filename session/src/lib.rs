//! # Lobbykit Session
//! Drives one peer through a multiplayer lobby on top of a shared key/value
//! relay: hosting or joining, acquiring the host's mods, replicating match
//! configuration and member status, and gating the match start.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use lobbykit_shared::{
        DrainStatus, LobbyChannel, LobbyId, LobbyVisibility, MemberChannel, MemberId, Record,
        RecordError, Relay, RelayError, ReplicationConfig, Scope,
    };
}

mod config;
mod content;
mod error;
mod events;
mod platform;
mod records;
mod session;

pub use config::LobbyConfig;
pub use content::{ContentManager, ModInfo, ModKey};
pub use error::{ApplyError, SessionError};
pub use events::{Notification, PlatformEvent, SessionEvent, SessionEvents};
pub use platform::Platform;
pub use records::{
    GameMode, MatchSettings, MemberCap, MemberStatus, ModId, MutatorSet, ServerSettings,
    SessionConfig, TeamLoadout, MATCH_PREFIX, MEMBER_CAP_MAX, MEMBER_CAP_MIN, SERVER_PREFIX,
};
pub use session::{
    AcquisitionStep, JobKind, LobbySession, ModAcquisition, Role, SessionState, StartDecision,
    StartRefusal,
};
