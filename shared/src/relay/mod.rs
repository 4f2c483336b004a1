mod error;

pub use error::RelayError;

use crate::{LobbyId, LobbyVisibility, MemberId, Scope};

/// The hosted key/value relay that lobby peers share.
///
/// Lobby-scoped data is writable only by the lobby owner; member-scoped data
/// only by that member. Every key of both scopes is readable by every peer.
/// Writes are size-bounded and rate-limited and may fail transiently. There is
/// no atomicity across writes.
///
/// Lobby creation, joining and listing complete asynchronously; the platform
/// reports their outcome back to the session as events.
pub trait Relay {
    /// The member id of the peer using this relay handle
    fn local_member(&self) -> MemberId;

    /// Reads a key, or `None` if it was never written
    fn get(&self, scope: Scope, key: &str) -> Option<String>;

    /// Writes a key
    fn set(&mut self, scope: Scope, key: &str, value: &str) -> Result<(), RelayError>;

    /// Members currently in the lobby, in the relay's enumeration order
    fn members(&self, lobby: LobbyId) -> Vec<MemberId>;

    /// Requests a new lobby owned by the local member
    fn create_lobby(&mut self, visibility: LobbyVisibility, member_cap: u32);

    /// Requests to enter an existing lobby
    fn join_lobby(&mut self, lobby: LobbyId);

    /// Leaves a lobby that was entered
    fn leave_lobby(&mut self, lobby: LobbyId);

    /// Requests the listing of discoverable lobbies
    fn request_lobby_list(&mut self);

    /// Requests a fresh copy of a listed lobby's data
    fn request_lobby_data(&mut self, lobby: LobbyId);
}
