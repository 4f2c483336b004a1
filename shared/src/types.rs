use std::fmt;

use lobbykit_serde::{DecodeError, FieldCodec};

/// Identifies a lobby on the relay
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LobbyId(u64);

impl LobbyId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for LobbyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lobby#{}", self.0)
    }
}

/// Identifies a peer (lobby member) on the relay
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemberId(u64);

impl MemberId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "member#{}", self.0)
    }
}

impl FieldCodec for MemberId {
    fn encode(&self) -> String {
        self.0.encode()
    }

    fn decode(wire: &str) -> Result<Self, DecodeError> {
        u64::decode(wire).map(Self)
    }
}

/// Which namespace of the relay a read or write addresses
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Shared lobby data, writable only by the lobby owner
    Lobby(LobbyId),
    /// A single member's data, writable only by that member
    Member(LobbyId, MemberId),
}

impl Scope {
    pub fn lobby(&self) -> LobbyId {
        match self {
            Scope::Lobby(lobby) | Scope::Member(lobby, _) => *lobby,
        }
    }
}

/// Who may discover a lobby
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LobbyVisibility {
    Public,
    FriendsOnly,
}
