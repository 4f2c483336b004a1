use std::{collections::VecDeque, mem};

use lobbykit_shared::{LobbyId, MemberId};

use crate::{records::ModId, session::Role};

/// Asynchronous completions reported by the relay and content platform
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlatformEvent {
    /// Outcome of a create or join request
    LobbyEntered { lobby: LobbyId, success: bool },
    DownloadComplete(ModId),
    ContentReloaded,
    /// Lobbies returned by a listing request
    LobbyList(Vec<LobbyId>),
    /// A listed lobby's data arrived
    LobbyDataUpdated { lobby: LobbyId, success: bool },
    /// The host sent the local member a kick notice
    KickNoticeReceived,
    /// The relay dropped the local member from the lobby
    Disconnected,
}

/// Messages the session surfaces to the player
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification {
    /// The lobby could not be entered, or its settings could not be read
    JoiningError,
    /// The host runs a different build, or its build could not be read
    VersionMismatch { local: String, host: Option<String> },
    /// The match already started and the host does not allow late joins
    HotJoinDisabled,
    /// The host removed the local member from the lobby
    Kicked,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    Entered { lobby: LobbyId, role: Role },
    Left { lobby: LobbyId },
    Notification(Notification),
    /// Every server mod is downloaded and enabled
    ModsReady,
    /// The host started the match; the client should start its level
    MatchStarting,
    MemberKicked(MemberId),
    /// Open lobby listing changed
    LobbyListUpdated,
}

pub struct SessionEvents {
    events: VecDeque<SessionEvent>,
}

impl SessionEvents {
    pub(crate) fn new() -> Self {
        Self {
            events: VecDeque::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SessionEvent> {
        self.events.iter()
    }

    pub fn has_notification(&self, notification: &Notification) -> bool {
        self.events
            .iter()
            .any(|event| matches!(event, SessionEvent::Notification(n) if n == notification))
    }

    pub fn take(&mut self) -> Vec<SessionEvent> {
        mem::take(&mut self.events).into()
    }

    // Crate-public

    pub(crate) fn push(&mut self, event: SessionEvent) {
        self.events.push_back(event);
    }

    pub(crate) fn push_notification(&mut self, notification: Notification) {
        self.events
            .push_back(SessionEvent::Notification(notification));
    }
}
