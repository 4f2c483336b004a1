use log::{info, warn};
use thiserror::Error;

use lobbykit_shared::{MemberChannel, MemberId, Relay};

use crate::{
    content::ContentManager,
    error::SessionError,
    platform::Platform,
    records::MemberStatus,
    session::{LobbySession, Role},
};

/// Why a level start was held back
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StartRefusal {
    /// A client starts its level only after the host started the match
    #[error("Waiting for the host to start the match")]
    NotReadyToPlay,

    /// Members that have not finished loading. The host may confirm a
    /// forced start and try again.
    #[error("{} members are still loading", .members.len())]
    MembersLoading { members: Vec<MemberId> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum StartDecision {
    Allowed,
    Refused(StartRefusal),
}

impl StartDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, StartDecision::Allowed)
    }
}

impl<R: Relay, C: ContentManager, P: Platform> LobbySession<R, C, P> {
    /// Decides whether the local level may start. Outside of a lobby it
    /// always may.
    ///
    /// A host is refused while any member has not finished loading, unless
    /// it confirmed a forced start through
    /// [`LobbySession::confirm_force_start`] after such a refusal. An allowed
    /// host start marks the match as started and opens the in-match relay.
    pub fn request_level_start(&mut self) -> StartDecision {
        if !self.is_in_lobby() {
            return StartDecision::Allowed;
        }

        match self.role {
            Role::Client => {
                if !self.ready_to_play {
                    return StartDecision::Refused(StartRefusal::NotReadyToPlay);
                }
                self.ready_to_play = false;
                StartDecision::Allowed
            }
            Role::Host => {
                let loading = self.loading_members();
                if !loading.is_empty() {
                    if !self.committed_to_start {
                        info!("Holding start: {} members still loading", loading.len());
                        self.intention_to_start = true;
                        return StartDecision::Refused(StartRefusal::MembersLoading {
                            members: loading,
                        });
                    }
                    warn!("Forcing start with {} members still loading", loading.len());
                }

                self.intention_to_start = false;
                self.committed_to_start = false;
                self.match_started = true;
                self.platform.open_relay();
                self.export_session_config();
                self.ready_to_play = false;
                info!("Match started");
                StartDecision::Allowed
            }
            Role::None => StartDecision::Allowed,
        }
    }

    /// Second step of a forced start: after a refused
    /// [`LobbySession::request_level_start`], lets the next request through
    /// even with members still loading
    pub fn confirm_force_start(&mut self) -> Result<(), SessionError> {
        if self.role != Role::Host {
            return Err(SessionError::NotHost {
                operation: "force a level start",
            });
        }
        if !self.intention_to_start {
            return Err(SessionError::NoStartPending);
        }
        self.committed_to_start = true;
        Ok(())
    }

    /// Whether a start was refused and is waiting for
    /// [`LobbySession::confirm_force_start`]
    pub fn is_start_pending(&self) -> bool {
        self.intention_to_start
    }

    /// Whether the local player may deploy into the started match: only once
    /// every member that finished loading the lobby is also in the level
    pub fn deploy_allowed(&self) -> bool {
        let Some(lobby) = self.lobby else {
            return true;
        };
        self.members().into_iter().all(|member| {
            match MemberChannel::import_member::<MemberStatus>(&self.relay, lobby, member, None) {
                Some(status) => status.ready || !status.loaded,
                // unreadable status: wait for it
                None => false,
            }
        })
    }

    /// The local level finished loading
    pub fn on_level_loaded(&mut self) {
        self.local_status.ready = true;
    }

    /// The local player left the match for the menu
    pub fn on_return_to_menu(&mut self) {
        self.local_status.ready = false;
        self.ready_to_play = false;
        if self.role == Role::Host {
            self.match_started = false;
        }
    }

    /// Non-kicked members whose status is unreadable or not loaded
    fn loading_members(&self) -> Vec<MemberId> {
        let Some(lobby) = self.lobby else {
            return Vec::new();
        };
        self.members()
            .into_iter()
            .filter(|member| {
                MemberChannel::import_member::<MemberStatus>(&self.relay, lobby, *member, None)
                    .map_or(true, |status| !status.loaded)
            })
            .collect()
    }
}
