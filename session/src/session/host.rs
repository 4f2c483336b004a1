use std::time::Instant;

use log::{debug, info, warn};

use lobbykit_shared::{DrainStatus, LobbyId, LobbyVisibility, MemberId, Relay};

use crate::{
    content::ContentManager,
    error::SessionError,
    events::SessionEvent,
    platform::Platform,
    records::{ModId, ServerSettings, SessionConfig, SERVER_PREFIX},
    session::{JobKind, LobbySession, Role, SessionState},
};

impl<R: Relay, C: ContentManager, P: Platform> LobbySession<R, C, P> {
    /// Asks the relay for a new lobby hosted by the local member. The
    /// session enters the lobby once [`PlatformEvent::LobbyEntered`] arrives.
    ///
    /// [`PlatformEvent::LobbyEntered`]: crate::PlatformEvent::LobbyEntered
    pub fn host_lobby(&mut self, settings: ServerSettings) -> Result<(), SessionError> {
        if self.state != SessionState::Idle {
            return Err(SessionError::WrongState {
                operation: "host a lobby",
                state: self.state,
            });
        }

        self.server_settings = settings;
        self.server_settings.build_id = self.config.build_id.clone();
        let visibility = if self.server_settings.friends_only {
            LobbyVisibility::FriendsOnly
        } else {
            LobbyVisibility::Public
        };

        info!("Creating {:?} lobby", visibility);
        self.relay
            .create_lobby(visibility, self.server_settings.member_cap());
        self.role = Role::Host;
        self.state = SessionState::Joining;
        Ok(())
    }

    /// Removes a member: it no longer counts as a member of this lobby, gets
    /// a kick notice and loses its in-match connection
    pub fn kick(&mut self, member: MemberId) -> Result<(), SessionError> {
        if self.role != Role::Host {
            return Err(SessionError::NotHost {
                operation: "kick a member",
            });
        }
        let Some(lobby) = self.lobby else {
            return Err(SessionError::NotInLobby {
                operation: "kick a member",
            });
        };
        if member == self.relay.local_member() {
            return Err(SessionError::CannotKickSelf);
        }
        if !self.kicked.contains(&member) && !self.relay.members(lobby).contains(&member) {
            return Err(SessionError::UnknownMember { member });
        }

        info!("Kicking {} from {}", member, lobby);
        if self.kicked.insert(member) {
            self.events.push(SessionEvent::MemberKicked(member));
        }
        self.platform.send_kick_notice(member);
        self.platform.close_connection(member);
        Ok(())
    }

    pub(super) fn host_setup(&mut self, lobby: LobbyId, now: Instant) {
        self.state = SessionState::HostSetup;
        self.server_settings.owner_id = self.relay.local_member();
        self.server_settings.mods = self.publishable_mods();
        self.data_ready = true;

        if let Some(channel) = self.lobby_channel.as_mut() {
            channel.export_to(&self.server_settings, Some(SERVER_PREFIX));
        }
        self.scheduler
            .schedule(JobKind::ConfigExport, self.config.config_export_period, now);
        self.scheduler.schedule_with_backoff(
            JobKind::LobbyDrain,
            self.config.drain_period,
            self.config.drain_max_backoff,
            now,
        );

        self.local_status.loaded = true;
        self.state = SessionState::Ready;
        self.export_member_status();
        info!(
            "Hosting {} with {} mods",
            lobby,
            self.server_settings.mods.len()
        );
        self.events.push(SessionEvent::Entered {
            lobby,
            role: Role::Host,
        });
    }

    /// Ids of the enabled mods peers can fetch. Enabled mods without an
    /// external id are disabled, with a content reload if any were.
    fn publishable_mods(&mut self) -> Vec<ModId> {
        let mut roster = Vec::new();
        let mut needs_reload = false;

        for installed in self.content.mods() {
            if !installed.enabled {
                continue;
            }
            match installed.external_id {
                Some(id) => roster.push(id),
                None => {
                    info!(
                        "Disabling {:?}: it has no external id other members can fetch",
                        installed.title
                    );
                    self.content.set_enabled(installed.key, false);
                    needs_reload = true;
                }
            }
        }

        if needs_reload {
            self.content.reload_content();
        }
        roster
    }

    /// Queues the current SessionConfig into the lobby channel
    pub(super) fn export_session_config(&mut self) {
        let Some(channel) = self.lobby_channel.as_mut() else {
            return;
        };

        let mut match_settings = self.platform.read_match_settings();
        match_settings.match_started = self.match_started;
        let config = SessionConfig {
            server: self.server_settings.clone(),
            match_settings,
        };

        let queued = channel.export_to(&config, None);
        if queued > 0 {
            debug!("Queued {} changed SessionConfig fields", queued);
            self.record_log.log_changes("host", &config);
        }
    }

    pub(super) fn drain_lobby_channel(&mut self, now: Instant) {
        let Some(channel) = self.lobby_channel.as_mut() else {
            return;
        };

        match channel.drain(&mut self.relay) {
            DrainStatus::Done | DrainStatus::Pending { .. } => {
                self.scheduler.reset_backoff(JobKind::LobbyDrain);
            }
            DrainStatus::Failed { key, error } => {
                self.scheduler.backoff(JobKind::LobbyDrain, now);
                if self.throttle.should_log("lobby-drain", now) {
                    warn!("Lobby write of {:?} failed, backing off: {}", key, error);
                }
            }
        }
    }
}
