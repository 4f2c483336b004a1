use std::time::Instant;

use log::{debug, info, warn};

use lobbykit_shared::{LobbyId, Relay};

use crate::{
    content::ContentManager,
    error::SessionError,
    events::{Notification, SessionEvent},
    platform::Platform,
    records::{MatchSettings, ModId, ServerSettings, SessionConfig, MATCH_PREFIX, SERVER_PREFIX},
    session::{AcquisitionStep, JobKind, LobbySession, ModAcquisition, Role, SessionState},
};

impl<R: Relay, C: ContentManager, P: Platform> LobbySession<R, C, P> {
    /// Asks the relay to enter an existing lobby as a client. The session
    /// enters the lobby once [`PlatformEvent::LobbyEntered`] arrives.
    ///
    /// [`PlatformEvent::LobbyEntered`]: crate::PlatformEvent::LobbyEntered
    pub fn join_lobby(&mut self, lobby: LobbyId) -> Result<(), SessionError> {
        if self.state != SessionState::Idle {
            return Err(SessionError::WrongState {
                operation: "join a lobby",
                state: self.state,
            });
        }

        info!("Joining {}", lobby);
        self.relay.join_lobby(lobby);
        self.role = Role::Client;
        self.state = SessionState::Joining;
        Ok(())
    }

    pub(super) fn client_setup(&mut self, lobby: LobbyId, now: Instant) {
        self.state = SessionState::ClientSetup;

        let server = match self.read_host_server_settings(lobby) {
            Some(server) => server,
            None => {
                self.abort(Notification::VersionMismatch {
                    local: self.config.build_id.clone(),
                    host: None,
                });
                return;
            }
        };

        if server.build_id != self.config.build_id {
            warn!(
                "Host runs build {:?}, local build is {:?}",
                server.build_id, self.config.build_id
            );
            self.abort(Notification::VersionMismatch {
                local: self.config.build_id.clone(),
                host: Some(server.build_id),
            });
            return;
        }

        if self.host_match_started() && !server.midgame_join {
            self.abort(Notification::HotJoinDisabled);
            return;
        }

        info!("Host is {}", server.owner_id);
        self.server_settings = server;
        self.data_ready = true;

        let acquisition = ModAcquisition::plan(&self.server_settings.mods, &self.content.mods())
            .with_subscription_matching(self.config.match_subscriptions);
        info!(
            "Host runs {} mods, {} to download",
            self.server_settings.mods.len(),
            acquisition.remaining()
        );
        self.acquisition = Some(acquisition);
        self.events.push(SessionEvent::Entered {
            lobby,
            role: Role::Client,
        });

        self.advance_acquisition(now);
        self.export_member_status();
    }

    /// The host's ServerSettings, from the browse listing if it holds this
    /// lobby, else from lobby data
    fn read_host_server_settings(&self, lobby: LobbyId) -> Option<ServerSettings> {
        if let Some(listed) = self.open_lobbies.get(&lobby) {
            return Some(listed.clone());
        }
        let channel = self.lobby_channel.as_ref()?;
        channel.import_from::<ServerSettings>(&self.relay, Some(SERVER_PREFIX))
    }

    fn host_match_started(&self) -> bool {
        self.lobby_channel
            .as_ref()
            .and_then(|channel| channel.import_from::<MatchSettings>(&self.relay, Some(MATCH_PREFIX)))
            .is_some_and(|settings| settings.match_started)
    }

    pub(super) fn on_download_complete(&mut self, id: ModId, now: Instant) {
        let Some(acquisition) = self.acquisition.as_mut() else {
            debug!("Ignoring download of {} outside of mod acquisition", id);
            return;
        };
        if acquisition.on_download_complete(id) {
            self.advance_acquisition(now);
        }
    }

    pub(super) fn on_content_reloaded(&mut self, now: Instant) {
        let Some(acquisition) = self.acquisition.as_mut() else {
            return;
        };
        if acquisition.on_reloaded() {
            self.advance_acquisition(now);
        }
    }

    fn advance_acquisition(&mut self, now: Instant) {
        let Some(acquisition) = self.acquisition.as_mut() else {
            return;
        };
        let step = acquisition.advance(&mut self.content);
        self.local_status.mods_needed = u32::try_from(acquisition.remaining()).unwrap_or(u32::MAX);

        if step == AcquisitionStep::Complete && self.state == SessionState::ClientSetup {
            info!("Mods match the host");
            self.state = SessionState::Ready;
            self.local_status.loaded = true;
            self.scheduler
                .schedule(JobKind::ConfigImport, self.config.config_import_period, now);
            self.events.push(SessionEvent::ModsReady);
        }
    }

    /// Reads the host's SessionConfig and applies it to the live settings
    pub(super) fn import_session_config(&mut self, now: Instant) {
        let Some(channel) = self.lobby_channel.as_ref() else {
            return;
        };
        let config: SessionConfig = match channel.try_import_from(&self.relay, None) {
            Ok(config) => config,
            Err(error) => {
                if self.throttle.should_log("config-import", now) {
                    warn!("Could not read the host's settings: {}", error);
                }
                return;
            }
        };

        self.record_log.log_changes("client", &config);
        self.apply_match_settings(&config.match_settings, now);

        let started = config.match_settings.match_started;
        if started && !self.match_started {
            info!("Host started the match");
            self.ready_to_play = true;
            self.events.push(SessionEvent::MatchStarting);
        }
        self.match_started = started;
        self.server_settings = config.server;
    }

    /// Applies match settings, refreshing the content cache and retrying
    /// once if the game cannot resolve them
    fn apply_match_settings(&mut self, settings: &MatchSettings, now: Instant) {
        let Err(error) = self.platform.apply_match_settings(settings) else {
            return;
        };
        self.throttle.warn(
            "apply-settings",
            now,
            &format!("Could not apply match settings ({}), refreshing content cache", error),
        );

        self.platform.refresh_content_cache();
        if let Err(error) = self.platform.apply_match_settings(settings) {
            self.throttle.warn(
                "apply-settings-retry",
                now,
                &format!("Match settings still do not apply after refresh: {}", error),
            );
        }
    }
}
