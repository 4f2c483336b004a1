mod browse;
mod client;
mod gating;
mod host;
mod mods;

pub use gating::{StartDecision, StartRefusal};
pub use mods::{AcquisitionStep, ModAcquisition};

use std::{
    collections::{BTreeMap, BTreeSet},
    time::Instant,
};

use log::{info, warn};

use lobbykit_shared::{
    LobbyChannel, LobbyId, MemberChannel, MemberId, RecordLog, Relay, Scheduler, ThrottledLog,
};

use crate::{
    config::LobbyConfig,
    content::ContentManager,
    error::SessionError,
    events::{Notification, PlatformEvent, SessionEvent, SessionEvents},
    platform::Platform,
    records::{MemberStatus, ServerSettings},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionState {
    Idle,
    /// A create or join request is waiting for the relay
    Joining,
    HostSetup,
    /// Reading the host's settings and acquiring its mods
    ClientSetup,
    Ready,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    None,
    Host,
    Client,
}

/// Periodic work a session runs while in a lobby
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JobKind {
    MemberStatusExport,
    ConfigExport,
    LobbyDrain,
    ConfigImport,
}

/// One peer's side of a lobby.
///
/// All work happens on the caller's thread: commands are methods, relay and
/// content completions are fed in through [`LobbySession::handle_event`], and
/// periodic replication runs from [`LobbySession::tick`].
pub struct LobbySession<R: Relay, C: ContentManager, P: Platform> {
    config: LobbyConfig,
    relay: R,
    content: C,
    platform: P,

    state: SessionState,
    role: Role,
    lobby: Option<LobbyId>,
    data_ready: bool,
    scheduler: Scheduler<JobKind>,
    lobby_channel: Option<LobbyChannel>,
    member_channel: Option<MemberChannel>,

    server_settings: ServerSettings,
    match_started: bool,
    local_status: MemberStatus,
    acquisition: Option<ModAcquisition>,
    kicked: BTreeSet<MemberId>,
    ready_to_play: bool,
    intention_to_start: bool,
    committed_to_start: bool,

    open_lobbies: BTreeMap<LobbyId, ServerSettings>,
    events: SessionEvents,
    throttle: ThrottledLog,
    record_log: RecordLog,
}

impl<R: Relay, C: ContentManager, P: Platform> LobbySession<R, C, P> {
    pub fn new(config: LobbyConfig, relay: R, content: C, platform: P) -> Self {
        let throttle = ThrottledLog::new(config.throttle_window);
        Self {
            config,
            relay,
            content,
            platform,

            state: SessionState::Idle,
            role: Role::None,
            lobby: None,
            data_ready: false,
            scheduler: Scheduler::new(),
            lobby_channel: None,
            member_channel: None,

            server_settings: ServerSettings::default(),
            match_started: false,
            local_status: MemberStatus::default(),
            acquisition: None,
            kicked: BTreeSet::new(),
            ready_to_play: false,
            intention_to_start: false,
            committed_to_start: false,

            open_lobbies: BTreeMap::new(),
            events: SessionEvents::new(),
            throttle,
            record_log: RecordLog::new(),
        }
    }

    // Accessors

    pub fn config(&self) -> &LobbyConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// The lobby the session has entered, if any
    pub fn lobby(&self) -> Option<LobbyId> {
        self.lobby
    }

    pub fn is_in_lobby(&self) -> bool {
        self.lobby.is_some()
    }

    /// Whether the session holds the host's settings: immediately for the
    /// host, after a successful import for a client
    pub fn is_data_ready(&self) -> bool {
        self.data_ready
    }

    pub fn is_host(&self) -> bool {
        self.role == Role::Host
    }

    pub fn server_settings(&self) -> &ServerSettings {
        &self.server_settings
    }

    /// Host: whether the match was started. Client: whether the host's
    /// settings last said so.
    pub fn match_started(&self) -> bool {
        self.match_started
    }

    pub fn local_status(&self) -> &MemberStatus {
        &self.local_status
    }

    pub fn acquisition(&self) -> Option<&ModAcquisition> {
        self.acquisition.as_ref()
    }

    pub fn lobby_channel(&self) -> Option<&LobbyChannel> {
        self.lobby_channel.as_ref()
    }

    pub fn kicked(&self) -> &BTreeSet<MemberId> {
        &self.kicked
    }

    pub fn is_job_scheduled(&self, kind: JobKind) -> bool {
        self.scheduler.is_scheduled(kind)
    }

    pub fn events(&self) -> &SessionEvents {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        self.events.take()
    }

    pub fn relay(&self) -> &R {
        &self.relay
    }

    pub fn relay_mut(&mut self) -> &mut R {
        &mut self.relay
    }

    pub fn content(&self) -> &C {
        &self.content
    }

    pub fn content_mut(&mut self) -> &mut C {
        &mut self.content
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    /// Members of the current lobby, minus anyone kicked
    pub fn members(&self) -> Vec<MemberId> {
        let Some(lobby) = self.lobby else {
            return Vec::new();
        };
        self.relay
            .members(lobby)
            .into_iter()
            .filter(|member| !self.kicked.contains(member))
            .collect()
    }

    // Lifecycle

    /// Leaves the current lobby, or abandons a pending create or join
    pub fn leave(&mut self) -> Result<(), SessionError> {
        match (self.state, self.lobby) {
            (SessionState::Idle, _) => Err(SessionError::NotInLobby { operation: "leave" }),
            (_, None) => {
                info!("Abandoning lobby request");
                self.reset();
                Ok(())
            }
            (_, Some(lobby)) => {
                info!("Leaving {}", lobby);
                self.relay.leave_lobby(lobby);
                self.reset();
                self.events.push(SessionEvent::Left { lobby });
                Ok(())
            }
        }
    }

    pub fn handle_event(&mut self, event: PlatformEvent, now: Instant) {
        match event {
            PlatformEvent::LobbyEntered { lobby, success } => {
                self.on_lobby_entered(lobby, success, now)
            }
            PlatformEvent::DownloadComplete(id) => self.on_download_complete(id, now),
            PlatformEvent::ContentReloaded => self.on_content_reloaded(now),
            PlatformEvent::LobbyList(lobbies) => self.on_lobby_list(lobbies),
            PlatformEvent::LobbyDataUpdated { lobby, success } => {
                self.on_lobby_data_updated(lobby, success)
            }
            PlatformEvent::KickNoticeReceived => {
                if self.is_in_lobby() && self.role == Role::Client {
                    self.abort(Notification::Kicked);
                }
            }
            PlatformEvent::Disconnected => {
                if let Some(lobby) = self.lobby {
                    warn!("Lost connection to {}", lobby);
                    self.reset();
                    self.events.push(SessionEvent::Left { lobby });
                }
            }
        }
    }

    /// Runs every periodic job that is due at `now`
    pub fn tick(&mut self, now: Instant) {
        for kind in self.scheduler.due(now) {
            // an earlier job in this batch may have reset the session
            if !self.scheduler.is_scheduled(kind) {
                continue;
            }
            match kind {
                JobKind::MemberStatusExport => self.export_member_status(),
                JobKind::ConfigExport => self.export_session_config(),
                JobKind::LobbyDrain => self.drain_lobby_channel(now),
                JobKind::ConfigImport => self.import_session_config(now),
            }
        }
    }

    fn on_lobby_entered(&mut self, lobby: LobbyId, success: bool, now: Instant) {
        if self.state != SessionState::Joining {
            if success {
                warn!("Entered {} with no request pending, leaving it", lobby);
                self.relay.leave_lobby(lobby);
            }
            return;
        }

        if !success {
            warn!("Could not enter {}", lobby);
            self.reset();
            self.events.push_notification(Notification::JoiningError);
            return;
        }

        info!("Entered {}", lobby);
        self.lobby = Some(lobby);
        let member = self.relay.local_member();
        self.lobby_channel = Some(LobbyChannel::new(lobby, self.config.replication.clone()));
        self.member_channel = Some(MemberChannel::new(
            lobby,
            member,
            self.config.replication.clone(),
        ));
        self.scheduler.schedule(
            JobKind::MemberStatusExport,
            self.config.member_status_period,
            now,
        );

        match self.role {
            Role::Host => self.host_setup(lobby, now),
            Role::Client => self.client_setup(lobby, now),
            Role::None => self.abort(Notification::JoiningError),
        }
    }

    /// Ends the lobby visit because of `notification`, leaving the lobby if
    /// it was entered
    fn abort(&mut self, notification: Notification) {
        warn!("Leaving lobby: {:?}", notification);
        if let Some(lobby) = self.lobby {
            self.relay.leave_lobby(lobby);
            self.reset();
            self.events.push(SessionEvent::Left { lobby });
        } else {
            self.reset();
        }
        self.events.push_notification(notification);
    }

    /// Returns to `Idle`, stopping every job and dropping every cache and
    /// queue
    fn reset(&mut self) {
        self.scheduler.clear();
        if let Some(mut channel) = self.lobby_channel.take() {
            channel.reset();
        }
        if let Some(mut channel) = self.member_channel.take() {
            channel.reset();
        }
        if let Some(mut acquisition) = self.acquisition.take() {
            acquisition.restore(&mut self.content);
        }

        self.state = SessionState::Idle;
        self.role = Role::None;
        self.lobby = None;
        self.data_ready = false;
        self.server_settings = ServerSettings::default();
        self.match_started = false;
        self.local_status = MemberStatus::default();
        self.kicked.clear();
        self.ready_to_play = false;
        self.intention_to_start = false;
        self.committed_to_start = false;
        self.throttle.clear();
        self.record_log.clear();
    }

    fn export_member_status(&mut self) {
        let Some(channel) = self.member_channel.as_mut() else {
            return;
        };
        self.local_status.team = self.platform.local_team();
        let summary = channel.export_to(&mut self.relay, &self.local_status, None);
        if summary.written > 0 {
            self.record_log.log_changes("member", &self.local_status);
        }
    }
}
