/// Integration tests for a hosting session: setup, start gating, kicking,
/// drain backoff and teardown

use std::time::Duration;

use lobbykit_session::{
    JobKind, ModId, ModKey, Notification, Role, ServerSettings, SessionError, SessionEvent,
    SessionState, StartDecision, StartRefusal,
};
use lobbykit_shared::{LobbyId, LobbyVisibility, MemberId};
use lobbykit_test::{run_for, RelayHub, TestClock, TestPeer, TEST_BUILD};

const STEP: Duration = Duration::from_millis(50);

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A host with one mod published, already flushed to the relay
fn hosted(hub: &RelayHub, clock: &TestClock) -> (TestPeer, LobbyId) {
    let mut host = TestPeer::new(hub, 1);
    host.content().install(Some(11), "Jungle", true);
    let lobby = host.host(ServerSettings::default(), clock.now());
    host.tick(clock.now());
    (host, lobby)
}

/// A client that already holds every host mod, joined and ready
fn ready_client(hub: &RelayHub, clock: &TestClock, id: u64, lobby: LobbyId) -> TestPeer {
    let mut client = TestPeer::new(hub, id);
    client.content().install(Some(11), "Jungle", true);
    client.join(lobby, clock.now());
    assert_eq!(client.session.state(), SessionState::Ready);
    client
}

/// A client whose mod download is left outstanding
fn loading_client(hub: &RelayHub, clock: &TestClock, id: u64, lobby: LobbyId) -> TestPeer {
    let mut client = TestPeer::new(hub, id);
    client.session.join_lobby(lobby).unwrap();
    client.pump(clock.now());
    assert_eq!(client.session.state(), SessionState::ClientSetup);
    client
}

#[test]
fn host_setup_publishes_server_settings() {
    init_logger();
    let hub = RelayHub::new();
    let clock = TestClock::new();
    let mut host = TestPeer::new(&hub, 1);
    host.content().install(Some(11), "Jungle", true);
    host.content().install(None, "Workshop draft", true);
    host.content().install(Some(12), "Tanks", false);

    let mut settings = ServerSettings::default();
    settings.set_member_cap(8);
    let lobby = host.host(settings, clock.now());

    assert_eq!(host.session.state(), SessionState::Ready);
    assert_eq!(host.session.role(), Role::Host);
    assert!(host.session.is_data_ready());
    assert_eq!(host.session.server_settings().mods, vec![ModId::new(11)]);
    assert_eq!(host.session.server_settings().owner_id, MemberId::new(1));
    assert_eq!(hub.lobby_owner(lobby), Some(MemberId::new(1)));
    assert_eq!(hub.lobby_cap(lobby), Some(8));
    assert_eq!(hub.lobby_visibility(lobby), Some(LobbyVisibility::Public));

    // the local-only mod cannot be fetched by anyone else
    assert!(!host.session.content().is_enabled(ModKey(1)));
    assert_eq!(host.session.content().reloads_requested(), 1);

    host.tick(clock.now());
    assert_eq!(hub.lobby_value(lobby, "Server.BuildId").as_deref(), Some(TEST_BUILD));
    assert_eq!(hub.lobby_value(lobby, "Server.OwnerId").as_deref(), Some("1"));
    assert_eq!(hub.lobby_value(lobby, "Server.MemberCap").as_deref(), Some("8"));
    assert_eq!(hub.lobby_value(lobby, "Server.Mods").as_deref(), Some("11"));
    assert_eq!(hub.lobby_value(lobby, "Match.MatchStarted").as_deref(), Some("false"));
    assert_eq!(
        hub.member_value(lobby, MemberId::new(1), "Loaded").as_deref(),
        Some("true")
    );

    assert_eq!(
        host.take_events(),
        vec![SessionEvent::Entered {
            lobby,
            role: Role::Host
        }]
    );
}

#[test]
fn friends_only_lobby_is_not_public() {
    init_logger();
    let hub = RelayHub::new();
    let clock = TestClock::new();
    let mut host = TestPeer::new(&hub, 1);

    let mut settings = ServerSettings::default();
    settings.friends_only = true;
    let lobby = host.host(settings, clock.now());
    assert_eq!(hub.lobby_visibility(lobby), Some(LobbyVisibility::FriendsOnly));
}

#[test]
fn hosting_twice_is_refused() {
    init_logger();
    let hub = RelayHub::new();
    let clock = TestClock::new();
    let (mut host, _) = hosted(&hub, &clock);

    assert_eq!(
        host.session.host_lobby(ServerSettings::default()),
        Err(SessionError::WrongState {
            operation: "host a lobby",
            state: SessionState::Ready,
        })
    );
    assert!(matches!(
        host.session.join_lobby(LobbyId::new(7)),
        Err(SessionError::WrongState { .. })
    ));
}

#[test]
fn start_waits_for_every_member_to_load() {
    init_logger();
    let hub = RelayHub::new();
    let mut clock = TestClock::new();
    let (mut host, lobby) = hosted(&hub, &clock);
    let _ready = ready_client(&hub, &clock, 2, lobby);
    let mut loading = loading_client(&hub, &clock, 3, lobby);

    assert_eq!(
        host.session.request_level_start(),
        StartDecision::Refused(StartRefusal::MembersLoading {
            members: vec![MemberId::new(3)]
        })
    );
    assert!(host.session.is_start_pending());
    assert!(!host.session.match_started());
    assert!(!host.session.platform().relay_open);

    let now = clock.advance(Duration::from_secs(1));
    loading.settle(now);
    loading.tick(now);
    assert_eq!(loading.session.state(), SessionState::Ready);

    assert_eq!(host.session.request_level_start(), StartDecision::Allowed);
    assert!(host.session.match_started());
    assert!(host.session.platform().relay_open);
    assert!(!host.session.is_start_pending());

    host.tick(clock.advance(Duration::from_secs(1)));
    assert_eq!(hub.lobby_value(lobby, "Match.MatchStarted").as_deref(), Some("true"));
}

#[test]
fn forced_start_takes_two_steps() {
    init_logger();
    let hub = RelayHub::new();
    let clock = TestClock::new();
    let (mut host, lobby) = hosted(&hub, &clock);
    let _loading = loading_client(&hub, &clock, 2, lobby);

    assert_eq!(
        host.session.confirm_force_start(),
        Err(SessionError::NoStartPending)
    );

    assert!(!host.session.request_level_start().is_allowed());
    // a second plain request is still refused
    assert!(!host.session.request_level_start().is_allowed());

    host.session.confirm_force_start().unwrap();
    assert_eq!(host.session.request_level_start(), StartDecision::Allowed);
    assert!(host.session.match_started());
}

#[test]
fn only_the_host_forces_a_start() {
    init_logger();
    let hub = RelayHub::new();
    let clock = TestClock::new();
    let (_host, lobby) = hosted(&hub, &clock);
    let mut client = ready_client(&hub, &clock, 2, lobby);

    assert_eq!(
        client.session.confirm_force_start(),
        Err(SessionError::NotHost {
            operation: "force a level start"
        })
    );
}

#[test]
fn start_outside_a_lobby_is_allowed() {
    init_logger();
    let hub = RelayHub::new();
    let mut peer = TestPeer::new(&hub, 1);
    assert_eq!(peer.session.request_level_start(), StartDecision::Allowed);
}

#[test]
fn kicked_member_leaves_and_stops_gating() {
    init_logger();
    let hub = RelayHub::new();
    let clock = TestClock::new();
    let (mut host, lobby) = hosted(&hub, &clock);
    let mut loading = loading_client(&hub, &clock, 2, lobby);
    host.take_events();

    assert!(!host.session.request_level_start().is_allowed());

    let member = loading.member();
    host.session.kick(member).unwrap();
    assert!(host.session.kicked().contains(&member));
    assert!(!host.session.members().contains(&member));
    assert_eq!(host.take_events(), vec![SessionEvent::MemberKicked(member)]);
    assert_eq!(host.session.platform().kick_notices, vec![member]);
    assert_eq!(host.session.platform().closed_connections, vec![member]);

    loading.pump(clock.now());
    assert_eq!(loading.session.state(), SessionState::Idle);
    assert!(loading
        .session
        .events()
        .has_notification(&Notification::Kicked));
    assert!(!hub.lobby_members(lobby).contains(&member));

    assert_eq!(host.session.request_level_start(), StartDecision::Allowed);
}

#[test]
fn kick_rejects_invalid_targets() {
    init_logger();
    let hub = RelayHub::new();
    let clock = TestClock::new();
    let (mut host, lobby) = hosted(&hub, &clock);
    let mut client = ready_client(&hub, &clock, 2, lobby);

    assert_eq!(
        host.session.kick(MemberId::new(1)),
        Err(SessionError::CannotKickSelf)
    );
    assert_eq!(
        host.session.kick(MemberId::new(99)),
        Err(SessionError::UnknownMember {
            member: MemberId::new(99)
        })
    );
    assert!(matches!(
        client.session.kick(MemberId::new(1)),
        Err(SessionError::NotHost { .. })
    ));

    let mut idle = TestPeer::new(&hub, 5);
    assert!(matches!(
        idle.session.kick(MemberId::new(1)),
        Err(SessionError::NotHost { .. })
    ));
}

#[test]
fn failing_drain_backs_off() {
    init_logger();
    let hub = RelayHub::new();
    let mut clock = TestClock::new();
    let mut host = TestPeer::new(&hub, 1);
    let lobby = host.host(ServerSettings::default(), clock.now());

    hub.fail_key("Server.BuildId");
    let attempts_before = hub.attempts();
    run_for(&mut [&mut host], &mut clock, Duration::from_secs(8), STEP);

    // 250ms base period doubling on every failure
    let attempts = hub.attempts() - attempts_before;
    assert!(attempts >= 3, "only {} attempts", attempts);
    assert!(attempts < 10, "{} attempts while failing", attempts);
    assert!(hub.lobby_value(lobby, "Server.BuildId").is_none());
    assert!(!host.session.lobby_channel().unwrap().is_flushed());
    assert_eq!(host.session.state(), SessionState::Ready);

    hub.clear_failures();
    run_for(&mut [&mut host], &mut clock, Duration::from_secs(10), STEP);
    assert!(host.session.lobby_channel().unwrap().is_flushed());
    assert_eq!(
        hub.lobby_value(lobby, "Server.BuildId").as_deref(),
        Some(TEST_BUILD)
    );
}

#[test]
fn leaving_stops_every_job() {
    init_logger();
    let hub = RelayHub::new();
    let mut clock = TestClock::new();
    let (mut host, lobby) = hosted(&hub, &clock);
    assert!(host.session.is_job_scheduled(JobKind::LobbyDrain));
    host.take_events();

    host.session.leave().unwrap();
    assert_eq!(host.session.state(), SessionState::Idle);
    assert_eq!(host.session.role(), Role::None);
    assert!(!host.session.is_in_lobby());
    assert_eq!(host.take_events(), vec![SessionEvent::Left { lobby }]);
    for kind in [
        JobKind::MemberStatusExport,
        JobKind::ConfigExport,
        JobKind::LobbyDrain,
        JobKind::ConfigImport,
    ] {
        assert!(!host.session.is_job_scheduled(kind));
    }
    assert!(host.session.lobby_channel().is_none());
    assert!(!hub.lobby_exists(lobby));

    let attempts = hub.attempts();
    run_for(&mut [&mut host], &mut clock, Duration::from_secs(5), STEP);
    assert_eq!(hub.attempts(), attempts);

    assert_eq!(
        host.session.leave(),
        Err(SessionError::NotInLobby { operation: "leave" })
    );
}

#[test]
fn host_leaving_disconnects_clients() {
    init_logger();
    let hub = RelayHub::new();
    let clock = TestClock::new();
    let (mut host, lobby) = hosted(&hub, &clock);
    let mut client = ready_client(&hub, &clock, 2, lobby);
    client.take_events();

    host.session.leave().unwrap();
    client.pump(clock.now());
    assert_eq!(client.session.state(), SessionState::Idle);
    assert_eq!(client.take_events(), vec![SessionEvent::Left { lobby }]);
}

#[test]
fn returning_to_menu_ends_the_match() {
    init_logger();
    let hub = RelayHub::new();
    let clock = TestClock::new();
    let (mut host, _) = hosted(&hub, &clock);

    assert!(host.session.request_level_start().is_allowed());
    host.session.on_level_loaded();
    assert!(host.session.local_status().ready);

    host.session.on_return_to_menu();
    assert!(!host.session.match_started());
    assert!(!host.session.local_status().ready);
}
