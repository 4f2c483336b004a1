/// Integration tests for a joining session: build checks, mod acquisition,
/// importing the host's settings, match start and the deploy gate

use std::collections::BTreeSet;
use std::time::Duration;

use lobbykit_session::{
    JobKind, ModId, Notification, PlatformEvent, Role, ServerSettings,
    SessionEvent, SessionState, StartDecision, StartRefusal,
};
use lobbykit_shared::{LobbyId, MemberId};
use lobbykit_test::{run_for, test_config, RelayHub, TestClock, TestPeer, TEST_BUILD};

const STEP: Duration = Duration::from_millis(250);

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn hosted_with(
    hub: &RelayHub,
    clock: &TestClock,
    settings: ServerSettings,
    mods: &[u64],
) -> (TestPeer, LobbyId) {
    let mut host = TestPeer::new(hub, 1);
    for id in mods {
        host.content().install(Some(*id), &format!("mod {}", id), true);
    }
    let lobby = host.host(settings, clock.now());
    host.tick(clock.now());
    (host, lobby)
}

fn hosted(hub: &RelayHub, clock: &TestClock) -> (TestPeer, LobbyId) {
    hosted_with(hub, clock, ServerSettings::default(), &[])
}

fn ids(values: &[u64]) -> BTreeSet<u64> {
    values.iter().copied().collect()
}

#[test]
fn client_downloads_missing_mods_one_at_a_time() {
    init_logger();
    let hub = RelayHub::new();
    let clock = TestClock::new();
    let now = clock.now();
    let (_host, lobby) = hosted_with(&hub, &clock, ServerSettings::default(), &[11, 12, 13]);

    let mut client = TestPeer::new(&hub, 2);
    client.content().install(Some(12), "B", true);
    client.content().install(Some(14), "D", true);
    client.session.join_lobby(lobby).unwrap();
    client.pump(now);

    assert_eq!(client.session.state(), SessionState::ClientSetup);
    assert!(client.session.is_data_ready());
    let queued: Vec<ModId> = client
        .session
        .acquisition()
        .unwrap()
        .to_download()
        .copied()
        .collect();
    assert_eq!(queued, vec![ModId::new(11), ModId::new(13)]);
    assert_eq!(client.session.content().downloads_requested(), &[ModId::new(11)]);
    assert_eq!(client.session.local_status().mods_needed, 2);

    client.finish_download(11, now);
    assert_eq!(
        client.session.content().downloads_requested(),
        &[ModId::new(11), ModId::new(13)]
    );

    // stale and unknown completions change nothing
    client
        .session
        .handle_event(PlatformEvent::DownloadComplete(ModId::new(11)), now);
    client
        .session
        .handle_event(PlatformEvent::DownloadComplete(ModId::new(99)), now);
    assert_eq!(client.session.content().downloads_requested().len(), 2);
    assert_eq!(client.session.local_status().mods_needed, 1);

    client.finish_download(13, now);
    assert_eq!(client.session.state(), SessionState::ClientSetup);
    assert!(client.session.content().is_reload_pending());

    client.finish_reload(now);
    assert_eq!(client.session.state(), SessionState::Ready);
    assert!(client.session.local_status().loaded);
    assert_eq!(client.session.local_status().mods_needed, 0);
    assert!(client.session.is_job_scheduled(JobKind::ConfigImport));
    assert_eq!(client.session.content().enabled_ids(), ids(&[11, 12, 13]));
    assert!(client.take_events().contains(&SessionEvent::ModsReady));
}

#[test]
fn client_can_match_its_subscriptions_to_the_host() {
    init_logger();
    let hub = RelayHub::new();
    let clock = TestClock::new();
    let now = clock.now();
    let (_host, lobby) = hosted_with(&hub, &clock, ServerSettings::default(), &[11]);

    let mut config = test_config();
    config.match_subscriptions = true;
    let mut client = TestPeer::with_config(&hub, 2, config);
    client.content().install(Some(14), "D", true);
    client.content().add_subscription(14);
    client.session.join_lobby(lobby).unwrap();
    client.pump(now);

    assert!(client.session.content().downloads_requested().is_empty());
    assert_eq!(client.session.content().subscribed_ids(), ids(&[11, 14]));

    client.finish_download(11, now);
    assert_eq!(client.session.content().subscribed_ids(), ids(&[11]));
    assert!(client.session.content().is_reload_pending());

    client.finish_reload(now);
    assert_eq!(client.session.state(), SessionState::Ready);
    assert_eq!(client.session.content().enabled_ids(), ids(&[11]));
}

#[test]
fn matching_mods_complete_without_a_reload() {
    init_logger();
    let hub = RelayHub::new();
    let clock = TestClock::new();
    let (_host, lobby) = hosted_with(&hub, &clock, ServerSettings::default(), &[11]);

    let mut client = TestPeer::new(&hub, 2);
    client.content().install(Some(11), "A", true);
    client.join(lobby, clock.now());

    assert_eq!(client.session.state(), SessionState::Ready);
    assert_eq!(client.session.content().reloads_requested(), 0);
    assert_eq!(
        client.take_events(),
        vec![
            SessionEvent::Entered {
                lobby,
                role: Role::Client
            },
            SessionEvent::ModsReady,
        ]
    );
}

#[test]
fn leaving_restores_local_mods() {
    init_logger();
    let hub = RelayHub::new();
    let clock = TestClock::new();
    let (_host, lobby) = hosted_with(&hub, &clock, ServerSettings::default(), &[11, 12, 13]);

    let mut client = TestPeer::new(&hub, 2);
    client.content().install(Some(12), "B", true);
    client.content().install(Some(14), "D", true);
    client.join(lobby, clock.now());
    assert_eq!(client.session.content().enabled_ids(), ids(&[11, 12, 13]));
    let reloads = client.session.content().reloads_requested();

    client.session.leave().unwrap();
    assert_eq!(client.session.state(), SessionState::Idle);
    assert_eq!(client.session.content().enabled_ids(), ids(&[12, 14]));
    assert_eq!(client.session.content().reloads_requested(), reloads + 1);
    assert!(!hub.lobby_members(lobby).contains(&client.member()));
}

#[test]
fn different_build_is_refused() {
    init_logger();
    let hub = RelayHub::new();
    let clock = TestClock::new();
    let mut config = test_config();
    config.build_id = "other-build".to_string();
    let mut host = TestPeer::with_config(&hub, 1, config);
    let lobby = host.host(ServerSettings::default(), clock.now());
    host.tick(clock.now());

    let mut client = TestPeer::new(&hub, 2);
    client.join(lobby, clock.now());

    assert_eq!(client.session.state(), SessionState::Idle);
    assert_eq!(
        client.take_events(),
        vec![
            SessionEvent::Left { lobby },
            SessionEvent::Notification(Notification::VersionMismatch {
                local: TEST_BUILD.to_string(),
                host: Some("other-build".to_string()),
            }),
        ]
    );
    assert!(!hub.lobby_members(lobby).contains(&client.member()));
}

#[test]
fn unreadable_host_settings_are_a_version_mismatch() {
    init_logger();
    let hub = RelayHub::new();
    let clock = TestClock::new();
    let (_host, lobby) = hosted(&hub, &clock);
    hub.set_lobby_value(lobby, "Server.MemberCap", "lots");

    let mut client = TestPeer::new(&hub, 2);
    client.join(lobby, clock.now());

    assert_eq!(client.session.state(), SessionState::Idle);
    assert!(client
        .session
        .events()
        .has_notification(&Notification::VersionMismatch {
            local: TEST_BUILD.to_string(),
            host: None,
        }));
}

#[test]
fn failed_entry_is_a_joining_error() {
    init_logger();
    let hub = RelayHub::new();
    let clock = TestClock::new();

    let mut client = TestPeer::new(&hub, 2);
    client.join(LobbyId::new(42), clock.now());

    assert_eq!(client.session.state(), SessionState::Idle);
    assert_eq!(
        client.take_events(),
        vec![SessionEvent::Notification(Notification::JoiningError)]
    );

    hub.refuse_entry(true);
    client.session.host_lobby(ServerSettings::default()).unwrap();
    client.pump(clock.now());
    assert_eq!(client.session.state(), SessionState::Idle);
    assert!(client
        .session
        .events()
        .has_notification(&Notification::JoiningError));
}

#[test]
fn abandoned_join_leaves_the_late_lobby() {
    init_logger();
    let hub = RelayHub::new();
    let clock = TestClock::new();
    let (_host, lobby) = hosted(&hub, &clock);

    let mut client = TestPeer::new(&hub, 2);
    client.session.join_lobby(lobby).unwrap();
    client.session.leave().unwrap();
    assert_eq!(client.session.state(), SessionState::Idle);

    client.pump(clock.now());
    assert_eq!(client.session.state(), SessionState::Idle);
    assert!(!hub.lobby_members(lobby).contains(&client.member()));
    assert!(client.take_events().is_empty());
}

#[test]
fn started_match_refuses_late_joiners_unless_allowed() {
    init_logger();
    let hub = RelayHub::new();
    let mut clock = TestClock::new();

    let (mut host, lobby) = hosted(&hub, &clock);
    assert!(host.session.request_level_start().is_allowed());
    host.tick(clock.advance(Duration::from_secs(1)));

    let mut late = TestPeer::new(&hub, 2);
    late.join(lobby, clock.now());
    assert_eq!(late.session.state(), SessionState::Idle);
    assert!(late
        .session
        .events()
        .has_notification(&Notification::HotJoinDisabled));

    let mut settings = ServerSettings::default();
    settings.midgame_join = true;
    let other_hub = RelayHub::new();
    let (mut open_host, open_lobby) = hosted_with(&other_hub, &clock, settings, &[]);
    assert!(open_host.session.request_level_start().is_allowed());
    open_host.tick(clock.advance(Duration::from_secs(1)));

    let mut joiner = TestPeer::new(&other_hub, 2);
    joiner.join(open_lobby, clock.now());
    assert_eq!(joiner.session.state(), SessionState::Ready);

    run_for(&mut [&mut open_host, &mut joiner], &mut clock, Duration::from_secs(2), STEP);
    assert!(joiner.session.match_started());
    assert!(joiner.take_events().contains(&SessionEvent::MatchStarting));
    assert_eq!(joiner.session.request_level_start(), StartDecision::Allowed);
}

#[test]
fn client_follows_the_hosts_match_start() {
    init_logger();
    let hub = RelayHub::new();
    let mut clock = TestClock::new();
    let (mut host, lobby) = hosted(&hub, &clock);
    let mut client = TestPeer::new(&hub, 2);
    client.join(lobby, clock.now());
    client.take_events();

    assert_eq!(
        client.session.request_level_start(),
        StartDecision::Refused(StartRefusal::NotReadyToPlay)
    );

    host.platform().settings.game_length = 30;
    run_for(&mut [&mut host, &mut client], &mut clock, Duration::from_secs(2), STEP);
    assert_eq!(client.session.platform().last_applied().unwrap().game_length, 30);
    assert!(!client.session.match_started());

    assert!(host.session.request_level_start().is_allowed());
    run_for(&mut [&mut host, &mut client], &mut clock, Duration::from_secs(2), STEP);

    assert_eq!(client.take_events(), vec![SessionEvent::MatchStarting]);
    assert_eq!(client.session.request_level_start(), StartDecision::Allowed);
    assert_eq!(
        client.session.request_level_start(),
        StartDecision::Refused(StartRefusal::NotReadyToPlay)
    );
}

#[test]
fn settings_that_do_not_apply_are_retried_after_a_cache_refresh() {
    init_logger();
    let hub = RelayHub::new();
    let mut clock = TestClock::new();
    let (mut host, lobby) = hosted(&hub, &clock);
    let mut client = TestPeer::new(&hub, 2);
    client.join(lobby, clock.now());
    run_for(&mut [&mut host, &mut client], &mut clock, Duration::from_secs(1), STEP);
    let applied = client.session.platform().applied.len();

    client.platform().fail_next_applies = 1;
    host.platform().settings.map_index = 4;
    run_for(&mut [&mut host, &mut client], &mut clock, Duration::from_secs(2), STEP);

    assert_eq!(client.session.platform().cache_refreshes, 1);
    assert!(client.session.platform().applied.len() > applied);
    assert_eq!(client.session.platform().last_applied().unwrap().map_index, 4);

    // a retry that also fails is not fatal
    client.platform().fail_next_applies = 2;
    run_for(&mut [&mut host, &mut client], &mut clock, Duration::from_secs(1), STEP);
    assert_eq!(client.session.state(), SessionState::Ready);
    assert!(client.session.platform().cache_refreshes >= 2);
}

#[test]
fn deploy_waits_for_loaded_members() {
    init_logger();
    let hub = RelayHub::new();
    let mut clock = TestClock::new();
    let (mut host, lobby) = hosted(&hub, &clock);
    let mut client = TestPeer::new(&hub, 2);
    client.join(lobby, clock.now());
    run_for(&mut [&mut host, &mut client], &mut clock, Duration::from_secs(1), STEP);

    // both loaded the lobby, neither is in the level yet
    assert!(!host.session.deploy_allowed());

    host.session.on_level_loaded();
    client.session.on_level_loaded();
    run_for(&mut [&mut host, &mut client], &mut clock, Duration::from_secs(2), STEP);
    assert!(host.session.deploy_allowed());
    assert!(client.session.deploy_allowed());

    hub.set_member_value(lobby, client.member(), "Ready", "perhaps");
    assert!(!host.session.deploy_allowed());
}

#[test]
fn browse_lists_only_browsable_lobbies() {
    init_logger();
    let hub = RelayHub::new();
    let clock = TestClock::new();

    let mut listed = TestPeer::new(&hub, 1);
    let listed_lobby = listed.host(ServerSettings::default(), clock.now());
    listed.tick(clock.now());

    let mut hidden = TestPeer::new(&hub, 2);
    let mut hidden_settings = ServerSettings::default();
    hidden_settings.include_in_browse_list = false;
    hidden.host(hidden_settings, clock.now());
    hidden.tick(clock.now());

    let mut friends = TestPeer::new(&hub, 3);
    let mut friends_settings = ServerSettings::default();
    friends_settings.friends_only = true;
    friends.host(friends_settings, clock.now());
    friends.tick(clock.now());

    let mut browser = TestPeer::new(&hub, 4);
    browser.session.refresh_lobby_list();
    browser.pump(clock.now());

    let open: Vec<LobbyId> = browser.session.open_lobbies().keys().copied().collect();
    assert_eq!(open, vec![listed_lobby]);
    assert_eq!(
        browser.session.open_lobbies()[&listed_lobby].owner_id,
        MemberId::new(1)
    );
    assert!(browser
        .take_events()
        .iter()
        .all(|event| *event == SessionEvent::LobbyListUpdated));

    // the listing entry is used for the join even if lobby data is damaged
    hub.set_lobby_value(listed_lobby, "Server.MemberCap", "lots");
    browser.join(listed_lobby, clock.now());
    assert_eq!(browser.session.state(), SessionState::Ready);
    assert_eq!(browser.session.server_settings().owner_id, MemberId::new(1));

    // lobbies that went away drop out of the listing
    listed.session.leave().unwrap();
    browser.pump(clock.now());
    browser.session.refresh_lobby_list();
    browser.pump(clock.now());
    assert!(!browser.session.open_lobbies().contains_key(&listed_lobby));
}

#[test]
fn acquisition_waits_on_the_outstanding_download() {
    init_logger();
    let hub = RelayHub::new();
    let clock = TestClock::new();
    let (_host, lobby) = hosted_with(&hub, &clock, ServerSettings::default(), &[21]);

    let mut client = TestPeer::new(&hub, 2);
    client.session.join_lobby(lobby).unwrap();
    client.pump(clock.now());

    let acquisition = client.session.acquisition().unwrap();
    assert_eq!(acquisition.remaining(), 1);
    assert!(!acquisition.is_complete());
    assert_eq!(
        client.session.content().outstanding_downloads(),
        &[ModId::new(21)]
    );
}
