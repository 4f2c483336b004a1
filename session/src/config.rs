use std::time::Duration;

use lobbykit_shared::ReplicationConfig;

/// Contains Config properties which will be used by a LobbySession
#[derive(Clone, Debug)]
pub struct LobbyConfig {
    /// Identifies the local build; clients refuse hosts with another one
    pub build_id: String,
    /// How often each member publishes its MemberStatus
    pub member_status_period: Duration,
    /// How often the host republishes the SessionConfig
    pub config_export_period: Duration,
    /// How often a client reads the host's SessionConfig
    pub config_import_period: Duration,
    /// Base period of the lobby write drain
    pub drain_period: Duration,
    /// Longest delay the drain backs off to while writes keep failing
    pub drain_max_backoff: Duration,
    /// Used to configure the replication channels
    pub replication: ReplicationConfig,
    /// Window inside which repeated per-tick warnings are suppressed
    pub throttle_window: Duration,
    /// Client: subscribe to missing roster mods instead of downloading them,
    /// and unsubscribe from enabled mods the host does not run
    pub match_subscriptions: bool,
}

impl Default for LobbyConfig {
    fn default() -> Self {
        Self {
            build_id: concat!("lobbykit-", env!("CARGO_PKG_VERSION")).to_string(),
            member_status_period: Duration::from_secs(1),
            config_export_period: Duration::from_secs(1),
            config_import_period: Duration::from_secs(1),
            drain_period: Duration::from_millis(250),
            drain_max_backoff: Duration::from_secs(8),
            replication: ReplicationConfig::default(),
            throttle_window: Duration::from_secs(1),
            match_subscriptions: false,
        }
    }
}
