//! Records replicated through the relay. [`SessionConfig`] lives in lobby
//! data and is written only by the host; every member writes its own
//! [`MemberStatus`].

use std::fmt;

use lobbykit_shared::{impl_record, wire_enum, DecodeError, FieldCodec, MemberId};

/// Wire prefix of [`ServerSettings`] inside a [`SessionConfig`]
pub const SERVER_PREFIX: &str = "Server";
/// Wire prefix of [`MatchSettings`] inside a [`SessionConfig`]
pub const MATCH_PREFIX: &str = "Match";

pub const MEMBER_CAP_MIN: u32 = 2;
pub const MEMBER_CAP_MAX: u32 = 250;

/// External content id of a mod, as published by the hosting platform
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModId(u64);

impl ModId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ModId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mod#{}", self.0)
    }
}

impl FieldCodec for ModId {
    fn encode(&self) -> String {
        self.0.encode()
    }

    fn decode(wire: &str) -> Result<Self, DecodeError> {
        u64::decode(wire).map(Self)
    }
}

/// Lobby member cap, always within `MEMBER_CAP_MIN..=MEMBER_CAP_MAX`. Decoding
/// clamps as well, so an imported cap is held to the same range as a set one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemberCap(u32);

impl MemberCap {
    pub fn new(cap: u32) -> Self {
        Self(cap.clamp(MEMBER_CAP_MIN, MEMBER_CAP_MAX))
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl Default for MemberCap {
    fn default() -> Self {
        Self(MEMBER_CAP_MAX)
    }
}

impl FieldCodec for MemberCap {
    fn encode(&self) -> String {
        self.0.encode()
    }

    fn decode(wire: &str) -> Result<Self, DecodeError> {
        u32::decode(wire).map(Self::new)
    }
}

wire_enum! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub enum GameMode {
        #[default]
        PointMatch = 0,
        SpecOps = 1,
        Battalion = 2,
        Haunted = 3,
        Custom = 4,
    }
}

/// Settings the host fixes when creating the lobby. They rarely change
/// afterwards and are what the lobby browser shows.
#[derive(Clone, Debug, PartialEq)]
pub struct ServerSettings {
    pub build_id: String,
    pub owner_id: MemberId,
    member_cap: MemberCap,
    pub friends_only: bool,
    pub include_in_browse_list: bool,
    pub midgame_join: bool,
    pub name_tags_enabled: bool,
    pub team_only_name_tags: bool,
    /// Mods every member must have enabled
    pub mods: Vec<ModId>,
}

impl ServerSettings {
    pub fn member_cap(&self) -> u32 {
        self.member_cap.get()
    }

    /// Sets the member cap, clamped to what the relay supports
    pub fn set_member_cap(&mut self, cap: u32) {
        self.member_cap = MemberCap::new(cap);
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            build_id: String::new(),
            owner_id: MemberId::default(),
            member_cap: MemberCap::default(),
            friends_only: false,
            include_in_browse_list: true,
            midgame_join: false,
            name_tags_enabled: true,
            team_only_name_tags: false,
            mods: Vec::new(),
        }
    }
}

impl_record!(ServerSettings {
    build_id => "BuildId",
    owner_id => "OwnerId",
    member_cap => "MemberCap",
    friends_only => "FriendsOnly",
    include_in_browse_list => "IncludeInBrowseList",
    midgame_join => "MidgameJoin",
    name_tags_enabled => "NameTagsEnabled",
    team_only_name_tags => "TeamOnlyNameTags",
    mods => "Mods",
});

/// Equipment a team may use, as indices into the content catalogs
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TeamLoadout {
    pub weapons: Vec<i32>,
    pub vehicles: Vec<i32>,
    pub turrets: Vec<i32>,
    pub skin: i32,
}

impl_record!(TeamLoadout {
    weapons => "Weapons",
    vehicles => "Vehicles",
    turrets => "Turrets",
    skin => "Skin",
});

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MutatorSet {
    /// Indices of enabled mutators
    pub enabled: Vec<i32>,
    /// Per enabled mutator, its configuration values in order
    pub configs: Vec<Vec<String>>,
}

impl_record!(MutatorSet {
    enabled => "Enabled",
    configs => "Configs",
});

/// Settings the host may change at any time before the match starts
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MatchSettings {
    pub match_started: bool,
    pub bot_count: String,
    pub map_index: i32,
    /// Identifies custom maps, which share one index in the map list
    pub map_name: String,
    pub game_mode: GameMode,
    pub night: bool,
    pub all_weapons: bool,
    pub reverse: bool,
    pub balance: f32,
    pub respawn_time: String,
    pub game_length: i32,
    pub team_choice: i32,
    pub eagle: TeamLoadout,
    pub raven: TeamLoadout,
    pub mutators: MutatorSet,
}

impl_record!(MatchSettings {
    match_started => "MatchStarted",
    bot_count => "BotNumber",
    map_index => "SelectedMapIndex",
    map_name => "SelectedMapName",
    game_mode => "GameMode",
    night => "Night",
    all_weapons => "AllWeapons",
    reverse => "ReverseMode",
    balance => "Balance",
    respawn_time => "RespawnTime",
    game_length => "GameLength",
    team_choice => "TeamChoice",
    nested eagle => "Eagle",
    nested raven => "Raven",
    nested mutators => "Mutators",
});

/// Everything the host replicates into lobby data
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionConfig {
    pub server: ServerSettings,
    pub match_settings: MatchSettings,
}

impl_record!(SessionConfig {
    nested server => "Server",
    nested match_settings => "Match",
});

/// A member's own progress, replicated into its member data
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemberStatus {
    /// Finished loading content in the lobby
    pub loaded: bool,
    /// Finished loading into the started match's level
    pub ready: bool,
    pub team: i32,
    /// Mods still to download before this member can play
    pub mods_needed: u32,
}

impl_record!(MemberStatus {
    loaded => "Loaded",
    ready => "Ready",
    team => "Team",
    mods_needed => "ModsNeeded",
});
