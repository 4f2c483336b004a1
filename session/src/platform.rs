use lobbykit_shared::MemberId;

use crate::{error::ApplyError, records::MatchSettings};

/// The game side of a session: live match settings, the in-match transport
/// and out-of-band notices to peers
pub trait Platform {
    /// Current match settings as the host has them configured
    fn read_match_settings(&self) -> MatchSettings;

    /// Applies match settings received from the host
    fn apply_match_settings(&mut self, settings: &MatchSettings) -> Result<(), ApplyError>;

    /// Rebuilds the cached content catalogs (maps, weapons, ...) that match
    /// settings index into
    fn refresh_content_cache(&mut self);

    /// Team the local player picked
    fn local_team(&self) -> i32;

    /// Starts accepting in-match transport connections from lobby members
    fn open_relay(&mut self);

    fn close_connection(&mut self, member: MemberId);

    fn send_kick_notice(&mut self, member: MemberId);
}
