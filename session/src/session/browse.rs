use std::collections::BTreeMap;

use log::debug;

use lobbykit_shared::{import_record, LobbyId, Relay, RelaySource, Scope};

use crate::{
    content::ContentManager,
    events::SessionEvent,
    platform::Platform,
    records::{ServerSettings, SERVER_PREFIX},
    session::LobbySession,
};

impl<R: Relay, C: ContentManager, P: Platform> LobbySession<R, C, P> {
    /// Asks the relay for the lobby listing. Results arrive as
    /// [`PlatformEvent::LobbyList`] and then one
    /// [`PlatformEvent::LobbyDataUpdated`] per lobby.
    ///
    /// [`PlatformEvent::LobbyList`]: crate::PlatformEvent::LobbyList
    /// [`PlatformEvent::LobbyDataUpdated`]: crate::PlatformEvent::LobbyDataUpdated
    pub fn refresh_lobby_list(&mut self) {
        self.relay.request_lobby_list();
    }

    /// Lobbies that can be browsed, with their host's settings
    pub fn open_lobbies(&self) -> &BTreeMap<LobbyId, ServerSettings> {
        &self.open_lobbies
    }

    pub(super) fn on_lobby_list(&mut self, lobbies: Vec<LobbyId>) {
        self.open_lobbies.retain(|lobby, _| lobbies.contains(lobby));
        for lobby in lobbies {
            self.relay.request_lobby_data(lobby);
        }
        self.events.push(SessionEvent::LobbyListUpdated);
    }

    pub(super) fn on_lobby_data_updated(&mut self, lobby: LobbyId, success: bool) {
        if !success {
            self.open_lobbies.remove(&lobby);
            self.events.push(SessionEvent::LobbyListUpdated);
            return;
        }

        let source = RelaySource::new(&self.relay, Scope::Lobby(lobby));
        match import_record::<ServerSettings>(Some(SERVER_PREFIX), &source) {
            Ok(settings) if settings.include_in_browse_list => {
                self.open_lobbies.insert(lobby, settings);
            }
            Ok(_) => {
                self.open_lobbies.remove(&lobby);
            }
            Err(error) => {
                debug!("Dropping {} from the listing: {}", lobby, error);
                self.open_lobbies.remove(&lobby);
            }
        }
        self.events.push(SessionEvent::LobbyListUpdated);
    }
}
