use crate::records::ModId;

/// Locally unique handle of an installed mod
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModKey(pub usize);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModInfo {
    pub key: ModKey,
    /// `None` for mods that were not installed from the content platform;
    /// other peers have no way to fetch these
    pub external_id: Option<ModId>,
    pub title: String,
    pub enabled: bool,
}

/// The game's mod subsystem.
///
/// Downloads and reloads run asynchronously; their completion reaches the
/// session as [`PlatformEvent::DownloadComplete`] and
/// [`PlatformEvent::ContentReloaded`].
///
/// [`PlatformEvent::DownloadComplete`]: crate::PlatformEvent::DownloadComplete
/// [`PlatformEvent::ContentReloaded`]: crate::PlatformEvent::ContentReloaded
pub trait ContentManager {
    /// Every installed mod, enabled or not. A finished download shows up
    /// here, disabled.
    fn mods(&self) -> Vec<ModInfo>;

    /// Changes whether a mod is enabled. Takes effect on the next reload.
    fn set_enabled(&mut self, key: ModKey, enabled: bool);

    fn request_download(&mut self, id: ModId);

    fn reload_content(&mut self);

    /// Whether the local user is subscribed to `id` on the content platform
    fn is_subscribed(&self, _id: ModId) -> bool {
        false
    }

    /// Subscribes to `id`. The platform fetches subscribed mods itself, and
    /// completion arrives like any other download.
    fn subscribe(&mut self, id: ModId) {
        self.request_download(id);
    }

    fn unsubscribe(&mut self, _id: ModId) {}
}
