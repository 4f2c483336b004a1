use std::collections::{BTreeSet, VecDeque};

use log::{debug, info};

use crate::{
    content::{ContentManager, ModInfo, ModKey},
    records::ModId,
};

/// Where a client's mod acquisition stands after [`ModAcquisition::advance`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AcquisitionStep {
    /// A download of this id is outstanding
    Downloading(ModId),
    /// Enabled flags were changed to match the roster; waiting for the reload
    AwaitingReload,
    Complete,
}

/// Brings a client's installed and enabled mods in line with the host's
/// roster, one download at a time.
pub struct ModAcquisition {
    roster: BTreeSet<ModId>,
    to_download: VecDeque<ModId>,
    requested: Option<ModId>,
    awaiting_reload: bool,
    complete: bool,
    match_subscriptions: bool,
    /// Enabled flags from before they were changed to match the roster
    previous_enabled: Vec<(ModKey, bool)>,
}

impl ModAcquisition {
    /// Queues every roster id that is not installed, in roster order
    pub fn plan(roster: &[ModId], installed: &[ModInfo]) -> Self {
        let have: BTreeSet<ModId> = installed.iter().filter_map(|m| m.external_id).collect();

        let mut seen = BTreeSet::new();
        let mut to_download = VecDeque::new();
        for id in roster {
            if id.value() == 0 || !seen.insert(*id) {
                continue;
            }
            if !have.contains(id) {
                to_download.push_back(*id);
            }
        }

        Self {
            roster: seen,
            to_download,
            requested: None,
            awaiting_reload: false,
            complete: false,
            match_subscriptions: false,
            previous_enabled: Vec::new(),
        }
    }

    /// Fetch missing mods by subscribing, and drop subscriptions to enabled
    /// mods that are not in the roster
    pub fn with_subscription_matching(mut self, enabled: bool) -> Self {
        self.match_subscriptions = enabled;
        self
    }

    pub fn to_download(&self) -> impl Iterator<Item = &ModId> {
        self.to_download.iter()
    }

    pub fn remaining(&self) -> usize {
        self.to_download.len()
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Handles a finished download. Returns `false` for ids that are not
    /// queued, which are ignored.
    pub fn on_download_complete(&mut self, id: ModId) -> bool {
        let Some(position) = self.to_download.iter().position(|queued| *queued == id) else {
            debug!("Ignoring download of {}, which is not queued", id);
            return false;
        };
        self.to_download.remove(position);
        if self.requested == Some(id) {
            self.requested = None;
        }
        true
    }

    /// Handles a finished content reload. Returns `true` if it completed the
    /// acquisition.
    pub fn on_reloaded(&mut self) -> bool {
        if !self.awaiting_reload {
            return false;
        }
        self.awaiting_reload = false;
        self.complete = true;
        true
    }

    /// Requests the next download, or once nothing is left to download,
    /// makes the enabled mods match the roster
    pub fn advance(&mut self, content: &mut dyn ContentManager) -> AcquisitionStep {
        if self.complete {
            return AcquisitionStep::Complete;
        }
        if self.awaiting_reload {
            return AcquisitionStep::AwaitingReload;
        }

        if let Some(next) = self.to_download.front().copied() {
            if self.requested != Some(next) {
                if self.match_subscriptions && !content.is_subscribed(next) {
                    info!("Subscribing to {} ({} left)", next, self.to_download.len());
                    content.subscribe(next);
                } else {
                    info!("Downloading {} ({} left)", next, self.to_download.len());
                    content.request_download(next);
                }
                self.requested = Some(next);
            }
            return AcquisitionStep::Downloading(next);
        }

        info!("All server mods downloaded");
        let mut mismatched = Vec::new();
        for installed in content.mods() {
            let should_enable = installed
                .external_id
                .is_some_and(|id| self.roster.contains(&id));
            if installed.enabled != should_enable {
                info!(
                    "Mod {:?} is {}, server wants it {}",
                    installed.title,
                    enabled_label(installed.enabled),
                    enabled_label(should_enable)
                );
                mismatched.push((installed.key, installed.enabled, should_enable));

                if let Some(id) = installed.external_id {
                    if self.match_subscriptions && installed.enabled && content.is_subscribed(id) {
                        info!("Unsubscribing from {:?} ({})", installed.title, id);
                        content.unsubscribe(id);
                    }
                }
            }
        }

        if mismatched.is_empty() {
            self.complete = true;
            return AcquisitionStep::Complete;
        }

        for (key, was_enabled, should_enable) in mismatched {
            self.previous_enabled.push((key, was_enabled));
            content.set_enabled(key, should_enable);
        }
        content.reload_content();
        self.awaiting_reload = true;
        AcquisitionStep::AwaitingReload
    }

    /// Puts back the enabled flags changed by [`ModAcquisition::advance`].
    /// Returns `true` if a reload was triggered.
    pub fn restore(&mut self, content: &mut dyn ContentManager) -> bool {
        if self.previous_enabled.is_empty() {
            return false;
        }
        info!("Restoring {} local mod settings", self.previous_enabled.len());
        for (key, enabled) in self.previous_enabled.drain(..) {
            content.set_enabled(key, enabled);
        }
        content.reload_content();
        true
    }
}

fn enabled_label(enabled: bool) -> &'static str {
    if enabled {
        "enabled"
    } else {
        "disabled"
    }
}
