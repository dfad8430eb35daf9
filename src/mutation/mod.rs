//! Optimistic bookmark toggling.
//!
//! Each pulse moves `Unsaved → Saving → Saved` or `Saved → Unsaving →
//! Unsaved`. The local flag flips before the remote write; a failed write
//! rolls it back to the value it had before the call. Every toggle takes a
//! per-pulse version token, and only the newest toggle on a pulse may settle
//! its displayed state, unless that toggle already rolled back. An older write
//! settling after such a rollback is what the service now holds, so it wins.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use crate::app::sync::lock;
use crate::app::{PulseError, Result};
use crate::domain::SavedRelation;
use crate::remote::MutationService;
use crate::session::SessionStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SaveState {
    #[default]
    Unsaved,
    Saving,
    Saved,
    Unsaving,
}

impl SaveState {
    fn settled(saved: bool) -> Self {
        if saved {
            SaveState::Saved
        } else {
            SaveState::Unsaved
        }
    }

    /// The flag the UI shows: the target of an in-flight write, or the
    /// settled value.
    pub fn is_saved(self) -> bool {
        matches!(self, SaveState::Saved | SaveState::Saving)
    }

    pub fn is_pending(self) -> bool {
        matches!(self, SaveState::Saving | SaveState::Unsaving)
    }
}

/// Result of a toggle once its remote write settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    Saved,
    Unsaved,
    /// The write failed; the flag went back to its pre-call value `saved`.
    RolledBack { saved: bool, reason: String },
    /// A newer toggle on the same pulse owns the flag now.
    Superseded,
}

#[derive(Debug, Default)]
struct Entry {
    state: SaveState,
    version: u64,
    /// The newest toggle failed and was reverted.
    rolled_back: bool,
}

#[derive(Default)]
struct Ledger {
    owner: Option<String>,
    entries: HashMap<String, Entry>,
}

impl Ledger {
    /// Flags belong to one identity; switching identity drops them.
    fn claim(&mut self, owner: Option<&str>) {
        if self.owner.as_deref() != owner {
            self.entries.clear();
            self.owner = owner.map(String::from);
        }
    }
}

pub struct MutationCoordinator {
    session: Arc<SessionStore>,
    mutations: Arc<dyn MutationService>,
    ledger: Mutex<Ledger>,
}

impl MutationCoordinator {
    pub fn new(session: Arc<SessionStore>, mutations: Arc<dyn MutationService>) -> Self {
        Self {
            session,
            mutations,
            ledger: Mutex::new(Ledger::default()),
        }
    }

    pub fn state(&self, pulse_id: &str) -> SaveState {
        let owner = self.session.user_id();
        let ledger = lock(&self.ledger);
        if ledger.owner != owner {
            return SaveState::Unsaved;
        }
        ledger
            .entries
            .get(pulse_id)
            .map(|e| e.state)
            .unwrap_or_default()
    }

    pub fn is_saved(&self, pulse_id: &str) -> bool {
        self.state(pulse_id).is_saved()
    }

    /// Loads server-reported flags after a fetch. Pulses with a write in
    /// flight keep their optimistic state.
    pub fn seed<I>(&self, flags: I)
    where
        I: IntoIterator<Item = (String, bool)>,
    {
        let owner = self.session.user_id();
        let mut ledger = lock(&self.ledger);
        ledger.claim(owner.as_deref());

        for (pulse_id, saved) in flags {
            let entry = ledger.entries.entry(pulse_id).or_default();
            if entry.state.is_pending() {
                continue;
            }
            entry.state = SaveState::settled(saved);
            entry.rolled_back = false;
        }
    }

    /// Flips the saved flag of `pulse_id`, then writes the change remotely.
    ///
    /// Fails with [`PulseError::AuthRequired`] before touching any state when
    /// no one is signed in. Remote failures do not fail the call: they roll
    /// the flag back and come back as [`ToggleOutcome::RolledBack`].
    pub async fn toggle_save(&self, pulse_id: &str) -> Result<ToggleOutcome> {
        let user_id = self.session.user_id().ok_or(PulseError::AuthRequired)?;

        let (was_saved, version) = {
            let mut ledger = lock(&self.ledger);
            ledger.claim(Some(user_id.as_str()));
            let entry = ledger.entries.entry(pulse_id.to_string()).or_default();
            let was_saved = entry.state.is_saved();
            entry.version += 1;
            entry.rolled_back = false;
            entry.state = if was_saved {
                SaveState::Unsaving
            } else {
                SaveState::Saving
            };
            (was_saved, entry.version)
        };

        let relation = SavedRelation::new(user_id.clone(), pulse_id);
        let result = if was_saved {
            self.mutations.delete_relation(&relation).await
        } else {
            self.mutations.insert_relation(&relation).await
        };

        let mut ledger = lock(&self.ledger);
        if ledger.owner.as_deref() != Some(user_id.as_str()) {
            debug!("Identity changed while toggling pulse {}", pulse_id);
            return Ok(ToggleOutcome::Superseded);
        }
        let Some(entry) = ledger.entries.get_mut(pulse_id) else {
            return Ok(ToggleOutcome::Superseded);
        };

        if entry.version != version {
            if entry.rolled_back && !entry.state.is_pending() {
                let server = result.is_ok() != was_saved;
                debug!(
                    "Toggle v{} of pulse {} settled after v{} rolled back",
                    version, pulse_id, entry.version
                );
                entry.state = SaveState::settled(server);
                entry.rolled_back = false;
                return Ok(match result {
                    Ok(()) if server => ToggleOutcome::Saved,
                    Ok(()) => ToggleOutcome::Unsaved,
                    Err(e) => ToggleOutcome::RolledBack {
                        saved: server,
                        reason: e.to_string(),
                    },
                });
            }
            debug!(
                "Toggle v{} of pulse {} superseded by v{}",
                version, pulse_id, entry.version
            );
            return Ok(ToggleOutcome::Superseded);
        }

        match result {
            Ok(()) => {
                entry.state = SaveState::settled(!was_saved);
                info!(
                    "{} pulse {}",
                    if was_saved { "Unsaved" } else { "Saved" },
                    pulse_id
                );
                Ok(if was_saved {
                    ToggleOutcome::Unsaved
                } else {
                    ToggleOutcome::Saved
                })
            }
            Err(e) => {
                entry.state = SaveState::settled(was_saved);
                entry.rolled_back = true;
                warn!("Rolled back bookmark on pulse {}: {}", pulse_id, e);
                Ok(ToggleOutcome::RolledBack {
                    saved: was_saved,
                    reason: e.to_string(),
                })
            }
        }
    }
}
