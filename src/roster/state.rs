// The persisted application state aggregate and its mutation operations.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::player::{Lane, PlayerId, Side, Team};
use super::registry::{PlayerDraft, PlayerRegistry};
use super::table::AssignmentTable;
use super::RosterError;

/// Everything the system persists, as one document:
///
/// ```json
/// { "players": [...],
///   "teams": { "A": {"Top": ..., "Jg": ...}, "B": {...} },
///   "side": "A-Blue",
///   "selectedPlayerId": "..." }
/// ```
///
/// Every field defaults, so documents missing top-level fields load and are
/// backfilled rather than rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationState {
    pub players: PlayerRegistry,
    pub teams: AssignmentTable,
    pub side: Option<Side>,
    pub selected_player_id: Option<PlayerId>,
}

impl ApplicationState {
    /// Parse a loaded document into a usable state.
    ///
    /// A malformed document degrades to the default (empty) state; a partial
    /// one is repaired. The remote store stays an opaque blob host either way.
    pub fn from_document(document: serde_json::Value) -> Self {
        let mut state: ApplicationState = match serde_json::from_value(document) {
            Ok(state) => state,
            Err(e) => {
                warn!("Persisted state document is malformed, starting empty: {e}");
                ApplicationState::default()
            }
        };
        state.repair();
        state
    }

    /// Restore internal consistency after loading: drop duplicate/overflow
    /// registry entries, clear table slots and the selection when they
    /// reference unknown players.
    pub fn repair(&mut self) {
        let dropped = self.players.dedupe_and_truncate();
        if dropped > 0 {
            warn!("Dropped {dropped} duplicate or over-capacity player entries from loaded state");
        }
        let cleared = self.teams.retain_known(&self.players);
        if cleared > 0 {
            warn!("Cleared {cleared} assignment slots referencing unknown players");
        }
        if let Some(id) = &self.selected_player_id {
            if !self.players.contains(id) {
                warn!("Cleared selection referencing unknown player {id}");
                self.selected_player_id = None;
            }
        }
    }

    /// Create a player. See [`PlayerRegistry::create`].
    pub fn add_player(&mut self, draft: &PlayerDraft) -> Result<PlayerId, RosterError> {
        self.players.create(draft)
    }

    /// Update a player in place. See [`PlayerRegistry::update`].
    pub fn update_player(&mut self, id: &PlayerId, draft: &PlayerDraft) -> Result<(), RosterError> {
        self.players.update(id, draft)
    }

    /// Delete a player, cascading into every structure that references it:
    /// the assignment table and the current selection. This is the single
    /// cascade site; callers never clean up slots themselves.
    ///
    /// Idempotent: deleting an absent id is a no-op returning `false`.
    pub fn remove_player(&mut self, id: &PlayerId) -> bool {
        let removed = self.players.remove(id);
        if removed {
            self.teams.clear_player(id);
            if self.selected_player_id.as_ref() == Some(id) {
                self.selected_player_id = None;
            }
        }
        removed
    }

    /// Set (or clear) the selected player.
    pub fn select(&mut self, id: Option<PlayerId>) -> Result<(), RosterError> {
        if let Some(id) = &id {
            self.players.require(id)?;
        }
        self.selected_player_id = id;
        Ok(())
    }

    /// Place a player into (team, lane), or clear the slot. Assigning an
    /// unknown player is `NotFound`; clearing never fails.
    pub fn assign(
        &mut self,
        team: Team,
        lane: Lane,
        player: Option<PlayerId>,
    ) -> Result<(), RosterError> {
        if let Some(id) = &player {
            self.players.require(id)?;
        }
        self.teams.assign(team, lane, player);
        Ok(())
    }

    /// Flip a fair coin for the side assignment. The result persists until
    /// the next randomize or a fresh load; there is no automatic reversion.
    pub fn randomize_side<R: Rng>(&mut self, rng: &mut R) -> Side {
        let side = if rng.gen_bool(0.5) {
            Side::ABlue
        } else {
            Side::BBlue
        };
        self.side = Some(side);
        side
    }
}
