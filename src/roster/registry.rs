// Player registry: the owned list of players, keyed by identifier.

use serde::{Deserialize, Serialize};

use super::player::{Lane, LaneRatings, Player, PlayerId};
use super::RosterError;

/// Maximum number of players the registry will hold.
pub const MAX_PLAYERS: usize = 14;

/// Maximum number of preferred champions per player.
pub const MAX_FAVORITE_CHAMPS: usize = 5;

/// Mutable player fields as submitted by the edit form. Everything except
/// the identifier, which the registry allocates and never changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerDraft {
    pub name: String,
    /// `None` when the form field was empty or non-numeric.
    pub rating_total: Option<i32>,
    pub favorite_lanes: Vec<Lane>,
    pub favorite_champs: Vec<String>,
    pub icon_url: Option<String>,
    pub lane_ratings: LaneRatings,
}

impl PlayerDraft {
    /// Validate the draft, returning the trimmed name and rating on success.
    fn validate(&self) -> Result<(String, i32), RosterError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(RosterError::validation("name", "must not be empty"));
        }
        let rating = self
            .rating_total
            .ok_or_else(|| RosterError::validation("ratingTotal", "must be an integer"))?;
        if self.favorite_champs.len() > MAX_FAVORITE_CHAMPS {
            return Err(RosterError::validation(
                "favoriteChamps",
                format!("at most {MAX_FAVORITE_CHAMPS} champions allowed"),
            ));
        }
        for (i, champ) in self.favorite_champs.iter().enumerate() {
            if self.favorite_champs[..i].contains(champ) {
                return Err(RosterError::validation(
                    "favoriteChamps",
                    format!("champion `{champ}` listed twice"),
                ));
            }
        }
        Ok((name.to_string(), rating))
    }

    /// Preferred lanes with duplicates collapsed, first occurrence wins.
    fn normalized_lanes(&self) -> Vec<Lane> {
        let mut lanes: Vec<Lane> = Vec::with_capacity(self.favorite_lanes.len());
        for &lane in &self.favorite_lanes {
            if !lanes.contains(&lane) {
                lanes.push(lane);
            }
        }
        lanes
    }
}

/// The list of players, in creation order. Serializes as a plain array so
/// it maps directly onto the persisted document's `players` field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerRegistry {
    players: Vec<Player>,
}

impl PlayerRegistry {
    /// Validate `draft` and add a new player with a fresh identifier.
    ///
    /// Fails with `CapacityExceeded` when the registry already holds
    /// [`MAX_PLAYERS`] entries; the registry is left unchanged on any error.
    pub fn create(&mut self, draft: &PlayerDraft) -> Result<PlayerId, RosterError> {
        if self.players.len() >= MAX_PLAYERS {
            return Err(RosterError::CapacityExceeded { max: MAX_PLAYERS });
        }
        let (name, rating_total) = draft.validate()?;
        let id = PlayerId::generate();
        self.players.push(Player {
            id: id.clone(),
            name,
            rating_total,
            favorite_lanes: draft.normalized_lanes(),
            favorite_champs: draft.favorite_champs.clone(),
            icon_url: draft.icon_url.clone(),
            lane_ratings: draft.lane_ratings.clone(),
        });
        Ok(id)
    }

    /// Replace all mutable fields of the player with `id`. The identifier
    /// and the player's position in the list are preserved.
    pub fn update(&mut self, id: &PlayerId, draft: &PlayerDraft) -> Result<(), RosterError> {
        let (name, rating_total) = draft.validate()?;
        let player = self
            .players
            .iter_mut()
            .find(|p| p.id == *id)
            .ok_or_else(|| RosterError::NotFound { id: id.clone() })?;
        player.name = name;
        player.rating_total = rating_total;
        player.favorite_lanes = draft.normalized_lanes();
        player.favorite_champs = draft.favorite_champs.clone();
        player.icon_url = draft.icon_url.clone();
        player.lane_ratings = draft.lane_ratings.clone();
        Ok(())
    }

    /// Remove the player with `id`. Returns whether a player was removed;
    /// removing an absent id is a no-op. The caller (the application state)
    /// owns the cascade into the assignment table and selection.
    pub fn remove(&mut self, id: &PlayerId) -> bool {
        let before = self.players.len();
        self.players.retain(|p| p.id != *id);
        self.players.len() != before
    }

    pub fn get(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == *id)
    }

    pub fn get_mut(&mut self, id: &PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == *id)
    }

    /// Like [`get`](Self::get), but failing with `NotFound`.
    pub fn require(&self, id: &PlayerId) -> Result<&Player, RosterError> {
        self.get(id).ok_or_else(|| RosterError::NotFound { id: id.clone() })
    }

    pub fn contains(&self, id: &PlayerId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= MAX_PLAYERS
    }

    /// Players in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    /// Drop duplicate identifiers (first occurrence wins) and truncate to
    /// capacity. Used when repairing loaded documents; returns how many
    /// entries were discarded.
    pub(crate) fn dedupe_and_truncate(&mut self) -> usize {
        let before = self.players.len();
        let mut seen: Vec<PlayerId> = Vec::with_capacity(self.players.len());
        self.players.retain(|p| {
            if seen.contains(&p.id) {
                false
            } else {
                seen.push(p.id.clone());
                true
            }
        });
        self.players.truncate(MAX_PLAYERS);
        before - self.players.len()
    }
}
