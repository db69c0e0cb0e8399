// The 2x5 assignment table mapping (team, lane) slots to player ids.

use serde::{Deserialize, Serialize};

use super::player::{Lane, PlayerId, Team};
use super::registry::PlayerRegistry;

/// One team's five lane slots. Field names follow the persisted document
/// (`Top`/`Jg`/`Mid`/`ADC`/`Sup`), each holding a player id or nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamSlots {
    #[serde(rename = "Top", default)]
    top: Option<PlayerId>,
    #[serde(rename = "Jg", default)]
    jungle: Option<PlayerId>,
    #[serde(rename = "Mid", default)]
    mid: Option<PlayerId>,
    #[serde(rename = "ADC", default)]
    adc: Option<PlayerId>,
    #[serde(rename = "Sup", default)]
    support: Option<PlayerId>,
}

impl TeamSlots {
    fn slot(&self, lane: Lane) -> &Option<PlayerId> {
        match lane {
            Lane::Top => &self.top,
            Lane::Jungle => &self.jungle,
            Lane::Mid => &self.mid,
            Lane::Adc => &self.adc,
            Lane::Support => &self.support,
        }
    }

    fn slot_mut(&mut self, lane: Lane) -> &mut Option<PlayerId> {
        match lane {
            Lane::Top => &mut self.top,
            Lane::Jungle => &mut self.jungle,
            Lane::Mid => &mut self.mid,
            Lane::Adc => &mut self.adc,
            Lane::Support => &mut self.support,
        }
    }
}

/// The full two-team assignment table.
///
/// Invariant: a player id appears in at most one of the ten slots. [`assign`]
/// enforces this by evicting the player from any prior slot before writing
/// the new one.
///
/// [`assign`]: AssignmentTable::assign
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssignmentTable {
    #[serde(rename = "A", default)]
    a: TeamSlots,
    #[serde(rename = "B", default)]
    b: TeamSlots,
}

impl AssignmentTable {
    fn team(&self, team: Team) -> &TeamSlots {
        match team {
            Team::A => &self.a,
            Team::B => &self.b,
        }
    }

    fn team_mut(&mut self, team: Team) -> &mut TeamSlots {
        match team {
            Team::A => &mut self.a,
            Team::B => &mut self.b,
        }
    }

    /// The player occupying (team, lane), if any.
    pub fn occupant(&self, team: Team, lane: Lane) -> Option<&PlayerId> {
        self.team(team).slot(lane).as_ref()
    }

    /// Place `player` into (team, lane), or clear the slot when `player` is
    /// `None`.
    ///
    /// Placing a player first clears every slot currently holding that
    /// player, so the uniqueness invariant holds across the whole table.
    /// Reassigning a player to the slot it already occupies is a no-op in
    /// effect.
    pub fn assign(&mut self, team: Team, lane: Lane, player: Option<PlayerId>) {
        match player {
            None => *self.team_mut(team).slot_mut(lane) = None,
            Some(id) => {
                self.clear_player(&id);
                *self.team_mut(team).slot_mut(lane) = Some(id);
            }
        }
    }

    /// Remove `id` from every slot it occupies. Returns the number of slots
    /// cleared (0 or 1 when the invariant holds; loaded documents may
    /// briefly violate it until repaired).
    pub fn clear_player(&mut self, id: &PlayerId) -> usize {
        let mut cleared = 0;
        for team in Team::BOTH {
            for lane in Lane::ALL {
                let slot = self.team_mut(team).slot_mut(lane);
                if slot.as_ref() == Some(id) {
                    *slot = None;
                    cleared += 1;
                }
            }
        }
        cleared
    }

    /// Number of non-empty slots for `team` (0 through 5).
    pub fn filled_count(&self, team: Team) -> usize {
        Lane::ALL
            .iter()
            .filter(|&&lane| self.occupant(team, lane).is_some())
            .count()
    }

    /// Mean `ratingTotal` over `team`'s filled slots whose occupant resolves
    /// in `registry`, rounded to nearest. `None` when the team has no
    /// resolvable occupants, so an empty team is distinguishable from a
    /// team whose average happens to be zero.
    pub fn average_rating(&self, team: Team, registry: &PlayerRegistry) -> Option<i32> {
        let mut sum: i64 = 0;
        let mut count: i64 = 0;
        for lane in Lane::ALL {
            if let Some(player) = self.occupant(team, lane).and_then(|id| registry.get(id)) {
                sum += i64::from(player.rating_total);
                count += 1;
            }
        }
        if count == 0 {
            None
        } else {
            Some((sum as f64 / count as f64).round() as i32)
        }
    }

    /// All slots of `team` in lane order, as (lane, occupant) pairs.
    pub fn slots(&self, team: Team) -> impl Iterator<Item = (Lane, Option<&PlayerId>)> {
        Lane::ALL
            .into_iter()
            .map(move |lane| (lane, self.occupant(team, lane)))
    }

    /// Drop every slot whose occupant is unknown to `registry`. Used when
    /// repairing loaded documents; returns how many slots were cleared.
    pub(crate) fn retain_known(&mut self, registry: &PlayerRegistry) -> usize {
        let mut cleared = 0;
        for team in Team::BOTH {
            for lane in Lane::ALL {
                let slot = self.team_mut(team).slot_mut(lane);
                if slot.as_ref().is_some_and(|id| !registry.contains(id)) {
                    *slot = None;
                    cleared += 1;
                }
            }
        }
        cleared
    }
}
