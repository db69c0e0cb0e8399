// Derived balance metrics: team comparison, per-lane advantage, side color.
//
// Pure functions over the registry and assignment table, recomputed after
// every state change and shipped to clients inside the snapshot. Team
// comparison deliberately uses the overall rating while lane advantage
// prefers the lane-specific rating with an overall fallback.

use serde::Serialize;

use crate::roster::player::{Lane, Side, Team};
use crate::roster::registry::PlayerRegistry;
use crate::roster::table::AssignmentTable;

/// Below this absolute difference of team averages the match is near-even.
pub const NEAR_EVEN_THRESHOLD: i32 = 50;

/// At or above this absolute difference the match is plainly uneven.
pub const UNEVEN_THRESHOLD: i32 = 150;

/// A lane is contested evenly while the rating gap stays within this bound.
pub const LANE_EDGE_THRESHOLD: i32 = 50;

/// Classification of the gap between team averages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BalanceGrade {
    NearEven,
    SlightlyUneven,
    Uneven,
}

impl BalanceGrade {
    fn from_diff(diff: i32) -> Self {
        if diff < NEAR_EVEN_THRESHOLD {
            BalanceGrade::NearEven
        } else if diff < UNEVEN_THRESHOLD {
            BalanceGrade::SlightlyUneven
        } else {
            BalanceGrade::Uneven
        }
    }
}

/// Both teams' filled-slot counts, reported when they differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CountMismatch {
    pub a: usize,
    pub b: usize,
}

/// The team-level comparison.
///
/// `AwaitingAssignment` is reported while both teams are empty; it is never
/// conflated with a genuine zero difference between equal averages.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status")]
pub enum TeamBalance {
    #[serde(rename = "awaiting")]
    AwaitingAssignment,
    #[serde(rename = "ready", rename_all = "camelCase")]
    Ready {
        avg_a: i32,
        avg_b: i32,
        /// Absolute difference of the averages.
        diff: i32,
        grade: BalanceGrade,
        /// Team A's share of the combined average, in percent.
        share_a: f64,
        share_b: f64,
        count_mismatch: Option<CountMismatch>,
    },
}

/// Compare the two teams by average overall rating.
///
/// A team with no filled slots contributes 0 to the difference and share
/// once the other team has players; only the fully empty table reports
/// `AwaitingAssignment`.
pub fn team_balance(table: &AssignmentTable, registry: &PlayerRegistry) -> TeamBalance {
    let count_a = table.filled_count(Team::A);
    let count_b = table.filled_count(Team::B);
    if count_a == 0 && count_b == 0 {
        return TeamBalance::AwaitingAssignment;
    }

    let avg_a = table.average_rating(Team::A, registry).unwrap_or(0);
    let avg_b = table.average_rating(Team::B, registry).unwrap_or(0);
    let diff = (avg_a - avg_b).abs();

    let combined = i64::from(avg_a) + i64::from(avg_b);
    let share_a = if combined == 0 {
        50.0
    } else {
        f64::from(avg_a) / combined as f64 * 100.0
    };

    TeamBalance::Ready {
        avg_a,
        avg_b,
        diff,
        grade: BalanceGrade::from_diff(diff),
        share_a,
        share_b: 100.0 - share_a,
        count_mismatch: (count_a != count_b).then_some(CountMismatch {
            a: count_a,
            b: count_b,
        }),
    }
}

/// Which team, if either, holds the edge in a lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Advantage {
    A,
    B,
    Even,
}

impl Advantage {
    /// The favored team, when the lane is not even.
    pub fn favored_team(self) -> Option<Team> {
        match self {
            Advantage::A => Some(Team::A),
            Advantage::B => Some(Team::B),
            Advantage::Even => None,
        }
    }
}

/// One lane's head-to-head comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaneBalance {
    pub lane: Lane,
    pub rating_a: i32,
    pub rating_b: i32,
    /// `rating_a - rating_b`, signed.
    pub diff: i32,
    pub advantage: Advantage,
}

/// Compare the two teams lane by lane, in lane order.
///
/// A lane occupant's rating is its lane-specific rating when set, its
/// overall rating otherwise; an empty slot counts as 0.
pub fn lane_balance(table: &AssignmentTable, registry: &PlayerRegistry) -> Vec<LaneBalance> {
    Lane::ALL
        .into_iter()
        .map(|lane| {
            let rating_for = |team: Team| {
                table
                    .occupant(team, lane)
                    .and_then(|id| registry.get(id))
                    .map(|p| p.effective_lane_rating(lane))
                    .unwrap_or(0)
            };
            let rating_a = rating_for(Team::A);
            let rating_b = rating_for(Team::B);
            let diff = rating_a - rating_b;
            let advantage = if diff > LANE_EDGE_THRESHOLD {
                Advantage::A
            } else if diff < -LANE_EDGE_THRESHOLD {
                Advantage::B
            } else {
                Advantage::Even
            };
            LaneBalance {
                lane,
                rating_a,
                rating_b,
                diff,
                advantage,
            }
        })
        .collect()
}

/// Display color for an advantage under the current side assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SideColor {
    BlueFavored,
    RedFavored,
    Neutral,
}

/// Map an advantage to the physical side it lands on. Neutral while the
/// side is unset or the lane is even.
pub fn side_color(side: Option<Side>, advantage: Advantage) -> SideColor {
    let (Some(side), Some(team)) = (side, advantage.favored_team()) else {
        return SideColor::Neutral;
    };
    if side.blue_team() == team {
        SideColor::BlueFavored
    } else {
        SideColor::RedFavored
    }
}
