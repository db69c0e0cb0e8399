// Player records and the closed lane/team/side enumerations.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque unique player identifier.
///
/// Rendered as a plain string on the wire so documents written by earlier
/// builds (which used timestamp-derived ids) still load. Fresh ids are
/// minted with UUID v4, which cannot collide under rapid creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Mint a fresh identifier.
    pub fn generate() -> Self {
        PlayerId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for PlayerId {
    fn from(s: String) -> Self {
        PlayerId(s)
    }
}

impl From<&str> for PlayerId {
    fn from(s: &str) -> Self {
        PlayerId(s.to_string())
    }
}

/// The five fixed lanes. Closed enumeration; wire keys follow the persisted
/// document (`Top`, `Jg`, `Mid`, `ADC`, `Sup`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lane {
    Top,
    #[serde(rename = "Jg")]
    Jungle,
    Mid,
    #[serde(rename = "ADC")]
    Adc,
    #[serde(rename = "Sup")]
    Support,
}

impl Lane {
    /// All lanes in display order (Top through Support).
    pub const ALL: [Lane; 5] = [Lane::Top, Lane::Jungle, Lane::Mid, Lane::Adc, Lane::Support];

    /// Parse a wire/display key into a Lane.
    pub fn from_str_lane(s: &str) -> Option<Self> {
        match s {
            "Top" => Some(Lane::Top),
            "Jg" => Some(Lane::Jungle),
            "Mid" => Some(Lane::Mid),
            "ADC" => Some(Lane::Adc),
            "Sup" => Some(Lane::Support),
            _ => None,
        }
    }

    /// Return the wire/display key for this lane.
    pub fn display_str(&self) -> &'static str {
        match self {
            Lane::Top => "Top",
            Lane::Jungle => "Jg",
            Lane::Mid => "Mid",
            Lane::Adc => "ADC",
            Lane::Support => "Sup",
        }
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_str())
    }
}

/// The two teams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    A,
    B,
}

impl Team {
    pub const BOTH: [Team; 2] = [Team::A, Team::B];

    /// The opposing team.
    pub fn other(self) -> Team {
        match self {
            Team::A => Team::B,
            Team::B => Team::A,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Team::A => "A",
            Team::B => "B",
        })
    }
}

/// Which team currently plays Blue side. Independent of team identity;
/// set only by the randomize action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    #[serde(rename = "A-Blue")]
    ABlue,
    #[serde(rename = "B-Blue")]
    BBlue,
}

impl Side {
    /// The team occupying Blue side under this assignment.
    pub fn blue_team(self) -> Team {
        match self {
            Side::ABlue => Team::A,
            Side::BBlue => Team::B,
        }
    }
}

/// Optional per-lane ratings. A lane left unset falls back to the player's
/// overall rating in lane-level comparisons.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneRatings {
    #[serde(rename = "Top", default)]
    pub top: Option<i32>,
    #[serde(rename = "Jg", default)]
    pub jungle: Option<i32>,
    #[serde(rename = "Mid", default)]
    pub mid: Option<i32>,
    #[serde(rename = "ADC", default)]
    pub adc: Option<i32>,
    #[serde(rename = "Sup", default)]
    pub support: Option<i32>,
}

impl LaneRatings {
    pub fn get(&self, lane: Lane) -> Option<i32> {
        match lane {
            Lane::Top => self.top,
            Lane::Jungle => self.jungle,
            Lane::Mid => self.mid,
            Lane::Adc => self.adc,
            Lane::Support => self.support,
        }
    }

    pub fn set(&mut self, lane: Lane, rating: Option<i32>) {
        match lane {
            Lane::Top => self.top = rating,
            Lane::Jungle => self.jungle = rating,
            Lane::Mid => self.mid = rating,
            Lane::Adc => self.adc = rating,
            Lane::Support => self.support = rating,
        }
    }
}

/// A rostered player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Immutable for the player's lifetime; unique within the registry.
    pub id: PlayerId,
    pub name: String,
    /// Overall skill score.
    pub rating_total: i32,
    /// Preferred lanes; duplicates collapsed at the edit boundary.
    #[serde(default)]
    pub favorite_lanes: Vec<Lane>,
    /// Preferred champion identifiers, at most five.
    #[serde(default)]
    pub favorite_champs: Vec<String>,
    #[serde(default)]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub lane_ratings: LaneRatings,
}

impl Player {
    /// The rating used for lane-level comparisons: the lane-specific rating
    /// when set, the overall rating otherwise.
    pub fn effective_lane_rating(&self, lane: Lane) -> i32 {
        self.lane_ratings.get(lane).unwrap_or(self.rating_total)
    }
}
