// Wire protocol between the browser client and the controller.
//
// Commands arrive as `{"type": "...", "payload": {...}}` envelopes over the
// WebSocket; updates flow back in the same envelope form. The payloads use
// the same camelCase field names as the persisted document.

use serde::{Deserialize, Serialize};

use crate::balance::{LaneBalance, SideColor, TeamBalance};
use crate::remote::catalog::Champion;
use crate::roster::player::{Lane, PlayerId, Team};
use crate::roster::registry::PlayerDraft;
use crate::roster::state::ApplicationState;

// ---------------------------------------------------------------------------
// Inbound commands
// ---------------------------------------------------------------------------

/// A command from the client. Every state mutation enters through exactly
/// one of these.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientCommand {
    /// Create a player from form data.
    CreatePlayer { draft: PlayerDraft },
    /// Replace a player's mutable fields.
    #[serde(rename_all = "camelCase")]
    UpdatePlayer { id: PlayerId, draft: PlayerDraft },
    /// Delete a player (cascades into assignments and selection).
    DeletePlayer { id: PlayerId },
    /// Select a player card, or clear the selection with `null`.
    SelectPlayer { id: Option<PlayerId> },
    /// Put a player into a slot, or clear the slot with a `null` player.
    #[serde(rename_all = "camelCase")]
    Assign {
        team: Team,
        lane: Lane,
        player_id: Option<PlayerId>,
    },
    /// Flip the coin for which team plays Blue side.
    RandomizeSide,
    /// Upload a player icon; `file_data` is base64 as produced by the
    /// browser's FileReader.
    #[serde(rename_all = "camelCase")]
    UploadIcon {
        player_id: PlayerId,
        file_name: String,
        mime_type: String,
        file_data: String,
    },
    /// Ask for a fresh snapshot (sent by clients on connect).
    Refresh,
    /// Re-fetch the state from the remote store, replacing local state.
    Reload,
}

// ---------------------------------------------------------------------------
// Outbound updates
// ---------------------------------------------------------------------------

/// Whether the in-memory state matches the remote store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum PersistenceStatus {
    /// The last round-trip succeeded.
    Synced,
    /// The last save or load failed; in-memory state is authoritative.
    Failed { message: String },
}

/// Everything a client needs to render, in one message.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSnapshot {
    pub state: ApplicationState,
    pub team_balance: TeamBalance,
    pub lanes: Vec<LaneBalance>,
    /// Display color for each entry of `lanes`, under the current side
    /// assignment.
    pub lane_colors: Vec<SideColor>,
    pub champions: Vec<Champion>,
    pub persistence: PersistenceStatus,
}

/// An update pushed to the client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerUpdate {
    Snapshot(AppSnapshot),
    /// An operation failed; `kind` is a stable machine-readable tag
    /// (`validation`, `notFound`, `capacity`, `persistence`, `upload`,
    /// `badRequest`).
    Error { kind: String, message: String },
}
