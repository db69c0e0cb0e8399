// Controller: owns the application state and orchestrates everything
// around it.
//
// The event loop consumes WebSocket events, applies commands to the state,
// and pushes a fresh snapshot after every command. Saves run inside the
// loop and are awaited before the next command is taken, so a save in
// flight can never race a later one; on save failure the in-memory state
// stays authoritative and the failure is surfaced to the client.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::balance::{lane_balance, side_color, team_balance};
use crate::protocol::{AppSnapshot, ClientCommand, PersistenceStatus, ServerUpdate};
use crate::remote::catalog::Champion;
use crate::remote::store::StateStore;
use crate::remote::upload::IconUploader;
use crate::roster::player::PlayerId;
use crate::roster::state::ApplicationState;
use crate::roster::RosterError;
use crate::ws_server::WsEvent;

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// The complete application: state plus the collaborators that surround it.
pub struct App {
    pub state: ApplicationState,
    /// Champion list fetched at startup; read-only thereafter.
    pub champions: Vec<Champion>,
    pub store: Arc<dyn StateStore>,
    /// Present only when a remote endpoint is configured.
    pub uploader: Option<IconUploader>,
    pub persistence: PersistenceStatus,
}

impl App {
    pub fn new(
        state: ApplicationState,
        champions: Vec<Champion>,
        store: Arc<dyn StateStore>,
        uploader: Option<IconUploader>,
    ) -> Self {
        App {
            state,
            champions,
            store,
            uploader,
            persistence: PersistenceStatus::Synced,
        }
    }

    /// Build the snapshot clients render from: the full state plus the
    /// derived balance views.
    pub fn snapshot(&self) -> AppSnapshot {
        let lanes = lane_balance(&self.state.teams, &self.state.players);
        let lane_colors = lanes
            .iter()
            .map(|lane| side_color(self.state.side, lane.advantage))
            .collect();
        AppSnapshot {
            state: self.state.clone(),
            team_balance: team_balance(&self.state.teams, &self.state.players),
            lanes,
            lane_colors,
            champions: self.champions.clone(),
            persistence: self.persistence.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Event loop
// ---------------------------------------------------------------------------

/// Run the controller until the WebSocket side shuts down.
pub async fn run(
    mut ws_rx: mpsc::Receiver<WsEvent>,
    out_tx: mpsc::Sender<String>,
    mut app: App,
) -> anyhow::Result<()> {
    while let Some(event) = ws_rx.recv().await {
        match event {
            WsEvent::Connected { addr } => {
                info!("Client connected from {addr}");
                send_update(&out_tx, &ServerUpdate::Snapshot(app.snapshot())).await;
            }
            WsEvent::Disconnected => {
                info!("Client disconnected");
            }
            WsEvent::Message(text) => match serde_json::from_str::<ClientCommand>(&text) {
                Ok(command) => handle_command(&mut app, command, &out_tx).await,
                Err(e) => {
                    warn!("Ignoring unparseable command: {e}");
                    send_update(
                        &out_tx,
                        &ServerUpdate::Error {
                            kind: "badRequest".to_string(),
                            message: format!("could not parse command: {e}"),
                        },
                    )
                    .await;
                }
            },
        }
    }
    info!("WebSocket channel closed, controller stopping");
    Ok(())
}

/// Apply one command, persisting and answering with a snapshot.
///
/// Failed operations produce an error update and leave the state untouched;
/// a snapshot follows either way so the client view never drifts.
pub async fn handle_command(app: &mut App, command: ClientCommand, out_tx: &mpsc::Sender<String>) {
    let mutated = match command {
        ClientCommand::CreatePlayer { draft } => match app.state.add_player(&draft) {
            Ok(id) => {
                info!("Created player {id}");
                true
            }
            Err(e) => {
                send_roster_error(out_tx, &e).await;
                false
            }
        },
        ClientCommand::UpdatePlayer { id, draft } => match app.state.update_player(&id, &draft) {
            Ok(()) => {
                info!("Updated player {id}");
                true
            }
            Err(e) => {
                send_roster_error(out_tx, &e).await;
                false
            }
        },
        ClientCommand::DeletePlayer { id } => {
            // Idempotent: deleting an absent player is not an error.
            let removed = app.state.remove_player(&id);
            if removed {
                info!("Deleted player {id}");
            }
            removed
        }
        ClientCommand::SelectPlayer { id } => match app.state.select(id) {
            Ok(()) => true,
            Err(e) => {
                send_roster_error(out_tx, &e).await;
                false
            }
        },
        ClientCommand::Assign { team, lane, player_id } => {
            match app.state.assign(team, lane, player_id) {
                Ok(()) => true,
                Err(e) => {
                    send_roster_error(out_tx, &e).await;
                    false
                }
            }
        }
        ClientCommand::RandomizeSide => {
            let side = app.state.randomize_side(&mut rand::thread_rng());
            info!("Side randomized: {side:?}");
            true
        }
        ClientCommand::UploadIcon {
            player_id,
            file_name,
            mime_type,
            file_data,
        } => handle_upload(app, player_id, &file_name, &mime_type, &file_data, out_tx).await,
        ClientCommand::Refresh => false,
        ClientCommand::Reload => {
            match app.store.load().await {
                Ok(document) => {
                    app.state = ApplicationState::from_document(document);
                    app.persistence = PersistenceStatus::Synced;
                    info!("State reloaded from remote store");
                }
                Err(e) => {
                    warn!("Reload failed, keeping in-memory state: {e}");
                    app.persistence = PersistenceStatus::Failed {
                        message: e.to_string(),
                    };
                    send_update(
                        out_tx,
                        &ServerUpdate::Error {
                            kind: "persistence".to_string(),
                            message: e.to_string(),
                        },
                    )
                    .await;
                }
            }
            // Reload replaces rather than mutates; nothing to save back.
            false
        }
    };

    if mutated {
        save_state(app, out_tx).await;
    }
    send_update(out_tx, &ServerUpdate::Snapshot(app.snapshot())).await;
}

/// Upload an icon and store the returned URL on the player. Returns whether
/// the state changed.
async fn handle_upload(
    app: &mut App,
    player_id: PlayerId,
    file_name: &str,
    mime_type: &str,
    file_data: &str,
    out_tx: &mpsc::Sender<String>,
) -> bool {
    if !app.state.players.contains(&player_id) {
        send_roster_error(out_tx, &RosterError::NotFound { id: player_id }).await;
        return false;
    }
    let Some(uploader) = &app.uploader else {
        send_update(
            out_tx,
            &ServerUpdate::Error {
                kind: "upload".to_string(),
                message: "no upload endpoint configured".to_string(),
            },
        )
        .await;
        return false;
    };

    match uploader.upload(file_name, mime_type, file_data).await {
        Ok(url) => {
            if let Some(player) = app.state.players.get_mut(&player_id) {
                player.icon_url = Some(url);
                return true;
            }
            false
        }
        Err(e) => {
            warn!("Icon upload failed for {player_id}: {e}");
            send_update(
                out_tx,
                &ServerUpdate::Error {
                    kind: "upload".to_string(),
                    message: e.to_string(),
                },
            )
            .await;
            false
        }
    }
}

/// Persist the full state. Failure is logged, reported, and reflected in
/// the snapshot's persistence status; the in-memory state is untouched.
async fn save_state(app: &mut App, out_tx: &mpsc::Sender<String>) {
    match app.store.save(&app.state).await {
        Ok(()) => {
            app.persistence = PersistenceStatus::Synced;
        }
        Err(e) => {
            warn!("Failed to save state: {e}");
            app.persistence = PersistenceStatus::Failed {
                message: e.to_string(),
            };
            send_update(
                out_tx,
                &ServerUpdate::Error {
                    kind: "persistence".to_string(),
                    message: e.to_string(),
                },
            )
            .await;
        }
    }
}

fn error_kind(error: &RosterError) -> &'static str {
    match error {
        RosterError::Validation { .. } => "validation",
        RosterError::NotFound { .. } => "notFound",
        RosterError::CapacityExceeded { .. } => "capacity",
    }
}

async fn send_roster_error(out_tx: &mpsc::Sender<String>, error: &RosterError) {
    send_update(
        out_tx,
        &ServerUpdate::Error {
            kind: error_kind(error).to_string(),
            message: error.to_string(),
        },
    )
    .await;
}

/// Serialize and send one update. A dropped receiver means the bridge is
/// shutting down; the update is discarded.
async fn send_update(out_tx: &mpsc::Sender<String>, update: &ServerUpdate) {
    match serde_json::to_string(update) {
        Ok(json) => {
            let _ = out_tx.send(json).await;
        }
        Err(e) => warn!("Failed to serialize update: {e}"),
    }
}
