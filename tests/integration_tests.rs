// Integration tests for the roster editor.
//
// These tests exercise the full system end-to-end using the library crate's
// public API. They drive the controller with the same JSON command envelopes
// the browser sends and assert on the snapshot/error updates it pushes back,
// with the in-memory store standing in for the remote endpoint.

use std::sync::Arc;

use rift_roster::app::{self, App};
use rift_roster::protocol::ClientCommand;
use rift_roster::remote::store::{MemoryStateStore, StateStore};
use rift_roster::roster::player::{Lane, PlayerId, Team};
use rift_roster::roster::registry::{PlayerDraft, MAX_PLAYERS};
use rift_roster::roster::state::ApplicationState;
use rift_roster::ws_server::WsEvent;

use serde_json::{json, Value};
use tokio::sync::mpsc;

// ===========================================================================
// Test helpers
// ===========================================================================

/// Build a draft with just the required fields -- single source of truth for
/// player fixtures.
fn draft(name: &str, rating: i32) -> PlayerDraft {
    PlayerDraft {
        name: name.to_string(),
        rating_total: Some(rating),
        ..Default::default()
    }
}

fn fresh_app(store: Arc<MemoryStateStore>) -> App {
    App::new(ApplicationState::default(), Vec::new(), store, None)
}

/// Apply one command to the app, returning every update it produced.
async fn apply(app: &mut App, command: ClientCommand) -> Vec<Value> {
    let (out_tx, mut out_rx) = mpsc::channel(64);
    app::handle_command(app, command, &out_tx).await;
    drop(out_tx);
    let mut updates = Vec::new();
    while let Some(json) = out_rx.recv().await {
        updates.push(serde_json::from_str(&json).unwrap());
    }
    updates
}

/// The last update of a command is always a snapshot; return its payload.
async fn apply_expect_snapshot(app: &mut App, command: ClientCommand) -> Value {
    let updates = apply(app, command).await;
    let last = updates.last().expect("command should produce updates");
    assert_eq!(last["type"], "SNAPSHOT");
    last["payload"].clone()
}

/// Create `n` players, returning their ids in creation order.
async fn create_players(app: &mut App, n: usize) -> Vec<PlayerId> {
    for i in 0..n {
        apply(
            app,
            ClientCommand::CreatePlayer {
                draft: draft(&format!("Player {i}"), 1000 + 100 * i as i32),
            },
        )
        .await;
    }
    app.state.players.iter().map(|p| p.id.clone()).collect()
}

// ===========================================================================
// Assignment uniqueness
// ===========================================================================

/// For any sequence of assign commands, a player occupies at most one of the
/// ten slots at any point.
#[tokio::test]
async fn player_occupies_at_most_one_slot_across_assign_sequence() {
    let store = Arc::new(MemoryStateStore::new());
    let mut app = fresh_app(store);
    let ids = create_players(&mut app, 2).await;

    let moves = [
        (Team::A, Lane::Top),
        (Team::A, Lane::Mid),
        (Team::B, Lane::Top),
        (Team::B, Lane::Support),
        (Team::B, Lane::Support),
        (Team::A, Lane::Jungle),
    ];
    for (team, lane) in moves {
        apply(
            &mut app,
            ClientCommand::Assign {
                team,
                lane,
                player_id: Some(ids[0].clone()),
            },
        )
        .await;

        let occurrences: usize = Team::BOTH
            .iter()
            .map(|&t| {
                app.state
                    .teams
                    .slots(t)
                    .filter(|(_, occ)| *occ == Some(&ids[0]))
                    .count()
            })
            .sum();
        assert_eq!(occurrences, 1, "after assigning to {team:?}/{lane:?}");
    }
}

/// Assigning X to (A, Mid) while X occupies (A, Top) empties (A, Top) and
/// fills (A, Mid).
#[tokio::test]
async fn reassignment_evicts_the_old_slot() {
    let store = Arc::new(MemoryStateStore::new());
    let mut app = fresh_app(store);
    let ids = create_players(&mut app, 1).await;

    apply(
        &mut app,
        ClientCommand::Assign {
            team: Team::A,
            lane: Lane::Top,
            player_id: Some(ids[0].clone()),
        },
    )
    .await;
    let snapshot = apply_expect_snapshot(
        &mut app,
        ClientCommand::Assign {
            team: Team::A,
            lane: Lane::Mid,
            player_id: Some(ids[0].clone()),
        },
    )
    .await;

    assert_eq!(snapshot["state"]["teams"]["A"]["Top"], Value::Null);
    assert_eq!(
        snapshot["state"]["teams"]["A"]["Mid"],
        json!(ids[0].as_str())
    );
}

// ===========================================================================
// Deletion cascade
// ===========================================================================

#[tokio::test]
async fn deleting_a_player_clears_slots_and_selection() {
    let store = Arc::new(MemoryStateStore::new());
    let mut app = fresh_app(store);
    let ids = create_players(&mut app, 2).await;

    apply(
        &mut app,
        ClientCommand::Assign {
            team: Team::A,
            lane: Lane::Top,
            player_id: Some(ids[0].clone()),
        },
    )
    .await;
    apply(
        &mut app,
        ClientCommand::SelectPlayer {
            id: Some(ids[0].clone()),
        },
    )
    .await;

    let snapshot = apply_expect_snapshot(
        &mut app,
        ClientCommand::DeletePlayer { id: ids[0].clone() },
    )
    .await;

    assert_eq!(snapshot["state"]["players"].as_array().unwrap().len(), 1);
    assert_eq!(snapshot["state"]["teams"]["A"]["Top"], Value::Null);
    assert_eq!(snapshot["state"]["selectedPlayerId"], Value::Null);

    // Second delete is a quiet no-op: one snapshot, no error, no state change.
    let before = app.state.clone();
    let updates = apply(&mut app, ClientCommand::DeletePlayer { id: ids[0].clone() }).await;
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0]["type"], "SNAPSHOT");
    assert_eq!(app.state, before);
}

// ===========================================================================
// Registry capacity
// ===========================================================================

#[tokio::test]
async fn fifteenth_player_is_rejected_with_capacity_error() {
    let store = Arc::new(MemoryStateStore::new());
    let mut app = fresh_app(store);
    create_players(&mut app, MAX_PLAYERS).await;

    let updates = apply(
        &mut app,
        ClientCommand::CreatePlayer {
            draft: draft("One Too Many", 1000),
        },
    )
    .await;

    assert_eq!(updates[0]["type"], "ERROR");
    assert_eq!(updates[0]["payload"]["kind"], "capacity");
    assert_eq!(app.state.players.len(), MAX_PLAYERS);
}

// ===========================================================================
// Balance views
// ===========================================================================

/// An empty table reports the awaiting state; equal averages report a zero
/// diff. The two must stay distinguishable in the snapshot.
#[tokio::test]
async fn awaiting_assignment_is_distinct_from_even_balance() {
    let store = Arc::new(MemoryStateStore::new());
    let mut app = fresh_app(store);
    let ids = create_players(&mut app, 2).await;

    let snapshot = apply_expect_snapshot(&mut app, ClientCommand::Refresh).await;
    assert_eq!(snapshot["teamBalance"]["status"], "awaiting");

    apply(
        &mut app,
        ClientCommand::Assign {
            team: Team::A,
            lane: Lane::Top,
            player_id: Some(ids[0].clone()),
        },
    )
    .await;
    apply(
        &mut app,
        ClientCommand::UpdatePlayer {
            id: ids[1].clone(),
            draft: draft("Player 1", 1000),
        },
    )
    .await;
    let snapshot = apply_expect_snapshot(
        &mut app,
        ClientCommand::Assign {
            team: Team::B,
            lane: Lane::Top,
            player_id: Some(ids[1].clone()),
        },
    )
    .await;

    assert_eq!(snapshot["teamBalance"]["status"], "ready");
    assert_eq!(snapshot["teamBalance"]["diff"], 0);
    assert_eq!(snapshot["teamBalance"]["grade"], "nearEven");
}

/// X(1500) on A/Top and Y(1600) on B/Top give avgA=1500, avgB=1600,
/// diff=100, slightly uneven.
#[tokio::test]
async fn hundred_point_gap_reads_slightly_uneven() {
    let store = Arc::new(MemoryStateStore::new());
    let mut app = fresh_app(store);

    apply(
        &mut app,
        ClientCommand::CreatePlayer { draft: draft("X", 1500) },
    )
    .await;
    apply(
        &mut app,
        ClientCommand::CreatePlayer { draft: draft("Y", 1600) },
    )
    .await;
    let ids: Vec<PlayerId> = app.state.players.iter().map(|p| p.id.clone()).collect();

    apply(
        &mut app,
        ClientCommand::Assign {
            team: Team::A,
            lane: Lane::Top,
            player_id: Some(ids[0].clone()),
        },
    )
    .await;
    let snapshot = apply_expect_snapshot(
        &mut app,
        ClientCommand::Assign {
            team: Team::B,
            lane: Lane::Top,
            player_id: Some(ids[1].clone()),
        },
    )
    .await;

    let balance = &snapshot["teamBalance"];
    assert_eq!(balance["avgA"], 1500);
    assert_eq!(balance["avgB"], 1600);
    assert_eq!(balance["diff"], 100);
    assert_eq!(balance["grade"], "slightlyUneven");
}

/// Team balance uses the overall rating; lane balance prefers the lane
/// rating. The same snapshot shows both.
#[tokio::test]
async fn lane_view_uses_lane_rating_while_team_view_uses_overall() {
    let store = Arc::new(MemoryStateStore::new());
    let mut app = fresh_app(store);

    let mut specialist = draft("Specialist", 1500);
    specialist.lane_ratings.set(Lane::Top, Some(1900));
    apply(&mut app, ClientCommand::CreatePlayer { draft: specialist }).await;
    apply(
        &mut app,
        ClientCommand::CreatePlayer { draft: draft("Generalist", 1500) },
    )
    .await;
    let ids: Vec<PlayerId> = app.state.players.iter().map(|p| p.id.clone()).collect();

    apply(
        &mut app,
        ClientCommand::Assign {
            team: Team::A,
            lane: Lane::Top,
            player_id: Some(ids[0].clone()),
        },
    )
    .await;
    let snapshot = apply_expect_snapshot(
        &mut app,
        ClientCommand::Assign {
            team: Team::B,
            lane: Lane::Top,
            player_id: Some(ids[1].clone()),
        },
    )
    .await;

    // Team averages ignore the lane-specific 1900.
    assert_eq!(snapshot["teamBalance"]["diff"], 0);
    // The Top lane comparison sees it.
    let top = &snapshot["lanes"][0];
    assert_eq!(top["lane"], "Top");
    assert_eq!(top["ratingA"], 1900);
    assert_eq!(top["ratingB"], 1500);
    assert_eq!(top["advantage"], "A");
    // No side assigned yet, so the advantage renders neutral.
    assert_eq!(snapshot["laneColors"][0], "neutral");

    let snapshot = apply_expect_snapshot(&mut app, ClientCommand::RandomizeSide).await;
    let expected = match snapshot["state"]["side"].as_str().unwrap() {
        "A-Blue" => "blueFavored",
        _ => "redFavored",
    };
    assert_eq!(snapshot["laneColors"][0], expected);
}

// ===========================================================================
// Persistence round-trip
// ===========================================================================

/// Save then load through the store yields an equal state for all fields.
#[tokio::test]
async fn full_state_survives_a_store_round_trip() {
    let store = Arc::new(MemoryStateStore::new());
    let mut app = fresh_app(store.clone());
    let ids = create_players(&mut app, 3).await;

    apply(
        &mut app,
        ClientCommand::Assign {
            team: Team::A,
            lane: Lane::Top,
            player_id: Some(ids[0].clone()),
        },
    )
    .await;
    apply(
        &mut app,
        ClientCommand::Assign {
            team: Team::B,
            lane: Lane::Support,
            player_id: Some(ids[1].clone()),
        },
    )
    .await;
    apply(&mut app, ClientCommand::RandomizeSide).await;
    apply(
        &mut app,
        ClientCommand::SelectPlayer {
            id: Some(ids[2].clone()),
        },
    )
    .await;

    let restored = ApplicationState::from_document(store.load().await.unwrap());
    assert_eq!(restored, app.state);
}

/// A dirty remote document (dangling slot ids, dangling selection) loads into
/// a repaired state instead of failing.
#[tokio::test]
async fn dirty_remote_document_is_repaired_on_load() {
    let document = json!({
        "players": [{ "id": "p1", "name": "Aoi", "ratingTotal": 1500 }],
        "teams": { "A": { "Top": "p1", "Mid": "ghost" } },
        "selectedPlayerId": "ghost"
    });
    let store = Arc::new(MemoryStateStore::with_document(document));

    let state = ApplicationState::from_document(store.load().await.unwrap());
    assert_eq!(state.players.len(), 1);
    assert_eq!(
        state.teams.occupant(Team::A, Lane::Top),
        Some(&PlayerId::from("p1"))
    );
    assert_eq!(state.teams.occupant(Team::A, Lane::Mid), None);
    assert_eq!(state.selected_player_id, None);
}

/// A failed save leaves the in-memory state authoritative and flags the
/// snapshot; once saves recover, the next mutation syncs again.
#[tokio::test]
async fn save_failure_is_reported_and_recovers() {
    let store = Arc::new(MemoryStateStore::new());
    store.set_fail_saves(true);
    let mut app = fresh_app(store.clone());

    let updates = apply(
        &mut app,
        ClientCommand::CreatePlayer { draft: draft("Aoi", 1500) },
    )
    .await;
    assert_eq!(updates[0]["type"], "ERROR");
    assert_eq!(updates[0]["payload"]["kind"], "persistence");
    assert_eq!(
        updates[1]["payload"]["persistence"]["status"],
        "failed"
    );
    assert_eq!(app.state.players.len(), 1);
    assert!(store.document().is_none());

    store.set_fail_saves(false);
    let snapshot = apply_expect_snapshot(
        &mut app,
        ClientCommand::CreatePlayer { draft: draft("Rin", 1400) },
    )
    .await;
    assert_eq!(snapshot["persistence"]["status"], "synced");
    let saved = store.document().unwrap();
    assert_eq!(saved["players"].as_array().unwrap().len(), 2);
}

// ===========================================================================
// Full session through the event loop
// ===========================================================================

/// Drive the controller through the same path the WebSocket bridge uses:
/// raw JSON command envelopes in, JSON updates out.
#[tokio::test]
async fn command_session_over_the_event_loop() {
    let store = Arc::new(MemoryStateStore::new());
    let app = fresh_app(store.clone());
    let (ws_tx, ws_rx) = mpsc::channel(64);
    let (out_tx, mut out_rx) = mpsc::channel(64);

    let handle = tokio::spawn(app::run(ws_rx, out_tx, app));

    ws_tx
        .send(WsEvent::Connected { addr: "test".into() })
        .await
        .unwrap();
    for envelope in [
        r#"{"type":"CREATE_PLAYER","payload":{"draft":{"name":"Aoi","ratingTotal":1500,"favoriteLanes":["Mid"]}}}"#,
        r#"{"type":"CREATE_PLAYER","payload":{"draft":{"name":"Rin","ratingTotal":1600}}}"#,
        r#"{"type":"RANDOMIZE_SIDE"}"#,
        r#"{"type":"REFRESH"}"#,
    ] {
        ws_tx
            .send(WsEvent::Message(envelope.to_string()))
            .await
            .unwrap();
    }
    drop(ws_tx);
    handle.await.unwrap().unwrap();

    let mut updates = Vec::new();
    while let Some(json) = out_rx.recv().await {
        updates.push(serde_json::from_str::<Value>(&json).unwrap());
    }

    // Connect snapshot plus one snapshot per command.
    assert_eq!(updates.len(), 5);
    assert!(updates.iter().all(|u| u["type"] == "SNAPSHOT"));

    let last = &updates[4]["payload"];
    assert_eq!(last["state"]["players"].as_array().unwrap().len(), 2);
    assert_eq!(last["state"]["players"][0]["name"], "Aoi");
    assert_eq!(last["state"]["players"][0]["favoriteLanes"], json!(["Mid"]));
    let side = last["state"]["side"].as_str().unwrap();
    assert!(side == "A-Blue" || side == "B-Blue");

    // The store holds the document the browser would see after a reload.
    let saved = store.document().unwrap();
    assert_eq!(saved["players"][1]["name"], "Rin");
    assert_eq!(saved["side"], json!(side));
}
