// WebSocket bridge between the browser page and the controller.
//
// One client at a time. Inbound text frames (JSON commands) are forwarded to
// the controller over an mpsc channel; outbound updates (JSON snapshots and
// errors) flow back through a second channel and are written to the socket.
// Updates that arrive while no client is connected are discarded so the
// controller never blocks on a missing browser.

use futures_util::stream::Stream;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{info, warn};

/// Events emitted by the WebSocket server to the controller.
#[derive(Debug, PartialEq)]
pub enum WsEvent {
    /// A new WebSocket client has connected.
    Connected { addr: String },
    /// The current WebSocket client has disconnected.
    Disconnected,
    /// A text message was received from the client (raw JSON string).
    Message(String),
}

/// Run the WebSocket server on the given port.
///
/// Binds `127.0.0.1:{port}` and accepts one connection at a time. Inbound
/// text frames become [`WsEvent::Message`]; strings received on `updates`
/// are written to the connected client as text frames. Runs until the
/// controller drops either channel end or the task is cancelled.
pub async fn run(
    port: u16,
    tx: mpsc::Sender<WsEvent>,
    mut updates: mpsc::Receiver<String>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(format!("127.0.0.1:{port}")).await?;
    let local_addr = listener.local_addr()?;
    info!("WebSocket server listening on {local_addr}");

    loop {
        // Drain updates while waiting for a client so the controller's
        // sends never back up against an absent browser.
        let (stream, addr) = tokio::select! {
            accepted = listener.accept() => accepted?,
            update = updates.recv() => {
                if update.is_none() {
                    return Ok(());
                }
                continue;
            }
        };
        let addr_str = addr.to_string();
        info!("Accepted TCP connection from {addr_str}");

        let ws_stream = match tokio_tungstenite::accept_async(stream).await {
            Ok(ws) => ws,
            Err(e) => {
                warn!("WebSocket handshake failed for {addr_str}: {e}");
                continue;
            }
        };

        if tx
            .send(WsEvent::Connected {
                addr: addr_str.clone(),
            })
            .await
            .is_err()
        {
            break;
        }

        let (mut write, read) = ws_stream.split();

        // Inbound pump runs as its own task so outbound writes are not
        // blocked behind a quiet client.
        let inbound_tx = tx.clone();
        let reader_addr = addr_str.clone();
        let mut reader = tokio::spawn(async move {
            process_message_stream(read, &inbound_tx, &reader_addr).await
        });

        let mut controller_gone = false;
        loop {
            tokio::select! {
                finished = &mut reader => {
                    match finished {
                        Ok(Err(())) => controller_gone = true,
                        Ok(Ok(())) => {}
                        Err(e) => warn!("Inbound pump for {addr_str} panicked: {e}"),
                    }
                    break;
                }
                update = updates.recv() => {
                    match update {
                        Some(json) => {
                            if write.send(Message::Text(json.into())).await.is_err() {
                                warn!("Failed to write update to {addr_str}, dropping client");
                                reader.abort();
                                break;
                            }
                        }
                        None => {
                            reader.abort();
                            return Ok(());
                        }
                    }
                }
            }
        }

        if controller_gone || tx.send(WsEvent::Disconnected).await.is_err() {
            break;
        }
    }

    Ok(())
}

/// Process raw WebSocket [`Message`] items from any [`Stream`], forwarding
/// text payloads through `tx`. Pure logic with no I/O; the primary
/// unit-test target. Returns `Err(())` when the channel is closed
/// (receiver dropped), signalling the caller to stop.
pub async fn process_message_stream<St>(
    mut stream: St,
    tx: &mpsc::Sender<WsEvent>,
    addr: &str,
) -> Result<(), ()>
where
    St: Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    while let Some(msg_result) = stream.next().await {
        match msg_result {
            Ok(Message::Text(text)) => {
                if tx.send(WsEvent::Message(text.to_string())).await.is_err() {
                    return Err(());
                }
            }
            Ok(Message::Close(_)) => {
                info!("Client {addr} sent close frame");
                break;
            }
            Err(e) => {
                warn!("WebSocket error from {addr}: {e}");
                break;
            }
            _ => {
                // Ignore Binary, Ping, Pong, Frame variants.
            }
        }
    }
    Ok(())
}
