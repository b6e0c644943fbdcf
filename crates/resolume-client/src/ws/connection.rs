//! Connection task: owns the socket for the channel's lifetime.

use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use super::ChannelState;
use super::dispatch::Dispatcher;

pub(crate) type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Work queued for the connection task.
#[derive(Debug)]
pub(crate) enum Outbound {
    /// Serialized action, written as one text frame.
    Frame(String),
    /// Send a close frame and stop.
    Close,
}

/// Pump outbound frames to the socket and inbound frames to the dispatcher
/// until either side closes. Marks the channel closed and finished on exit.
pub(crate) async fn connection_loop(
    ws: WsStream,
    mut outbound_rx: mpsc::UnboundedReceiver<Outbound>,
    dispatcher: Arc<Dispatcher>,
    state: Arc<watch::Sender<ChannelState>>,
    finished: watch::Sender<bool>,
) {
    let (mut ws_tx, mut ws_rx) = ws.split();

    loop {
        tokio::select! {
            outbound = outbound_rx.recv() => {
                match outbound {
                    Some(Outbound::Frame(frame)) => {
                        if let Err(e) = ws_tx.send(Message::Text(frame.into())).await {
                            warn!(error = %e, "WebSocket send failed");
                            break;
                        }
                    }
                    Some(Outbound::Close) | None => {
                        debug!("closing WebSocket");
                        let _ = ws_tx.close().await;
                        break;
                    }
                }
            }
            inbound = ws_rx.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => dispatcher.dispatch(text.as_str()),
                    Some(Ok(Message::Close(frame))) => {
                        info!(frame = ?frame, "server closed WebSocket");
                        // Writes the queued close reply.
                        let _ = ws_tx.close().await;
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(error = %e, "WebSocket receive failed");
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    let _ = state.send_replace(ChannelState::Closed);
    let _ = finished.send_replace(true);
    info!("subscription channel closed");
}
