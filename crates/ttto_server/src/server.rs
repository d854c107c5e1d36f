//! HTTP and WebSocket surface of the relay.

use crate::registry::RoomSummary;
use crate::relay::Relay;
use axum::{
    Json, Router,
    body::Body,
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    http::Request,
    response::Response,
    routing::get,
};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tracing::{debug, info, instrument, warn};

/// Builds the application router.
///
/// - `GET /ws` upgrades to the relay protocol
/// - `GET /rooms` lists live rooms as JSON
/// - `GET /health` answers `ok`
pub fn router(relay: Relay) -> Router {
    Router::new()
        .route("/ws", get(upgrade))
        .route("/rooms", get(list_rooms))
        .route("/health", get(health))
        .layer(ServiceBuilder::new().map_request(|req: Request<Body>| {
            info!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
            req
        }))
        .with_state(relay)
}

/// Serves `relay` on an already bound listener until the process stops.
#[instrument(skip_all, fields(addr = ?listener.local_addr().ok()))]
pub async fn run(listener: TcpListener, relay: Relay) -> std::io::Result<()> {
    info!("Relay accepting connections");
    axum::serve(listener, router(relay)).await
}

async fn upgrade(ws: WebSocketUpgrade, State(relay): State<Relay>) -> Response {
    ws.on_upgrade(move |socket| serve_socket(socket, relay))
}

async fn list_rooms(State(relay): State<Relay>) -> Json<Vec<RoomSummary>> {
    Json(relay.rooms())
}

async fn health() -> &'static str {
    "ok"
}

/// Pumps one WebSocket connection through the relay.
///
/// Reads run on this task; a spawned writer drains the participant's queue.
/// Closing the socket counts as leaving.
#[instrument(skip_all)]
async fn serve_socket(socket: WebSocket, relay: Relay) {
    let (id, mut outbound) = relay.connect();
    let (mut sink, mut stream) = socket.split();

    let writer = tokio::spawn(async move {
        while let Some(message) = outbound.recv().await {
            if let Err(e) = sink.send(Message::Text(message.to_json().into())).await {
                debug!(participant = %id, error = %e, "Socket closed while sending");
                break;
            }
        }
    });

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => relay.handle_text(id, text.as_str()),
            Ok(Message::Close(_)) => break,
            Ok(Message::Binary(_)) => {
                debug!(participant = %id, "Ignoring binary frame");
            }
            Ok(_) => {}
            Err(e) => {
                warn!(participant = %id, error = %e, "WebSocket read failed");
                break;
            }
        }
    }

    relay.disconnect(id);
    if let Err(e) = writer.await {
        debug!(participant = %id, error = %e, "Writer task ended abnormally");
    }
}
