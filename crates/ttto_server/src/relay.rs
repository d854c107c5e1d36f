//! Dispatcher between connections and the room registry.
//!
//! Each connected participant has an outbound queue. An inbound frame is
//! parsed, applied to the registry and its replies are queued, all under one
//! lock, so two requests never interleave between validation and mutation.

use crate::config::{RejectionPolicy, ServerConfig};
use crate::error::RegistryError;
use crate::registry::{Outbound, ParticipantId, RoomRegistry, RoomSummary};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};
use ttto_game::{ClientMessage, ServerMessage};

struct RelayState {
    registry: RoomRegistry,
    connections: HashMap<ParticipantId, mpsc::UnboundedSender<ServerMessage>>,
    next_id: u64,
    policy: RejectionPolicy,
}

impl RelayState {
    fn deliver(&self, outbound: Vec<Outbound>) {
        for Outbound { to, message } in outbound {
            match self.connections.get(&to) {
                Some(tx) if tx.send(message).is_ok() => {}
                _ => debug!(participant = %to, "Recipient gone, message dropped"),
            }
        }
    }

    fn reply(&self, to: ParticipantId, message: ServerMessage) {
        self.deliver(vec![Outbound::new(to, message)]);
    }

    /// Reports a refused request to its sender when the policy allows.
    fn refuse(&self, from: ParticipantId, error: &RegistryError, always_report: bool) {
        warn!(error = %error, "Request refused");
        if always_report || self.policy == RejectionPolicy::Notify {
            self.reply(from, ServerMessage::error(error.to_string()));
        }
    }
}

/// Shared handle to the relay. Clones address the same rooms.
#[derive(Clone)]
pub struct Relay {
    state: Arc<Mutex<RelayState>>,
}

impl std::fmt::Debug for Relay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("Relay")
            .field("rooms", &state.registry.len())
            .field("connections", &state.connections.len())
            .field("policy", &state.policy)
            .finish()
    }
}

impl Relay {
    /// Creates a relay with an empty registry sized from `config`.
    #[instrument(skip(config), fields(max_rooms = config.max_rooms(), policy = ?config.rejection_policy()))]
    pub fn new(config: &ServerConfig) -> Self {
        Self::with_registry(RoomRegistry::new(*config.max_rooms()), *config.rejection_policy())
    }

    /// Creates a relay around an existing registry.
    pub fn with_registry(registry: RoomRegistry, policy: RejectionPolicy) -> Self {
        Self {
            state: Arc::new(Mutex::new(RelayState {
                registry,
                connections: HashMap::new(),
                next_id: 1,
                policy,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RelayState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a connection and returns its id and outbound queue.
    #[instrument(skip(self))]
    pub fn connect(&self) -> (ParticipantId, mpsc::UnboundedReceiver<ServerMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.lock();
        let id = ParticipantId(state.next_id);
        state.next_id += 1;
        state.connections.insert(id, tx);
        info!(participant = %id, connections = state.connections.len(), "Participant connected");
        (id, rx)
    }

    /// Handles a raw text frame.
    ///
    /// Frames that fail to parse are answered with `error_message`.
    #[instrument(skip(self, text), fields(participant = %from))]
    pub fn handle_text(&self, from: ParticipantId, text: &str) {
        match ClientMessage::parse(text) {
            Ok(message) => self.handle(from, message),
            Err(e) => {
                warn!(error = %e, "Rejected frame");
                self.lock().reply(from, ServerMessage::error(e.to_string()));
            }
        }
    }

    /// Applies one request and queues every resulting message.
    #[instrument(skip(self, message), fields(participant = %from, kind = message.kind()))]
    pub fn handle(&self, from: ParticipantId, message: ClientMessage) {
        let mut state = self.lock();
        let registry = &mut state.registry;

        let (result, always_report) = match message {
            ClientMessage::CreateRoom { grid_size } => (
                registry
                    .create_room(from, grid_size)
                    .map(|(_, outbound)| outbound),
                true,
            ),
            ClientMessage::JoinRoom { room_code } => (
                registry
                    .join_room(&room_code, from)
                    .map(|(_, outbound)| outbound),
                true,
            ),
            ClientMessage::MakeMove {
                room_code,
                index,
                symbol,
            } => (registry.make_move(&room_code, index, symbol, from), false),
            ClientMessage::RequestGridChange {
                room_code,
                new_size,
            } => (
                registry.request_grid_change(&room_code, from, new_size),
                false,
            ),
            ClientMessage::RestartRequest { room_code } => {
                (registry.restart(&room_code, from), false)
            }
            ClientMessage::LeaveRoom { room_code } => {
                (registry.leave_room(&room_code, from), false)
            }
        };

        match result {
            Ok(outbound) => {
                debug!(messages = outbound.len(), "Request applied");
                state.deliver(outbound);
            }
            Err(e) => state.refuse(from, &e, always_report),
        }
    }

    /// Drops a connection and tears down its room.
    #[instrument(skip(self), fields(participant = %from))]
    pub fn disconnect(&self, from: ParticipantId) {
        let mut state = self.lock();
        state.connections.remove(&from);
        if let Some((room, outbound)) = state.registry.leave(from) {
            info!(room_code = %room.code(), "Room closed by disconnect");
            state.deliver(outbound);
        }
        info!(connections = state.connections.len(), "Participant disconnected");
    }

    /// Summaries of every live room.
    pub fn rooms(&self) -> Vec<RoomSummary> {
        self.lock().registry.rooms()
    }

    /// Number of open connections.
    pub fn connections(&self) -> usize {
        self.lock().connections.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn relay(policy: RejectionPolicy) -> Relay {
        Relay::with_registry(RoomRegistry::new(8).with_seed(5), policy)
    }

    #[test]
    fn test_malformed_frame_gets_error() {
        let relay = relay(RejectionPolicy::Silent);
        let (id, mut rx) = relay.connect();
        relay.handle_text(id, r#"{"type":"create_room","gridSize":12}"#);
        assert!(matches!(
            rx.try_recv(),
            Ok(ServerMessage::ErrorMessage { .. })
        ));
        assert!(relay.rooms().is_empty());
    }

    #[test]
    fn test_silent_policy_drops_refusals() {
        let relay = relay(RejectionPolicy::Silent);
        let (id, mut rx) = relay.connect();
        relay.handle_text(id, r#"{"type":"restart_request","roomCode":"ABCD"}"#);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_join_failure_always_reported() {
        let relay = relay(RejectionPolicy::Silent);
        let (id, mut rx) = relay.connect();
        relay.handle_text(id, r#"{"type":"join_room","roomCode":"ABCD"}"#);
        assert_eq!(
            rx.try_recv().unwrap(),
            ServerMessage::error("Room ABCD not found")
        );
    }

    #[test]
    fn test_disconnect_notifies_opponent() {
        let relay = relay(RejectionPolicy::Silent);
        let (a, mut a_rx) = relay.connect();
        let (b, mut b_rx) = relay.connect();
        relay.handle(a, ClientMessage::CreateRoom { grid_size: Default::default() });
        let Ok(ServerMessage::RoomCreated { room_code, .. }) = a_rx.try_recv() else {
            panic!("expected room_created");
        };
        relay.handle(b, ClientMessage::JoinRoom { room_code });
        while b_rx.try_recv().is_ok() {}

        relay.disconnect(a);
        assert_eq!(b_rx.try_recv().unwrap(), ServerMessage::OpponentLeft);
        assert!(relay.rooms().is_empty());
        assert_eq!(relay.connections(), 1);
    }
}
