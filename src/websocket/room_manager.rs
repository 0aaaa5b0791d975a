use crate::types::symbol_key;
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// A client's subscription information.
pub struct ClientSubscription {
    /// Subscribed pair keys (see [`symbol_key`]).
    pub pairs: HashSet<String>,
    /// Channel to send messages to the client.
    pub tx: mpsc::UnboundedSender<String>,
}

/// Manages WebSocket client subscriptions, one room per pair.
#[derive(Default)]
pub struct RoomManager {
    clients: DashMap<Uuid, ClientSubscription>,
    rooms: DashMap<String, HashSet<Uuid>>,
}

impl RoomManager {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a new client.
    pub fn register(&self, tx: mpsc::UnboundedSender<String>) -> Uuid {
        let client_id = Uuid::new_v4();
        self.clients.insert(
            client_id,
            ClientSubscription {
                pairs: HashSet::new(),
                tx,
            },
        );
        client_id
    }

    /// Unregister a client and remove it from all rooms.
    pub fn unregister(&self, client_id: Uuid) {
        if let Some((_, subscription)) = self.clients.remove(&client_id) {
            for pair in subscription.pairs {
                if let Some(mut room) = self.rooms.get_mut(&pair) {
                    room.remove(&client_id);
                }
            }
        }
    }

    /// Subscribe a client to pairs. Returns the newly added keys.
    pub fn subscribe(&self, client_id: Uuid, pairs: &[String]) -> Vec<String> {
        let mut subscribed = Vec::new();

        if let Some(mut client) = self.clients.get_mut(&client_id) {
            for pair in pairs {
                let key = symbol_key(pair);
                if key.is_empty() {
                    continue;
                }
                if client.pairs.insert(key.clone()) {
                    subscribed.push(key.clone());
                    self.rooms.entry(key).or_default().insert(client_id);
                }
            }
        }

        subscribed
    }

    /// Unsubscribe a client from pairs. Returns the removed keys.
    pub fn unsubscribe(&self, client_id: Uuid, pairs: &[String]) -> Vec<String> {
        let mut unsubscribed = Vec::new();

        if let Some(mut client) = self.clients.get_mut(&client_id) {
            for pair in pairs {
                let key = symbol_key(pair);
                if client.pairs.remove(&key) {
                    if let Some(mut room) = self.rooms.get_mut(&key) {
                        room.remove(&client_id);
                    }
                    unsubscribed.push(key);
                }
            }
        }

        unsubscribed
    }

    /// Send a message to one client.
    pub fn send_to(&self, client_id: Uuid, message: &str) {
        if let Some(client) = self.clients.get(&client_id) {
            let _ = client.tx.send(message.to_string());
        }
    }

    /// Broadcast a message to all clients subscribed to a pair.
    pub fn broadcast(&self, pair: &str, message: &str) {
        let key = symbol_key(pair);
        let client_ids: Vec<Uuid> = self
            .rooms
            .get(&key)
            .map(|room| room.iter().copied().collect())
            .unwrap_or_default();

        for id in client_ids {
            self.send_to(id, message);
        }
    }

    /// Broadcast a message to all connected clients.
    pub fn broadcast_all(&self, message: &str) {
        for client in self.clients.iter() {
            let _ = client.tx.send(message.to_string());
        }
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// Number of pairs with at least one subscriber.
    pub fn room_count(&self) -> usize {
        self.rooms.iter().filter(|r| !r.is_empty()).count()
    }

    pub fn has_subscribers(&self, pair: &str) -> bool {
        self.rooms
            .get(&symbol_key(pair))
            .map(|room| !room.is_empty())
            .unwrap_or(false)
    }
}
