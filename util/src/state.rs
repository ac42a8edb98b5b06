//! Application state container shared across Axum route handlers and services.
//!
//! Holds the database connection, the topic-based WebSocket manager, the forwarder that
//! talks to the registration service, and the per-attendee transition locks. It is cheap
//! to clone and is passed to handlers through Axum's `State<T>` extractor.

use crate::keyed_lock::KeyedLocks;
use crate::ws::WebSocketManager;
use forward::Forwarder;
use sea_orm::DatabaseConnection;

#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
    ws: WebSocketManager,
    forwarder: Forwarder,
    locks: KeyedLocks,
}

impl AppState {
    pub fn new(db: DatabaseConnection, ws: WebSocketManager, forwarder: Forwarder) -> Self {
        Self {
            db,
            ws,
            forwarder,
            locks: KeyedLocks::new(),
        }
    }

    /// Returns a shared reference to the internal `DatabaseConnection`.
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Returns a shared reference to the internal `WebSocketManager`.
    pub fn ws(&self) -> &WebSocketManager {
        &self.ws
    }

    pub fn forwarder(&self) -> &Forwarder {
        &self.forwarder
    }

    /// Locks serializing check-in transitions per attendee.
    pub fn locks(&self) -> &KeyedLocks {
        &self.locks
    }
}

impl AppState {
    /// Returns a cloned copy of the database connection.
    pub fn db_clone(&self) -> DatabaseConnection {
        self.db.clone()
    }

    /// Returns a cloned instance of the `WebSocketManager`.
    pub fn ws_clone(&self) -> WebSocketManager {
        self.ws.clone()
    }
}
