//! Shared application state: the room registry, the question bank, and the
//! runtime configuration.

pub mod fanout;
pub mod ledger;
pub mod registry;
pub mod room;
pub mod state_machine;

use std::sync::Arc;

use crate::{bank::QuestionBank, config::AppConfig, error::ServiceError};

use self::registry::RoomRegistry;

pub use self::registry::RoomHandle;

/// Cheap-to-clone handle on the central application state.
pub type SharedState = Arc<AppState>;

/// Central application state shared by every request handler and task.
pub struct AppState {
    config: AppConfig,
    bank: Arc<QuestionBank>,
    rooms: RoomRegistry,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(config: AppConfig, bank: QuestionBank) -> SharedState {
        Arc::new(Self {
            config,
            bank: Arc::new(bank),
            rooms: RoomRegistry::new(),
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The shared read-only question bank.
    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    /// Registry of live rooms.
    pub fn rooms(&self) -> &RoomRegistry {
        &self.rooms
    }

    /// Resolve a live room by code.
    pub fn room(&self, code: &str) -> Result<Arc<RoomHandle>, ServiceError> {
        self.rooms.get(code)
    }
}
