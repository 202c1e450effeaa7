use std::sync::Arc;

use dashmap::{DashMap, mapref::entry::Entry};
use rand::Rng;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    error::ServiceError,
    state::{fanout::RoomHub, room::RoomSession},
};

/// Alphabet for room codes. Easily confused characters (I, O, 0, 1) are
/// excluded so codes survive being read aloud.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
/// Length of generated room codes.
const CODE_LENGTH: usize = 6;
/// Capacity of each room's event channel.
const ROOM_EVENT_CAPACITY: usize = 32;

/// One live room: immutable identity plus the lock-guarded session and the
/// event hub. Everything mutable about a room lives behind `session`, so
/// operations on one room serialize against each other while rooms stay
/// independent.
#[derive(Debug)]
pub struct RoomHandle {
    /// Internal identifier, stable across the room's lifetime.
    pub id: Uuid,
    /// Human-shareable room code, unique among live rooms.
    pub code: String,
    host_token: String,
    /// Server time at which the room was created.
    pub created_at_ms: u64,
    /// Fanout hub for this room's push events.
    pub hub: RoomHub,
    /// Serialization point for all mutations of this room.
    pub session: Mutex<RoomSession>,
}

impl RoomHandle {
    /// The capability secret returned once to the creator.
    pub fn host_token(&self) -> &str {
        &self.host_token
    }

    /// Check a presented host token against the room's capability secret.
    pub fn verify_host_token(&self, token: &str) -> Result<(), ServiceError> {
        if token == self.host_token {
            Ok(())
        } else {
            Err(ServiceError::Unauthorized("invalid host token".into()))
        }
    }
}

/// Registry of live rooms keyed by room code.
///
/// The map is the only structure touched by multiple rooms' lifecycles and
/// carries its own synchronization; no room's internal lock is ever held
/// while it is accessed.
#[derive(Default)]
pub struct RoomRegistry {
    rooms: DashMap<String, Arc<RoomHandle>>,
}

impl RoomRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh room with a unique code and host token.
    pub fn create_room(&self, now_ms: u64) -> Arc<RoomHandle> {
        loop {
            let code = random_code();
            match self.rooms.entry(code.clone()) {
                Entry::Occupied(_) => continue,
                Entry::Vacant(slot) => {
                    let handle = Arc::new(RoomHandle {
                        id: Uuid::new_v4(),
                        code,
                        host_token: Uuid::new_v4().to_string(),
                        created_at_ms: now_ms,
                        hub: RoomHub::new(ROOM_EVENT_CAPACITY),
                        session: Mutex::new(RoomSession::new(now_ms)),
                    });
                    slot.insert(handle.clone());
                    return handle;
                }
            }
        }
    }

    /// Look up a live room by code (case-insensitive).
    pub fn get(&self, code: &str) -> Result<Arc<RoomHandle>, ServiceError> {
        let normalized = code.to_ascii_uppercase();
        self.rooms
            .get(&normalized)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ServiceError::NotFound(format!("room `{normalized}` not found")))
    }

    /// Remove a room, releasing its code for reuse.
    pub fn remove(&self, code: &str) -> Option<Arc<RoomHandle>> {
        self.rooms.remove(code).map(|(_, handle)| handle)
    }

    /// Snapshot of all live rooms, used by the eviction sweep.
    pub fn handles(&self) -> Vec<Arc<RoomHandle>> {
        self.rooms
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Number of live rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Whether no rooms are live.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

fn random_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| {
            let index = rng.random_range(0..CODE_ALPHABET.len());
            CODE_ALPHABET[index] as char
        })
        .collect()
}
