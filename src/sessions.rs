//! Online player directory
//!
//! Maps connected players' identities to display names so share commands
//! can address players by name. Not persisted.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde::Serialize;
use tracing::info;

/// A connected player
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OnlinePlayer {
    /// Stable owner identity (typically a UUID)
    pub id: String,
    /// Display name used in commands
    pub name: String,
}

#[derive(Debug, Default)]
struct Directory {
    by_id: HashMap<String, String>,
    /// Lowercased name -> id
    by_name: HashMap<String, String>,
}

/// Thread-safe directory of online players
#[derive(Debug, Default)]
pub struct SessionDirectory {
    inner: RwLock<Directory>,
}

impl SessionDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a player as online. Rejoining replaces the previous name,
    /// and a name already held by another identity is taken over.
    pub fn join(&self, id: &str, name: &str) {
        let mut dir = self.inner.write();
        let key = name.to_lowercase();

        if let Some(old_name) = dir.by_id.insert(id.to_string(), name.to_string()) {
            dir.by_name.remove(&old_name.to_lowercase());
        }
        if let Some(previous_id) = dir.by_name.insert(key, id.to_string()) {
            if previous_id != id {
                dir.by_id.remove(&previous_id);
            }
        }

        info!("Player {} ({}) joined", name, id);
    }

    /// Mark a player offline. Returns whether they were online.
    pub fn leave(&self, id: &str) -> bool {
        let mut dir = self.inner.write();
        match dir.by_id.remove(id) {
            Some(name) => {
                dir.by_name.remove(&name.to_lowercase());
                info!("Player {} ({}) left", name, id);
                true
            }
            None => false,
        }
    }

    /// Identity of an online player by name (case-insensitive)
    pub fn resolve(&self, name: &str) -> Option<String> {
        self.inner.read().by_name.get(&name.to_lowercase()).cloned()
    }

    pub fn name_of(&self, id: &str) -> Option<String> {
        self.inner.read().by_id.get(id).cloned()
    }

    pub fn is_online(&self, id: &str) -> bool {
        self.inner.read().by_id.contains_key(id)
    }

    /// All online players sorted by name
    pub fn online(&self) -> Vec<OnlinePlayer> {
        let dir = self.inner.read();
        let mut players: Vec<OnlinePlayer> = dir
            .by_id
            .iter()
            .map(|(id, name)| OnlinePlayer {
                id: id.clone(),
                name: name.clone(),
            })
            .collect();
        players.sort_by(|a, b| a.name.cmp(&b.name));
        players
    }

    pub fn len(&self) -> usize {
        self.inner.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
