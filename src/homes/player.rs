//! Per-player home collection with a hard capacity limit

use std::collections::BTreeMap;

use super::Home;

/// Maximum number of private homes a single player may hold
pub const MAX_HOMES: usize = 100;

/// One player's named homes.
///
/// Names are unique within the set. New names are rejected once the set
/// holds [`MAX_HOMES`] entries; overwriting an existing name always works.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerHomes {
    homes: BTreeMap<String, Home>,
}

impl PlayerHomes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a home by name.
    ///
    /// Returns `false` without touching the set if the name is new and the
    /// set is already full.
    pub fn set(&mut self, home: Home) -> bool {
        self.upsert(home).is_some()
    }

    /// Like [`set`](Self::set), but reports what happened: `None` at
    /// capacity, `Some(true)` when an existing home was replaced.
    pub fn upsert(&mut self, home: Home) -> Option<bool> {
        if !self.homes.contains_key(home.name()) && self.homes.len() >= MAX_HOMES {
            return None;
        }
        Some(self.homes.insert(home.name().to_string(), home).is_some())
    }

    /// Remove a home, returning whether anything was removed
    pub fn delete(&mut self, name: &str) -> bool {
        self.homes.remove(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Home> {
        self.homes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.homes.contains_key(name)
    }

    /// Home names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.homes.keys().map(String::as_str)
    }

    /// Homes in name order
    pub fn homes(&self) -> impl Iterator<Item = &Home> {
        self.homes.values()
    }

    pub fn count(&self) -> usize {
        self.homes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.homes.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.homes.len() >= MAX_HOMES
    }

    /// Whether `set` would accept a home with this name right now
    pub fn can_accept(&self, name: &str) -> bool {
        self.contains(name) || !self.is_full()
    }
}
