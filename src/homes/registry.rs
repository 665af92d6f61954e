//! Home registry - the single authority over private and public homes
//!
//! Locking:
//! - `players` map lock: shared for any per-owner access, exclusive only to
//!   insert a new owner or to take a snapshot
//! - one lock per owner set, exclusive while that owner's homes change
//! - one lock for the public homes
//!
//! Lock order is always players map -> owner set -> public homes. No lock is
//! held across I/O.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use super::{Home, PlayerHomes, PublicHomes, RegistryState};

/// Result of a public home write guarded by a caller-supplied check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardedWrite {
    /// The write happened; `replaced` tells whether a home of that name existed
    Applied { replaced: bool },
    /// The check rejected the existing home
    Refused,
    /// Nothing to act on (delete of an absent name)
    Missing,
}

/// Concurrent store of every player's homes plus the public homes
#[derive(Debug, Default)]
pub struct HomeRegistry {
    players: RwLock<HashMap<String, RwLock<PlayerHomes>>>,
    public: RwLock<PublicHomes>,
    dirty: AtomicBool,
}

impl HomeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a registry from persisted state. The result starts clean.
    pub fn from_state(state: RegistryState) -> Self {
        let players = state
            .players
            .into_iter()
            .map(|(owner, homes)| (owner, RwLock::new(homes)))
            .collect();

        Self {
            players: RwLock::new(players),
            public: RwLock::new(state.public),
            dirty: AtomicBool::new(false),
        }
    }

    /// Shared access to the owners map with `owner` guaranteed present
    fn owners_with(&self, owner: &str) -> RwLockReadGuard<'_, HashMap<String, RwLock<PlayerHomes>>> {
        let players = self.players.read();
        if players.contains_key(owner) {
            return players;
        }
        drop(players);

        let mut players = self.players.write();
        if !players.contains_key(owner) {
            players.insert(owner.to_string(), RwLock::default());
            debug!("Created home set for owner {}", owner);
        }
        RwLockWriteGuard::downgrade(players)
    }

    /// Run `f` against an owner's set with exclusive access
    fn with_player_mut<R>(&self, owner: &str, f: impl FnOnce(&mut PlayerHomes) -> R) -> R {
        let players = self.owners_with(owner);
        let mut homes = players[owner].write();
        f(&mut homes)
    }

    /// Run `f` against an owner's set with shared access
    fn with_player<R>(&self, owner: &str, f: impl FnOnce(&PlayerHomes) -> R) -> R {
        let players = self.owners_with(owner);
        let homes = players[owner].read();
        f(&homes)
    }

    /// Snapshot of an owner's homes, creating an empty set on first reference
    pub fn player_data(&self, owner: &str) -> PlayerHomes {
        self.with_player(owner, PlayerHomes::clone)
    }

    /// Number of private homes an owner currently has
    pub fn player_home_count(&self, owner: &str) -> usize {
        self.with_player(owner, PlayerHomes::count)
    }

    /// Whether an owner's set would accept a home named `name`
    pub fn player_can_accept(&self, owner: &str, name: &str) -> bool {
        self.with_player(owner, |homes| homes.can_accept(name))
    }

    /// Insert or overwrite a private home. Returns `false` at capacity.
    pub fn set_player_home(&self, owner: &str, home: Home) -> bool {
        self.upsert_player_home(owner, home).is_some()
    }

    /// Insert or overwrite a private home, reporting whether a home of that
    /// name was replaced. `None` at capacity.
    pub fn upsert_player_home(&self, owner: &str, home: Home) -> Option<bool> {
        let name = home.name().to_string();
        let outcome = self.with_player_mut(owner, |homes| homes.upsert(home));
        if outcome.is_some() {
            debug!("Set home '{}' for {}", name, owner);
            self.mark_dirty();
        }
        outcome
    }

    pub fn delete_player_home(&self, owner: &str, name: &str) -> bool {
        let removed = self.with_player_mut(owner, |homes| homes.delete(name));
        if removed {
            debug!("Deleted home '{}' for {}", name, owner);
            self.mark_dirty();
        }
        removed
    }

    pub fn player_home(&self, owner: &str, name: &str) -> Option<Home> {
        self.with_player(owner, |homes| homes.get(name).cloned())
    }

    /// Insert or overwrite a public home. Ownership is not checked here.
    pub fn set_public_home(&self, home: Home) {
        debug!("Set public home '{}' (owner {})", home.name(), home.owner());
        self.public.write().set(home);
        self.mark_dirty();
    }

    pub fn delete_public_home(&self, name: &str) -> bool {
        let removed = self.public.write().delete(name);
        if removed {
            debug!("Deleted public home '{}'", name);
            self.mark_dirty();
        }
        removed
    }

    /// Set a public home only if `allow` accepts the home currently stored
    /// under that name (or its absence). Check and write happen under one
    /// lock, so two callers racing for a new name cannot both win the check.
    pub fn set_public_home_if(
        &self,
        home: Home,
        allow: impl FnOnce(Option<&Home>) -> bool,
    ) -> GuardedWrite {
        let mut public = self.public.write();
        let existing = public.get(home.name());
        if !allow(existing) {
            return GuardedWrite::Refused;
        }
        let replaced = existing.is_some();
        debug!("Set public home '{}' (owner {})", home.name(), home.owner());
        public.set(home);
        drop(public);
        self.mark_dirty();
        GuardedWrite::Applied { replaced }
    }

    /// Delete a public home only if `allow` accepts it
    pub fn delete_public_home_if(
        &self,
        name: &str,
        allow: impl FnOnce(&Home) -> bool,
    ) -> GuardedWrite {
        let mut public = self.public.write();
        match public.get(name) {
            None => return GuardedWrite::Missing,
            Some(existing) if !allow(existing) => return GuardedWrite::Refused,
            Some(_) => {}
        }
        public.delete(name);
        drop(public);
        debug!("Deleted public home '{}'", name);
        self.mark_dirty();
        GuardedWrite::Applied { replaced: true }
    }

    pub fn public_home(&self, name: &str) -> Option<Home> {
        self.public.read().get(name).cloned()
    }

    pub fn public_home_count(&self) -> usize {
        self.public.read().count()
    }

    /// Read-only snapshot of the public homes
    pub fn public_homes(&self) -> PublicHomes {
        self.public.read().clone()
    }

    /// Number of owners with a home set (including empty ones)
    pub fn owner_count(&self) -> usize {
        self.players.read().len()
    }

    /// Flag that unpersisted changes exist
    pub fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Consistent copy of the whole registry
    pub fn snapshot(&self) -> RegistryState {
        let players = self.players.write();
        let public = self.public.read();
        Self::copy_state(&players, &public)
    }

    /// Take a snapshot and clear the dirty flag atomically with respect to
    /// every mutation. Returns `None` when nothing changed since the last
    /// successful take.
    pub fn take_dirty_snapshot(&self) -> Option<RegistryState> {
        let players = self.players.write();
        let public = self.public.read();
        if !self.dirty.swap(false, Ordering::AcqRel) {
            return None;
        }
        Some(Self::copy_state(&players, &public))
    }

    fn copy_state(
        players: &HashMap<String, RwLock<PlayerHomes>>,
        public: &PublicHomes,
    ) -> RegistryState {
        RegistryState {
            players: players
                .iter()
                .map(|(owner, homes)| (owner.clone(), homes.read().clone()))
                .collect(),
            public: public.clone(),
        }
    }
}
