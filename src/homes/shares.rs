//! Pending home-share offers
//!
//! Offers live in memory only and are lost on restart. Each (from, to) pair
//! holds at most one offer; a newer offer silently replaces the older one.
//! Offers never expire on their own.

use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::debug;

/// Outstanding share offers: offering owner -> target owner -> home name
#[derive(Debug, Default)]
pub struct PendingShares {
    offers: Mutex<HashMap<String, HashMap<String, String>>>,
}

impl PendingShares {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an offer from `from` to `to`, replacing any previous one
    pub fn offer(&self, from: &str, to: &str, home_name: &str) {
        let previous = self
            .offers
            .lock()
            .entry(from.to_string())
            .or_default()
            .insert(to.to_string(), home_name.to_string());

        if let Some(previous) = previous {
            debug!(
                "Share offer {} -> {} replaced '{}' with '{}'",
                from, to, previous, home_name
            );
        }
    }

    /// The home name currently offered from `from` to `to`, if any
    pub fn pending_offer(&self, from: &str, to: &str) -> Option<String> {
        self.offers
            .lock()
            .get(from)
            .and_then(|targets| targets.get(to))
            .cloned()
    }

    /// Check for an offer of exactly `home_name` from `from` to `to`
    pub fn has_offer(&self, from: &str, to: &str, home_name: &str) -> bool {
        self.pending_offer(from, to).as_deref() == Some(home_name)
    }

    /// Remove the offer from `from` to `to`. Drops the offerer's entry once
    /// it has no targets left.
    pub fn consume(&self, from: &str, to: &str) -> Option<String> {
        let mut offers = self.offers.lock();
        let targets = offers.get_mut(from)?;
        let removed = targets.remove(to);
        if targets.is_empty() {
            offers.remove(from);
        }
        removed
    }

    /// Remove the offer from `from` to `to` only if it is still for
    /// `home_name`. A newer offer that replaced it is left alone.
    pub fn consume_offer(&self, from: &str, to: &str, home_name: &str) -> bool {
        let mut offers = self.offers.lock();
        let Some(targets) = offers.get_mut(from) else {
            return false;
        };
        if targets.get(to).map(String::as_str) != Some(home_name) {
            return false;
        }
        targets.remove(to);
        if targets.is_empty() {
            offers.remove(from);
        }
        true
    }

    /// Number of offerers with at least one outstanding offer
    pub fn offerer_count(&self) -> usize {
        self.offers.lock().len()
    }

    /// Total outstanding offers
    pub fn len(&self) -> usize {
        self.offers.lock().values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.offers.lock().is_empty()
    }
}
