//! Server-wide public homes

use std::collections::BTreeMap;

use super::Home;

/// Public homes keyed by a globally unique name.
///
/// No capacity limit. The registry stores whatever it is given; ownership
/// rules are applied by the command layer using each home's `owner`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PublicHomes {
    homes: BTreeMap<String, Home>,
}

impl PublicHomes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a public home
    pub fn set(&mut self, home: Home) {
        self.homes.insert(home.name().to_string(), home);
    }

    pub fn delete(&mut self, name: &str) -> bool {
        self.homes.remove(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Home> {
        self.homes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.homes.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.homes.keys().map(String::as_str)
    }

    pub fn homes(&self) -> impl Iterator<Item = &Home> {
        self.homes.values()
    }

    pub fn count(&self) -> usize {
        self.homes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.homes.is_empty()
    }
}
