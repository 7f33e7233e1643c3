//! # Owner Index
//!
//! Secondary index: owner → names currently held. Exactly the inverse of the
//! `owner` field across live records; every ownership change goes through
//! here in the same call that changes the record.

use crate::domain::value_objects::Address;
use std::collections::{BTreeSet, HashMap};

/// Owner → set of held names.
///
/// Empty entries are pruned, so two indices holding the same ownership
/// compare equal.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OwnerIndex {
    by_owner: HashMap<Address, BTreeSet<String>>,
}

impl OwnerIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `owner` holds `name`. Returns false if it was already present.
    pub fn add(&mut self, owner: Address, name: &str) -> bool {
        self.by_owner
            .entry(owner)
            .or_default()
            .insert(name.to_string())
    }

    /// Drop `name` from `owner`. Returns false if it was not present.
    pub fn remove(&mut self, owner: Address, name: &str) -> bool {
        let Some(names) = self.by_owner.get_mut(&owner) else {
            return false;
        };
        let removed = names.remove(name);
        if names.is_empty() {
            self.by_owner.remove(&owner);
        }
        removed
    }

    /// Move `name` from `from` to `to` in one step.
    ///
    /// No state between the removal and the insertion is observable: the
    /// method takes `&mut self` and cannot fail part-way.
    pub fn transfer(&mut self, name: &str, from: Address, to: Address) {
        if from == to {
            return;
        }
        self.remove(from, name);
        self.add(to, name);
    }

    /// Names held by `owner`, sorted.
    #[must_use]
    pub fn names_of(&self, owner: &Address) -> BTreeSet<String> {
        self.by_owner.get(owner).cloned().unwrap_or_default()
    }

    /// Borrowing iterator over the names held by `owner`.
    pub fn iter_names_of<'a>(&'a self, owner: &Address) -> impl Iterator<Item = &'a str> + 'a {
        self.by_owner
            .get(owner)
            .into_iter()
            .flat_map(|names| names.iter().map(String::as_str))
    }

    /// Number of names held by `owner`.
    #[must_use]
    pub fn count_of(&self, owner: &Address) -> usize {
        self.by_owner.get(owner).map_or(0, BTreeSet::len)
    }

    /// Returns true if `owner` holds `name`.
    #[must_use]
    pub fn contains(&self, owner: &Address, name: &str) -> bool {
        self.by_owner
            .get(owner)
            .is_some_and(|names| names.contains(name))
    }

    /// All (owner, name) pairs. Used by invariant checks.
    pub fn entries(&self) -> impl Iterator<Item = (&Address, &str)> {
        self.by_owner
            .iter()
            .flat_map(|(owner, names)| names.iter().map(move |n| (owner, n.as_str())))
    }

    /// Total number of indexed names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_owner.values().map(BTreeSet::len).sum()
    }

    /// Returns true if nothing is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_owner.is_empty()
    }
}
