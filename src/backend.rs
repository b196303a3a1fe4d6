//! Pluggable in-memory index backends.
//!
//! Implement [`IndexBackend`] to bring your own map. Backends are plain,
//! single-threaded maps: the store wraps whichever one you pick in a single
//! `RwLock`, so a backend never has to be concurrent itself.

use crate::user::User;
use std::collections::{BTreeMap, HashMap};

/// Map from user id to user that a [`UserStore`](crate::UserStore) indexes
/// into.
pub trait IndexBackend: Default + Send + Sync {
    /// Insert a user keyed by its id, returning the previous user with that id.
    fn insert(&mut self, user: User) -> Option<User>;

    /// Look up a user by id.
    fn get(&self, id: &str) -> Option<&User>;

    /// Remove a user by id, returning it if it was present.
    fn remove(&mut self, id: &str) -> Option<User>;

    /// All live users. Order is whatever the backend iterates in.
    fn values(&self) -> Box<dyn Iterator<Item = &User> + '_>;

    /// Number of live users.
    fn len(&self) -> usize;

    /// `true` when there are no live users.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `true` if a user with this id is live.
    fn contains_id(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Id of the live user owning `email`, if any. Full scan, exact match.
    fn email_owner(&self, email: &str) -> Option<&str> {
        self.values()
            .find(|u| u.email == email)
            .map(|u| u.id.as_str())
    }
}

// ---- HashMap -----------------------------------------------------------------

impl IndexBackend for HashMap<String, User> {
    fn insert(&mut self, user: User) -> Option<User> {
        HashMap::insert(self, user.id.clone(), user)
    }

    fn get(&self, id: &str) -> Option<&User> {
        HashMap::get(self, id)
    }

    fn remove(&mut self, id: &str) -> Option<User> {
        HashMap::remove(self, id)
    }

    fn values(&self) -> Box<dyn Iterator<Item = &User> + '_> {
        Box::new(HashMap::values(self))
    }

    fn len(&self) -> usize {
        HashMap::len(self)
    }

    fn contains_id(&self, id: &str) -> bool {
        HashMap::contains_key(self, id)
    }
}

// ---- BTreeMap ----------------------------------------------------------------

// Iterates in id order, so List comes back sorted by id.
impl IndexBackend for BTreeMap<String, User> {
    fn insert(&mut self, user: User) -> Option<User> {
        BTreeMap::insert(self, user.id.clone(), user)
    }

    fn get(&self, id: &str) -> Option<&User> {
        BTreeMap::get(self, id)
    }

    fn remove(&mut self, id: &str) -> Option<User> {
        BTreeMap::remove(self, id)
    }

    fn values(&self) -> Box<dyn Iterator<Item = &User> + '_> {
        Box::new(BTreeMap::values(self))
    }

    fn len(&self) -> usize {
        BTreeMap::len(self)
    }

    fn contains_id(&self, id: &str) -> bool {
        BTreeMap::contains_key(self, id)
    }
}
