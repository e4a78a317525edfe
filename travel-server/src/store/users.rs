//! User storage.

use crate::domain::{Itinerary, LegRef, User};

use super::unique::{Keyed, Merge, UniqueStore};

impl Keyed for User {
    type Key = String;

    fn key(&self) -> String {
        self.email().to_string()
    }

    fn set_key(&mut self, key: String) {
        self.set_email(key);
    }
}

impl Merge for User {
    fn merge_from(&mut self, other: Self) {
        self.update_from(other);
    }
}

/// All registered users, keyed by email.
#[derive(Debug, Clone, Default)]
pub struct UserStore {
    users: UniqueStore<User>,
}

impl UserStore {
    /// Creates an empty user store.
    pub fn new() -> Self {
        UserStore::default()
    }

    /// Returns the number of registered users.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Returns true if no users are registered.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Look up a user by email.
    pub fn get(&self, email: &str) -> Option<&User> {
        self.users.get(email)
    }

    /// Look up a user by email, mutably.
    pub fn get_mut(&mut self, email: &str) -> Option<&mut User> {
        self.users.get_mut(email)
    }

    /// Returns whether a user with the email exists.
    pub fn contains(&self, email: &str) -> bool {
        self.users.contains(email)
    }

    /// Register a user, or fold the profile into the existing registration
    /// with the same email (the booked itineraries survive).
    pub fn put(&mut self, user: User) -> &mut User {
        self.users.put(user)
    }

    /// Remove the user with the email, silently if absent.
    pub fn remove(&mut self, email: &str) {
        self.users.remove(email);
    }

    /// Change a user's email. No-op (returning false) if the new email is
    /// taken or the old one does not exist.
    pub fn rename(&mut self, email: &str, new_email: String) -> bool {
        self.users.rename(email, new_email)
    }

    /// Iterate over all users. Order is unspecified.
    pub fn values(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    /// Remove every user.
    pub fn clear(&mut self) {
        self.users.clear();
    }

    /// Users whose name contains `name` and whose email contains `email`,
    /// both case-insensitively. Empty needles match everyone.
    pub fn search(&self, name: &str, email: &str) -> Vec<&User> {
        let name = name.to_lowercase();
        let email = email.to_lowercase();
        self.users
            .values()
            .filter(|user| {
                user.name().to_lowercase().contains(&name)
                    && user.email().to_lowercase().contains(&email)
            })
            .collect()
    }

    /// Strip every booked itinerary referencing the leg, across all users.
    /// Returns the stripped itineraries so the caller can release seats.
    pub fn remove_itineraries_with(&mut self, leg_ref: &LegRef) -> Vec<Itinerary> {
        let mut removed = Vec::new();
        for user in self.users.values_mut() {
            removed.extend(user.remove_itineraries_with(leg_ref));
        }
        removed
    }

    /// Rewrite a renamed leg id inside every user's booked itineraries.
    pub fn rename_leg(&mut self, from: &LegRef, to: &str) {
        for user in self.users.values_mut() {
            user.rename_leg(from, to);
        }
    }
}
