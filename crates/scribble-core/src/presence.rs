//! Presence of the other participants in a room.

use crate::protocol::UserStatus;
use std::collections::BTreeMap;

/// Participants and whether each one is currently drawing.
///
/// The relay owns the membership set: each broadcast replaces the list
/// wholesale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresenceTracker {
    users: BTreeMap<String, bool>,
}

impl PresenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the list with a fresh broadcast.
    pub fn replace(&mut self, users: Vec<UserStatus>) {
        self.users = users
            .into_iter()
            .map(|user| (user.username, user.is_drawing))
            .collect();
    }

    /// Record a local guess about a user's status until the next broadcast.
    /// Unknown users are left out.
    pub fn set_drawing(&mut self, username: &str, drawing: bool) {
        if let Some(flag) = self.users.get_mut(username) {
            *flag = drawing;
        }
    }

    pub fn clear(&mut self) {
        self.users.clear();
    }

    /// Drawing flag for `username`, if present.
    pub fn is_drawing(&self, username: &str) -> Option<bool> {
        self.users.get(username).copied()
    }

    pub fn contains(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }

    /// Usernames in sorted order.
    pub fn usernames(&self) -> impl Iterator<Item = &str> {
        self.users.keys().map(String::as_str)
    }

    /// `(username, is_drawing)` pairs in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.users.iter().map(|(name, drawing)| (name.as_str(), *drawing))
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
