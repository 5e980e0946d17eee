//! Subscription Tracking
//!
//! The session keeps the *desired* subscription set: the channels the
//! caller asked for, independent of what the server has acknowledged.
//! Authentication changes and reconnects never clear it.

use std::collections::HashSet;

/// Desired set of channel identifiers for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionSet {
    channels: HashSet<String>,
}

impl SubscriptionSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add channels. Returns how many were not already present.
    pub fn insert_all(&mut self, channels: &[String]) -> usize {
        channels
            .iter()
            .filter(|channel| self.channels.insert((*channel).clone()))
            .count()
    }

    /// Remove channels. Returns how many were present.
    pub fn remove_all(&mut self, channels: &[String]) -> usize {
        channels
            .iter()
            .filter(|channel| self.channels.remove(channel.as_str()))
            .count()
    }

    /// Check whether a channel is in the set.
    #[must_use]
    pub fn contains(&self, channel: &str) -> bool {
        self.channels.contains(channel)
    }

    /// Number of channels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Iterate over the channels in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.channels.iter()
    }

    /// Channels in sorted order, for deterministic wire commands.
    #[must_use]
    pub fn to_sorted_vec(&self) -> Vec<String> {
        let mut channels: Vec<String> = self.channels.iter().cloned().collect();
        channels.sort_unstable();
        channels
    }

    /// Borrow the underlying set.
    #[must_use]
    pub const fn as_set(&self) -> &HashSet<String> {
        &self.channels
    }
}

impl FromIterator<String> for SubscriptionSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            channels: iter.into_iter().collect(),
        }
    }
}
