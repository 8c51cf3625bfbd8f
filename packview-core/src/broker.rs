//! Subscription table
//!
//! Holds up to `N` filters, each tagged with a caller-chosen token.
//! Publishing a topic yields the tokens of every matching subscription in
//! the order they were added.

use heapless::Vec;

use crate::topic::{self, TopicError};

/// Fixed-capacity topic subscription table
pub struct Broker<T, const N: usize> {
    subscriptions: Vec<(&'static str, T), N>,
}

impl<T: Copy, const N: usize> Broker<T, N> {
    /// Create an empty table
    pub const fn new() -> Self {
        Self {
            subscriptions: Vec::new(),
        }
    }

    /// Add a subscription
    pub fn subscribe(&mut self, filter: &'static str, token: T) -> Result<(), TopicError> {
        topic::validate_filter(filter)?;
        self.subscriptions
            .push((filter, token))
            .map_err(|_| TopicError::Full)
    }

    /// Tokens of all subscriptions matching `topic`
    pub fn matching<'a>(&'a self, topic: &'a str) -> impl Iterator<Item = T> + 'a {
        self.subscriptions
            .iter()
            .filter(move |(filter, _)| topic::matches(filter, topic))
            .map(|(_, token)| *token)
    }

    /// Number of subscriptions
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Check if no subscriptions exist
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}

impl<T: Copy, const N: usize> Default for Broker<T, N> {
    fn default() -> Self {
        Self::new()
    }
}
