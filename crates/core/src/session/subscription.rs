//! Cancellation handles for long-lived update sources

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Handle shared between a session and something that pushes updates
/// into it (a store query, a configuration watcher).
///
/// The pushing side checks [`Subscription::is_active`] before delivering;
/// the session cancels every handle on teardown.
#[derive(Debug, Clone)]
pub struct Subscription {
    name: Arc<str>,
    active: Arc<AtomicBool>,
}

impl Subscription {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            active: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub fn cancel(&self) {
        self.active.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_is_shared_between_clones() {
        let subscription = Subscription::new("players");
        let producer = subscription.clone();
        assert!(producer.is_active());

        subscription.cancel();
        assert!(!producer.is_active());
        assert_eq!(producer.name(), "players");
    }
}
