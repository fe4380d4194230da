//! services/api/src/web/in_flight.rs
//!
//! Tracks which users have a plan generation outstanding, so a second request from
//! the same user can be turned away while the first is still running.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct InFlightRequests {
    users: Arc<Mutex<HashSet<Uuid>>>,
}

impl InFlightRequests {
    /// Marks `user_id` as busy. Returns `None` if a request is already in flight.
    pub fn try_acquire(&self, user_id: Uuid) -> Option<InFlightGuard> {
        let inserted = self
            .users
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user_id);

        inserted.then(|| InFlightGuard {
            users: self.users.clone(),
            user_id,
        })
    }
}

/// Releases the user's slot when dropped, whether the request succeeded or not.
pub struct InFlightGuard {
    users: Arc<Mutex<HashSet<Uuid>>>,
    user_id: Uuid,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.users
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.user_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_request_per_user_until_released() {
        let in_flight = InFlightRequests::default();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let guard = in_flight.try_acquire(alice).expect("first request is admitted");
        assert!(in_flight.try_acquire(alice).is_none());
        assert!(in_flight.try_acquire(bob).is_some());

        drop(guard);
        assert!(in_flight.try_acquire(alice).is_some());
    }
}
