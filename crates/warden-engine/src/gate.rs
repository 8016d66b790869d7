//! Per-user serialization gates.
//!
//! The append-then-evaluate sequence in spam detection is not atomic at
//! the store level, so two events from the same user interleaving their
//! steps could miss a trigger or fire twice. Each user gets one async
//! mutex; the coordinator holds it across append, evaluation and any
//! resulting enforcement. Events from distinct users never contend.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Mutex as AsyncMutex;

use warden_core::types::UserId;

/// Lazily populated map of per-user async mutexes.
#[derive(Default)]
pub struct UserGates {
    gates: Mutex<HashMap<UserId, Arc<AsyncMutex<()>>>>,
}

impl UserGates {
    /// Creates an empty gate map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the gate for `user`, creating it on first use. The caller
    /// locks the returned handle; the map lock is never held across an
    /// await point.
    ///
    /// Gates no one else holds are swept on the way, keeping the map
    /// bounded by the number of users with in-flight events.
    pub fn acquire(&self, user: UserId) -> Arc<AsyncMutex<()>> {
        let mut gates = self.gates.lock();
        gates.retain(|&id, gate| id == user || Arc::strong_count(gate) > 1);
        Arc::clone(gates.entry(user).or_default())
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.gates.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_same_user_shares_a_gate() {
        let gates = UserGates::new();
        let a = gates.acquire(UserId(1));
        let b = gates.acquire(UserId(1));
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn test_idle_gates_are_evicted() {
        let gates = UserGates::new();
        drop(gates.acquire(UserId(1)));

        // The next acquire sweeps user 1's unheld gate.
        let held = gates.acquire(UserId(2));
        assert_eq!(gates.tracked(), 1);

        // A gate someone still holds survives the sweep.
        drop(gates.acquire(UserId(3)));
        assert_eq!(gates.tracked(), 2);
        assert!(Arc::ptr_eq(&held, &gates.acquire(UserId(2))));
    }

    #[tokio::test]
    async fn test_distinct_users_do_not_contend() {
        let gates = UserGates::new();
        let a = gates.acquire(UserId(1));
        let b = gates.acquire(UserId(2));
        let _held = a.lock().await;
        // Must not block on user 1's gate.
        let _other = b.try_lock().expect("gate for another user was blocked");
    }
}
