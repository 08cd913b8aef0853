//! Per-user serialization of mutating operations.
//!
//! # Invariants
//! - Two mutations for the same user never overlap.
//! - Mutations for different users never wait on each other beyond the
//!   shard lookup.
//! - A slot lives only while some caller holds or waits on it.

use crate::model::user::UserId;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;

type Slot = Arc<Mutex<()>>;

/// Registry of one mutex per in-flight user id.
///
/// Share a single registry (via `Arc`) between every service instance and
/// connection that can mutate the same database.
#[derive(Debug, Default)]
pub struct UserLocks {
    slots: DashMap<UserId, Slot>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` while holding `user`'s lock.
    pub fn with_user<T>(&self, user: &UserId, f: impl FnOnce() -> T) -> T {
        let lease = self.lease(user);
        let _guard = lease.slot.lock();
        f()
    }

    /// Number of users currently holding or waiting on a lock.
    pub fn tracked_users(&self) -> usize {
        self.slots.len()
    }

    fn lease<'a>(&'a self, user: &'a UserId) -> Lease<'a> {
        // The entry guard is released at the end of this statement.
        let slot = Arc::clone(self.slots.entry(user.clone()).or_default().value());
        Lease {
            locks: self,
            user,
            slot,
        }
    }
}

/// A caller's hold on one slot; evicts the slot on drop when unshared.
struct Lease<'a> {
    locks: &'a UserLocks,
    user: &'a UserId,
    slot: Slot,
}

impl Drop for Lease<'_> {
    fn drop(&mut self) {
        // Clones are only taken under the shard lock, so a count of two
        // (registry + this lease) means nobody else can reach the slot.
        self.locks
            .slots
            .remove_if(self.user, |_, slot| Arc::strong_count(slot) == 2);
    }
}

#[cfg(test)]
mod tests {
    use super::UserLocks;
    use crate::model::user::UserId;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn same_user_sections_never_overlap() {
        let locks = Arc::new(UserLocks::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));
        let user = UserId::parse("u1").unwrap();

        let handles = (0..8)
            .map(|_| {
                let locks = Arc::clone(&locks);
                let inside = Arc::clone(&inside);
                let max_seen = Arc::clone(&max_seen);
                let user = user.clone();
                thread::spawn(move || {
                    locks.with_user(&user, || {
                        let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                        max_seen.fetch_max(now, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(5));
                        inside.fetch_sub(1, Ordering::SeqCst);
                    });
                })
            })
            .collect::<Vec<_>>();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
        assert_eq!(locks.tracked_users(), 0);
    }

    #[test]
    fn different_users_run_in_parallel() {
        let locks = Arc::new(UserLocks::new());
        let barrier = Arc::new(Barrier::new(2));

        // Both threads must be inside their critical sections at the same
        // time for the barrier to release; a shared lock would deadlock.
        let handles = ["u1", "u2"]
            .into_iter()
            .map(|name| {
                let locks = Arc::clone(&locks);
                let barrier = Arc::clone(&barrier);
                let user = UserId::parse(name).unwrap();
                thread::spawn(move || locks.with_user(&user, || barrier.wait().is_leader()))
            })
            .collect::<Vec<_>>();
        let leaders = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|is_leader| *is_leader)
            .count();

        assert_eq!(leaders, 1);
        assert_eq!(locks.tracked_users(), 0);
    }

    #[test]
    fn slot_is_tracked_only_while_held() {
        let locks = UserLocks::new();
        let user = UserId::parse("u1").unwrap();

        let inside = locks.with_user(&user, || locks.tracked_users());

        assert_eq!(inside, 1);
        assert_eq!(locks.tracked_users(), 0);
    }

    #[test]
    fn waiting_caller_keeps_the_slot_alive() {
        let locks = Arc::new(UserLocks::new());
        let user = UserId::parse("u1").unwrap();
        let entered = Arc::new(Barrier::new(2));

        let holder = {
            let locks = Arc::clone(&locks);
            let user = user.clone();
            let entered = Arc::clone(&entered);
            thread::spawn(move || {
                locks.with_user(&user, || {
                    entered.wait();
                    thread::sleep(Duration::from_millis(20));
                })
            })
        };
        entered.wait();
        // Queues behind the holder on the same slot.
        let seen = locks.with_user(&user, || locks.tracked_users());
        holder.join().unwrap();

        assert_eq!(seen, 1);
        assert_eq!(locks.tracked_users(), 0);
    }

    #[test]
    fn panicking_section_releases_and_evicts() {
        let locks = Arc::new(UserLocks::new());
        let user = UserId::parse("u1").unwrap();

        let panicker = {
            let locks = Arc::clone(&locks);
            let user = user.clone();
            thread::spawn(move || {
                locks.with_user(&user, || panic!("boom"));
            })
        };
        assert!(panicker.join().is_err());

        assert_eq!(locks.tracked_users(), 0);
        assert_eq!(locks.with_user(&user, || 42), 42);
    }
}
