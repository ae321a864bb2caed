//! Process-wide state shared by all virtual users of a run

use bankload_http::AccountId;
use parking_lot::RwLock;
use rand::Rng;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

/// Shared account cell and account pool. Created once per run and handed
/// to every user behind an `Arc`.
#[derive(Debug, Default)]
pub struct SharedState {
    shared_account: OnceLock<AccountId>,
    pool: AccountPool,
    accounts_created: AtomicUsize,
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the shared transfer destination. Only the first call wins.
    pub fn set_shared_account(&self, id: AccountId) -> bool {
        self.shared_account.set(id).is_ok()
    }

    pub fn shared_account(&self) -> Option<AccountId> {
        self.shared_account.get().copied()
    }

    pub fn pool(&self) -> &AccountPool {
        &self.pool
    }

    /// Count a user whose own account was created. Counted at start so
    /// users aborted later are still included.
    pub fn record_account_created(&self) {
        self.accounts_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn accounts_created(&self) -> usize {
        self.accounts_created.load(Ordering::Relaxed)
    }
}

/// Append-only set of account ids, safe for concurrent insertion.
///
/// Insertion order is kept so uniform draws index a `Vec`; the side set
/// keeps ids unique, which makes `len()` the distinct count.
#[derive(Debug, Default)]
pub struct AccountPool {
    inner: RwLock<PoolInner>,
}

#[derive(Debug, Default)]
struct PoolInner {
    ids: Vec<AccountId>,
    seen: HashSet<AccountId>,
}

impl AccountPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an id. Returns `false` if it was already present.
    pub fn insert(&self, id: AccountId) -> bool {
        let mut inner = self.inner.write();
        if !inner.seen.insert(id) {
            return false;
        }
        inner.ids.push(id);
        true
    }

    pub fn len(&self) -> usize {
        self.inner.read().ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: AccountId) -> bool {
        self.inner.read().seen.contains(&id)
    }

    /// Copy of the pool in insertion order
    pub fn snapshot(&self) -> Vec<AccountId> {
        self.inner.read().ids.clone()
    }

    /// Draw a transfer target uniformly from the pool, resampling while the
    /// draw is `own`.
    ///
    /// Returns `None` unless the pool holds at least two ids. Ids are
    /// unique, so two entries always include one that is not `own` and the
    /// resampling loop terminates.
    pub fn pick_peer<R: Rng + ?Sized>(&self, own: AccountId, rng: &mut R) -> Option<AccountId> {
        let inner = self.inner.read();
        if inner.ids.len() < 2 {
            return None;
        }

        loop {
            let candidate = inner.ids[rng.random_range(0..inner.ids.len())];
            if candidate != own {
                return Some(candidate);
            }
        }
    }
}
