//! Per-table reconciliation locks.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::error::{SyncError, SyncResult};

type LockMap = DashMap<String, Arc<Mutex<()>>>;

/// Held for the duration of one reconciliation.
///
/// Dropping the guard releases the table and forgets its mutex once no other
/// caller holds or waits on it.
#[derive(Debug)]
pub struct TableGuard {
    table: String,
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<LockMap>,
}

impl TableGuard {
    pub fn table(&self) -> &str {
        &self.table
    }
}

impl Drop for TableGuard {
    fn drop(&mut self) {
        // Release first so the map holds the only reference again.
        self.guard.take();
        prune(&self.locks, &self.table);
    }
}

fn prune(locks: &LockMap, table: &str) {
    locks.remove_if(table, |_, mutex| Arc::strong_count(mutex) == 1);
}

/// Async mutex per table, keyed by the exact table name.
///
/// Guards the introspect, diff and apply sequence so two reconciliations of
/// the same table never interleave. Waiting is bounded by `timeout`.
#[derive(Debug)]
pub struct TableLocks {
    locks: Arc<LockMap>,
    timeout: Duration,
}

impl TableLocks {
    pub fn new(timeout: Duration) -> Self {
        Self {
            locks: Arc::new(DashMap::new()),
            timeout,
        }
    }

    fn mutex_for(&self, table: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(table.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Number of tables currently locked or waited on.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }

    /// Lock one table, failing with `Busy` after the timeout.
    pub async fn acquire(&self, table: &str) -> SyncResult<TableGuard> {
        let mutex = self.mutex_for(table);
        let locked = tokio::time::timeout(self.timeout, mutex.lock_owned()).await;
        match locked {
            Ok(guard) => Ok(TableGuard {
                table: table.to_string(),
                guard: Some(guard),
                locks: Arc::clone(&self.locks),
            }),
            Err(_) => {
                prune(&self.locks, table);
                tracing::warn!(table = %table, timeout_ms = self.timeout.as_millis() as u64, "table lock wait timed out");
                Err(SyncError::Busy(table.to_string()))
            }
        }
    }

    /// Lock several tables in sorted order.
    ///
    /// Duplicates are locked once.
    pub async fn acquire_many<'a>(
        &self,
        tables: impl IntoIterator<Item = &'a str>,
    ) -> SyncResult<Vec<TableGuard>> {
        let mut keys: Vec<&str> = tables.into_iter().collect();
        keys.sort_unstable();
        keys.dedup();

        let mut guards = Vec::with_capacity(keys.len());
        for key in keys {
            guards.push(self.acquire(key).await?);
        }
        Ok(guards)
    }
}
