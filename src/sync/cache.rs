//! In-memory structure cache.
//!
//! Caches the live columns of each table for `ttl`. Keys are table names
//! exactly as they are quoted in DDL, so `Products` and `products` are two
//! entries. The reconciler refreshes or invalidates an entry whenever it
//! applies a change to that table.
//!
//! # Design
//!
//! - One entry per table, replaced whole
//! - Entries expire after the TTL and are dropped on the next read
//! - A disabled cache never stores anything

use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::metadata::ColumnDescriptor;

#[derive(Debug, Clone)]
struct CachedStructure {
    columns: Vec<ColumnDescriptor>,
    fetched_at: Instant,
}

/// TTL cache of live table structures.
#[derive(Debug)]
pub struct StructureCache {
    entries: DashMap<String, CachedStructure>,
    ttl: Duration,
    enabled: bool,
}

impl StructureCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            enabled: true,
        }
    }

    /// A cache that stores nothing.
    pub fn disabled() -> Self {
        Self {
            entries: DashMap::new(),
            ttl: Duration::ZERO,
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Cached columns for `table`, if present and fresh.
    pub fn get_cached(&self, table: &str) -> Option<Vec<ColumnDescriptor>> {
        if !self.enabled {
            return None;
        }
        let fresh = self
            .entries
            .get(table)
            .filter(|entry| entry.fetched_at.elapsed() < self.ttl)
            .map(|entry| entry.columns.clone());
        if fresh.is_none() {
            self.entries.remove(table);
        }
        fresh
    }

    /// Store the current columns of `table`.
    pub fn refresh(&self, table: &str, columns: Vec<ColumnDescriptor>) {
        if !self.enabled {
            return;
        }
        self.entries.insert(
            table.to_string(),
            CachedStructure {
                columns,
                fetched_at: Instant::now(),
            },
        );
    }

    pub fn invalidate(&self, table: &str) {
        self.entries.remove(table);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
