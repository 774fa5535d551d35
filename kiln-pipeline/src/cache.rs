// Kiln Pipeline - Cached warehouse reads
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! TTL memoization of warehouse reads.
//!
//! Entries expire `ttl` after they were loaded, measured on an injected
//! [`Clock`] so expiry can be tested without sleeping.

use crate::warehouse::{Warehouse, WarehouseError, ALERTS_TABLE, VARIANCE_TABLE};
use kiln::{AlertEvent, VarianceRow};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Default time-to-live for cached reads.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Key-value cache whose entries expire after a fixed TTL.
pub struct TtlCache<K, V> {
    entries: Mutex<HashMap<K, (Instant, V)>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh value for `key`, if any.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let entries = self.entries.lock();
        entries
            .get(key)
            .filter(|(loaded_at, _)| now.duration_since(*loaded_at) < self.ttl)
            .map(|(_, value)| value.clone())
    }

    pub fn insert(&self, key: K, value: V) {
        let now = self.clock.now();
        self.entries.lock().insert(key, (now, value));
    }

    /// Return the fresh value or load, store and return a new one.
    ///
    /// The lock is not held while `load` runs; concurrent misses may both load.
    pub fn get_or_try_insert_with<E>(
        &self,
        key: K,
        load: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E> {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }
        let value = load()?;
        self.insert(key, value.clone());
        Ok(value)
    }

    pub fn invalidate(&self, key: &K) {
        self.entries.lock().remove(key);
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Drop expired entries.
    pub fn purge_expired(&self) {
        let now = self.clock.now();
        let ttl = self.ttl;
        self.entries
            .lock()
            .retain(|_, (loaded_at, _)| now.duration_since(*loaded_at) < ttl);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

/// Memoized reads of the variance and alert tables.
pub struct CachedTables<W> {
    warehouse: W,
    variance: TtlCache<&'static str, Arc<Vec<VarianceRow>>>,
    alerts: TtlCache<&'static str, Arc<Vec<AlertEvent>>>,
}

impl<W: Warehouse> CachedTables<W> {
    pub fn new(warehouse: W, ttl: Duration) -> Self {
        Self::with_clock(warehouse, ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(warehouse: W, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            warehouse,
            variance: TtlCache::with_clock(ttl, clock.clone()),
            alerts: TtlCache::with_clock(ttl, clock),
        }
    }

    pub fn warehouse(&self) -> &W {
        &self.warehouse
    }

    pub fn variance_rows(&self) -> Result<Arc<Vec<VarianceRow>>, WarehouseError> {
        self.variance.get_or_try_insert_with(VARIANCE_TABLE, || {
            debug!("cache miss for {}", VARIANCE_TABLE);
            self.warehouse.load_table(VARIANCE_TABLE).map(Arc::new)
        })
    }

    pub fn alerts(&self) -> Result<Arc<Vec<AlertEvent>>, WarehouseError> {
        self.alerts.get_or_try_insert_with(ALERTS_TABLE, || {
            debug!("cache miss for {}", ALERTS_TABLE);
            self.warehouse.load_table(ALERTS_TABLE).map(Arc::new)
        })
    }

    /// Forget cached reads, e.g. after the tables were reloaded.
    pub fn invalidate(&self) {
        self.variance.clear();
        self.alerts.clear();
    }
}
