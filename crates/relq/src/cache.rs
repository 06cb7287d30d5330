//! Result cache keyed by statement fingerprint.
//!
//! The cache is an explicit service owned by the application: builders never
//! reach a global map. A builder with [`QueryBuilder::cache`] set stores and
//! looks up rows through [`QueryBuilder::cache_result`] and
//! [`QueryBuilder::cached_result`]; without the flag both are no-ops.
//!
//! ```ignore
//! use relq::{ResultCache, table};
//!
//! let cache: ResultCache<Vec<User>> = ResultCache::with_capacity(256);
//! let q = table("users").filter("active = ?", [true]).cache();
//!
//! if let Some(rows) = q.cached_result(&cache) {
//!     return Ok(rows);
//! }
//! let rows = fetch(&q.render_select()).await?;
//! q.cache_result(&cache, rows);
//!
//! // after writing to `users`
//! cache.invalidate_table(Dialect::Postgres, "users");
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::Config;
use crate::dialect::Dialect;
use crate::ident::{quote_or_raw, table_name};
use crate::qb::QueryBuilder;

/// Hit/miss counters and current size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Thread-safe map from fingerprint to rows, with optional LRU capacity.
#[derive(Debug)]
pub struct ResultCache<R> {
    inner: Mutex<CacheInner<R>>,
}

#[derive(Debug)]
struct CacheInner<R> {
    capacity: Option<usize>,
    map: HashMap<String, Arc<R>>,
    order: VecDeque<String>,
    hits: u64,
    misses: u64,
}

impl<R> Default for ResultCache<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> ResultCache<R> {
    /// Unbounded cache.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Cache holding at most `capacity` entries; the least recently used entry
    /// is evicted first. A capacity of 0 stores nothing.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::build(Some(capacity))
    }

    pub fn from_config(config: &Config) -> Self {
        Self::build(config.cache_capacity)
    }

    fn build(capacity: Option<usize>) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                capacity,
                map: HashMap::new(),
                order: VecDeque::new(),
                hits: 0,
                misses: 0,
            }),
        }
    }

    // Poisoning is ignored; entries are plain memoized rows.
    fn lock(&self) -> MutexGuard<'_, CacheInner<R>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, fingerprint: &str) -> Option<Arc<R>> {
        let mut inner = self.lock();
        match inner.map.get(fingerprint).cloned() {
            Some(rows) => {
                inner.hits += 1;
                inner.touch(fingerprint);
                tracing::trace!(fingerprint, "result cache hit");
                Some(rows)
            }
            None => {
                inner.misses += 1;
                tracing::trace!(fingerprint, "result cache miss");
                None
            }
        }
    }

    /// Store `rows`, replacing any previous entry for the fingerprint.
    pub fn insert(&self, fingerprint: String, rows: R) -> Arc<R> {
        let rows = Arc::new(rows);
        let mut inner = self.lock();
        if inner.map.insert(fingerprint.clone(), Arc::clone(&rows)).is_some() {
            inner.touch(&fingerprint);
        } else {
            inner.order.push_back(fingerprint);
        }
        inner.evict_if_needed();
        rows
    }

    /// Drop every entry whose fingerprint mentions `table`'s quoted name.
    /// An alias (`users u`) is ignored. Returns the number of entries removed.
    pub fn invalidate_table(&self, dialect: Dialect, table: &str) -> usize {
        let needle = quote_or_raw(table_name(table), dialect);
        let mut inner = self.lock();
        let before = inner.map.len();
        inner.map.retain(|key, _| !key.contains(&needle));
        let CacheInner { map, order, .. } = &mut *inner;
        order.retain(|key| map.contains_key(key));
        let removed = before - inner.map.len();
        tracing::trace!(table, removed, "result cache invalidated");
        removed
    }

    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.map.clear();
        inner.order.clear();
    }

    pub fn len(&self) -> usize {
        self.lock().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().map.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.lock();
        CacheStats {
            hits: inner.hits,
            misses: inner.misses,
            entries: inner.map.len(),
        }
    }
}

impl<R> CacheInner<R> {
    fn touch(&mut self, key: &str) {
        if let Some(pos) = self.order.iter().position(|k| k.as_str() == key) {
            if let Some(k) = self.order.remove(pos) {
                self.order.push_back(k);
            }
        }
    }

    fn evict_if_needed(&mut self) {
        let Some(capacity) = self.capacity else {
            return;
        };
        while self.map.len() > capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            let _ = self.map.remove(&oldest);
        }
    }
}

impl QueryBuilder {
    /// Remember `rows` as the result of this SELECT. No-op unless the cache
    /// flag is set.
    pub fn cache_result<R>(&self, cache: &ResultCache<R>, rows: R) {
        if !self.is_cached() {
            return;
        }
        cache.insert(self.render_select().fingerprint(), rows);
    }

    /// Rows previously stored for this exact SELECT and arguments. Always
    /// `None` unless the cache flag is set.
    pub fn cached_result<R>(&self, cache: &ResultCache<R>) -> Option<Arc<R>> {
        if !self.is_cached() {
            return None;
        }
        cache.get(&self.render_select().fingerprint())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qb::table;
    use crate::value::Value;

    fn pg(name: &str) -> QueryBuilder {
        table(name).on(Dialect::Postgres)
    }

    #[test]
    fn flag_off_is_noop() {
        let cache = ResultCache::new();
        let q = pg("users").filter("id = ?", [1]);
        q.cache_result(&cache, vec![1, 2, 3]);
        assert!(cache.is_empty());
        assert!(q.cached_result(&cache).is_none());
    }

    #[test]
    fn round_trip_by_fingerprint() {
        let cache = ResultCache::new();
        let q = pg("users").filter("id = ?", [1]).cache();
        q.cache_result(&cache, vec!["alice"]);

        assert_eq!(q.cached_result(&cache).as_deref(), Some(&vec!["alice"]));
        // Same SQL, different argument.
        let other = pg("users").filter("id = ?", [2]).cache();
        assert!(other.cached_result(&cache).is_none());

        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses, stats.entries), (1, 1, 1));
    }

    #[test]
    fn argument_types_do_not_share_entries() {
        let cache = ResultCache::new();
        pg("t").filter("a = ?", [Value::Null]).cache().cache_result(&cache, "null");
        let nan = pg("t").filter("a = ?", [Value::Float(f64::NAN)]).cache();
        assert!(nan.cached_result(&cache).is_none());
    }

    #[test]
    fn invalidate_by_quoted_table_name() {
        let cache = ResultCache::new();
        pg("users").cache().cache_result(&cache, 1);
        pg("orders").cache().cache_result(&cache, 2);
        pg("users_archive").cache().cache_result(&cache, 3);

        assert_eq!(cache.invalidate_table(Dialect::Postgres, "users"), 1);
        assert_eq!(cache.len(), 2);
        assert!(pg("orders").cache().cached_result(&cache).is_some());
    }

    #[test]
    fn invalidate_accepts_aliased_names() {
        let cache = ResultCache::new();
        pg("users u").cache().cache_result(&cache, 1);
        pg("orders").cache().cache_result(&cache, 2);

        assert_eq!(cache.invalidate_table(Dialect::Postgres, "users AS u"), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn invalidate_on_mysql_uses_backticks() {
        let cache = ResultCache::new();
        let my = |name: &str| table(name).on(Dialect::MySql).cache();
        my("users").filter("id = ?", [1]).cache_result(&cache, 1);
        my("orders").cache_result(&cache, 2);

        // PostgreSQL quoting does not match MySQL-rendered statements.
        assert_eq!(cache.invalidate_table(Dialect::Postgres, "users"), 0);
        assert_eq!(cache.invalidate_table(Dialect::MySql, "users"), 1);
        assert!(my("orders").cached_result(&cache).is_some());
    }

    #[test]
    fn lru_eviction() {
        let cache = ResultCache::with_capacity(2);
        cache.insert("a".into(), 1);
        cache.insert("b".into(), 2);
        assert!(cache.get("a").is_some());
        cache.insert("c".into(), 3);

        assert!(cache.get("b").is_none());
        assert!(cache.get("a").is_some());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn zero_capacity_stores_nothing() {
        let cache = ResultCache::with_capacity(0);
        cache.insert("a".into(), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn clear_empties() {
        let cache = ResultCache::new();
        cache.insert("a".into(), 1);
        cache.clear();
        assert_eq!(cache.len(), 0);
    }
}
