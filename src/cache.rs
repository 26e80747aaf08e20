//! A bounded LRU cache of compiled XPath expressions, keyed by expression text.

use crate::error::QueryError;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};
use xquery_xpath::Expr;

/// Default number of compiled expressions kept by a `QueryCache`.
pub const DEFAULT_CAPACITY: usize = 50;

/// Settings for a `QueryCache`. A capacity of zero disables caching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    pub capacity: usize,
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            capacity: DEFAULT_CAPACITY,
            enabled: true,
        }
    }
}

impl CacheConfig {
    /// A configuration that compiles every expression on each call.
    pub fn disabled() -> Self {
        CacheConfig {
            capacity: 0,
            enabled: false,
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Compiled expressions shared between threads.
///
/// Lookups take a lock for the duration of one compile at most. Failed
/// compilations are not cached.
#[derive(Debug)]
pub struct QueryCache {
    entries: Option<Mutex<LruCache<String, Arc<Expr>>>>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl QueryCache {
    pub fn new(config: CacheConfig) -> Self {
        let entries = NonZeroUsize::new(config.capacity)
            .filter(|_| config.enabled)
            .map(|capacity| Mutex::new(LruCache::new(capacity)));
        if entries.is_none() {
            log::debug!("Query cache disabled");
        }
        QueryCache { entries }
    }

    pub fn is_enabled(&self) -> bool {
        self.entries.is_some()
    }

    /// Returns the compiled form of `expr`, compiling and storing it on a miss.
    pub fn get_or_compile(&self, expr: &str) -> Result<Arc<Expr>, QueryError> {
        let Some(entries) = &self.entries else {
            return compile(expr);
        };
        let mut entries = lock(entries);
        if let Some(compiled) = entries.get(expr) {
            log::trace!("Query cache hit for '{expr}'");
            return Ok(Arc::clone(compiled));
        }
        log::trace!("Query cache miss for '{expr}'");
        let compiled = compile(expr)?;
        entries.put(expr.to_string(), Arc::clone(&compiled));
        Ok(compiled)
    }

    /// Number of cached expressions.
    pub fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, |e| lock(e).len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of cached expressions, zero when disabled.
    pub fn capacity(&self) -> usize {
        self.entries.as_ref().map_or(0, |e| lock(e).cap().get())
    }

    pub fn contains(&self, expr: &str) -> bool {
        self.entries
            .as_ref()
            .is_some_and(|e| lock(e).contains(expr))
    }

    pub fn clear(&self) {
        if let Some(entries) = &self.entries {
            lock(entries).clear();
        }
    }
}

fn compile(expr: &str) -> Result<Arc<Expr>, QueryError> {
    Expr::compile(expr)
        .map(Arc::new)
        .map_err(|e| QueryError::invalid(expr, e))
}

// The cache holds no invariant a panicking thread could break halfway, so a
// poisoned lock is still usable.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
