//! Memoising provider wrapper.

use super::{InstalledFile, MetadataProvider, PackageMetadata};
use crate::error::Result;
use crate::model::normalize_name;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

type CacheKey = (String, Option<String>);

/// Remembers every lookup, including not-found results, so a package
/// reached from many parents is queried once.
///
/// The lock is not held while the inner provider runs; two threads racing
/// on the same key may both query it, and the first stored answer is kept.
#[derive(Debug)]
pub struct CachingProvider<P> {
    inner: P,
    lookups: Mutex<HashMap<CacheKey, Option<PackageMetadata>>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

/// Cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub entries: usize,
}

impl<P: MetadataProvider> CachingProvider<P> {
    /// Wrap a provider
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            lookups: Mutex::new(HashMap::new()),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    /// The wrapped provider
    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Whether a lookup for this key is already cached
    pub fn contains(&self, name: &str, version: Option<&str>) -> bool {
        let key = cache_key(name, version);
        self.lookups
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&key)
    }

    /// Current counters
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self
                .lookups
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .len(),
        }
    }
}

fn cache_key(name: &str, version: Option<&str>) -> CacheKey {
    (normalize_name(name), version.map(String::from))
}

impl<P: MetadataProvider> MetadataProvider for CachingProvider<P> {
    fn lookup(&self, name: &str, version: Option<&str>) -> Result<Option<PackageMetadata>> {
        let key = cache_key(name, version);
        if let Some(cached) = self
            .lookups
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(cached.clone());
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let fetched = self.inner.lookup(name, version)?;
        let mut lookups = self.lookups.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(lookups.entry(key).or_insert(fetched).clone())
    }

    fn installed(&self) -> Result<Vec<String>> {
        self.inner.installed()
    }

    fn files(&self, name: &str) -> Result<Vec<InstalledFile>> {
        self.inner.files(name)
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}
