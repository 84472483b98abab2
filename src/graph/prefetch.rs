//! Parallel metadata prefetch.
//!
//! Warms a caching provider breadth-first with a bounded rayon pool so the
//! deterministic depth-first assembly afterwards only reads the cache.
//! Deduplication of lookups goes through one mutex-guarded visited set.

use crate::error::{Result, SbomError};
use crate::model::normalize_name;
use crate::provider::{DependencySpec, MetadataProvider};
use rayon::prelude::*;
use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

type Lookup = (String, Option<String>);

/// Look up `seeds` and everything they transitively require.
///
/// Returns the number of distinct lookups issued. Lookup failures are
/// ignored here; assembly sees the same failure and drops the component.
pub fn prefetch(provider: &dyn MetadataProvider, seeds: Vec<Lookup>, jobs: usize) -> Result<usize> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs.max(1))
        .build()
        .map_err(|e| SbomError::config(format!("cannot start {jobs} worker threads: {e}")))?;

    let visited: Mutex<HashSet<Lookup>> = Mutex::new(HashSet::new());
    let claim = |(name, version): Lookup| -> Option<Lookup> {
        let key = (normalize_name(&name), version.clone());
        let mut visited = visited.lock().unwrap_or_else(PoisonError::into_inner);
        visited.insert(key).then_some((name, version))
    };

    let mut frontier: Vec<Lookup> = seeds.into_iter().filter_map(&claim).collect();
    let mut issued = 0;
    while !frontier.is_empty() {
        issued += frontier.len();
        tracing::debug!("Prefetching {} packages", frontier.len());
        let discovered: Vec<Lookup> = pool.install(|| {
            frontier
                .par_iter()
                .flat_map_iter(|(name, version)| {
                    let requires = match provider.lookup(name, version.as_deref()) {
                        Ok(Some(metadata)) => metadata.requires(),
                        _ => Vec::new(),
                    };
                    requires
                        .into_iter()
                        .filter_map(|raw| DependencySpec::parse(&raw))
                        .map(|spec| (spec.name, spec.version))
                })
                .collect()
        });
        frontier = discovered.into_iter().filter_map(&claim).collect();
    }
    Ok(issued)
}
