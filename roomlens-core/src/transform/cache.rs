//! Transform cache keyed by transform string
//!
//! Every frame evaluates every feature, but a mapping only ever names a
//! handful of distinct transform strings. Curves are built once per
//! distinct string and shared behind an `Arc` afterwards.
//!
//! The key is the literal string from the mapping. `softclip(0.5)` and
//! `softclip(threshold=0.5)` are built separately even though they describe
//! the same curve.
//!
//! Only successes are cached. A bad transform string fails the same way
//! every time it is resolved.
//!
//! The cache is pure memoization, so racing builders are harmless: two
//! threads may build the same curve and one copy wins.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use lazy_static::lazy_static;

use crate::errors::{MappingError, MappingResult};

use super::curves::{self, Curve};
use super::parser::TransformCall;

/// Hit/miss counters
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that built a new curve
    pub misses: u64,
}

/// Thread-safe memo table from transform string to curve
#[derive(Debug, Default)]
pub struct TransformCache {
    curves: RwLock<HashMap<String, Arc<Curve>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

lazy_static! {
    /// Process-wide cache shared by every mapper that doesn't bring its own
    pub static ref GLOBAL_CACHE: Arc<TransformCache> = Arc::new(TransformCache::new());

    static ref IDENTITY: Arc<Curve> = Arc::new(Curve::Identity);
}

impl TransformCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Curve for a feature's transform string
    ///
    /// `None` or an empty string is the identity. `feature` names the
    /// `sensor.feature` in error messages.
    pub fn resolve(&self, spec: Option<&str>, feature: &str) -> MappingResult<Arc<Curve>> {
        let spec = match spec {
            Some(spec) if !spec.trim().is_empty() => spec,
            _ => return Ok(Arc::clone(&*IDENTITY)),
        };

        if let Some(curve) = self.read().get(spec) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Arc::clone(curve));
        }

        let curve = Arc::new(build(spec, feature)?);
        self.misses.fetch_add(1, Ordering::Relaxed);
        log_debug!("built transform '{}' for {}", spec, feature);

        let mut curves = self.write();
        let entry = curves
            .entry(spec.to_string())
            .or_insert_with(|| Arc::clone(&curve));
        Ok(Arc::clone(entry))
    }

    /// Drop every cached curve
    pub fn clear(&self) {
        self.write().clear();
    }

    /// Number of cached curves
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether nothing is cached
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Whether `spec` has a cached curve
    pub fn contains(&self, spec: &str) -> bool {
        self.read().contains_key(spec)
    }

    /// Hit/miss counters since creation
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    // A poisoned lock still guards a consistent memo table; keep using it.
    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Arc<Curve>>> {
        self.curves.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Arc<Curve>>> {
        self.curves.write().unwrap_or_else(|e| e.into_inner())
    }
}

/// Parse and construct a curve without touching any cache
pub fn build(spec: &str, feature: &str) -> MappingResult<Curve> {
    let call = TransformCall::parse(spec).map_err(|err| match err {
        MappingError::TransformSyntax { spec, reason, .. } => MappingError::TransformSyntax {
            spec,
            reason,
            feature: Some(feature.to_string()),
        },
        other => other,
    })?;

    let factory = curves::factory(&call.name).ok_or_else(|| MappingError::UnknownTransform {
        name: call.name.clone(),
        feature: feature.to_string(),
    })?;

    factory(&call).map_err(|source| MappingError::TransformConstruction {
        name: call.name.clone(),
        feature: feature.to_string(),
        source,
    })
}
