//! Transform Resolution
//!
//! ## Overview
//!
//! A feature's `transform` is a call-like string naming a registered curve
//! and its construction arguments:
//!
//! ```text
//! log10_clamp
//! log10_clamp(floor_db=-50)
//! softclip(0.6, slope=3)
//! inverse_exp(centers=[50, 120], k=1.2)
//! ```
//!
//! Resolution runs in three steps:
//!
//! 1. **Parse** the string with a literal-only recursive-descent parser
//!    ([`TransformCall::parse`]). Nothing is evaluated; only numbers,
//!    strings and lists are accepted as values.
//! 2. **Look up** the name in the fixed curve registry
//!    ([`curves::REGISTRY`]).
//! 3. **Construct** the curve, binding positional and keyword arguments to
//!    the factory's parameters.
//!
//! Each step has its own error: `TransformSyntax`, `UnknownTransform` and
//! `TransformConstruction`.
//!
//! ## Caching
//!
//! Built curves are memoized by their exact string in a [`TransformCache`].
//! Mappers share the process-wide [`GLOBAL_CACHE`] unless given their own.
//! The cache lives until the process exits or it is cleared explicitly,
//! which [`crate::MappingPipeline::update_mapping`] does on every swap.
//!
//! ## Example
//!
//! ```rust
//! use roomlens_core::transform::TransformCache;
//!
//! let cache = TransformCache::new();
//! let curve = cache.resolve(Some("log10_clamp"), "mic.rms")?;
//! assert!((curve.apply(10f64.powf(-30.0 / 20.0)) - 0.5).abs() < 1e-9);
//! # Ok::<(), roomlens_core::MappingError>(())
//! ```

mod cache;
pub mod curves;
mod parser;

pub use cache::{build, CacheStats, TransformCache, GLOBAL_CACHE};
pub use curves::Curve;
pub use parser::{Literal, TransformCall, MAX_LIST_DEPTH};
