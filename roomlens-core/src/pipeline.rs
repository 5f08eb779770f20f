//! Live mapping pipeline
//!
//! [`MappingPipeline`] owns the active mapping and the mapper that evaluates
//! it. Only mappings that validate and whose transforms all resolve are
//! ever made active, so per-frame evaluation fails only when a processor
//! override returns an error.
//!
//! ## Live Reload
//!
//! ```text
//! update_mapping(new)
//!     validate(new)          ── fails → old mapping stays active
//!     prepare(new)           ── fails → old mapping stays active
//!     clear transform cache
//!     swap Arc<MappingSpec>
//! ```
//!
//! Frames in flight keep the snapshot they started with; the next frame
//! sees the new mapping.

use std::sync::{Arc, RwLock};

use crate::errors::MappingResult;
use crate::frame::{AxisPayload, Frame};
use crate::mapping::{AxisMapper, ProcessorRegistry};
use crate::spec::MappingSpec;
use crate::transform::TransformCache;

/// Validated mapping plus the mapper evaluating it
#[derive(Debug)]
pub struct MappingPipeline {
    spec: RwLock<Arc<MappingSpec>>,
    mapper: AxisMapper,
}

impl MappingPipeline {
    /// Validate, pre-resolve and activate a mapping
    pub fn new(spec: MappingSpec) -> MappingResult<Self> {
        Self::with_mapper(spec, AxisMapper::new())
    }

    /// Same as [`MappingPipeline::new`] with per-sensor processor overrides
    pub fn with_processors(spec: MappingSpec, processors: ProcessorRegistry) -> MappingResult<Self> {
        Self::with_mapper(spec, AxisMapper::new().with_processors(processors))
    }

    /// Same as [`MappingPipeline::new`] with a fully configured mapper
    pub fn with_mapper(spec: MappingSpec, mapper: AxisMapper) -> MappingResult<Self> {
        check(&spec, &mapper)?;
        Ok(Self {
            spec: RwLock::new(Arc::new(spec)),
            mapper,
        })
    }

    /// Current mapping snapshot
    pub fn spec(&self) -> Arc<MappingSpec> {
        let guard = self.spec.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&*guard)
    }

    /// Transform cache used by this pipeline
    pub fn transforms(&self) -> &TransformCache {
        self.mapper.transforms()
    }

    /// Evaluate one frame against the current mapping
    pub fn process_frame(&self, frame: &Frame) -> MappingResult<AxisPayload> {
        let spec = self.spec();
        let axes = self.mapper.apply(frame, &spec)?;
        Ok(AxisPayload {
            t: frame.timestamp().cloned(),
            axes,
        })
    }

    /// Lazily evaluate a sequence of frames
    pub fn iter_process<'a, I>(
        &'a self,
        frames: I,
    ) -> impl Iterator<Item = MappingResult<AxisPayload>> + 'a
    where
        I: IntoIterator<Item = Frame> + 'a,
        I::IntoIter: 'a,
    {
        frames.into_iter().map(move |frame| self.process_frame(&frame))
    }

    /// Replace the active mapping
    ///
    /// The new mapping is validated and its transforms resolved before
    /// anything changes. On error the previous mapping stays active.
    pub fn update_mapping(&self, spec: MappingSpec) -> MappingResult<()> {
        // Resolve against a scratch cache so a failing mapping leaves the
        // live cache untouched.
        let scratch = self.mapper.clone().with_cache(Arc::new(TransformCache::new()));
        check(&spec, &scratch)?;

        let mut guard = self.spec.write().unwrap_or_else(|e| e.into_inner());
        self.mapper.transforms().clear();
        *guard = Arc::new(spec);
        drop(guard);

        log_info!("mapping updated");
        Ok(())
    }
}

fn check(spec: &MappingSpec, mapper: &AxisMapper) -> MappingResult<()> {
    spec.validate()?;
    mapper.prepare(spec)?;
    warn_conflicts(spec);
    Ok(())
}

#[cfg(feature = "log")]
fn warn_conflicts(spec: &MappingSpec) {
    for conflict in spec.axis_conflicts() {
        log_warn!(
            "axis '{}' written by {}; last writer wins",
            conflict.axis,
            conflict.writers.join(", ")
        );
    }
}

#[cfg(not(feature = "log"))]
fn warn_conflicts(_spec: &MappingSpec) {}
