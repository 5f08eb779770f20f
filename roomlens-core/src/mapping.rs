//! Axis Mapping
//!
//! ## Overview
//!
//! One evaluation pass turns one frame into one [`AxisOutput`]:
//!
//! ```text
//! for each enabled sensor (declaration order):
//!     processor = override for this sensor, or GenericProcessor
//!     for each feature (declaration order):
//!         raw   = resolve::feature_value(...)
//!         t     = clamp01(transform(raw))
//!         axes[axis] = lerp(lo, hi, t)       // later writers win
//! ```
//!
//! Nothing carries over between frames except the transform cache.
//!
//! ## Sensor Processors
//!
//! A [`SensorProcessor`] owns a whole sensor's contribution to the output.
//! [`GenericProcessor`] runs the loop above; registering an override for a
//! sensor name replaces it entirely. This is the seam for new sensor kinds
//! that need more than per-feature lookups.
//!
//! ```rust
//! use roomlens_core::{apply_feature_default, AxisMapper, Frame, MappingSpec, ProcessorRegistry};
//! use roomlens_core::{AxisOutput, MappingResult, SensorBlock};
//! use roomlens_core::transform::TransformCache;
//!
//! // Radar reports distance in meters; invert it into closeness first.
//! let radar = |sensor: &SensorBlock, frame: &Frame, cache: &TransformCache, axes: &mut AxisOutput| -> MappingResult<()> {
//!     let meters = frame.get("radar_m").unwrap_or(10.0);
//!     let closeness = Frame::new().with("radar_close", 1.0 - (meters / 10.0));
//!     for feature in &sensor.features {
//!         apply_feature_default(&sensor.name, feature, &closeness, cache, axes)?;
//!     }
//!     Ok(())
//! };
//!
//! let mut processors = ProcessorRegistry::new();
//! processors.register("radar", radar);
//! let mapper = AxisMapper::new().with_processors(processors);
//!
//! let spec = MappingSpec::from_json_str(r#"{"sensors": {"radar": {"enabled": true,
//!     "features": {"close": {"frame_key": "radar_close", "map_to": {"axis": "reverb_mix"}}}}}}"#)?;
//! let axes = mapper.apply(&Frame::new().with("radar_m", 2.5), &spec)?;
//! assert!((axes["reverb_mix"] - 0.75).abs() < 1e-9);
//! # Ok::<(), roomlens_core::MappingError>(())
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::errors::MappingResult;
use crate::frame::{AxisOutput, Frame};
use crate::resolve;
use crate::spec::{qualified_name, FeatureSpec, MappingSpec, SensorBlock};
use crate::transform::{TransformCache, GLOBAL_CACHE};

/// Clamp into `[0, 1]`; NaN reads as 0
pub fn clamp01(x: f64) -> f64 {
    if x.is_nan() || x < 0.0 {
        0.0
    } else if x > 1.0 {
        1.0
    } else {
        x
    }
}

/// Linear interpolation from `a` (t = 0) to `b` (t = 1)
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Strategy that writes one sensor's axis values
pub trait SensorProcessor: Send + Sync {
    /// Process one enabled sensor block for one frame
    fn process(
        &self,
        sensor: &SensorBlock,
        frame: &Frame,
        transforms: &TransformCache,
        axes: &mut AxisOutput,
    ) -> MappingResult<()>;
}

impl<F> SensorProcessor for F
where
    F: Fn(&SensorBlock, &Frame, &TransformCache, &mut AxisOutput) -> MappingResult<()>
        + Send
        + Sync,
{
    fn process(
        &self,
        sensor: &SensorBlock,
        frame: &Frame,
        transforms: &TransformCache,
        axes: &mut AxisOutput,
    ) -> MappingResult<()> {
        self(sensor, frame, transforms, axes)
    }
}

/// Per-feature lookup, transform, clamp and interpolate
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericProcessor;

impl SensorProcessor for GenericProcessor {
    fn process(
        &self,
        sensor: &SensorBlock,
        frame: &Frame,
        transforms: &TransformCache,
        axes: &mut AxisOutput,
    ) -> MappingResult<()> {
        for feature in &sensor.features {
            apply_feature_default(&sensor.name, feature, frame, transforms, axes)?;
        }
        Ok(())
    }
}

/// Evaluate one feature and write its axis
///
/// Features without an axis are skipped; validation keeps them out of
/// loaded mappings.
pub fn apply_feature_default(
    sensor: &str,
    feature: &FeatureSpec,
    frame: &Frame,
    transforms: &TransformCache,
    axes: &mut AxisOutput,
) -> MappingResult<()> {
    let Some(axis) = feature.axis.as_deref() else {
        return Ok(());
    };

    let raw = resolve::feature_value(sensor, feature, frame);
    let curve = transforms.resolve(
        feature.transform.as_deref(),
        &qualified_name(sensor, &feature.name),
    )?;
    let t = clamp01(curve.apply(raw));

    axes.insert(axis.to_string(), lerp(feature.range.lo, feature.range.hi, t));
    Ok(())
}

/// Sensor name to processor override
#[derive(Clone, Default)]
pub struct ProcessorRegistry {
    overrides: HashMap<String, Arc<dyn SensorProcessor>>,
}

impl ProcessorRegistry {
    /// Empty registry; every sensor uses [`GenericProcessor`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the processor for a sensor name
    pub fn register<P: SensorProcessor + 'static>(&mut self, sensor: &str, processor: P) {
        self.overrides.insert(sensor.to_string(), Arc::new(processor));
    }

    /// Remove an override, returning whether one existed
    pub fn unregister(&mut self, sensor: &str) -> bool {
        self.overrides.remove(sensor).is_some()
    }

    /// Processor for a sensor, falling back to the generic one
    pub fn get(&self, sensor: &str) -> &dyn SensorProcessor {
        match self.overrides.get(sensor) {
            Some(processor) => processor.as_ref(),
            None => &GenericProcessor,
        }
    }

    /// Whether a sensor has an override
    pub fn has_override(&self, sensor: &str) -> bool {
        self.overrides.contains_key(sensor)
    }
}

impl fmt::Debug for ProcessorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.overrides.keys().collect();
        names.sort();
        f.debug_struct("ProcessorRegistry")
            .field("overrides", &names)
            .finish()
    }
}

/// Evaluates mappings against frames
#[derive(Debug, Clone)]
pub struct AxisMapper {
    processors: ProcessorRegistry,
    transforms: Arc<TransformCache>,
}

impl Default for AxisMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl AxisMapper {
    /// Mapper using the process-wide transform cache and no overrides
    pub fn new() -> Self {
        Self {
            processors: ProcessorRegistry::new(),
            transforms: Arc::clone(&*GLOBAL_CACHE),
        }
    }

    /// Use a private transform cache
    pub fn with_cache(mut self, transforms: Arc<TransformCache>) -> Self {
        self.transforms = transforms;
        self
    }

    /// Use these processor overrides
    pub fn with_processors(mut self, processors: ProcessorRegistry) -> Self {
        self.processors = processors;
        self
    }

    /// Transform cache in use
    pub fn transforms(&self) -> &TransformCache {
        &self.transforms
    }

    /// Processor overrides in use
    pub fn processors(&self) -> &ProcessorRegistry {
        &self.processors
    }

    /// Resolve every feature's transform up front
    ///
    /// Covers disabled sensors too, so a bad transform fails at load time
    /// rather than when someone flips a sensor on mid-show.
    pub fn prepare(&self, spec: &MappingSpec) -> MappingResult<()> {
        for sensor in &spec.sensors {
            for feature in &sensor.features {
                self.transforms.resolve(
                    feature.transform.as_deref(),
                    &qualified_name(&sensor.name, &feature.name),
                )?;
            }
        }
        Ok(())
    }

    /// One evaluation pass
    pub fn apply(&self, frame: &Frame, spec: &MappingSpec) -> MappingResult<AxisOutput> {
        let mut axes = AxisOutput::new();
        for sensor in spec.enabled_sensors() {
            self.processors
                .get(&sensor.name)
                .process(sensor, frame, &self.transforms, &mut axes)?;
        }
        Ok(axes)
    }
}

/// Evaluate a mapping with the global cache and no overrides
pub fn apply_mapping(frame: &Frame, spec: &MappingSpec) -> MappingResult<AxisOutput> {
    AxisMapper::new().apply(frame, spec)
}
