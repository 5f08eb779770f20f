//! Mapping engine for Room Lens
//!
//! Turns normalized sensor frames (microphone loudness and spectrum,
//! time-of-flight proximity and motion, ambient light, motion bursts) into
//! named timbre axis values for a synth, driven entirely by a declarative
//! mapping document.
//!
//! Key constraints:
//! - Configuration errors fail at load time, never on stage
//! - Data errors degrade gracefully (missing keys read as 0.0)
//! - No I/O in this crate; frames come in, axis values go out
//!
//! ```no_run
//! use roomlens_core::{Frame, MappingPipeline, MappingSpec};
//!
//! let spec = MappingSpec::from_json_str(r#"{
//!     "sensors": {
//!         "mic": {
//!             "enabled": true,
//!             "features": {
//!                 "rms": {"transform": "log10_clamp", "map_to": {"axis": "grain_density", "range": [0.1, 0.9]}}
//!             }
//!         }
//!     }
//! }"#)?;
//!
//! let pipeline = MappingPipeline::new(spec)?;
//! let frame = Frame::new().with("mic_rms", 0.25);
//! let payload = pipeline.process_frame(&frame)?;
//! println!("{:?}", payload.axes);
//! # Ok::<(), roomlens_core::MappingError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

// Macros for optional logging
#[cfg(feature = "log")]
macro_rules! log_warn {
    ($($arg:tt)*) => { log::warn!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "log")]
macro_rules! log_info {
    ($($arg:tt)*) => { log::info!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_info {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "log")]
macro_rules! log_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {};
}

pub mod demo;
pub mod errors;
pub mod frame;
pub mod mapping;
pub mod pipeline;
pub mod resolve;
pub mod spec;
pub mod transform;

// Public API
pub use errors::{ArgumentError, MappingError, MappingResult};
pub use frame::{AxisOutput, AxisPayload, Frame, FrameError};
pub use mapping::{
    apply_feature_default, apply_mapping, clamp01, lerp, AxisMapper, GenericProcessor, ProcessorRegistry,
    SensorProcessor,
};
pub use pipeline::MappingPipeline;
pub use spec::{AxisConflict, AxisDoc, FeatureSpec, MappingSpec, OutputRange, SensorBlock};
pub use transform::{Curve, TransformCache, TransformCall};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_exists() {
        assert!(!VERSION.is_empty());
    }
}
