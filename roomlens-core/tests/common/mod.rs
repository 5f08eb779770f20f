//! Shared fixtures for integration tests
//!
//! This module provides:
//! - A realistic multi-sensor mapping document
//! - Helpers to build specs from inline JSON
//! - Float comparison for axis values

#![allow(dead_code)]

use std::sync::Arc;

use roomlens_core::transform::TransformCache;
use roomlens_core::{AxisMapper, MappingSpec};
use serde_json::Value;

/// Installation-style mapping covering every built-in transform
pub const ROOM_MAPPING: &str = r#"{
    "sensors": {
        "mic": {
            "enabled": true,
            "features": {
                "rms": {
                    "transform": "log10_clamp(floor_db=-60)",
                    "map_to": {"axis": "grain_density", "range": [0.1, 0.9]},
                    "notes": "louder room, denser grains"
                },
                "spectral_centroid": {
                    "map_to": {"axis": "filter_cutoff_hz", "range": [400, 8000]}
                },
                "hf_rolloff": {
                    "source": "mic_hf|hf",
                    "transform": "clamp01",
                    "map_to": {"axis": "air", "range": [0, 0.5]}
                }
            }
        },
        "tof": {
            "enabled": true,
            "features": {
                "motion_energy": {
                    "transform": "softclip(threshold=0.6, slope=3)",
                    "map_to": {"axis": "granular_jitter"}
                },
                "proximity": {
                    "map_to": {"axis": "delay_time_ms", "range": [40, 240]}
                }
            }
        },
        "light": {
            "enabled": true,
            "features": {
                "lux": {"map_to": {"axis": "reverb_mix", "range": [0.05, 0.6]}},
                "flicker_hz": {
                    "transform": "inverse_exp(centers=[0.5, 1.0], k=2)",
                    "map_to": {"axis": "tremolo_depth"}
                }
            }
        },
        "motion": {
            "enabled": false,
            "features": {
                "burst": {"map_to": {"axis": "freeze"}}
            }
        }
    },
    "axes": {
        "grain_density": {"label": "Grain density", "unit": "grains/s"},
        "reverb_mix": {"description": "Wet/dry balance"}
    }
}"#;

/// Parsed [`ROOM_MAPPING`]
pub fn room_spec() -> MappingSpec {
    MappingSpec::from_json_str(ROOM_MAPPING).expect("fixture mapping parses")
}

/// Spec from an inline JSON tree
pub fn spec(value: Value) -> MappingSpec {
    MappingSpec::from_value(&value).expect("inline mapping parses")
}

/// Mapper with a private cache so tests don't share state
pub fn isolated_mapper() -> AxisMapper {
    AxisMapper::new().with_cache(Arc::new(TransformCache::new()))
}

/// Assert two floats agree to 1e-9
pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        actual
    );
}
