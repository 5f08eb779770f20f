//! Applying a Mapping to Single Frames
//!
//! Loads a small mapping document, validates it, and evaluates a few
//! hand-written frames against it.
//!
//! ## What You'll Learn
//!
//! - The shape of a mapping document
//! - How frame keys are found for each feature
//! - How transforms and output ranges shape the axis values
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 01_apply_mapping
//! ```

use roomlens_core::{apply_mapping, Frame, MappingError, MappingSpec};

const MAPPING: &str = r#"{
    "sensors": {
        "mic": {
            "enabled": true,
            "features": {
                "rms": {
                    "transform": "log10_clamp(floor_db=-60)",
                    "map_to": {"axis": "grain_density", "range": [0.1, 0.9]}
                },
                "spectral_centroid": {
                    "map_to": {"axis": "filter_cutoff_hz", "range": [400, 8000]}
                }
            }
        },
        "tof": {
            "enabled": true,
            "features": {
                "proximity": {
                    "transform": "softclip(threshold=0.6, slope=3)",
                    "map_to": {"axis": "delay_time_ms", "range": [40, 240]}
                }
            }
        },
        "light": {
            "enabled": false,
            "features": {
                "lux": {"map_to": {"axis": "reverb_mix"}}
            }
        }
    }
}"#;

fn main() -> Result<(), MappingError> {
    println!("Room Lens Mapping Example");
    println!("=========================\n");

    let spec = MappingSpec::from_json_str(MAPPING)?;
    spec.validate()?;

    println!("Sensors in evaluation order:");
    for sensor in &spec.sensors {
        let state = if sensor.enabled { "on" } else { "off" };
        println!("  {} ({}): {} feature(s)", sensor.name, state, sensor.features.len());
    }
    println!();

    let frames = [
        ("quiet room", Frame::new().with("mic_rms", 0.001).with("mic_sc", 0.2)),
        ("talking", Frame::new().with("mic_rms", 0.05).with("mic_sc", 0.5).with("tof_near", 0.3)),
        ("hand on sensor", Frame::new().with("mic_rms", 0.5).with("tof_near", 0.95)),
        // lux is ignored while the light sensor is disabled
        ("lights on", Frame::new().with("lux", 1.0)),
    ];

    for (label, frame) in &frames {
        let axes = apply_mapping(frame, &spec)?;
        println!("{}:", label);
        for (axis, value) in &axes {
            println!("  {:<18} {:>9.3}", axis, value);
        }
    }

    Ok(())
}
