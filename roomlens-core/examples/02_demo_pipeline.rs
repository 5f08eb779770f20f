//! Demo Frames Through a Live Pipeline
//!
//! Drives a mapping pipeline with synthetic LFO frames, then swaps in a
//! different mapping halfway through, the way a workshop rehearses without
//! hardware attached.
//!
//! ## Pipeline Architecture
//!
//! ```text
//! DemoFrames → MappingPipeline → AxisPayload (JSON line)
//!                    ↑
//!              update_mapping()
//! ```
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 02_demo_pipeline
//! ```

use roomlens_core::demo::DemoFrames;
use roomlens_core::{MappingError, MappingPipeline, MappingSpec};

const FIRST: &str = r#"{
    "sensors": {
        "mic": {"enabled": true, "features": {
            "rms": {"transform": "log10_clamp", "map_to": {"axis": "grain_density", "range": [0.1, 0.9]}}
        }},
        "tof": {"enabled": true, "features": {
            "motion_energy": {"transform": "softclip", "map_to": {"axis": "granular_jitter"}}
        }},
        "motion": {"enabled": true, "features": {
            "burst": {"map_to": {"axis": "freeze"}}
        }}
    }
}"#;

const SECOND: &str = r#"{
    "sensors": {
        "light": {"enabled": true, "features": {
            "lux": {"map_to": {"axis": "reverb_mix", "range": [0.05, 0.6]}},
            "flicker_hz": {"transform": "inverse_exp(centers=[0.5], k=2)", "map_to": {"axis": "tremolo_depth"}}
        }}
    }
}"#;

fn main() -> Result<(), MappingError> {
    println!("Room Lens Demo Pipeline");
    println!("=======================\n");

    let pipeline = MappingPipeline::new(MappingSpec::from_json_str(FIRST)?)?;
    let frames = DemoFrames::at_rate(10.0).take(20);

    for (i, payload) in pipeline.iter_process(frames).enumerate() {
        let payload = payload?;
        match serde_json::to_string(&payload) {
            Ok(line) => println!("{}", line),
            Err(e) => eprintln!("could not serialize frame: {}", e),
        }

        // Frames are pulled lazily, so the next one already sees the swap
        if i == 9 {
            println!("-- swapping mapping --");
            pipeline.update_mapping(MappingSpec::from_json_str(SECOND)?)?;
        }
    }

    let stats = pipeline.transforms().stats();
    println!("\ntransform cache: {} hit(s), {} miss(es)", stats.hits, stats.misses);

    Ok(())
}
