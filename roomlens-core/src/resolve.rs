//! Feature Value Resolution
//!
//! ## Overview
//!
//! Every feature needs one raw number out of the incoming frame. Mapping
//! authors can be explicit, but most mappings lean on the firmware's
//! naming and let the defaults find the value.
//!
//! ## Priority
//!
//! ```text
//! 1. frame_key        exact key; missing reads as 0.0, no fallthrough
//! 2. source           candidates in order; first present key wins
//! 3. built-in table   (sensor, feature) → firmware keys, see DEFAULT_RESOLVERS
//! 4. {sensor}_{feature}
//! 5. {feature}
//! 6. 0.0
//! ```
//!
//! A built-in entry owns its pair: when it matches, its own fallback chain
//! decides the value and steps 4-5 are never consulted.
//!
//! ## Built-in Table
//!
//! The table mirrors the keys the Teensy firmware exports:
//!
//! | sensor     | feature             | frame keys, in order          |
//! |------------|---------------------|-------------------------------|
//! | `mic`      | `rms`               | `mic_rms`                     |
//! | `mic`      | `spectral_centroid` | `mic_sc`, `mic_centroid`      |
//! | `mic`      | `hf_rolloff`        | `mic_hf`, `hf`, `mic_sc`      |
//! | `tof`      | `motion_energy`     | `tof_motion`                  |
//! | `tof`      | `proximity`         | `tof_near`                    |
//! | `light`    | `lux`               | `lux`                         |
//! | `light`    | `flicker_hz`        | `flicker`                     |
//! | `motion`   | `burst`             | `motion` (non-zero → 1.0)     |
//! | `climate`  | `drift`             | `climate_drift`               |
//! | `presence` | `count`             | `presence_count`, `count`     |

use crate::frame::Frame;
use crate::spec::FeatureSpec;

/// How a built-in entry reads the frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultResolver {
    /// First present key, else 0.0
    Keys(&'static [&'static str]),
    /// 1.0 when the key is present and non-zero, else 0.0
    Flag(&'static str),
}

impl DefaultResolver {
    /// Read the value from a frame
    pub fn read(&self, frame: &Frame) -> f64 {
        match self {
            Self::Keys(keys) => first_present(frame, keys.iter().copied()).unwrap_or(0.0),
            Self::Flag(key) => match frame.get(key) {
                Some(v) if v != 0.0 => 1.0,
                _ => 0.0,
            },
        }
    }
}

/// Built-in resolvers keyed by `(sensor, feature)`
pub static DEFAULT_RESOLVERS: &[((&str, &str), DefaultResolver)] = &[
    (("mic", "rms"), DefaultResolver::Keys(&["mic_rms"])),
    (("mic", "spectral_centroid"), DefaultResolver::Keys(&["mic_sc", "mic_centroid"])),
    (("mic", "hf_rolloff"), DefaultResolver::Keys(&["mic_hf", "hf", "mic_sc"])),
    (("tof", "motion_energy"), DefaultResolver::Keys(&["tof_motion"])),
    (("tof", "proximity"), DefaultResolver::Keys(&["tof_near"])),
    (("light", "lux"), DefaultResolver::Keys(&["lux"])),
    (("light", "flicker_hz"), DefaultResolver::Keys(&["flicker"])),
    (("motion", "burst"), DefaultResolver::Flag("motion")),
    (("climate", "drift"), DefaultResolver::Keys(&["climate_drift"])),
    (("presence", "count"), DefaultResolver::Keys(&["presence_count", "count"])),
];

/// Built-in resolver for a sensor/feature pair
pub fn default_resolver(sensor: &str, feature: &str) -> Option<DefaultResolver> {
    DEFAULT_RESOLVERS
        .iter()
        .find(|((s, f), _)| *s == sensor && *f == feature)
        .map(|(_, resolver)| *resolver)
}

/// Raw value of a feature in a frame
pub fn feature_value(sensor: &str, feature: &FeatureSpec, frame: &Frame) -> f64 {
    if let Some(key) = &feature.frame_key {
        return frame.get(key).unwrap_or(0.0);
    }

    if let Some(value) = first_present(frame, feature.source.iter().map(String::as_str)) {
        return value;
    }

    if let Some(resolver) = default_resolver(sensor, &feature.name) {
        return resolver.read(frame);
    }

    let compound = format!("{}_{}", sensor, feature.name);
    frame
        .get(&compound)
        .or_else(|| frame.get(&feature.name))
        .unwrap_or(0.0)
}

fn first_present<'k>(frame: &Frame, mut keys: impl Iterator<Item = &'k str>) -> Option<f64> {
    keys.find_map(|key| frame.get(key))
}
