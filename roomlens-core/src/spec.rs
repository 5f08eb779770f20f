//! Typed Mapping Specification
//!
//! ## Overview
//!
//! A mapping document declares, per sensor, which features to read and
//! where each one lands on the synth:
//!
//! ```yaml
//! sensors:
//!   mic:
//!     enabled: true
//!     features:
//!       rms:
//!         transform: log10_clamp(floor_db=-50)
//!         map_to: { axis: grain_density, range: [0.1, 0.9] }
//!       spectral_centroid:
//!         source: mic_sc|mic_centroid
//!         map_to: { axis: filter_cutoff_hz, range: [400, 8000] }
//! axes:
//!   grain_density: { label: Grain density, unit: grains/s }
//! ```
//!
//! The document is read once into [`MappingSpec`], with every default
//! resolved at load time. Evaluation never goes back to the raw tree.
//!
//! ## Shape Rules
//!
//! Structural problems are [`MappingError::Parse`]:
//! - The root must be a mapping with a `sensors` mapping
//! - Each sensor and feature entry must be a mapping (or empty)
//! - `enabled` must be a boolean; `frame_key`, `transform` and `axis` strings
//!   (YAML 1.1 spellings such as `yes`, `off` or `True` count as booleans,
//!   since older mappings were written against a 1.1 loader)
//! - `source` must be a `|`-separated string or a list of strings
//!
//! Softer problems are tolerated:
//! - A malformed `range` falls back to `[0, 1]` with a warning
//! - Empty strings count as unset
//!
//! ## Declaration Order
//!
//! Sensors and features keep the order they were written in. Evaluation
//! follows that order, so when two features write the same axis the later
//! one wins. [`MappingSpec::axis_conflicts`] lists those collisions.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::errors::{MappingError, MappingResult};

/// Sensor enabled when the document does not say otherwise
pub const DEFAULT_ENABLED_SENSOR: &str = "motion";

/// Validated mapping configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappingSpec {
    /// Sensor blocks in declaration order
    pub sensors: Vec<SensorBlock>,
    /// Axis documentation in declaration order
    pub axes: Vec<AxisDoc>,
}

/// One sensor and its feature declarations
#[derive(Debug, Clone, PartialEq)]
pub struct SensorBlock {
    /// Sensor name (`mic`, `tof`, `light`, ...)
    pub name: String,
    /// Whether the sensor contributes to the output
    pub enabled: bool,
    /// Features in declaration order
    pub features: Vec<FeatureSpec>,
}

/// How one feature is read, shaped and placed
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSpec {
    /// Feature name (`rms`, `proximity`, ...)
    pub name: String,
    /// Exact frame key override
    pub frame_key: Option<String>,
    /// Candidate frame keys, first present wins
    pub source: Vec<String>,
    /// Transform call, identity when absent
    pub transform: Option<String>,
    /// Destination axis
    pub axis: Option<String>,
    /// Output interpolation bounds
    pub range: OutputRange,
    /// Free-form notes for the mapping table
    pub notes: Option<String>,
}

/// Output interpolation bounds `[lo, hi]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputRange {
    /// Value at t = 0
    pub lo: f64,
    /// Value at t = 1
    pub hi: f64,
}

impl Default for OutputRange {
    fn default() -> Self {
        Self { lo: 0.0, hi: 1.0 }
    }
}

impl OutputRange {
    /// Create a range; `lo > hi` is allowed and inverts the mapping
    pub fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }
}

/// Documentation for one axis; not used by evaluation
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AxisDoc {
    /// Axis name
    #[serde(skip)]
    pub name: String,
    /// Human label
    #[serde(default)]
    pub label: Option<String>,
    /// Unit of the axis value
    #[serde(default)]
    pub unit: Option<String>,
    /// Longer description
    #[serde(default)]
    pub description: Option<String>,
}

/// An axis written by more than one enabled feature
#[derive(Debug, Clone, PartialEq)]
pub struct AxisConflict {
    /// Axis name
    pub axis: String,
    /// `sensor.feature` writers in evaluation order; the last one wins
    pub writers: Vec<String>,
}

impl MappingSpec {
    /// Parse a mapping document from JSON text
    pub fn from_json_str(text: &str) -> MappingResult<Self> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| MappingError::Parse(e.to_string()))?;
        Self::from_value(&value)
    }

    /// Read a mapping document from a parsed tree
    pub fn from_value(root: &Value) -> MappingResult<Self> {
        let root = root
            .as_object()
            .ok_or_else(|| parse_err("mapping document must be a mapping"))?;

        let sensors = match root.get("sensors") {
            Some(Value::Object(sensors)) => sensors,
            Some(_) => return Err(parse_err("'sensors' must be a mapping")),
            None => return Err(parse_err("missing top-level 'sensors'")),
        };

        let sensors = sensors
            .iter()
            .map(|(name, cfg)| parse_sensor(name, cfg))
            .collect::<MappingResult<Vec<_>>>()?;

        let axes = match root.get("axes") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Object(axes)) => parse_axes(axes)?,
            Some(_) => return Err(parse_err("'axes' must be a mapping")),
        };

        Ok(Self { sensors, axes })
    }

    /// Check that every declared feature has a destination axis
    ///
    /// Runs over every sensor regardless of `enabled`. On failure the error
    /// lists every offending `sensor.feature`, sorted.
    pub fn validate(&self) -> MappingResult<()> {
        let mut missing: Vec<String> = self
            .sensors
            .iter()
            .flat_map(|sensor| {
                sensor
                    .features
                    .iter()
                    .filter(|feature| feature.axis.is_none())
                    .map(move |feature| qualified_name(&sensor.name, &feature.name))
            })
            .collect();

        if missing.is_empty() {
            return Ok(());
        }

        missing.sort();
        Err(MappingError::Validation { missing })
    }

    /// Sensor block by name
    pub fn sensor(&self, name: &str) -> Option<&SensorBlock> {
        self.sensors.iter().find(|s| s.name == name)
    }

    /// Documentation for an axis
    pub fn axis_doc(&self, name: &str) -> Option<&AxisDoc> {
        self.axes.iter().find(|a| a.name == name)
    }

    /// Enabled sensor blocks in evaluation order
    pub fn enabled_sensors(&self) -> impl Iterator<Item = &SensorBlock> {
        self.sensors.iter().filter(|s| s.enabled)
    }

    /// Axes written by more than one enabled feature
    pub fn axis_conflicts(&self) -> Vec<AxisConflict> {
        let mut conflicts: Vec<AxisConflict> = Vec::new();

        for sensor in self.enabled_sensors() {
            for feature in &sensor.features {
                let Some(axis) = feature.axis.as_deref() else {
                    continue;
                };
                let writer = qualified_name(&sensor.name, &feature.name);
                match conflicts.iter_mut().find(|c| c.axis == axis) {
                    Some(entry) => entry.writers.push(writer),
                    None => conflicts.push(AxisConflict {
                        axis: axis.to_string(),
                        writers: vec![writer],
                    }),
                }
            }
        }

        conflicts.retain(|c| c.writers.len() > 1);
        conflicts
    }
}

impl SensorBlock {
    /// Feature by name
    pub fn feature(&self, name: &str) -> Option<&FeatureSpec> {
        self.features.iter().find(|f| f.name == name)
    }
}

impl FeatureSpec {
    /// Feature with nothing but a destination axis
    pub fn new(name: &str, axis: &str) -> Self {
        Self {
            name: name.to_string(),
            frame_key: None,
            source: Vec::new(),
            transform: None,
            axis: Some(axis.to_string()),
            range: OutputRange::default(),
            notes: None,
        }
    }
}

/// `sensor.feature`, as used in error messages and conflict reports
pub fn qualified_name(sensor: &str, feature: &str) -> String {
    format!("{}.{}", sensor, feature)
}

/// Split a `|`-separated candidate list
pub fn split_source(source: &str) -> Vec<String> {
    source
        .split('|')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_err(msg: impl Into<String>) -> MappingError {
    MappingError::Parse(msg.into())
}

fn parse_sensor(name: &str, cfg: &Value) -> MappingResult<SensorBlock> {
    let empty = Map::new();
    let cfg = match cfg {
        Value::Object(cfg) => cfg,
        Value::Null => &empty,
        _ => return Err(parse_err(format!("sensor '{}' must be a mapping", name))),
    };

    let enabled = match cfg.get("enabled") {
        None | Some(Value::Null) => name == DEFAULT_ENABLED_SENSOR,
        Some(Value::Bool(b)) => *b,
        Some(other) => match other.as_str().and_then(yaml11_bool) {
            Some(b) => b,
            None => {
                return Err(parse_err(format!(
                    "sensor '{}': 'enabled' must be a boolean",
                    name
                )))
            }
        },
    };

    let features = match cfg.get("features") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Object(features)) => features
            .iter()
            .map(|(feature, fcfg)| parse_feature(name, feature, fcfg))
            .collect::<MappingResult<Vec<_>>>()?,
        Some(_) => {
            return Err(parse_err(format!(
                "sensor '{}': 'features' must be a mapping",
                name
            )))
        }
    };

    Ok(SensorBlock {
        name: name.to_string(),
        enabled,
        features,
    })
}

/// Booleans as a YAML 1.1 loader reads them
fn yaml11_bool(text: &str) -> Option<bool> {
    match text {
        "y" | "Y" | "yes" | "Yes" | "YES" | "true" | "True" | "TRUE" | "on" | "On" | "ON" => {
            Some(true)
        }
        "n" | "N" | "no" | "No" | "NO" | "false" | "False" | "FALSE" | "off" | "Off" | "OFF" => {
            Some(false)
        }
        _ => None,
    }
}

fn parse_feature(sensor: &str, name: &str, cfg: &Value) -> MappingResult<FeatureSpec> {
    let qualified = qualified_name(sensor, name);
    let empty = Map::new();
    let cfg = match cfg {
        Value::Object(cfg) => cfg,
        Value::Null => &empty,
        _ => return Err(parse_err(format!("feature {} must be a mapping", qualified))),
    };

    let frame_key = optional_string(cfg, "frame_key", &qualified)?;
    let transform = optional_string(cfg, "transform", &qualified)?;
    let notes = optional_string(cfg, "notes", &qualified)?;

    let source = match cfg.get("source") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::String(s)) => split_source(s),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    parse_err(format!("feature {}: 'source' entries must be strings", qualified))
                })
            })
            .collect::<MappingResult<Vec<_>>>()?,
        Some(_) => {
            return Err(parse_err(format!(
                "feature {}: 'source' must be a string or a list of strings",
                qualified
            )))
        }
    };

    let (axis, range) = match cfg.get("map_to") {
        None | Some(Value::Null) => (None, OutputRange::default()),
        Some(Value::Object(map_to)) => (
            optional_string(map_to, "axis", &qualified)?,
            parse_range(map_to.get("range"), &qualified),
        ),
        Some(_) => {
            return Err(parse_err(format!(
                "feature {}: 'map_to' must be a mapping",
                qualified
            )))
        }
    };

    Ok(FeatureSpec {
        name: name.to_string(),
        frame_key,
        source,
        transform,
        axis,
        range,
        notes,
    })
}

fn optional_string(
    cfg: &Map<String, Value>,
    key: &str,
    qualified: &str,
) -> MappingResult<Option<String>> {
    match cfg.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
        Some(_) => Err(parse_err(format!(
            "feature {}: '{}' must be a string",
            qualified, key
        ))),
    }
}

fn parse_range(value: Option<&Value>, qualified: &str) -> OutputRange {
    let Some(value) = value else {
        return OutputRange::default();
    };

    if let Some([lo, hi]) = value.as_array().map(Vec::as_slice) {
        if let (Some(lo), Some(hi)) = (lo.as_f64(), hi.as_f64()) {
            return OutputRange::new(lo, hi);
        }
    }

    log_warn!(
        "feature {}: malformed map_to.range {}, using [0, 1]",
        qualified,
        value
    );
    OutputRange::default()
}

fn parse_axes(axes: &Map<String, Value>) -> MappingResult<Vec<AxisDoc>> {
    axes.iter()
        .map(|(name, doc)| {
            let mut doc: AxisDoc = match doc {
                Value::Null => AxisDoc::default(),
                other => serde_json::from_value(other.clone())
                    .map_err(|e| parse_err(format!("axis '{}': {}", name, e)))?,
            };
            doc.name = name.clone();
            Ok(doc)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec(value: Value) -> MappingSpec {
        MappingSpec::from_value(&value).unwrap()
    }

    #[test]
    fn resolves_defaults_at_load() {
        let spec = spec(json!({
            "sensors": {
                "mic": {"features": {"rms": {"map_to": {"axis": "grain_density"}}}},
                "motion": {"features": {"burst": {"map_to": {"axis": "env_attack_ms", "range": [30, 5]}}}}
            }
        }));

        let mic = spec.sensor("mic").unwrap();
        assert!(!mic.enabled);
        let rms = mic.feature("rms").unwrap();
        assert_eq!(rms.range, OutputRange::new(0.0, 1.0));
        assert!(rms.transform.is_none());
        assert!(rms.source.is_empty());

        let motion = spec.sensor("motion").unwrap();
        assert!(motion.enabled);
        assert_eq!(motion.feature("burst").unwrap().range, OutputRange::new(30.0, 5.0));
    }

    #[test]
    fn accepts_yaml11_booleans_for_enabled() {
        let spec = spec(json!({
            "sensors": {
                "mic": {"enabled": "yes"},
                "tof": {"enabled": "off"},
                "light": {"enabled": "ON"},
                "motion": {"enabled": "No"}
            }
        }));
        assert!(spec.sensor("mic").unwrap().enabled);
        assert!(!spec.sensor("tof").unwrap().enabled);
        assert!(spec.sensor("light").unwrap().enabled);
        assert!(!spec.sensor("motion").unwrap().enabled);
    }

    #[test]
    fn keeps_declaration_order() {
        let spec = MappingSpec::from_json_str(
            r#"{"sensors": {"tof": {}, "mic": {}, "light": {"features": {"lux": {}, "flicker_hz": {}}}}}"#,
        )
        .unwrap();
        let names: Vec<_> = spec.sensors.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["tof", "mic", "light"]);
        let features: Vec<_> = spec.sensors[2].features.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(features, ["lux", "flicker_hz"]);
    }

    #[test]
    fn splits_source_strings() {
        let spec = spec(json!({
            "sensors": {"mic": {"features": {
                "a": {"source": "primary| fallback ||last", "map_to": {"axis": "x"}},
                "b": {"source": ["one", "two"], "map_to": {"axis": "y"}}
            }}}
        }));
        let mic = spec.sensor("mic").unwrap();
        assert_eq!(mic.feature("a").unwrap().source, ["primary", "fallback", "last"]);
        assert_eq!(mic.feature("b").unwrap().source, ["one", "two"]);
    }

    #[test]
    fn malformed_range_falls_back() {
        let spec = spec(json!({
            "sensors": {"mic": {"features": {
                "a": {"map_to": {"axis": "x", "range": [1, 2, 3]}},
                "b": {"map_to": {"axis": "y", "range": "wide"}},
                "c": {"map_to": {"axis": "z", "range": [0, "high"]}}
            }}}
        }));
        for feature in &spec.sensors[0].features {
            assert_eq!(feature.range, OutputRange::default());
        }
    }

    #[test]
    fn rejects_bad_shapes() {
        let bad = [
            json!([1, 2]),
            json!({}),
            json!({"sensors": [1]}),
            json!({"sensors": {"mic": 3}}),
            json!({"sensors": {"mic": {"enabled": "sometimes"}}}),
            json!({"sensors": {"mic": {"enabled": 1}}}),
            json!({"sensors": {"mic": {"features": []}}}),
            json!({"sensors": {"mic": {"features": {"rms": {"source": 4}}}}}),
            json!({"sensors": {"mic": {"features": {"rms": {"map_to": {"axis": 7}}}}}}),
            json!({"sensors": {"mic": {"features": {"rms": {"transform": ["log10_clamp"]}}}}}),
            json!({"sensors": {}, "axes": "none"}),
        ];
        for doc in bad {
            assert!(
                matches!(MappingSpec::from_value(&doc), Err(MappingError::Parse(_))),
                "expected parse error for {}",
                doc
            );
        }
    }

    #[test]
    fn validation_reports_every_missing_axis_sorted() {
        let spec = spec(json!({
            "sensors": {
                "tof": {"enabled": false, "features": {"proximity": {}, "motion_energy": {"map_to": {"axis": "fm_index"}}}},
                "mic": {"enabled": true, "features": {"rms": {"map_to": {"axis": ""}}, "hf_rolloff": null}}
            }
        }));

        match spec.validate() {
            Err(MappingError::Validation { missing }) => {
                assert_eq!(missing, ["mic.hf_rolloff", "mic.rms", "tof.proximity"]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn validation_passes_complete_mapping() {
        let spec = spec(json!({
            "sensors": {"mic": {"features": {"rms": {"map_to": {"axis": "demo"}}}}}
        }));
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn reads_axis_docs() {
        let spec = spec(json!({
            "sensors": {},
            "axes": {
                "filter_cutoff_hz": {"label": "Filter cutoff", "unit": "Hz"},
                "reverb_mix": null
            }
        }));
        let cutoff = spec.axis_doc("filter_cutoff_hz").unwrap();
        assert_eq!(cutoff.unit.as_deref(), Some("Hz"));
        assert!(cutoff.description.is_none());
        assert_eq!(spec.axes[1].name, "reverb_mix");
    }

    #[test]
    fn reports_axis_conflicts_for_enabled_sensors() {
        let spec = spec(json!({
            "sensors": {
                "mic": {"enabled": true, "features": {
                    "rms": {"map_to": {"axis": "drive"}},
                    "spectral_centroid": {"map_to": {"axis": "cutoff"}}
                }},
                "light": {"enabled": true, "features": {"lux": {"map_to": {"axis": "drive"}}}},
                "tof": {"enabled": false, "features": {"proximity": {"map_to": {"axis": "cutoff"}}}}
            }
        }));

        let conflicts = spec.axis_conflicts();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].axis, "drive");
        assert_eq!(conflicts[0].writers, ["mic.rms", "light.lux"]);
    }
}
