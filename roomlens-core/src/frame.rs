//! Frames in, axes out
//!
//! A [`Frame`] is one snapshot of normalized sensor features, as exported
//! by the firmware, a demo generator or a replay file. Values are stored as
//! `f64`; the `t` timestamp is carried through untouched and never read by
//! evaluation.
//!
//! ## Coercion
//!
//! Frames usually arrive as JSON objects. Values are coerced the way a
//! permissive host would read them:
//!
//! | JSON value         | Stored as            |
//! |--------------------|----------------------|
//! | number             | that number          |
//! | `true` / `false`   | `1.0` / `0.0`        |
//! | numeric string     | the parsed number    |
//! | anything else      | dropped (key absent) |
//!
//! A dropped key behaves exactly like a missing one during resolution.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use serde_json::Value;
use thiserror_no_std::Error;

/// Key carrying the passthrough timestamp
pub const TIMESTAMP_KEY: &str = "t";

/// Axis name to value, recomputed for every frame
pub type AxisOutput = BTreeMap<String, f64>;

/// Errors reading a frame from its serialized form
#[derive(Error, Debug)]
pub enum FrameError {
    /// Not valid JSON
    #[error("Frame is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Valid JSON, but not an object
    #[error("Frame must be a JSON object")]
    NotAnObject,
}

/// One snapshot of normalized sensor features plus a timestamp
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    values: HashMap<String, f64>,
    timestamp: Option<Value>,
}

impl Frame {
    /// Empty frame with no timestamp
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: &str, value: f64) -> Self {
        self.insert(key, value);
        self
    }

    /// Builder-style timestamp
    pub fn with_timestamp(mut self, t: impl Into<Value>) -> Self {
        self.timestamp = Some(t.into());
        self
    }

    /// Insert or overwrite a feature value
    pub fn insert(&mut self, key: &str, value: f64) {
        self.values.insert(key.to_string(), value);
    }

    /// Value for `key`, if present
    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    /// Whether `key` is present
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Passthrough timestamp
    pub fn timestamp(&self) -> Option<&Value> {
        self.timestamp.as_ref()
    }

    /// Number of numeric values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the frame carries no numeric values
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over numeric values in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Build a frame from a parsed JSON object
    pub fn from_json_value(value: &Value) -> Result<Self, FrameError> {
        let object = value.as_object().ok_or(FrameError::NotAnObject)?;
        let mut frame = Frame::new();

        for (key, raw) in object {
            if key == TIMESTAMP_KEY {
                frame.timestamp = Some(raw.clone());
                continue;
            }
            match coerce(raw) {
                Some(v) => frame.insert(key, v),
                None => {
                    log_debug!("dropping non-numeric frame value {}={}", key, raw);
                }
            }
        }

        Ok(frame)
    }

    /// Parse one JSON line into a frame
    pub fn from_json_str(line: &str) -> Result<Self, FrameError> {
        let value: Value = serde_json::from_str(line)?;
        Self::from_json_value(&value)
    }
}

fn coerce(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

impl<K: AsRef<str>> FromIterator<(K, f64)> for Frame {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut frame = Frame::new();
        for (key, value) in iter {
            frame.insert(key.as_ref(), value);
        }
        frame
    }
}

/// One processed frame: the timestamp and the axis values it produced
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AxisPayload {
    /// Timestamp copied from the source frame
    pub t: Option<Value>,
    /// Axis values for this frame
    pub axes: AxisOutput,
}

impl AxisPayload {
    /// Whether the frame produced no axis values
    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }
}
