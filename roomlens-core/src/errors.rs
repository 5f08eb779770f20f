//! Error Types for Mapping Configuration Failures
//!
//! ## Design Philosophy
//!
//! Room Lens is strict about configuration and permissive about data:
//!
//! 1. **Configuration errors are fatal**: A malformed mapping document, a
//!    feature without a destination axis, or a transform that cannot be
//!    built stops the load. Nothing substitutes a default to hide an
//!    authoring mistake.
//!
//! 2. **Data errors never reach this module**: Missing frame keys read as
//!    0.0 and malformed ranges fall back to `[0, 1]`. A live sensor stream
//!    may legitimately drop fields mid-show.
//!
//! 3. **Complete reports**: Validation collects every offending
//!    `sensor.feature` pair before failing, so an author fixes the whole
//!    document in one pass.
//!
//! ## Error Categories
//!
//! ### Document
//! - `Parse`: The document is not a mapping-of-mappings of the right shape
//! - `Validation`: One or more features lack `map_to.axis`
//!
//! ### Transforms
//! - `TransformSyntax`: The transform string is not a literal call
//! - `UnknownTransform`: The name is not in the curve registry
//! - `TransformConstruction`: The curve rejected its arguments
//!
//! ## Error Handling Strategy
//!
//! ```rust
//! use roomlens_core::{MappingError, MappingSpec};
//!
//! fn load(text: &str) -> Option<MappingSpec> {
//!     let spec = MappingSpec::from_json_str(text).ok()?;
//!     match spec.validate() {
//!         Ok(()) => Some(spec),
//!         Err(MappingError::Validation { missing }) => {
//!             // Every feature needing an axis, sorted
//!             eprintln!("fix these: {}", missing.join(", "));
//!             None
//!         }
//!         Err(_) => None,
//!     }
//! }
//! # assert!(load(r#"{"sensors": {}}"#).is_some());
//! ```

use thiserror_no_std::Error;

/// Result type for mapping operations
pub type MappingResult<T> = Result<T, MappingError>;

/// Mapping configuration errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MappingError {
    /// Mapping document has the wrong shape
    #[error("Failed to parse mapping: {0}")]
    Parse(String),

    /// Features without a destination axis, sorted by sensor then feature
    #[error("Mapping entries missing map_to.axis: {}", .missing.join(", "))]
    Validation {
        /// Offending `sensor.feature` pairs
        missing: Vec<String>,
    },

    /// Transform string is not a literal call expression
    #[error("Invalid transform spec '{spec}'{}: {reason}", for_feature(.feature))]
    TransformSyntax {
        /// The transform string as written in the mapping
        spec: String,
        /// What the parser tripped over
        reason: String,
        /// The `sensor.feature` that asked for it, when known
        feature: Option<String>,
    },

    /// Transform name is not registered
    #[error("Unknown transform '{name}' for feature {feature}")]
    UnknownTransform {
        /// Name as written in the mapping
        name: String,
        /// The `sensor.feature` that asked for it
        feature: String,
    },

    /// Registered transform rejected its arguments
    #[error("Transform '{name}' for feature {feature} rejected its arguments: {source}")]
    TransformConstruction {
        /// Transform name
        name: String,
        /// The `sensor.feature` that asked for it
        feature: String,
        /// Underlying argument problem
        #[source]
        source: ArgumentError,
    },
}

/// Why a curve factory refused its arguments
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArgumentError {
    /// More positional arguments than parameters
    #[error("takes at most {max} positional arguments, got {given}")]
    TooManyPositional {
        /// Number of parameters the curve accepts
        max: usize,
        /// Number of positional arguments supplied
        given: usize,
    },

    /// Keyword the curve does not accept
    #[error("unexpected keyword argument '{0}'")]
    UnexpectedKeyword(String),

    /// Parameter bound both positionally and by keyword, or twice by keyword
    #[error("got multiple values for argument '{0}'")]
    Duplicate(String),

    /// Literal of the wrong kind
    #[error("argument '{param}' must be {expected}")]
    WrongType {
        /// Parameter name
        param: &'static str,
        /// What the parameter accepts
        expected: &'static str,
    },

    /// Literal of the right kind but outside the curve's domain
    #[error("argument '{param}' {reason}")]
    OutOfDomain {
        /// Parameter name
        param: &'static str,
        /// Constraint that was violated
        reason: &'static str,
    },
}

fn for_feature(feature: &Option<String>) -> String {
    match feature {
        Some(feature) => format!(" for feature {}", feature),
        None => String::new(),
    }
}

impl MappingError {
    /// Whether the error came from transform resolution rather than the document
    pub fn is_transform_error(&self) -> bool {
        matches!(
            self,
            Self::TransformSyntax { .. }
                | Self::UnknownTransform { .. }
                | Self::TransformConstruction { .. }
        )
    }
}
