//! Mapping Documents for Room Lens
//!
//! ## Overview
//!
//! The mapping engine in `roomlens-core` reads a parsed JSON tree and never
//! touches the filesystem. This crate is the layer in front of it: it reads
//! mapping documents from disk or from the copies bundled into the binary,
//! and renders them back out as a human-readable table for rehearsal notes.
//!
//! ## Formats
//!
//! Mapping authors mostly write YAML; tools and tests often emit JSON. Both
//! are read into the same `serde_json::Value` tree, so declaration order and
//! defaulting behave identically:
//!
//! | extension       | format |
//! |-----------------|--------|
//! | `.json`         | JSON   |
//! | `.yaml`, `.yml` | YAML   |
//!
//! ## Bundled Mappings
//!
//! Every `mapping.<name>.yaml` under `mappings/` is compiled in and
//! registered as `<name>` by [`MappingRegistry::load_defaults`]. The
//! [`GLOBAL_REGISTRY`] has them loaded already.
//!
//! ## Usage Example
//!
//! ```rust
//! use roomlens_core::{Frame, MappingPipeline};
//! use roomlens_schemas::GLOBAL_REGISTRY;
//!
//! let spec = GLOBAL_REGISTRY.get("default")?;
//! let pipeline = MappingPipeline::new((*spec).clone())?;
//!
//! let payload = pipeline.process_frame(&Frame::new().with("mic_sc", 0.0))?;
//! assert_eq!(payload.axes["filter_cutoff_hz"], 400.0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Macros for optional logging
#[cfg(feature = "log")]
macro_rules! log_warn {
    ($($arg:tt)*) => { log::warn!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {};
}

use std::fs;
use std::path::{Path, PathBuf};

use roomlens_core::{MappingError, MappingPipeline, MappingSpec};
use serde_json::Value;

pub mod docs;
pub mod registry;

pub use docs::mapping_table_markdown;
pub use registry::{MappingRegistry, GLOBAL_REGISTRY};

/// Serialized form of a mapping document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingFormat {
    /// JSON text
    Json,
    /// YAML text
    Yaml,
}

impl MappingFormat {
    /// Format implied by a file extension
    pub fn from_path(path: &Path) -> Result<Self, SchemaError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            _ => Err(SchemaError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Errors loading or registering mapping documents
#[derive(Debug, thiserror_no_std::Error)]
pub enum SchemaError {
    #[error("Failed to read mapping {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported mapping file extension: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Mapping not found: {0}")]
    NotFound(String),

    #[error("Mapping already registered: {0}")]
    Duplicate(String),

    #[error("Registry lock poisoned")]
    Poisoned,

    #[error(transparent)]
    Mapping(#[from] MappingError),
}

/// Parse mapping text in the given format
///
/// The result is not validated; see [`MappingSpec::validate`].
pub fn parse_mapping(text: &str, format: MappingFormat) -> Result<MappingSpec, SchemaError> {
    let tree: Value = match format {
        MappingFormat::Json => {
            serde_json::from_str(text).map_err(|e| MappingError::Parse(e.to_string()))?
        }
        MappingFormat::Yaml => {
            serde_yaml::from_str(text).map_err(|e| MappingError::Parse(e.to_string()))?
        }
    };
    Ok(MappingSpec::from_value(&tree)?)
}

/// Read a mapping file, picking the format from its extension
pub fn load_mapping(path: impl AsRef<Path>) -> Result<MappingSpec, SchemaError> {
    let path = path.as_ref();
    let format = MappingFormat::from_path(path)?;
    let text = fs::read_to_string(path).map_err(|source| SchemaError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_mapping(&text, format)
}

/// Re-read a mapping file and swap it into a running pipeline
///
/// On any error the pipeline keeps its current mapping.
pub fn reload_pipeline(pipeline: &MappingPipeline, path: impl AsRef<Path>) -> Result<(), SchemaError> {
    let spec = load_mapping(path)?;
    pipeline.update_mapping(spec)?;
    Ok(())
}
