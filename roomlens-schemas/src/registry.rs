//! Mapping Registry
//!
//! Named, validated mappings shared across the process. Bundled documents
//! are embedded at compile time so a host can start with a working mapping
//! even when the config directory is missing.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

use include_dir::{include_dir, Dir};
use roomlens_core::MappingSpec;

use crate::{parse_mapping, MappingFormat, SchemaError};

static BUNDLED: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/mappings");

/// Thread-safe registry of validated mappings
pub struct MappingRegistry {
    mappings: RwLock<HashMap<String, Arc<MappingSpec>>>,
}

impl MappingRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            mappings: RwLock::new(HashMap::new()),
        }
    }

    /// Validate and register a mapping under `name`
    pub fn register(&self, name: &str, spec: MappingSpec) -> Result<(), SchemaError> {
        spec.validate()?;

        let mut mappings = self.mappings.write().map_err(|_| SchemaError::Poisoned)?;
        if mappings.contains_key(name) {
            return Err(SchemaError::Duplicate(name.to_string()));
        }
        mappings.insert(name.to_string(), Arc::new(spec));
        Ok(())
    }

    /// Parse, validate and register mapping text
    pub fn register_text(
        &self,
        name: &str,
        text: &str,
        format: MappingFormat,
    ) -> Result<(), SchemaError> {
        self.register(name, parse_mapping(text, format)?)
    }

    /// Get a mapping by name
    pub fn get(&self, name: &str) -> Result<Arc<MappingSpec>, SchemaError> {
        let mappings = self.mappings.read().map_err(|_| SchemaError::Poisoned)?;
        mappings
            .get(name)
            .cloned()
            .ok_or_else(|| SchemaError::NotFound(name.to_string()))
    }

    /// Registered names, sorted
    pub fn names(&self) -> Result<Vec<String>, SchemaError> {
        let mappings = self.mappings.read().map_err(|_| SchemaError::Poisoned)?;
        let mut names: Vec<String> = mappings.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    /// Register every bundled mapping document
    pub fn load_defaults(&self) -> Result<(), SchemaError> {
        self.load_dir(&BUNDLED)
    }

    /// Register every `mapping.<name>.*` document in an embedded directory
    pub fn load_dir(&self, dir: &Dir<'_>) -> Result<(), SchemaError> {
        for file in dir.files() {
            let Some(name) = bundled_name(file.path()) else {
                continue;
            };
            let format = MappingFormat::from_path(file.path())?;
            let text = file
                .contents_utf8()
                .ok_or_else(|| SchemaError::NotFound(file.path().display().to_string()))?;
            self.register_text(name, text, format)?;
        }
        Ok(())
    }
}

impl Default for MappingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// `mapping.default.yaml` → `default`
fn bundled_name(path: &Path) -> Option<&str> {
    let stem = path.file_stem()?.to_str()?;
    stem.strip_prefix("mapping.")
}

/// Registry loaded from `dir`; a failing document is logged and skipped
/// along with everything after it
fn registry_from(dir: &Dir<'_>) -> MappingRegistry {
    let registry = MappingRegistry::new();
    if let Err(_err) = registry.load_dir(dir) {
        log_warn!("bundled mappings only partially loaded: {}", _err);
    }
    registry
}

lazy_static::lazy_static! {
    /// Global mapping registry with the bundled mappings loaded
    pub static ref GLOBAL_REGISTRY: MappingRegistry = registry_from(&BUNDLED);
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = r#"{"sensors": {"mic": {"enabled": true, "features": {
        "rms": {"map_to": {"axis": "demo"}}
    }}}}"#;

    #[test]
    fn register_and_retrieve() {
        let registry = MappingRegistry::new();
        registry.register_text("small", SMALL, MappingFormat::Json).unwrap();

        let spec = registry.get("small").unwrap();
        assert!(spec.sensor("mic").is_some());
        assert_eq!(registry.names().unwrap(), vec!["small".to_string()]);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let registry = MappingRegistry::new();
        registry.register_text("small", SMALL, MappingFormat::Json).unwrap();
        assert!(matches!(
            registry.register_text("small", SMALL, MappingFormat::Json),
            Err(SchemaError::Duplicate(_))
        ));
    }

    #[test]
    fn invalid_mappings_are_not_registered() {
        let registry = MappingRegistry::new();
        let err = registry
            .register_text("broken", r#"{"sensors": {"mic": {"features": {"rms": {}}}}}"#, MappingFormat::Json)
            .unwrap_err();
        assert!(matches!(err, SchemaError::Mapping(_)));
        assert!(matches!(registry.get("broken"), Err(SchemaError::NotFound(_))));
    }

    #[test]
    fn bundled_names() {
        assert_eq!(bundled_name(Path::new("mapping.default.yaml")), Some("default"));
        assert_eq!(bundled_name(Path::new("README.md")), None);
    }

    static BROKEN: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/tests/fixtures/broken");

    #[test]
    fn broken_bundle_reports_error() {
        let registry = MappingRegistry::new();
        let err = registry.load_dir(&BROKEN).unwrap_err();
        assert!(matches!(err, SchemaError::Mapping(_)));
        assert!(registry.names().unwrap().is_empty());
    }

    #[test]
    fn broken_bundle_still_yields_a_registry() {
        let registry = registry_from(&BROKEN);
        assert!(matches!(registry.get("broken"), Err(SchemaError::NotFound(_))));
        assert!(registry_from(&BUNDLED).get("default").is_ok());
    }

    #[test]
    fn defaults_load() {
        let registry = MappingRegistry::new();
        registry.load_defaults().unwrap();
        assert!(registry.names().unwrap().contains(&"default".to_string()));
        assert!(GLOBAL_REGISTRY.get("default").is_ok());
    }
}
