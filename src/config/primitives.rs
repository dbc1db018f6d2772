use super::traits::{ConfigManifest, ConfigSection, FieldManifest};
use crate::error::EvotestError;
use serde::{Deserialize, Serialize};

/// Bounds for synthesizing and mutating primitive constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrimitivesConfig {
    /// Largest step applied when a numeric constant mutates in place.
    pub max_delta: i64,
    /// Magnitude bound for freshly sampled integer constants.
    pub max_int: i64,
    /// Maximum length of generated string constants.
    pub string_length: usize,
}

impl Default for PrimitivesConfig {
    fn default() -> Self {
        Self {
            max_delta: 20,
            max_int: 2048,
            string_length: 20,
        }
    }
}

impl ConfigSection for PrimitivesConfig {
    fn section_name() -> &'static str {
        "primitives"
    }

    fn validate(&self) -> Result<(), EvotestError> {
        if self.max_delta <= 0 {
            return Err(EvotestError::Configuration(
                "Max delta must be positive".to_string(),
            ));
        }
        if self.max_int <= 0 {
            return Err(EvotestError::Configuration(
                "Max int must be positive".to_string(),
            ));
        }
        Ok(())
    }

    fn to_manifest(&self) -> ConfigManifest {
        ConfigManifest {
            section: "Primitives".to_string(),
            fields: vec![
                FieldManifest {
                    name: "max_delta".to_string(),
                    field_type: "integer".to_string(),
                    default: serde_json::json!(20),
                    min: Some(1.0),
                    max: Some(1_000_000.0),
                    description: "Largest in-place mutation step for numeric constants".to_string(),
                },
                FieldManifest {
                    name: "max_int".to_string(),
                    field_type: "integer".to_string(),
                    default: serde_json::json!(2048),
                    min: Some(1.0),
                    max: Some(1_000_000.0),
                    description: "Magnitude bound for sampled integer constants".to_string(),
                },
                FieldManifest {
                    name: "string_length".to_string(),
                    field_type: "integer".to_string(),
                    default: serde_json::json!(20),
                    min: Some(0.0),
                    max: Some(10_000.0),
                    description: "Maximum length of generated string constants".to_string(),
                },
            ],
        }
    }
}
