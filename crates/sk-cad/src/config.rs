//! Modeler configuration
//!
//! Stored as RON. Every field has a default, so a file only needs to name
//! the settings it changes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::kernel::TessellationParams;

/// Default tessellation settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TessellationConfig {
    pub linear_deflection: f64,
    pub angular_deflection: f64,
    pub relative: bool,
}

impl Default for TessellationConfig {
    fn default() -> Self {
        let params = TessellationParams::default();
        Self {
            linear_deflection: params.linear_deflection,
            angular_deflection: params.angular_deflection,
            relative: params.relative,
        }
    }
}

impl TessellationConfig {
    pub fn params(&self) -> TessellationParams {
        TessellationParams {
            linear_deflection: self.linear_deflection,
            angular_deflection: self.angular_deflection,
            relative: self.relative,
        }
    }
}

/// Kernel backend settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Geometric tolerance handed to boolean operations
    pub boolean_tolerance: f64,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            boolean_tolerance: 0.05,
        }
    }
}

/// Log filter used when `RUST_LOG` is unset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "sk_cad=info,sk_capi=info".into(),
        }
    }
}

/// Complete modeler configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelerConfig {
    pub tessellation: TessellationConfig,
    pub kernel: KernelConfig,
    pub logging: LoggingConfig,
}

impl ModelerConfig {
    /// Load configuration from a RON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_ron_str(&content)
    }

    /// Parse configuration from RON text
    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            ron::from_str(content).map_err(|e| ConfigError::Deserialize(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Reject settings no operation could run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tessellation
            .params()
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        let tolerance = self.kernel.boolean_tolerance;
        if !(tolerance.is_finite() && tolerance >= 1e-6) {
            return Err(ConfigError::Invalid(format!(
                "boolean tolerance must be at least 1e-6, got {}",
                tolerance
            )));
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Deserialization error: {0}")]
    Deserialize(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ModelerConfig::default();
        assert_eq!(config.tessellation.params(), TessellationParams::default());
        assert_eq!(config.kernel.boolean_tolerance, 0.05);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = ModelerConfig::from_ron_str("(kernel: (boolean_tolerance: 0.01))").unwrap();
        assert_eq!(config.kernel.boolean_tolerance, 0.01);
        assert_eq!(config.tessellation, TessellationConfig::default());
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_ron_round_trip() {
        let mut config = ModelerConfig::default();
        config.tessellation.relative = true;
        config.logging.filter = "debug".into();

        let text = config.to_ron_string().unwrap();
        assert_eq!(ModelerConfig::from_ron_str(&text).unwrap(), config);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            ModelerConfig::from_ron_str("(tessellation: (linear_deflection: 0.0))"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            ModelerConfig::from_ron_str("(kernel: (boolean_tolerance: -1.0))"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            ModelerConfig::from_ron_str("(kernel: oops)"),
            Err(ConfigError::Deserialize(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "(tessellation: (angular_deflection: 0.25))").unwrap();

        let config = ModelerConfig::load(file.path()).unwrap();
        assert_eq!(config.tessellation.angular_deflection, 0.25);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            ModelerConfig::load("/nonexistent/solidkit.ron"),
            Err(ConfigError::Io(_))
        ));
    }
}
