//! Transform configuration: browse flags, language, notation sorting.
//!
//! A configuration is fixed for one transform invocation. It can be built in
//! code or loaded from TOML:
//!
//! ```toml
//! primary_language = "de"
//! concept_schemes = true
//! collections = true
//! resolve_urls = false
//!
//! [notation]
//! format = "dotted"
//! default_axis = "notation"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// How notation strings are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotationFormat {
    /// Case-insensitive lexicographic.
    #[default]
    Alpha,
    /// Dot-separated integer segments, missing trailing segments count as zero.
    Dotted,
    /// Numeric magnitude.
    Float,
}

impl std::fmt::Display for NotationFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotationFormat::Alpha => write!(f, "alpha"),
            NotationFormat::Dotted => write!(f, "dotted"),
            NotationFormat::Float => write!(f, "float"),
        }
    }
}

/// Which order siblings are physically presented in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortAxis {
    #[default]
    Label,
    Notation,
}

/// Notation-based secondary sorting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotationSortConfig {
    #[serde(default)]
    pub format: NotationFormat,
    #[serde(default)]
    pub default_axis: SortAxis,
}

/// Configuration for one thesaurus-to-tree transform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformConfig {
    /// Primary vocabulary language tag (e.g. `en`).
    #[serde(default = "default_language")]
    pub primary_language: String,
    /// Consider concept schemes when building the forest.
    #[serde(default)]
    pub concept_schemes: bool,
    /// Consider collections when building the forest.
    #[serde(default)]
    pub collections: bool,
    /// Compute a normalized URL form for IRIs.
    #[serde(default)]
    pub resolve_urls: bool,
    /// Offer notation-based sorting. `None` disables it.
    #[serde(default)]
    pub notation: Option<NotationSortConfig>,
}

fn default_language() -> String {
    "en".into()
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            primary_language: default_language(),
            concept_schemes: false,
            collections: false,
            resolve_urls: false,
            notation: None,
        }
    }
}

impl TransformConfig {
    /// Classic mode: plain broader/narrower hierarchy, no schemes or collections.
    pub fn classic() -> Self {
        Self::default()
    }

    pub fn with_schemes(mut self, enabled: bool) -> Self {
        self.concept_schemes = enabled;
        self
    }

    pub fn with_collections(mut self, enabled: bool) -> Self {
        self.collections = enabled;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.primary_language = language.into();
        self
    }

    pub fn with_notation(mut self, format: NotationFormat, default_axis: SortAxis) -> Self {
        self.notation = Some(NotationSortConfig {
            format,
            default_axis,
        });
        self
    }

    /// Whether unknown-typed resources are pruned at freeze time.
    pub fn filters_by_type(&self) -> bool {
        self.concept_schemes || self.collections
    }

    /// Reject configurations that cannot drive a transform.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.primary_language.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "primary_language must not be empty".into(),
            });
        }
        Ok(())
    }

    /// Parse a configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: "(inline)".into(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Render as pretty TOML.
    pub fn to_toml_string(&self) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: "(inline)".into(),
            message: e.to_string(),
        })
    }

    /// Save to a TOML file.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = self.to_toml_string()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_classic() {
        let config = TransformConfig::default();
        assert_eq!(config.primary_language, "en");
        assert!(!config.concept_schemes);
        assert!(!config.collections);
        assert!(!config.filters_by_type());
        assert!(config.notation.is_none());
    }

    #[test]
    fn parses_full_toml() {
        let config = TransformConfig::from_toml_str(
            r#"
            primary_language = "de"
            concept_schemes = true
            collections = true

            [notation]
            format = "dotted"
            default_axis = "notation"
            "#,
        )
        .unwrap();
        assert_eq!(config.primary_language, "de");
        assert!(config.filters_by_type());
        let notation = config.notation.unwrap();
        assert_eq!(notation.format, NotationFormat::Dotted);
        assert_eq!(notation.default_axis, SortAxis::Notation);
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config = TransformConfig::from_toml_str("collections = true").unwrap();
        assert_eq!(config.primary_language, "en");
        assert!(config.collections);
        assert!(!config.concept_schemes);
    }

    #[test]
    fn rejects_bad_format_name() {
        let err = TransformConfig::from_toml_str("[notation]\nformat = \"roman\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn rejects_empty_language() {
        let err = TransformConfig::from_toml_str("primary_language = \" \"").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("transform.toml");
        let config = TransformConfig::classic()
            .with_schemes(true)
            .with_notation(NotationFormat::Float, SortAxis::Label);
        config.save(&path).unwrap();
        let loaded = TransformConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
