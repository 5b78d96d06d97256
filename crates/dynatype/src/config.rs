// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type system configuration.
//!
//! Supports both programmatic and file-based configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub(crate) const DEFAULT_ESCAPE_MARKER: &str = "@";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Names and conventions the engine bootstraps with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeSystemConfig {
    /// Root of every inheritance chain.
    #[serde(default = "default_root_type")]
    pub root_type: String,

    /// Marker type carrying the composable/entity capability.
    #[serde(default = "default_entity_type")]
    pub entity_type: String,

    /// First name segment that also mirrors a type into the global namespace.
    #[serde(default = "default_global_prefix")]
    pub global_prefix: String,

    /// Prefix of the per-receiver slot behind stored accessors.
    #[serde(default = "default_backing_prefix")]
    pub backing_field_prefix: String,

    /// Leading marker that keeps a type name as a plain literal.
    #[serde(default = "default_escape_marker")]
    pub escape_marker: String,

    /// Open type injection defaults.
    #[serde(default)]
    pub open_type: OpenTypeConfig,
}

/// Defaults for the member injected into open types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenTypeConfig {
    #[serde(default = "default_open_type_property")]
    pub property_name: String,

    #[serde(default = "default_open_type_type")]
    pub default_type: String,
}

fn default_root_type() -> String {
    "$data.Base".to_string()
}

fn default_entity_type() -> String {
    "$data.Entity".to_string()
}

fn default_global_prefix() -> String {
    "$data".to_string()
}

fn default_backing_prefix() -> String {
    "_".to_string()
}

fn default_escape_marker() -> String {
    DEFAULT_ESCAPE_MARKER.to_string()
}

fn default_open_type_property() -> String {
    "dynamicProperties".to_string()
}

fn default_open_type_type() -> String {
    "$data.Object".to_string()
}

impl Default for OpenTypeConfig {
    fn default() -> Self {
        Self {
            property_name: default_open_type_property(),
            default_type: default_open_type_type(),
        }
    }
}

impl Default for TypeSystemConfig {
    fn default() -> Self {
        Self {
            root_type: default_root_type(),
            entity_type: default_entity_type(),
            global_prefix: default_global_prefix(),
            backing_field_prefix: default_backing_prefix(),
            escape_marker: default_escape_marker(),
            open_type: OpenTypeConfig::default(),
        }
    }
}

impl TypeSystemConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("root_type", &self.root_type),
            ("entity_type", &self.entity_type),
            ("escape_marker", &self.escape_marker),
            ("open_type.property_name", &self.open_type.property_name),
            ("open_type.default_type", &self.open_type.default_type),
        ];
        for (field, value) in required {
            if value.is_empty() {
                return Err(ConfigError::Invalid(format!("{} must not be empty", field)));
            }
        }

        if self.root_type == self.entity_type {
            return Err(ConfigError::Invalid(format!(
                "root and entity types must differ ({})",
                self.root_type
            )));
        }

        if self.escape_marker.contains('.') {
            return Err(ConfigError::Invalid(format!(
                "escape marker '{}' must not contain a namespace separator",
                self.escape_marker
            )));
        }

        Ok(())
    }
}
