// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stamping configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, StampError};

/// Environment variable naming an optional JSON configuration file.
pub const CONFIG_ENV_VAR: &str = "PDFSTAMP_CONFIG";

/// Where the stamp is layered relative to the existing page content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StampLayer {
    /// Drawn first, beneath the page's own content.
    Under,
    /// Drawn last, on top of the page's own content.
    #[default]
    Over,
}

/// Render-state values every page starts from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderDefaults {
    pub font_size: f32,
    pub leading: f32,
    pub character_spacing: f32,
    pub word_spacing: f32,
    pub text_rise: f32,
    pub rendering_mode: i64,
    pub horizontal_scaling: f32,
    /// Color spec, same syntax as the `fill-color` command.
    pub fill_color: String,
    pub stroke_color: String,
    pub line_width: f32,
}

impl Default for RenderDefaults {
    fn default() -> Self {
        Self {
            font_size: 9.0,
            leading: 11.0,
            character_spacing: 0.0,
            word_spacing: 0.0,
            text_rise: 0.0,
            rendering_mode: 0,
            horizontal_scaling: 100.0,
            fill_color: "black".into(),
            stroke_color: "black".into(),
            line_width: 1.0,
        }
    }
}

/// Settings for a stamping run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StampConfig {
    /// Initial render state of every page.
    pub defaults: RenderDefaults,
    /// Font used when no `font-file` command applies. `None` selects the
    /// built-in Helvetica.
    pub default_font: Option<PathBuf>,
    /// Stacking of the stamp relative to existing content.
    pub layer: StampLayer,
}

impl StampConfig {
    /// Read a configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|err| {
            StampError::Config(format!("cannot read {}: {}", path.display(), err))
        })?;
        let config: Self = serde_json::from_str(&data)?;
        debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Load the file named by [`CONFIG_ENV_VAR`], or the defaults if unset.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) if !path.is_empty() => {
                info!(path = ?path, "using configuration from environment");
                Self::from_file(Path::new(&path))
            }
            _ => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_stamp_conventions() {
        let config = StampConfig::default();
        assert_eq!(config.defaults.font_size, 9.0);
        assert_eq!(config.defaults.leading, 11.0);
        assert_eq!(config.defaults.horizontal_scaling, 100.0);
        assert_eq!(config.layer, StampLayer::Over);
        assert!(config.default_font.is_none());
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{"layer": "under", "defaults": {{"font_size": 12.5}}}}"#).expect("write");

        let config = StampConfig::from_file(file.path()).expect("load");
        assert_eq!(config.layer, StampLayer::Under);
        assert_eq!(config.defaults.font_size, 12.5);
        assert_eq!(config.defaults.leading, 11.0);
        assert_eq!(config.defaults.fill_color, "black");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{"colour": "red"}}"#).expect("write");

        let err = StampConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, StampError::Serialization(_)));
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = StampConfig::from_file(Path::new("/nonexistent/pdfstamp.json")).unwrap_err();
        assert!(matches!(err, StampError::Config(_)));
    }
}
