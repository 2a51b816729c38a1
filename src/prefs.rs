//! Persisted user preferences.
//!
//! A small JSON object stored at `<config dir>/boardprint/preferences.json`:
//!
//! ```json
//! {
//!   "accessibility-settings": { "uppercase": false, "highContrast": true, "fontSize": "large" },
//!   "theme": "dark"
//! }
//! ```
//!
//! Unknown keys are ignored and missing ones take their defaults, so older
//! and newer files both load.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::PrefsError;
use crate::log::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AccessibilitySettings {
    pub uppercase: bool,
    pub high_contrast: bool,
    /// CSS-style size: a keyword (`small`, `medium`, `large`, `x-large`) or
    /// a length such as `18px` or `12pt`.
    pub font_size: String,
}

impl Default for AccessibilitySettings {
    fn default() -> Self {
        AccessibilitySettings {
            uppercase: false,
            high_contrast: false,
            font_size: "medium".to_string(),
        }
    }
}

impl AccessibilitySettings {
    /// Caption size in points, or `None` if `font_size` is not understood.
    pub fn caption_font_pt(&self) -> Option<f64> {
        let size = self.font_size.trim().to_ascii_lowercase();
        let pt = match size.as_str() {
            "small" => 8.0,
            "medium" | "normal" => 10.0,
            "large" => 12.0,
            "x-large" => 14.0,
            "xx-large" => 16.0,
            other => {
                if let Some(px) = other.strip_suffix("px") {
                    px.trim().parse::<f64>().ok()? * 0.75
                } else if let Some(pt) = other.strip_suffix("pt") {
                    pt.trim().parse::<f64>().ok()?
                } else {
                    return None;
                }
            }
        };
        (pt.is_finite() && pt > 0.0).then_some(pt)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    #[serde(rename = "accessibility-settings")]
    pub accessibility: AccessibilitySettings,
    pub theme: Theme,
}

/// Default preferences file location.
pub fn preferences_path() -> Result<PathBuf, PrefsError> {
    dirs::config_dir()
        .map(|dir| dir.join("boardprint").join("preferences.json"))
        .ok_or(PrefsError::NoConfigDir)
}

/// Reads and writes one preferences file.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    /// The store at the platform default location.
    pub fn open_default() -> Result<Self, PrefsError> {
        preferences_path().map(Self::at)
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        PreferenceStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load preferences. A missing or empty file gives the defaults.
    pub fn load(&self) -> Result<Preferences, PrefsError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no preferences file, using defaults");
                return Ok(Preferences::default());
            }
            Err(source) => {
                return Err(PrefsError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        if contents.trim().is_empty() {
            return Ok(Preferences::default());
        }
        serde_json::from_str(&contents).map_err(|source| PrefsError::Json {
            path: self.path.clone(),
            source,
        })
    }

    /// Save preferences, creating the parent directory if needed. The file
    /// is replaced atomically.
    pub fn save(&self, prefs: &Preferences) -> Result<(), PrefsError> {
        let io_err = |source| PrefsError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(prefs).map_err(|source| PrefsError::Json {
            path: self.path.clone(),
            source,
        })?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)?;
        debug!(path = %self.path.display(), "saved preferences");
        Ok(())
    }
}
