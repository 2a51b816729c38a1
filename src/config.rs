//! Export configuration.
//!
//! Read from TOML. Every field has a default, so an empty file is a valid
//! configuration:
//!
//! ```toml
//! renderer = "raster"
//! glyph_timeout_ms = 1500
//! pgn_positions = "replay"
//!
//! [style]
//! scale = 2.0
//! show_coordinates = false
//!
//! [layout]
//! columns = 3
//! rows = 4
//!
//! [title]
//! title = "Endgame drills"
//! author = "Coach"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::compose::{LayoutOptions, TitlePage};
use crate::errors::{ConfigError, SourceContext};
use crate::pgn::PositionMode;
use crate::prefs::Preferences;
use crate::render::RendererKind;
use crate::render::StyleOptions;
use crate::render::defaults::GLYPH_TIMEOUT_MS;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub renderer: RendererKind,
    pub style: StyleOptions,
    pub layout: LayoutOptions,
    /// Adds a title page when present
    pub title: Option<TitlePage>,
    pub glyph_timeout_ms: u64,
    pub pgn_positions: PositionMode,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            renderer: RendererKind::default(),
            style: StyleOptions::default(),
            layout: LayoutOptions::default(),
            title: None,
            glyph_timeout_ms: GLYPH_TIMEOUT_MS,
            pgn_positions: PositionMode::default(),
        }
    }
}

impl ExportConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&path.display().to_string(), &text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Self::parse("<config>", text)
    }

    fn parse(name: &str, text: &str) -> Result<Self, ConfigError> {
        let config: ExportConfig = toml::from_str(text).map_err(|e| {
            let ctx = SourceContext::new(name, text);
            ConfigError::Toml {
                message: e.message().to_string(),
                src: ctx.named_source(),
                span: e.span().map(|r| (r.start, r.end.saturating_sub(r.start)).into()),
            }
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject layouts no page can hold. Style problems are left to the
    /// renderer, which reports them per diagram.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let layout = &self.layout;
        let invalid = |field, reason: &str| {
            Err(ConfigError::Invalid {
                field,
                reason: reason.to_string(),
            })
        };
        if !(layout.page_width.raw() > 0.0 && layout.page_height.raw() > 0.0) {
            return invalid("layout.page_width", "page size must be positive");
        }
        if !(layout.margin.raw() >= 0.0 && layout.gutter.raw() >= 0.0) {
            return invalid("layout.margin", "margin and gutter cannot be negative");
        }
        if layout.margin.raw() * 2.0 >= layout.page_width.raw().min(layout.page_height.raw()) {
            return invalid("layout.margin", "margins leave no room for content");
        }
        if layout.columns == 0 || layout.rows == 0 {
            return invalid("layout.columns", "the grid needs at least one column and one row");
        }
        if !(layout.caption_font_size > 0.0 && layout.caption_font_size.is_finite()) {
            return invalid("layout.caption_font_size", "font size must be positive");
        }
        Ok(())
    }

    pub fn glyph_timeout(&self) -> Duration {
        Duration::from_millis(self.glyph_timeout_ms)
    }

    /// Apply accessibility preferences: high-contrast squares, uppercase
    /// captions and the caption font size.
    pub fn with_preferences(mut self, prefs: &Preferences) -> Self {
        let a11y = &prefs.accessibility;
        if a11y.high_contrast {
            self.style = self.style.high_contrast();
        }
        if a11y.uppercase {
            self.layout.uppercase_captions = true;
        }
        if let Some(pt) = a11y.caption_font_pt() {
            self.layout.caption_font_size = pt;
        }
        self
    }
}
