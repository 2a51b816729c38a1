//! Default sizes and colors (sizes in pixels at scale 1)

use crate::types::Rgb;

pub const SQUARE_SIZE: f64 = 45.0;
pub const BORDER_WIDTH: f64 = 2.0;
/// Largest board side, in pixels, either backend will produce.
pub const MAX_DIMENSION: u32 = 8192;

/// Glyph box as a fraction of the square.
pub const GLYPH_FRACTION: f64 = 0.85;
/// Baseline offset below the square center, as a fraction of the font size.
pub const GLYPH_BASELINE: f64 = 0.35;
/// Outline around text glyphs, as a fraction of the font size.
pub const GLYPH_STROKE: f64 = 0.03;

pub const COORD_FONT_SIZE: f64 = 9.0;
pub const COORD_INSET: f64 = 2.0;

pub const LIGHT_SQUARE: Rgb = Rgb(0xf0, 0xd9, 0xb5);
pub const DARK_SQUARE: Rgb = Rgb(0xb5, 0x88, 0x63);
pub const BORDER_COLOR: Rgb = Rgb(0x40, 0x40, 0x40);

pub const HIGH_CONTRAST_LIGHT: Rgb = Rgb::WHITE;
pub const HIGH_CONTRAST_DARK: Rgb = Rgb(0x70, 0x70, 0x70);

pub const PLACEHOLDER_LIGHT: Rgb = Rgb(0xe0, 0xe0, 0xe0);
pub const PLACEHOLDER_DARK: Rgb = Rgb(0xb0, 0xb0, 0xb0);

/// The first family is bundled and used for raster output; the rest are for
/// inline SVG in a browser.
pub const GLYPH_FONT_FAMILY: &str = "'DejaVu Sans', 'Segoe UI Symbol', 'Noto Sans Symbols 2', sans-serif";
pub const COORD_FONT_FAMILY: &str = "Helvetica, Arial, sans-serif";

/// Budget for loading a glyph directory before falling back to text glyphs.
pub const GLYPH_TIMEOUT_MS: u64 = 3000;
