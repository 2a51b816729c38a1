//! Chess diagram rendering
//!
//! This module is organized into submodules:
//! - `defaults`: Board sizes and colors
//! - `glyphs`: Piece glyph sources and the textual fallback
//! - `svg`: Vector backend (SVG markup)
//! - `raster`: Raster backend (tiny-skia pixmap)
//!
//! Both backends share the geometry computed here, so a diagram looks the
//! same whichever one drew it.

pub mod defaults;
pub mod glyphs;
pub mod raster;
pub mod svg;

pub use glyphs::{Glyph, GlyphSet, GlyphSource};
pub use raster::RasterRenderer;
pub use svg::VectorRenderer;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};
use tiny_skia::Pixmap;

use crate::board::{Position, Square};
use crate::errors::{Error, RenderError};
use crate::fen;
use crate::types::{Px, Rgb, Scaler};

/// Which side is drawn at the bottom.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    White,
    Black,
}

/// Visual options for one diagram. A pure value; both backends read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleOptions {
    pub show_coordinates: bool,
    /// Frame width in pixels at scale 1. Zero disables the frame.
    pub border_width: f64,
    pub scale: f64,
    pub glyph_source: GlyphSource,
    pub light_square: Rgb,
    pub dark_square: Rgb,
    pub border_color: Rgb,
    pub orientation: Orientation,
}

impl Default for StyleOptions {
    fn default() -> Self {
        StyleOptions {
            show_coordinates: true,
            border_width: defaults::BORDER_WIDTH,
            scale: 1.0,
            glyph_source: GlyphSource::Unicode,
            light_square: defaults::LIGHT_SQUARE,
            dark_square: defaults::DARK_SQUARE,
            border_color: defaults::BORDER_COLOR,
            orientation: Orientation::White,
        }
    }
}

impl StyleOptions {
    /// Swap in the high-contrast square palette.
    pub fn high_contrast(mut self) -> Self {
        self.light_square = defaults::HIGH_CONTRAST_LIGHT;
        self.dark_square = defaults::HIGH_CONTRAST_DARK;
        self.border_color = Rgb::BLACK;
        self
    }

    /// Validate the numeric options and compute the board geometry.
    pub fn geometry(&self) -> Result<BoardGeometry, RenderError> {
        let scale = Scaler::try_new(self.scale).map_err(|source| RenderError::InvalidScale {
            value: self.scale,
            source,
        })?;
        if !self.border_width.is_finite() || self.border_width < 0.0 {
            return Err(RenderError::InvalidBorder {
                value: self.border_width,
            });
        }

        let square = scale.px(defaults::SQUARE_SIZE);
        let border = scale.px(self.border_width);
        let side = square * 8.0 + border * 2.0;
        let size = side.ceil_u32();
        if size > defaults::MAX_DIMENSION {
            return Err(RenderError::TooLarge {
                size,
                max: defaults::MAX_DIMENSION,
            });
        }

        Ok(BoardGeometry {
            scale,
            square,
            border,
            side,
        })
    }
}

/// Pixel geometry of a board at a given scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardGeometry {
    pub scale: Scaler,
    pub square: Px,
    pub border: Px,
    pub side: Px,
}

impl BoardGeometry {
    /// Top-left corner of the display cell at `col`, `row` (row 0 at the top).
    pub fn cell_origin(&self, col: u8, row: u8) -> (Px, Px) {
        (
            self.border + self.square * f64::from(col),
            self.border + self.square * f64::from(row),
        )
    }

    /// Side length in whole pixels
    pub fn side_px(&self) -> u32 {
        self.side.ceil_u32()
    }
}

/// The display cell at `col`, `row` (row 0 at the top) is light iff
/// `col + row` is even.
#[inline]
pub fn is_light_cell(col: u8, row: u8) -> bool {
    (col + row) % 2 == 0
}

/// The board square shown in a display cell.
pub fn display_square(col: u8, row: u8, orientation: Orientation) -> Square {
    let (file, rank) = match orientation {
        Orientation::White => (col, 7 - row),
        Orientation::Black => (7 - col, row),
    };
    Square::wrapping(file, rank)
}

/// A coordinate label inset into an edge square.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateLabel {
    pub text: char,
    pub x: Px,
    /// Baseline
    pub y: Px,
    pub color: Rgb,
    /// Right-aligned (file letters) or left-aligned (rank digits)
    pub align_end: bool,
}

/// File letters along the bottom edge, rank digits along the left edge, each
/// in the opposite color of the square it sits in.
pub fn coordinate_labels(geometry: &BoardGeometry, style: &StyleOptions) -> Vec<CoordinateLabel> {
    let inset = geometry.scale.px(defaults::COORD_INSET);
    let font = geometry.scale.px(defaults::COORD_FONT_SIZE);
    let contrast = |col: u8, row: u8| {
        if is_light_cell(col, row) {
            style.dark_square
        } else {
            style.light_square
        }
    };

    let mut labels = Vec::with_capacity(16);
    for col in 0..8u8 {
        let (x, y) = geometry.cell_origin(col, 7);
        labels.push(CoordinateLabel {
            text: display_square(col, 7, style.orientation).file_char(),
            x: x + geometry.square - inset,
            y: y + geometry.square - inset,
            color: contrast(col, 7),
            align_end: true,
        });
    }
    for row in 0..8u8 {
        let (x, y) = geometry.cell_origin(0, row);
        labels.push(CoordinateLabel {
            text: char::from(b'1' + display_square(0, row, style.orientation).rank()),
            x: x + inset,
            y: y + inset + font,
            color: contrast(0, row),
            align_end: false,
        });
    }
    labels
}

/// A rendered diagram.
#[derive(Debug, Clone)]
pub enum Artifact {
    Vector { svg: String, side: u32 },
    Raster(Pixmap),
}

impl Artifact {
    /// Side length in pixels. Diagrams are always square.
    pub fn side_px(&self) -> u32 {
        match self {
            Artifact::Vector { side, .. } => *side,
            Artifact::Raster(pixmap) => pixmap.width(),
        }
    }

    /// Pixels for this diagram, rasterizing vector markup if needed.
    pub fn to_raster(&self) -> Result<Pixmap, RenderError> {
        match self {
            Artifact::Raster(pixmap) => Ok(pixmap.clone()),
            Artifact::Vector { svg, side } => {
                let mut pixmap = raster::blank_pixmap(*side)?;
                raster::composite_svg(svg, &mut pixmap)?;
                Ok(pixmap)
            }
        }
    }

    pub fn to_png(&self) -> Result<Vec<u8>, RenderError> {
        self.to_raster()?
            .encode_png()
            .map_err(|e| RenderError::Encode { message: e.to_string() })
    }

    /// Markup that shows this diagram inline in an HTML page. The caller
    /// sizes it with CSS.
    pub fn to_html_fragment(&self) -> Result<String, RenderError> {
        match self {
            Artifact::Vector { svg, .. } => Ok(svg.clone()),
            Artifact::Raster(pixmap) => {
                let png = pixmap
                    .encode_png()
                    .map_err(|e| RenderError::Encode { message: e.to_string() })?;
                Ok(format!(
                    r#"<img src="data:image/png;base64,{}" width="{}" height="{}" alt="">"#,
                    BASE64.encode(png),
                    pixmap.width(),
                    pixmap.height()
                ))
            }
        }
    }
}

/// Rendering capability shared by both backends.
#[enum_dispatch]
pub trait DiagramRenderer {
    fn render(&self, position: &Position, glyphs: &GlyphSet) -> Result<Artifact, RenderError>;

    fn style(&self) -> &StyleOptions;
}

/// Backend chosen by configuration.
#[enum_dispatch(DiagramRenderer)]
#[derive(Debug, Clone)]
pub enum Renderer {
    VectorRenderer,
    RasterRenderer,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    #[default]
    Vector,
    Raster,
}

impl Renderer {
    pub fn new(kind: RendererKind, style: StyleOptions) -> Self {
        match kind {
            RendererKind::Vector => VectorRenderer::new(style).into(),
            RendererKind::Raster => RasterRenderer::new(style).into(),
        }
    }
}

/// Render a FEN directly. Partial FENs are accepted.
pub fn render_fen<R: DiagramRenderer + ?Sized>(
    renderer: &R,
    fen: &str,
    glyphs: &GlyphSet,
) -> Result<Artifact, Error> {
    let position = fen::parse_lenient(fen)?;
    Ok(renderer.render(&position, glyphs)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_colors_follow_chess_convention() {
        for orientation in [Orientation::White, Orientation::Black] {
            for row in 0..8 {
                for col in 0..8 {
                    let sq = display_square(col, row, orientation);
                    // a1 is dark: file + rank even means dark.
                    let light_by_square = (sq.file() + sq.rank()) % 2 == 1;
                    assert_eq!(is_light_cell(col, row), light_by_square, "{sq} {orientation:?}");
                }
            }
        }
    }

    #[test]
    fn orientation_flips_corners() {
        assert_eq!(display_square(0, 0, Orientation::White).to_string(), "a8");
        assert_eq!(display_square(0, 7, Orientation::White).to_string(), "a1");
        assert_eq!(display_square(0, 0, Orientation::Black).to_string(), "h1");
        assert_eq!(display_square(7, 7, Orientation::Black).to_string(), "a8");
    }

    #[test]
    fn geometry_scales_with_border() {
        let style = StyleOptions {
            scale: 2.0,
            border_width: 3.0,
            ..StyleOptions::default()
        };
        let geometry = style.geometry().unwrap();
        assert_eq!(geometry.side_px(), 8 * 90 + 2 * 6);
        assert_eq!(geometry.cell_origin(1, 0), (Px(96.0), Px(6.0)));
    }

    #[test]
    fn geometry_rejects_bad_styles() {
        let bad_scale = StyleOptions {
            scale: 0.0,
            ..StyleOptions::default()
        };
        assert!(matches!(bad_scale.geometry(), Err(RenderError::InvalidScale { .. })));

        let bad_border = StyleOptions {
            border_width: -1.0,
            ..StyleOptions::default()
        };
        assert!(matches!(bad_border.geometry(), Err(RenderError::InvalidBorder { .. })));

        let huge = StyleOptions {
            scale: 100.0,
            ..StyleOptions::default()
        };
        assert!(matches!(huge.geometry(), Err(RenderError::TooLarge { .. })));
    }

    #[test]
    fn coordinate_labels_follow_orientation() {
        let style = StyleOptions::default();
        let geometry = style.geometry().unwrap();
        let labels = coordinate_labels(&geometry, &style);
        let text: String = labels.iter().map(|l| l.text).collect();
        assert_eq!(text, "abcdefgh87654321");
        // h1 is light, so its letter is drawn in the dark color.
        assert_eq!(labels[7].color, style.dark_square);

        let flipped = StyleOptions {
            orientation: Orientation::Black,
            ..style
        };
        let text: String = coordinate_labels(&geometry, &flipped).iter().map(|l| l.text).collect();
        assert_eq!(text, "hgfedcba12345678");
    }
}
