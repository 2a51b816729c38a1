//! SVG generation

use svg::Document;
use svg::node::Value;
use svg::node::element::{Image, Rectangle, Text};

use crate::board::{Color, Position};
use crate::errors::RenderError;
use crate::types::{Px, Rgb};

use super::glyphs::{Glyph, GlyphSet};
use super::{
    Artifact, BoardGeometry, DiagramRenderer, StyleOptions, coordinate_labels, defaults,
    display_square, is_light_cell,
};

impl From<Px> for Value {
    fn from(px: Px) -> Value {
        px.to_string().into()
    }
}

impl From<Rgb> for Value {
    fn from(color: Rgb) -> Value {
        color.to_string().into()
    }
}

fn square(x: Px, y: Px, side: Px, fill: Rgb) -> Rectangle {
    Rectangle::new()
        .set("x", x)
        .set("y", y)
        .set("width", side)
        .set("height", side)
        .set("fill", fill)
}

/// A piece drawn as a font symbol, outlined in the opposite color so white
/// pieces stay visible on light squares.
fn symbol(x: Px, y: Px, symbol: char, size: Px, color: Color) -> Text {
    let (fill, outline) = match color {
        Color::White => (Rgb::WHITE, Rgb::BLACK),
        Color::Black => (Rgb::BLACK, Rgb::WHITE),
    };
    Text::new(symbol.to_string())
        .set("x", x)
        .set("y", y)
        .set("font-family", defaults::GLYPH_FONT_FAMILY)
        .set("font-size", size)
        .set("fill", fill)
        .set("stroke", outline)
        .set("stroke-width", size * defaults::GLYPH_STROKE)
        .set("paint-order", "stroke")
        .set("text-anchor", "middle")
}

/// Which parts of the board to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Layers {
    /// Frame, squares, pieces and coordinates
    Full,
    /// Pieces and coordinates only, for compositing over painted squares
    Overlay,
}

pub(crate) fn board_svg(
    position: &Position,
    glyphs: &GlyphSet,
    style: &StyleOptions,
    geometry: &BoardGeometry,
    layers: Layers,
) -> String {
    let side = geometry.side;
    let mut svg = Document::new()
        .set("xmlns:xlink", "http://www.w3.org/1999/xlink")
        .set("width", side)
        .set("height", side)
        .set("viewBox", (0, 0, side, side));
    let cell = geometry.square;

    if layers == Layers::Full {
        if geometry.border.raw() > 0.0 {
            svg = svg.add(square(Px(0.0), Px(0.0), side, style.border_color));
        }
        for row in 0..8u8 {
            for col in 0..8u8 {
                let (x, y) = geometry.cell_origin(col, row);
                let fill = if is_light_cell(col, row) {
                    style.light_square
                } else {
                    style.dark_square
                };
                svg = svg.add(square(x, y, cell, fill));
            }
        }
    }

    let glyph_box = cell * defaults::GLYPH_FRACTION;
    let pad = (cell - glyph_box) / 2.0;
    for row in 0..8u8 {
        for col in 0..8u8 {
            let Some(piece) = position.get(display_square(col, row, style.orientation)) else {
                continue;
            };
            let (x, y) = geometry.cell_origin(col, row);
            svg = match glyphs.get(piece) {
                Glyph::Svg(markup) => svg.add(
                    Image::new()
                        .set("x", x + pad)
                        .set("y", y + pad)
                        .set("width", glyph_box)
                        .set("height", glyph_box)
                        .set("xlink:href", Glyph::data_uri(&markup)),
                ),
                Glyph::Text(ch) => {
                    let cx = x + cell / 2.0;
                    let baseline = y + cell / 2.0 + glyph_box * defaults::GLYPH_BASELINE;
                    svg.add(symbol(cx, baseline, ch, glyph_box, piece.color))
                }
            };
        }
    }

    if style.show_coordinates {
        let size = geometry.scale.px(defaults::COORD_FONT_SIZE);
        for label in coordinate_labels(geometry, style) {
            svg = svg.add(
                Text::new(label.text.to_string())
                    .set("x", label.x)
                    .set("y", label.y)
                    .set("font-family", defaults::COORD_FONT_FAMILY)
                    .set("font-size", size)
                    .set("fill", label.color)
                    .set("text-anchor", if label.align_end { "end" } else { "start" }),
            );
        }
    }

    svg.to_string()
}

/// Vector backend: SVG markup.
#[derive(Debug, Clone, Default)]
pub struct VectorRenderer {
    style: StyleOptions,
}

impl VectorRenderer {
    pub fn new(style: StyleOptions) -> Self {
        VectorRenderer { style }
    }
}

impl DiagramRenderer for VectorRenderer {
    fn render(&self, position: &Position, glyphs: &GlyphSet) -> Result<Artifact, RenderError> {
        let geometry = self.style.geometry()?;
        let svg = board_svg(position, glyphs, &self.style, &geometry, Layers::Full);
        Ok(Artifact::Vector {
            svg,
            side: geometry.side_px(),
        })
    }

    fn style(&self) -> &StyleOptions {
        &self.style
    }
}
