//! Raster backend
//!
//! Squares and frame are painted directly with tiny-skia. Pieces and
//! coordinates come from the same SVG overlay the vector backend draws,
//! composited with resvg against the bundled DejaVu Sans face.

use std::sync::{Arc, LazyLock};

use tiny_skia::{Paint, Pixmap, Rect, Transform};

use crate::board::Position;
use crate::errors::RenderError;
use crate::log::debug;

use super::glyphs::GlyphSet;
use super::svg::{Layers, board_svg};
use super::{Artifact, DiagramRenderer, StyleOptions, is_light_cell};

/// The font every text glyph and coordinate is drawn with.
const BUNDLED_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

/// The bundled face, also standing in for the generic `sans-serif` family,
/// so output does not depend on the fonts installed on the host.
static FONTS: LazyLock<Arc<usvg::fontdb::Database>> = LazyLock::new(|| {
    let mut db = usvg::fontdb::Database::new();
    db.load_font_data(BUNDLED_FONT.to_vec());
    let family = db.faces().next().and_then(|face| face.families.first()).map(|(name, _)| name.clone());
    if let Some(name) = family {
        debug!(family = %name, "loaded bundled font");
        db.set_sans_serif_family(name);
    }
    Arc::new(db)
});

pub(crate) fn blank_pixmap(side: u32) -> Result<Pixmap, RenderError> {
    Pixmap::new(side, side).ok_or_else(|| RenderError::Rasterize {
        message: format!("cannot allocate a {side}x{side} pixmap"),
    })
}

/// Draw SVG markup over the existing pixels.
pub(crate) fn composite_svg(svg: &str, pixmap: &mut Pixmap) -> Result<(), RenderError> {
    let opts = usvg::Options {
        fontdb: FONTS.clone(),
        ..Default::default()
    };
    let tree = usvg::Tree::from_str(svg, &opts).map_err(|e| RenderError::Rasterize {
        message: e.to_string(),
    })?;
    resvg::render(&tree, Transform::default(), &mut pixmap.as_mut());
    Ok(())
}

/// Raster backend: a tiny-skia pixmap.
#[derive(Debug, Clone, Default)]
pub struct RasterRenderer {
    style: StyleOptions,
}

impl RasterRenderer {
    pub fn new(style: StyleOptions) -> Self {
        RasterRenderer { style }
    }
}

impl DiagramRenderer for RasterRenderer {
    fn render(&self, position: &Position, glyphs: &GlyphSet) -> Result<Artifact, RenderError> {
        let style = &self.style;
        let geometry = style.geometry()?;
        let mut pixmap = blank_pixmap(geometry.side_px())?;

        if geometry.border.raw() > 0.0 {
            pixmap.fill(style.border_color.to_skia());
        }

        let mut paint = Paint {
            anti_alias: false,
            ..Paint::default()
        };
        let size = geometry.square.raw() as f32;
        for row in 0..8u8 {
            for col in 0..8u8 {
                let (x, y) = geometry.cell_origin(col, row);
                let rect = Rect::from_xywh(x.raw() as f32, y.raw() as f32, size, size).ok_or_else(|| {
                    RenderError::Rasterize {
                        message: format!("degenerate square at {col},{row}"),
                    }
                })?;
                let color = if is_light_cell(col, row) {
                    style.light_square
                } else {
                    style.dark_square
                };
                paint.set_color(color.to_skia());
                pixmap.fill_rect(rect, &paint, Transform::identity(), None);
            }
        }

        if position.pieces().next().is_some() || style.show_coordinates {
            let overlay = board_svg(position, glyphs, style, &geometry, Layers::Overlay);
            composite_svg(&overlay, &mut pixmap)?;
        }

        Ok(Artifact::Raster(pixmap))
    }

    fn style(&self) -> &StyleOptions {
        &self.style
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fen;
    use crate::render::{BoardGeometry, Orientation, defaults};
    use crate::types::Rgb;

    fn rgb_at(pixmap: &Pixmap, x: u32, y: u32) -> Rgb {
        let px = pixmap.pixel(x, y).unwrap();
        Rgb(px.red(), px.green(), px.blue())
    }

    fn cell_center(geometry: &BoardGeometry, col: u8, row: u8) -> (u32, u32) {
        let (x, y) = geometry.cell_origin(col, row);
        let half = geometry.square.raw() / 2.0;
        ((x.raw() + half) as u32, (y.raw() + half) as u32)
    }

    fn raster(fen: &str, style: &StyleOptions) -> Pixmap {
        let position = fen::parse_lenient(fen).unwrap();
        match RasterRenderer::new(style.clone()).render(&position, &GlyphSet::unicode()).unwrap() {
            Artifact::Raster(pixmap) => pixmap,
            other => panic!("expected raster output, got {other:?}"),
        }
    }

    #[test]
    fn square_colors_hold_for_any_style() {
        for (scale, border, orientation) in [
            (1.0, 2.0, Orientation::White),
            (2.0, 0.0, Orientation::Black),
            (0.5, 5.0, Orientation::White),
        ] {
            let style = StyleOptions {
                scale,
                border_width: border,
                orientation,
                show_coordinates: false,
                ..StyleOptions::default()
            };
            let geometry = style.geometry().unwrap();
            let pixmap = raster("8/8/8/8/8/8/8/8", &style);
            assert_eq!(pixmap.width(), geometry.side_px());
            assert_eq!(pixmap.height(), geometry.side_px());
            for row in 0..8 {
                for col in 0..8 {
                    let (x, y) = cell_center(&geometry, col, row);
                    let expected = if is_light_cell(col, row) {
                        style.light_square
                    } else {
                        style.dark_square
                    };
                    assert_eq!(rgb_at(&pixmap, x, y), expected, "cell {col},{row} at scale {scale}");
                }
            }
        }
    }

    #[test]
    fn frame_uses_border_color() {
        let style = StyleOptions {
            border_width: 4.0,
            show_coordinates: false,
            ..StyleOptions::default()
        };
        let pixmap = raster("8/8/8/8/8/8/8/8", &style);
        assert_eq!(pixmap.width(), 368);
        assert_eq!(rgb_at(&pixmap, 1, 1), style.border_color);
        assert_eq!(rgb_at(&pixmap, 366, 200), style.border_color);
    }

    #[test]
    fn pieces_do_not_break_rendering() {
        let pixmap = raster(fen::START_FEN, &StyleOptions::default());
        assert_eq!(pixmap.width(), 364);
    }

    #[test]
    fn bad_style_is_a_render_error() {
        let style = StyleOptions {
            scale: f64::NAN,
            ..StyleOptions::default()
        };
        let result = RasterRenderer::new(style).render(&Position::empty(), &GlyphSet::unicode());
        assert!(matches!(result, Err(RenderError::InvalidScale { .. })));
    }

    #[test]
    fn identical_inputs_give_identical_pixels() {
        let style = StyleOptions::default();
        assert_eq!(raster(fen::START_FEN, &style).data(), raster(fen::START_FEN, &style).data());
    }

    #[test]
    fn png_encoding() {
        let position = fen::parse(fen::START_FEN).unwrap();
        let artifact = RasterRenderer::default().render(&position, &GlyphSet::unicode()).unwrap();
        let png = artifact.to_png().unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
        assert!(artifact.to_html_fragment().unwrap().starts_with(r#"<img src="data:image/png;base64,"#));
    }

    #[test]
    fn vector_artifacts_rasterize_to_the_same_squares() {
        let style = StyleOptions {
            show_coordinates: false,
            ..StyleOptions::default()
        };
        let geometry = style.geometry().unwrap();
        let position = Position::empty();
        let vector = crate::render::VectorRenderer::new(style.clone())
            .render(&position, &GlyphSet::unicode())
            .unwrap();
        let pixmap = vector.to_raster().unwrap();
        let (x, y) = cell_center(&geometry, 0, 0);
        assert_eq!(rgb_at(&pixmap, x, y), style.light_square);
        let (x, y) = cell_center(&geometry, 0, 7);
        assert_eq!(rgb_at(&pixmap, x, y), style.dark_square);
    }

    #[test]
    fn bundled_font_provides_the_glyph_family() {
        let family = FONTS.faces().next().and_then(|face| face.families.first()).map(|(name, _)| name.as_str());
        assert_eq!(family, Some("DejaVu Sans"));
        assert!(defaults::GLYPH_FONT_FAMILY.starts_with("'DejaVu Sans'"));
    }

    #[test]
    fn text_pieces_are_painted() {
        let style = StyleOptions {
            show_coordinates: false,
            ..StyleOptions::default()
        };
        let geometry = style.geometry().unwrap();
        let pixmap = raster("4k3/8/8/8/8/8/8/4K3", &style);
        let inked = |col: u8, row: u8| {
            let (x0, y0) = geometry.cell_origin(col, row);
            let side = geometry.square.raw() as u32;
            let background = if is_light_cell(col, row) {
                style.light_square
            } else {
                style.dark_square
            };
            let mut count = 0;
            for y in 0..side {
                for x in 0..side {
                    if rgb_at(&pixmap, x0.raw() as u32 + x, y0.raw() as u32 + y) != background {
                        count += 1;
                    }
                }
            }
            count
        };
        let cell = (geometry.square.raw() as u32).pow(2);
        // e8 and e1
        assert!(inked(4, 0) > cell / 10, "black king left no ink");
        assert!(inked(4, 7) > cell / 10, "white king left no ink");
        assert_eq!(inked(3, 3), 0);
    }
}
