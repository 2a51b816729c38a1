//! PDF output via printpdf.
//!
//! Every visual (board, placeholder, side-to-move disc) is embedded as an RGB
//! image; captions and page furniture use the builtin Helvetica faces.
//! PDF coordinates grow upwards from the bottom-left corner, so every y from
//! the [`Document`] is flipped against the page height.

use printpdf::image_crate::{DynamicImage, RgbImage};
use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm as PdfMm, PdfDocument,
    PdfLayerReference,
};
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

use crate::board::Color;
use crate::errors::SerializationError;
use crate::log::warn;
use crate::render::defaults::{PLACEHOLDER_DARK, PLACEHOLDER_LIGHT};
use crate::render::is_light_cell;
use crate::types::{MM_PER_PT, Rgb};

use super::metrics::{line_height, text_width};
use super::{Document, Footer, PageContent, PlacedDiagram, SlotContent, TitleBlock};

const PLACEHOLDER_PX: u32 = 256;
const INDICATOR_PX: u32 = 64;
const FOOTER_FONT_PT: f64 = 9.0;

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

fn pdf_error(e: impl std::fmt::Display) -> SerializationError {
    SerializationError::Pdf { message: e.to_string() }
}

/// Serialize a laid-out document to PDF bytes.
pub fn to_pdf(document: &Document) -> Result<Vec<u8>, SerializationError> {
    if document.pages.is_empty() {
        return Err(SerializationError::NoPages);
    }

    let width = PdfMm(document.page_width.raw() as f32);
    let height = PdfMm(document.page_height.raw() as f32);
    let (doc, first_page, first_layer) = PdfDocument::new(&document.title, width, height, "Layer 1");
    let fonts = Fonts {
        regular: doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?,
        bold: doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_error)?,
    };

    for (index, page) in document.pages.iter().enumerate() {
        let (page_index, layer_index) = if index == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(width, height, "Layer 1")
        };
        let layer = doc.get_page(page_index).get_layer(layer_index);

        match &page.content {
            PageContent::Title(block) => draw_title(&layer, &fonts, block, document),
            PageContent::Diagrams(diagrams) => {
                for diagram in diagrams {
                    draw_diagram(&layer, &fonts, diagram, document)?;
                }
            }
        }
        if let Some(footer) = &page.footer {
            draw_footer(&layer, &fonts, footer, document);
        }
    }

    doc.save_to_bytes().map_err(pdf_error)
}

/// Place `text` with its left end at `x` and baseline at `baseline`, both
/// measured from the page's top-left corner.
fn text_at(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    text: &str,
    size_pt: f64,
    x: f64,
    baseline: f64,
    document: &Document,
) {
    let y = document.page_height.raw() - baseline;
    layer.use_text(text, size_pt as f32, PdfMm(x as f32), PdfMm(y as f32), font);
}

fn centered_x(text: &str, size_pt: f64, document: &Document) -> f64 {
    (document.page_width.raw() - text_width(text, size_pt).raw()) / 2.0
}

fn draw_title(layer: &PdfLayerReference, fonts: &Fonts, block: &TitleBlock, document: &Document) {
    let mut baseline = document.page_height.raw() * 0.38;
    let title_pt = 28.0;
    text_at(
        layer,
        &fonts.bold,
        &block.title,
        title_pt,
        centered_x(&block.title, title_pt, document),
        baseline,
        document,
    );
    baseline += line_height(title_pt).raw() + 4.0;

    let lines = [block.subtitle.as_deref(), block.author.as_deref(), Some(block.date.as_str())];
    for line in lines.into_iter().flatten() {
        text_at(layer, &fonts.regular, line, 14.0, centered_x(line, 14.0, document), baseline, document);
        baseline += line_height(14.0).raw() + 1.0;
    }
}

fn draw_diagram(
    layer: &PdfLayerReference,
    fonts: &Fonts,
    diagram: &PlacedDiagram,
    document: &Document,
) -> Result<(), SerializationError> {
    let pixmap = match &diagram.content {
        SlotContent::Rendered(artifact) => match artifact.to_raster() {
            Ok(pixmap) => pixmap,
            Err(error) => {
                warn!(%error, "diagram could not be rasterized, drawing a placeholder");
                placeholder_pixmap()?
            }
        },
        SlotContent::Placeholder { .. } => placeholder_pixmap()?,
    };
    let side = diagram.side.raw();
    place_image(layer, &pixmap, diagram.origin.x, diagram.origin.y, side, document)?;

    let diameter = diagram.indicator_diameter.raw();
    let disc = indicator_pixmap(diagram.active_color)?;
    place_image(
        layer,
        &disc,
        diagram.indicator_center.x - diameter / 2.0,
        diagram.indicator_center.y - diameter / 2.0,
        diameter,
        document,
    )?;

    let size = document.caption_font_size;
    let line = line_height(size).raw();
    // Baseline sits a font descent above the bottom of each line box.
    let descent = size * MM_PER_PT * 0.25;
    for (i, text) in diagram.caption_lines.iter().enumerate() {
        let baseline = diagram.caption_origin.y + line * (i as f64 + 1.0) - descent;
        text_at(layer, &fonts.regular, text, size, diagram.caption_origin.x, baseline, document);
    }
    Ok(())
}

fn draw_footer(layer: &PdfLayerReference, fonts: &Fonts, footer: &Footer, document: &Document) {
    let baseline = footer.baseline.raw();
    text_at(
        layer,
        &fonts.regular,
        &footer.page_label,
        FOOTER_FONT_PT,
        centered_x(&footer.page_label, FOOTER_FONT_PT, document),
        baseline,
        document,
    );
    if let Some(credit) = &footer.credit {
        let right = document.page_width.raw() - document.margin.raw();
        let x = right - text_width(credit, FOOTER_FONT_PT).raw();
        text_at(layer, &fonts.regular, credit, FOOTER_FONT_PT, x, baseline, document);
    }
}

/// Embed a square pixmap with its top-left corner at (`x`, `y`) mm, scaled to
/// `side` mm.
fn place_image(
    layer: &PdfLayerReference,
    pixmap: &Pixmap,
    x: f64,
    y: f64,
    side: f64,
    document: &Document,
) -> Result<(), SerializationError> {
    let rgb = RgbImage::from_raw(pixmap.width(), pixmap.height(), flatten_on_white(pixmap))
        .ok_or_else(|| pdf_error("pixel buffer does not match image size"))?;
    let image = Image::from_dynamic_image(&DynamicImage::ImageRgb8(rgb));
    let dpi = f64::from(pixmap.width()) * 25.4 / side.max(f64::EPSILON);
    image.add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(PdfMm(x as f32)),
            translate_y: Some(PdfMm((document.page_height.raw() - y - side) as f32)),
            dpi: Some(dpi as f32),
            ..Default::default()
        },
    );
    Ok(())
}

/// Premultiplied RGBA composited over white, as packed RGB.
fn flatten_on_white(pixmap: &Pixmap) -> Vec<u8> {
    let mut out = Vec::with_capacity(pixmap.pixels().len() * 3);
    for px in pixmap.pixels() {
        let paper = 255 - px.alpha();
        out.extend_from_slice(&[px.red() + paper, px.green() + paper, px.blue() + paper]);
    }
    out
}

fn blank(side: u32) -> Result<Pixmap, SerializationError> {
    Pixmap::new(side, side).ok_or_else(|| pdf_error(format!("cannot allocate a {side}x{side} pixmap")))
}

/// Neutral grey checkerboard standing in for a diagram that failed to render.
fn placeholder_pixmap() -> Result<Pixmap, SerializationError> {
    let mut pixmap = blank(PLACEHOLDER_PX)?;
    let cell = (PLACEHOLDER_PX / 8) as f32;
    let mut paint = Paint {
        anti_alias: false,
        ..Paint::default()
    };
    for row in 0..8u8 {
        for col in 0..8u8 {
            let color = if is_light_cell(col, row) {
                PLACEHOLDER_LIGHT
            } else {
                PLACEHOLDER_DARK
            };
            paint.set_color(color.to_skia());
            let rect = Rect::from_xywh(f32::from(col) * cell, f32::from(row) * cell, cell, cell)
                .ok_or_else(|| pdf_error("degenerate placeholder square"))?;
            pixmap.fill_rect(rect, &paint, Transform::identity(), None);
        }
    }
    Ok(pixmap)
}

/// Side-to-move disc: filled black, or white with a black outline.
fn indicator_pixmap(color: Color) -> Result<Pixmap, SerializationError> {
    let mut pixmap = blank(INDICATOR_PX)?;
    pixmap.fill(Rgb::WHITE.to_skia());
    let half = INDICATOR_PX as f32 / 2.0;
    let outline = INDICATOR_PX as f32 / 12.0;
    let path = PathBuilder::from_circle(half, half, half - outline)
        .ok_or_else(|| pdf_error("degenerate indicator disc"))?;

    let mut paint = Paint::default();
    let fill = match color {
        Color::White => Rgb::WHITE,
        Color::Black => Rgb::BLACK,
    };
    paint.set_color(fill.to_skia());
    pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);

    paint.set_color(Rgb::BLACK.to_skia());
    let stroke = Stroke {
        width: outline,
        ..Stroke::default()
    };
    pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    Ok(pixmap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::{LayoutOptions, Slot, TitlePage, layout};
    use crate::fen;
    use crate::render::{Artifact, DiagramRenderer, GlyphSet, RasterRenderer};

    fn placeholder() -> Slot {
        Slot {
            caption: "Broken".to_string(),
            active_color: Color::White,
            content: SlotContent::Placeholder {
                reason: "test".to_string(),
            },
        }
    }

    #[test]
    fn empty_document_is_rejected() {
        let doc = layout(Vec::new(), &LayoutOptions::default(), None);
        assert!(matches!(to_pdf(&doc), Err(SerializationError::NoPages)));
    }

    #[test]
    fn produces_a_pdf() {
        let position = fen::parse(fen::START_FEN).unwrap();
        let artifact = RasterRenderer::default().render(&position, &GlyphSet::unicode()).unwrap();
        let slots = vec![
            Slot {
                caption: "Starting position".to_string(),
                active_color: Color::White,
                content: SlotContent::Rendered(artifact),
            },
            placeholder(),
        ];
        let title = TitlePage {
            title: "Openings".to_string(),
            ..TitlePage::default()
        };
        let doc = layout(slots, &LayoutOptions::default(), Some(&title));
        let bytes = to_pdf(&doc).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn unrasterizable_diagram_keeps_the_export_going() {
        let garbled = Artifact::Vector {
            svg: "<svg".to_string(),
            side: 64,
        };
        assert!(garbled.to_raster().is_err());
        let broken = Slot {
            caption: "Garbled".to_string(),
            active_color: Color::Black,
            content: SlotContent::Rendered(garbled),
        };
        let doc = layout(vec![broken, placeholder()], &LayoutOptions::default(), None);
        assert!(to_pdf(&doc).unwrap().starts_with(b"%PDF"));
    }

    #[test]
    fn placeholder_is_grey_checkerboard() {
        let pixmap = placeholder_pixmap().unwrap();
        let cell = PLACEHOLDER_PX / 8;
        let at = |x: u32, y: u32| {
            let px = pixmap.pixel(x, y).unwrap();
            Rgb(px.red(), px.green(), px.blue())
        };
        assert_eq!(at(cell / 2, cell / 2), PLACEHOLDER_LIGHT);
        assert_eq!(at(cell + cell / 2, cell / 2), PLACEHOLDER_DARK);
    }

    #[test]
    fn transparent_pixels_become_paper() {
        let pixmap = Pixmap::new(2, 2).unwrap();
        assert_eq!(flatten_on_white(&pixmap), vec![255; 12]);
    }

    #[test]
    fn indicator_discs_differ() {
        let white = indicator_pixmap(Color::White).unwrap();
        let black = indicator_pixmap(Color::Black).unwrap();
        let center = INDICATOR_PX / 2;
        assert_eq!(white.pixel(center, center).unwrap().red(), 255);
        assert_eq!(black.pixel(center, center).unwrap().red(), 0);
    }
}
