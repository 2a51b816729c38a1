//! Document composition
//!
//! [`layout`] places diagrams on fixed-size pages; [`html::to_html`] and
//! [`pdf::to_pdf`] serialize the result. Positions are in millimetres from
//! the top-left corner of the page.

pub mod html;
pub mod metrics;
pub mod pdf;

pub use html::to_html;
pub use pdf::to_pdf;

use chrono::NaiveDate;
use glam::{DVec2, dvec2};
use serde::{Deserialize, Serialize};

use crate::board::Color;
use crate::log::debug;
use crate::render::Artifact;
use crate::types::Mm;

/// Gap between a diagram and its caption strip.
const CAPTION_GAP: Mm = Mm(2.0);
/// Space reserved at the page bottom for the footer.
const FOOTER_HEIGHT: Mm = Mm(8.0);
/// Diameter of the side-to-move disc, relative to the caption line height.
const INDICATOR_FRACTION: f64 = 0.7;

pub const DEFAULT_CREDIT: &str = "Generated by boardprint";

/// Page grid and caption options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    pub page_width: Mm,
    pub page_height: Mm,
    pub margin: Mm,
    pub gutter: Mm,
    pub columns: u32,
    pub rows: u32,
    /// Caption font size in points
    pub caption_font_size: f64,
    /// Caption lines reserved under each diagram; longer captions are cut.
    pub caption_lines: u32,
    pub uppercase_captions: bool,
    pub footer: bool,
    pub credit: Option<String>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        LayoutOptions {
            page_width: Mm(210.0),
            page_height: Mm(297.0),
            margin: Mm(15.0),
            gutter: Mm(8.0),
            columns: 2,
            rows: 3,
            caption_font_size: 10.0,
            caption_lines: 2,
            uppercase_captions: false,
            footer: true,
            credit: Some(DEFAULT_CREDIT.to_string()),
        }
    }
}

impl LayoutOptions {
    /// Diagrams per page.
    pub fn per_page(&self) -> usize {
        (self.columns.max(1) * self.rows.max(1)) as usize
    }
}

/// Optional first page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TitlePage {
    pub title: String,
    pub subtitle: Option<String>,
    pub author: Option<String>,
    /// Defaults to today when the document is laid out.
    #[serde(skip)]
    pub date: Option<NaiveDate>,
}

/// What goes into one grid cell.
#[derive(Debug, Clone)]
pub enum SlotContent {
    Rendered(Artifact),
    /// Neutral checkerboard; the reason is appended to the caption.
    Placeholder { reason: String },
}

#[derive(Debug, Clone)]
pub struct Slot {
    pub caption: String,
    pub active_color: Color,
    pub content: SlotContent,
}

#[derive(Debug, Clone)]
pub struct PlacedDiagram {
    /// Top-left corner of the board
    pub origin: DVec2,
    pub side: Mm,
    /// Center of the side-to-move disc
    pub indicator_center: DVec2,
    pub indicator_diameter: Mm,
    pub active_color: Color,
    /// Top-left of the first caption line
    pub caption_origin: DVec2,
    pub caption_lines: Vec<String>,
    pub content: SlotContent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TitleBlock {
    pub title: String,
    pub subtitle: Option<String>,
    pub author: Option<String>,
    pub date: String,
}

#[derive(Debug, Clone)]
pub enum PageContent {
    Title(TitleBlock),
    Diagrams(Vec<PlacedDiagram>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Footer {
    pub page_label: String,
    pub credit: Option<String>,
    /// Baseline y of the footer text
    pub baseline: Mm,
}

#[derive(Debug, Clone)]
pub struct Page {
    pub content: PageContent,
    pub footer: Option<Footer>,
}

/// A laid-out document, ready for serialization.
#[derive(Debug, Clone)]
pub struct Document {
    pub title: String,
    pub page_width: Mm,
    pub page_height: Mm,
    /// Page margin; the footer credit is right-aligned against it.
    pub margin: Mm,
    pub caption_font_size: f64,
    pub pages: Vec<Page>,
}

impl Document {
    /// Pages holding diagrams (the title page excluded).
    pub fn content_pages(&self) -> usize {
        self.pages
            .iter()
            .filter(|p| matches!(p.content, PageContent::Diagrams(_)))
            .count()
    }

    pub fn diagrams(&self) -> impl Iterator<Item = &PlacedDiagram> {
        self.pages.iter().flat_map(|page| match &page.content {
            PageContent::Diagrams(diagrams) => diagrams.as_slice(),
            PageContent::Title(_) => &[][..],
        })
    }
}

/// Geometry of one grid cell, shared by every page.
struct Grid {
    cell_w: f64,
    cell_h: f64,
    side: f64,
    caption_h: f64,
}

impl Grid {
    fn new(options: &LayoutOptions) -> Self {
        let columns = f64::from(options.columns.max(1));
        let rows = f64::from(options.rows.max(1));
        let footer = if options.footer { FOOTER_HEIGHT.raw() } else { 0.0 };

        let content_w = options.page_width.raw() - 2.0 * options.margin.raw();
        let content_h = options.page_height.raw() - 2.0 * options.margin.raw() - footer;
        let cell_w = ((content_w - options.gutter.raw() * (columns - 1.0)) / columns).max(1.0);
        let cell_h = ((content_h - options.gutter.raw() * (rows - 1.0)) / rows).max(1.0);

        let line = metrics::line_height(options.caption_font_size).raw();
        let caption_h = CAPTION_GAP.raw() + line * f64::from(options.caption_lines.max(1));
        let side = cell_w.min(cell_h - caption_h).max(1.0);

        Grid {
            cell_w,
            cell_h,
            side,
            caption_h,
        }
    }
}

/// Place slots on pages: a fixed grid filled row by row, a new page when the
/// grid is full. A diagram is never split across pages.
pub fn layout(slots: Vec<Slot>, options: &LayoutOptions, title: Option<&TitlePage>) -> Document {
    let grid = Grid::new(options);
    let per_page = options.per_page();
    let columns = options.columns.max(1) as usize;
    let line = metrics::line_height(options.caption_font_size);
    let indicator = line * INDICATOR_FRACTION;
    let text_width = Mm(grid.side) - line;

    debug!(
        cell_w = grid.cell_w,
        cell_h = grid.cell_h,
        side = grid.side,
        caption_h = grid.caption_h,
        per_page,
        "page grid"
    );

    let mut pages = Vec::new();
    if let Some(title) = title {
        pages.push(Page {
            content: PageContent::Title(title_block(title)),
            footer: None,
        });
    }

    let mut slots = slots.into_iter().peekable();
    while slots.peek().is_some() {
        let mut placed = Vec::with_capacity(per_page);
        for (index, slot) in slots.by_ref().take(per_page).enumerate() {
            let col = (index % columns) as f64;
            let row = (index / columns) as f64;
            let cell_x = options.margin.raw() + col * (grid.cell_w + options.gutter.raw());
            let cell_y = options.margin.raw() + row * (grid.cell_h + options.gutter.raw());
            let origin = dvec2(cell_x + (grid.cell_w - grid.side) / 2.0, cell_y);
            let caption_top = origin.y + grid.side + CAPTION_GAP.raw();

            let mut caption = match &slot.content {
                SlotContent::Rendered(_) => slot.caption.clone(),
                SlotContent::Placeholder { reason } if slot.caption.trim().is_empty() => {
                    format!("Diagram unavailable: {reason}")
                }
                SlotContent::Placeholder { reason } => {
                    format!("{} (diagram unavailable: {reason})", slot.caption)
                }
            };
            if options.uppercase_captions {
                caption = caption.to_uppercase();
            }

            placed.push(PlacedDiagram {
                origin,
                side: Mm(grid.side),
                indicator_center: dvec2(origin.x + line.raw() / 2.0, caption_top + line.raw() / 2.0),
                indicator_diameter: indicator,
                active_color: slot.active_color,
                caption_origin: dvec2(origin.x + line.raw(), caption_top),
                caption_lines: metrics::wrap_lines(
                    &caption,
                    text_width,
                    options.caption_font_size,
                    options.caption_lines.max(1) as usize,
                ),
                content: slot.content,
            });
        }
        pages.push(Page {
            content: PageContent::Diagrams(placed),
            footer: None,
        });
    }

    if options.footer {
        let total = pages.len();
        let baseline = options.page_height - options.margin - FOOTER_HEIGHT / 4.0;
        for (index, page) in pages.iter_mut().enumerate() {
            if matches!(page.content, PageContent::Diagrams(_)) {
                page.footer = Some(Footer {
                    page_label: format!("Page {} of {}", index + 1, total),
                    credit: options.credit.clone(),
                    baseline,
                });
            }
        }
    }

    Document {
        title: title
            .map(|t| t.title.clone())
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| "Chess diagrams".to_string()),
        page_width: options.page_width,
        page_height: options.page_height,
        margin: options.margin,
        caption_font_size: options.caption_font_size,
        pages,
    }
}

fn title_block(title: &TitlePage) -> TitleBlock {
    let date = title
        .date
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    TitleBlock {
        title: title.title.clone(),
        subtitle: title.subtitle.clone(),
        author: title.author.clone(),
        date: date.format("%B %-d, %Y").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placeholder(caption: &str) -> Slot {
        Slot {
            caption: caption.to_string(),
            active_color: Color::White,
            content: SlotContent::Placeholder {
                reason: "test".to_string(),
            },
        }
    }

    fn slots(n: usize) -> Vec<Slot> {
        (0..n).map(|i| placeholder(&format!("Diagram {i}"))).collect()
    }

    #[test]
    fn pagination_boundary() {
        let options = LayoutOptions::default();
        assert_eq!(options.per_page(), 6);
        assert_eq!(layout(slots(0), &options, None).content_pages(), 0);
        assert_eq!(layout(slots(1), &options, None).content_pages(), 1);
        assert_eq!(layout(slots(6), &options, None).content_pages(), 1);
        assert_eq!(layout(slots(7), &options, None).content_pages(), 2);
        assert_eq!(layout(slots(13), &options, None).content_pages(), 3);
    }

    #[test]
    fn title_page_comes_first() {
        let title = TitlePage {
            title: "Endgame drills".to_string(),
            subtitle: Some("Week 3".to_string()),
            author: None,
            date: NaiveDate::from_ymd_opt(2024, 3, 9),
        };
        let doc = layout(slots(7), &LayoutOptions::default(), Some(&title));
        assert_eq!(doc.pages.len(), 3);
        assert_eq!(doc.title, "Endgame drills");
        match &doc.pages[0].content {
            PageContent::Title(block) => assert_eq!(block.date, "March 9, 2024"),
            other => panic!("expected title page, got {other:?}"),
        }
        assert!(doc.pages[0].footer.is_none());
        assert_eq!(doc.pages[2].footer.as_ref().unwrap().page_label, "Page 3 of 3");
    }

    #[test]
    fn diagrams_fit_inside_the_page() {
        let options = LayoutOptions::default();
        let doc = layout(slots(12), &options, None);
        let bottom_limit = options.page_height.raw() - options.margin.raw();
        for d in doc.diagrams() {
            assert!(d.origin.x >= options.margin.raw() - 1e-9);
            assert!(d.origin.x + d.side.raw() <= options.page_width.raw() - options.margin.raw() + 1e-9);
            let caption_bottom = d.caption_origin.y
                + metrics::line_height(options.caption_font_size).raw() * d.caption_lines.len() as f64;
            assert!(caption_bottom <= bottom_limit + 1e-9, "caption overflows the page");
        }
    }

    #[test]
    fn grid_is_row_major() {
        let doc = layout(slots(3), &LayoutOptions::default(), None);
        let origins: Vec<DVec2> = doc.diagrams().map(|d| d.origin).collect();
        assert!(origins[0].x < origins[1].x);
        assert_eq!(origins[0].y, origins[1].y);
        assert!(origins[2].y > origins[0].y);
        assert_eq!(origins[2].x, origins[0].x);
    }

    #[test]
    fn placeholder_reason_reaches_the_caption() {
        let doc = layout(vec![placeholder("")], &LayoutOptions::default(), None);
        let d = doc.diagrams().next().unwrap();
        assert_eq!(d.caption_lines.join(" "), "Diagram unavailable: test");
    }

    #[test]
    fn uppercase_captions() {
        let options = LayoutOptions {
            uppercase_captions: true,
            ..LayoutOptions::default()
        };
        let slot = Slot {
            caption: "White to move".to_string(),
            active_color: Color::White,
            content: SlotContent::Placeholder {
                reason: "x".to_string(),
            },
        };
        let doc = layout(vec![slot], &options, None);
        assert!(doc.diagrams().next().unwrap().caption_lines[0].starts_with("WHITE TO MOVE"));
    }
}
