//! Printable HTML output.
//!
//! One absolutely positioned `<section>` per page, sized in millimetres so the
//! browser's print dialog reproduces the PDF layout.

use crate::board::Color;
use crate::errors::{RenderError, SerializationError};
use crate::log::warn;

use super::{Document, Footer, PageContent, PlacedDiagram, SlotContent, TitleBlock};

/// Escape text for use in HTML content and attribute values.
pub(crate) fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Serialize a laid-out document to a self-contained HTML page that opens the
/// print dialog once loaded.
pub fn to_html(document: &Document) -> Result<String, SerializationError> {
    if document.pages.is_empty() {
        return Err(SerializationError::NoPages);
    }

    let mut html = String::new();
    html.push_str(&format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>{title}</title>
    <style>
        @page {{
            size: {width} {height};
            margin: 0;
        }}
        * {{
            box-sizing: border-box;
        }}
        body {{
            margin: 0;
            background: #ddd;
            font-family: Helvetica, Arial, sans-serif;
            color: #000;
        }}
        .page {{
            position: relative;
            width: {width};
            height: {height};
            margin: 0 auto 8mm auto;
            background: #fff;
            overflow: hidden;
            page-break-after: always;
            break-after: page;
        }}
        .page:last-child {{
            page-break-after: auto;
            break-after: auto;
        }}
        .diagram {{
            position: absolute;
        }}
        .diagram svg, .diagram img {{
            display: block;
            width: 100%;
            height: 100%;
        }}
        .placeholder {{
            background: repeating-conic-gradient(#b0b0b0 0% 25%, #e0e0e0 0% 50%) 0 0 / 25% 25%;
        }}
        .indicator {{
            position: absolute;
            border-radius: 50%;
            border: 0.3mm solid #000;
        }}
        .indicator.white {{
            background: #fff;
        }}
        .indicator.black {{
            background: #000;
        }}
        .caption {{
            position: absolute;
            font-size: {caption}pt;
            line-height: 1.25;
            white-space: pre;
        }}
        .title-block {{
            position: absolute;
            left: 0;
            right: 0;
            top: 35%;
            text-align: center;
        }}
        .title-block h1 {{
            font-size: 28pt;
            margin: 0 0 6mm 0;
        }}
        .title-block p {{
            font-size: 14pt;
            margin: 0 0 3mm 0;
        }}
        .footer {{
            position: absolute;
            font-size: 9pt;
            color: #444;
        }}
        @media print {{
            body {{
                background: none;
            }}
            .page {{
                margin: 0;
            }}
        }}
    </style>
</head>
<body>
"#,
        title = xml_escape(&document.title),
        width = document.page_width,
        height = document.page_height,
        caption = document.caption_font_size,
    ));

    for page in &document.pages {
        html.push_str("<section class=\"page\">\n");
        match &page.content {
            PageContent::Title(block) => push_title(&mut html, block),
            PageContent::Diagrams(diagrams) => {
                for diagram in diagrams {
                    push_diagram(&mut html, diagram);
                }
            }
        }
        if let Some(footer) = &page.footer {
            push_footer(&mut html, footer, document);
        }
        html.push_str("</section>\n");
    }

    html.push_str(
        "<script>window.addEventListener('load', () => window.print());</script>\n</body>\n</html>\n",
    );
    Ok(html)
}

fn push_title(html: &mut String, block: &TitleBlock) {
    html.push_str("<div class=\"title-block\">\n");
    html.push_str(&format!("<h1>{}</h1>\n", xml_escape(&block.title)));
    if let Some(subtitle) = &block.subtitle {
        html.push_str(&format!("<p class=\"subtitle\">{}</p>\n", xml_escape(subtitle)));
    }
    if let Some(author) = &block.author {
        html.push_str(&format!("<p class=\"author\">{}</p>\n", xml_escape(author)));
    }
    html.push_str(&format!("<p class=\"date\">{}</p>\n", xml_escape(&block.date)));
    html.push_str("</div>\n");
}

/// The board itself, or the placeholder checkerboard when the artifact has
/// no HTML form.
fn push_board(html: &mut String, fragment: Option<Result<String, RenderError>>, position: &str) {
    match fragment {
        Some(Ok(fragment)) => {
            html.push_str(&format!("<div class=\"diagram\" style=\"{position}\">{fragment}</div>\n"));
        }
        Some(Err(error)) => {
            warn!(%error, "diagram could not be embedded, drawing a placeholder");
            html.push_str(&format!("<div class=\"diagram placeholder\" style=\"{position}\"></div>\n"));
        }
        None => {
            html.push_str(&format!("<div class=\"diagram placeholder\" style=\"{position}\"></div>\n"));
        }
    }
}

fn push_diagram(html: &mut String, diagram: &PlacedDiagram) {
    let side = diagram.side;
    let position = format!(
        "left: {}mm; top: {}mm; width: {side}; height: {side};",
        diagram.origin.x, diagram.origin.y
    );
    let fragment = match &diagram.content {
        SlotContent::Rendered(artifact) => Some(artifact.to_html_fragment()),
        SlotContent::Placeholder { .. } => None,
    };
    push_board(html, fragment, &position);

    let radius = diagram.indicator_diameter.raw() / 2.0;
    let class = match diagram.active_color {
        Color::White => "white",
        Color::Black => "black",
    };
    html.push_str(&format!(
        "<div class=\"indicator {class}\" title=\"{class} to move\" style=\"left: {}mm; top: {}mm; width: {d}; height: {d};\"></div>\n",
        diagram.indicator_center.x - radius,
        diagram.indicator_center.y - radius,
        d = diagram.indicator_diameter,
    ));

    let text = diagram
        .caption_lines
        .iter()
        .map(|line| xml_escape(line))
        .collect::<Vec<_>>()
        .join("\n");
    html.push_str(&format!(
        "<div class=\"caption\" style=\"left: {}mm; top: {}mm;\">{text}</div>\n",
        diagram.caption_origin.x, diagram.caption_origin.y
    ));
}

fn push_footer(html: &mut String, footer: &Footer, document: &Document) {
    let top = footer.baseline.raw() - 3.0;
    html.push_str(&format!(
        "<div class=\"footer\" style=\"left: 0; width: {}; top: {top}mm; text-align: center;\">{}</div>\n",
        document.page_width,
        xml_escape(&footer.page_label)
    ));
    if let Some(credit) = &footer.credit {
        html.push_str(&format!(
            "<div class=\"footer credit\" style=\"right: {}; top: {top}mm;\">{}</div>\n",
            document.margin,
            xml_escape(credit)
        ));
    }
}
