//! Caption text measurement and word wrapping.

use crate::types::{MM_PER_PT, Mm};

/// Width of each printable ASCII character (0x20..=0x7e) in hundredths of a
/// character cell. Close enough to Helvetica for wrapping decisions.
#[rustfmt::skip]
const AW_CHAR: [u8; 95] = [
    45,  55,  62, 115,  90, 132, 125,  40,
    55,  55,  71, 115,  45,  48,  45,  50,
    91,  91,  91,  91,  91,  91,  91,  91,
    91,  91,  50,  50, 120, 120, 120,  78,
   142, 102, 105, 110, 115, 105,  98, 105,
   125,  58,  58, 107,  95, 145, 125, 115,
    95, 115, 107,  95,  97, 118, 102, 150,
   100,  93, 100,  58,  50,  58, 119,  72,
    72,  86,  92,  80,  92,  85,  52,  92,
    92,  47,  47,  88,  48, 135,  92,  86,
    92,  92,  69,  75,  58,  92,  80, 121,
    81,  80,  76,  91,  49,  91, 118,
];

/// Character cell width relative to the font size.
const CELL_EM: f64 = 0.08 / 0.14;

/// Width of `text` in hundredths of a character cell.
fn text_length(text: &str) -> u32 {
    text.chars()
        .map(|c| match c {
            ' '..='~' => u32::from(AW_CHAR[c as usize - 0x20]),
            _ => 100,
        })
        .sum()
}

/// Rendered width of `text` at `font_pt`.
pub fn text_width(text: &str, font_pt: f64) -> Mm {
    Mm(f64::from(text_length(text)) * 0.01 * CELL_EM * font_pt * MM_PER_PT)
}

/// Height of one caption line at `font_pt`.
pub fn line_height(font_pt: f64) -> Mm {
    Mm::from_pt(font_pt * 1.25)
}

/// Greedy word wrap. Words wider than a whole line are split by characters.
pub fn wrap(text: &str, max_width: Mm, font_pt: f64) -> Vec<String> {
    let fits = |s: &str| text_width(s, font_pt) <= max_width;
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if fits(&candidate) {
            current = candidate;
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if fits(word) {
            current = word.to_string();
            continue;
        }
        for c in word.chars() {
            current.push(c);
            if !fits(&current) && current.chars().count() > 1 {
                current.pop();
                lines.push(std::mem::take(&mut current));
                current.push(c);
            }
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Wrap and cut to at most `max_lines`, marking the cut with an ellipsis.
pub fn wrap_lines(text: &str, max_width: Mm, font_pt: f64, max_lines: usize) -> Vec<String> {
    let mut lines = wrap(text, max_width, font_pt);
    if max_lines > 0 && lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            while !last.is_empty() && text_width(&format!("{last}..."), font_pt) > max_width {
                last.pop();
            }
            last.push_str("...");
        }
    }
    lines
}
