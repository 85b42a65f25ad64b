//! Text measurement against the PDF base-14 font metrics.
//!
//! The layout engine measures text with the advance widths a PDF viewer uses for the
//! built-in Helvetica, Times and Courier faces. The widths are read from the TrueType
//! copies of those faces that printpdf bundles, so wrapping and underline widths match
//! the vector export. The script face is measured as Times bold italic, its fallback.

use crate::fonts::{bundled_font, em_scale};
use crate::scene::FontFace;

/// Half an em, used only if the bundled faces fail to parse.
const UNKNOWN_ADVANCE: f32 = 500.0;

/// Advance width of one character in 1/1000 em. Characters outside WinAnsi measure as
/// the face's missing glyph, which is also what the PDF viewer shows.
pub fn char_advance(face: FontFace, ch: char) -> f32 {
    match bundled_font(face) {
        Some(font) => font
            .glyph(ch)
            .scaled(em_scale(font, 1000.0))
            .h_metrics()
            .advance_width,
        None => UNKNOWN_ADVANCE,
    }
}

/// Width of `text` in points when set in `face` at `size` points.
///
/// ```
/// use certgen::metrics::text_width;
/// use certgen::scene::FontFace;
///
/// // "Hi" in Helvetica: H = 722, i = 222
/// assert!((text_width(FontFace::Helvetica, 10.0, "Hi") - 9.44).abs() < 0.01);
/// assert!((text_width(FontFace::Courier, 10.0, "abc") - 18.0).abs() < 0.01);
/// ```
pub fn text_width(face: FontFace, size: f32, text: &str) -> f32 {
    let units: f32 = text.chars().map(|c| char_advance(face, c)).sum();
    units * size / 1000.0
}

/// Greedy word wrap against a measured width.
///
/// Words are separated by single spaces; a word is appended to the current line while
/// the joined line still fits in `max_width`. A word wider than `max_width` is placed
/// on a line of its own rather than split. Embedded newlines start a new paragraph.
pub fn wrap_text(text: &str, face: FontFace, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let paragraph = paragraph.trim_end_matches('\r');
        let mut current = String::new();
        for word in paragraph.split(' ') {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };
            if text_width(face, size, &candidate) > max_width && !current.is_empty() {
                lines.push(std::mem::replace(&mut current, word.to_string()));
            } else {
                current = candidate;
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    lines
}
