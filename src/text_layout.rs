//! Text layout shared by the overlay compositor and the export pipeline.
//!
//! Both consumers wrap, center, and align with the same code; only the
//! [`TextMeasure`] implementation differs (surface metrics on screen, the
//! writer's standard-font metrics on export). That is what keeps the preview
//! and the exported page line-for-line identical.

#[cfg(test)]
#[path = "text_layout_test.rs"]
mod text_layout_test;

use crate::camera::Rect;
use crate::consts::{CAP_HEIGHT_EM, LINE_HEIGHT, TEXT_MARGIN};
use crate::doc::{FontWeight, TextAlign, TextStyle};

/// Font selection for one text run.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub family: String,
    /// Size in the coordinate space the run is laid out in.
    pub size: f64,
    pub weight: FontWeight,
    pub italic: bool,
}

impl FontSpec {
    /// Font for a style, with the size multiplied by `scale`.
    #[must_use]
    pub fn from_style(style: &TextStyle, scale: f64) -> Self {
        Self {
            family: style.font_family.clone(),
            size: style.font_size * scale,
            weight: style.weight,
            italic: style.italic,
        }
    }

    #[must_use]
    pub fn line_height(&self) -> f64 {
        self.size * LINE_HEIGHT
    }
}

/// Width of a text run in a given font.
pub trait TextMeasure {
    fn text_width(&self, font: &FontSpec, text: &str) -> f64;
}

/// One positioned line of a laid-out block.
#[derive(Debug, Clone, PartialEq)]
pub struct LaidLine {
    pub text: String,
    /// Left edge of the run.
    pub x: f64,
    /// Baseline, measured downward from the top of the layout space.
    pub baseline: f64,
    pub width: f64,
}

/// Greedy word wrap against `max_w`.
///
/// Explicit newlines always break. Words are packed while the measured line
/// stays within `max_w`; a single word wider than the line is split by
/// characters. Blank source lines are kept so vertical spacing survives.
pub fn wrap_lines<M: TextMeasure + ?Sized>(measure: &M, font: &FontSpec, text: &str, max_w: f64) -> Vec<String> {
    let mut out = Vec::new();
    for raw_line in text.split('\n') {
        let words: Vec<&str> = raw_line.split_whitespace().collect();
        if words.is_empty() {
            out.push(String::new());
            continue;
        }

        let mut current = String::new();
        for word in words {
            let candidate = if current.is_empty() { word.to_owned() } else { format!("{current} {word}") };
            if measure.text_width(font, &candidate) <= max_w {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            if measure.text_width(font, word) <= max_w {
                current = word.to_owned();
            } else {
                let mut chunks = break_long_word(measure, font, word, max_w);
                if let Some(last) = chunks.pop() {
                    out.extend(chunks);
                    current = last;
                }
            }
        }
        if !current.is_empty() {
            out.push(current);
        }
    }
    out
}

fn break_long_word<M: TextMeasure + ?Sized>(measure: &M, font: &FontSpec, word: &str, max_w: f64) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for ch in word.chars() {
        let mut candidate = current.clone();
        candidate.push(ch);
        if !current.is_empty() && measure.text_width(font, &candidate) > max_w {
            lines.push(current);
            current = ch.to_string();
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Wrap `text` inside `rect`, center the block vertically, and align each line.
///
/// `rect` and `font.size` must share a coordinate space; `margin` is the
/// horizontal inset per side in that same space.
pub fn layout_block<M: TextMeasure + ?Sized>(
    measure: &M,
    font: &FontSpec,
    text: &str,
    rect: Rect,
    align: TextAlign,
    margin: f64,
) -> Vec<LaidLine> {
    let lines = wrap_lines(measure, font, text, rect.width - 2.0 * margin);
    let line_height = font.line_height();
    let total = line_height * lines.len() as f64;
    let start_y = rect.y + (rect.height - total) / 2.0;
    let glyph_offset = (line_height + CAP_HEIGHT_EM * font.size) / 2.0;

    lines
        .into_iter()
        .enumerate()
        .map(|(i, text)| {
            let width = measure.text_width(font, &text);
            let x = match align {
                TextAlign::Left => rect.x + margin,
                TextAlign::Center => rect.x + rect.width / 2.0 - width / 2.0,
                TextAlign::Right => rect.right() - margin - width,
            };
            LaidLine { text, x, baseline: start_y + i as f64 * line_height + glyph_offset, width }
        })
        .filter(|line| !line.text.is_empty())
        .collect()
}

/// [`layout_block`] with the standard text margin scaled by `scale`.
pub fn layout_region_text<M: TextMeasure + ?Sized>(
    measure: &M,
    style: &TextStyle,
    text: &str,
    rect: Rect,
    scale: f64,
) -> Vec<LaidLine> {
    let font = FontSpec::from_style(style, scale);
    layout_block(measure, &font, text, rect, style.align, TEXT_MARGIN * scale)
}

/// Map a character into the export font's repertoire.
///
/// Turkish letters and common typographic punctuation get ASCII stand-ins;
/// anything else outside Latin-1 becomes `?`.
fn substitute(ch: char, out: &mut String) {
    let replacement = match ch {
        'ı' => "i",
        'İ' => "I",
        'ş' => "s",
        'Ş' => "S",
        'ğ' => "g",
        'Ğ' => "G",
        'ü' => "u",
        'Ü' => "U",
        'ö' => "o",
        'Ö' => "O",
        'ç' => "c",
        'Ç' => "C",
        '\u{2018}' | '\u{2019}' | '\u{201A}' => "'",
        '\u{201C}' | '\u{201D}' | '\u{201E}' => "\"",
        '\u{2013}' | '\u{2014}' | '\u{2212}' => "-",
        '\u{2026}' => "...",
        '\u{00A0}' => " ",
        '\u{2022}' => "*",
        c if (c as u32) <= 0xFF => {
            out.push(c);
            return;
        }
        _ => "?",
    };
    out.push_str(replacement);
}

/// Text safe for the export fonts; newlines are preserved.
#[must_use]
pub fn sanitize_for_export(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        substitute(ch, &mut out);
    }
    out
}
