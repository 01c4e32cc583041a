use unicode_segmentation::UnicodeSegmentation;

use crate::text_metrics::{TextBox, TextMeasure, TextMetrics};

pub const ELLIPSIS: &str = "…";

const BOLD_WIDTH_FACTOR: f64 = 1.06;
const ASCENT_RATIO: f64 = 0.75;
const DESCENT_RATIO: f64 = 0.25;

/// Font-independent measurement from a calibrated per-character width table.
/// Deterministic, which makes it the measurer of choice for tests and
/// reproducible output.
#[derive(Debug, Clone, Copy, Default)]
pub struct FastTextMeasure;

impl FastTextMeasure {
    pub fn measure_one(&self, font_size: f64, text_box: &TextBox) -> TextMetrics {
        let mut width = fallback_text_width(&text_box.text, font_size);
        if text_box.font.weight >= 600 {
            width *= BOLD_WIDTH_FACTOR;
        }
        TextMetrics {
            width,
            em_height_ascent: font_size * ASCENT_RATIO,
            em_height_descent: font_size * DESCENT_RATIO,
        }
    }
}

impl TextMeasure for FastTextMeasure {
    fn measure(&self, font_size: f64, boxes: &[TextBox]) -> Vec<TextMetrics> {
        boxes
            .iter()
            .map(|text_box| self.measure_one(font_size, text_box))
            .collect()
    }
}

pub(crate) fn char_width_factor(ch: char) -> f64 {
    // Per-character advance widths of a typical sans-serif face, in ems.
    match ch {
        ' ' => 0.306,
        '\\' | '.' | ',' | ':' | ';' | '|' | '!' | '(' | ')' | '[' | ']' | '{' | '}' => 0.321,
        'A' => 0.652,
        'B' => 0.648,
        'C' => 0.734,
        'D' => 0.723,
        'E' => 0.594,
        'F' => 0.575,
        'G' | 'H' => 0.742,
        'I' => 0.272,
        'J' => 0.557,
        'K' => 0.648,
        'L' => 0.559,
        'M' => 0.903,
        'N' => 0.763,
        'O' => 0.754,
        'P' => 0.623,
        'Q' => 0.755,
        'R' => 0.637,
        'S' => 0.633,
        'T' => 0.599,
        'U' => 0.746,
        'V' => 0.661,
        'W' => 0.958,
        'X' => 0.655,
        'Y' => 0.646,
        'Z' => 0.621,
        'a' => 0.550,
        'b' => 0.603,
        'c' => 0.547,
        'd' => 0.609,
        'e' => 0.570,
        'f' => 0.340,
        'g' | 'h' => 0.600,
        'i' => 0.235,
        'j' => 0.227,
        'k' => 0.522,
        'l' => 0.239,
        'm' => 0.867,
        'n' => 0.585,
        'o' => 0.574,
        'p' => 0.595,
        'q' => 0.585,
        'r' => 0.364,
        's' => 0.523,
        't' => 0.305,
        'u' => 0.585,
        'v' => 0.545,
        'w' => 0.811,
        'x' => 0.538,
        'y' => 0.556,
        'z' => 0.550,
        '0' => 0.613,
        '1' => 0.396,
        '2' => 0.609,
        '3' => 0.597,
        '4' => 0.614,
        '5' => 0.586,
        '6' => 0.608,
        '7' => 0.559,
        '8' => 0.611,
        '9' => 0.595,
        '@' | '#' | '%' | '&' => 0.946,
        '…' => 0.821,
        _ => 0.568,
    }
}

fn fallback_text_width(text: &str, font_size: f64) -> f64 {
    text.chars()
        .filter(|ch| *ch != '\n')
        .map(char_width_factor)
        .sum::<f64>()
        * font_size
}

pub(crate) fn grapheme_count(text: &str) -> usize {
    text.graphemes(true).count()
}

/// First `length` grapheme clusters of `text`, with an ellipsis appended when
/// anything was cut.
pub(crate) fn cut_to_length(text: &str, length: usize) -> String {
    let mut graphemes = text.graphemes(true);
    let head: String = graphemes.by_ref().take(length).collect();
    if graphemes.next().is_some() {
        format!("{head}{ELLIPSIS}")
    } else {
        head
    }
}

/// Rounds to two decimals and drops a zero fraction.
pub(crate) fn format_number(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if (rounded - rounded.round()).abs() < 0.001 {
        format!("{:.0}", rounded)
    } else {
        format!("{:.2}", rounded)
    }
}
