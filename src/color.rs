use serde::{Deserialize, Serialize};

pub const WCAG_AA_CONTRAST: f64 = 4.5;

/// Luminance at which black and white text reach the same contrast.
const DARK_LUMINANCE_THRESHOLD: f64 = 0.179;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::opaque(0, 0, 0);
    pub const WHITE: Rgba = Rgba::opaque(255, 255, 255);

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn to_css(self) -> String {
        if self.a >= 1.0 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("rgba({},{},{},{})", self.r, self.g, self.b, round_alpha(self.a))
        }
    }

    pub fn inverted(self) -> Self {
        Self {
            r: 255 - self.r,
            g: 255 - self.g,
            b: 255 - self.b,
            a: self.a,
        }
    }

    pub fn with_alpha(self, a: f64) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }
}

fn round_alpha(a: f64) -> f64 {
    (a * 1000.0).round() / 1000.0
}

/// Whether to push fill text toward a minimum contrast against its shape.
/// `true` uses [`WCAG_AA_CONTRAST`]; a number sets the ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextContrast {
    Enabled(bool),
    Ratio(f64),
}

impl Default for TextContrast {
    fn default() -> Self {
        TextContrast::Enabled(false)
    }
}

impl TextContrast {
    pub fn ratio(self) -> Option<f64> {
        match self {
            TextContrast::Enabled(true) => Some(WCAG_AA_CONTRAST),
            TextContrast::Enabled(false) => None,
            TextContrast::Ratio(ratio) => Some(ratio),
        }
    }
}

/// Parses `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb()`, `rgba()` and a
/// handful of keywords.
pub fn parse_color(input: &str) -> Option<Rgba> {
    let value = input.trim().to_ascii_lowercase();
    if let Some(hex) = value.strip_prefix('#') {
        return parse_hex(hex);
    }
    if let Some(args) = value
        .strip_prefix("rgba(")
        .or_else(|| value.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return parse_rgb_args(args);
    }
    match value.as_str() {
        "black" => Some(Rgba::BLACK),
        "white" => Some(Rgba::WHITE),
        "red" => Some(Rgba::opaque(255, 0, 0)),
        "green" => Some(Rgba::opaque(0, 128, 0)),
        "blue" => Some(Rgba::opaque(0, 0, 255)),
        "gray" | "grey" => Some(Rgba::opaque(128, 128, 128)),
        "transparent" => Some(Rgba::BLACK.with_alpha(0.0)),
        _ => None,
    }
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => Some(Rgba::opaque(nibble(0)?, nibble(1)?, nibble(2)?)),
        4 => Some(Rgba::opaque(nibble(0)?, nibble(1)?, nibble(2)?).with_alpha(nibble(3)? as f64 / 255.0)),
        6 => Some(Rgba::opaque(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Rgba::opaque(byte(0)?, byte(2)?, byte(4)?).with_alpha(byte(6)? as f64 / 255.0)),
        _ => None,
    }
}

fn parse_rgb_args(args: &str) -> Option<Rgba> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let channel = |s: &str| -> Option<u8> {
        let v: f64 = s.parse().ok()?;
        v.is_finite().then(|| v.round().clamp(0.0, 255.0) as u8)
    };
    let color = Rgba::opaque(channel(parts[0])?, channel(parts[1])?, channel(parts[2])?);
    match parts.get(3) {
        Some(alpha) => {
            let a: f64 = alpha.parse().ok()?;
            a.is_finite().then(|| color.with_alpha(a))
        }
        None => Some(color),
    }
}

pub fn is_color_valid(input: &str) -> bool {
    parse_color(input).is_some()
}

/// `foreground` composited over `background` with source-over alpha.
pub fn combine_colors(foreground: Rgba, background: Rgba) -> Rgba {
    let alpha = foreground.a + background.a * (1.0 - foreground.a);
    if alpha <= 0.0 {
        return Rgba::BLACK.with_alpha(0.0);
    }
    let mix = |f: u8, b: u8| {
        let value = (f as f64 * foreground.a + b as f64 * background.a * (1.0 - foreground.a)) / alpha;
        value.round().clamp(0.0, 255.0) as u8
    };
    Rgba {
        r: mix(foreground.r, background.r),
        g: mix(foreground.g, background.g),
        b: mix(foreground.b, background.b),
        a: alpha,
    }
}

fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.03928 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

pub fn relative_luminance(color: Rgba) -> f64 {
    let r = srgb_to_linear(color.r as f64 / 255.0);
    let g = srgb_to_linear(color.g as f64 / 255.0);
    let b = srgb_to_linear(color.b as f64 / 255.0);
    0.2126 * r + 0.7152 * g + 0.0722 * b
}

pub fn contrast_ratio(fg: Rgba, bg: Rgba) -> f64 {
    let lum_fg = relative_luminance(fg);
    let lum_bg = relative_luminance(bg);
    (lum_fg.max(lum_bg) + 0.05) / (lum_fg.min(lum_bg) + 0.05)
}

pub fn color_is_dark(color: Rgba) -> bool {
    relative_luminance(color) < DARK_LUMINANCE_THRESHOLD
}

/// Keeps `fg` if it reaches `ratio` against `bg`, else picks black or white,
/// whichever contrasts more.
pub fn make_high_contrast_color(fg: Rgba, bg: Rgba, ratio: f64) -> Rgba {
    if contrast_ratio(fg, bg) >= ratio {
        return fg;
    }
    if contrast_ratio(Rgba::WHITE, bg) > contrast_ratio(Rgba::BLACK, bg) {
        Rgba::WHITE
    } else {
        Rgba::BLACK
    }
}

/// Text colour for a label painted over `fill_color`, which itself sits on
/// `background_color`.
pub fn fill_text_color(
    text_color: &str,
    text_invertible: bool,
    text_contrast: TextContrast,
    fill_color: &str,
    background_color: &str,
) -> String {
    let Some(text) = parse_color(text_color) else {
        tracing::warn!(color = text_color, "invalid text color");
        return text_color.to_string();
    };
    let Some(fill) = parse_color(fill_color) else {
        return text_color.to_string();
    };

    let background = parse_color(background_color).filter(|bg| bg.a >= 1.0);
    let Some(background) = background else {
        if background_color != "transparent" {
            tracing::debug!(
                background = background_color,
                "text contrast needs an opaque background color"
            );
        }
        if text_invertible && color_is_dark(fill) == color_is_dark(text) {
            return text.inverted().to_css();
        }
        return text_color.to_string();
    };

    let behind_text = combine_colors(fill, background);
    let mut adjusted = text;
    let mut changed = false;
    if text_invertible && color_is_dark(behind_text) == color_is_dark(text) {
        adjusted = text.inverted();
        changed = true;
    }
    if let Some(ratio) = text_contrast.ratio() {
        let contrasted = make_high_contrast_color(adjusted, behind_text, ratio);
        changed |= contrasted != adjusted;
        adjusted = contrasted;
    }
    if changed {
        adjusted.to_css()
    } else {
        text_color.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_notations() {
        assert_eq!(parse_color("#fff"), Some(Rgba::WHITE));
        assert_eq!(parse_color("#000000"), Some(Rgba::BLACK));
        assert_eq!(parse_color("rgb(255, 0, 0)"), Some(Rgba::opaque(255, 0, 0)));
        let translucent = parse_color("rgba(128,0,0,0.5)").expect("rgba parses");
        assert_eq!((translucent.r, translucent.a), (128, 0.5));
        let hex_alpha = parse_color("#ff000080").expect("hex alpha parses");
        assert!((hex_alpha.a - 128.0 / 255.0).abs() < 1e-9);
        assert_eq!(parse_color("transparent").map(|c| c.a), Some(0.0));
        assert_eq!(parse_color("#ggg"), None);
        assert_eq!(parse_color("rgb(1,2)"), None);
        assert_eq!(parse_color("chartreuse-ish"), None);
    }

    #[test]
    fn css_round_trips_opaque_and_translucent() {
        assert_eq!(Rgba::opaque(255, 0, 16).to_css(), "#ff0010");
        assert_eq!(Rgba::opaque(128, 0, 0).with_alpha(0.5).to_css(), "rgba(128,0,0,0.5)");
    }

    #[test]
    fn half_transparent_red_over_white_is_pink() {
        let combined = combine_colors(Rgba::opaque(255, 0, 0).with_alpha(0.5), Rgba::WHITE);
        assert_eq!((combined.r, combined.g, combined.b), (255, 128, 128));
        assert_eq!(combined.a, 1.0);
    }

    #[test]
    fn contrast_of_black_on_white_is_21() {
        assert!((contrast_ratio(Rgba::BLACK, Rgba::WHITE) - 21.0).abs() < 1e-9);
        assert!(color_is_dark(Rgba::BLACK));
        assert!(!color_is_dark(Rgba::WHITE));
    }

    #[test]
    fn invertible_text_flips_on_same_darkness() {
        let color = fill_text_color("#000000", true, TextContrast::default(), "#101010", "#ffffff");
        assert_eq!(color, "#ffffff");
        let kept = fill_text_color("#000000", true, TextContrast::default(), "#f0f0f0", "#ffffff");
        assert_eq!(kept, "#000000");
    }

    #[test]
    fn non_invertible_text_is_left_alone() {
        let color = fill_text_color("#000000", false, TextContrast::default(), "#101010", "#ffffff");
        assert_eq!(color, "#000000");
    }

    #[test]
    fn contrast_request_picks_legible_extreme() {
        let color = fill_text_color("#777777", false, TextContrast::Enabled(true), "#202020", "#ffffff");
        assert_eq!(color, "#ffffff");
    }

    #[test]
    fn translucent_background_falls_back_to_fill_only() {
        let color = fill_text_color(
            "#000000",
            true,
            TextContrast::Ratio(7.0),
            "#000000",
            "rgba(255,255,255,0.5)",
        );
        assert_eq!(color, "#ffffff");
    }
}
