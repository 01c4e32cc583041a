use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::sync::Mutex;
use ttf_parser::Face;

use crate::layout::text::FastTextMeasure;

static TEXT_MEASURER: Lazy<Mutex<TextMeasurer>> = Lazy::new(|| Mutex::new(TextMeasurer::new()));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

impl FontStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            FontStyle::Normal => "normal",
            FontStyle::Italic => "italic",
        }
    }
}

/// Size-invariant font description.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Font {
    pub family: String,
    pub weight: u16,
    pub style: FontStyle,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            family: "sans-serif".to_string(),
            weight: 400,
            style: FontStyle::Normal,
        }
    }
}

impl Font {
    pub fn bold(mut self) -> Self {
        self.weight = 700;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    pub text: String,
    pub font: Font,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub width: f64,
    pub em_height_ascent: f64,
    pub em_height_descent: f64,
}

/// Host-provided text measurement: one metrics entry per box, in order.
pub trait TextMeasure {
    fn measure(&self, font_size: f64, boxes: &[TextBox]) -> Vec<TextMetrics>;
}

impl<T> TextMeasure for T
where
    T: Fn(f64, &[TextBox]) -> Vec<TextMetrics>,
{
    fn measure(&self, font_size: f64, boxes: &[TextBox]) -> Vec<TextMetrics> {
        self(font_size, boxes)
    }
}

/// Measures with the system fonts, falling back to the calibrated per-char
/// table when a face can't be found.
#[derive(Debug, Clone, Copy, Default)]
pub struct FontTextMeasure;

impl TextMeasure for FontTextMeasure {
    fn measure(&self, font_size: f64, boxes: &[TextBox]) -> Vec<TextMetrics> {
        let Ok(mut guard) = TEXT_MEASURER.lock() else {
            return FastTextMeasure.measure(font_size, boxes);
        };
        boxes
            .iter()
            .map(|text_box| {
                guard
                    .measure(&text_box.text, font_size, &text_box.font)
                    .unwrap_or_else(|| FastTextMeasure.measure_one(font_size, text_box))
            })
            .collect()
    }
}

struct TextMeasurer {
    db: Database,
    loaded_system_fonts: bool,
    cache: HashMap<String, Option<FontFace>>,
}

impl TextMeasurer {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            cache: HashMap::new(),
        }
    }

    fn measure(&mut self, text: &str, font_size: f64, font: &Font) -> Option<TextMetrics> {
        if font_size <= 0.0 {
            return Some(TextMetrics {
                width: 0.0,
                em_height_ascent: 0.0,
                em_height_descent: 0.0,
            });
        }
        let key = face_key(font);
        if !self.cache.contains_key(&key) {
            let face = self.load_face(font, &key);
            self.cache.insert(key.clone(), face);
        }
        let face = self.cache.get_mut(&key).and_then(|face| face.as_mut())?;
        let normalized = text.replace('\t', "    ");
        let width = face.measure_width(&normalized, font_size)?;
        let scale = font_size / face.units_per_em as f64;
        Some(TextMetrics {
            width,
            em_height_ascent: face.ascender as f64 * scale,
            em_height_descent: -(face.descender as f64) * scale,
        })
    }

    fn load_face(&mut self, font: &Font, key: &str) -> Option<FontFace> {
        if let Some(face) = load_cached_face(key) {
            return Some(face);
        }
        #[derive(Clone, Copy)]
        enum FamilyToken {
            Generic(fontdb::Family<'static>),
            Name(usize),
        }

        let mut names: Vec<String> = Vec::new();
        let mut order: Vec<FamilyToken> = Vec::new();
        for part in font.family.split(',') {
            let raw = part.trim().trim_matches('"').trim_matches('\'');
            if raw.is_empty() {
                continue;
            }
            match raw.to_ascii_lowercase().as_str() {
                "serif" => order.push(FamilyToken::Generic(Family::Serif)),
                "sans-serif" | "system-ui" | "-apple-system" | "ui-sans-serif" => {
                    order.push(FamilyToken::Generic(Family::SansSerif))
                }
                "monospace" | "ui-monospace" => order.push(FamilyToken::Generic(Family::Monospace)),
                "cursive" => order.push(FamilyToken::Generic(Family::Cursive)),
                "fantasy" => order.push(FamilyToken::Generic(Family::Fantasy)),
                _ => {
                    order.push(FamilyToken::Name(names.len()));
                    names.push(raw.to_string());
                }
            }
        }
        if order.is_empty() {
            order.push(FamilyToken::Generic(Family::SansSerif));
        }
        let families: Vec<Family<'_>> = order
            .into_iter()
            .map(|token| match token {
                FamilyToken::Generic(family) => family,
                FamilyToken::Name(idx) => Family::Name(names[idx].as_str()),
            })
            .collect();

        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
            tracing::debug!(faces = self.db.len(), "loaded system fonts");
        }

        let query = Query {
            families: &families,
            weight: Weight(font.weight),
            stretch: Stretch::Normal,
            style: match font.style {
                FontStyle::Normal => Style::Normal,
                FontStyle::Italic => Style::Italic,
            },
        };
        let Some(id) = self.db.query(&query) else {
            tracing::debug!(family = %font.family, "no matching font face");
            return None;
        };
        let mut loaded: Option<FontFace> = None;
        self.db.with_face_data(id, |data, index| {
            let bytes = data.to_vec();
            if Face::parse(&bytes, index).is_ok() {
                if let Some((font_path, meta_path)) = cache_paths(key)
                    && !font_path.exists()
                {
                    if let Some(parent) = font_path.parent() {
                        let _ = fs::create_dir_all(parent);
                    }
                    let _ = fs::write(&font_path, &bytes);
                    let _ = fs::write(&meta_path, index.to_string());
                }
                loaded = FontFace::new(bytes, index);
            }
        });
        loaded
    }
}

struct FontFace {
    face: Face<'static>,
    units_per_em: u16,
    ascender: i16,
    descender: i16,
    ascii_advances: [u16; 128],
    advance_cache: HashMap<char, Option<u16>>,
    _data: Vec<u8>,
}

impl FontFace {
    fn new(data: Vec<u8>, index: u32) -> Option<Self> {
        let parsed = Face::parse(&data, index).ok()?;
        // SAFETY: `face` borrows the heap buffer of `_data`, which is never
        // mutated and is dropped after `face`.
        let face = unsafe { std::mem::transmute::<Face<'_>, Face<'static>>(parsed) };
        let mut ascii_advances = [0u16; 128];
        for byte in 0u8..=127 {
            if let Some(glyph_id) = face.glyph_index(byte as char) {
                ascii_advances[byte as usize] = face.glyph_hor_advance(glyph_id).unwrap_or(0);
            }
        }
        Some(Self {
            units_per_em: face.units_per_em().max(1),
            ascender: face.ascender(),
            descender: face.descender(),
            face,
            ascii_advances,
            advance_cache: HashMap::new(),
            _data: data,
        })
    }

    fn measure_width(&mut self, text: &str, font_size: f64) -> Option<f64> {
        let scale = font_size / self.units_per_em as f64;
        let fallback = font_size * 0.56;
        let mut width = 0.0f64;
        for ch in text.chars() {
            if ch == '\n' {
                continue;
            }
            let advance = if ch.is_ascii() {
                Some(self.ascii_advances[ch as usize]).filter(|advance| *advance > 0)
            } else if let Some(cached) = self.advance_cache.get(&ch) {
                *cached
            } else {
                let advance = self
                    .face
                    .glyph_index(ch)
                    .and_then(|glyph| self.face.glyph_hor_advance(glyph));
                self.advance_cache.insert(ch, advance);
                advance
            };
            width += advance.map_or(fallback, |advance| advance as f64 * scale);
        }
        Some(width.max(0.0))
    }
}

fn face_key(font: &Font) -> String {
    let family = font.family.trim();
    let family = if family.is_empty() { "sans-serif" } else { family };
    format!("{family}|{}|{}", font.weight, font.style.as_str())
}

fn cache_paths(key: &str) -> Option<(PathBuf, PathBuf)> {
    let base = std::env::var_os("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".cache")))?;
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    key.hash(&mut hasher);
    let hash = hasher.finish();
    let dir = base.join("pcr").join("font-cache");
    Some((dir.join(format!("{hash:x}.font")), dir.join(format!("{hash:x}.meta"))))
}

fn load_cached_face(key: &str) -> Option<FontFace> {
    let (font_path, meta_path) = cache_paths(key)?;
    if !font_path.exists() || !meta_path.exists() {
        return None;
    }
    let bytes = fs::read(font_path).ok()?;
    let index: u32 = fs::read_to_string(meta_path).ok()?.trim().parse().ok()?;
    FontFace::new(bytes, index)
}
