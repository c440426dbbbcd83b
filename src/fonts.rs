//! Font metrics and text measurement using `ttf-parser`.
//!
//! The report is set in a single family, so fonts are keyed by style
//! variant only. Without real font bytes loaded the manager falls back to
//! synthetic Helvetica-like metrics and an average-width heuristic, which
//! keeps wrapping deterministic on machines with no fonts installed.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Style variant of the report's single font family.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontVariant {
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

impl FontVariant {
    pub fn from_flags(bold: bool, italic: bool) -> Self {
        match (bold, italic) {
            (false, false) => FontVariant::Regular,
            (true, false) => FontVariant::Bold,
            (false, true) => FontVariant::Italic,
            (true, true) => FontVariant::BoldItalic,
        }
    }

    pub fn is_bold(self) -> bool {
        matches!(self, FontVariant::Bold | FontVariant::BoldItalic)
    }

    pub fn is_italic(self) -> bool {
        matches!(self, FontVariant::Italic | FontVariant::BoldItalic)
    }
}

/// A loaded font face with metrics.
#[derive(Clone)]
pub struct FontData {
    /// Raw font bytes (kept alive for ttf-parser's zero-copy API). Empty
    /// for the synthetic fallback metrics.
    pub bytes: Vec<u8>,
    pub units_per_em: f32,
    pub ascender: f32,
    pub descender: f32,
}

/// Manages the fonts of the report's family, one entry per variant.
pub struct FontManager {
    fonts: HashMap<FontVariant, FontData>,
}

impl FontManager {
    pub fn new() -> Self {
        Self {
            fonts: HashMap::new(),
        }
    }

    /// Load a TTF/OTF face for one variant from bytes.
    pub fn load_font(&mut self, variant: FontVariant, bytes: Vec<u8>) -> Result<(), String> {
        let face = ttf_parser::Face::parse(&bytes, 0)
            .map_err(|e| format!("failed to parse font: {e}"))?;

        let data = FontData {
            units_per_em: face.units_per_em() as f32,
            ascender: face.ascender() as f32,
            descender: face.descender() as f32,
            bytes,
        };
        self.fonts.insert(variant, data);
        Ok(())
    }

    /// Register synthetic Helvetica-like metrics for every variant that has
    /// no real face yet.
    pub fn ensure_default(&mut self) {
        for variant in [
            FontVariant::Regular,
            FontVariant::Bold,
            FontVariant::Italic,
            FontVariant::BoldItalic,
        ] {
            self.fonts.entry(variant).or_insert(FontData {
                bytes: Vec::new(),
                units_per_em: 1000.0,
                ascender: 750.0,
                descender: -250.0,
            });
        }
    }

    /// Get font data for a variant, falling back to regular.
    pub fn get(&self, variant: FontVariant) -> &FontData {
        self.fonts.get(&variant).unwrap_or_else(|| {
            self.fonts
                .get(&FontVariant::Regular)
                .expect("no fonts registered")
        })
    }

    /// Measure the width of a string at a given size (pt).
    ///
    /// With real font bytes we sum glyph advances. Otherwise an average
    /// character width heuristic (0.5 x size per char, bold ~10 % wider).
    pub fn measure_text_width(&self, text: &str, size: f32, variant: FontVariant) -> f32 {
        let data = self.get(variant);

        if data.bytes.is_empty() {
            let avg = if variant.is_bold() { 0.55 } else { 0.5 };
            return text.chars().count() as f32 * size * avg;
        }

        if let Ok(face) = ttf_parser::Face::parse(&data.bytes, 0) {
            let scale = size / data.units_per_em;
            return text
                .chars()
                .map(|ch| match face.glyph_index(ch) {
                    Some(gid) => face.glyph_hor_advance(gid).unwrap_or(0) as f32 * scale,
                    None => size * 0.5,
                })
                .sum();
        }
        text.chars().count() as f32 * size * 0.5
    }

    /// Baseline offset from the top of a line slot, in pt.
    pub fn ascender_pt(&self, size: f32, variant: FontVariant) -> f32 {
        let data = self.get(variant);
        data.ascender / data.units_per_em * size
    }
}

impl Default for FontManager {
    fn default() -> Self {
        let mut mgr = Self::new();
        mgr.ensure_default();
        mgr
    }
}

/// Word-wrap text to fit within `max_width` pt. Returns at least one line.
pub fn wrap_text(
    text: &str,
    size: f32,
    variant: FontVariant,
    max_width: f32,
    fonts: &FontManager,
) -> Vec<String> {
    if max_width <= 0.0 || text.is_empty() {
        return vec![text.to_string()];
    }

    let mut lines: Vec<String> = Vec::new();
    // Honour embedded newlines, then wrap each run on word boundaries.
    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            if line.is_empty() {
                // A single word wider than the box still gets its own line.
                line.push_str(word);
                continue;
            }
            let joined = format!("{line} {word}");
            if fonts.measure_text_width(&joined, size, variant) > max_width {
                lines.push(std::mem::replace(&mut line, word.to_string()));
            } else {
                line = joined;
            }
        }
        // A paragraph of pure whitespace still occupies a line.
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heuristic_text_width() {
        let mgr = FontManager::default();
        let w = mgr.measure_text_width("Hello", 16.0, FontVariant::Regular);
        // 5 chars x 16 x 0.5 = 40
        assert!((w - 40.0).abs() < 0.1);
    }

    #[test]
    fn bold_heuristic_is_wider() {
        let mgr = FontManager::default();
        let regular = mgr.measure_text_width("Hello", 16.0, FontVariant::Regular);
        let bold = mgr.measure_text_width("Hello", 16.0, FontVariant::Bold);
        assert!(bold > regular);
    }

    #[test]
    fn word_wrap_basic() {
        let mgr = FontManager::default();
        let lines = wrap_text("Hello world foo bar", 16.0, FontVariant::Regular, 60.0, &mgr);
        assert!(lines.len() >= 2, "expected wrapping, got {:?}", lines);
    }

    #[test]
    fn word_wrap_honours_embedded_newlines() {
        let mgr = FontManager::default();
        let lines = wrap_text("one\ntwo", 12.0, FontVariant::Regular, 500.0, &mgr);
        assert_eq!(lines, vec!["one".to_string(), "two".to_string()]);
    }

    #[test]
    fn empty_text_wraps_to_one_empty_line() {
        let mgr = FontManager::default();
        let lines = wrap_text("", 12.0, FontVariant::Regular, 100.0, &mgr);
        assert_eq!(lines, vec![String::new()]);
    }

    #[test]
    fn synthetic_ascender_is_three_quarters_of_size() {
        let mgr = FontManager::default();
        let asc = mgr.ascender_pt(16.0, FontVariant::Regular);
        assert!((asc - 12.0).abs() < 0.01);
    }

    #[test]
    fn variant_from_flags() {
        assert_eq!(FontVariant::from_flags(false, false), FontVariant::Regular);
        assert_eq!(FontVariant::from_flags(true, false), FontVariant::Bold);
        assert_eq!(FontVariant::from_flags(false, true), FontVariant::Italic);
        assert_eq!(FontVariant::from_flags(true, true), FontVariant::BoldItalic);
    }

    #[test]
    fn garbage_bytes_do_not_load() {
        let mut mgr = FontManager::default();
        assert!(mgr
            .load_font(FontVariant::Regular, b"not a font".to_vec())
            .is_err());
    }
}
