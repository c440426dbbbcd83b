//! Document layout – the intermediate representation between composition
//! and PDF rendering. This is the "frozen" structure that encodes exactly
//! what goes on each page, with every coordinate already resolved.

use serde::{Deserialize, Serialize};

use crate::fonts::FontVariant;

/// A complete report layout ready for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentLayout {
    /// Document title embedded in the PDF metadata.
    #[serde(default = "DocumentLayout::default_title")]
    pub title: String,
    /// Width of each page in PDF points (1 pt = 1/72 inch).
    pub page_width_pt: f32,
    /// Height of each page in PDF points.
    pub page_height_pt: f32,
    /// Ordered list of pages.
    pub pages: Vec<PageLayout>,
}

/// One page of content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageLayout {
    /// Printed page number, as it appears in the footer.
    pub page_number: usize,
    pub boxes: Vec<PlacedBox>,
}

/// A positioned rectangle holding one piece of content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacedBox {
    /// Position relative to page top-left, in points.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub content: BoxContent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BoxContent {
    Text(TextContent),
    /// Index into the build's image list; the invitation, when present,
    /// is always index 0 and photos follow in submission order.
    Image { index: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextContent {
    /// Pre-wrapped lines of text.
    pub lines: Vec<TextLine>,
    pub variant: FontVariant,
    pub size: f32,
    /// RGB in 0..=1.
    pub color: [f32; 3],
    /// Vertical distance between line slots, in points.
    pub line_height: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextLine {
    pub text: String,
    /// X offset within the box (carries alignment).
    pub x_offset: f32,
    /// Baseline offset from the top of the box.
    pub y_offset: f32,
}

impl DocumentLayout {
    /// Create an empty A4 layout.
    pub fn a4() -> Self {
        Self {
            title: Self::default_title(),
            // A4: 210mm x 297mm = 595.28 x 841.89 points
            page_width_pt: 595.28,
            page_height_pt: 841.89,
            pages: Vec::new(),
        }
    }

    fn default_title() -> String {
        "event report".to_string()
    }

    /// Serialise to JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Deserialise from JSON.
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| e.to_string())
    }
}
