//! Document canvas capability
//!
//! The layout engine only ever talks to a [`Canvas`]: page management, font
//! selection, text measurement, text and line drawing, and serialization.
//! Coordinates are in document units (see [`Unit`]) with the origin at the
//! top-left corner of the page and `y` growing downwards; text is anchored at
//! its baseline.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Failures raised by a canvas. The engine never recovers from these.
#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("unknown font family `{family}` ({style:?})")]
    UnknownFont { family: String, style: FontStyle },

    #[error("invalid font data for `{id}`: {reason}")]
    InvalidFont { id: String, reason: String },

    #[error("page {index} out of range (document has {count} pages)")]
    PageOutOfRange { index: usize, count: usize },

    #[error("PDF serialization failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("display list serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Measurement unit of a canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Mm,
    Pt,
}

impl Unit {
    /// Points per document unit.
    pub fn scale(self) -> f32 {
        match self {
            Unit::Mm => 72.0 / 25.4,
            Unit::Pt => 1.0,
        }
    }
}

/// Fixed page size, in document units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageFormat {
    pub width: f32,
    pub height: f32,
    pub unit: Unit,
}

impl PageFormat {
    /// ISO A4 portrait.
    pub const A4: PageFormat = PageFormat {
        width: 210.0,
        height: 297.0,
        unit: Unit::Mm,
    };

    /// US Letter portrait.
    pub const LETTER: PageFormat = PageFormat {
        width: 215.9,
        height: 279.4,
        unit: Unit::Mm,
    };

    pub fn new(width: f32, height: f32, unit: Unit) -> Self {
        Self {
            width,
            height,
            unit,
        }
    }

    pub fn width_pt(&self) -> f32 {
        self.width * self.unit.scale()
    }

    pub fn height_pt(&self) -> f32 {
        self.height * self.unit.scale()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    Normal,
    Bold,
}

impl FontStyle {
    /// Parses the style names a host passes when registering fonts.
    pub fn parse(style: &str) -> Option<Self> {
        match style.trim().to_ascii_lowercase().as_str() {
            "" | "normal" | "regular" => Some(FontStyle::Normal),
            "bold" => Some(FontStyle::Bold),
            _ => None,
        }
    }
}

/// Family, style and size (in points) of the active font.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub family: String,
    pub style: FontStyle,
    pub size: f32,
}

impl FontSpec {
    pub fn new(family: impl Into<String>, style: FontStyle, size: f32) -> Self {
        Self {
            family: family.into(),
            style,
            size,
        }
    }
}

/// Measured extent of a (possibly wrapped) string, in document units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextDimensions {
    pub w: f32,
    pub h: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Justify,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextOptions {
    /// Wrap width in document units; `None` draws a single run per hard line.
    pub max_width: Option<f32>,
    pub align: Align,
}

impl TextOptions {
    pub fn wrapped(max_width: f32, align: Align) -> Self {
        Self {
            max_width: Some(max_width),
            align,
        }
    }
}

/// A custom font file registered under a family id.
#[derive(Debug, Clone, PartialEq)]
pub struct FontResource {
    pub id: String,
    pub style: FontStyle,
    pub data: Arc<Vec<u8>>,
}

impl FontResource {
    pub fn new(id: impl Into<String>, style: FontStyle, data: Vec<u8>) -> Self {
        Self {
            id: id.into(),
            style,
            data: Arc::new(data),
        }
    }

    /// Reads a TrueType/OpenType file from disk.
    pub fn from_path(
        path: impl AsRef<std::path::Path>,
        id: impl Into<String>,
        style: FontStyle,
    ) -> Result<Self, CanvasError> {
        let data = std::fs::read(path)?;
        Ok(Self::new(id, style, data))
    }
}

/// Paginated drawing surface consumed by the layout engine.
pub trait Canvas {
    /// Discards all content and starts a fresh one-page document.
    fn reset(&mut self) -> Result<(), CanvasError>;

    /// Appends a page and returns its index. The active page is unchanged.
    fn add_page(&mut self) -> Result<usize, CanvasError>;

    fn set_page(&mut self, index: usize) -> Result<(), CanvasError>;

    fn page_count(&self) -> usize;

    fn current_page(&self) -> usize;

    fn set_font(&mut self, font: &FontSpec) -> Result<(), CanvasError>;

    /// Measures `text` with the active font without drawing it.
    fn text_dimensions(&self, text: &str, max_width: Option<f32>) -> TextDimensions;

    fn draw_text(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        options: TextOptions,
    ) -> Result<(), CanvasError>;

    fn draw_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Result<(), CanvasError>;

    fn register_font(&mut self, resource: &FontResource) -> Result<(), CanvasError>;

    fn page_width(&self) -> f32;

    fn page_height(&self) -> f32;

    /// Serializes the finished document.
    fn output(&mut self) -> Result<Vec<u8>, CanvasError>;

    /// MIME type of [`Canvas::output`].
    fn media_type(&self) -> &'static str;
}
