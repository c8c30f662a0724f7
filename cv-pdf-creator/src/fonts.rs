//! Font management for CV typesetting
//!
//! Standard PDF faces (Helvetica, Times, Courier) are measured from their AFM
//! width tables; custom TrueType/OpenType faces are loaded with fontdue and
//! measured from their own advances and pair kerning. Widths are kept in
//! 1/1000 em, the unit PDF font dictionaries use.

use crate::canvas::{Align, CanvasError, FontResource, FontSpec, FontStyle, TextDimensions, Unit};
use crate::typography::{justify_line, FormattedLine, TextLayoutEngine};
use fontdue::{Font, FontSettings};
use log::warn;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Anything that can report the advance width of a string at a fixed size.
pub trait TextMeasure {
    /// Width of `text` in points.
    fn text_width(&self, text: &str) -> f32;
}

// AFM advance widths for printable ASCII (0x20..=0x7E), 1/1000 em.
// Index = (char as usize) - 0x20.

#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

#[rustfmt::skip]
const TIMES_WIDTHS: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];

#[rustfmt::skip]
const TIMES_BOLD_WIDTHS: [u16; 95] = [
    250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 570, 570, 570, 500,
    930, 722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944, 722, 778,
    611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667, 333, 278, 333, 581, 500,
    333, 500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833, 556, 500,
    556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444, 394, 220, 394, 520,
];

const COURIER_WIDTHS: [u16; 95] = [600; 95];

// bullet, en dash, em dash, single quotes, double quotes, ellipsis, euro
const HELVETICA_EXTRAS: &[(char, u16)] = &[
    ('\u{2022}', 350), ('\u{2013}', 556), ('\u{2014}', 1000), ('\u{2018}', 222),
    ('\u{2019}', 222), ('\u{201C}', 333), ('\u{201D}', 333), ('\u{2026}', 1000),
    ('\u{20AC}', 556),
];

const HELVETICA_BOLD_EXTRAS: &[(char, u16)] = &[
    ('\u{2022}', 350), ('\u{2013}', 556), ('\u{2014}', 1000), ('\u{2018}', 278),
    ('\u{2019}', 278), ('\u{201C}', 500), ('\u{201D}', 500), ('\u{2026}', 1000),
    ('\u{20AC}', 556),
];

const TIMES_EXTRAS: &[(char, u16)] = &[
    ('\u{2022}', 350), ('\u{2013}', 500), ('\u{2014}', 1000), ('\u{2018}', 333),
    ('\u{2019}', 333), ('\u{201C}', 444), ('\u{201D}', 444), ('\u{2026}', 1000),
    ('\u{20AC}', 500),
];

const TIMES_BOLD_EXTRAS: &[(char, u16)] = &[
    ('\u{2022}', 350), ('\u{2013}', 500), ('\u{2014}', 1000), ('\u{2018}', 333),
    ('\u{2019}', 333), ('\u{201C}', 500), ('\u{201D}', 500), ('\u{2026}', 1000),
    ('\u{20AC}', 500),
];

// Accented Latin-1 letters (U+00C0..=U+00FF) are measured as their base letter.
const LATIN1_BASE: &[u8] = b"AAAAAAACEEEEIIIIDNOOOOO+OUUUUYPbaaaaaaaceeeeiiiionooooo+ouuuuypy";

struct StandardMetrics {
    base_font: &'static str,
    widths: &'static [u16; 95],
    average: u16,
    extras: &'static [(char, u16)],
}

const HELVETICA: StandardMetrics = StandardMetrics {
    base_font: "Helvetica",
    widths: &HELVETICA_WIDTHS,
    average: 556,
    extras: HELVETICA_EXTRAS,
};

const HELVETICA_BOLD: StandardMetrics = StandardMetrics {
    base_font: "Helvetica-Bold",
    widths: &HELVETICA_BOLD_WIDTHS,
    average: 556,
    extras: HELVETICA_BOLD_EXTRAS,
};

const TIMES: StandardMetrics = StandardMetrics {
    base_font: "Times-Roman",
    widths: &TIMES_WIDTHS,
    average: 500,
    extras: TIMES_EXTRAS,
};

const TIMES_BOLD: StandardMetrics = StandardMetrics {
    base_font: "Times-Bold",
    widths: &TIMES_BOLD_WIDTHS,
    average: 500,
    extras: TIMES_BOLD_EXTRAS,
};

const COURIER: StandardMetrics = StandardMetrics {
    base_font: "Courier",
    widths: &COURIER_WIDTHS,
    average: 600,
    extras: &[],
};

const COURIER_BOLD: StandardMetrics = StandardMetrics {
    base_font: "Courier-Bold",
    widths: &COURIER_WIDTHS,
    average: 600,
    extras: &[],
};

/// The base-14 families every PDF viewer provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardFamily {
    Helvetica,
    Times,
    Courier,
}

impl StandardFamily {
    /// Case-insensitive lookup, including the usual CSS-style aliases.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "helvetica" | "arial" | "sans-serif" => Some(StandardFamily::Helvetica),
            "times" | "times-roman" | "times new roman" | "serif" => Some(StandardFamily::Times),
            "courier" | "courier new" | "monospace" => Some(StandardFamily::Courier),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StandardFace {
    pub family: StandardFamily,
    pub style: FontStyle,
}

impl StandardFace {
    pub fn new(family: StandardFamily, style: FontStyle) -> Self {
        Self { family, style }
    }

    fn metrics(&self) -> &'static StandardMetrics {
        match (self.family, self.style) {
            (StandardFamily::Helvetica, FontStyle::Normal) => &HELVETICA,
            (StandardFamily::Helvetica, FontStyle::Bold) => &HELVETICA_BOLD,
            (StandardFamily::Times, FontStyle::Normal) => &TIMES,
            (StandardFamily::Times, FontStyle::Bold) => &TIMES_BOLD,
            (StandardFamily::Courier, FontStyle::Normal) => &COURIER,
            (StandardFamily::Courier, FontStyle::Bold) => &COURIER_BOLD,
        }
    }

    /// PostScript name written as `/BaseFont`.
    pub fn base_font(&self) -> &'static str {
        self.metrics().base_font
    }

    /// Advance width in 1/1000 em.
    pub fn char_width(&self, ch: char) -> u16 {
        let metrics = self.metrics();
        let code = ch as u32;
        match code {
            0x20..=0x7E => metrics.widths[(code - 0x20) as usize],
            0xA0 => metrics.widths[0],
            0xC0..=0xFF => LATIN1_BASE
                .get((code - 0xC0) as usize)
                .map(|base| metrics.widths[(*base - 0x20) as usize])
                .unwrap_or(metrics.average),
            _ => metrics
                .extras
                .iter()
                .find(|(extra, _)| *extra == ch)
                .map(|(_, width)| *width)
                .unwrap_or(metrics.average),
        }
    }
}

/// Maps a character to its WinAnsiEncoding byte, if it has one.
pub fn win_ansi_byte(ch: char) -> Option<u8> {
    let byte = match ch {
        ' '..='~' => ch as u8,
        '\u{A0}'..='\u{FF}' => ch as u32 as u8,
        '\u{20AC}' => 0x80,
        '\u{201A}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201E}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02C6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8A,
        '\u{2039}' => 0x8B,
        '\u{0152}' => 0x8C,
        '\u{017D}' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02DC}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9A,
        '\u{203A}' => 0x9B,
        '\u{0153}' => 0x9C,
        '\u{017E}' => 0x9E,
        '\u{0178}' => 0x9F,
        _ => return None,
    };
    Some(byte)
}

/// A TrueType/OpenType face registered by the host.
pub struct CustomFace {
    pub id: String,
    pub style: FontStyle,
    pub font: Font,
    pub data: Arc<Vec<u8>>,
}

impl fmt::Debug for CustomFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomFace")
            .field("id", &self.id)
            .field("style", &self.style)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl CustomFace {
    pub fn parse(resource: &FontResource) -> Result<Self, CanvasError> {
        let font = Font::from_bytes(resource.data.as_slice(), FontSettings::default()).map_err(
            |reason| CanvasError::InvalidFont {
                id: resource.id.clone(),
                reason: reason.to_string(),
            },
        )?;
        Ok(Self {
            id: resource.id.clone(),
            style: resource.style,
            font,
            data: Arc::clone(&resource.data),
        })
    }

    /// CFF-flavoured OpenType files need `FontFile3` instead of `FontFile2`.
    pub fn is_cff(&self) -> bool {
        self.data.starts_with(b"OTTO")
    }

    pub fn glyph_id(&self, ch: char) -> u16 {
        self.font.lookup_glyph_index(ch)
    }

    /// Advance width in 1/1000 em.
    pub fn char_width(&self, ch: char) -> f32 {
        self.font.metrics(ch, 1000.0).advance_width
    }

    /// Pair kerning in 1/1000 em (negative tightens).
    pub fn kern(&self, left: char, right: char) -> f32 {
        self.font.horizontal_kern(left, right, 1000.0).unwrap_or(0.0)
    }

    /// Ascent and descent in 1/1000 em.
    pub fn vertical_metrics(&self) -> (f32, f32) {
        self.font
            .horizontal_line_metrics(1000.0)
            .map(|m| (m.ascent, m.descent))
            .unwrap_or((800.0, -200.0))
    }
}

/// A resolved face: either a base-14 font or a registered custom font.
#[derive(Debug, Clone)]
pub enum FontFace {
    Standard(StandardFace),
    Custom(Arc<CustomFace>),
}

impl FontFace {
    /// Identity used to share one PDF font object between draw calls.
    pub fn key(&self) -> String {
        match self {
            FontFace::Standard(face) => face.base_font().to_string(),
            FontFace::Custom(face) => format!("custom:{}:{:?}", face.id, face.style),
        }
    }

    pub fn char_width(&self, ch: char) -> f32 {
        match self {
            FontFace::Standard(face) => face.char_width(ch) as f32,
            FontFace::Custom(face) => face.char_width(ch),
        }
    }

    pub fn kern(&self, left: char, right: char) -> f32 {
        match self {
            FontFace::Standard(_) => 0.0,
            FontFace::Custom(face) => face.kern(left, right),
        }
    }

    /// Width of `text` in 1/1000 em, kerning included.
    pub fn text_width_1000(&self, text: &str) -> f32 {
        let mut width = 0.0;
        let mut previous = None;
        for ch in text.chars() {
            if let Some(prev) = previous {
                width += self.kern(prev, ch);
            }
            width += self.char_width(ch);
            previous = Some(ch);
        }
        width
    }
}

/// Registry of custom faces plus the standard families.
#[derive(Debug, Clone, Default)]
pub struct FontBook {
    custom: BTreeMap<String, BTreeMap<FontStyle, Arc<CustomFace>>>,
}

impl FontBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, resource: &FontResource) -> Result<(), CanvasError> {
        let face = CustomFace::parse(resource)?;
        self.custom
            .entry(resource.id.trim().to_ascii_lowercase())
            .or_default()
            .insert(resource.style, Arc::new(face));
        Ok(())
    }

    pub fn clear_custom(&mut self) {
        self.custom.clear();
    }

    pub fn has_custom(&self, family: &str) -> bool {
        self.custom.contains_key(&family.trim().to_ascii_lowercase())
    }

    /// Finds the face for `family`/`style`. Custom families shadow standard ones.
    pub fn resolve(&self, family: &str, style: FontStyle) -> Result<FontFace, CanvasError> {
        let key = family.trim().to_ascii_lowercase();
        if let Some(styles) = self.custom.get(&key) {
            if let Some(face) = styles.get(&style) {
                return Ok(FontFace::Custom(Arc::clone(face)));
            }
            if let Some((registered, face)) = styles.iter().next() {
                warn!(
                    "font `{}` has no {:?} variant, using {:?}",
                    family, style, registered
                );
                return Ok(FontFace::Custom(Arc::clone(face)));
            }
        }

        StandardFamily::from_name(&key)
            .map(|standard| FontFace::Standard(StandardFace::new(standard, style)))
            .ok_or_else(|| CanvasError::UnknownFont {
                family: family.to_string(),
                style,
            })
    }
}

/// A face bound to a point size.
#[derive(Debug, Clone, Copy)]
pub struct SizedFont<'a> {
    pub face: &'a FontFace,
    pub size: f32,
}

impl TextMeasure for SizedFont<'_> {
    fn text_width(&self, text: &str) -> f32 {
        self.face.text_width_1000(text) * self.size / 1000.0
    }
}

/// Font state shared by every canvas: the font book, the active face and the
/// unit conversion used for measurement.
#[derive(Debug, Clone)]
pub struct FontContext {
    book: FontBook,
    face: FontFace,
    spec: FontSpec,
    scale: f32,
}

impl FontContext {
    /// Line advance as a multiple of the font size.
    pub const LINE_HEIGHT_FACTOR: f32 = 1.15;
    pub const DEFAULT_SIZE: f32 = 16.0;

    pub fn new(unit: Unit) -> Self {
        Self {
            book: FontBook::new(),
            face: Self::default_face(),
            spec: FontSpec::new("helvetica", FontStyle::Normal, Self::DEFAULT_SIZE),
            scale: unit.scale(),
        }
    }

    fn default_face() -> FontFace {
        FontFace::Standard(StandardFace::new(StandardFamily::Helvetica, FontStyle::Normal))
    }

    /// Drops custom faces and returns to the default font.
    pub fn reset(&mut self) {
        self.book.clear_custom();
        self.face = Self::default_face();
        self.spec = FontSpec::new("helvetica", FontStyle::Normal, Self::DEFAULT_SIZE);
    }

    pub fn register(&mut self, resource: &FontResource) -> Result<(), CanvasError> {
        self.book.register(resource)
    }

    pub fn set_font(&mut self, spec: &FontSpec) -> Result<(), CanvasError> {
        self.face = self.book.resolve(&spec.family, spec.style)?;
        self.spec = spec.clone();
        Ok(())
    }

    pub fn face(&self) -> &FontFace {
        &self.face
    }

    pub fn spec(&self) -> &FontSpec {
        &self.spec
    }

    pub fn size(&self) -> f32 {
        self.spec.size
    }

    /// Points per document unit.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn sized(&self) -> SizedFont<'_> {
        SizedFont {
            face: &self.face,
            size: self.spec.size,
        }
    }

    /// Baseline-to-baseline distance in document units.
    pub fn line_height(&self) -> f32 {
        self.spec.size * Self::LINE_HEIGHT_FACTOR / self.scale
    }

    /// Breaks `text` into lines (widths in points) with the active font.
    pub fn layout(&self, text: &str, max_width: Option<f32>, align: Align) -> Vec<FormattedLine> {
        let limit = max_width.map(|width| width * self.scale);
        let mut lines = TextLayoutEngine::new(self.sized()).wrap(text, limit);
        if let (Align::Justify, Some(limit)) = (align, limit) {
            for line in &mut lines {
                justify_line(line, limit);
            }
        }
        lines
    }

    pub fn dimensions(&self, text: &str, max_width: Option<f32>) -> TextDimensions {
        let lines = self.layout(text, max_width, Align::Left);
        let widest = lines.iter().map(|line| line.width).fold(0.0, f32::max);
        TextDimensions {
            w: widest / self.scale,
            h: lines.len() as f32 * self.line_height(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn helvetica(style: FontStyle) -> FontFace {
        FontFace::Standard(StandardFace::new(StandardFamily::Helvetica, style))
    }

    #[test]
    fn test_latin1_base_table_covers_block() {
        assert_eq!(LATIN1_BASE.len(), 64);
        assert!(LATIN1_BASE.iter().all(|b| (0x20..=0x7E).contains(b)));
    }

    #[test]
    fn test_helvetica_widths() {
        let face = helvetica(FontStyle::Normal);
        assert_eq!(face.text_width_1000("Hi"), 722.0 + 222.0);
        assert_eq!(face.text_width_1000(" "), 278.0);
        let bold = helvetica(FontStyle::Bold);
        assert!(bold.text_width_1000("Skills") > face.text_width_1000("Skills"));
    }

    #[test]
    fn test_accented_letters_use_base_width() {
        let face = StandardFace::new(StandardFamily::Times, FontStyle::Normal);
        assert_eq!(face.char_width('é'), face.char_width('e'));
        assert_eq!(face.char_width('Ü'), face.char_width('U'));
    }

    #[test]
    fn test_courier_is_monospaced() {
        let face = FontFace::Standard(StandardFace::new(StandardFamily::Courier, FontStyle::Bold));
        assert_eq!(face.text_width_1000("iiii"), face.text_width_1000("MMMM"));
        assert_eq!(face.text_width_1000("•"), 600.0);
    }

    #[test]
    fn test_win_ansi_mapping() {
        assert_eq!(win_ansi_byte('A'), Some(b'A'));
        assert_eq!(win_ansi_byte('é'), Some(0xE9));
        assert_eq!(win_ansi_byte('•'), Some(0x95));
        assert_eq!(win_ansi_byte('—'), Some(0x97));
        assert_eq!(win_ansi_byte('中'), None);
    }

    #[test]
    fn test_resolve_standard_families() {
        let book = FontBook::new();
        let face = book.resolve("Times", FontStyle::Bold).unwrap();
        assert_eq!(face.key(), "Times-Bold");
        let face = book.resolve("COURIER", FontStyle::Normal).unwrap();
        assert_eq!(face.key(), "Courier");
    }

    #[test]
    fn test_unknown_family_is_an_error() {
        let book = FontBook::new();
        let err = book.resolve("Papyrus", FontStyle::Normal).unwrap_err();
        assert!(matches!(err, CanvasError::UnknownFont { .. }));
    }

    #[test]
    fn test_invalid_font_bytes_rejected() {
        let mut book = FontBook::new();
        let resource = FontResource::new("broken", FontStyle::Normal, vec![0, 1, 2, 3]);
        let err = book.register(&resource).unwrap_err();
        assert!(matches!(err, CanvasError::InvalidFont { .. }));
        assert!(!book.has_custom("broken"));
    }

    #[test]
    fn test_sized_font_scales_width() {
        let face = helvetica(FontStyle::Normal);
        let ten = SizedFont { face: &face, size: 10.0 };
        let twenty = SizedFont { face: &face, size: 20.0 };
        assert!((ten.text_width("abc") * 2.0 - twenty.text_width("abc")).abs() < 1e-4);
        assert!((ten.text_width("a") - 5.56).abs() < 1e-4);
    }

    #[test]
    fn test_context_dimensions_in_document_units() {
        let mut ctx = FontContext::new(Unit::Pt);
        ctx.set_font(&FontSpec::new("courier", FontStyle::Normal, 10.0))
            .unwrap();
        let dims = ctx.dimensions("abcd", None);
        assert!((dims.w - 24.0).abs() < 1e-4);
        assert!((dims.h - 11.5).abs() < 1e-4);

        let wrapped = ctx.dimensions("abcd abcd abcd", Some(50.0));
        assert!((wrapped.h - 3.0 * 11.5).abs() < 1e-4);
    }

    #[test]
    fn test_line_height_in_millimetres() {
        let mut ctx = FontContext::new(Unit::Mm);
        ctx.set_font(&FontSpec::new("helvetica", FontStyle::Normal, 10.0))
            .unwrap();
        let expected = 10.0 * 1.15 * 25.4 / 72.0;
        assert!((ctx.line_height() - expected).abs() < 1e-4);
    }
}
