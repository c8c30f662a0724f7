//! Display-list canvas
//!
//! Records every draw call per page instead of producing PDF. Measurement
//! goes through the same [`FontContext`] as the PDF canvas, so positions are
//! identical to what the PDF would contain. Used for layout previews and as
//! the canvas double in tests.

use crate::canvas::{
    Align, Canvas, CanvasError, FontResource, FontSpec, FontStyle, PageFormat, TextDimensions,
    TextOptions,
};
use crate::fonts::FontContext;
use serde::Serialize;

/// One recorded drawing command. Coordinates are in document units.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum DrawOp {
    #[serde(rename_all = "camelCase")]
    Text {
        text: String,
        x: f32,
        y: f32,
        font: String,
        style: FontStyle,
        size: f32,
        #[serde(skip_serializing_if = "Option::is_none")]
        max_width: Option<f32>,
        align: Align,
        /// The text as it was broken into lines.
        lines: Vec<String>,
        line_height: f32,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
    },
}

impl DrawOp {
    pub fn text(&self) -> Option<&str> {
        match self {
            DrawOp::Text { text, .. } => Some(text),
            DrawOp::Line { .. } => None,
        }
    }

    /// Baseline of the last line this op draws.
    pub fn bottom(&self) -> f32 {
        match self {
            DrawOp::Text {
                y,
                lines,
                line_height,
                ..
            } => y + lines.len().saturating_sub(1) as f32 * line_height,
            DrawOp::Line { y1, y2, .. } => y1.max(*y2),
        }
    }
}

#[derive(Serialize)]
struct DisplayList<'a> {
    format: PageFormat,
    pages: &'a [Vec<DrawOp>],
}

pub struct RecordingCanvas {
    format: PageFormat,
    fonts: FontContext,
    pages: Vec<Vec<DrawOp>>,
    current: usize,
}

impl RecordingCanvas {
    pub fn new(format: PageFormat) -> Self {
        Self {
            format,
            fonts: FontContext::new(format.unit),
            pages: vec![Vec::new()],
            current: 0,
        }
    }

    pub fn a4() -> Self {
        Self::new(PageFormat::A4)
    }

    pub fn pages(&self) -> &[Vec<DrawOp>] {
        &self.pages
    }

    /// Every op with its page index, in drawing order.
    pub fn ops(&self) -> impl Iterator<Item = (usize, &DrawOp)> {
        self.pages
            .iter()
            .enumerate()
            .flat_map(|(index, ops)| ops.iter().map(move |op| (index, op)))
    }

    /// All drawn strings in drawing order.
    pub fn texts(&self) -> Vec<&str> {
        self.ops().filter_map(|(_, op)| op.text()).collect()
    }

    /// First text op whose string equals `text`.
    pub fn find_text(&self, text: &str) -> Option<(usize, &DrawOp)> {
        self.ops().find(|(_, op)| op.text() == Some(text))
    }

    pub fn contains_text(&self, text: &str) -> bool {
        self.find_text(text).is_some()
    }
}

impl Canvas for RecordingCanvas {
    fn reset(&mut self) -> Result<(), CanvasError> {
        self.fonts.reset();
        self.pages = vec![Vec::new()];
        self.current = 0;
        Ok(())
    }

    fn add_page(&mut self) -> Result<usize, CanvasError> {
        self.pages.push(Vec::new());
        Ok(self.pages.len() - 1)
    }

    fn set_page(&mut self, index: usize) -> Result<(), CanvasError> {
        if index >= self.pages.len() {
            return Err(CanvasError::PageOutOfRange {
                index,
                count: self.pages.len(),
            });
        }
        self.current = index;
        Ok(())
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn current_page(&self) -> usize {
        self.current
    }

    fn set_font(&mut self, font: &FontSpec) -> Result<(), CanvasError> {
        self.fonts.set_font(font)
    }

    fn text_dimensions(&self, text: &str, max_width: Option<f32>) -> TextDimensions {
        self.fonts.dimensions(text, max_width)
    }

    fn draw_text(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        options: TextOptions,
    ) -> Result<(), CanvasError> {
        let lines = self
            .fonts
            .layout(text, options.max_width, options.align)
            .into_iter()
            .map(|line| line.text)
            .collect();
        let spec = self.fonts.spec();
        let op = DrawOp::Text {
            text: text.to_string(),
            x,
            y,
            font: spec.family.clone(),
            style: spec.style,
            size: spec.size,
            max_width: options.max_width,
            align: options.align,
            lines,
            line_height: self.fonts.line_height(),
        };
        self.pages[self.current].push(op);
        Ok(())
    }

    fn draw_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Result<(), CanvasError> {
        self.pages[self.current].push(DrawOp::Line { x1, y1, x2, y2 });
        Ok(())
    }

    fn register_font(&mut self, resource: &FontResource) -> Result<(), CanvasError> {
        self.fonts.register(resource)
    }

    fn page_width(&self) -> f32 {
        self.format.width
    }

    fn page_height(&self) -> f32 {
        self.format.height
    }

    fn output(&mut self) -> Result<Vec<u8>, CanvasError> {
        let list = DisplayList {
            format: self.format,
            pages: &self.pages,
        };
        Ok(serde_json::to_vec_pretty(&list)?)
    }

    fn media_type(&self) -> &'static str {
        "application/json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Unit;

    #[test]
    fn test_records_per_page() {
        let mut canvas = RecordingCanvas::a4();
        canvas.draw_text("first", 10.0, 20.0, TextOptions::default()).unwrap();
        let second = canvas.add_page().unwrap();
        assert_eq!(second, 1);
        assert_eq!(canvas.current_page(), 0, "add_page must not switch pages");
        canvas.set_page(second).unwrap();
        canvas.draw_line(10.0, 30.0, 200.0, 30.0).unwrap();

        assert_eq!(canvas.page_count(), 2);
        assert_eq!(canvas.pages()[0].len(), 1);
        assert_eq!(canvas.pages()[1][0], DrawOp::Line { x1: 10.0, y1: 30.0, x2: 200.0, y2: 30.0 });
        assert_eq!(canvas.find_text("first").map(|(page, _)| page), Some(0));
    }

    #[test]
    fn test_set_page_out_of_range() {
        let mut canvas = RecordingCanvas::a4();
        let err = canvas.set_page(3).unwrap_err();
        assert!(matches!(err, CanvasError::PageOutOfRange { index: 3, count: 1 }));
    }

    #[test]
    fn test_reset_discards_pages() {
        let mut canvas = RecordingCanvas::a4();
        canvas.add_page().unwrap();
        canvas.draw_text("gone", 0.0, 0.0, TextOptions::default()).unwrap();
        canvas.reset().unwrap();
        assert_eq!(canvas.page_count(), 1);
        assert!(canvas.texts().is_empty());
    }

    #[test]
    fn test_wrapped_text_records_lines() {
        let mut canvas = RecordingCanvas::new(PageFormat::new(200.0, 200.0, Unit::Pt));
        canvas
            .set_font(&FontSpec::new("courier", FontStyle::Normal, 10.0))
            .unwrap();
        canvas
            .draw_text("aaaa bbbb cccc", 0.0, 50.0, TextOptions::wrapped(60.0, Align::Justify))
            .unwrap();
        let (_, op) = canvas.find_text("aaaa bbbb cccc").unwrap();
        match op {
            DrawOp::Text { lines, line_height, .. } => {
                assert_eq!(lines, &vec!["aaaa bbbb".to_string(), "cccc".to_string()]);
                assert!((line_height - 11.5).abs() < 1e-4);
            }
            other => panic!("unexpected op {:?}", other),
        }
        assert!((op.bottom() - 61.5).abs() < 1e-4);
    }

    #[test]
    fn test_output_is_json_display_list() {
        let mut canvas = RecordingCanvas::a4();
        canvas.draw_text("hello", 1.0, 2.0, TextOptions::default()).unwrap();
        let bytes = canvas.output().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["pages"][0][0]["op"], "text");
        assert_eq!(value["pages"][0][0]["text"], "hello");
        assert_eq!(canvas.media_type(), "application/json");
    }
}
