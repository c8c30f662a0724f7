//! Cursor and pagination primitives
//!
//! Section renderers take a [`Cursor`] and return the advanced one; nothing
//! about the vertical position is stored anywhere else. A [`Surface`] pairs
//! the canvas with the effective configuration for one generation.

use crate::canvas::{Align, Canvas, CanvasError, FontSpec, FontStyle, TextDimensions, TextOptions};
use crate::config::LayoutConfig;
use log::debug;

/// Drawing position in document units. `y` is the next baseline.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Cursor {
    pub x: f32,
    pub y: f32,
}

impl Cursor {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Moves down by `dy` (up when negative).
    pub fn down(self, dy: f32) -> Self {
        Self { y: self.y + dy, ..self }
    }

    pub fn at_x(self, x: f32) -> Self {
        Self { x, ..self }
    }
}

/// Parameters of a comma-separated token flow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flow {
    /// Wrap when the running width would exceed this.
    pub limit: f32,
    /// Vertical advance on wrap, in line-spacing units.
    pub step: f32,
    /// Lines to reserve after wrapping.
    pub page_check: f32,
}

/// Canvas plus the effective configuration of one CV.
pub struct Surface<'a> {
    canvas: &'a mut dyn Canvas,
    config: &'a LayoutConfig,
}

impl<'a> Surface<'a> {
    pub fn new(canvas: &'a mut dyn Canvas, config: &'a LayoutConfig) -> Self {
        Self { canvas, config }
    }

    pub fn config(&self) -> &LayoutConfig {
        self.config
    }

    pub fn line_spacing(&self) -> f32 {
        self.config.line_spacing
    }

    pub fn margin_x(&self) -> f32 {
        self.config.margin_x
    }

    pub fn margin_y(&self) -> f32 {
        self.config.margin_y
    }

    pub fn page_width(&self) -> f32 {
        self.canvas.page_width()
    }

    /// Page width minus both horizontal margins.
    pub fn usable_width(&self) -> f32 {
        self.config.usable_width(self.canvas.page_width())
    }

    /// Selects the configured family at `size` points times the font scale.
    pub fn use_font(&mut self, size: f32, style: FontStyle) -> Result<(), CanvasError> {
        let spec = FontSpec::new(self.config.font.clone(), style, size * self.config.font_scale);
        self.canvas.set_font(&spec)
    }

    pub fn measure(
        &mut self,
        text: &str,
        size: f32,
        style: FontStyle,
        max_width: Option<f32>,
    ) -> Result<TextDimensions, CanvasError> {
        self.use_font(size, style)?;
        Ok(self.canvas.text_dimensions(text, max_width))
    }

    /// Draws a single run of text with its baseline at `y`.
    pub fn text(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        size: f32,
        style: FontStyle,
    ) -> Result<(), CanvasError> {
        self.use_font(size, style)?;
        self.canvas.draw_text(text, x, y, TextOptions::default())
    }

    /// Draws text wrapped to `max_width`.
    #[allow(clippy::too_many_arguments)]
    pub fn paragraph(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        size: f32,
        style: FontStyle,
        max_width: f32,
        align: Align,
    ) -> Result<(), CanvasError> {
        self.use_font(size, style)?;
        self.canvas.draw_text(text, x, y, TextOptions::wrapped(max_width, align))
    }

    /// Draws text so that it ends at the right margin.
    pub fn text_right(
        &mut self,
        text: &str,
        y: f32,
        size: f32,
        style: FontStyle,
    ) -> Result<(), CanvasError> {
        let width = self.measure(text, size, style, None)?.w;
        let x = self.page_width() - self.config.margin_x - width;
        self.canvas.draw_text(text, x, y, TextOptions::default())
    }

    /// Starts a new page when `required_lines` more lines would run past the
    /// bottom margin. Returns the cursor to continue from.
    pub fn ensure_page_size(
        &mut self,
        cursor: Cursor,
        required_lines: f32,
    ) -> Result<Cursor, CanvasError> {
        let max_height = self.canvas.page_height() - self.config.margin_y;
        if cursor.y + self.config.line_spacing * required_lines > max_height {
            let page = self.canvas.add_page()?;
            self.canvas.set_page(page)?;
            debug!(
                "page break at y={:.2} (needed {} lines), continuing on page {}",
                cursor.y,
                required_lines,
                page + 1
            );
            return Ok(Cursor::new(cursor.x, self.config.margin_y));
        }
        Ok(cursor)
    }

    /// Full-width rule at the cursor; returns the cursor just below it.
    ///
    /// A rule past the bottom margin moves to the top of a new page.
    pub fn horizontal_rule(&mut self, cursor: Cursor) -> Result<Cursor, CanvasError> {
        let cursor = self.ensure_page_size(cursor, 0.0)?;
        let right = self.page_width() - self.config.margin_x;
        self.canvas
            .draw_line(self.config.margin_x, cursor.y, right, cursor.y)?;
        Ok(cursor.down(0.2 * self.config.line_spacing))
    }

    /// Flow used for the names of a skill group.
    pub fn skill_flow(&self) -> Flow {
        Flow {
            limit: self.usable_width(),
            step: 0.8,
            page_check: 0.8,
        }
    }

    /// Flow used for a tech stack, which wraps a margin earlier on each side.
    pub fn tech_flow(&self) -> Flow {
        Flow {
            limit: self.usable_width() - 2.0 * self.config.margin_x,
            step: 0.7,
            page_check: 1.0,
        }
    }

    /// Lays out `tokens` as a comma-separated run at 10pt, starting `offset`
    /// units right of the margin and wrapping back to the margin.
    ///
    /// A token is never wrapped while it would be the first on its line.
    pub fn flow_tokens(
        &mut self,
        cursor: Cursor,
        tokens: &[&str],
        offset: f32,
        flow: Flow,
    ) -> Result<Cursor, CanvasError> {
        let mut cursor = cursor;
        let mut w_tracker = offset;

        for (i, token) in tokens.iter().enumerate() {
            let text = if i + 1 < tokens.len() {
                format!("{}, ", token)
            } else {
                token.to_string()
            };
            let width = self.measure(&text, 10.0, FontStyle::Normal, None)?.w;

            if w_tracker > 0.0 && w_tracker + width > flow.limit {
                cursor = cursor.down(flow.step * self.config.line_spacing);
                cursor = self.ensure_page_size(cursor, flow.page_check)?;
                w_tracker = 0.0;
            }

            cursor = cursor.at_x(self.config.margin_x + w_tracker);
            self.canvas
                .draw_text(&text, cursor.x, cursor.y, TextOptions::default())?;
            w_tracker += width;
        }

        Ok(cursor.at_x(self.config.margin_x))
    }
}
