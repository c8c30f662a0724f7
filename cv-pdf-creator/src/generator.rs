//! CV generation
//!
//! [`CvGenerator`] owns a canvas, a base [`LayoutConfig`] and the custom fonts
//! added to it. Each call to [`CvGenerator::generate_cv`] starts from a fresh
//! canvas and an effective configuration derived from the base, so calls do
//! not influence each other.

use crate::canvas::{Canvas, FontResource};
use crate::config::{LayoutConfig, LayoutOverride};
use crate::layout::{Cursor, Surface};
use crate::model::CvInformation;
use crate::pdf_canvas::PdfCanvas;
use crate::sections::{self, entry_for};
use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::{debug, info};
use std::path::Path;

/// A finished document.
#[derive(Debug, Clone, PartialEq)]
pub struct CvDocument {
    pub bytes: Vec<u8>,
    pub pages: usize,
    pub media_type: &'static str,
}

impl CvDocument {
    /// `data:<media type>;filename=<name>;base64,<payload>`
    pub fn data_uri(&self, filename: &str) -> String {
        format!(
            "data:{};filename={};base64,{}",
            self.media_type,
            filename,
            STANDARD.encode(&self.bytes)
        )
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, &self.bytes)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

pub struct CvGenerator<C: Canvas = PdfCanvas> {
    canvas: C,
    base: LayoutConfig,
    fonts: Vec<FontResource>,
}

impl CvGenerator<PdfCanvas> {
    /// A4 PDF output with the default layout.
    pub fn pdf() -> Self {
        Self::new(PdfCanvas::a4(), LayoutConfig::default())
    }
}

impl Default for CvGenerator<PdfCanvas> {
    fn default() -> Self {
        Self::pdf()
    }
}

impl<C: Canvas> CvGenerator<C> {
    pub fn new(canvas: C, base: LayoutConfig) -> Self {
        Self {
            canvas,
            base,
            fonts: Vec::new(),
        }
    }

    pub fn base_config(&self) -> &LayoutConfig {
        &self.base
    }

    /// Registers a font for every following generation. A font with the same
    /// id and style replaces the earlier one.
    pub fn add_font(&mut self, font: FontResource) {
        self.fonts
            .retain(|f| !(f.id.eq_ignore_ascii_case(&font.id) && f.style == font.style));
        self.fonts.push(font);
    }

    pub fn fonts(&self) -> &[FontResource] {
        &self.fonts
    }

    /// The canvas as left by the last generation.
    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn into_canvas(self) -> C {
        self.canvas
    }

    /// Lays out `cv` and serializes the result.
    pub fn generate_cv(&mut self, cv: &CvInformation, patch: &LayoutOverride) -> Result<CvDocument> {
        let config = self
            .base
            .effective(patch)
            .context("invalid layout configuration")?;

        self.canvas.reset()?;
        for font in &self.fonts {
            self.canvas
                .register_font(font)
                .with_context(|| format!("failed to register font `{}`", font.id))?;
        }

        let mut surface = Surface::new(&mut self.canvas, &config);
        let cursor = Cursor::new(config.margin_x, config.margin_y);

        let cursor = sections::render_title(&mut surface, cursor, &cv.name, &cv.personal_title)?;
        let cursor = sections::render_contact(&mut surface, cursor, &cv.contact_informations)?;
        let mut cursor = surface.horizontal_rule(cursor)?;

        for &section in &config.layout {
            let entry = entry_for(section);
            if !(entry.has_content)(cv) {
                debug!("skipping empty section {:?}", section);
                continue;
            }
            debug!("rendering {:?} at y={:.2}", section, cursor.y);
            cursor = (entry.render)(&mut surface, cursor, cv)
                .with_context(|| format!("failed to render {}", section.title()))?;
            cursor = cursor.down(entry.trailing_gap * config.line_spacing);
            cursor = surface.horizontal_rule(cursor)?;
        }

        let bytes = self.canvas.output()?;
        let document = CvDocument {
            pages: self.canvas.page_count(),
            media_type: self.canvas.media_type(),
            bytes,
        };
        info!(
            "generated CV for {:?}: {} page(s), {} bytes",
            cv.name,
            document.pages,
            document.bytes.len()
        );
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CvSection;
    use crate::model::Skill;
    use crate::recording::RecordingCanvas;

    fn recording() -> CvGenerator<RecordingCanvas> {
        CvGenerator::new(RecordingCanvas::a4(), LayoutConfig::default())
    }

    #[test]
    fn test_empty_cv_draws_header_and_rule() {
        let mut generator = recording();
        let cv = CvInformation {
            name: "Ada".into(),
            personal_title: "Engineer".into(),
            ..CvInformation::default()
        };
        let document = generator.generate_cv(&cv, &LayoutOverride::default()).unwrap();
        assert_eq!(document.pages, 1);
        assert_eq!(document.media_type, "application/json");

        let canvas = generator.canvas();
        assert!(canvas.contains_text("Ada"));
        assert!(canvas.contains_text("Engineer"));
        assert_eq!(canvas.pages()[0].len(), 3);
    }

    #[test]
    fn test_layout_order_is_followed() {
        let mut generator = recording();
        let mut cv = CvInformation {
            about: Some("About me".into()),
            ..CvInformation::default()
        };
        cv.skill_details.insert("Languages", vec![Skill::named("Rust")]);

        let patch = LayoutOverride::default().with_layout(vec![CvSection::Skills, CvSection::About]);
        generator.generate_cv(&cv, &patch).unwrap();

        let texts = generator.canvas().texts();
        let skills = texts.iter().position(|t| *t == "Skills").unwrap();
        let about = texts.iter().position(|t| *t == "About").unwrap();
        assert!(skills < about);
    }

    #[test]
    fn test_add_font_replaces_same_face() {
        let mut generator = recording();
        generator.add_font(FontResource::new("Inter", crate::canvas::FontStyle::Bold, vec![1]));
        generator.add_font(FontResource::new("inter", crate::canvas::FontStyle::Bold, vec![2]));
        generator.add_font(FontResource::new("inter", crate::canvas::FontStyle::Normal, vec![3]));
        assert_eq!(generator.fonts().len(), 2);
        assert_eq!(*generator.fonts()[0].data, vec![2u8]);
    }

    #[test]
    fn test_data_uri_format() {
        let document = CvDocument {
            bytes: b"%PDF".to_vec(),
            pages: 1,
            media_type: "application/pdf",
        };
        assert_eq!(
            document.data_uri("cv.pdf"),
            "data:application/pdf;filename=cv.pdf;base64,JVBERg=="
        );
    }
}
