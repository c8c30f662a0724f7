//! CV PDF Creator
//!
//! Lays out structured CV data (contact block, about, skills, experiences,
//! projects, education, certificates, languages) onto paginated A4 pages and
//! writes a PDF, with fontdue-measured text and justified paragraphs.
//!
//! ```no_run
//! use cv_pdf_creator::{CvGenerator, CvInformation, LayoutOverride};
//!
//! # fn main() -> anyhow::Result<()> {
//! let cv = CvInformation::from_json(&std::fs::read_to_string("cv.json")?)?;
//! let document = CvGenerator::pdf().generate_cv(&cv, &LayoutOverride::default())?;
//! document.save("cv.pdf")?;
//! # Ok(())
//! # }
//! ```

pub mod canvas;
pub mod config;
pub mod fonts;
pub mod generator;
pub mod layout;
pub mod model;
pub mod pdf_canvas;
pub mod recording;
pub mod sections;
pub mod typography;

// Re-export commonly used functions and types
pub use canvas::{Canvas, CanvasError, FontResource, FontStyle, PageFormat, Unit};
pub use config::{
    ConfigError, ContactOrientation, CvSection, LanguageGrader, LayoutConfig, LayoutOverride,
    TitleLocation,
};
pub use fonts::FontContext;
pub use generator::{CvDocument, CvGenerator};
pub use model::CvInformation;
pub use pdf_canvas::PdfCanvas;
pub use recording::{DrawOp, RecordingCanvas};
