//! Dumps the display list of a CV instead of a PDF, to inspect positions.
//!
//! Usage: `cargo run --example layout_preview [cv.json] [config.json]`

use cv_pdf_creator::{CvGenerator, CvInformation, LayoutConfig, LayoutOverride, RecordingCanvas};

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);

    let cv_json = match args.next() {
        Some(path) => std::fs::read_to_string(path)?,
        None => include_str!("../tests/fixtures/sample_cv.json").to_string(),
    };
    let patch = match args.next() {
        Some(path) => LayoutOverride::from_json(&std::fs::read_to_string(path)?)?,
        None => LayoutOverride::default(),
    };

    let cv = CvInformation::from_json(&cv_json)?;
    let mut generator = CvGenerator::new(RecordingCanvas::a4(), LayoutConfig::default());
    let document = generator.generate_cv(&cv, &patch)?;

    for (page, op) in generator.canvas().ops() {
        if let Some(text) = op.text() {
            println!("p{} y={:7.2}  {}", page + 1, op.bottom(), text);
        }
    }

    document.save("layout_preview.json")?;
    println!("Wrote layout_preview.json ({} pages)", document.pages);
    Ok(())
}
