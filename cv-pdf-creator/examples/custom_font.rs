//! Renders the sample CV with a TrueType font from disk.
//!
//! Usage: `cargo run --example custom_font <regular.ttf> [bold.ttf]`

use cv_pdf_creator::{CvGenerator, CvInformation, FontResource, FontStyle, LayoutOverride};

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let Some(regular) = args.next() else {
        eprintln!("usage: custom_font <regular.ttf> [bold.ttf]");
        std::process::exit(2);
    };

    let mut generator = CvGenerator::pdf();
    generator.add_font(FontResource::from_path(&regular, "custom", FontStyle::Normal)?);
    if let Some(bold) = args.next() {
        generator.add_font(FontResource::from_path(&bold, "custom", FontStyle::Bold)?);
    }

    let cv = CvInformation::from_json(include_str!("../tests/fixtures/sample_cv.json"))?;
    let patch = LayoutOverride::default().with_font("custom");
    let document = generator.generate_cv(&cv, &patch)?;

    document.save("custom_font_cv.pdf")?;
    println!("Wrote custom_font_cv.pdf using {}", regular);
    Ok(())
}
