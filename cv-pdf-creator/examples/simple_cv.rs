//! Renders the sample CV with the default layout.

use cv_pdf_creator::{CvGenerator, CvInformation, LayoutOverride};

fn main() -> anyhow::Result<()> {
    println!("Generating sample CV...");

    let cv = CvInformation::from_json(include_str!("../tests/fixtures/sample_cv.json"))?;
    let mut generator = CvGenerator::pdf();
    let document = generator.generate_cv(&cv, &LayoutOverride::default())?;

    let file_name = cv.file_name();
    document.save(&file_name)?;
    println!(
        "Wrote {} ({} pages, {} bytes)",
        file_name,
        document.pages,
        document.bytes.len()
    );
    Ok(())
}
