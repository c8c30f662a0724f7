use cv_pdf_creator::model::{Education, Experience, Position, Skill};
use cv_pdf_creator::{
    ContactOrientation, CvGenerator, CvInformation, CvSection, DrawOp, LanguageGrader,
    LayoutConfig, LayoutOverride, PageFormat, RecordingCanvas, TitleLocation, Unit,
};

fn sample_cv() -> CvInformation {
    let json = include_str!("fixtures/sample_cv.json");
    CvInformation::from_json(json).expect("fixture parses")
}

fn recording_generator() -> CvGenerator<RecordingCanvas> {
    CvGenerator::new(RecordingCanvas::a4(), LayoutConfig::default())
}

fn text_op<'a>(canvas: &'a RecordingCanvas, text: &str) -> &'a DrawOp {
    canvas
        .find_text(text)
        .map(|(_, op)| op)
        .unwrap_or_else(|| panic!("`{}` was not drawn", text))
}

fn position(op: &DrawOp) -> (f32, f32) {
    match op {
        DrawOp::Text { x, y, .. } => (*x, *y),
        DrawOp::Line { x1, y1, .. } => (*x1, *y1),
    }
}

#[test]
fn fixture_parses_original_format() {
    let cv = sample_cv();
    let groups: Vec<&str> = cv.skill_details.iter().map(|(name, _)| name).collect();
    assert_eq!(groups, ["Programming Languages", "Frontend", "Database"]);

    let experiences = cv.experiences.as_ref().unwrap();
    assert_eq!(experiences[0].positions[0].from_date.to_string(), "2021-03-01");
    assert!(experiences[0].positions[0].to_date.is_none());

    let projects = cv.projects.as_ref().unwrap();
    assert_eq!(projects[0].project_type.as_deref(), Some("Open Source"));
}

#[test]
fn sample_renders_every_section_in_order() {
    let mut generator = recording_generator();
    generator.generate_cv(&sample_cv(), &LayoutOverride::default()).unwrap();

    let texts = generator.canvas().texts();
    let headings: Vec<&str> = texts
        .iter()
        .copied()
        .filter(|text| CvSection::ALL.iter().any(|s| s.title() == *text))
        .collect();
    assert_eq!(
        headings,
        ["About", "Skills", "Experiences", "Projects", "Education", "Certificates", "Languages"]
    );
    assert!(texts.contains(&"(Mar 2021 - Current)"));
    assert!(texts.contains(&"(Jan 2020 - Feb 2021)"));
    assert!(texts.contains(&"B.Sc. Computer Science / GPA: 3.8"));
    assert!(texts.contains(&"Sep 2012 - May 2016"));
    assert!(texts.contains(&"Programming Languages: "));
    assert!(texts.contains(&"Tech: "));
}

#[test]
fn layout_gates_sections() {
    let mut generator = recording_generator();
    let patch = LayoutOverride::default().with_layout([CvSection::Skills]);
    generator.generate_cv(&sample_cv(), &patch).unwrap();

    let canvas = generator.canvas();
    assert!(canvas.contains_text("Skills"));
    assert!(!canvas.contains_text("About"));
    assert!(!canvas.contains_text("Experiences"));
    assert!(!canvas.contains_text("Languages"));

    // Header rule plus one rule after the skills.
    let rules = canvas
        .ops()
        .filter(|(_, op)| matches!(op, DrawOp::Line { .. }))
        .count();
    assert_eq!(rules, 2);
}

#[test]
fn empty_sections_are_skipped_without_rules() {
    let mut generator = recording_generator();
    let cv = CvInformation {
        name: "Ada".into(),
        experiences: Some(Vec::new()),
        languages: Some(Vec::new()),
        ..CvInformation::default()
    };
    let document = generator.generate_cv(&cv, &LayoutOverride::default()).unwrap();
    assert_eq!(document.pages, 1);

    let canvas = generator.canvas();
    assert!(!canvas.contains_text("Experiences"));
    let rules = canvas
        .ops()
        .filter(|(_, op)| matches!(op, DrawOp::Line { .. }))
        .count();
    assert_eq!(rules, 1);
}

/// Copies of the first experience, plus an education with many notes.
fn long_cv() -> CvInformation {
    let mut cv = sample_cv();
    let template = cv.experiences.as_ref().unwrap()[0].clone();
    cv.experiences = Some(
        (0..12)
            .map(|i| Experience {
                company_name: format!("Company {}", i),
                ..template.clone()
            })
            .collect(),
    );
    let school = cv.educations.as_ref().unwrap()[0].clone();
    cv.educations = Some(vec![Education {
        notes: Some((0..60).map(|i| format!("Seminar {}", i)).collect()),
        ..school
    }]);
    cv
}

/// Every text line and rule ends above the bottom margin; continuation
/// pages start below the top margin.
fn assert_inside_margins(canvas: &RecordingCanvas, config: &LayoutConfig) {
    let max_height = PageFormat::A4.height - config.margin_y;
    for (page, op) in canvas.ops() {
        assert!(
            op.bottom() <= max_height + 1e-3,
            "{:?} on page {} ends at {} past {} (line spacing {})",
            op,
            page,
            op.bottom(),
            max_height,
            config.line_spacing
        );
        if let DrawOp::Text { text, y, .. } = op {
            if page > 0 {
                assert!(
                    *y >= config.margin_y - 1e-3,
                    "`{}` on page {} starts at {}",
                    text,
                    page,
                    y
                );
            }
        }
    }
}

#[test]
fn long_cv_paginates_inside_margins() {
    let cv = long_cv();
    let mut generator = recording_generator();
    let document = generator.generate_cv(&cv, &LayoutOverride::default()).unwrap();
    assert!(document.pages >= 2, "expected several pages, got {}", document.pages);

    let canvas = generator.canvas();
    assert_inside_margins(canvas, &LayoutConfig::default());

    // Pages are filled in order.
    let last_pages: Vec<usize> = (0..12)
        .map(|i| canvas.find_text(&format!("Company {}", i)).unwrap().0)
        .collect();
    assert!(last_pages.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn pagination_holds_across_line_spacings() {
    let cv = long_cv();
    for line_spacing in [4.0, 7.0, 9.0, 12.0, 20.0, 34.5] {
        let mut generator = recording_generator();
        let patch = LayoutOverride::default().with_line_spacing(line_spacing);
        generator.generate_cv(&cv, &patch).unwrap();

        let config = LayoutConfig::default().effective(&patch).unwrap();
        assert_inside_margins(generator.canvas(), &config);
        assert!(generator.canvas().contains_text("- Seminar 59"));
    }
}

#[test]
fn generation_is_deterministic() {
    let cv = sample_cv();
    let first = recording_generator().generate_cv(&cv, &LayoutOverride::default()).unwrap();
    let second = recording_generator().generate_cv(&cv, &LayoutOverride::default()).unwrap();
    assert_eq!(first, second);

    let mut generator = recording_generator();
    let again = generator.generate_cv(&cv, &LayoutOverride::default()).unwrap();
    let again_2 = generator.generate_cv(&cv, &LayoutOverride::default()).unwrap();
    assert_eq!(again, again_2);
    assert_eq!(first, again);
}

#[test]
fn overrides_do_not_leak_between_calls() {
    let cv = sample_cv();
    let mut generator = recording_generator();
    let baseline = generator.generate_cv(&cv, &LayoutOverride::default()).unwrap();

    let patch = LayoutOverride::default()
        .with_font_scale(1.4)
        .with_margins(20.0, 25.0)
        .with_layout([CvSection::Languages]);
    let patched = generator.generate_cv(&cv, &patch).unwrap();
    assert_ne!(baseline, patched);

    assert_eq!(generator.base_config(), &LayoutConfig::default());
    let after = generator.generate_cv(&cv, &LayoutOverride::default()).unwrap();
    assert_eq!(baseline, after);
}

#[test]
fn centered_title_forces_horizontal_contacts() {
    let cv = sample_cv();
    let render = |orientation| {
        let patch = LayoutOverride::default()
            .with_title_location(TitleLocation::Center)
            .with_contact_orientation(orientation);
        recording_generator().generate_cv(&cv, &patch).unwrap()
    };
    assert_eq!(
        render(ContactOrientation::Vertical),
        render(ContactOrientation::Horizontal)
    );
}

#[test]
fn vertical_contacts_mirror_the_title() {
    let cv = sample_cv();
    let email = "alexandra.johnson@example.com";

    let mut left = recording_generator();
    let patch = LayoutOverride::default().with_contact_orientation(ContactOrientation::Vertical);
    left.generate_cv(&cv, &patch).unwrap();
    let (left_title_x, _) = position(text_op(left.canvas(), "Alexandra Johnson"));
    let (left_email_x, left_email_y) = position(text_op(left.canvas(), email));
    assert_eq!(left_title_x, 10.0);
    assert!(left_email_x > 10.0);
    assert_eq!(left_email_y, 15.0);

    let mut right = recording_generator();
    let patch = patch.with_title_location(TitleLocation::Right);
    right.generate_cv(&cv, &patch).unwrap();
    let (right_title_x, _) = position(text_op(right.canvas(), "Alexandra Johnson"));
    let (right_email_x, _) = position(text_op(right.canvas(), email));
    assert!(right_title_x > 100.0);
    assert_eq!(right_email_x, 10.0);
}

#[test]
fn language_grader_selects_labels() {
    let cv = sample_cv();

    let mut common = recording_generator();
    common.generate_cv(&cv, &LayoutOverride::default()).unwrap();
    assert!(common.canvas().contains_text("Native / Bilingual Proficiency"));
    assert!(common.canvas().contains_text("Professional Working Proficiency"));

    let mut cefr = recording_generator();
    let patch = LayoutOverride::default().with_language_grader(LanguageGrader::Cefr);
    cefr.generate_cv(&cv, &patch).unwrap();
    assert!(cefr.canvas().contains_text("NATIVE"));
    assert!(cefr.canvas().contains_text("B2"));
    assert!(!cefr.canvas().contains_text("Native / Bilingual Proficiency"));
}

#[test]
fn open_positions_render_as_current() {
    let mut cv = CvInformation::default();
    cv.experiences = Some(vec![Experience {
        company_name: "Acme".into(),
        positions: vec![Position {
            role: "Engineer".into(),
            from_date: "2021-03-15".parse().unwrap(),
            to_date: None,
            description: None,
            responsibilities: None,
        }],
        tech_stack: None,
    }]);

    let mut generator = recording_generator();
    generator.generate_cv(&cv, &LayoutOverride::default()).unwrap();
    let canvas = generator.canvas();
    assert!(canvas.contains_text("(Mar 2021 - Current)"));
    assert!(!canvas.contains_text("Tech: "));
}

#[test]
fn empty_cv_renders_one_page() {
    let mut generator = recording_generator();
    let document = generator
        .generate_cv(&CvInformation::default(), &LayoutOverride::default())
        .unwrap();
    assert_eq!(document.pages, 1);
    for section in CvSection::ALL {
        assert!(!generator.canvas().contains_text(section.title()));
    }
}

fn narrow_generator() -> CvGenerator<RecordingCanvas> {
    // Courier 10pt: 6pt per character. Usable width 54pt.
    let config = LayoutConfig {
        margin_x: 10.0,
        margin_y: 10.0,
        line_spacing: 10.0,
        font: "courier".into(),
        layout: vec![CvSection::Skills],
        ..LayoutConfig::default()
    };
    CvGenerator::new(RecordingCanvas::new(PageFormat::new(74.0, 400.0, Unit::Pt)), config)
}

#[test]
fn skill_flow_fills_exact_width_without_wrapping() {
    let mut cv = CvInformation::default();
    // "S: " 18 + "ab, " 24 + "cd" 12 = 54.
    cv.skill_details.insert("S", vec![Skill::named("ab"), Skill::named("cd")]);

    let mut generator = narrow_generator();
    generator.generate_cv(&cv, &LayoutOverride::default()).unwrap();
    let canvas = generator.canvas();
    let (first_x, first_y) = position(text_op(canvas, "ab, "));
    let (second_x, second_y) = position(text_op(canvas, "cd"));
    assert_eq!(first_x, 28.0);
    assert_eq!(second_x, 52.0);
    assert_eq!(first_y, second_y);
}

#[test]
fn skill_flow_wraps_past_width() {
    let mut cv = CvInformation::default();
    cv.skill_details.insert("S", vec![Skill::named("ab"), Skill::named("cde")]);

    let mut generator = narrow_generator();
    generator.generate_cv(&cv, &LayoutOverride::default()).unwrap();
    let canvas = generator.canvas();
    let (_, first_y) = position(text_op(canvas, "ab, "));
    let (second_x, second_y) = position(text_op(canvas, "cde"));
    assert_eq!(second_x, 10.0);
    assert!((second_y - (first_y + 8.0)).abs() < 1e-4);
}
