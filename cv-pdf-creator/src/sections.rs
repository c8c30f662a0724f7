//! Section renderers
//!
//! Every renderer takes the cursor where it should start and returns the
//! cursor where the next block may start. Offsets are multiples of the
//! configured line spacing; font sizes are in points before the font scale.

use crate::canvas::{Align, FontStyle};
use crate::config::{ContactOrientation, CvSection, LanguageGrader, TitleLocation};
use crate::layout::{Cursor, Surface};
use crate::model::{
    Certificate, ContactDetails, CvInformation, Education, Experience, Language,
    LanguageProficiency, Position, Project, Skill, SkillGroups,
};
use anyhow::Result;

const NAME_SIZE: f32 = 18.0;
const PERSONAL_TITLE_SIZE: f32 = 14.0;
const HEADING_SIZE: f32 = 14.0;
const ITEM_SIZE: f32 = 12.0;
const CERTIFICATE_SIZE: f32 = 11.0;
const BODY_SIZE: f32 = 10.0;

/// Space between a role and its date range.
const ROLE_GAP: f32 = 2.0;
/// Indent of responsibility bullets.
const BULLET_INDENT: f32 = 3.0;
/// Space between the two vertical contact columns.
const CONTACT_GAP: f32 = 2.0;

/// Name and personal title, aligned per `title_location`.
pub fn render_title(
    surface: &mut Surface<'_>,
    cursor: Cursor,
    name: &str,
    personal_title: &str,
) -> Result<Cursor> {
    let location = surface.config().title_location;

    let name_dim = surface.measure(name, NAME_SIZE, FontStyle::Normal, None)?;
    let x = title_x(surface, location, name_dim.w);
    surface.text(name, x, cursor.y, NAME_SIZE, FontStyle::Normal)?;
    let cursor = cursor.down(name_dim.h);

    let title_dim = surface.measure(personal_title, PERSONAL_TITLE_SIZE, FontStyle::Bold, None)?;
    let x = title_x(surface, location, title_dim.w);
    surface.text(personal_title, x, cursor.y + 1.0, PERSONAL_TITLE_SIZE, FontStyle::Bold)?;
    Ok(cursor.down(title_dim.h))
}

fn title_x(surface: &Surface<'_>, location: TitleLocation, width: f32) -> f32 {
    match location {
        TitleLocation::Left => surface.margin_x(),
        TitleLocation::Right => surface.page_width() - surface.margin_x() - width,
        TitleLocation::Center => (surface.page_width() - width) / 2.0,
    }
}

/// Contact values, in two columns.
pub fn render_contact(
    surface: &mut Surface<'_>,
    cursor: Cursor,
    contact: &ContactDetails,
) -> Result<Cursor> {
    let values = contact.values();
    match surface.config().contact_orientation {
        ContactOrientation::Horizontal => render_contact_horizontal(surface, cursor, &values),
        ContactOrientation::Vertical => render_contact_vertical(surface, cursor, &values),
    }
}

fn render_contact_horizontal(
    surface: &mut Surface<'_>,
    cursor: Cursor,
    values: &[&str],
) -> Result<Cursor> {
    let ls = surface.line_spacing();
    let margin_x = surface.margin_x();
    let quarter = surface.usable_width() / 4.0;
    let mut cursor = cursor.down(0.6 * ls);

    for (i, value) in values.iter().enumerate() {
        let width = surface.measure(value, BODY_SIZE, FontStyle::Bold, None)?.w;
        if i % 2 == 0 {
            // A lone last value is centered on the page.
            let center = if i == values.len() - 1 { 2.0 * quarter } else { quarter };
            surface.text(value, margin_x + center - width / 2.0, cursor.y, BODY_SIZE, FontStyle::Bold)?;
        } else {
            surface.text(value, margin_x + 3.0 * quarter - width / 2.0, cursor.y, BODY_SIZE, FontStyle::Bold)?;
            cursor = cursor.down(0.8 * ls);
        }
    }

    if values.len() % 2 == 1 {
        cursor = cursor.down(0.5 * ls);
    }
    Ok(cursor)
}

fn render_contact_vertical(
    surface: &mut Surface<'_>,
    cursor: Cursor,
    values: &[&str],
) -> Result<Cursor> {
    let ls = surface.line_spacing();
    let mut widest: f32 = 0.0;
    for value in values {
        widest = widest.max(surface.measure(value, BODY_SIZE, FontStyle::Bold, None)?.w);
    }

    // The block sits opposite the title.
    let right_block = surface.config().title_location == TitleLocation::Left;
    let right = surface.page_width() - surface.margin_x();
    let left = surface.margin_x();
    let mut row_y = surface.margin_y();

    for (i, value) in values.iter().enumerate() {
        let x = if i % 2 == 1 {
            if right_block { right - widest } else { left + widest + CONTACT_GAP }
        } else if i == values.len() - 1 {
            let width = surface.measure(value, BODY_SIZE, FontStyle::Bold, None)?.w;
            if right_block { right - widest - width / 2.0 } else { left + widest - width / 2.0 }
        } else if right_block {
            right - 2.0 * widest - CONTACT_GAP
        } else {
            left
        };
        surface.text(value, x, row_y, BODY_SIZE, FontStyle::Bold)?;
        if i % 2 == 1 {
            row_y += 0.8 * ls;
        }
    }

    if values.len() % 2 == 1 {
        row_y += 0.8 * ls;
    }
    Ok(Cursor::new(cursor.x, cursor.y.max(row_y)))
}

/// Moves down by `advance` line spacings, reserves room, and draws a heading.
fn section_heading(
    surface: &mut Surface<'_>,
    cursor: Cursor,
    section: CvSection,
    advance: f32,
    reserve_lines: f32,
) -> Result<Cursor> {
    let cursor = cursor.down(advance * surface.line_spacing());
    let cursor = surface.ensure_page_size(cursor, reserve_lines)?;
    surface.text(section.title(), surface.margin_x(), cursor.y, HEADING_SIZE, FontStyle::Bold)?;
    Ok(cursor)
}

/// Wrapped text block, kept on one page when it fits.
fn justified_block(
    surface: &mut Surface<'_>,
    cursor: Cursor,
    text: &str,
    x: f32,
    max_width: f32,
) -> Result<Cursor> {
    let ls = surface.line_spacing();
    let height = surface.measure(text, BODY_SIZE, FontStyle::Normal, Some(max_width))?.h;
    let cursor = surface.ensure_page_size(cursor, height / ls)?;
    surface.paragraph(text, x, cursor.y, BODY_SIZE, FontStyle::Normal, max_width, Align::Justify)?;
    Ok(cursor.down(height))
}

pub fn render_about(surface: &mut Surface<'_>, cursor: Cursor, about: &str) -> Result<Cursor> {
    let cursor = section_heading(surface, cursor, CvSection::About, 0.8, 3.0)?;
    let cursor = cursor.down(0.8 * surface.line_spacing());
    let (margin_x, usable) = (surface.margin_x(), surface.usable_width());
    justified_block(surface, cursor, about, margin_x, usable)
}

pub fn render_skills(surface: &mut Surface<'_>, cursor: Cursor, skills: &SkillGroups) -> Result<Cursor> {
    let mut cursor = section_heading(surface, cursor, CvSection::Skills, 1.0, 1.0)?;
    for (group, members) in skills.iter() {
        cursor = render_skill_group(surface, cursor, group, members)?;
    }
    Ok(cursor)
}

fn render_skill_group(
    surface: &mut Surface<'_>,
    cursor: Cursor,
    group: &str,
    skills: &[Skill],
) -> Result<Cursor> {
    let label = format!("{}: ", group);
    let label_width = surface.measure(&label, BODY_SIZE, FontStyle::Bold, None)?.w;

    let cursor = cursor.down(0.8 * surface.line_spacing());
    let cursor = surface.ensure_page_size(cursor, 1.0)?;
    surface.text(&label, surface.margin_x(), cursor.y, BODY_SIZE, FontStyle::Bold)?;

    let names: Vec<&str> = skills.iter().map(|skill| skill.name.as_str()).collect();
    let flow = surface.skill_flow();
    Ok(surface.flow_tokens(cursor, &names, label_width, flow)?)
}

fn render_positions(
    surface: &mut Surface<'_>,
    cursor: Cursor,
    positions: &[Position],
) -> Result<Cursor> {
    let ls = surface.line_spacing();
    let margin_x = surface.margin_x();
    let usable = surface.usable_width();
    let mut cursor = cursor;

    for position in positions {
        let role = format!("\u{2022} {}", position.role);
        let role_width = surface.measure(&role, BODY_SIZE, FontStyle::Bold, None)?.w;

        cursor = cursor.down(0.3 * ls);
        cursor = surface.ensure_page_size(cursor, 1.0)?;
        surface.text(&role, margin_x, cursor.y, BODY_SIZE, FontStyle::Bold)?;
        surface.text(
            &position.date_range(),
            margin_x + role_width + ROLE_GAP,
            cursor.y,
            BODY_SIZE,
            FontStyle::Normal,
        )?;

        if let Some(description) = position.description.as_deref().filter(|d| !d.is_empty()) {
            cursor = cursor.down(0.7 * ls);
            cursor = justified_block(surface, cursor, description, margin_x, usable)?;
        }

        let responsibilities = position.responsibilities.as_deref().unwrap_or_default();
        if !responsibilities.is_empty() {
            cursor = cursor.down(0.2 * ls);
            for responsibility in responsibilities {
                let text = format!("- {}", responsibility);
                cursor = justified_block(
                    surface,
                    cursor,
                    &text,
                    margin_x + BULLET_INDENT,
                    usable - BULLET_INDENT,
                )?;
            }
        }
    }

    Ok(cursor)
}

fn render_tech_stack(surface: &mut Surface<'_>, cursor: Cursor, stack: &[String]) -> Result<Cursor> {
    const LABEL: &str = "Tech: ";
    let cursor = cursor.down(1.2 * surface.line_spacing());
    let label_width = surface.measure(LABEL, BODY_SIZE, FontStyle::Bold, None)?.w;
    let cursor = surface.ensure_page_size(cursor, 1.0)?;
    surface.text(LABEL, surface.margin_x(), cursor.y, BODY_SIZE, FontStyle::Bold)?;

    let tokens: Vec<&str> = stack.iter().map(String::as_str).collect();
    let flow = surface.tech_flow();
    Ok(surface.flow_tokens(cursor, &tokens, label_width, flow)?)
}

pub fn render_experiences(
    surface: &mut Surface<'_>,
    cursor: Cursor,
    experiences: &[Experience],
) -> Result<Cursor> {
    let ls = surface.line_spacing();
    let mut cursor = section_heading(surface, cursor, CvSection::Experiences, 1.0, 2.0)?;

    for experience in experiences {
        cursor = surface.ensure_page_size(cursor, 2.0)?;
        cursor = cursor.down(ls);
        surface.text(&experience.company_name, surface.margin_x(), cursor.y, ITEM_SIZE, FontStyle::Bold)?;
        cursor = cursor.down(0.4 * ls);

        cursor = render_positions(surface, cursor, &experience.positions)?;
        cursor = cursor.down(-0.5 * ls);

        let stack = experience.tech_stack.as_deref().unwrap_or_default();
        if !stack.is_empty() {
            cursor = render_tech_stack(surface, cursor, stack)?;
        }
    }

    Ok(cursor)
}

pub fn render_projects(
    surface: &mut Surface<'_>,
    cursor: Cursor,
    projects: &[Project],
) -> Result<Cursor> {
    let ls = surface.line_spacing();
    let mut cursor = section_heading(surface, cursor, CvSection::Projects, 1.0, 2.0)?;

    for project in projects {
        cursor = surface.ensure_page_size(cursor, 2.0)?;
        cursor = cursor.down(ls);
        surface.text(&project.project_name, surface.margin_x(), cursor.y, ITEM_SIZE, FontStyle::Bold)?;

        if let Some(kind) = project.project_type.as_deref().filter(|t| !t.trim().is_empty()) {
            cursor = cursor.down(0.6 * ls);
            surface.text(kind, surface.margin_x(), cursor.y, BODY_SIZE, FontStyle::Normal)?;
        }
        cursor = cursor.down(0.4 * ls);

        cursor = render_positions(surface, cursor, &project.positions)?;
        cursor = cursor.down(-ls);

        let stack = project.tech_stack.as_deref().unwrap_or_default();
        if !stack.is_empty() {
            cursor = render_tech_stack(surface, cursor, stack)?;
        }
    }

    Ok(cursor)
}

pub fn render_educations(
    surface: &mut Surface<'_>,
    cursor: Cursor,
    educations: &[Education],
) -> Result<Cursor> {
    let ls = surface.line_spacing();
    let margin_x = surface.margin_x();
    let usable = surface.usable_width();
    let mut cursor = section_heading(surface, cursor, CvSection::Education, 1.0, 1.0)?;

    for education in educations {
        // School and degree lines stay together.
        cursor = cursor.down(0.8 * ls);
        cursor = surface.ensure_page_size(cursor, 1.8)?;
        surface.text(&education.school_name, margin_x, cursor.y, BODY_SIZE, FontStyle::Bold)?;
        surface.text_right(&education.school_location, cursor.y, BODY_SIZE, FontStyle::Normal)?;

        cursor = cursor.down(0.8 * ls);
        surface.text(&education.degree_line(), margin_x, cursor.y, BODY_SIZE, FontStyle::Normal)?;
        surface.text_right(&education.date_range(), cursor.y, BODY_SIZE, FontStyle::Normal)?;

        cursor = cursor.down(0.3 * ls);
        for note in education.notes.as_deref().unwrap_or_default() {
            let text = format!("- {}", note);
            let height = surface.measure(&text, BODY_SIZE, FontStyle::Normal, Some(usable))?.h;
            // Drawn half a line below the cursor; reserve that offset too.
            cursor = surface.ensure_page_size(cursor, (height + 0.5 * ls) / ls)?;
            surface.paragraph(
                &text,
                margin_x,
                cursor.y + 0.5 * ls,
                BODY_SIZE,
                FontStyle::Normal,
                usable,
                Align::Left,
            )?;
            cursor = cursor.down(height);
        }
    }

    Ok(cursor)
}

/// Bold label immediately followed by a normal-weight value.
fn labeled_value(surface: &mut Surface<'_>, y: f32, label: &str, value: &str) -> Result<()> {
    let margin_x = surface.margin_x();
    let label_width = surface.measure(label, BODY_SIZE, FontStyle::Bold, None)?.w;
    surface.text(label, margin_x, y, BODY_SIZE, FontStyle::Bold)?;
    surface.text(value, margin_x + label_width, y, BODY_SIZE, FontStyle::Normal)?;
    Ok(())
}

pub fn render_certificates(
    surface: &mut Surface<'_>,
    cursor: Cursor,
    certificates: &[Certificate],
) -> Result<Cursor> {
    let ls = surface.line_spacing();
    let mut cursor = section_heading(surface, cursor, CvSection::Certificates, 1.0, 1.0)?;

    for certificate in certificates {
        cursor = cursor.down(ls);
        cursor = surface.ensure_page_size(cursor, 4.0)?;
        surface.text(&certificate.name, surface.margin_x(), cursor.y, CERTIFICATE_SIZE, FontStyle::Bold)?;

        cursor = cursor.down(0.7 * ls);
        labeled_value(surface, cursor.y, "Issuer:", &certificate.issuing_organization)?;

        cursor = cursor.down(0.7 * ls);
        labeled_value(surface, cursor.y, "Earned:", &certificate.acquired_when.month_year())?;

        if let Some(id) = certificate.verification_id.as_deref().filter(|id| !id.is_empty()) {
            cursor = cursor.down(0.7 * ls);
            labeled_value(surface, cursor.y, "Verification ID: ", id)?;
        }
    }

    Ok(cursor)
}

/// Proficiency as printed by the configured grader.
pub fn proficiency_label(grader: LanguageGrader, proficiency: LanguageProficiency) -> &'static str {
    match grader {
        LanguageGrader::Cefr => proficiency.code(),
        LanguageGrader::Common => proficiency.phrase(),
    }
}

pub fn render_languages(
    surface: &mut Surface<'_>,
    cursor: Cursor,
    languages: &[Language],
) -> Result<Cursor> {
    let ls = surface.line_spacing();
    let grader = surface.config().language_grader;
    let mut cursor = section_heading(surface, cursor, CvSection::Languages, 1.0, 2.0)?;

    for language in languages {
        cursor = cursor.down(ls);
        cursor = surface.ensure_page_size(cursor, 1.0)?;
        surface.text(&language.language, surface.margin_x(), cursor.y, BODY_SIZE, FontStyle::Bold)?;
        let label = proficiency_label(grader, language.proficiency);
        surface.text_right(label, cursor.y, BODY_SIZE, FontStyle::Normal)?;
    }

    Ok(cursor)
}

type RenderFn = fn(&mut Surface<'_>, Cursor, &CvInformation) -> Result<Cursor>;

/// How one layout entry is gated and drawn.
pub struct SectionEntry {
    pub section: CvSection,
    pub has_content: fn(&CvInformation) -> bool,
    pub render: RenderFn,
    /// Extra space before the closing rule, in line spacings.
    pub trailing_gap: f32,
}

fn non_empty<T>(items: &Option<Vec<T>>) -> bool {
    items.as_ref().is_some_and(|items| !items.is_empty())
}

fn about_entry(surface: &mut Surface<'_>, cursor: Cursor, cv: &CvInformation) -> Result<Cursor> {
    render_about(surface, cursor, cv.about.as_deref().unwrap_or_default())
}

fn skills_entry(surface: &mut Surface<'_>, cursor: Cursor, cv: &CvInformation) -> Result<Cursor> {
    render_skills(surface, cursor, &cv.skill_details)
}

fn experiences_entry(surface: &mut Surface<'_>, cursor: Cursor, cv: &CvInformation) -> Result<Cursor> {
    render_experiences(surface, cursor, cv.experiences.as_deref().unwrap_or_default())
}

fn projects_entry(surface: &mut Surface<'_>, cursor: Cursor, cv: &CvInformation) -> Result<Cursor> {
    render_projects(surface, cursor, cv.projects.as_deref().unwrap_or_default())
}

fn education_entry(surface: &mut Surface<'_>, cursor: Cursor, cv: &CvInformation) -> Result<Cursor> {
    render_educations(surface, cursor, cv.educations.as_deref().unwrap_or_default())
}

fn certificates_entry(surface: &mut Surface<'_>, cursor: Cursor, cv: &CvInformation) -> Result<Cursor> {
    render_certificates(surface, cursor, cv.certificates.as_deref().unwrap_or_default())
}

fn languages_entry(surface: &mut Surface<'_>, cursor: Cursor, cv: &CvInformation) -> Result<Cursor> {
    render_languages(surface, cursor, cv.languages.as_deref().unwrap_or_default())
}

/// Dispatch table, indexed in [`CvSection::ALL`] order.
pub static SECTION_TABLE: [SectionEntry; 7] = [
    SectionEntry {
        section: CvSection::About,
        has_content: |cv| cv.about.is_some(),
        render: about_entry,
        trailing_gap: 0.0,
    },
    SectionEntry {
        section: CvSection::Skills,
        has_content: |cv| !cv.skill_details.is_empty(),
        render: skills_entry,
        trailing_gap: 0.7,
    },
    SectionEntry {
        section: CvSection::Experiences,
        has_content: |cv| non_empty(&cv.experiences),
        render: experiences_entry,
        trailing_gap: 0.7,
    },
    SectionEntry {
        section: CvSection::Projects,
        has_content: |cv| non_empty(&cv.projects),
        render: projects_entry,
        trailing_gap: 0.7,
    },
    SectionEntry {
        section: CvSection::Education,
        has_content: |cv| non_empty(&cv.educations),
        render: education_entry,
        trailing_gap: 0.7,
    },
    SectionEntry {
        section: CvSection::Certificates,
        has_content: |cv| non_empty(&cv.certificates),
        render: certificates_entry,
        trailing_gap: 0.7,
    },
    SectionEntry {
        section: CvSection::Languages,
        has_content: |cv| non_empty(&cv.languages),
        render: languages_entry,
        trailing_gap: 0.7,
    },
];

pub fn entry_for(section: CvSection) -> &'static SectionEntry {
    &SECTION_TABLE[section as usize]
}
