//! Layout configuration
//!
//! [`LayoutConfig`] is the complete, effective configuration for one CV.
//! Callers pass a [`LayoutOverride`] per generation; the generator merges it
//! onto its base value and applies the correction rules, producing a fresh
//! value each time.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for `{field}`: {value} (must be {requirement})")]
    InvalidValue {
        field: &'static str,
        value: f32,
        requirement: &'static str,
    },

    #[error("unknown CV section `{0}`")]
    UnknownSection(String),

    #[error("invalid layout configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TitleLocation {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactOrientation {
    #[default]
    Horizontal,
    Vertical,
}

/// How language proficiency is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageGrader {
    #[default]
    Common,
    Cefr,
}

/// The sections a layout can list, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "SectionRepr")]
pub enum CvSection {
    About,
    Skills,
    Experiences,
    Projects,
    Education,
    Certificates,
    Languages,
}

impl CvSection {
    pub const ALL: [CvSection; 7] = [
        CvSection::About,
        CvSection::Skills,
        CvSection::Experiences,
        CvSection::Projects,
        CvSection::Education,
        CvSection::Certificates,
        CvSection::Languages,
    ];

    /// Heading printed above the section.
    pub fn title(self) -> &'static str {
        match self {
            CvSection::About => "About",
            CvSection::Skills => "Skills",
            CvSection::Experiences => "Experiences",
            CvSection::Projects => "Projects",
            CvSection::Education => "Education",
            CvSection::Certificates => "Certificates",
            CvSection::Languages => "Languages",
        }
    }

    pub fn from_index(index: u64) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|section| section.title().eq_ignore_ascii_case(name.trim()))
    }
}

// Layout lists arrive either as names or as the numeric indices older
// exports used.
#[derive(Deserialize)]
#[serde(untagged)]
enum SectionRepr {
    Index(u64),
    Name(String),
}

impl TryFrom<SectionRepr> for CvSection {
    type Error = ConfigError;

    fn try_from(repr: SectionRepr) -> Result<Self, Self::Error> {
        match repr {
            SectionRepr::Index(index) => {
                Self::from_index(index).ok_or_else(|| ConfigError::UnknownSection(index.to_string()))
            }
            SectionRepr::Name(name) => {
                Self::from_name(&name).ok_or(ConfigError::UnknownSection(name))
            }
        }
    }
}

/// Effective layout settings. Lengths are in document units (mm for A4).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    pub margin_x: f32,
    pub margin_y: f32,
    /// Base vertical rhythm; every section offset is a multiple of it.
    pub line_spacing: f32,
    pub font: String,
    /// Multiplier applied to every font size.
    pub font_scale: f32,
    pub title_location: TitleLocation,
    pub contact_orientation: ContactOrientation,
    pub language_grader: LanguageGrader,
    /// Sections to render, in order. Absent sections are never drawn.
    pub layout: Vec<CvSection>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            margin_x: 10.0,
            margin_y: 15.0,
            line_spacing: 7.0,
            font: "helvetica".to_string(),
            font_scale: 1.0,
            title_location: TitleLocation::Left,
            contact_orientation: ContactOrientation::Horizontal,
            language_grader: LanguageGrader::Common,
            layout: CvSection::ALL.to_vec(),
        }
    }
}

impl LayoutConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("lineSpacing", self.line_spacing)?;
        check_positive("fontScale", self.font_scale)?;
        check_non_negative("marginX", self.margin_x)?;
        check_non_negative("marginY", self.margin_y)?;
        Ok(())
    }

    /// Shallow merge: every field set in `patch` replaces the base value.
    pub fn merged(&self, patch: &LayoutOverride) -> LayoutConfig {
        LayoutConfig {
            margin_x: patch.margin_x.unwrap_or(self.margin_x),
            margin_y: patch.margin_y.unwrap_or(self.margin_y),
            line_spacing: patch.line_spacing.unwrap_or(self.line_spacing),
            font: patch.font.clone().unwrap_or_else(|| self.font.clone()),
            font_scale: patch.font_scale.unwrap_or(self.font_scale),
            title_location: patch.title_location.unwrap_or(self.title_location),
            contact_orientation: patch.contact_orientation.unwrap_or(self.contact_orientation),
            language_grader: patch.language_grader.unwrap_or(self.language_grader),
            layout: patch.layout.clone().unwrap_or_else(|| self.layout.clone()),
        }
    }

    /// A centered title only works with horizontal contacts.
    pub fn corrected(mut self) -> LayoutConfig {
        if self.title_location == TitleLocation::Center {
            self.contact_orientation = ContactOrientation::Horizontal;
        }
        self
    }

    /// Merge, validate and correct in one step.
    pub fn effective(&self, patch: &LayoutOverride) -> Result<LayoutConfig, ConfigError> {
        let merged = self.merged(patch);
        merged.validate()?;
        Ok(merged.corrected())
    }

    /// Usable line width between the horizontal margins.
    pub fn usable_width(&self, page_width: f32) -> f32 {
        page_width - 2.0 * self.margin_x
    }
}

fn check_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field,
            value,
            requirement: "a positive number",
        })
    }
}

fn check_non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field,
            value,
            requirement: "zero or more",
        })
    }
}

/// Per-call partial configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin_x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin_y: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_spacing: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_scale: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_location: Option<TitleLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_orientation: Option<ContactOrientation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_grader: Option<LanguageGrader>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<Vec<CvSection>>,
}

impl LayoutOverride {
    /// Parses an override; blank input means "no override".
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_layout(mut self, layout: impl Into<Vec<CvSection>>) -> Self {
        self.layout = Some(layout.into());
        self
    }

    pub fn with_title_location(mut self, location: TitleLocation) -> Self {
        self.title_location = Some(location);
        self
    }

    pub fn with_contact_orientation(mut self, orientation: ContactOrientation) -> Self {
        self.contact_orientation = Some(orientation);
        self
    }

    pub fn with_language_grader(mut self, grader: LanguageGrader) -> Self {
        self.language_grader = Some(grader);
        self
    }

    pub fn with_font(mut self, font: impl Into<String>) -> Self {
        self.font = Some(font.into());
        self
    }

    pub fn with_font_scale(mut self, scale: f32) -> Self {
        self.font_scale = Some(scale);
        self
    }

    pub fn with_line_spacing(mut self, spacing: f32) -> Self {
        self.line_spacing = Some(spacing);
        self
    }

    pub fn with_margins(mut self, margin_x: f32, margin_y: f32) -> Self {
        self.margin_x = Some(margin_x);
        self.margin_y = Some(margin_y);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LayoutConfig::default();
        assert_eq!(config.margin_x, 10.0);
        assert_eq!(config.margin_y, 15.0);
        assert_eq!(config.line_spacing, 7.0);
        assert_eq!(config.font, "helvetica");
        assert_eq!(config.layout, CvSection::ALL.to_vec());
    }

    #[test]
    fn test_merge_is_shallow() {
        let base = LayoutConfig::default();
        let patch = LayoutOverride::default()
            .with_layout([CvSection::Skills])
            .with_font_scale(1.2);
        let merged = base.merged(&patch);
        assert_eq!(merged.layout, vec![CvSection::Skills]);
        assert_eq!(merged.font_scale, 1.2);
        assert_eq!(merged.margin_x, base.margin_x);
        assert_eq!(base.layout.len(), 7, "base must not change");
    }

    #[test]
    fn test_center_title_forces_horizontal_contacts() {
        let patch = LayoutOverride::default()
            .with_title_location(TitleLocation::Center)
            .with_contact_orientation(ContactOrientation::Vertical);
        let config = LayoutConfig::default().effective(&patch).unwrap();
        assert_eq!(config.contact_orientation, ContactOrientation::Horizontal);

        let patch = patch.with_title_location(TitleLocation::Right);
        let config = LayoutConfig::default().effective(&patch).unwrap();
        assert_eq!(config.contact_orientation, ContactOrientation::Vertical);
    }

    #[test]
    fn test_rejects_non_positive_line_spacing() {
        let patch = LayoutOverride::default().with_line_spacing(0.0);
        let err = LayoutConfig::default().effective(&patch).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "lineSpacing",
                ..
            }
        ));
    }

    #[test]
    fn test_override_json_accepts_names_and_indices() {
        let patch = LayoutOverride::from_json(
            r#"{"layout": ["SKILLS", 0, "education"], "titleLocation": "center", "languageGrader": "cefr"}"#,
        )
        .unwrap();
        assert_eq!(
            patch.layout,
            Some(vec![CvSection::Skills, CvSection::About, CvSection::Education])
        );
        assert_eq!(patch.title_location, Some(TitleLocation::Center));
        assert_eq!(patch.language_grader, Some(LanguageGrader::Cefr));
    }

    #[test]
    fn test_override_json_rejects_unknown_section() {
        assert!(LayoutOverride::from_json(r#"{"layout": [9]}"#).is_err());
        assert!(LayoutOverride::from_json(r#"{"layout": ["HOBBIES"]}"#).is_err());
    }

    #[test]
    fn test_blank_override_json() {
        assert_eq!(LayoutOverride::from_json("  ").unwrap(), LayoutOverride::default());
    }

    #[test]
    fn test_section_serializes_as_name() {
        let json = serde_json::to_string(&CvSection::Certificates).unwrap();
        assert_eq!(json, "\"CERTIFICATES\"");
    }

    #[test]
    fn test_config_json_fills_defaults() {
        let config = LayoutConfig::from_json(r#"{"marginX": 20}"#).unwrap();
        assert_eq!(config.margin_x, 20.0);
        assert_eq!(config.line_spacing, 7.0);
    }
}
