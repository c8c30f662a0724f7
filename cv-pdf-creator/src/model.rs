//! CV data model
//!
//! Plain values deserialized from the JSON the CV form layer exports. Field
//! names follow that format (camelCase); every optional part of a CV is
//! `Option` or an empty collection and rendering never fails on absence.

use chrono::{DateTime, NaiveDate};
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognized date `{0}` (expected YYYY-MM-DD, YYYY-MM or RFC 3339)")]
pub struct ParseDateError(pub String);

/// A calendar date. Only the month and year are ever printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CvDate(NaiveDate);

impl CvDate {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Short month and full year, e.g. `Mar 2021`.
    pub fn month_year(&self) -> String {
        self.0.format("%b %Y").to_string()
    }
}

impl FromStr for CvDate {
    type Err = ParseDateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Ok(Self(date));
        }
        if let Ok(stamp) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self(stamp.date_naive()));
        }
        NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d")
            .map(Self)
            .map_err(|_| ParseDateError(s.to_string()))
    }
}

impl fmt::Display for CvDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl Serialize for CvDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CvDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webpage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_in: Option<String>,
}

impl ContactDetails {
    /// Non-blank contact values in display order.
    pub fn values(&self) -> Vec<&str> {
        [
            &self.email,
            &self.phone_number,
            &self.webpage,
            &self.github,
            &self.linked_in,
        ]
        .into_iter()
        .filter_map(|value| value.as_deref())
        .filter(|value| !value.trim().is_empty())
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    /// Years of experience; kept for the form layer, not rendered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
}

impl Skill {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            experience: None,
            featured: None,
        }
    }
}

/// Named skill groups in insertion order.
///
/// Serialized as a JSON object; the order of keys in the document is the
/// order the groups are rendered in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillGroups(Vec<(String, Vec<Skill>)>);

impl SkillGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a group, replacing an existing group of the same name in place.
    pub fn insert(&mut self, name: impl Into<String>, skills: Vec<Skill>) {
        let name = name.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = skills,
            None => self.0.push((name, skills)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&[Skill]> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, skills)| skills.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Skill])> {
        self.0
            .iter()
            .map(|(name, skills)| (name.as_str(), skills.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<N: Into<String>> FromIterator<(N, Vec<Skill>)> for SkillGroups {
    fn from_iter<I: IntoIterator<Item = (N, Vec<Skill>)>>(iter: I) -> Self {
        let mut groups = SkillGroups::new();
        for (name, skills) in iter {
            groups.insert(name, skills);
        }
        groups
    }
}

impl Serialize for SkillGroups {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, skills) in &self.0 {
            map.serialize_entry(name, skills)?;
        }
        map.end()
    }
}

struct SkillGroupsVisitor;

impl<'de> Visitor<'de> for SkillGroupsVisitor {
    type Value = SkillGroups;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of skill group names to skill lists")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut groups = SkillGroups::new();
        while let Some((name, skills)) = access.next_entry::<String, Vec<Skill>>()? {
            groups.insert(name, skills);
        }
        Ok(groups)
    }
}

impl<'de> Deserialize<'de> for SkillGroups {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(SkillGroupsVisitor)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub role: String,
    pub from_date: CvDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_date: Option<CvDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsibilities: Option<Vec<String>>,
}

impl Position {
    /// `(Mar 2021 - Current)` style range.
    pub fn date_range(&self) -> String {
        let until = self
            .to_date
            .map(|date| date.month_year())
            .unwrap_or_else(|| "Current".to_string());
        format!("({} - {})", self.from_date.month_year(), until)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub company_name: String,
    #[serde(default)]
    pub positions: Vec<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tech_stack: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub project_name: String,
    #[serde(default)]
    pub positions: Vec<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tech_stack: Option<Vec<String>>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub project_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SchoolStatus {
    Continuing,
    Completed,
    Dropped,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub school_name: String,
    #[serde(default)]
    pub school_location: String,
    pub degree: String,
    pub entrance_year: CvDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_year: Option<CvDate>,
    pub current_status: SchoolStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graduation_score: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<Vec<String>>,
}

impl Education {
    /// Degree line, with the GPA appended for completed studies.
    pub fn degree_line(&self) -> String {
        match (self.current_status, self.graduation_score) {
            (SchoolStatus::Completed, Some(score)) => format!("{} / GPA: {}", self.degree, score),
            _ => self.degree.clone(),
        }
    }

    /// `Sep 2015 - Jun 2019`. Only completed studies print an end date;
    /// the others print their status.
    pub fn date_range(&self) -> String {
        let until = match self.current_status {
            SchoolStatus::Completed => self
                .completion_year
                .map(|date| date.month_year())
                .unwrap_or_else(|| "Graduated".to_string()),
            SchoolStatus::Continuing => "Current".to_string(),
            SchoolStatus::Dropped => "Dropped".to_string(),
        };
        format!("{} - {}", self.entrance_year.month_year(), until)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub name: String,
    #[serde(default)]
    pub issuing_organization: String,
    pub acquired_when: CvDate,
    /// Expiry date; stored but not printed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ends_when: Option<CvDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LanguageProficiency {
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
    Native,
}

impl LanguageProficiency {
    /// CEFR code as printed by the `cefr` grader.
    pub fn code(self) -> &'static str {
        match self {
            LanguageProficiency::A1 => "A1",
            LanguageProficiency::A2 => "A2",
            LanguageProficiency::B1 => "B1",
            LanguageProficiency::B2 => "B2",
            LanguageProficiency::C1 => "C1",
            LanguageProficiency::C2 => "C2",
            LanguageProficiency::Native => "NATIVE",
        }
    }

    /// Plain-language phrase printed by the `common` grader.
    pub fn phrase(self) -> &'static str {
        match self {
            LanguageProficiency::A1 | LanguageProficiency::A2 => "Elementary Proficiency",
            LanguageProficiency::B1 => "Limited Working Proficiency",
            LanguageProficiency::B2 => "Professional Working Proficiency",
            LanguageProficiency::C1 | LanguageProficiency::C2 => "Full Professional Proficiency",
            LanguageProficiency::Native => "Native / Bilingual Proficiency",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Language {
    pub language: String,
    pub proficiency: LanguageProficiency,
}

/// Everything printed on a CV.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvInformation {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub personal_title: String,
    #[serde(default)]
    pub contact_informations: ContactDetails,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    #[serde(default)]
    pub skill_details: SkillGroups,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experiences: Option<Vec<Experience>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projects: Option<Vec<Project>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub educations: Option<Vec<Education>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificates: Option<Vec<Certificate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<Language>>,
}

impl CvInformation {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// `Jane_Doe_CV.pdf`, or `CV.pdf` when the name is blank.
    pub fn file_name(&self) -> String {
        let words: Vec<&str> = self.name.split_whitespace().collect();
        if words.is_empty() {
            "CV.pdf".to_string()
        } else {
            format!("{}_CV.pdf", words.join("_"))
        }
    }
}
