use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::document::skills::SkillSet;

/// The canonical in-memory CV. Every field defaults, so partial payloads from the
/// wizard or an imported CV deserialize without error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CVDocument {
    #[serde(deserialize_with = "null_as_default")]
    pub personal: PersonalDetails,
    #[serde(deserialize_with = "null_as_default")]
    pub summary: String,
    #[serde(deserialize_with = "null_as_default")]
    pub experience: Vec<Experience>,
    #[serde(deserialize_with = "null_as_default")]
    pub education: Vec<Education>,
    pub skills: SkillSet,
    #[serde(deserialize_with = "null_as_default")]
    pub sections: ExtraSections,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<CoverLetter>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalDetails {
    #[serde(deserialize_with = "null_as_default")]
    pub full_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(deserialize_with = "null_as_default")]
    pub phone: String,
    #[serde(deserialize_with = "null_as_default")]
    pub location: String,
    pub linkedin_url: Option<String>,
    pub website_url: Option<String>,
    pub github_url: Option<String>,
    pub desired_position: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PersonalField {
    FullName,
    Email,
    Phone,
    Location,
    LinkedinUrl,
    WebsiteUrl,
    GithubUrl,
    DesiredPosition,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Experience {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub job_title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub company: String,
    pub location: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub start_date: String,
    pub end_date: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub is_current: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub achievements: Vec<String>,
}

/// Partial update for one experience entry. Absent fields are left alone;
/// an empty string clears an optional field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExperiencePatch {
    pub job_title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub is_current: Option<bool>,
    pub achievements: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Education {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub degree: String,
    #[serde(deserialize_with = "null_as_default")]
    pub institution: String,
    pub location: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub start_date: String,
    pub end_date: Option<String>,
    pub grade: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EducationPatch {
    pub degree: Option<String>,
    pub institution: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub grade: Option<String>,
}

/// Loosely-typed optional sections. Entries are open records with no validation;
/// the renderer reads well-known keys (`name`, `title`, `issuer`, ...) when present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtraSections {
    #[serde(deserialize_with = "null_as_default")]
    pub projects: Vec<Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub certifications: Vec<Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub awards: Vec<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtraSectionKind {
    Projects,
    Certifications,
    Awards,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CoverLetter {
    pub recipient_name: Option<String>,
    pub company_name: Option<String>,
    pub job_title: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub body: String,
    /// The letter's date as entered by the user. Never filled in from the clock,
    /// so rendering stays deterministic.
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CoverLetterPatch {
    pub recipient_name: Option<String>,
    pub company_name: Option<String>,
    pub job_title: Option<String>,
    pub body: Option<String>,
    pub date: Option<String>,
}

/// Treats an explicit `null` like a missing key, so imported payloads with gaps
/// still load.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl ExtraSections {
    pub fn entries(&self, kind: ExtraSectionKind) -> &[Value] {
        match kind {
            ExtraSectionKind::Projects => &self.projects,
            ExtraSectionKind::Certifications => &self.certifications,
            ExtraSectionKind::Awards => &self.awards,
        }
    }

    pub(crate) fn entries_mut(&mut self, kind: ExtraSectionKind) -> &mut Vec<Value> {
        match kind {
            ExtraSectionKind::Projects => &mut self.projects,
            ExtraSectionKind::Certifications => &mut self.certifications,
            ExtraSectionKind::Awards => &mut self.awards,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_partial_payload_deserializes_with_defaults() {
        let doc: CVDocument = serde_json::from_value(json!({
            "personal": { "fullName": "Ada Lovelace" },
            "experience": [{ "jobTitle": "Analyst" }]
        }))
        .unwrap();

        assert_eq!(doc.personal.full_name, "Ada Lovelace");
        assert_eq!(doc.personal.email, "");
        assert_eq!(doc.experience.len(), 1);
        assert!(!doc.experience[0].is_current);
        assert!(doc.experience[0].achievements.is_empty());
        assert!(doc.skills.is_empty());
        assert!(doc.cover_letter.is_none());
    }

    #[test]
    fn test_null_fields_deserialize_as_defaults() {
        let doc: CVDocument = serde_json::from_value(json!({
            "personal": { "fullName": "Ada Lovelace", "email": null, "linkedinUrl": null },
            "summary": null,
            "skills": null,
            "sections": { "projects": null },
            "experience": [{ "jobTitle": "Analyst", "achievements": null, "isCurrent": null }],
            "education": null,
            "coverLetter": { "body": null }
        }))
        .unwrap();

        assert_eq!(doc.personal.full_name, "Ada Lovelace");
        assert_eq!(doc.personal.email, "");
        assert_eq!(doc.summary, "");
        assert!(doc.skills.is_empty());
        assert!(doc.sections.projects.is_empty());
        assert!(doc.experience[0].achievements.is_empty());
        assert!(!doc.experience[0].is_current);
        assert!(doc.education.is_empty());
        assert_eq!(doc.cover_letter.unwrap().body, "");
    }

    #[test]
    fn test_null_personal_block_is_empty_details() {
        let doc: CVDocument = serde_json::from_value(json!({ "personal": null })).unwrap();
        assert_eq!(doc.personal, PersonalDetails::default());
    }

    #[test]
    fn test_empty_object_is_empty_document() {
        let doc: CVDocument = serde_json::from_str("{}").unwrap();
        assert_eq!(doc, CVDocument::default());
    }

    #[test]
    fn test_extra_sections_keep_open_records() {
        let doc: CVDocument = serde_json::from_value(json!({
            "sections": {
                "projects": [{ "name": "Compiler", "stars": 42 }]
            }
        }))
        .unwrap();
        let projects = doc.sections.entries(ExtraSectionKind::Projects);
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0]["stars"], 42);
    }
}
