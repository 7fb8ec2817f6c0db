//! Preview Surface: sandboxed iframe payloads and inline-edit commits.
//!
//! The host mounts `srcdoc` in an `<iframe sandbox="...">` keyed by `revision`, so each
//! session change remounts the frame instead of patching a live DOM. Edits typed into
//! the preview come back as [`InlineCommit`]s and go through the normal command path.

use serde::{Deserialize, Serialize};

use crate::document::models::{CoverLetterPatch, EducationPatch, ExperiencePatch, PersonalField};
use crate::document::EditCommand;
use crate::render::html::MarkupOutput;

/// No `allow-scripts`, no `allow-same-origin`: the frame cannot run code or reach
/// the host's storage. Popups let contact links open outside the frame.
pub const FRAME_SANDBOX: &str = "allow-popups allow-popups-to-escape-sandbox";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewFrame {
    pub revision: u64,
    pub srcdoc: String,
    pub sandbox: &'static str,
}

impl PreviewFrame {
    pub fn from_markup(markup: MarkupOutput, revision: u64) -> Self {
        Self {
            revision,
            srcdoc: markup.into_string(),
            sandbox: FRAME_SANDBOX,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceField {
    JobTitle,
    Company,
    Location,
    StartDate,
    EndDate,
    /// One achievement per line.
    Achievements,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EducationField {
    Degree,
    Institution,
    Location,
    StartDate,
    EndDate,
    Grade,
}

/// The element an inline edit was made in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InlineTarget {
    Personal { field: PersonalField },
    Summary,
    Experience { index: usize, field: ExperienceField },
    Education { index: usize, field: EducationField },
    /// Comma-separated skills for one category.
    Skills { category: String },
    CoverLetterBody,
}

/// An inline edit, sent when the edited element loses focus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineCommit {
    pub target: InlineTarget,
    pub value: String,
}

impl InlineCommit {
    pub fn into_command(self) -> EditCommand {
        let value = self.value;
        match self.target {
            InlineTarget::Personal { field } => EditCommand::SetPersonalField { field, value },
            InlineTarget::Summary => EditCommand::SetSummary { text: value },
            InlineTarget::Experience { index, field } => {
                let mut patch = ExperiencePatch::default();
                match field {
                    ExperienceField::JobTitle => patch.job_title = Some(value),
                    ExperienceField::Company => patch.company = Some(value),
                    ExperienceField::Location => patch.location = Some(value),
                    ExperienceField::StartDate => patch.start_date = Some(value),
                    ExperienceField::EndDate => patch.end_date = Some(value),
                    ExperienceField::Achievements => {
                        patch.achievements = Some(
                            value
                                .lines()
                                .map(|l| l.trim().trim_start_matches(['•', '-']).trim())
                                .filter(|l| !l.is_empty())
                                .map(String::from)
                                .collect(),
                        )
                    }
                }
                EditCommand::UpdateExperience { index, patch }
            }
            InlineTarget::Education { index, field } => {
                let mut patch = EducationPatch::default();
                let slot = match field {
                    EducationField::Degree => &mut patch.degree,
                    EducationField::Institution => &mut patch.institution,
                    EducationField::Location => &mut patch.location,
                    EducationField::StartDate => &mut patch.start_date,
                    EducationField::EndDate => &mut patch.end_date,
                    EducationField::Grade => &mut patch.grade,
                };
                *slot = Some(value);
                EditCommand::UpdateEducation { index, patch }
            }
            InlineTarget::Skills { category } => EditCommand::SetSkills {
                category,
                skills: value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect(),
            },
            InlineTarget::CoverLetterBody => EditCommand::SetCoverLetter {
                patch: CoverLetterPatch {
                    body: Some(value),
                    ..Default::default()
                },
            },
        }
    }
}
