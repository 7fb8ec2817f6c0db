use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::models::{
    CVDocument, CoverLetterPatch, EducationPatch, ExperiencePatch, ExtraSectionKind,
    PersonalField,
};

/// One completed user edit, as sent by the wizard or the inline preview editor.
///
/// Wire form: `{"op": "update_experience", "index": 0, "patch": {"jobTitle": "..."}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditCommand {
    SetPersonalField {
        field: PersonalField,
        value: String,
    },
    SetSummary {
        text: String,
    },
    AddExperience,
    UpdateExperience {
        index: usize,
        patch: ExperiencePatch,
    },
    RemoveExperience {
        index: usize,
    },
    AddEducation,
    UpdateEducation {
        index: usize,
        patch: EducationPatch,
    },
    RemoveEducation {
        index: usize,
    },
    SetSkills {
        category: String,
        skills: Vec<String>,
    },
    AddSkillCategory {
        name: String,
    },
    RemoveSkillCategory {
        name: String,
    },
    SetExtraSection {
        kind: ExtraSectionKind,
        entries: Vec<Value>,
    },
    SetCoverLetter {
        patch: CoverLetterPatch,
    },
}

impl EditCommand {
    pub fn apply(&self, doc: &CVDocument) -> CVDocument {
        match self {
            EditCommand::SetPersonalField { field, value } => {
                doc.set_personal_field(*field, value.clone())
            }
            EditCommand::SetSummary { text } => doc.set_summary(text.clone()),
            EditCommand::AddExperience => doc.add_experience(),
            EditCommand::UpdateExperience { index, patch } => doc.update_experience(*index, patch),
            EditCommand::RemoveExperience { index } => doc.remove_experience(*index),
            EditCommand::AddEducation => doc.add_education(),
            EditCommand::UpdateEducation { index, patch } => doc.update_education(*index, patch),
            EditCommand::RemoveEducation { index } => doc.remove_education(*index),
            EditCommand::SetSkills { category, skills } => doc.set_skills(category, skills.clone()),
            EditCommand::AddSkillCategory { name } => doc.add_skill_category(name),
            EditCommand::RemoveSkillCategory { name } => doc.remove_skill_category(name),
            EditCommand::SetExtraSection { kind, entries } => {
                doc.set_extra_section(*kind, entries.clone())
            }
            EditCommand::SetCoverLetter { patch } => doc.set_cover_letter(patch),
        }
    }

    /// Short name used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            EditCommand::SetPersonalField { .. } => "set_personal_field",
            EditCommand::SetSummary { .. } => "set_summary",
            EditCommand::AddExperience => "add_experience",
            EditCommand::UpdateExperience { .. } => "update_experience",
            EditCommand::RemoveExperience { .. } => "remove_experience",
            EditCommand::AddEducation => "add_education",
            EditCommand::UpdateEducation { .. } => "update_education",
            EditCommand::RemoveEducation { .. } => "remove_education",
            EditCommand::SetSkills { .. } => "set_skills",
            EditCommand::AddSkillCategory { .. } => "add_skill_category",
            EditCommand::RemoveSkillCategory { .. } => "remove_skill_category",
            EditCommand::SetExtraSection { .. } => "set_extra_section",
            EditCommand::SetCoverLetter { .. } => "set_cover_letter",
        }
    }
}

/// Applies a batch of commands left to right. A wizard step submits its edits as
/// one batch so the whole step lands in history as a single snapshot.
pub fn apply_all(doc: &CVDocument, commands: &[EditCommand]) -> CVDocument {
    commands
        .iter()
        .fold(doc.clone(), |current, command| command.apply(&current))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_command_wire_format() {
        let cmd: EditCommand = serde_json::from_value(json!({
            "op": "update_experience",
            "index": 0,
            "patch": { "jobTitle": "Engineer", "company": "Acme" }
        }))
        .unwrap();
        assert_eq!(
            cmd,
            EditCommand::UpdateExperience {
                index: 0,
                patch: ExperiencePatch {
                    job_title: Some("Engineer".into()),
                    company: Some("Acme".into()),
                    ..Default::default()
                }
            }
        );

        let cmd: EditCommand = serde_json::from_value(json!({ "op": "add_experience" })).unwrap();
        assert_eq!(cmd, EditCommand::AddExperience);

        let cmd: EditCommand = serde_json::from_value(json!({
            "op": "set_personal_field", "field": "fullName", "value": "John Doe"
        }))
        .unwrap();
        assert_eq!(cmd.label(), "set_personal_field");
    }

    #[test]
    fn test_apply_all_folds_in_order() {
        let commands = vec![
            EditCommand::AddExperience,
            EditCommand::UpdateExperience {
                index: 0,
                patch: ExperiencePatch {
                    job_title: Some("Engineer".into()),
                    ..Default::default()
                },
            },
            EditCommand::SetSkills {
                category: "technical".into(),
                skills: vec!["Rust".into()],
            },
        ];
        let doc = apply_all(&CVDocument::default(), &commands);
        assert_eq!(doc.experience[0].job_title, "Engineer");
        assert_eq!(doc.skills.get("technical").unwrap().len(), 1);
    }

    #[test]
    fn test_apply_all_empty_batch_is_identity() {
        let doc = CVDocument::default().set_summary("Hello");
        assert_eq!(apply_all(&doc, &[]), doc);
    }
}
