//! Pure document mutations.
//!
//! Every operation borrows the current document and returns a new one; the input is
//! never modified, so snapshots already handed to the history stay intact. Invalid
//! indices and unknown categories produce an unchanged copy rather than an error.

use serde_json::Value;
use uuid::Uuid;

use crate::document::models::{
    CVDocument, CoverLetterPatch, Education, EducationPatch, Experience, ExperiencePatch,
    ExtraSectionKind, PersonalField,
};

impl CVDocument {
    pub fn set_personal_field(&self, field: PersonalField, value: impl Into<String>) -> Self {
        let value = value.into();
        let mut next = self.clone();
        let personal = &mut next.personal;
        match field {
            PersonalField::FullName => personal.full_name = value,
            PersonalField::Email => personal.email = value,
            PersonalField::Phone => personal.phone = value,
            PersonalField::Location => personal.location = value,
            PersonalField::LinkedinUrl => personal.linkedin_url = non_blank(value),
            PersonalField::WebsiteUrl => personal.website_url = non_blank(value),
            PersonalField::GithubUrl => personal.github_url = non_blank(value),
            PersonalField::DesiredPosition => personal.desired_position = non_blank(value),
        }
        next
    }

    pub fn set_summary(&self, text: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.summary = text.into();
        next
    }

    // ── Experience ──────────────────────────────────────────────────────────

    /// Appends a blank experience entry with a fresh id.
    pub fn add_experience(&self) -> Self {
        let mut next = self.clone();
        next.experience.push(Experience {
            id: new_entry_id(),
            ..Experience::default()
        });
        next
    }

    pub fn update_experience(&self, index: usize, patch: &ExperiencePatch) -> Self {
        let mut next = self.clone();
        if let Some(entry) = next.experience.get_mut(index) {
            apply_experience_patch(entry, patch);
        }
        next
    }

    pub fn remove_experience(&self, index: usize) -> Self {
        let mut next = self.clone();
        if index < next.experience.len() {
            next.experience.remove(index);
        }
        next
    }

    // ── Education ───────────────────────────────────────────────────────────

    pub fn add_education(&self) -> Self {
        let mut next = self.clone();
        next.education.push(Education {
            id: new_entry_id(),
            ..Education::default()
        });
        next
    }

    pub fn update_education(&self, index: usize, patch: &EducationPatch) -> Self {
        let mut next = self.clone();
        if let Some(entry) = next.education.get_mut(index) {
            if let Some(degree) = &patch.degree {
                entry.degree = degree.clone();
            }
            if let Some(institution) = &patch.institution {
                entry.institution = institution.clone();
            }
            if let Some(location) = &patch.location {
                entry.location = non_blank(location.clone());
            }
            if let Some(start) = &patch.start_date {
                entry.start_date = start.clone();
            }
            if let Some(end) = &patch.end_date {
                entry.end_date = non_blank(end.clone());
            }
            if let Some(grade) = &patch.grade {
                entry.grade = non_blank(grade.clone());
            }
        }
        next
    }

    pub fn remove_education(&self, index: usize) -> Self {
        let mut next = self.clone();
        if index < next.education.len() {
            next.education.remove(index);
        }
        next
    }

    // ── Skills ──────────────────────────────────────────────────────────────

    pub fn set_skills(&self, category: &str, skills: Vec<String>) -> Self {
        let mut next = self.clone();
        next.skills.set(category, skills);
        next
    }

    pub fn add_skill_category(&self, name: &str) -> Self {
        let mut next = self.clone();
        next.skills.add_category(name);
        next
    }

    pub fn remove_skill_category(&self, name: &str) -> Self {
        let mut next = self.clone();
        next.skills.remove_category(name);
        next
    }

    // ── Optional sections & cover letter ────────────────────────────────────

    pub fn set_extra_section(&self, kind: ExtraSectionKind, entries: Vec<Value>) -> Self {
        let mut next = self.clone();
        *next.sections.entries_mut(kind) = entries;
        next
    }

    pub fn set_cover_letter(&self, patch: &CoverLetterPatch) -> Self {
        let mut next = self.clone();
        let letter = next.cover_letter.get_or_insert_with(Default::default);
        if let Some(recipient) = &patch.recipient_name {
            letter.recipient_name = non_blank(recipient.clone());
        }
        if let Some(company) = &patch.company_name {
            letter.company_name = non_blank(company.clone());
        }
        if let Some(job_title) = &patch.job_title {
            letter.job_title = non_blank(job_title.clone());
        }
        if let Some(body) = &patch.body {
            letter.body = body.clone();
        }
        if let Some(date) = &patch.date {
            letter.date = non_blank(date.clone());
        }
        next
    }
}

fn apply_experience_patch(entry: &mut Experience, patch: &ExperiencePatch) {
    if let Some(title) = &patch.job_title {
        entry.job_title = title.clone();
    }
    if let Some(company) = &patch.company {
        entry.company = company.clone();
    }
    if let Some(location) = &patch.location {
        entry.location = non_blank(location.clone());
    }
    if let Some(start) = &patch.start_date {
        entry.start_date = start.clone();
    }
    if let Some(end) = &patch.end_date {
        entry.end_date = non_blank(end.clone());
    }
    if let Some(achievements) = &patch.achievements {
        entry.achievements = achievements.clone();
    }
    // Applied last: a current role never keeps an end date, even one set by this patch.
    if let Some(is_current) = patch.is_current {
        entry.is_current = is_current;
        if is_current {
            entry.end_date = None;
        }
    }
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

pub(crate) fn new_entry_id() -> String {
    Uuid::new_v4().to_string()
}
