//! Plain-text CV export (ATS-friendly).
//!
//! Sections follow the registry order and visibility, like the HTML renderer.

use crate::document::models::{CVDocument, ExtraSectionKind};
use crate::render::dates::{display_date, DateFormatter};
use crate::render::fragments::{category_title, list_field, text_field};
use crate::sections::{SectionRegistry, SectionType};

pub fn render_text(
    document: &CVDocument,
    sections: &SectionRegistry,
    dates: &dyn DateFormatter,
) -> String {
    let mut lines: Vec<String> = Vec::new();
    let personal = &document.personal;

    let name = personal.full_name.trim();
    if !name.is_empty() {
        lines.push(name.to_uppercase());
        lines.push("=".repeat(name.chars().count()));
    }
    if let Some(position) = personal
        .desired_position
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
    {
        lines.push(position.to_string());
    }
    for (label, value) in [
        ("Phone", Some(personal.phone.as_str())),
        ("Email", Some(personal.email.as_str())),
        ("Location", Some(personal.location.as_str())),
        ("LinkedIn", personal.linkedin_url.as_deref()),
        ("GitHub", personal.github_url.as_deref()),
        ("Website", personal.website_url.as_deref()),
    ] {
        if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
            lines.push(format!("{label}: {value}"));
        }
    }
    if !lines.is_empty() {
        lines.push(String::new());
    }

    for section in sections.visible_sections_in_order() {
        let body = section_lines(document, section.kind, dates);
        if body.is_empty() {
            continue;
        }
        let heading = match section.kind {
            SectionType::Projects => "KEY PROJECTS".to_string(),
            kind => kind.title().to_uppercase(),
        };
        let underline = "-".repeat(heading.chars().count());
        lines.push(heading);
        lines.push(underline);
        lines.extend(body);
    }

    lines.join("\n")
}

fn section_lines(
    document: &CVDocument,
    kind: SectionType,
    dates: &dyn DateFormatter,
) -> Vec<String> {
    let mut lines = Vec::new();
    match kind {
        SectionType::Summary => {
            let summary = document.summary.trim();
            if summary.is_empty() {
                return lines;
            }
            lines.push(summary.to_string());
            lines.push(String::new());
        }
        SectionType::Skills => {
            for category in document.skills.iter() {
                let skills: Vec<&str> = category
                    .skills
                    .iter()
                    .map(|s| s.trim())
                    .filter(|s| !s.is_empty())
                    .collect();
                if !skills.is_empty() {
                    let title = category_title(&category.name);
                    lines.push(format!("{title}: {}", skills.join(", ")));
                }
            }
            if !lines.is_empty() {
                lines.push(String::new());
            }
        }
        SectionType::Experience => {
            for entry in &document.experience {
                lines.push(joined(&[entry.job_title.as_str(), entry.company.as_str()]));
                let end = if entry.is_current {
                    Some(dates.present_label().to_string())
                } else {
                    entry.end_date.as_deref().map(|e| display_date(dates, e))
                };
                let range = span(dates, &entry.start_date, end);
                let location = entry.location.as_deref().unwrap_or_default();
                let meta = joined(&[range.as_str(), location]);
                if !meta.is_empty() {
                    lines.push(meta);
                }
                for achievement in entry.achievements.iter().filter(|a| !a.trim().is_empty()) {
                    lines.push(format!("• {}", achievement.trim()));
                }
                lines.push(String::new());
            }
        }
        SectionType::Education => {
            for entry in &document.education {
                lines.push(joined(&[entry.degree.as_str(), entry.institution.as_str()]));
                let end = entry.end_date.as_deref().map(|e| display_date(dates, e));
                let range = span(dates, &entry.start_date, end);
                let grade = entry.grade.as_deref().unwrap_or_default();
                let meta = joined(&[range.as_str(), grade]);
                if !meta.is_empty() {
                    lines.push(meta);
                }
                lines.push(String::new());
            }
        }
        SectionType::Projects => {
            for value in document.sections.entries(ExtraSectionKind::Projects) {
                lines.push(text_field(value, &["name", "title"]).unwrap_or_default());
                if let Some(description) = text_field(value, &["description", "summary"]) {
                    lines.push(format!("Description: {description}"));
                }
                let tech = list_field(value, &["technologies", "techStack", "tech_stack"]);
                if !tech.is_empty() {
                    lines.push(format!("Technologies: {}", tech.join(", ")));
                }
                lines.push(String::new());
            }
        }
        SectionType::Certifications | SectionType::Awards => {
            let extra = if kind == SectionType::Awards {
                ExtraSectionKind::Awards
            } else {
                ExtraSectionKind::Certifications
            };
            for value in document.sections.entries(extra) {
                let title = text_field(value, &["name", "title"]).unwrap_or_default();
                let issuer = text_field(value, &["issuer", "organization"]).unwrap_or_default();
                lines.push(joined(&[title.as_str(), issuer.as_str()]));
                if let Some(date) = text_field(value, &["date", "dateIssued", "date_issued"]) {
                    lines.push(display_date(dates, &date));
                }
                lines.push(String::new());
            }
        }
    }
    lines
}

/// "start - end"; either side may be missing.
fn span(dates: &dyn DateFormatter, start: &str, end: Option<String>) -> String {
    let start = match start.trim() {
        "" => String::new(),
        s => display_date(dates, s),
    };
    let end = end.unwrap_or_default();
    match (start.is_empty(), end.is_empty()) {
        (false, false) => format!("{start} - {end}"),
        (false, true) => start,
        (true, _) => end,
    }
}

fn joined(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::models::{ExperiencePatch, PersonalField};
    use crate::render::dates::MonthYearFormatter;
    use crate::sections::SectionRegistry;
    use serde_json::json;

    fn sample() -> CVDocument {
        CVDocument::default()
            .set_personal_field(PersonalField::FullName, "John Doe")
            .set_personal_field(PersonalField::Email, "john@example.com")
            .set_personal_field(PersonalField::Phone, "+1 555 0100")
            .set_summary("Backend engineer.")
            .set_skills("technical", vec!["Rust".into(), "SQL".into()])
            .add_experience()
            .update_experience(
                0,
                &ExperiencePatch {
                    job_title: Some("Engineer".into()),
                    company: Some("Acme".into()),
                    location: Some("Berlin".into()),
                    start_date: Some("2020-01".into()),
                    is_current: Some(true),
                    achievements: Some(vec!["Shipped v2".into()]),
                    ..Default::default()
                },
            )
            .set_extra_section(
                ExtraSectionKind::Projects,
                vec![json!({"name": "cvgenius", "technologies": ["Rust", "axum"]})],
            )
    }

    #[test]
    fn test_text_export_layout() {
        let dates = MonthYearFormatter::default();
        let text = render_text(&sample(), &SectionRegistry::default(), &dates);
        let expected = "\
JOHN DOE
========
Phone: +1 555 0100
Email: john@example.com

PROFESSIONAL SUMMARY
--------------------
Backend engineer.

SKILLS
------
Technical: Rust, SQL

WORK EXPERIENCE
---------------
Engineer | Acme
Jan 2020 - Present | Berlin
• Shipped v2

KEY PROJECTS
------------
cvgenius
Technologies: Rust, axum
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_text_export_respects_hidden_sections() {
        let dates = MonthYearFormatter::default();
        let mut registry = SectionRegistry::default();
        registry.toggle_enabled("experience");
        let text = render_text(&sample(), &registry, &dates);
        assert!(!text.contains("WORK EXPERIENCE"));
        assert!(text.contains("PROFESSIONAL SUMMARY"));
    }

    #[test]
    fn test_text_export_of_empty_document() {
        let dates = MonthYearFormatter::default();
        let text = render_text(&CVDocument::default(), &SectionRegistry::default(), &dates);
        assert_eq!(text, "");
    }
}
