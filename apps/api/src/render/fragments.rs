//! Per-section markup builders.
//!
//! Each builder returns the inner markup of one section, or `None` when the
//! document has nothing to show for it. Lookup is keyed by `(SectionType,
//! TemplateId)`: templates share the default builders and override only where
//! their layout differs.

use std::fmt::Write;

use serde_json::Value;

use crate::document::models::{CVDocument, Education, Experience, ExtraSectionKind};
use crate::render::dates::{date_range, display_date, DateFormatter};
use crate::render::escape_html;
use crate::render::templates::TemplateId;
use crate::sections::SectionType;

pub(crate) struct FragmentContext<'a> {
    pub dates: &'a dyn DateFormatter,
}

pub(crate) type FragmentBuilder = fn(&CVDocument, &FragmentContext<'_>) -> Option<String>;

pub(crate) fn builder_for(kind: SectionType, template: TemplateId) -> FragmentBuilder {
    match (kind, template) {
        (SectionType::Summary, TemplateId::Executive) => summary_lead,
        (SectionType::Summary, _) => summary_paragraphs,
        (SectionType::Skills, TemplateId::Tech | TemplateId::Creative) => skills_tags,
        (SectionType::Skills, _) => skills_list,
        (SectionType::Experience, _) => experience_entries,
        (SectionType::Education, _) => education_entries,
        (SectionType::Projects, _) => project_entries,
        (SectionType::Certifications, _) => certification_entries,
        (SectionType::Awards, _) => award_entries,
    }
}

/// Hint shown in editing mode in place of an empty section.
pub(crate) fn placeholder_hint(kind: SectionType) -> &'static str {
    match kind {
        SectionType::Summary => "Add a short professional summary",
        SectionType::Skills => "Add your skills, grouped by category",
        SectionType::Experience => "Add your work experience",
        SectionType::Education => "Add your education",
        SectionType::Projects => "Add a project you are proud of",
        SectionType::Certifications => "Add your certifications",
        SectionType::Awards => "Add awards and recognition",
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Summary
// ────────────────────────────────────────────────────────────────────────────

fn summary_paragraphs(doc: &CVDocument, _ctx: &FragmentContext<'_>) -> Option<String> {
    let paragraphs = paragraphs(&doc.summary);
    if paragraphs.is_empty() {
        return None;
    }
    Some(
        paragraphs
            .iter()
            .map(|p| format!("<p>{}</p>", escape_html(p)))
            .collect(),
    )
}

fn summary_lead(doc: &CVDocument, _ctx: &FragmentContext<'_>) -> Option<String> {
    let paragraphs = paragraphs(&doc.summary);
    let (lead, rest) = paragraphs.split_first()?;
    let mut out = format!("<p class=\"cv-lead\">{}</p>", escape_html(lead));
    for p in rest {
        let _ = write!(out, "<p>{}</p>", escape_html(p));
    }
    Some(out)
}

// ────────────────────────────────────────────────────────────────────────────
// Skills
// ────────────────────────────────────────────────────────────────────────────

fn skills_list(doc: &CVDocument, _ctx: &FragmentContext<'_>) -> Option<String> {
    let mut items = String::new();
    for category in doc.skills.iter() {
        let skills = non_blank(&category.skills);
        if skills.is_empty() {
            continue;
        }
        let _ = write!(
            items,
            "<li><span class=\"cv-skill-category\">{}:</span> {}</li>",
            escape_html(&category_title(&category.name)),
            escape_html(&skills.join(", "))
        );
    }
    if items.is_empty() {
        return None;
    }
    Some(format!("<ul class=\"cv-skills\">{items}</ul>"))
}

fn skills_tags(doc: &CVDocument, _ctx: &FragmentContext<'_>) -> Option<String> {
    let mut out = String::new();
    for category in doc.skills.iter() {
        let skills = non_blank(&category.skills);
        if skills.is_empty() {
            continue;
        }
        let _ = write!(
            out,
            "<div class=\"cv-entry\"><div class=\"cv-skill-category\">{}</div>\
             <ul class=\"cv-tags\">",
            escape_html(&category_title(&category.name))
        );
        for skill in skills {
            let _ = write!(out, "<li>{}</li>", escape_html(skill));
        }
        out.push_str("</ul></div>");
    }
    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Experience & education
// ────────────────────────────────────────────────────────────────────────────

fn experience_entries(doc: &CVDocument, ctx: &FragmentContext<'_>) -> Option<String> {
    if doc.experience.is_empty() {
        return None;
    }
    Some(doc.experience.iter().map(|e| experience_entry(e, ctx)).collect())
}

fn experience_entry(entry: &Experience, ctx: &FragmentContext<'_>) -> String {
    let dates = date_range(
        ctx.dates,
        &entry.start_date,
        entry.end_date.as_deref(),
        entry.is_current,
    );
    let mut out = String::from("<article class=\"cv-entry\">");
    entry_head(&mut out, &entry.job_title, &dates);
    entry_sub(&mut out, &entry.company, entry.location.as_deref());

    let achievements = non_blank(&entry.achievements);
    if !achievements.is_empty() {
        out.push_str("<ul>");
        for achievement in achievements {
            let _ = write!(out, "<li>{}</li>", escape_html(achievement));
        }
        out.push_str("</ul>");
    }
    out.push_str("</article>");
    out
}

fn education_entries(doc: &CVDocument, ctx: &FragmentContext<'_>) -> Option<String> {
    if doc.education.is_empty() {
        return None;
    }
    Some(doc.education.iter().map(|e| education_entry(e, ctx)).collect())
}

fn education_entry(entry: &Education, ctx: &FragmentContext<'_>) -> String {
    let dates = date_range(ctx.dates, &entry.start_date, entry.end_date.as_deref(), false);
    let mut out = String::from("<article class=\"cv-entry\">");
    entry_head(&mut out, &entry.degree, &dates);
    entry_sub(&mut out, &entry.institution, entry.location.as_deref());
    if let Some(grade) = entry.grade.as_deref().filter(|g| !g.trim().is_empty()) {
        let _ = write!(out, "<div>{}</div>", escape_html(grade));
    }
    out.push_str("</article>");
    out
}

fn entry_head(out: &mut String, title: &str, dates: &str) {
    let _ = write!(
        out,
        "<div class=\"cv-entry-head\"><h3>{}</h3>",
        escape_html(title)
    );
    if !dates.is_empty() {
        let _ = write!(out, "<span class=\"cv-dates\">{}</span>", escape_html(dates));
    }
    out.push_str("</div>");
}

fn entry_sub(out: &mut String, primary: &str, location: Option<&str>) {
    let parts: Vec<&str> = [Some(primary), location]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    if !parts.is_empty() {
        let _ = write!(
            out,
            "<div class=\"cv-entry-sub\">{}</div>",
            escape_html(&parts.join(" · "))
        );
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Loosely-typed sections
// ────────────────────────────────────────────────────────────────────────────

fn project_entries(doc: &CVDocument, _ctx: &FragmentContext<'_>) -> Option<String> {
    open_entries(doc, ExtraSectionKind::Projects, |value, out| {
        let name = text_field(value, &["name", "title"]).unwrap_or_default();
        let _ = write!(out, "<div class=\"cv-entry-head\"><h3>{}</h3>", escape_html(&name));
        if let Some(href) = text_field(value, &["url", "link"]).and_then(|u| safe_href(&u)) {
            let _ = write!(out, "<a class=\"cv-dates\" href=\"{href}\">{href}</a>");
        }
        out.push_str("</div>");
        if let Some(description) = text_field(value, &["description", "summary"]) {
            let _ = write!(out, "<p>{}</p>", escape_html(&description));
        }
        let tech = list_field(value, &["technologies", "techStack", "tech_stack"]);
        if !tech.is_empty() {
            let _ = write!(
                out,
                "<div class=\"cv-entry-sub\">{}</div>",
                escape_html(&tech.join(", "))
            );
        }
    })
}

fn certification_entries(doc: &CVDocument, ctx: &FragmentContext<'_>) -> Option<String> {
    open_entries(doc, ExtraSectionKind::Certifications, |value, out| {
        let name = text_field(value, &["name", "title"]).unwrap_or_default();
        let date = text_field(value, &["date", "dateIssued", "date_issued"])
            .map(|d| display_date(ctx.dates, &d))
            .unwrap_or_default();
        entry_head(out, &name, &date);
        let issuer = text_field(value, &["issuer", "organization"]).unwrap_or_default();
        entry_sub(out, &issuer, None);
    })
}

fn award_entries(doc: &CVDocument, ctx: &FragmentContext<'_>) -> Option<String> {
    open_entries(doc, ExtraSectionKind::Awards, |value, out| {
        let title = text_field(value, &["title", "name"]).unwrap_or_default();
        let date = text_field(value, &["date"])
            .map(|d| display_date(ctx.dates, &d))
            .unwrap_or_default();
        entry_head(out, &title, &date);
        let issuer = text_field(value, &["issuer", "organization"]).unwrap_or_default();
        entry_sub(out, &issuer, None);
        if let Some(description) = text_field(value, &["description"]) {
            let _ = write!(out, "<p>{}</p>", escape_html(&description));
        }
    })
}

fn open_entries(
    doc: &CVDocument,
    kind: ExtraSectionKind,
    render_entry: impl Fn(&Value, &mut String),
) -> Option<String> {
    let entries: Vec<&Value> = doc
        .sections
        .entries(kind)
        .iter()
        .filter(|v| !v.is_null())
        .collect();
    if entries.is_empty() {
        return None;
    }
    let mut out = String::new();
    for value in entries {
        out.push_str("<article class=\"cv-entry\">");
        render_entry(value, &mut out);
        out.push_str("</article>");
    }
    Some(out)
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// First non-blank string (or number) found under any of `keys`. A bare string
/// entry is treated as its own name.
pub(crate) fn text_field(value: &Value, keys: &[&str]) -> Option<String> {
    if let Some(s) = value.as_str() {
        return (keys.contains(&"name") || keys.contains(&"title"))
            .then(|| s.trim().to_string())
            .filter(|s| !s.is_empty());
    }
    keys.iter().find_map(|key| match value.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// String list under any of `keys`; a comma-separated string is split.
pub(crate) fn list_field(value: &Value, keys: &[&str]) -> Vec<String> {
    for key in keys {
        match value.get(key) {
            Some(Value::Array(items)) => {
                return items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            }
            Some(Value::String(s)) => {
                return s
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            }
            _ => continue,
        }
    }
    Vec::new()
}

fn paragraphs(text: &str) -> Vec<&str> {
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

fn non_blank(items: &[String]) -> Vec<&str> {
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect()
}

/// "technical" → "Technical", "soft_skills" → "Soft Skills".
pub(crate) fn category_title(name: &str) -> String {
    name.replace(['_', '-'], " ")
        .split_whitespace()
        .map(|w| {
            let mut c = w.chars();
            match c.next() {
                None => String::new(),
                Some(f) => f.to_uppercase().to_string() + c.as_str(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Escaped href for http(s) and mailto links; anything else is not linked.
pub(crate) fn safe_href(url: &str) -> Option<String> {
    let url = url.trim();
    let lower = url.to_ascii_lowercase();
    if lower.starts_with("https://") || lower.starts_with("http://") || lower.starts_with("mailto:")
    {
        Some(escape_html(url))
    } else {
        None
    }
}
