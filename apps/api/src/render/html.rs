//! Template renderer: (document, template, sections) → standalone HTML page.
//!
//! Pure and deterministic: the same inputs always produce byte-identical output.
//! Nothing here reads the clock or any global state, and no input can make it fail;
//! missing fields simply render as empty text (or as a hint in editing mode).

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::document::models::{CVDocument, PersonalDetails};
use crate::render::dates::DateFormatter;
use crate::render::escape_html;
use crate::render::fragments::{builder_for, placeholder_hint, safe_href, FragmentContext};
use crate::render::templates::TemplateId;
use crate::sections::SectionRegistry;

/// Editing mode shows "add content" hints for empty sections; preview mode omits them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    Editing,
    #[default]
    Preview,
}

pub struct RenderOptions<'a> {
    pub mode: RenderMode,
    pub dates: &'a dyn DateFormatter,
    /// Value of the page's `lang` attribute.
    pub language: &'a str,
}

/// A complete HTML document ready for a preview frame or export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkupOutput {
    pub html: String,
}

impl MarkupOutput {
    pub fn into_string(self) -> String {
        self.html
    }
}

/// Content-Security-Policy for rendered pages: inline styles only, never scripts.
const CONTENT_POLICY: &str =
    "default-src 'none'; style-src 'unsafe-inline'; img-src data: https:; font-src data: https:";

/// Renders the CV. Only the registry's visible sections appear, in registry order.
pub fn render(
    document: &CVDocument,
    template: TemplateId,
    sections: &SectionRegistry,
    options: &RenderOptions<'_>,
) -> MarkupOutput {
    let ctx = FragmentContext {
        dates: options.dates,
    };

    let mut body = String::new();
    body.push_str(&render_header(&document.personal, options.mode));
    body.push_str("<main class=\"cv-body\">");
    for section in sections.visible_sections_in_order() {
        let builder = builder_for(section.kind, template);
        let inner = match (builder(document, &ctx), options.mode) {
            (Some(inner), _) => inner,
            (None, RenderMode::Editing) => format!(
                "<p class=\"cv-placeholder\">{}</p>",
                placeholder_hint(section.kind)
            ),
            (None, RenderMode::Preview) => continue,
        };
        let _ = write!(
            body,
            "<section class=\"cv-section cv-section-{kind}\" data-section=\"{id}\">\
             <h2>{title}</h2>{inner}</section>",
            kind = section.kind.as_str(),
            id = escape_html(&section.id),
            title = section.kind.title(),
        );
    }
    body.push_str("</main>");

    let title = match document.personal.full_name.trim() {
        "" => "Curriculum Vitae".to_string(),
        name => format!("{name} – CV"),
    };

    MarkupOutput {
        html: page_shell(&title, template, options.language, "cv", &body),
    }
}

/// Name, desired position and contact line.
pub(crate) fn render_header(personal: &PersonalDetails, mode: RenderMode) -> String {
    let mut out = String::from("<header class=\"cv-header\">");

    match (personal.full_name.trim(), mode) {
        ("", RenderMode::Editing) => out.push_str("<h1 class=\"cv-placeholder\">Your Name</h1>"),
        ("", RenderMode::Preview) => {}
        (name, _) => {
            let _ = write!(out, "<h1>{}</h1>", escape_html(name));
        }
    }

    if let Some(position) = personal
        .desired_position
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
    {
        let _ = write!(out, "<p class=\"cv-position\">{}</p>", escape_html(position));
    }

    let contact = contact_items(personal);
    if !contact.is_empty() {
        let _ = write!(out, "<p class=\"cv-contact\">{}</p>", contact.join(" · "));
    }

    out.push_str("</header>");
    out
}

fn contact_items(personal: &PersonalDetails) -> Vec<String> {
    let mut items = Vec::new();

    let email = personal.email.trim();
    if !email.is_empty() {
        items.push(match safe_href(&format!("mailto:{email}")) {
            Some(href) => format!("<a href=\"{href}\">{}</a>", escape_html(email)),
            None => escape_html(email),
        });
    }
    for plain in [personal.phone.trim(), personal.location.trim()] {
        if !plain.is_empty() {
            items.push(escape_html(plain));
        }
    }
    for url in [
        &personal.linkedin_url,
        &personal.github_url,
        &personal.website_url,
    ]
    .into_iter()
    .flatten()
    {
        let url = url.trim();
        if url.is_empty() {
            continue;
        }
        items.push(match safe_href(url) {
            Some(href) => format!("<a href=\"{href}\">{}</a>", escape_html(display_url(url))),
            None => escape_html(url),
        });
    }
    items
}

/// Drops the scheme and trailing slash for display.
fn display_url(url: &str) -> &str {
    let url = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    url.strip_suffix('/').unwrap_or(url)
}

/// Fixed page shell shared by the CV and the cover letter.
pub(crate) fn page_shell(
    title: &str,
    template: TemplateId,
    language: &str,
    kind: &str,
    body: &str,
) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="{lang}">
<head>
<meta charset="UTF-8">
<meta http-equiv="Content-Security-Policy" content="{csp}">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>{css}</style>
</head>
<body class="{kind} template-{template}">
<div class="page">
{body}
</div>
</body>
</html>
"#,
        lang = escape_html(language),
        csp = CONTENT_POLICY,
        title = escape_html(title),
        css = template.stylesheet(),
        kind = kind,
        template = template.as_str(),
        body = body,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::models::{ExperiencePatch, PersonalField};
    use crate::render::dates::MonthYearFormatter;
    use crate::sections::{Section, SectionType};

    fn options(mode: RenderMode, dates: &MonthYearFormatter) -> RenderOptions<'_> {
        RenderOptions {
            mode,
            dates,
            language: "en",
        }
    }

    fn preview(doc: &CVDocument, template: TemplateId, sections: &SectionRegistry) -> String {
        let dates = MonthYearFormatter::default();
        render(doc, template, sections, &options(RenderMode::Preview, &dates)).html
    }

    fn sample_document() -> CVDocument {
        CVDocument::default()
            .set_personal_field(PersonalField::FullName, "John Doe")
            .set_personal_field(PersonalField::Email, "john@example.com")
            .set_personal_field(PersonalField::LinkedinUrl, "https://linkedin.com/in/jd/")
            .set_summary("Engineer who ships.")
            .set_skills("technical", vec!["Rust".into(), "Go".into()])
            .add_experience()
            .update_experience(
                0,
                &ExperiencePatch {
                    job_title: Some("Engineer".into()),
                    company: Some("Acme".into()),
                    start_date: Some("2020-01".into()),
                    end_date: Some("2023-02".into()),
                    ..Default::default()
                },
            )
    }

    #[test]
    fn test_render_is_deterministic() {
        let doc = sample_document();
        let registry = SectionRegistry::default();
        for template in TemplateId::ALL {
            let a = preview(&doc, template, &registry);
            let b = preview(&doc, template, &registry);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_empty_document_renders_page_shell() {
        let dates = MonthYearFormatter::default();
        let registry = SectionRegistry::default();
        for mode in [RenderMode::Editing, RenderMode::Preview] {
            let out = render(
                &CVDocument::default(),
                TemplateId::Modern,
                &registry,
                &options(mode, &dates),
            );
            let html = out.html.as_str();
            assert!(html.starts_with("<!DOCTYPE html>"));
            assert!(html.contains("<title>Curriculum Vitae</title>"));
            assert!(html.contains("<main class=\"cv-body\">"));
            assert!(html.trim_end().ends_with("</html>"));
        }
    }

    #[test]
    fn test_editing_mode_shows_placeholders_preview_does_not() {
        let dates = MonthYearFormatter::default();
        let registry = SectionRegistry::default();
        let doc = CVDocument::default();

        let editing = render(
            &doc,
            TemplateId::Modern,
            &registry,
            &options(RenderMode::Editing, &dates),
        );
        assert!(editing.html.contains("Add your work experience"));
        assert!(editing.html.contains("Your Name"));

        let html = preview(&doc, TemplateId::Modern, &registry);
        assert!(!html.contains("cv-placeholder\">"));
        assert!(!html.contains("<section"));
    }

    #[test]
    fn test_sections_follow_registry_order_and_visibility() {
        let doc = sample_document();
        let mut registry = SectionRegistry::default();
        // Put experience first and hide skills.
        registry.reorder(2, 0);
        registry.toggle_enabled("skills");

        let html = preview(&doc, TemplateId::Classic, &registry);
        let experience = html.find("cv-section-experience").unwrap();
        let summary = html.find("cv-section-summary").unwrap();
        assert!(experience < summary);
        assert!(!html.contains("cv-section-skills"));
    }

    #[test]
    fn test_current_role_shows_present_not_stale_end_date() {
        let doc = sample_document().update_experience(
            0,
            &ExperiencePatch {
                is_current: Some(true),
                ..Default::default()
            },
        );
        // Stale end date left behind by an import that bypassed the mutation API.
        let mut doc = doc;
        doc.experience[0].end_date = Some("2023-02".into());

        let html = preview(&doc, TemplateId::Modern, &SectionRegistry::default());
        assert!(html.contains("Jan 2020 – Present"));
        assert!(!html.contains("Feb 2023"));
    }

    #[test]
    fn test_header_escapes_and_links_contacts() {
        let doc = CVDocument::default()
            .set_personal_field(PersonalField::FullName, "<b>Eve</b>")
            .set_personal_field(PersonalField::Email, "eve@example.com")
            .set_personal_field(PersonalField::WebsiteUrl, "javascript:alert(1)");
        let header = render_header(&doc.personal, RenderMode::Preview);
        assert!(header.contains("&lt;b&gt;Eve&lt;/b&gt;"));
        assert!(header.contains("href=\"mailto:eve@example.com\""));
        assert!(!header.contains("href=\"javascript"));
    }

    #[test]
    fn test_linkedin_display_strips_scheme() {
        let hidden = SectionRegistry::from_entries(Vec::new());
        let html = preview(&sample_document(), TemplateId::Tech, &hidden);
        assert!(html.contains(">linkedin.com/in/jd</a>"));
    }

    #[test]
    fn test_only_listed_sections_render() {
        let summary_only = vec![Section::new(SectionType::Summary, true)];
        let sections = SectionRegistry::from_entries(summary_only);
        let html = preview(&sample_document(), TemplateId::Minimal, &sections);
        assert!(html.contains("cv-section-summary"));
        assert!(!html.contains("cv-section-experience"));
    }
}
