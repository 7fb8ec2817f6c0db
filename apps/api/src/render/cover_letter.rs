//! Cover letter page.
//!
//! The stored body holds only the letter text; salutation and sign-off are added here
//! from the recipient and the sender's name.

use std::fmt::Write;

use crate::document::models::CVDocument;
use crate::render::escape_html;
use crate::render::fragments::safe_href;
use crate::render::html::{page_shell, MarkupOutput, RenderMode, RenderOptions};
use crate::render::templates::TemplateId;

pub fn render_cover_letter(
    document: &CVDocument,
    template: TemplateId,
    options: &RenderOptions<'_>,
) -> MarkupOutput {
    let personal = &document.personal;
    let letter = document.cover_letter.clone().unwrap_or_default();
    let name = personal.full_name.trim();

    let mut body = String::from("<article class=\"letter\">");

    // Sender block
    body.push_str("<header class=\"cv-header\">");
    if !name.is_empty() {
        let _ = write!(body, "<h1>{}</h1>", escape_html(name));
    }
    let contact: Vec<String> = [
        personal.email.trim(),
        personal.phone.trim(),
        personal.location.trim(),
    ]
    .into_iter()
    .filter(|s| !s.is_empty())
    .map(|s| match safe_href(&format!("mailto:{s}")).filter(|_| s.contains('@')) {
        Some(href) => format!("<a href=\"{href}\">{}</a>", escape_html(s)),
        None => escape_html(s),
    })
    .collect();
    if !contact.is_empty() {
        let _ = write!(body, "<p class=\"cv-contact\">{}</p>", contact.join(" · "));
    }
    body.push_str("</header>");

    // Date and recipient
    body.push_str("<div class=\"letter-meta\">");
    if let Some(date) = letter.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        let _ = write!(body, "<p class=\"letter-date\">{}</p>", escape_html(date));
    }
    for line in [&letter.recipient_name, &letter.job_title, &letter.company_name]
        .into_iter()
        .flatten()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
    {
        let _ = write!(body, "<p class=\"letter-recipient\">{}</p>", escape_html(line));
    }
    body.push_str("</div>");

    let salutation = match letter.recipient_name.as_deref().map(str::trim) {
        Some(recipient) if !recipient.is_empty() => format!("Dear {},", escape_html(recipient)),
        _ => "Dear Hiring Manager,".to_string(),
    };
    let _ = write!(body, "<p>{salutation}</p>");

    let paragraphs: Vec<&str> = letter
        .body
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    if paragraphs.is_empty() {
        if options.mode == RenderMode::Editing {
            body.push_str("<p class=\"cv-placeholder\">Write your cover letter</p>");
        }
    } else {
        for paragraph in paragraphs {
            let _ = write!(
                body,
                "<p>{}</p>",
                escape_html(paragraph).replace('\n', "<br>")
            );
        }
    }

    body.push_str("<p class=\"letter-signoff\">Sincerely,");
    if !name.is_empty() {
        let _ = write!(body, "<br>{}", escape_html(name));
    }
    body.push_str("</p></article>");

    let title = match name {
        "" => "Cover Letter".to_string(),
        name => format!("{name} – Cover Letter"),
    };

    MarkupOutput {
        html: page_shell(&title, template, options.language, "cover-letter", &body),
    }
}
