// Template Renderer and Preview Surface.
// (document, template, sections) → standalone HTML; no I/O, no clock, no failure modes.

pub mod cover_letter;
pub mod dates;
pub(crate) mod fragments;
pub mod html;
pub mod preview;
pub mod templates;

pub use cover_letter::render_cover_letter;
pub use dates::{DateFormatter, DateLocale, MonthYearFormatter};
pub use html::{render, RenderMode, RenderOptions};
pub use preview::{InlineCommit, PreviewFrame};
pub use templates::TemplateId;

/// Escapes text for use in HTML element content and double-quoted attributes.
pub(crate) fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
