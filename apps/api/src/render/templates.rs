//! Template catalogue: a closed set of visual styles.
//!
//! A template is purely presentational: a colour scheme, a font pairing and a header
//! alignment compiled into one style sheet. Adding a template means adding a variant
//! here (and, if it needs one, a fragment override in `fragments`), never a change
//! to the document schema.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateId {
    #[default]
    Modern,
    Classic,
    Minimal,
    Creative,
    Professional,
    Executive,
    Tech,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderAlign {
    Left,
    Center,
}

#[derive(Debug)]
pub struct ColorScheme {
    pub primary: &'static str,
    pub secondary: &'static str,
    pub accent: &'static str,
    pub text: &'static str,
    pub background: &'static str,
}

#[derive(Debug)]
pub struct FontPairing {
    pub header: &'static str,
    pub body: &'static str,
    pub accent: &'static str,
}

#[derive(Debug)]
pub struct Theme {
    pub colors: &'static ColorScheme,
    pub fonts: &'static FontPairing,
    pub header_align: HeaderAlign,
    pub base_font_size_pt: f32,
    pub section_spacing_mm: f32,
}

// ────────────────────────────────────────────────────────────────────────────
// Palettes and fonts
// ────────────────────────────────────────────────────────────────────────────

const TECH_COLORS: ColorScheme = ColorScheme {
    primary: "#3182ce",
    secondary: "#2d3748",
    accent: "#4299e1",
    text: "#1a202c",
    background: "#ffffff",
};

const CREATIVE_COLORS: ColorScheme = ColorScheme {
    primary: "#6b46c1",
    secondary: "#553c9a",
    accent: "#805ad5",
    text: "#2d3748",
    background: "#fefefe",
};

const BUSINESS_COLORS: ColorScheme = ColorScheme {
    primary: "#2b6cb0",
    secondary: "#1e4a72",
    accent: "#3182ce",
    text: "#1a202c",
    background: "#ffffff",
};

const FINANCE_COLORS: ColorScheme = ColorScheme {
    primary: "#1a365d",
    secondary: "#2c5282",
    accent: "#3182ce",
    text: "#1a202c",
    background: "#ffffff",
};

const MINIMAL_COLORS: ColorScheme = ColorScheme {
    primary: "#000000",
    secondary: "#4a5568",
    accent: "#718096",
    text: "#000000",
    background: "#ffffff",
};

const PROFESSIONAL_FONTS: FontPairing = FontPairing {
    header: "'Playfair Display', serif",
    body: "'Source Sans Pro', sans-serif",
    accent: "'Source Sans Pro', sans-serif",
};

const MODERN_FONTS: FontPairing = FontPairing {
    header: "'Inter', sans-serif",
    body: "'Inter', sans-serif",
    accent: "'Inter', sans-serif",
};

const CLASSIC_FONTS: FontPairing = FontPairing {
    header: "'Times New Roman', serif",
    body: "'Times New Roman', serif",
    accent: "'Times New Roman', serif",
};

const TECH_FONTS: FontPairing = FontPairing {
    header: "'Roboto', sans-serif",
    body: "'Roboto', sans-serif",
    accent: "'Roboto Mono', monospace",
};

const CREATIVE_FONTS: FontPairing = FontPairing {
    header: "'Montserrat', sans-serif",
    body: "'Open Sans', sans-serif",
    accent: "'Montserrat', sans-serif",
};

static MODERN: Theme = Theme {
    colors: &BUSINESS_COLORS,
    fonts: &MODERN_FONTS,
    header_align: HeaderAlign::Left,
    base_font_size_pt: 10.5,
    section_spacing_mm: 6.0,
};

static CLASSIC: Theme = Theme {
    colors: &MINIMAL_COLORS,
    fonts: &CLASSIC_FONTS,
    header_align: HeaderAlign::Center,
    base_font_size_pt: 11.0,
    section_spacing_mm: 5.0,
};

static MINIMAL: Theme = Theme {
    colors: &MINIMAL_COLORS,
    fonts: &MODERN_FONTS,
    header_align: HeaderAlign::Left,
    base_font_size_pt: 10.0,
    section_spacing_mm: 4.0,
};

static CREATIVE: Theme = Theme {
    colors: &CREATIVE_COLORS,
    fonts: &CREATIVE_FONTS,
    header_align: HeaderAlign::Left,
    base_font_size_pt: 10.5,
    section_spacing_mm: 7.0,
};

static PROFESSIONAL: Theme = Theme {
    colors: &BUSINESS_COLORS,
    fonts: &PROFESSIONAL_FONTS,
    header_align: HeaderAlign::Center,
    base_font_size_pt: 11.0,
    section_spacing_mm: 6.0,
};

static EXECUTIVE: Theme = Theme {
    colors: &FINANCE_COLORS,
    fonts: &PROFESSIONAL_FONTS,
    header_align: HeaderAlign::Center,
    base_font_size_pt: 11.5,
    section_spacing_mm: 7.0,
};

static TECH: Theme = Theme {
    colors: &TECH_COLORS,
    fonts: &TECH_FONTS,
    header_align: HeaderAlign::Left,
    base_font_size_pt: 10.0,
    section_spacing_mm: 5.0,
};

// ────────────────────────────────────────────────────────────────────────────
// TemplateId
// ────────────────────────────────────────────────────────────────────────────

impl TemplateId {
    pub const ALL: [TemplateId; 7] = [
        TemplateId::Modern,
        TemplateId::Classic,
        TemplateId::Minimal,
        TemplateId::Creative,
        TemplateId::Professional,
        TemplateId::Executive,
        TemplateId::Tech,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateId::Modern => "modern",
            TemplateId::Classic => "classic",
            TemplateId::Minimal => "minimal",
            TemplateId::Creative => "creative",
            TemplateId::Professional => "professional",
            TemplateId::Executive => "executive",
            TemplateId::Tech => "tech",
        }
    }

    pub fn theme(&self) -> &'static Theme {
        match self {
            TemplateId::Modern => &MODERN,
            TemplateId::Classic => &CLASSIC,
            TemplateId::Minimal => &MINIMAL,
            TemplateId::Creative => &CREATIVE,
            TemplateId::Professional => &PROFESSIONAL,
            TemplateId::Executive => &EXECUTIVE,
            TemplateId::Tech => &TECH,
        }
    }

    /// The complete style sheet for this template, deterministic for a given id.
    pub fn stylesheet(&self) -> String {
        let theme = self.theme();
        let c = theme.colors;
        let f = theme.fonts;
        let align = match theme.header_align {
            HeaderAlign::Left => "left",
            HeaderAlign::Center => "center",
        };

        format!(
            "*{{box-sizing:border-box;-webkit-print-color-adjust:exact;print-color-adjust:exact;}}\
html,body{{margin:0;padding:0;background:{bg};}}\
body{{font-family:{body};font-size:{size}pt;line-height:1.4;color:{text};}}\
.page{{max-width:210mm;min-height:297mm;margin:0 auto;padding:20mm;background:{bg};}}\
.cv-header{{text-align:{align};border-bottom:2px solid {primary};\
padding-bottom:4mm;margin-bottom:{spacing}mm;}}\
.cv-header h1{{font-family:{header};color:{primary};font-size:2.1em;margin:0;}}\
.cv-position{{font-family:{accent_font};color:{secondary};font-size:1.15em;margin:1mm 0 0;}}\
.cv-contact{{color:{secondary};margin:2mm 0 0;font-size:0.95em;}}\
.cv-contact a{{color:{accent};text-decoration:none;}}\
.cv-section{{margin-bottom:{spacing}mm;}}\
.cv-section h2{{font-family:{header};color:{primary};font-size:1.25em;\
text-transform:uppercase;letter-spacing:0.04em;\
border-bottom:1px solid {accent};margin:0 0 2mm;}}\
.cv-entry{{margin-bottom:3mm;}}\
.cv-entry-head{{display:flex;justify-content:space-between;align-items:baseline;gap:4mm;}}\
.cv-entry-head h3{{font-size:1.05em;margin:0;color:{text};}}\
.cv-dates{{color:{secondary};font-size:0.9em;white-space:nowrap;}}\
.cv-entry-sub{{color:{secondary};font-style:italic;}}\
.cv-entry ul{{margin:1mm 0 0;padding-left:5mm;}}\
.cv-skills{{list-style:none;margin:0;padding:0;}}\
.cv-skills li{{margin:0.5mm 0;}}\
.cv-skill-category{{font-weight:600;color:{secondary};}}\
.cv-tags{{display:flex;flex-wrap:wrap;gap:1.5mm;list-style:none;margin:0;padding:0;}}\
.cv-tags li{{font-family:{accent_font};border:1px solid {accent};border-radius:3px;\
padding:0.3mm 1.5mm;font-size:0.9em;}}\
.cv-lead{{font-size:1.1em;font-style:italic;}}\
.cv-placeholder{{color:#a0aec0;font-style:italic;border:1px dashed #cbd5e0;padding:2mm;}}\
.letter p{{margin:0 0 3mm;}}\
.letter-meta{{margin-bottom:{spacing}mm;}}\
@media print{{.page{{margin:0;padding:15mm;}}.cv-placeholder{{display:none;}}}}",
            bg = c.background,
            body = f.body,
            header = f.header,
            accent_font = f.accent,
            accent = c.accent,
            size = theme.base_font_size_pt,
            text = c.text,
            align = align,
            primary = c.primary,
            secondary = c.secondary,
            spacing = theme.section_spacing_mm,
        )
    }
}

impl std::fmt::Display for TemplateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TemplateId::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown template '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_round_trips_every_id() {
        for id in TemplateId::ALL {
            assert_eq!(id.as_str().parse::<TemplateId>().unwrap(), id);
        }
        assert_eq!("  Tech ".parse::<TemplateId>().unwrap(), TemplateId::Tech);
        assert!("modern_tech".parse::<TemplateId>().is_err());
    }

    #[test]
    fn test_serde_uses_lowercase_ids() {
        assert_eq!(
            serde_json::to_string(&TemplateId::Executive).unwrap(),
            "\"executive\""
        );
        let id: TemplateId = serde_json::from_str("\"minimal\"").unwrap();
        assert_eq!(id, TemplateId::Minimal);
    }

    #[test]
    fn test_stylesheet_uses_theme_colors() {
        let css = TemplateId::Creative.stylesheet();
        assert!(css.contains("#6b46c1"));
        assert!(css.contains("Montserrat"));
        assert_eq!(css, TemplateId::Creative.stylesheet());
    }

    #[test]
    fn test_stylesheets_differ_between_templates() {
        assert_ne!(TemplateId::Tech.stylesheet(), TemplateId::Classic.stylesheet());
    }
}
