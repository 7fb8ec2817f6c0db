//! Month/year date display for the renderer.
//!
//! The renderer never parses dates itself; it asks a caller-supplied
//! [`DateFormatter`]. When the formatter cannot make sense of a value the raw
//! string is shown verbatim.

use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

pub trait DateFormatter: Send + Sync {
    /// Formats a stored date string, or returns `None` if it cannot be parsed.
    fn format_month_year(&self, raw: &str) -> Option<String>;

    /// Label shown instead of an end date for a current role.
    fn present_label(&self) -> &str {
        "Present"
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateLocale {
    #[default]
    En,
    De,
    Fr,
    Es,
}

const MONTHS_EN: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
const MONTHS_DE: [&str; 12] = [
    "Jan.", "Feb.", "März", "Apr.", "Mai", "Juni", "Juli", "Aug.", "Sept.", "Okt.", "Nov.",
    "Dez.",
];
const MONTHS_FR: [&str; 12] = [
    "janv.", "févr.", "mars", "avr.", "mai", "juin", "juil.", "août", "sept.", "oct.", "nov.",
    "déc.",
];
const MONTHS_ES: [&str; 12] = [
    "ene.", "feb.", "mar.", "abr.", "may.", "jun.", "jul.", "ago.", "sept.", "oct.", "nov.",
    "dic.",
];

impl DateLocale {
    fn month_names(&self) -> &'static [&'static str; 12] {
        match self {
            DateLocale::En => &MONTHS_EN,
            DateLocale::De => &MONTHS_DE,
            DateLocale::Fr => &MONTHS_FR,
            DateLocale::Es => &MONTHS_ES,
        }
    }

    fn present(&self) -> &'static str {
        match self {
            DateLocale::En => "Present",
            DateLocale::De => "Heute",
            DateLocale::Fr => "Présent",
            DateLocale::Es => "Actualidad",
        }
    }

    /// BCP 47 tag for the `lang` attribute of rendered pages.
    pub fn language_tag(&self) -> &'static str {
        match self {
            DateLocale::En => "en",
            DateLocale::De => "de",
            DateLocale::Fr => "fr",
            DateLocale::Es => "es",
        }
    }
}

impl FromStr for DateLocale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(DateLocale::En),
            "de" => Ok(DateLocale::De),
            "fr" => Ok(DateLocale::Fr),
            "es" => Ok(DateLocale::Es),
            other => Err(format!("unsupported date locale '{other}'")),
        }
    }
}

/// Default formatter: "Mar 2021" style output in the configured locale.
///
/// Accepted inputs: `YYYY-MM-DD`, `YYYY-MM`, `MM/YYYY`, `YYYY`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonthYearFormatter {
    pub locale: DateLocale,
}

impl MonthYearFormatter {
    pub fn new(locale: DateLocale) -> Self {
        Self { locale }
    }
}

impl DateFormatter for MonthYearFormatter {
    fn format_month_year(&self, raw: &str) -> Option<String> {
        let raw = raw.trim();
        if raw.len() == 4 && raw.chars().all(|c| c.is_ascii_digit()) {
            return Some(raw.to_string());
        }
        let date = parse_month_precision(raw)?;
        let month = self.locale.month_names()[date.month0() as usize];
        Some(format!("{month} {}", date.year()))
    }

    fn present_label(&self) -> &str {
        self.locale.present()
    }
}

fn parse_month_precision(raw: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d") {
        return Some(date);
    }
    let (month, year) = raw.split_once('/')?;
    NaiveDate::from_ymd_opt(year.trim().parse().ok()?, month.trim().parse().ok()?, 1)
}

/// Formatted date, or the raw input verbatim when it does not parse.
pub fn display_date(formatter: &dyn DateFormatter, raw: &str) -> String {
    formatter
        .format_month_year(raw)
        .unwrap_or_else(|| raw.to_string())
}

/// "Start – End" for an entry. A current entry always ends in the present label,
/// whatever end date may still be stored.
pub fn date_range(
    formatter: &dyn DateFormatter,
    start: &str,
    end: Option<&str>,
    is_current: bool,
) -> String {
    let start = display_date(formatter, start.trim());
    let end = if is_current {
        formatter.present_label().to_string()
    } else {
        end.map(|e| display_date(formatter, e.trim()))
            .unwrap_or_default()
    };

    match (start.is_empty(), end.is_empty()) {
        (true, true) => String::new(),
        (false, true) => start,
        (true, false) => end,
        (false, false) => format!("{start} – {end}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn en() -> MonthYearFormatter {
        MonthYearFormatter::default()
    }

    #[test]
    fn test_formats_supported_shapes() {
        let f = en();
        assert_eq!(f.format_month_year("2021-03").as_deref(), Some("Mar 2021"));
        assert_eq!(f.format_month_year("2021-03-15").as_deref(), Some("Mar 2021"));
        assert_eq!(f.format_month_year("11/2019").as_deref(), Some("Nov 2019"));
        assert_eq!(f.format_month_year("2018").as_deref(), Some("2018"));
    }

    #[test]
    fn test_unparseable_date_falls_back_to_raw() {
        let f = en();
        assert_eq!(f.format_month_year("Summer 2020"), None);
        assert_eq!(display_date(&f, "Summer 2020"), "Summer 2020");
        assert_eq!(display_date(&f, "2021-13"), "2021-13");
    }

    #[test]
    fn test_locale_month_names() {
        let f = MonthYearFormatter::new(DateLocale::De);
        assert_eq!(f.format_month_year("2020-03").as_deref(), Some("März 2020"));
        assert_eq!(f.present_label(), "Heute");
    }

    #[test]
    fn test_current_range_ignores_stale_end_date() {
        let f = en();
        assert_eq!(
            date_range(&f, "2020-01", Some("2022-06"), true),
            "Jan 2020 – Present"
        );
        assert_eq!(
            date_range(&f, "2020-01", Some("2022-06"), false),
            "Jan 2020 – Jun 2022"
        );
    }

    #[test]
    fn test_range_with_missing_parts() {
        let f = en();
        assert_eq!(date_range(&f, "", None, false), "");
        assert_eq!(date_range(&f, "2020-01", None, false), "Jan 2020");
        assert_eq!(date_range(&f, "", Some("2020-01"), false), "Jan 2020");
    }

    #[test]
    fn test_locale_from_str() {
        assert_eq!("FR".parse::<DateLocale>().unwrap(), DateLocale::Fr);
        assert!("pt".parse::<DateLocale>().is_err());
    }
}
