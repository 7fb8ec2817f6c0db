//! Heuristic CV text parser: extracted plain text → `CVDocument`.
//!
//! The text is first cut into an outline. Lines before the first recognised
//! heading form the preamble (name and contact details); every heading opens a
//! block that is parsed by the rules for its kind. A line is a heading when it is a
//! well-known section title, or when it is short, ALL CAPS or colon-terminated, and
//! contains a section keyword. Entries inside a block are separated by blank lines,
//! by a new headline after bullet points, or by a headline following a complete
//! entry.
//!
//! Dates are normalised to `YYYY-MM` when a month is present and `YYYY` otherwise.
//! Parsing never fails; anything unrecognised is dropped.

use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde_json::{json, Map, Value};

use crate::document::models::{CVDocument, Education, Experience, PersonalDetails};
use crate::document::mutations::new_entry_id;
use crate::document::skills::SkillSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Heading {
    Personal,
    Summary,
    Experience,
    Education,
    Skills,
    Projects,
    Certifications,
}

const KNOWN_HEADINGS: &[(&str, Heading)] = &[
    ("contact", Heading::Personal),
    ("contact details", Heading::Personal),
    ("contact information", Heading::Personal),
    ("personal details", Heading::Personal),
    ("personal information", Heading::Personal),
    ("summary", Heading::Summary),
    ("professional summary", Heading::Summary),
    ("profile", Heading::Summary),
    ("professional profile", Heading::Summary),
    ("personal profile", Heading::Summary),
    ("objective", Heading::Summary),
    ("career objective", Heading::Summary),
    ("about", Heading::Summary),
    ("about me", Heading::Summary),
    ("experience", Heading::Experience),
    ("work experience", Heading::Experience),
    ("professional experience", Heading::Experience),
    ("relevant experience", Heading::Experience),
    ("employment", Heading::Experience),
    ("employment history", Heading::Experience),
    ("work history", Heading::Experience),
    ("career history", Heading::Experience),
    ("education", Heading::Education),
    ("education and training", Heading::Education),
    ("academic background", Heading::Education),
    ("qualifications", Heading::Education),
    ("academic qualifications", Heading::Education),
    ("skills", Heading::Skills),
    ("key skills", Heading::Skills),
    ("technical skills", Heading::Skills),
    ("core competencies", Heading::Skills),
    ("competencies", Heading::Skills),
    ("skills and competencies", Heading::Skills),
    ("proficiencies", Heading::Skills),
    ("projects", Heading::Projects),
    ("personal projects", Heading::Projects),
    ("selected projects", Heading::Projects),
    ("portfolio", Heading::Projects),
    ("certifications", Heading::Certifications),
    ("certificates", Heading::Certifications),
    ("licenses and certifications", Heading::Certifications),
    ("certifications and licenses", Heading::Certifications),
    ("credentials", Heading::Certifications),
];

/// Word prefixes tried in order on emphasised lines that are not a known title.
const HEADING_KEYWORDS: &[(Heading, &[&str])] = &[
    (
        Heading::Personal,
        &["contact", "name", "email", "phone", "address", "linkedin"],
    ),
    (Heading::Summary, &["summary", "profile", "objective", "about"]),
    (
        Heading::Experience,
        &["experience", "employment", "work", "career"],
    ),
    (
        Heading::Education,
        &["education", "academic", "qualification", "degree"],
    ),
    (
        Heading::Skills,
        &["skill", "competenc", "technical", "proficienc"],
    ),
    (Heading::Projects, &["project", "portfolio"]),
    (
        Heading::Certifications,
        &["certifica", "license", "licence", "credential"],
    ),
];

const SOFT_SKILL_HINTS: &[&str] = &[
    "leadership",
    "communication",
    "teamwork",
    "team player",
    "problem solving",
    "problem-solving",
    "analytical",
    "creativ",
    "organi",
    "detail",
    "adaptab",
    "collaborat",
    "mentor",
    "negotiat",
    "presentation",
    "time management",
    "critical thinking",
];

const BULLETS: &[char] = &['•', '-', '*', '–', '▪', '◦', '●', '·', '‣'];
const EDGE_PUNCTUATION: &[char] = &['-', '–', '—', '|', ',', '(', ')', '·', ':', ';'];
const TITLE_SEPARATORS: &[&str] = &[" at ", " @ ", " | ", " – ", " - ", ", "];
const DEGREE_SEPARATORS: &[&str] = &[" at ", " from ", " | ", " – ", " - ", ", "];
const NAME_SEPARATORS: &[&str] = &[" – ", " - ", ": "];
const ISSUER_SEPARATORS: &[&str] = &[" – ", " - ", " | ", ", "];

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Compiles a built-in pattern on first use.
fn pattern(cell: &'static OnceLock<Regex>, source: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(source).expect("built-in import pattern must compile"))
}

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(&RE, r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}")
}

fn phone_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(&RE, r"\+?\(?\d[\d\s().-]{5,}\d")
}

fn linkedin_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(
        &RE,
        r"(?i)(?:https?://)?(?:www\.)?linkedin\.com/in/[A-Za-z0-9_%-]+/?",
    )
}

fn github_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(&RE, r"(?i)(?:https?://)?(?:www\.)?github\.com/[A-Za-z0-9_-]+")
}

fn date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(
        &RE,
        r"(?ix)\b(?:
            (?P<mon>jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?
                |aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)
                \.?\s+(?P<my>(?:19|20)\d{2})
            | (?P<nm>0?[1-9]|1[0-2])[/.](?P<ny>(?:19|20)\d{2})
            | (?P<iy>(?:19|20)\d{2})-(?P<im>0[1-9]|1[0-2])
            | (?P<y>(?:19|20)\d{2})
        )\b",
    )
}

fn present_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(&RE, r"(?i)\b(?:present|current|now)\b")
}

fn grade_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(
        &RE,
        r"(?i)\b(?:gpa|grade)\s*:?\s*(\d+(?:\.\d+)?(?:\s*/\s*\d+(?:\.\d+)?)?)",
    )
}

fn empty_parens_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(&RE, r"\(\s*[-–—]?\s*\)")
}

/// Builds a document from plain CV text.
pub fn parse_cv(text: &str) -> CVDocument {
    let outline = Outline::split(text);
    let mut document = CVDocument {
        personal: personal_details(&outline.contact_lines(), text),
        ..CVDocument::default()
    };

    for (heading, lines) in &outline.blocks {
        match heading {
            Heading::Personal => {}
            Heading::Summary => {
                let text = summary(lines);
                if document.summary.is_empty() {
                    document.summary = text;
                } else if !text.is_empty() {
                    document.summary = format!("{} {text}", document.summary);
                }
            }
            Heading::Experience => document.experience.extend(experience(lines)),
            Heading::Education => document.education.extend(education(lines)),
            Heading::Skills => merge_skills(&mut document.skills, lines),
            Heading::Projects => document.sections.projects.extend(projects(lines)),
            Heading::Certifications => document
                .sections
                .certifications
                .extend(certifications(lines)),
        }
    }

    document
}

// ── Outline ────────────────────────────────────────────────────────────────

struct Outline<'a> {
    preamble: Vec<&'a str>,
    blocks: Vec<(Heading, Vec<&'a str>)>,
}

impl<'a> Outline<'a> {
    fn split(text: &'a str) -> Self {
        let mut outline = Outline {
            preamble: Vec::new(),
            blocks: Vec::new(),
        };
        for line in text.lines().map(str::trim) {
            if let Some(heading) = detect_heading(line) {
                outline.blocks.push((heading, Vec::new()));
                continue;
            }
            match outline.blocks.last_mut() {
                Some((_, lines)) => lines.push(line),
                None => outline.preamble.push(line),
            }
        }
        outline
    }

    /// Preamble plus any explicit contact block.
    fn contact_lines(&self) -> Vec<&'a str> {
        let contact_blocks = self
            .blocks
            .iter()
            .filter(|(heading, _)| *heading == Heading::Personal)
            .flat_map(|(_, lines)| lines.iter());
        self.preamble
            .iter()
            .chain(contact_blocks)
            .copied()
            .filter(|line| !line.is_empty())
            .collect()
    }
}

fn detect_heading(line: &str) -> Option<Heading> {
    if line.starts_with(BULLETS) {
        return None;
    }
    let colon = line.ends_with(':');
    let label = line.trim_end_matches(':').trim();
    if label.is_empty() || label.chars().count() > 40 || label.split_whitespace().count() > 4 {
        return None;
    }
    if label
        .chars()
        .any(|c| c.is_ascii_digit() || matches!(c, '@' | '/' | ',' | '|' | '(' | '.'))
    {
        return None;
    }

    let normalised = label
        .to_lowercase()
        .replace('&', " and ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if let Some((_, heading)) = KNOWN_HEADINGS.iter().find(|(title, _)| *title == normalised) {
        return Some(*heading);
    }

    let shouting = label.chars().any(char::is_alphabetic) && !label.chars().any(char::is_lowercase);
    if !(colon || shouting) {
        return None;
    }
    let words: Vec<&str> = normalised
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    HEADING_KEYWORDS
        .iter()
        .find(|(_, keywords)| {
            words
                .iter()
                .any(|word| keywords.iter().any(|k| word.starts_with(k)))
        })
        .map(|(heading, _)| *heading)
}

// ── Personal details ───────────────────────────────────────────────────────

fn personal_details(contact: &[&str], full_text: &str) -> PersonalDetails {
    let pieces: Vec<&str> = contact
        .iter()
        .flat_map(|line| line.split(['|', '·', '•']))
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect();

    let name_at = pieces.iter().position(|piece| looks_like_name(piece));
    let full_name = match name_at {
        Some(i) => pieces[i].to_string(),
        None => name_from_words(full_text).unwrap_or_default(),
    };
    let desired_position = name_at
        .and_then(|i| pieces.get(i + 1))
        .filter(|piece| looks_like_position(piece))
        .map(|piece| piece.to_string());

    PersonalDetails {
        full_name,
        email: email_re()
            .find(full_text)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default(),
        phone: pieces
            .iter()
            .find_map(|piece| phone_number(piece))
            .unwrap_or_default(),
        location: pieces
            .iter()
            .find(|piece| looks_like_location(piece))
            .map(|piece| piece.to_string())
            .unwrap_or_default(),
        linkedin_url: linkedin_re().find(full_text).map(|m| with_scheme(m.as_str())),
        github_url: github_re().find(full_text).map(|m| with_scheme(m.as_str())),
        website_url: None,
        desired_position,
    }
}

fn is_contact(piece: &str) -> bool {
    let lower = piece.to_lowercase();
    piece.contains('@')
        || lower.contains("http")
        || lower.contains("www.")
        || lower.contains(".com")
        || piece.chars().any(|c| c.is_ascii_digit())
}

fn looks_like_name(piece: &str) -> bool {
    let words: Vec<&str> = piece.split_whitespace().collect();
    (2..=4).contains(&words.len())
        && !is_contact(piece)
        && detect_heading(piece).is_none()
        && words.iter().all(|word| {
            word.chars().next().is_some_and(char::is_uppercase)
                && word
                    .chars()
                    .all(|c| c.is_alphabetic() || matches!(c, '-' | '\'' | '.'))
        })
        && !["curriculum", "resume", "résumé", "vitae"]
            .iter()
            .any(|w| piece.to_lowercase().contains(w))
}

fn looks_like_position(piece: &str) -> bool {
    let words = piece.split_whitespace().count();
    (1..=6).contains(&words)
        && !is_contact(piece)
        && !looks_like_location(piece)
        && detect_heading(piece).is_none()
}

fn looks_like_location(piece: &str) -> bool {
    let Some((city, region)) = piece.split_once(',') else {
        return false;
    };
    let place = |part: &str| {
        let part = part.trim();
        part.chars().next().is_some_and(char::is_uppercase)
            && part.split_whitespace().count() <= 3
            && part
                .chars()
                .all(|c| c.is_alphabetic() || matches!(c, ' ' | '-' | '\'' | '.'))
    };
    !is_contact(piece) && place(city) && place(region)
}

fn phone_number(piece: &str) -> Option<String> {
    let found = phone_re().find(piece)?;
    let digits = found.as_str().chars().filter(char::is_ascii_digit).count();
    (7..=15)
        .contains(&digits)
        .then(|| found.as_str().trim().to_string())
}

/// First run of two or three capitalised words among the opening words.
fn name_from_words(text: &str) -> Option<String> {
    let words: Vec<&str> = text
        .split_whitespace()
        .take(10)
        .map(|w| w.trim_matches(|c: char| !c.is_alphabetic()))
        .collect();
    for start in 0..words.len() {
        let run: Vec<&str> = words[start..]
            .iter()
            .copied()
            .take(3)
            .take_while(|w| is_capitalised(w))
            .collect();
        if run.len() >= 2 && run[0].len() > 2 {
            return Some(run.join(" "));
        }
    }
    None
}

fn is_capitalised(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_uppercase) && word.chars().all(char::is_alphabetic)
}

fn with_scheme(url: &str) -> String {
    let url = url.trim_end_matches('/');
    if url.to_lowercase().starts_with("http") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

// ── Dates ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default, PartialEq)]
struct DateSpan {
    start: Option<String>,
    end: Option<String>,
    current: bool,
}

fn normalise_date(caps: &Captures<'_>) -> Option<String> {
    if let (Some(month), Some(year)) = (caps.name("mon"), caps.name("my")) {
        let prefix = month.as_str().get(..3)?.to_lowercase();
        let number = MONTHS.iter().position(|m| *m == prefix)? + 1;
        return Some(format!("{}-{number:02}", year.as_str()));
    }
    if let (Some(month), Some(year)) = (caps.name("nm"), caps.name("ny")) {
        let number: u32 = month.as_str().parse().ok()?;
        return Some(format!("{}-{number:02}", year.as_str()));
    }
    if let (Some(year), Some(month)) = (caps.name("iy"), caps.name("im")) {
        return Some(format!("{}-{}", year.as_str(), month.as_str()));
    }
    caps.name("y").map(|year| year.as_str().to_string())
}

/// Pulls a date range out of `line`, returning the remaining text and the range.
fn take_dates(line: &str) -> (String, DateSpan) {
    let dates: Vec<String> = date_re()
        .captures_iter(line)
        .filter_map(|caps| normalise_date(&caps))
        .collect();
    if dates.is_empty() {
        return (tidy(line), DateSpan::default());
    }

    let current = present_re().is_match(line);
    let mut rest = date_re().replace_all(line, " ").into_owned();
    if current {
        rest = present_re().replace_all(&rest, " ").into_owned();
    }

    let mut dates = dates.into_iter();
    let start = dates.next();
    let end = if current { None } else { dates.next() };
    (tidy(&rest), DateSpan { start, end, current })
}

/// Collapses whitespace and strips separators and dangling "to" left at the edges.
fn tidy(text: &str) -> String {
    let text = empty_parens_re().replace_all(text, " ");
    let mut out = text.split_whitespace().collect::<Vec<_>>().join(" ");
    loop {
        let trimmed =
            out.trim_matches(|c: char| c.is_whitespace() || EDGE_PUNCTUATION.contains(&c));
        let trimmed = trimmed
            .strip_suffix(" to")
            .or_else(|| trimmed.strip_prefix("to "))
            .unwrap_or(trimmed);
        if trimmed.eq_ignore_ascii_case("to") {
            return String::new();
        }
        if trimmed.len() == out.len() {
            return out;
        }
        out = trimmed.to_string();
    }
}

// ── Blocks ─────────────────────────────────────────────────────────────────

fn bullet(line: &str) -> Option<&str> {
    let item = line.strip_prefix(BULLETS)?.trim();
    (!item.is_empty()).then_some(item)
}

/// Splits "left <sep> right" on the first separator present.
fn split_pair(text: &str, separators: &[&str]) -> (String, String) {
    separators
        .iter()
        .find_map(|sep| text.split_once(*sep))
        .map(|(left, right)| (left.trim().to_string(), right.trim().to_string()))
        .unwrap_or_else(|| (text.trim().to_string(), String::new()))
}

fn is_short(text: &str) -> bool {
    text.split_whitespace().count() <= 6 && !text.ends_with('.')
}

fn summary(lines: &[&str]) -> String {
    lines
        .iter()
        .copied()
        .filter(|line| !line.is_empty())
        .map(|line| bullet(line).unwrap_or(line))
        .collect::<Vec<_>>()
        .join(" ")
}

fn experience(lines: &[&str]) -> Vec<Experience> {
    let mut entries = Vec::new();
    let mut current: Option<Experience> = None;
    let mut after_blank = true;

    for &line in lines {
        if line.is_empty() {
            after_blank = true;
            continue;
        }
        if let Some(item) = bullet(line) {
            let entry = current.get_or_insert_with(|| Experience {
                id: new_entry_id(),
                ..Experience::default()
            });
            entry.achievements.push(item.to_string());
            after_blank = false;
            continue;
        }

        let starts_new = match &current {
            None => true,
            Some(entry) => {
                after_blank
                    || !entry.achievements.is_empty()
                    || (experience_complete(entry)
                        && !date_re().is_match(line)
                        && is_short(line))
            }
        };
        if starts_new {
            entries.extend(current.take());
            current = Some(experience_headline(line));
        } else if let Some(entry) = current.as_mut() {
            experience_detail(entry, line);
        }
        after_blank = false;
    }

    entries.extend(current);
    entries.retain(|e: &Experience| {
        !e.job_title.is_empty() || !e.company.is_empty() || !e.achievements.is_empty()
    });
    entries
}

fn experience_complete(entry: &Experience) -> bool {
    !entry.job_title.is_empty() && !entry.company.is_empty() && !entry.start_date.is_empty()
}

fn experience_headline(line: &str) -> Experience {
    let (rest, span) = take_dates(line);
    let (job_title, company) = split_pair(&rest, TITLE_SEPARATORS);
    let mut entry = Experience {
        id: new_entry_id(),
        job_title,
        company,
        ..Experience::default()
    };
    apply_experience_dates(&mut entry, span);
    entry
}

fn experience_detail(entry: &mut Experience, line: &str) {
    let (rest, span) = take_dates(line);
    let dated = span.start.is_some();
    if dated && entry.start_date.is_empty() {
        apply_experience_dates(entry, span);
    }
    if rest.is_empty() {
        return;
    }

    if entry.company.is_empty() && is_short(&rest) {
        entry.company = rest;
    } else if entry.location.is_none() && is_short(&rest) && (dated || rest.contains(',')) {
        entry.location = Some(rest);
    } else {
        entry.achievements.push(rest);
    }
}

fn apply_experience_dates(entry: &mut Experience, span: DateSpan) {
    let Some(start) = span.start else {
        return;
    };
    entry.start_date = start;
    entry.is_current = span.current;
    entry.end_date = if span.current { None } else { span.end };
}

fn education(lines: &[&str]) -> Vec<Education> {
    let mut entries = Vec::new();
    let mut current: Option<Education> = None;
    let mut after_blank = true;

    for &line in lines {
        if line.is_empty() {
            after_blank = true;
            continue;
        }
        let line = bullet(line).unwrap_or(line);

        let starts_new = match &current {
            None => true,
            Some(entry) => {
                after_blank
                    || (!entry.degree.is_empty()
                        && !entry.institution.is_empty()
                        && !date_re().is_match(line)
                        && !grade_re().is_match(line))
            }
        };
        if starts_new {
            entries.extend(current.take());
            let mut entry = Education {
                id: new_entry_id(),
                ..Education::default()
            };
            let rest = education_dates_and_grade(&mut entry, line);
            let (degree, institution) = split_pair(&rest, DEGREE_SEPARATORS);
            entry.degree = degree;
            entry.institution = institution;
            current = Some(entry);
        } else if let Some(entry) = current.as_mut() {
            let rest = education_dates_and_grade(entry, line);
            if rest.is_empty() {
                continue;
            }
            if entry.institution.is_empty() {
                entry.institution = rest;
            } else if entry.location.is_none() && is_short(&rest) {
                entry.location = Some(rest);
            }
        }
        after_blank = false;
    }

    entries.extend(current);
    entries.retain(|e: &Education| !e.degree.is_empty() || !e.institution.is_empty());
    entries
}

/// Moves any grade and date range from `line` into `entry`, returning the rest.
fn education_dates_and_grade(entry: &mut Education, line: &str) -> String {
    let mut text = line.to_string();
    if let Some(caps) = grade_re().captures(line) {
        if entry.grade.is_none() {
            entry.grade = caps.get(1).map(|m| m.as_str().replace(' ', ""));
        }
        text = grade_re().replace(line, " ").into_owned();
    }

    let (rest, span) = take_dates(&text);
    if let Some(start) = span.start {
        if entry.start_date.is_empty() {
            entry.start_date = start;
            entry.end_date = span.end;
        }
    }
    rest
}

fn merge_skills(skills: &mut SkillSet, lines: &[&str]) {
    for &line in lines {
        if line.is_empty() {
            continue;
        }
        let line = bullet(line).unwrap_or(line);
        match labelled(line) {
            Some((category, items)) => add_skills(skills, &category, split_items(items)),
            None => {
                for item in split_items(line) {
                    let category = if is_soft_skill(&item) { "soft" } else { "technical" };
                    add_skills(skills, category, vec![item]);
                }
            }
        }
    }
}

/// "Languages: English, French" → ("languages", "English, French").
fn labelled(line: &str) -> Option<(String, &str)> {
    let (label, items) = line.split_once(':')?;
    let label = label.trim();
    let words = label.split_whitespace().count();
    ((1..=3).contains(&words)).then(|| (label.to_lowercase(), items))
}

fn split_items(text: &str) -> Vec<String> {
    text.split([',', ';', '•', '|', '·'])
        .map(|item| item.trim().trim_end_matches('.').trim())
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn is_soft_skill(item: &str) -> bool {
    let lower = item.to_lowercase();
    SOFT_SKILL_HINTS.iter().any(|hint| lower.contains(hint))
}

/// Appends to a category, skipping case-insensitive duplicates.
fn add_skills(skills: &mut SkillSet, category: &str, items: Vec<String>) {
    let mut merged = skills.get(category).map(<[String]>::to_vec).unwrap_or_default();
    for item in items {
        if !merged.iter().any(|s| s.eq_ignore_ascii_case(&item)) {
            merged.push(item);
        }
    }
    if !merged.is_empty() {
        skills.set(category, merged);
    }
}

fn projects(lines: &[&str]) -> Vec<Value> {
    let mut found: Vec<(String, Vec<String>)> = Vec::new();
    for &line in lines.iter().filter(|line| !line.is_empty()) {
        match (bullet(line), found.last_mut()) {
            (Some(item), Some((_, description))) => description.push(item.to_string()),
            (None, Some((_, description))) if description.is_empty() && !is_short(line) => {
                description.push(line.to_string())
            }
            (item, _) => {
                let (name, description) = split_pair(item.unwrap_or(line), NAME_SEPARATORS);
                let description = if description.is_empty() {
                    Vec::new()
                } else {
                    vec![description]
                };
                found.push((name, description));
            }
        }
    }

    found
        .into_iter()
        .map(|(name, description)| {
            let mut record = Map::new();
            record.insert("name".into(), json!(name));
            if !description.is_empty() {
                record.insert("description".into(), json!(description.join(" ")));
            }
            Value::Object(record)
        })
        .collect()
}

fn certifications(lines: &[&str]) -> Vec<Value> {
    lines
        .iter()
        .copied()
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let (rest, span) = take_dates(bullet(line).unwrap_or(line));
            let (name, issuer) = split_pair(&rest, ISSUER_SEPARATORS);
            if name.is_empty() {
                return None;
            }
            let mut record = Map::new();
            record.insert("name".into(), json!(name));
            if !issuer.is_empty() {
                record.insert("issuer".into(), json!(issuer));
            }
            if let Some(date) = span.start {
                record.insert("date".into(), json!(date));
            }
            Some(Value::Object(record))
        })
        .collect()
}
