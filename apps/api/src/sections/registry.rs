use serde::{Deserialize, Serialize};

/// Closed set of section kinds. Serialized lower-case (`"summary"`, `"skills"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionType {
    Summary,
    Skills,
    Experience,
    Education,
    Projects,
    Certifications,
    Awards,
}

impl SectionType {
    /// Default render order.
    pub const ALL: [SectionType; 7] = [
        SectionType::Summary,
        SectionType::Skills,
        SectionType::Experience,
        SectionType::Education,
        SectionType::Projects,
        SectionType::Certifications,
        SectionType::Awards,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionType::Summary => "summary",
            SectionType::Skills => "skills",
            SectionType::Experience => "experience",
            SectionType::Education => "education",
            SectionType::Projects => "projects",
            SectionType::Certifications => "certifications",
            SectionType::Awards => "awards",
        }
    }

    /// Looks a type up by its wire name (`"summary"`, `"skills"`, ...).
    pub fn from_id(id: &str) -> Option<Self> {
        SectionType::ALL.into_iter().find(|kind| kind.as_str() == id)
    }

    pub fn title(&self) -> &'static str {
        match self {
            SectionType::Summary => "Professional Summary",
            SectionType::Skills => "Skills",
            SectionType::Experience => "Work Experience",
            SectionType::Education => "Education",
            SectionType::Projects => "Projects",
            SectionType::Certifications => "Certifications",
            SectionType::Awards => "Awards",
        }
    }
}

/// One registry entry. On the wire `type` may be omitted, in which case it is taken
/// from `id`; either way the id is normalised to the type's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SectionEntry")]
pub struct Section {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: SectionType,
    pub enabled: bool,
}

#[derive(Deserialize)]
struct SectionEntry {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "type", default)]
    kind: Option<SectionType>,
    #[serde(default = "enabled_by_default")]
    enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

impl TryFrom<SectionEntry> for Section {
    type Error = String;

    fn try_from(entry: SectionEntry) -> Result<Self, Self::Error> {
        let kind = match (entry.kind, entry.id.as_deref()) {
            (Some(kind), _) => kind,
            (None, Some(id)) => {
                SectionType::from_id(id).ok_or_else(|| format!("unknown section id '{id}'"))?
            }
            (None, None) => return Err("section needs an id or a type".to_string()),
        };
        Ok(Section::new(kind, entry.enabled))
    }
}

impl Section {
    pub fn new(kind: SectionType, enabled: bool) -> Self {
        Self {
            id: kind.as_str().to_string(),
            kind,
            enabled,
        }
    }
}

/// Ordered, toggleable list of sections. Determines render order and visibility only;
/// it never touches the CV document itself.
///
/// Invariant: each `SectionType` appears at most once, and the set of ids never changes
/// after construction (`reorder` and `toggle_enabled` only move entries or flip flags).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SectionRegistry {
    sections: Vec<Section>,
}

impl Default for SectionRegistry {
    fn default() -> Self {
        Self {
            sections: SectionType::ALL
                .iter()
                .map(|kind| Section::new(*kind, true))
                .collect(),
        }
    }
}

impl SectionRegistry {
    /// Normalises a caller-supplied list: ids are reset to their type's name, the
    /// first entry of each type wins, later duplicates are dropped, and types the
    /// caller left out are appended disabled.
    pub fn from_entries(entries: Vec<Section>) -> Self {
        let mut sections: Vec<Section> = Vec::with_capacity(SectionType::ALL.len());
        for entry in entries {
            if sections.iter().all(|s| s.kind != entry.kind) {
                sections.push(Section::new(entry.kind, entry.enabled));
            }
        }
        for kind in SectionType::ALL {
            if sections.iter().all(|s| s.kind != kind) {
                sections.push(Section::new(kind, false));
            }
        }
        Self { sections }
    }

    /// Moves the entry at `from` to position `to`, shifting the entries in between.
    /// Returns false (no change) when either index is out of range.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        let len = self.sections.len();
        if from >= len || to >= len {
            return false;
        }
        if from != to {
            let moved = self.sections.remove(from);
            self.sections.insert(to, moved);
        }
        true
    }

    /// Flips the `enabled` flag of the section with `id`. Returns the new flag, or
    /// `None` when no such section exists.
    pub fn toggle_enabled(&mut self, id: &str) -> Option<bool> {
        let section = self.sections.iter_mut().find(|s| s.id == id)?;
        section.enabled = !section.enabled;
        Some(section.enabled)
    }

    /// Enabled sections in registry order: the iteration order used by the renderer.
    pub fn visible_sections_in_order(&self) -> Vec<Section> {
        self.sections.iter().filter(|s| s.enabled).cloned().collect()
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_visible(registry: &SectionRegistry, kind: SectionType) -> bool {
        registry
            .visible_sections_in_order()
            .iter()
            .any(|s| s.kind == kind)
    }

    fn sorted_ids(registry: &SectionRegistry) -> Vec<String> {
        let mut ids: Vec<String> = registry.sections().iter().map(|s| s.id.clone()).collect();
        ids.sort();
        ids
    }

    #[test]
    fn test_default_registry_has_every_type_enabled() {
        let registry = SectionRegistry::default();
        assert_eq!(registry.sections().len(), SectionType::ALL.len());
        assert!(registry.sections().iter().all(|s| s.enabled));
        assert_eq!(registry.sections()[0].kind, SectionType::Summary);
    }

    #[test]
    fn test_visible_sections_filter_and_keep_order() {
        let registry = SectionRegistry::from_entries(vec![
            Section::new(SectionType::Summary, true),
            Section::new(SectionType::Skills, true),
            Section::new(SectionType::Experience, false),
        ]);
        let visible: Vec<SectionType> = registry
            .visible_sections_in_order()
            .iter()
            .map(|s| s.kind)
            .collect();
        assert_eq!(visible, vec![SectionType::Summary, SectionType::Skills]);
    }

    #[test]
    fn test_reorder_splices_entry() {
        let mut registry = SectionRegistry::default();
        assert!(registry.reorder(0, 2));
        let order: Vec<SectionType> = registry.sections().iter().map(|s| s.kind).collect();
        assert_eq!(
            &order[..3],
            &[
                SectionType::Skills,
                SectionType::Experience,
                SectionType::Summary
            ]
        );

        assert!(registry.reorder(2, 0));
        assert_eq!(registry, SectionRegistry::default());
    }

    #[test]
    fn test_reorder_out_of_range_is_noop() {
        let mut registry = SectionRegistry::default();
        assert!(!registry.reorder(0, 99));
        assert!(!registry.reorder(99, 0));
        assert_eq!(registry, SectionRegistry::default());
    }

    #[test]
    fn test_toggle_enabled() {
        let mut registry = SectionRegistry::default();
        assert_eq!(registry.toggle_enabled("skills"), Some(false));
        assert!(!is_visible(&registry, SectionType::Skills));
        assert_eq!(registry.toggle_enabled("skills"), Some(true));
        assert_eq!(registry.toggle_enabled("hobbies"), None);
    }

    #[test]
    fn test_ids_preserved_across_reorder_and_toggle() {
        let mut registry = SectionRegistry::default();
        let before = sorted_ids(&registry);

        let moves = [(0, 6), (3, 1), (5, 5), (6, 0), (2, 4)];
        for (i, (from, to)) in moves.iter().enumerate() {
            registry.reorder(*from, *to);
            let id = SectionType::ALL[i].as_str();
            registry.toggle_enabled(id);
        }

        assert_eq!(sorted_ids(&registry), before);
    }

    #[test]
    fn test_from_entries_drops_duplicates_and_fills_missing() {
        let registry = SectionRegistry::from_entries(vec![
            Section::new(SectionType::Education, true),
            Section::new(SectionType::Education, false),
        ]);
        assert_eq!(registry.sections().len(), SectionType::ALL.len());
        assert_eq!(registry.sections()[0].kind, SectionType::Education);
        assert!(registry.sections()[0].enabled);
        assert!(!is_visible(&registry, SectionType::Summary));
    }

    #[test]
    fn test_section_wire_format() {
        let section: Section =
            serde_json::from_str(r#"{"id":"summary","type":"summary"}"#).unwrap();
        assert!(section.enabled);
        assert_eq!(section.kind, SectionType::Summary);
    }

    #[test]
    fn test_section_type_is_taken_from_id_when_omitted() {
        let entries: Vec<Section> = serde_json::from_str(
            r#"[{"id":"summary","enabled":true},{"id":"skills","enabled":true},
                {"id":"experience","enabled":false}]"#,
        )
        .unwrap();
        let registry = SectionRegistry::from_entries(entries);
        let visible: Vec<&str> = registry
            .visible_sections_in_order()
            .iter()
            .map(|s| s.kind.as_str())
            .collect();
        assert_eq!(visible, vec!["summary", "skills"]);
    }

    #[test]
    fn test_unknown_section_id_without_type_is_rejected() {
        assert!(serde_json::from_str::<Section>(r#"{"id":"hobbies"}"#).is_err());
        assert!(serde_json::from_str::<Section>(r#"{"enabled":true}"#).is_err());
    }

    #[test]
    fn test_mismatched_id_is_normalised_to_type() {
        let section: Section =
            serde_json::from_str(r#"{"id":"skills","type":"summary"}"#).unwrap();
        assert_eq!(section.id, "summary");

        let mut registry = SectionRegistry::from_entries(vec![
            Section {
                id: "skills".into(),
                kind: SectionType::Summary,
                enabled: true,
            },
            Section::new(SectionType::Skills, true),
        ]);
        assert_eq!(registry.toggle_enabled("skills"), Some(false));
        assert!(is_visible(&registry, SectionType::Summary));
        assert!(!is_visible(&registry, SectionType::Skills));

        let mut ids: Vec<&str> = registry.sections().iter().map(|s| s.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), SectionType::ALL.len());
    }
}
