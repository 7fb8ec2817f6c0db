//! Categorised skills with stable category order.
//!
//! Serialized as a JSON object (`{"technical": [...], "soft": [...]}`) whose keys
//! appear in insertion order, and deserialized preserving the order found in the
//! payload. Duplicate keys in a payload merge into the first occurrence.

use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillCategory {
    pub name: String,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillSet {
    categories: Vec<SkillCategory>,
}

impl SkillSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, category: &str) -> Option<&[String]> {
        self.categories
            .iter()
            .find(|c| c.name == category)
            .map(|c| c.skills.as_slice())
    }

    pub fn contains(&self, category: &str) -> bool {
        self.get(category).is_some()
    }

    /// Replaces the skills of `category`, appending the category if it is new.
    pub fn set(&mut self, category: &str, skills: Vec<String>) {
        match self.categories.iter_mut().find(|c| c.name == category) {
            Some(existing) => existing.skills = skills,
            None => self.categories.push(SkillCategory {
                name: category.to_string(),
                skills,
            }),
        }
    }

    /// Appends an empty category. Returns false if the name already exists.
    pub fn add_category(&mut self, name: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.categories.push(SkillCategory {
            name: name.to_string(),
            skills: Vec::new(),
        });
        true
    }

    pub fn remove_category(&mut self, name: &str) -> bool {
        let before = self.categories.len();
        self.categories.retain(|c| c.name != name);
        self.categories.len() != before
    }

    pub fn iter(&self) -> impl Iterator<Item = &SkillCategory> {
        self.categories.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

#[cfg(test)]
impl SkillSet {
    pub(crate) fn category_names(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.name.as_str()).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.categories.len()
    }
}

impl FromIterator<(String, Vec<String>)> for SkillSet {
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        let mut set = SkillSet::new();
        for (name, skills) in iter {
            match set.categories.iter_mut().find(|c| c.name == name) {
                Some(existing) => existing.skills.extend(skills),
                None => set.categories.push(SkillCategory { name, skills }),
            }
        }
        set
    }
}

impl Serialize for SkillSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.categories.len()))?;
        for category in &self.categories {
            map.serialize_entry(&category.name, &category.skills)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SkillSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SkillSetVisitor;

        impl<'de> Visitor<'de> for SkillSetVisitor {
            type Value = SkillSet;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of skill category to a list of skills")
            }

            fn visit_none<E: de::Error>(self) -> Result<SkillSet, E> {
                Ok(SkillSet::new())
            }

            fn visit_unit<E: de::Error>(self) -> Result<SkillSet, E> {
                Ok(SkillSet::new())
            }

            fn visit_some<D: Deserializer<'de>>(self, inner: D) -> Result<SkillSet, D::Error> {
                inner.deserialize_map(self)
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<SkillSet, A::Error> {
                let mut entries: Vec<(String, Vec<String>)> = Vec::new();
                while let Some((name, skills)) =
                    access.next_entry::<String, Option<Vec<String>>>()?
                {
                    entries.push((name, skills.unwrap_or_default()));
                }
                Ok(entries.into_iter().collect())
            }
        }

        deserializer.deserialize_option(SkillSetVisitor)
    }
}
