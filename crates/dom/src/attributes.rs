//! Per-element attribute storage.
//!
//! Names are stored lower-cased, at most one entry per name, in insertion
//! order. Overwriting an existing name keeps its position.

use std::mem;

use smallvec::SmallVec;

/// A single attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// Ordered, case-insensitive attribute list.
#[derive(Clone, Debug, Default)]
pub struct AttributeStore {
    entries: SmallVec<[Attribute; 4]>,
}

/// Normalize an attribute name for storage and lookup.
#[inline]
pub fn normalize_name(name: &str) -> String {
    name.to_ascii_lowercase()
}

impl AttributeStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|attribute| attribute.name.eq_ignore_ascii_case(name))
    }

    /// Set `name` to `value`, returning the previous value.
    pub fn set(&mut self, name: &str, value: String) -> Option<String> {
        match self.position(name) {
            Some(index) => Some(mem::replace(&mut self.entries[index].value, value)),
            None => {
                self.entries.push(Attribute {
                    name: normalize_name(name),
                    value,
                });
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name)
            .map(|index| self.entries[index].value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Remove `name`, returning its value if it was present.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.position(name)
            .map(|index| self.entries.remove(index).value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|attribute| (attribute.name.as_str(), attribute.value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overwrite_keeps_position_and_lowercases_names() {
        let mut store = AttributeStore::new();
        store.set("Title", String::from("a"));
        store.set("class", String::from("b"));
        assert_eq!(store.set("TITLE", String::from("c")), Some(String::from("a")));
        let entries: Vec<_> = store.iter().collect();
        assert_eq!(entries, vec![("title", "c"), ("class", "b")]);
    }

    #[test]
    fn remove_reports_the_old_value() {
        let mut store = AttributeStore::new();
        store.set("id", String::from("x"));
        assert_eq!(store.remove("ID"), Some(String::from("x")));
        assert_eq!(store.remove("id"), None);
        assert!(store.is_empty());
    }
}
