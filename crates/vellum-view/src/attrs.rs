//! Element attributes
//!
//! Keyed attribute collection: unique names, last write wins, O(1) named
//! lookup through a side index. Insertion order carries no meaning.

use std::collections::HashMap;

/// Single attribute
#[derive(Debug, Clone)]
pub struct Attr {
    pub name: Box<str>,
    pub value: Box<str>,
}

impl Attr {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Attribute collection
#[derive(Debug, Clone, Default)]
pub struct AttrMap {
    attrs: Vec<Attr>,
    by_name: HashMap<Box<str>, usize>,
}

impl AttrMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of attributes
    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    /// Get an attribute value by name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.by_name
            .get(name)
            .and_then(|&i| self.attrs.get(i))
            .map(|a| &*a.value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Set an attribute; a prior value for the same name is overwritten
    pub fn set(&mut self, name: &str, value: &str) {
        if let Some(&index) = self.by_name.get(name) {
            self.attrs[index].value = value.into();
        } else {
            let index = self.attrs.len();
            self.by_name.insert(name.into(), index);
            self.attrs.push(Attr::new(name, value));
        }
    }

    /// Remove an attribute by name, reporting whether an entry existed
    pub fn remove(&mut self, name: &str) -> bool {
        let Some(index) = self.by_name.remove(name) else {
            return false;
        };
        self.attrs.remove(index);
        // Entries after the removed slot shift left by one
        for idx in self.by_name.values_mut() {
            if *idx > index {
                *idx -= 1;
            }
        }
        true
    }

    /// Iterate attribute names
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.attrs.iter().map(|a| &*a.name)
    }

    /// Iterate (name, value) pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|a| (&*a.name, &*a.value))
    }
}
