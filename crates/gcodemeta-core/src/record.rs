//! Metadata record
//!
//! A [`MetadataRecord`] maps every attribute of one registry to an optional
//! value. Its key set is fixed at construction; values can only be filled
//! in, never replaced, which is all the parsers and the merge need.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::registry::AttributeRegistry;
use crate::value::{AttributeValue, ValueKind};

/// Outcome of offering a value to a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment {
    /// The attribute was empty and now holds the value
    Set,
    /// The attribute already had a value; the offer was ignored
    AlreadySet,
    /// No such attribute in this record's registry
    UnknownAttribute,
    /// The value does not conform to the attribute's kind
    KindMismatch,
}

#[derive(Debug, Clone, PartialEq)]
struct Entry {
    name: &'static str,
    kind: ValueKind,
    value: Option<AttributeValue>,
}

/// Mapping from every registry attribute to an optional typed value
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataRecord {
    entries: Vec<Entry>,
}

impl MetadataRecord {
    /// Create a record with every registry attribute present and unset
    pub fn new(registry: &AttributeRegistry) -> Self {
        let entries = registry
            .iter()
            .map(|spec| Entry {
                name: spec.name,
                kind: spec.kind,
                value: None,
            })
            .collect();
        Self { entries }
    }

    /// Fill `name` with `value` unless it already holds something
    pub fn set_if_absent(&mut self, name: &str, value: AttributeValue) -> Assignment {
        let Some(entry) = self.entries.iter_mut().find(|e| e.name == name) else {
            return Assignment::UnknownAttribute;
        };
        if entry.value.is_some() {
            return Assignment::AlreadySet;
        }
        if !value.conforms_to(&entry.kind) {
            return Assignment::KindMismatch;
        }
        entry.value = Some(value);
        Assignment::Set
    }

    /// Value of `name`, if the key exists and is set
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .and_then(|e| e.value.as_ref())
    }

    /// Check whether `name` is one of this record's keys
    pub fn has_key(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// Check whether `name` holds a value
    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Every key with its optional value, in registry order
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, Option<&AttributeValue>)> + '_ {
        self.entries.iter().map(|e| (e.name, e.value.as_ref()))
    }

    /// Only the keys that hold a value
    pub fn values(&self) -> impl Iterator<Item = (&'static str, &AttributeValue)> + '_ {
        self.entries
            .iter()
            .filter_map(|e| e.value.as_ref().map(|v| (e.name, v)))
    }

    /// Key names in registry order
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.name)
    }

    /// Number of keys (always the registry size)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Number of keys holding a value
    pub fn present_count(&self) -> usize {
        self.entries.iter().filter(|e| e.value.is_some()).count()
    }

    /// True when no attribute holds a value
    pub fn is_empty(&self) -> bool {
        self.present_count() == 0
    }

    /// Names from `required` that hold no value here
    pub fn missing<'a>(&self, required: &'a [String]) -> Vec<&'a str> {
        required
            .iter()
            .map(String::as_str)
            .filter(|name| !self.is_set(name))
            .collect()
    }
}

/// Serializes as a map of every key to its value or `null`
impl Serialize for MetadataRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(entry.name, &entry.value)?;
        }
        map.end()
    }
}
