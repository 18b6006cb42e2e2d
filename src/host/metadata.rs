//! Small persisted key/value store attached to every actor.
use std::collections::BTreeMap;

use bevy::prelude::*;

use super::api::ActorId;

#[derive(Debug, Clone, PartialEq)]
pub enum MetaValue {
    Int(i64),
    Text(String),
    Flag(bool),
    Actor(ActorId),
}

#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct ActorMetadata {
    entries: BTreeMap<String, MetaValue>,
}

impl ActorMetadata {
    pub fn insert(&mut self, key: impl Into<String>, value: MetaValue) {
        self.entries.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn int(&self, key: &str) -> Option<i64> {
        match self.entries.get(key) {
            Some(MetaValue::Int(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.entries.get(key) {
            Some(MetaValue::Text(value)) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Missing or non-flag entries read as `false`.
    pub fn flag(&self, key: &str) -> bool {
        matches!(self.entries.get(key), Some(MetaValue::Flag(true)))
    }

    pub fn actor(&self, key: &str) -> Option<ActorId> {
        match self.entries.get(key) {
            Some(MetaValue::Actor(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_reads_ignore_mismatched_values() {
        let mut metadata = ActorMetadata::default();
        metadata.insert("id", MetaValue::Int(4));
        metadata.insert("kind", MetaValue::Text("zombie".to_string()));
        metadata.insert("driver", MetaValue::Flag(true));
        metadata.insert("partner", MetaValue::Actor(ActorId::new(9)));

        assert_eq!(metadata.int("id"), Some(4));
        assert_eq!(metadata.int("kind"), None);
        assert_eq!(metadata.text("kind"), Some("zombie"));
        assert!(metadata.flag("driver"));
        assert!(!metadata.flag("missing"));
        assert_eq!(metadata.actor("partner"), Some(ActorId::new(9)));
        assert!(metadata.contains("id"));
        assert!(!metadata.is_empty());
    }
}
