use serde::{Deserialize, Serialize, ser::SerializeMap as _};

/// Anything that can be bucketed by its processing state.
pub trait HasState {
    fn state(&self) -> &str;
}

/// A library item as reported by the backend. Only `state` is interpreted; every other
/// field is carried through untouched.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PlexDebridItem {
    pub state: String,
    #[serde(flatten)]
    pub payload: serde_json::Map<String, serde_json::Value>,
}
impl HasState for PlexDebridItem {
    fn state(&self) -> &str {
        &self.state
    }
}

/// Items grouped by state. Groups are kept in the order their state was first seen, and
/// items keep their relative input order within a group.
#[derive(Debug, Clone, PartialEq)]
pub struct StateGroups<T> {
    groups: Vec<(String, Vec<T>)>,
}
impl<T> StateGroups<T> {
    pub fn get(&self, state: &str) -> Option<&[T]> {
        self.groups
            .iter()
            .find(|(key, _)| key == state)
            .map(|(_, items)| items.as_slice())
    }

    /// Number of distinct states
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[T])> {
        self.groups
            .iter()
            .map(|(key, items)| (key.as_str(), items.as_slice()))
    }

    pub fn into_inner(self) -> Vec<(String, Vec<T>)> {
        self.groups
    }

    fn push(&mut self, state: &str, item: T) {
        match self.groups.iter_mut().find(|(key, _)| key == state) {
            Some((_, items)) => items.push(item),
            None => self.groups.push((state.to_string(), vec![item])),
        }
    }
}
impl<T> Default for StateGroups<T> {
    fn default() -> Self {
        Self { groups: Vec::new() }
    }
}
impl<T: Serialize> Serialize for StateGroups<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for (state, items) in &self.groups {
            map.serialize_entry(state, items)?;
        }
        map.end()
    }
}

/// Buckets `items` by their state for display. The input is left untouched.
pub fn group_by_state<T: HasState + Clone>(items: &[T]) -> StateGroups<T> {
    let mut groups = StateGroups::default();
    for item in items {
        groups.push(item.state(), item.clone());
    }
    groups
}
