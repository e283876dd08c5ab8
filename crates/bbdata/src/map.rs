//! Ordered string-keyed container.

use std::fmt;

use indexmap::IndexMap;
use indexmap::map::Entry;

use crate::error::Result;
use crate::node::Node;
use crate::path::{Holder, HolderMut};
use crate::view::DataView;

/// A map node: string keys in insertion order, unique.
///
/// Re-setting an existing key replaces the value in place without moving it.
///
/// ```
/// use bbdata::{DataMap, DataView};
///
/// let mut map = DataMap::new();
/// map.set("b", 1i32)?;
/// map.set("a", 2i32)?;
/// map.set("b", "again")?;
/// assert_eq!(map.keys(), vec!["b".to_owned(), "a".to_owned()]);
/// assert_eq!(map.get_string("b").as_deref(), Some("again"));
/// # Ok::<(), bbdata::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataMap {
    entries: IndexMap<String, Node>,
}

impl DataMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty map with room for `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    /// Independent deep copy of this map.
    #[must_use]
    pub fn copy(&self) -> DataMap {
        self.clone()
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Node> {
        self.entries.iter()
    }

    /// Iterate values in insertion order.
    pub fn values(&self) -> indexmap::map::Values<'_, String, Node> {
        self.entries.values()
    }

    /// Get the child container at `key`, replacing a missing or scalar entry
    /// with a fresh map.
    pub(crate) fn child_container(&mut self, key: &str) -> HolderMut<'_> {
        let node = match self.entries.entry(key.to_owned()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(Node::Map(DataMap::new())),
        };
        HolderMut::ensure_container(node)
    }
}

impl DataView for DataMap {
    type Key<'k> = &'k str;
    type OwnedKey = String;

    fn key(segment: &str) -> &str {
        segment
    }

    fn get(&self, key: &str) -> Option<&Node> {
        self.entries.get(key)
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.entries.get_mut(key)
    }

    fn insert(&mut self, key: &str, node: Node) -> Result<&mut Node> {
        let slot = match self.entries.entry(key.to_owned()) {
            Entry::Occupied(entry) => {
                let slot = entry.into_mut();
                *slot = node;
                slot
            }
            Entry::Vacant(entry) => entry.insert(node),
        };
        Ok(slot)
    }

    fn remove(&mut self, key: &str) -> Option<Node> {
        // shift_remove keeps the order of the remaining keys
        self.entries.shift_remove(key)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    fn as_holder(&self) -> Holder<'_> {
        Holder::Map(self)
    }

    fn as_holder_mut(&mut self) -> HolderMut<'_> {
        HolderMut::Map(self)
    }
}

impl<'a> IntoIterator for &'a DataMap {
    type Item = (&'a String, &'a Node);
    type IntoIter = indexmap::map::Iter<'a, String, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for DataMap {
    type Item = (String, Node);
    type IntoIter = indexmap::map::IntoIter<String, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>, V: Into<Node>> FromIterator<(K, V)> for DataMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl fmt::Display for DataMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}={value}")?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_survives_replace_and_remove() {
        let mut map = DataMap::new();
        map.set("x", 1i32).unwrap();
        map.set("y", 2i32).unwrap();
        map.set("z", 3i32).unwrap();
        map.set("x", 10i64).unwrap();
        assert_eq!(map.keys(), ["x", "y", "z"]);
        assert_eq!(map.get("x"), Some(&Node::Long(10)));

        assert_eq!(map.remove("y"), Some(Node::Int(2)));
        assert_eq!(map.keys(), ["x", "z"]);
        assert_eq!(map.remove("y"), None);
    }

    #[test]
    fn test_copy_is_independent() {
        let mut inner = DataMap::new();
        inner.set("leaf", true).unwrap();
        let mut map = DataMap::new();
        map.set("inner", inner).unwrap();

        let copy = map.copy();
        map.get_map_mut("inner").unwrap().set("leaf", false).unwrap();

        assert_eq!(copy.get_bool_at("inner.leaf"), Some(true));
        assert_eq!(map.get_bool_at("inner.leaf"), Some(false));
    }

    #[test]
    fn test_keys_snapshot_allows_mutation() {
        let mut map: DataMap = [("a", 1i32), ("b", 2), ("c", 3)].into_iter().collect();
        for key in map.keys() {
            if key != "b" {
                map.remove(key.as_str());
            }
        }
        assert_eq!(map.len(), 1);
        assert!(map.contains_key("b"));
    }

    #[test]
    fn test_clear() {
        let mut map = DataMap::new();
        map.set("a", 'a').unwrap();
        assert!(!map.is_empty());
        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.get("a"), None);
    }
}
