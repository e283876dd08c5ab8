//! Dense index-keyed container.

use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::map::DataMap;
use crate::node::Node;
use crate::path::{Holder, HolderMut};
use crate::ser;
use crate::view::DataView;

/// Index that never addresses an element. Produced by [`DataList::key`] for
/// segments that are not a decimal index.
pub const INVALID_INDEX: usize = usize::MAX;

/// A list node: elements at indices `0..len` with no gaps.
///
/// `set` at `len` appends; `set` past `len` fails with
/// [`Error::IndexOutOfRange`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataList {
    items: Vec<Node>,
}

impl DataList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    /// Append a value.
    pub fn add(&mut self, value: impl Into<Node>) -> &mut Self {
        self.items.push(value.into());
        self
    }

    /// Append an arbitrary serializable value, converted as by
    /// [`DataView::set_data`].
    ///
    /// # Errors
    ///
    /// Returns an error if the value has no node representation.
    pub fn add_data<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<&mut Self> {
        self.items.push(ser::to_node(value)?);
        Ok(self)
    }

    /// Append a fresh empty map and return it.
    pub fn add_map(&mut self) -> &mut DataMap {
        self.items.push(Node::Map(DataMap::new()));
        match self.items.last_mut() {
            Some(Node::Map(map)) => map,
            _ => unreachable!("map was just pushed"),
        }
    }

    /// Append a fresh empty list and return it.
    pub fn add_list(&mut self) -> &mut DataList {
        self.items.push(Node::List(DataList::new()));
        match self.items.last_mut() {
            Some(Node::List(list)) => list,
            _ => unreachable!("list was just pushed"),
        }
    }

    /// Iterate elements in index order.
    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.items.iter()
    }

    /// Borrow the elements as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Node] {
        &self.items
    }

    pub(crate) fn child_container(&mut self, index: usize) -> Result<HolderMut<'_>> {
        let node = if index < self.items.len() {
            &mut self.items[index]
        } else {
            self.insert(index, Node::Map(DataMap::new()))?
        };
        Ok(HolderMut::ensure_container(node))
    }
}

impl DataView for DataList {
    type Key<'k> = usize;
    type OwnedKey = usize;

    /// Parse a decimal index. Anything else maps to [`INVALID_INDEX`].
    fn key(segment: &str) -> usize {
        segment.parse().unwrap_or(INVALID_INDEX)
    }

    fn get(&self, index: usize) -> Option<&Node> {
        self.items.get(index)
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut Node> {
        self.items.get_mut(index)
    }

    fn insert(&mut self, index: usize, node: Node) -> Result<&mut Node> {
        let length = self.items.len();
        if index < length {
            let slot = &mut self.items[index];
            *slot = node;
            Ok(slot)
        } else if index == length {
            self.items.push(node);
            Ok(&mut self.items[index])
        } else {
            Err(Error::IndexOutOfRange { index, length })
        }
    }

    /// Remove the element at `index`, shifting later elements down.
    fn remove(&mut self, index: usize) -> Option<Node> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn clear(&mut self) {
        self.items.clear();
    }

    fn keys(&self) -> Vec<usize> {
        (0..self.items.len()).collect()
    }

    fn as_holder(&self) -> Holder<'_> {
        Holder::List(self)
    }

    fn as_holder_mut(&mut self) -> HolderMut<'_> {
        HolderMut::List(self)
    }
}

impl<'a> IntoIterator for &'a DataList {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl IntoIterator for DataList {
    type Item = Node;
    type IntoIter = std::vec::IntoIter<Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl FromIterator<Node> for DataList {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<Node>> for DataList {
    fn from(items: Vec<Node>) -> Self {
        Self { items }
    }
}

impl fmt::Display for DataList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{item}")?;
        }
        f.write_str("]")
    }
}
