//! Shared operations of the two container kinds.
//!
//! [`DataView`] is implemented by [`DataMap`] (keyed by `&str`) and
//! [`DataList`] (keyed by `usize`). Implementors provide a handful of raw
//! primitives; everything else, including every path-based operation, is
//! built on top of them. All writes go through [`DataView::insert`].
//!
//! Containers own their children, so a container can never be stored inside
//! itself:
//!
//! ```compile_fail
//! use bbdata::{DataMap, DataView};
//!
//! let mut map = DataMap::new();
//! map.set("me", &map).unwrap();
//! ```
//!
//! Storing a container copies (or moves) its contents at that moment:
//!
//! ```
//! use bbdata::{DataMap, DataView};
//!
//! let mut inner = DataMap::new();
//! inner.set("n", 1i32)?;
//!
//! let mut outer = DataMap::new();
//! outer.set("inner", &inner)?;
//! inner.set("n", 2i32)?;
//!
//! assert_eq!(outer.get_int_at("inner.n"), Some(1));
//! # Ok::<(), bbdata::Error>(())
//! ```

use std::borrow::Cow;

use serde::Serialize;

use crate::coerce::{self, Coerce};
use crate::error::{Error, Result};
use crate::list::DataList;
use crate::map::DataMap;
use crate::node::Node;
use crate::path::{Holder, HolderMut, Path};
use crate::ser;
use crate::value::{DataValue, Serializable};

macro_rules! typed_getters {
    ($($name:ident, $name_at:ident => $ty:ty;)*) => {
        $(
            #[doc = concat!("Read the value at `key` as `", stringify!($ty), "`.")]
            fn $name(&self, key: Self::Key<'_>) -> Option<$ty> {
                self.get_as::<$ty>(key)
            }

            #[doc = concat!("Read the value at `path` as `", stringify!($ty), "`.")]
            fn $name_at(&self, path: impl Into<Path>) -> Option<$ty> {
                self.get_as_at::<$ty>(path)
            }
        )*
    };
}

/// Key-addressed access to a map or list.
pub trait DataView {
    /// Native key type: `&str` for maps, `usize` for lists.
    type Key<'k>: Copy;
    /// Owned form of a key, as returned by [`DataView::keys`].
    type OwnedKey;

    /// Parse a path segment into a native key.
    fn key(segment: &str) -> Self::Key<'_>;

    fn get(&self, key: Self::Key<'_>) -> Option<&Node>;

    fn get_mut(&mut self, key: Self::Key<'_>) -> Option<&mut Node>;

    /// Store `node` at `key`, returning the stored slot.
    ///
    /// # Errors
    ///
    /// Lists return [`Error::IndexOutOfRange`] when `key` is past the end.
    fn insert(&mut self, key: Self::Key<'_>, node: Node) -> Result<&mut Node>;

    /// Remove and return the value at `key`.
    fn remove(&mut self, key: Self::Key<'_>) -> Option<Node>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn clear(&mut self);

    /// Snapshot of the current keys, in iteration order.
    fn keys(&self) -> Vec<Self::OwnedKey>;

    fn as_holder(&self) -> Holder<'_>;

    fn as_holder_mut(&mut self) -> HolderMut<'_>;

    // Setters

    /// Store a node-compatible value at `key`.
    ///
    /// # Errors
    ///
    /// See [`DataView::insert`].
    fn set(&mut self, key: Self::Key<'_>, value: impl Into<Node>) -> Result<&mut Self> {
        self.insert(key, value.into())?;
        Ok(self)
    }

    /// Store any serializable value at `key`.
    ///
    /// Unit enum variants become their name, string-keyed maps and structs
    /// become maps, and sequences become lists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedType`] or [`Error::NonStringKey`] when the
    /// value has no node representation.
    fn set_data<T: Serialize + ?Sized>(&mut self, key: Self::Key<'_>, value: &T) -> Result<&mut Self> {
        self.insert(key, ser::to_node(value)?)?;
        Ok(self)
    }

    /// Let `value` write itself into a fresh holder and store the result.
    /// Nothing is stored when the holder is left empty.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Serializable::write_into`].
    fn set_serializable<T: Serializable + ?Sized>(
        &mut self,
        key: Self::Key<'_>,
        value: &T,
    ) -> Result<&mut Self> {
        let mut holder = DataValue::new();
        value.write_into(&mut holder)?;
        if let Some(node) = holder.take() {
            self.insert(key, node)?;
        }
        Ok(self)
    }

    /// Replace the value at `key` with a new empty map and return it.
    ///
    /// # Errors
    ///
    /// See [`DataView::insert`].
    fn create_map(&mut self, key: Self::Key<'_>) -> Result<&mut DataMap> {
        match self.insert(key, Node::Map(DataMap::new()))? {
            Node::Map(map) => Ok(map),
            _ => unreachable!("map was just inserted"),
        }
    }

    /// Replace the value at `key` with a new empty list and return it.
    ///
    /// # Errors
    ///
    /// See [`DataView::insert`].
    fn create_list(&mut self, key: Self::Key<'_>) -> Result<&mut DataList> {
        match self.insert(key, Node::List(DataList::new()))? {
            Node::List(list) => Ok(list),
            _ => unreachable!("list was just inserted"),
        }
    }

    // Getters

    /// Read the value at `key` as `T`.
    fn get_as<T: Coerce>(&self, key: Self::Key<'_>) -> Option<T> {
        self.get(key).and_then(T::coerce)
    }

    typed_getters! {
        get_bool, get_bool_at => bool;
        get_byte, get_byte_at => i8;
        get_short, get_short_at => i16;
        get_int, get_int_at => i32;
        get_long, get_long_at => i64;
        get_float, get_float_at => f32;
        get_double, get_double_at => f64;
        get_char, get_char_at => char;
        get_string, get_string_at => String;
        get_bool_array, get_bool_array_at => Vec<bool>;
        get_byte_array, get_byte_array_at => Vec<i8>;
        get_short_array, get_short_array_at => Vec<i16>;
        get_int_array, get_int_array_at => Vec<i32>;
        get_long_array, get_long_array_at => Vec<i64>;
        get_float_array, get_float_array_at => Vec<f32>;
        get_double_array, get_double_array_at => Vec<f64>;
    }

    fn get_map(&self, key: Self::Key<'_>) -> Option<&DataMap> {
        self.get(key).and_then(coerce::as_map)
    }

    fn get_map_mut(&mut self, key: Self::Key<'_>) -> Option<&mut DataMap> {
        self.get_mut(key).and_then(Node::as_map_mut)
    }

    /// Read the value at `key` as a list. Strings and primitive arrays are
    /// split into a new list.
    fn get_list(&self, key: Self::Key<'_>) -> Option<Cow<'_, DataList>> {
        self.get(key).and_then(coerce::as_list)
    }

    fn get_list_mut(&mut self, key: Self::Key<'_>) -> Option<&mut DataList> {
        self.get_mut(key).and_then(Node::as_list_mut)
    }

    // Path forms

    /// Resolve `path`. The empty path yields a copy of this container.
    fn get_at(&self, path: impl Into<Path>) -> Option<Cow<'_, Node>> {
        let path = path.into();
        match path.split_last() {
            None => Some(Cow::Owned(self.as_holder().to_node())),
            Some((parents, last)) => self
                .as_holder()
                .walk(parents)?
                .get(last)
                .map(Cow::Borrowed),
        }
    }

    fn get_as_at<T: Coerce>(&self, path: impl Into<Path>) -> Option<T> {
        self.get_at(path).and_then(|node| T::coerce(&node))
    }

    fn get_map_at(&self, path: impl Into<Path>) -> Option<Cow<'_, DataMap>> {
        match self.get_at(path)? {
            Cow::Borrowed(node) => coerce::as_map(node).map(Cow::Borrowed),
            Cow::Owned(Node::Map(map)) => Some(Cow::Owned(map)),
            Cow::Owned(_) => None,
        }
    }

    fn get_list_at(&self, path: impl Into<Path>) -> Option<Cow<'_, DataList>> {
        match self.get_at(path)? {
            Cow::Borrowed(node) => coerce::as_list(node),
            Cow::Owned(node) => coerce::as_list(&node).map(|list| Cow::Owned(list.into_owned())),
        }
    }

    /// Store a value at `path`, creating intermediate maps.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyPath`] for the empty path, or
    /// [`Error::IndexOutOfRange`] when a list segment is past the end.
    fn set_at(&mut self, path: impl Into<Path>, value: impl Into<Node>) -> Result<&mut Self> {
        let path = path.into();
        let (parents, last) = path.split_last().ok_or(Error::EmptyPath)?;
        self.as_holder_mut()
            .walk_or_create(parents)?
            .insert(last, value.into())?;
        Ok(self)
    }

    /// Path form of [`DataView::set_data`].
    ///
    /// # Errors
    ///
    /// See [`DataView::set_data`] and [`DataView::set_at`].
    fn set_data_at<T: Serialize + ?Sized>(
        &mut self,
        path: impl Into<Path>,
        value: &T,
    ) -> Result<&mut Self> {
        let node = ser::to_node(value)?;
        self.set_at(path, node)
    }

    /// Path form of [`DataView::set_serializable`].
    ///
    /// # Errors
    ///
    /// See [`DataView::set_serializable`] and [`DataView::set_at`].
    fn set_serializable_at<T: Serializable + ?Sized>(
        &mut self,
        path: impl Into<Path>,
        value: &T,
    ) -> Result<&mut Self> {
        let path = path.into();
        if path.is_empty() {
            return Err(Error::EmptyPath);
        }
        let mut holder = DataValue::new();
        value.write_into(&mut holder)?;
        match holder.take() {
            Some(node) => self.set_at(path, node),
            None => Ok(self),
        }
    }

    /// Remove the value at `path`. Missing intermediates are not created.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyPath`] for the empty path.
    fn remove_at(&mut self, path: impl Into<Path>) -> Result<Option<Node>> {
        let path = path.into();
        let (parents, last) = path.split_last().ok_or(Error::EmptyPath)?;
        Ok(self
            .as_holder_mut()
            .walk(parents)
            .and_then(|holder| holder.remove(last)))
    }

    /// Create a new empty map at `path`, creating intermediate maps.
    ///
    /// # Errors
    ///
    /// See [`DataView::set_at`].
    fn create_map_at(&mut self, path: impl Into<Path>) -> Result<&mut DataMap> {
        let path = path.into();
        let (parents, last) = path.split_last().ok_or(Error::EmptyPath)?;
        let node = self
            .as_holder_mut()
            .walk_or_create(parents)?
            .insert(last, Node::Map(DataMap::new()))?;
        match node {
            Node::Map(map) => Ok(map),
            _ => unreachable!("map was just inserted"),
        }
    }

    /// Create a new empty list at `path`, creating intermediate maps.
    ///
    /// # Errors
    ///
    /// See [`DataView::set_at`].
    fn create_list_at(&mut self, path: impl Into<Path>) -> Result<&mut DataList> {
        let path = path.into();
        let (parents, last) = path.split_last().ok_or(Error::EmptyPath)?;
        let node = self
            .as_holder_mut()
            .walk_or_create(parents)?
            .insert(last, Node::List(DataList::new()))?;
        match node {
            Node::List(list) => Ok(list),
            _ => unreachable!("list was just inserted"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    enum Shape {
        Circle,
    }

    struct Point {
        x: i32,
        y: i32,
    }

    impl Serializable for Point {
        fn write_into(&self, holder: &mut DataValue) -> Result<()> {
            let map = holder.create_map();
            map.set("x", self.x)?.set("y", self.y)?;
            Ok(())
        }
    }

    struct Nothing;

    impl Serializable for Nothing {
        fn write_into(&self, _holder: &mut DataValue) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_path_auto_vivification() {
        let mut root = DataMap::new();
        root.set_at("a.b.c", 7i64).unwrap();

        assert!(root.get_map("a").is_some());
        assert!(root.get_map_at("a.b").is_some());
        assert_eq!(root.get_at("a.b.c").as_deref(), Some(&Node::Long(7)));
        assert_eq!(root.get_at("a.x.c"), None);
        assert_eq!(root.get_long_at("a.b.c"), Some(7));
    }

    #[test]
    fn test_empty_path() {
        let mut root = DataMap::new();
        root.set("k", 1i32).unwrap();

        let whole = root.get_at("").unwrap();
        assert!(matches!(whole, Cow::Owned(Node::Map(_))));
        assert_eq!(root.get_map_at("").unwrap().len(), 1);

        assert!(matches!(root.set_at("", 1i32), Err(Error::EmptyPath)));
        assert!(matches!(root.remove_at("..."), Err(Error::EmptyPath)));
        assert!(matches!(root.create_map_at(""), Err(Error::EmptyPath)));
        assert!(matches!(root.create_list_at(""), Err(Error::EmptyPath)));
    }

    #[test]
    fn test_remove_at_does_not_create() {
        let mut root = DataMap::new();
        root.set_at("a.b", true).unwrap();

        assert_eq!(root.remove_at("x.y").unwrap(), None);
        assert!(!root.contains_key("x"));
        assert_eq!(root.remove_at("a.b").unwrap(), Some(Node::Bool(true)));
        assert!(root.get_map("a").unwrap().is_empty());
    }

    #[test]
    fn test_create_replaces_existing() {
        let mut root = DataMap::new();
        root.create_map("m").unwrap().set("old", 1i32).unwrap();
        let fresh = root.create_map("m").unwrap();
        assert!(fresh.is_empty());

        root.create_list_at("deep.list").unwrap().add(1i32);
        assert_eq!(root.get_int_array_at("deep.list"), Some(vec![1]));
    }

    #[test]
    fn test_typed_getters_miss_quietly() {
        let mut root = DataMap::new();
        root.set("word", "hello").unwrap();
        root.set("null", Node::Null).unwrap();

        assert_eq!(root.get_int("word"), None);
        assert_eq!(root.get_int("missing"), None);
        assert_eq!(root.get_bool("null"), None);
        assert_eq!(root.get_char("word"), Some('h'));
        assert!(root.get_map("word").is_none());
        assert_eq!(root.get_list("word").unwrap().len(), 5);
    }

    #[test]
    fn test_set_data() {
        let mut root = DataMap::new();
        root.set_data("shape", &Shape::Circle).unwrap();
        root.set_data_at("nested.tags", &["a", "b"]).unwrap();

        assert_eq!(root.get_string("shape").as_deref(), Some("Circle"));
        assert_eq!(root.get_string_at("nested.tags.1").as_deref(), Some("b"));
    }

    #[test]
    fn test_set_serializable() {
        let mut root = DataMap::new();
        root.set_serializable("p", &Point { x: 1, y: -2 }).unwrap();
        root.set_serializable("none", &Nothing).unwrap();
        root.set_serializable_at("deep.p", &Point { x: 3, y: 4 }).unwrap();

        assert_eq!(root.get_int_at("p.y"), Some(-2));
        assert!(!root.contains_key("none"));
        assert_eq!(root.get_int_at("deep.p.x"), Some(3));
    }

    #[test]
    fn test_list_view() {
        let mut list = DataList::new();
        list.set(0, "zero").unwrap().set(1, 1i32).unwrap();
        list.create_map(2).unwrap().set("k", 'v').unwrap();

        assert_eq!(list.get_char_at("2.k"), Some('v'));
        assert_eq!(list.get_string(0).as_deref(), Some("zero"));
        assert!(matches!(
            list.create_list(9),
            Err(Error::IndexOutOfRange { index: 9, length: 3 })
        ));
    }
}
