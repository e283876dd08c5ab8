//! Dotted paths and container traversal.
//!
//! A [`Path`] is an ordered list of segments parsed from `a.b.c`. Empty
//! segments are dropped, so `".a..b."` and `"a.b"` are the same path, and
//! `""` is the empty path that refers to the container itself.
//!
//! Each segment is interpreted by the container it lands on: maps use it as
//! a key, lists parse it as an index (see [`DataList::key`]).
//!
//! ```
//! use bbdata::Path;
//!
//! let path: Path = "user..profile.name.".parse().unwrap();
//! assert_eq!(path.segments(), ["user", "profile", "name"]);
//! assert_eq!(path.to_string(), "user.profile.name");
//! assert!(Path::parse("...").is_empty());
//! ```

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use crate::error::Result;
use crate::list::DataList;
use crate::map::DataMap;
use crate::node::Node;
use crate::view::DataView;

/// An ordered sequence of path segments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<String>,
}

impl Path {
    /// The empty path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Split `input` on dots, dropping empty segments.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        Self {
            segments: input
                .split('.')
                .filter(|segment| !segment.is_empty())
                .map(str::to_owned)
                .collect(),
        }
    }

    /// Append one segment verbatim. An empty segment is ignored.
    #[must_use]
    pub fn push(mut self, segment: impl Into<String>) -> Self {
        let segment = segment.into();
        if !segment.is_empty() {
            self.segments.push(segment);
        }
        self
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The parent segments and the final segment, or `None` for the empty path.
    #[must_use]
    pub fn split_last(&self) -> Option<(&[String], &str)> {
        self.segments
            .split_last()
            .map(|(last, parents)| (parents, last.as_str()))
    }
}

impl FromStr for Path {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Path::parse(s))
    }
}

impl From<&str> for Path {
    fn from(s: &str) -> Self {
        Path::parse(s)
    }
}

impl From<String> for Path {
    fn from(s: String) -> Self {
        Path::parse(&s)
    }
}

impl From<&String> for Path {
    fn from(s: &String) -> Self {
        Path::parse(s)
    }
}

impl From<&Path> for Path {
    fn from(path: &Path) -> Self {
        path.clone()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

/// A borrowed container of either kind, as seen by path traversal.
#[derive(Debug, Clone, Copy)]
pub enum Holder<'a> {
    Map(&'a DataMap),
    List(&'a DataList),
}

impl<'a> Holder<'a> {
    /// View `node` as a holder if it is a container.
    #[must_use]
    pub fn of(node: &'a Node) -> Option<Self> {
        match node {
            Node::Map(map) => Some(Holder::Map(map)),
            Node::List(list) => Some(Holder::List(list)),
            _ => None,
        }
    }

    /// Look up one segment in this container.
    #[must_use]
    pub fn get(self, segment: &str) -> Option<&'a Node> {
        match self {
            Holder::Map(map) => map.get(segment),
            Holder::List(list) => list.get(DataList::key(segment)),
        }
    }

    /// Follow `segments`; a missing or non-container step misses.
    #[must_use]
    pub fn walk(self, segments: &[String]) -> Option<Holder<'a>> {
        segments
            .iter()
            .try_fold(self, |holder, segment| holder.get(segment).and_then(Holder::of))
    }

    /// Clone the container into a standalone node.
    #[must_use]
    pub fn to_node(self) -> Node {
        match self {
            Holder::Map(map) => Node::Map(map.clone()),
            Holder::List(list) => Node::List(list.clone()),
        }
    }
}

/// A mutably borrowed container of either kind.
#[derive(Debug)]
pub enum HolderMut<'a> {
    Map(&'a mut DataMap),
    List(&'a mut DataList),
}

impl<'a> HolderMut<'a> {
    /// Turn `node` into a container, replacing any non-container value with a
    /// fresh map.
    pub(crate) fn ensure_container(node: &'a mut Node) -> Self {
        if !node.is_container() {
            *node = Node::Map(DataMap::new());
        }
        match node {
            Node::Map(map) => HolderMut::Map(map),
            Node::List(list) => HolderMut::List(list),
            _ => unreachable!("node was just made a container"),
        }
    }

    fn of(node: &'a mut Node) -> Option<Self> {
        match node {
            Node::Map(map) => Some(HolderMut::Map(map)),
            Node::List(list) => Some(HolderMut::List(list)),
            _ => None,
        }
    }

    /// Step into `segment` without creating anything.
    pub fn child(self, segment: &str) -> Option<HolderMut<'a>> {
        let node = match self {
            HolderMut::Map(map) => map.get_mut(segment)?,
            HolderMut::List(list) => list.get_mut(DataList::key(segment))?,
        };
        HolderMut::of(node)
    }

    /// Step into `segment`, creating a map there when it is missing or holds
    /// a scalar.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`](crate::Error::IndexOutOfRange) when
    /// a list segment lies past the end of the list.
    pub fn child_or_create(self, segment: &str) -> Result<HolderMut<'a>> {
        match self {
            HolderMut::Map(map) => Ok(map.child_container(segment)),
            HolderMut::List(list) => list.child_container(DataList::key(segment)),
        }
    }

    /// Follow `segments` without creating anything.
    pub fn walk(self, segments: &[String]) -> Option<HolderMut<'a>> {
        segments
            .iter()
            .try_fold(self, |holder, segment| holder.child(segment))
    }

    /// Follow `segments`, creating intermediate maps as needed.
    ///
    /// # Errors
    ///
    /// See [`HolderMut::child_or_create`].
    pub fn walk_or_create(self, segments: &[String]) -> Result<HolderMut<'a>> {
        segments
            .iter()
            .try_fold(self, |holder, segment| holder.child_or_create(segment))
    }

    pub fn get_mut(self, segment: &str) -> Option<&'a mut Node> {
        match self {
            HolderMut::Map(map) => map.get_mut(segment),
            HolderMut::List(list) => list.get_mut(DataList::key(segment)),
        }
    }

    /// Store `node` under `segment` in this container.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`](crate::Error::IndexOutOfRange) for a
    /// list segment past the end of the list.
    pub fn insert(self, segment: &str, node: Node) -> Result<&'a mut Node> {
        match self {
            HolderMut::Map(map) => map.insert(segment, node),
            HolderMut::List(list) => list.insert(DataList::key(segment), node),
        }
    }

    pub fn remove(self, segment: &str) -> Option<Node> {
        match self {
            HolderMut::Map(map) => map.remove(segment),
            HolderMut::List(list) => list.remove(DataList::key(segment)),
        }
    }
}
