//! Cross-type value coercion.
//!
//! Every typed read of the tree goes through [`Coerce`]. A coercion is
//! best-effort: a value that can not be read as the requested target yields
//! `None`, never an error. [`Node::Null`] never coerces to anything.
//!
//! Integer narrowing wraps (two's complement). Float to integer conversion
//! saturates to 32 bits first for `i8`/`i16`/`i32` and to 64 bits for `i64`,
//! matching JVM semantics so trees exchanged with JVM peers read identically.
//!
//! ```
//! use bbdata::{Coerce, Node};
//!
//! assert_eq!(i32::coerce(&Node::from(" 40.0 ")), Some(40));
//! assert_eq!(bool::coerce(&Node::from("Yes")), Some(true));
//! assert_eq!(i8::coerce(&Node::from(300i32)), Some(44));
//! assert_eq!(Vec::<i16>::coerce(&Node::from(vec![1.9f64, -2.5])), Some(vec![1, -2]));
//! ```

use std::borrow::Cow;
use std::str::FromStr;

use crate::list::DataList;
use crate::map::DataMap;
use crate::node::Node;

/// The closed set of coercion targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    Bool,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Char,
    String,
    BoolArray,
    ByteArray,
    ShortArray,
    IntArray,
    LongArray,
    FloatArray,
    DoubleArray,
    Map,
    List,
}

/// A type that a [`Node`] can be read as.
pub trait Coerce: Sized {
    /// Which target this impl produces.
    const TARGET: TargetKind;

    /// Read `node` as `Self`, or `None` if it has no such reading.
    fn coerce(node: &Node) -> Option<Self>;
}

/// A numeric scalar lifted out of a node.
#[derive(Debug, Clone, Copy)]
enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    fn of(node: &Node) -> Option<Self> {
        match *node {
            Node::Byte(v) => Some(Num::Int(v.into())),
            Node::Short(v) => Some(Num::Int(v.into())),
            Node::Int(v) => Some(Num::Int(v.into())),
            Node::Long(v) => Some(Num::Int(v)),
            Node::Float(v) => Some(Num::Float(v.into())),
            Node::Double(v) => Some(Num::Float(v)),
            _ => None,
        }
    }

    fn as_i32(self) -> i32 {
        match self {
            Num::Int(v) => v as i32,
            Num::Float(v) => v as i32,
        }
    }

    fn as_i64(self) -> i64 {
        match self {
            Num::Int(v) => v,
            Num::Float(v) => v as i64,
        }
    }

    fn as_f32(self) -> f32 {
        match self {
            Num::Int(v) => v as f32,
            Num::Float(v) => v as f32,
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Num::Int(v) => v as f64,
            Num::Float(v) => v,
        }
    }
}

/// Borrow the string form of a non-numeric node, rendering it when needed.
fn text(node: &Node) -> Cow<'_, str> {
    match node {
        Node::String(s) => Cow::Borrowed(s.as_str()),
        other => Cow::Owned(other.to_string()),
    }
}

/// Parse a decimal float. Non-finite values must be spelled `Infinity` or
/// `NaN`, so `inf` and `infinity` are rejected.
fn parse_float<F: FromStr>(word: &str) -> Option<F> {
    let unsigned = word.strip_prefix(['+', '-']).unwrap_or(word);
    if unsigned.starts_with(|c: char| c.is_ascii_alphabetic())
        && !matches!(unsigned, "Infinity" | "NaN")
    {
        return None;
    }
    word.parse().ok()
}

fn parse_f64(node: &Node) -> Option<f64> {
    parse_float(text(node).trim())
}

fn parse_f32(node: &Node) -> Option<f32> {
    parse_float(text(node).trim())
}

impl Coerce for bool {
    const TARGET: TargetKind = TargetKind::Bool;

    fn coerce(node: &Node) -> Option<Self> {
        match node {
            Node::Null => None,
            Node::Bool(v) => Some(*v),
            _ => {
                if let Some(n) = Num::of(node) {
                    return Some(n.as_i32() != 0);
                }
                let text = text(node);
                let word = text.trim();
                if ["true", "yes", "t", "y"]
                    .iter()
                    .any(|w| word.eq_ignore_ascii_case(w))
                {
                    return Some(true);
                }
                if ["false", "no", "f", "n"]
                    .iter()
                    .any(|w| word.eq_ignore_ascii_case(w))
                {
                    return Some(false);
                }
                parse_float::<f64>(word).map(|d| d as i32 != 0)
            }
        }
    }
}

impl Coerce for i8 {
    const TARGET: TargetKind = TargetKind::Byte;

    fn coerce(node: &Node) -> Option<Self> {
        if node.is_null() {
            return None;
        }
        match Num::of(node) {
            Some(n) => Some(n.as_i32() as i8),
            None => parse_f64(node).map(|d| d as i32 as i8),
        }
    }
}

impl Coerce for i16 {
    const TARGET: TargetKind = TargetKind::Short;

    fn coerce(node: &Node) -> Option<Self> {
        if node.is_null() {
            return None;
        }
        match Num::of(node) {
            Some(n) => Some(n.as_i32() as i16),
            // parsed at single precision
            None => parse_f32(node).map(|f| f as i32 as i16),
        }
    }
}

impl Coerce for i32 {
    const TARGET: TargetKind = TargetKind::Int;

    fn coerce(node: &Node) -> Option<Self> {
        if node.is_null() {
            return None;
        }
        match Num::of(node) {
            Some(n) => Some(n.as_i32()),
            None => parse_f64(node).map(|d| d as i32),
        }
    }
}

impl Coerce for i64 {
    const TARGET: TargetKind = TargetKind::Long;

    fn coerce(node: &Node) -> Option<Self> {
        if node.is_null() {
            return None;
        }
        if let Some(n) = Num::of(node) {
            return Some(n.as_i64());
        }
        let text = text(node);
        let trimmed = text.trim();
        trimmed
            .parse::<i64>()
            .ok()
            .or_else(|| parse_float::<f64>(trimmed).map(|d| d as i64))
    }
}

impl Coerce for f32 {
    const TARGET: TargetKind = TargetKind::Float;

    fn coerce(node: &Node) -> Option<Self> {
        if node.is_null() {
            return None;
        }
        match Num::of(node) {
            Some(n) => Some(n.as_f32()),
            None => parse_f32(node),
        }
    }
}

impl Coerce for f64 {
    const TARGET: TargetKind = TargetKind::Double;

    fn coerce(node: &Node) -> Option<Self> {
        if node.is_null() {
            return None;
        }
        match Num::of(node) {
            Some(n) => Some(n.as_f64()),
            None => parse_f64(node),
        }
    }
}

impl Coerce for char {
    const TARGET: TargetKind = TargetKind::Char;

    fn coerce(node: &Node) -> Option<Self> {
        match node {
            Node::Null => None,
            Node::Char(c) => Some(*c),
            other => text(other).chars().next(),
        }
    }
}

impl Coerce for String {
    const TARGET: TargetKind = TargetKind::String;

    fn coerce(node: &Node) -> Option<Self> {
        match node {
            Node::Null => None,
            Node::String(s) => Some(s.clone()),
            Node::List(list) => list.iter().map(char::coerce).collect(),
            other => Some(other.to_string()),
        }
    }
}

// Primitive arrays

fn numeric_elements(node: &Node) -> Option<Vec<Num>> {
    let nums: Vec<Num> = match node {
        Node::ByteArray(a) => a.iter().map(|&v| Num::Int(v.into())).collect(),
        Node::ShortArray(a) => a.iter().map(|&v| Num::Int(v.into())).collect(),
        Node::IntArray(a) => a.iter().map(|&v| Num::Int(v.into())).collect(),
        Node::LongArray(a) => a.iter().map(|&v| Num::Int(v)).collect(),
        Node::FloatArray(a) => a.iter().map(|&v| Num::Float(v.into())).collect(),
        Node::DoubleArray(a) => a.iter().map(|&v| Num::Float(v)).collect(),
        _ => return None,
    };
    Some(nums)
}

/// Coerce every element of a list, failing as a whole if any element fails.
fn list_elements<T: Coerce>(list: &DataList) -> Option<Vec<T>> {
    list.iter().map(T::coerce).collect()
}

macro_rules! impl_array_coerce {
    ($($elem:ty => $variant:ident, $target:ident, |$n:ident| $cast:expr;)*) => {
        $(
            impl Coerce for Vec<$elem> {
                const TARGET: TargetKind = TargetKind::$target;

                fn coerce(node: &Node) -> Option<Self> {
                    match node {
                        Node::$variant(a) => Some(a.clone()),
                        Node::List(list) => list_elements(list),
                        other => numeric_elements(other)
                            .map(|nums| nums.into_iter().map(|$n| $cast).collect()),
                    }
                }
            }
        )*
    };
}

impl_array_coerce! {
    bool => BoolArray, BoolArray, |n| n.as_i32() != 0;
    i8 => ByteArray, ByteArray, |n| n.as_i32() as i8;
    i16 => ShortArray, ShortArray, |n| n.as_i32() as i16;
    i32 => IntArray, IntArray, |n| n.as_i32();
    i64 => LongArray, LongArray, |n| n.as_i64();
    f32 => FloatArray, FloatArray, |n| n.as_f32();
    f64 => DoubleArray, DoubleArray, |n| n.as_f64();
}

// Structural

/// Read a node as a map. Only map nodes have a map reading.
#[must_use]
pub fn as_map(node: &Node) -> Option<&DataMap> {
    node.as_map()
}

/// Read a node as a list.
///
/// List nodes are borrowed. Strings split into one-character string elements
/// and primitive arrays split into their element nodes; both produce a fresh
/// owned list.
#[must_use]
pub fn as_list(node: &Node) -> Option<Cow<'_, DataList>> {
    fn split<T: Copy + Into<Node>>(items: &[T]) -> Cow<'static, DataList> {
        Cow::Owned(items.iter().map(|&v| v.into()).collect())
    }

    match node {
        Node::List(list) => Some(Cow::Borrowed(list)),
        Node::String(s) => Some(Cow::Owned(
            s.chars().map(|c| Node::String(c.to_string())).collect(),
        )),
        Node::BoolArray(a) => Some(split(a)),
        Node::ByteArray(a) => Some(split(a)),
        Node::ShortArray(a) => Some(split(a)),
        Node::IntArray(a) => Some(split(a)),
        Node::LongArray(a) => Some(split(a)),
        Node::FloatArray(a) => Some(split(a)),
        Node::DoubleArray(a) => Some(split(a)),
        _ => None,
    }
}

impl Coerce for DataMap {
    const TARGET: TargetKind = TargetKind::Map;

    fn coerce(node: &Node) -> Option<Self> {
        as_map(node).cloned()
    }
}

impl Coerce for DataList {
    const TARGET: TargetKind = TargetKind::List;

    fn coerce(node: &Node) -> Option<Self> {
        as_list(node).map(Cow::into_owned)
    }
}
