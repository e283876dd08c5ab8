//! The universal tree value.
//!
//! A [`Node`] is a closed tagged union over every representation the data
//! tree can hold natively: scalars, homogeneous primitive arrays, and the two
//! container kinds [`DataMap`] and [`DataList`].
//!
//! ```
//! use bbdata::Node;
//!
//! let node = Node::from(1023i32);
//! assert_eq!(node.kind(), bbdata::NodeKind::Int);
//! assert_eq!(node.coerce::<i16>(), Some(1023));
//! ```

use std::fmt;

use crate::coerce::Coerce;
use crate::list::DataList;
use crate::map::DataMap;
use crate::view::DataView;

/// Discriminant of a [`Node`], used for error messages and homogeneity checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Null,
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

impl NodeKind {
    /// Get the kind name as a string (for error messages).
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Null => "null",
            NodeKind::Bool => "bool",
            NodeKind::Byte => "byte",
            NodeKind::Short => "short",
            NodeKind::Int => "int",
            NodeKind::Long => "long",
            NodeKind::Float => "float",
            NodeKind::Double => "double",
            NodeKind::Char => "char",
            NodeKind::String => "string",
            NodeKind::BoolArray => "bool[]",
            NodeKind::ByteArray => "byte[]",
            NodeKind::ShortArray => "short[]",
            NodeKind::IntArray => "int[]",
            NodeKind::LongArray => "long[]",
            NodeKind::FloatArray => "float[]",
            NodeKind::DoubleArray => "double[]",
            NodeKind::Map => "map",
            NodeKind::List => "list",
        }
    }
}

/// A value stored in the data tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Node {
    /// Null payload.
    #[default]
    Null,
    Bool(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    /// A single character. Only Basic Multilingual Plane characters can be
    /// written by the codec.
    Char(char),
    String(String),
    BoolArray(Vec<bool>),
    ByteArray(Vec<i8>),
    ShortArray(Vec<i16>),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
    FloatArray(Vec<f32>),
    DoubleArray(Vec<f64>),
    /// Ordered string-keyed container.
    Map(DataMap),
    /// Dense index-keyed container.
    List(DataList),
}

impl Node {
    /// Get the discriminant of this node.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Null => NodeKind::Null,
            Node::Bool(_) => NodeKind::Bool,
            Node::Byte(_) => NodeKind::Byte,
            Node::Short(_) => NodeKind::Short,
            Node::Int(_) => NodeKind::Int,
            Node::Long(_) => NodeKind::Long,
            Node::Float(_) => NodeKind::Float,
            Node::Double(_) => NodeKind::Double,
            Node::Char(_) => NodeKind::Char,
            Node::String(_) => NodeKind::String,
            Node::BoolArray(_) => NodeKind::BoolArray,
            Node::ByteArray(_) => NodeKind::ByteArray,
            Node::ShortArray(_) => NodeKind::ShortArray,
            Node::IntArray(_) => NodeKind::IntArray,
            Node::LongArray(_) => NodeKind::LongArray,
            Node::FloatArray(_) => NodeKind::FloatArray,
            Node::DoubleArray(_) => NodeKind::DoubleArray,
            Node::Map(_) => NodeKind::Map,
            Node::List(_) => NodeKind::List,
        }
    }

    /// Returns true for the null payload.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }

    /// Returns true for integer and floating point scalars.
    #[must_use]
    pub fn is_number(&self) -> bool {
        matches!(
            self,
            Node::Byte(_)
                | Node::Short(_)
                | Node::Int(_)
                | Node::Long(_)
                | Node::Float(_)
                | Node::Double(_)
        )
    }

    /// Returns true for the homogeneous primitive array variants.
    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(
            self,
            Node::BoolArray(_)
                | Node::ByteArray(_)
                | Node::ShortArray(_)
                | Node::IntArray(_)
                | Node::LongArray(_)
                | Node::FloatArray(_)
                | Node::DoubleArray(_)
        )
    }

    /// Returns true for maps and lists.
    #[must_use]
    pub fn is_container(&self) -> bool {
        matches!(self, Node::Map(_) | Node::List(_))
    }

    /// Borrow the map, if this is a map node.
    #[must_use]
    pub fn as_map(&self) -> Option<&DataMap> {
        match self {
            Node::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Mutably borrow the map, if this is a map node.
    pub fn as_map_mut(&mut self) -> Option<&mut DataMap> {
        match self {
            Node::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Borrow the list, if this is a list node.
    #[must_use]
    pub fn as_list(&self) -> Option<&DataList> {
        match self {
            Node::List(list) => Some(list),
            _ => None,
        }
    }

    /// Mutably borrow the list, if this is a list node.
    pub fn as_list_mut(&mut self) -> Option<&mut DataList> {
        match self {
            Node::List(list) => Some(list),
            _ => None,
        }
    }

    /// Borrow the string, if this is a string node.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String(s) => Some(s),
            _ => None,
        }
    }

    /// Number of elements of an array or container; `None` for scalars.
    #[must_use]
    pub fn len(&self) -> Option<usize> {
        match self {
            Node::BoolArray(a) => Some(a.len()),
            Node::ByteArray(a) => Some(a.len()),
            Node::ShortArray(a) => Some(a.len()),
            Node::IntArray(a) => Some(a.len()),
            Node::LongArray(a) => Some(a.len()),
            Node::FloatArray(a) => Some(a.len()),
            Node::DoubleArray(a) => Some(a.len()),
            Node::Map(map) => Some(map.len()),
            Node::List(list) => Some(list.len()),
            _ => None,
        }
    }

    /// Read this node as `T` using the coercion rules.
    #[must_use]
    pub fn coerce<T: Coerce>(&self) -> Option<T> {
        T::coerce(self)
    }
}

// Scalar conversions

impl From<bool> for Node {
    fn from(v: bool) -> Self {
        Node::Bool(v)
    }
}

impl From<i8> for Node {
    fn from(v: i8) -> Self {
        Node::Byte(v)
    }
}

impl From<i16> for Node {
    fn from(v: i16) -> Self {
        Node::Short(v)
    }
}

impl From<i32> for Node {
    fn from(v: i32) -> Self {
        Node::Int(v)
    }
}

impl From<i64> for Node {
    fn from(v: i64) -> Self {
        Node::Long(v)
    }
}

impl From<f32> for Node {
    fn from(v: f32) -> Self {
        Node::Float(v)
    }
}

impl From<f64> for Node {
    fn from(v: f64) -> Self {
        Node::Double(v)
    }
}

impl From<char> for Node {
    fn from(v: char) -> Self {
        Node::Char(v)
    }
}

impl From<&str> for Node {
    fn from(v: &str) -> Self {
        Node::String(v.to_owned())
    }
}

impl From<String> for Node {
    fn from(v: String) -> Self {
        Node::String(v)
    }
}

impl From<&String> for Node {
    fn from(v: &String) -> Self {
        Node::String(v.clone())
    }
}

// Primitive array conversions

macro_rules! impl_from_array {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<Vec<$ty>> for Node {
                fn from(v: Vec<$ty>) -> Self {
                    Node::$variant(v)
                }
            }

            impl From<&[$ty]> for Node {
                fn from(v: &[$ty]) -> Self {
                    Node::$variant(v.to_vec())
                }
            }

            impl<const N: usize> From<[$ty; N]> for Node {
                fn from(v: [$ty; N]) -> Self {
                    Node::$variant(v.to_vec())
                }
            }
        )*
    };
}

impl_from_array! {
    bool => BoolArray,
    i8 => ByteArray,
    i16 => ShortArray,
    i32 => IntArray,
    i64 => LongArray,
    f32 => FloatArray,
    f64 => DoubleArray,
}

// Containers

impl From<DataMap> for Node {
    fn from(v: DataMap) -> Self {
        Node::Map(v)
    }
}

impl From<&DataMap> for Node {
    fn from(v: &DataMap) -> Self {
        Node::Map(v.clone())
    }
}

impl From<DataList> for Node {
    fn from(v: DataList) -> Self {
        Node::List(v)
    }
}

impl From<&DataList> for Node {
    fn from(v: &DataList) -> Self {
        Node::List(v.clone())
    }
}

impl From<&Node> for Node {
    fn from(v: &Node) -> Self {
        v.clone()
    }
}

/// Float rendering that keeps a fractional part (`1.0`, not `1`) and spells
/// out `Infinity`.
struct Decimal<T>(T);

macro_rules! decimal_display {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for Decimal<$ty> {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    let v = self.0;
                    if v.is_infinite() {
                        f.write_str(if v > 0.0 { "Infinity" } else { "-Infinity" })
                    } else {
                        write!(f, "{v:?}")
                    }
                }
            }
        )*
    };
}

decimal_display!(f32, f64);

fn write_seq<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    items: impl IntoIterator<Item = T>,
) -> fmt::Result {
    f.write_str("[")?;
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    f.write_str("]")
}

/// Textual rendering used by string coercion.
///
/// Scalars render bare (strings without quotes), arrays and lists as
/// `[a, b]`, and maps as `{key=value, ...}`.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Null => f.write_str("null"),
            Node::Bool(v) => write!(f, "{v}"),
            Node::Byte(v) => write!(f, "{v}"),
            Node::Short(v) => write!(f, "{v}"),
            Node::Int(v) => write!(f, "{v}"),
            Node::Long(v) => write!(f, "{v}"),
            Node::Float(v) => write!(f, "{}", Decimal(*v)),
            Node::Double(v) => write!(f, "{}", Decimal(*v)),
            Node::Char(v) => write!(f, "{v}"),
            Node::String(v) => f.write_str(v),
            Node::BoolArray(a) => write_seq(f, a),
            Node::ByteArray(a) => write_seq(f, a),
            Node::ShortArray(a) => write_seq(f, a),
            Node::IntArray(a) => write_seq(f, a),
            Node::LongArray(a) => write_seq(f, a),
            Node::FloatArray(a) => write_seq(f, a.iter().map(|&v| Decimal(v))),
            Node::DoubleArray(a) => write_seq(f, a.iter().map(|&v| Decimal(v))),
            Node::Map(map) => write!(f, "{map}"),
            Node::List(list) => write!(f, "{list}"),
        }
    }
}
