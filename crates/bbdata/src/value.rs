//! Single-slot value holder.
//!
//! [`DataValue`] is the root of a decoded tree and the scratch holder handed
//! to [`Serializable::write_into`]. It holds at most one [`Node`].

use std::borrow::Cow;

use serde::Serialize;

use crate::coerce::{self, Coerce};
use crate::error::Result;
use crate::list::DataList;
use crate::map::DataMap;
use crate::node::Node;
use crate::ser;

/// A type that knows how to write itself into the tree.
///
/// ```
/// use bbdata::{DataMap, DataValue, DataView, Result, Serializable};
///
/// struct Rgb(u8, u8, u8);
///
/// impl Serializable for Rgb {
///     fn write_into(&self, holder: &mut DataValue) -> Result<()> {
///         holder
///             .create_map()
///             .set("red", i16::from(self.0))?
///             .set("green", i16::from(self.1))?
///             .set("blue", i16::from(self.2))?;
///         Ok(())
///     }
/// }
///
/// let mut map = DataMap::new();
/// map.set_serializable("color", &Rgb(0x35, 0x80, 0xEA))?;
/// assert_eq!(map.get_int_at("color.green"), Some(0x80));
/// # Ok::<(), bbdata::Error>(())
/// ```
pub trait Serializable {
    /// Populate `holder` with this value's representation. Leaving the holder
    /// empty stores nothing.
    ///
    /// # Errors
    ///
    /// Implementations propagate errors from the holder's setters.
    fn write_into(&self, holder: &mut DataValue) -> Result<()>;
}

macro_rules! typed_getters {
    ($($name:ident => $ty:ty;)*) => {
        $(
            #[doc = concat!("Read the held value as `", stringify!($ty), "`.")]
            #[must_use]
            pub fn $name(&self) -> Option<$ty> {
                self.get_as::<$ty>()
            }
        )*
    };
}

/// A holder for zero or one node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataValue {
    value: Option<Node>,
}

impl DataValue {
    /// Create an empty holder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a holder containing `value`.
    #[must_use]
    pub fn of(value: impl Into<Node>) -> Self {
        Self {
            value: Some(value.into()),
        }
    }

    #[must_use]
    pub fn get(&self) -> Option<&Node> {
        self.value.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut Node> {
        self.value.as_mut()
    }

    #[must_use]
    pub fn is_present(&self) -> bool {
        self.value.is_some()
    }

    /// Replace the held value.
    pub fn set(&mut self, value: impl Into<Node>) -> &mut Self {
        self.value = Some(value.into());
        self
    }

    /// Replace the held value with any serializable value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value has no node representation; the holder
    /// is left unchanged.
    pub fn set_data<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<&mut Self> {
        self.value = Some(ser::to_node(value)?);
        Ok(self)
    }

    /// Let `value` write itself into a fresh holder and keep the result.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Serializable::write_into`].
    pub fn set_serializable<T: Serializable + ?Sized>(&mut self, value: &T) -> Result<&mut Self> {
        let mut holder = DataValue::new();
        value.write_into(&mut holder)?;
        if let Some(node) = holder.take() {
            self.value = Some(node);
        }
        Ok(self)
    }

    /// Replace the held value with a new empty map and return it.
    pub fn create_map(&mut self) -> &mut DataMap {
        match self.value.insert(Node::Map(DataMap::new())) {
            Node::Map(map) => map,
            _ => unreachable!("map was just inserted"),
        }
    }

    /// Replace the held value with a new empty list and return it.
    pub fn create_list(&mut self) -> &mut DataList {
        match self.value.insert(Node::List(DataList::new())) {
            Node::List(list) => list,
            _ => unreachable!("list was just inserted"),
        }
    }

    pub fn clear(&mut self) {
        self.value = None;
    }

    /// Take the held value, leaving the holder empty.
    pub fn take(&mut self) -> Option<Node> {
        self.value.take()
    }

    #[must_use]
    pub fn into_inner(self) -> Option<Node> {
        self.value
    }

    /// Read the held value as `T`.
    #[must_use]
    pub fn get_as<T: Coerce>(&self) -> Option<T> {
        self.value.as_ref().and_then(T::coerce)
    }

    typed_getters! {
        get_bool => bool;
        get_byte => i8;
        get_short => i16;
        get_int => i32;
        get_long => i64;
        get_float => f32;
        get_double => f64;
        get_char => char;
        get_string => String;
        get_bool_array => Vec<bool>;
        get_byte_array => Vec<i8>;
        get_short_array => Vec<i16>;
        get_int_array => Vec<i32>;
        get_long_array => Vec<i64>;
        get_float_array => Vec<f32>;
        get_double_array => Vec<f64>;
    }

    #[must_use]
    pub fn get_map(&self) -> Option<&DataMap> {
        self.value.as_ref().and_then(coerce::as_map)
    }

    pub fn get_map_mut(&mut self) -> Option<&mut DataMap> {
        self.value.as_mut().and_then(Node::as_map_mut)
    }

    #[must_use]
    pub fn get_list(&self) -> Option<Cow<'_, DataList>> {
        self.value.as_ref().and_then(coerce::as_list)
    }

    pub fn get_list_mut(&mut self) -> Option<&mut DataList> {
        self.value.as_mut().and_then(Node::as_list_mut)
    }
}

impl From<Node> for DataValue {
    fn from(node: Node) -> Self {
        Self { value: Some(node) }
    }
}

impl From<Option<Node>> for DataValue {
    fn from(value: Option<Node>) -> Self {
        Self { value }
    }
}

impl From<DataMap> for DataValue {
    fn from(map: DataMap) -> Self {
        Self::of(map)
    }
}

impl From<DataList> for DataValue {
    fn from(list: DataList) -> Self {
        Self::of(list)
    }
}
