//! Conversion of arbitrary `serde::Serialize` values into nodes.
//!
//! | Rust / serde shape              | Node                              |
//! |---------------------------------|-----------------------------------|
//! | `bool`, `i8`..`i64`, `f32/f64`  | same-width scalar                 |
//! | `u8` / `u16` / `u32`            | next wider signed integer         |
//! | `u64`, `i128`, `u128`           | `Long` if it fits, else an error  |
//! | `char` / `&str`                 | `Char` / `String`                 |
//! | bytes                           | byte array                        |
//! | `None`, `()`, unit struct       | `Null`                            |
//! | unit variant                    | its name as a `String`            |
//! | sequence, tuple                 | list                              |
//! | map with string keys, struct    | map                               |
//! | newtype/tuple/struct variant    | `{ variant: payload }`            |
//!
//! ```
//! use bbdata::ser::to_node;
//! use bbdata::{Node, DataView};
//!
//! #[derive(serde::Serialize)]
//! struct Pet { name: &'static str, legs: u8 }
//!
//! let node = to_node(&Pet { name: "rex", legs: 4 })?;
//! let map = node.as_map().unwrap();
//! assert_eq!(map.get("legs"), Some(&Node::Short(4)));
//! # Ok::<(), bbdata::Error>(())
//! ```

use serde::Serialize;
use serde::ser::{self, Impossible};

use crate::error::{Error, Result};
use crate::list::DataList;
use crate::map::DataMap;
use crate::node::Node;
use crate::view::DataView;

/// Convert `value` into a node.
///
/// # Errors
///
/// Returns [`Error::UnsupportedType`] for integers that do not fit in 64
/// signed bits, [`Error::NonStringKey`] for maps whose keys are not strings,
/// and [`Error::Custom`] for errors raised by the `Serialize` impl.
pub fn to_node<T: Serialize + ?Sized>(value: &T) -> Result<Node> {
    value.serialize(NodeSerializer)
}

/// Serializer whose output is a [`Node`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeSerializer;

fn fit_long<T: TryInto<i64> + std::fmt::Display + Copy>(value: T, ty: &str) -> Result<Node> {
    value
        .try_into()
        .map(Node::Long)
        .map_err(|_| Error::UnsupportedType(format!("{ty} value {value} does not fit in i64")))
}

fn single_entry(variant: &str, payload: Node) -> Node {
    Node::Map(std::iter::once((variant, payload)).collect())
}

impl ser::Serializer for NodeSerializer {
    type Ok = Node;
    type Error = Error;

    type SerializeSeq = SerializeList;
    type SerializeTuple = SerializeList;
    type SerializeTupleStruct = SerializeList;
    type SerializeTupleVariant = SerializeTupleVariant;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeMap;
    type SerializeStructVariant = SerializeStructVariant;

    fn serialize_bool(self, v: bool) -> Result<Node> {
        Ok(Node::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Node> {
        Ok(Node::Byte(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Node> {
        Ok(Node::Short(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Node> {
        Ok(Node::Int(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Node> {
        Ok(Node::Long(v))
    }

    fn serialize_i128(self, v: i128) -> Result<Node> {
        fit_long(v, "i128")
    }

    fn serialize_u8(self, v: u8) -> Result<Node> {
        Ok(Node::Short(v.into()))
    }

    fn serialize_u16(self, v: u16) -> Result<Node> {
        Ok(Node::Int(v.into()))
    }

    fn serialize_u32(self, v: u32) -> Result<Node> {
        Ok(Node::Long(v.into()))
    }

    fn serialize_u64(self, v: u64) -> Result<Node> {
        fit_long(v, "u64")
    }

    fn serialize_u128(self, v: u128) -> Result<Node> {
        fit_long(v, "u128")
    }

    fn serialize_f32(self, v: f32) -> Result<Node> {
        Ok(Node::Float(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Node> {
        Ok(Node::Double(v))
    }

    fn serialize_char(self, v: char) -> Result<Node> {
        Ok(Node::Char(v))
    }

    fn serialize_str(self, v: &str) -> Result<Node> {
        Ok(Node::String(v.to_owned()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Node> {
        Ok(Node::ByteArray(v.iter().map(|&b| b as i8).collect()))
    }

    fn serialize_none(self) -> Result<Node> {
        Ok(Node::Null)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Node> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Node> {
        Ok(Node::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Node> {
        Ok(Node::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Node> {
        Ok(Node::String(variant.to_owned()))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Node> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Node> {
        Ok(single_entry(variant, to_node(value)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeList> {
        Ok(SerializeList {
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeList> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeList> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeTupleVariant> {
        Ok(SerializeTupleVariant {
            variant,
            items: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<SerializeMap> {
        Ok(SerializeMap {
            map: DataMap::with_capacity(len.unwrap_or(0)),
            next_key: None,
        })
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<SerializeMap> {
        self.serialize_map(Some(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeStructVariant> {
        Ok(SerializeStructVariant {
            variant,
            map: DataMap::with_capacity(len),
        })
    }
}

#[doc(hidden)]
pub struct SerializeList {
    items: Vec<Node>,
}

impl ser::SerializeSeq for SerializeList {
    type Ok = Node;
    type Error = Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.items.push(to_node(value)?);
        Ok(())
    }

    fn end(self) -> Result<Node> {
        Ok(Node::List(DataList::from(self.items)))
    }
}

impl ser::SerializeTuple for SerializeList {
    type Ok = Node;
    type Error = Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Node> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SerializeList {
    type Ok = Node;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Node> {
        ser::SerializeSeq::end(self)
    }
}

#[doc(hidden)]
pub struct SerializeTupleVariant {
    variant: &'static str,
    items: Vec<Node>,
}

impl ser::SerializeTupleVariant for SerializeTupleVariant {
    type Ok = Node;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.items.push(to_node(value)?);
        Ok(())
    }

    fn end(self) -> Result<Node> {
        Ok(single_entry(
            self.variant,
            Node::List(DataList::from(self.items)),
        ))
    }
}

#[doc(hidden)]
pub struct SerializeMap {
    map: DataMap,
    next_key: Option<String>,
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Node;
    type Error = Error;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<()> {
        self.next_key = Some(key.serialize(KeySerializer)?);
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        let key = self
            .next_key
            .take()
            .ok_or_else(|| Error::Custom("map value serialized before its key".to_owned()))?;
        self.map.insert(&key, to_node(value)?)?;
        Ok(())
    }

    fn end(self) -> Result<Node> {
        Ok(Node::Map(self.map))
    }
}

impl ser::SerializeStruct for SerializeMap {
    type Ok = Node;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, key: &'static str, value: &T) -> Result<()> {
        self.map.insert(key, to_node(value)?)?;
        Ok(())
    }

    fn end(self) -> Result<Node> {
        Ok(Node::Map(self.map))
    }
}

#[doc(hidden)]
pub struct SerializeStructVariant {
    variant: &'static str,
    map: DataMap,
}

impl ser::SerializeStructVariant for SerializeStructVariant {
    type Ok = Node;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, key: &'static str, value: &T) -> Result<()> {
        self.map.insert(key, to_node(value)?)?;
        Ok(())
    }

    fn end(self) -> Result<Node> {
        Ok(single_entry(self.variant, Node::Map(self.map)))
    }
}

/// Accepts string map keys only.
struct KeySerializer;

fn non_string_key<T>() -> Result<T> {
    Err(Error::NonStringKey)
}

impl ser::Serializer for KeySerializer {
    type Ok = String;
    type Error = Error;

    type SerializeSeq = Impossible<String, Error>;
    type SerializeTuple = Impossible<String, Error>;
    type SerializeTupleStruct = Impossible<String, Error>;
    type SerializeTupleVariant = Impossible<String, Error>;
    type SerializeMap = Impossible<String, Error>;
    type SerializeStruct = Impossible<String, Error>;
    type SerializeStructVariant = Impossible<String, Error>;

    fn serialize_str(self, v: &str) -> Result<String> {
        Ok(v.to_owned())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<String> {
        value.serialize(self)
    }

    fn serialize_bool(self, _v: bool) -> Result<String> {
        non_string_key()
    }

    fn serialize_i8(self, _v: i8) -> Result<String> {
        non_string_key()
    }

    fn serialize_i16(self, _v: i16) -> Result<String> {
        non_string_key()
    }

    fn serialize_i32(self, _v: i32) -> Result<String> {
        non_string_key()
    }

    fn serialize_i64(self, _v: i64) -> Result<String> {
        non_string_key()
    }

    fn serialize_u8(self, _v: u8) -> Result<String> {
        non_string_key()
    }

    fn serialize_u16(self, _v: u16) -> Result<String> {
        non_string_key()
    }

    fn serialize_u32(self, _v: u32) -> Result<String> {
        non_string_key()
    }

    fn serialize_u64(self, _v: u64) -> Result<String> {
        non_string_key()
    }

    fn serialize_f32(self, _v: f32) -> Result<String> {
        non_string_key()
    }

    fn serialize_f64(self, _v: f64) -> Result<String> {
        non_string_key()
    }

    fn serialize_char(self, _v: char) -> Result<String> {
        non_string_key()
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<String> {
        non_string_key()
    }

    fn serialize_none(self) -> Result<String> {
        non_string_key()
    }

    fn serialize_some<T: Serialize + ?Sized>(self, _value: &T) -> Result<String> {
        non_string_key()
    }

    fn serialize_unit(self) -> Result<String> {
        non_string_key()
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<String> {
        non_string_key()
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<String> {
        non_string_key()
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<String> {
        non_string_key()
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        non_string_key()
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        non_string_key()
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        non_string_key()
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        non_string_key()
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        non_string_key()
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct> {
        non_string_key()
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        non_string_key()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[derive(Serialize)]
    enum Event {
        Start,
        Moved(i32),
        Resized(u16, u16),
        Renamed { from: String, to: String },
    }

    #[derive(Serialize)]
    struct Meters(f64);

    #[test]
    fn test_scalars_keep_width() {
        assert_eq!(to_node(&7i8).unwrap(), Node::Byte(7));
        assert_eq!(to_node(&200u8).unwrap(), Node::Short(200));
        assert_eq!(to_node(&70_000u32).unwrap(), Node::Long(70_000));
        assert_eq!(to_node(&'q').unwrap(), Node::Char('q'));
        assert_eq!(to_node(&Meters(1.5)).unwrap(), Node::Double(1.5));
        assert_eq!(to_node(&Option::<i32>::None).unwrap(), Node::Null);
        assert_eq!(to_node(&Some(3i32)).unwrap(), Node::Int(3));
    }

    #[test]
    fn test_out_of_range_integers() {
        assert_eq!(to_node(&5u64).unwrap(), Node::Long(5));
        assert!(matches!(to_node(&u64::MAX), Err(Error::UnsupportedType(_))));
        assert!(matches!(to_node(&i128::MIN), Err(Error::UnsupportedType(_))));
    }

    #[test]
    fn test_enum_variants() {
        assert_eq!(to_node(&Event::Start).unwrap(), Node::from("Start"));

        let node = to_node(&Event::Moved(-4)).unwrap();
        assert_eq!(node.as_map().unwrap().get_int("Moved"), Some(-4));

        let node = to_node(&Event::Resized(3, 4)).unwrap();
        assert_eq!(node.as_map().unwrap().get_int_array("Resized"), Some(vec![3, 4]));

        let node = to_node(&Event::Renamed {
            from: "a".into(),
            to: "b".into(),
        })
        .unwrap();
        assert_eq!(node.as_map().unwrap().get_string_at("Renamed.to").as_deref(), Some("b"));
    }

    #[test]
    fn test_maps_need_string_keys() {
        let mut ok = BTreeMap::new();
        ok.insert("k".to_owned(), vec![1i64, 2]);
        let node = to_node(&ok).unwrap();
        assert_eq!(node.as_map().unwrap().get_long_array("k"), Some(vec![1, 2]));

        let mut bad = BTreeMap::new();
        bad.insert(1i32, "v");
        assert!(matches!(to_node(&bad), Err(Error::NonStringKey)));
    }

    #[test]
    fn test_bytes() {
        struct Raw;
        impl Serialize for Raw {
            fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
                s.serialize_bytes(&[0x01, 0xFF])
            }
        }
        assert_eq!(to_node(&Raw).unwrap(), Node::ByteArray(vec![1, -1]));
    }
}
