//! Writing trees in the binary format.
//!
//! # Layout
//!
//! | Node            | Bytes (tag omitted inside a `$` body)                     |
//! |-----------------|-----------------------------------------------------------|
//! | null            | `N`                                                       |
//! | bool            | `T` / `F`                                                 |
//! | byte..long      | `B`/`S`/`I`/`L` + big-endian value                        |
//! | float, double   | `,` / `;` + big-endian IEEE 754                           |
//! | char            | `u` + 1-3 byte code unit                                  |
//! | string          | `U` + size + UTF-8                                        |
//! | bool array      | `[` `#` size + one `T`/`F` per element                    |
//! | numeric array   | `[` `$` size tag + big-endian payload                     |
//! | list            | `[` then a `$` or `#` body                                |
//! | map             | `{` then a `$` or `#` body, keys as size + UTF-8          |
//!
//! A container body is `$` when it is non-empty and every value has the same
//! tag (see [`Tag::of`]), otherwise `#`.
//!
//! ```
//! use bbdata::{DataMap, DataValue, DataView, encode};
//!
//! let mut map = DataMap::new();
//! map.set("a", 1i8)?;
//! map.set("b", 2i8)?;
//!
//! let bytes = encode::to_bytes(&DataValue::from(map))?;
//! assert_eq!(bytes, b"{$B\x02BB\x01a\x01B\x01b\x02");
//! # Ok::<(), bbdata::Error>(())
//! ```

use std::io::Write;

use tracing::trace;

use crate::config::CodecConfig;
use crate::error::{Error, Result};
use crate::list::DataList;
use crate::map::DataMap;
use crate::node::Node;
use crate::tag::{self, Mode, Tag};
use crate::value::DataValue;
use crate::view::DataView;

/// Encode `value` into a new buffer with default settings.
///
/// # Errors
///
/// See [`Encoder::encode`].
pub fn to_bytes(value: &DataValue) -> Result<Vec<u8>> {
    to_bytes_with_config(value, CodecConfig::default())
}

/// Encode `value` into a new buffer.
///
/// # Errors
///
/// See [`Encoder::encode`].
pub fn to_bytes_with_config(value: &DataValue, config: CodecConfig) -> Result<Vec<u8>> {
    let mut encoder = Encoder::with_config(Vec::new(), config);
    encoder.encode(value)?;
    Ok(encoder.into_inner())
}

/// Encode `value` into `writer` with default settings.
///
/// # Errors
///
/// See [`Encoder::encode`].
pub fn encode<W: Write>(writer: W, value: &DataValue) -> Result<()> {
    Encoder::new(writer).encode(value)
}

/// Find the tag shared by every value, if there is one and at least one value.
fn shared_tag<'a>(mut values: impl Iterator<Item = &'a Node>) -> Option<Tag> {
    let first = Tag::of(values.next()?);
    values.all(|node| Tag::of(node) == first).then_some(first)
}

/// Streaming encoder over a byte sink.
///
/// Bytes are written as they are produced. A failed encode leaves whatever was
/// already written in the sink; encode into a buffer with [`to_bytes`] when
/// that matters.
#[derive(Debug)]
pub struct Encoder<W: Write> {
    writer: W,
    config: CodecConfig,
}

impl<W: Write> Encoder<W> {
    pub fn new(writer: W) -> Self {
        Self::with_config(writer, CodecConfig::default())
    }

    pub fn with_config(writer: W, config: CodecConfig) -> Self {
        Self { writer, config }
    }

    /// Recover the underlying sink.
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Write one root value. An empty holder is written as a bare `N`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CharOutOfRange`] for characters outside the Basic
    /// Multilingual Plane, [`Error::SizeOverflow`] for containers or strings
    /// longer than `i32::MAX`, and [`Error::Io`] if the sink fails.
    pub fn encode(&mut self, value: &DataValue) -> Result<()> {
        match value.get() {
            Some(node) => self.write_node(node, true),
            None => self.write_tag(Tag::Null),
        }
    }

    /// Write a node, with its leading tag when `typed` is set.
    ///
    /// # Errors
    ///
    /// See [`Encoder::encode`].
    pub fn write_node(&mut self, node: &Node, typed: bool) -> Result<()> {
        if typed {
            self.write_tag(Tag::of(node))?;
        }
        match node {
            // the tag is the whole value
            Node::Null | Node::Bool(_) => Ok(()),
            Node::Byte(v) => self.write_all(&v.to_be_bytes()),
            Node::Short(v) => self.write_all(&v.to_be_bytes()),
            Node::Int(v) => self.write_all(&v.to_be_bytes()),
            Node::Long(v) => self.write_all(&v.to_be_bytes()),
            Node::Float(v) => self.write_all(&v.to_be_bytes()),
            Node::Double(v) => self.write_all(&v.to_be_bytes()),
            Node::Char(c) => self.write_char(*c),
            Node::String(s) => self.write_str(s),
            Node::BoolArray(a) => self.write_bool_array(a),
            Node::ByteArray(a) => self.write_array(Tag::Byte, a, |v| v.to_be_bytes()),
            Node::ShortArray(a) => self.write_array(Tag::Short, a, |v| v.to_be_bytes()),
            Node::IntArray(a) => self.write_array(Tag::Int, a, |v| v.to_be_bytes()),
            Node::LongArray(a) => self.write_array(Tag::Long, a, |v| v.to_be_bytes()),
            Node::FloatArray(a) => self.write_array(Tag::Float, a, |v| v.to_be_bytes()),
            Node::DoubleArray(a) => self.write_array(Tag::Double, a, |v| v.to_be_bytes()),
            Node::Map(map) => self.write_map(map),
            Node::List(list) => self.write_list(list),
        }
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes)?;
        Ok(())
    }

    fn write_tag(&mut self, tag: Tag) -> Result<()> {
        self.write_all(&[tag.raw()])
    }

    fn write_mode(&mut self, mode: Mode) -> Result<()> {
        self.write_all(&[mode.raw()])
    }

    fn write_size(&mut self, size: usize) -> Result<()> {
        let bytes = tag::encode_size(size)?;
        self.write_all(&bytes)
    }

    /// Write a size-prefixed UTF-8 string without a tag.
    fn write_str(&mut self, s: &str) -> Result<()> {
        self.write_size(s.len())?;
        self.write_all(s.as_bytes())
    }

    /// Write one UTF-16 code unit in 1-3 bytes. `U+0000` takes the two-byte
    /// form so the encoding never contains a zero byte.
    fn write_char(&mut self, c: char) -> Result<()> {
        let unit = u32::from(c);
        if unit > 0xFFFF {
            return Err(Error::CharOutOfRange(c));
        }
        match unit {
            0x0001..=0x007F => self.write_all(&[unit as u8]),
            0x0000 | 0x0080..=0x07FF => self.write_all(&[
                0xC0 | ((unit >> 6) & 0x1F) as u8,
                0x80 | (unit & 0x3F) as u8,
            ]),
            _ => self.write_all(&[
                0xE0 | ((unit >> 12) & 0x0F) as u8,
                0x80 | ((unit >> 6) & 0x3F) as u8,
                0x80 | (unit & 0x3F) as u8,
            ]),
        }
    }

    fn write_bool_array(&mut self, values: &[bool]) -> Result<()> {
        self.write_mode(Mode::Counted)?;
        self.write_size(values.len())?;
        for &v in values {
            self.write_tag(if v { Tag::True } else { Tag::False })?;
        }
        Ok(())
    }

    fn write_array<T: Copy, const N: usize>(
        &mut self,
        elem: Tag,
        values: &[T],
        to_bytes: impl Fn(T) -> [u8; N],
    ) -> Result<()> {
        self.write_mode(Mode::Typed)?;
        self.write_size(values.len())?;
        self.write_tag(elem)?;
        for &v in values {
            self.write_all(&to_bytes(v))?;
        }
        Ok(())
    }

    /// Pick the body layout for a container and write its mode, size, and
    /// shared tag. Returns whether values must carry their own tags.
    fn write_body_header<'a>(
        &mut self,
        len: usize,
        values: impl Iterator<Item = &'a Node>,
    ) -> Result<bool> {
        let shared = if self.config.homogeneous {
            shared_tag(values)
        } else {
            None
        };
        trace!(len, shared = shared.map(Tag::name), "container body");

        match shared {
            Some(tag) => {
                self.write_mode(Mode::Typed)?;
                self.write_size(len)?;
                self.write_tag(tag)?;
                Ok(false)
            }
            None => {
                self.write_mode(Mode::Counted)?;
                self.write_size(len)?;
                Ok(true)
            }
        }
    }

    fn write_map(&mut self, map: &DataMap) -> Result<()> {
        let typed = self.write_body_header(map.len(), map.values())?;
        for (key, value) in map {
            self.write_str(key)?;
            self.write_node(value, typed)?;
        }
        Ok(())
    }

    fn write_list(&mut self, list: &DataList) -> Result<()> {
        let typed = self.write_body_header(list.len(), list.iter())?;
        for value in list {
            self.write_node(value, typed)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes_of(node: impl Into<Node>) -> Vec<u8> {
        to_bytes(&DataValue::of(node)).unwrap()
    }

    #[test]
    fn test_encode_empty_root() {
        assert_eq!(to_bytes(&DataValue::new()).unwrap(), b"N");
    }

    #[test]
    fn test_encode_scalars() {
        assert_eq!(bytes_of(true), b"T");
        assert_eq!(bytes_of(Node::Null), b"N");
        assert_eq!(bytes_of(-1i8), [b'B', 0xFF]);
        assert_eq!(bytes_of(40i16), [b'S', 0x00, 0x28]);
        assert_eq!(bytes_of(1023i32), [b'I', 0x00, 0x00, 0x03, 0xFF]);
        assert_eq!(bytes_of(1i64), [b'L', 0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(bytes_of(1.5f32), [b',', 0x3F, 0xC0, 0x00, 0x00]);
        assert_eq!(bytes_of(-2.0f64), [b';', 0xC0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(bytes_of("hi"), [b'U', b'B', 0x02, b'h', b'i']);
    }

    #[test]
    fn test_encode_chars() {
        assert_eq!(bytes_of('A'), [b'u', 0x41]);
        assert_eq!(bytes_of('\0'), [b'u', 0xC0, 0x80]);
        assert_eq!(bytes_of('\u{e9}'), [b'u', 0xC3, 0xA9]);
        assert_eq!(bytes_of('\u{20AC}'), [b'u', 0xE2, 0x82, 0xAC]);

        let result = to_bytes(&DataValue::of('\u{1F600}'));
        assert!(matches!(result, Err(Error::CharOutOfRange('\u{1F600}'))));
    }

    #[test]
    fn test_encode_arrays() {
        assert_eq!(
            bytes_of(vec![true, false]),
            [b'[', b'#', b'B', 0x02, b'T', b'F']
        );
        assert_eq!(
            bytes_of(vec![1i16, 2]),
            [b'[', b'$', b'B', 0x02, b'S', 0x00, 0x01, 0x00, 0x02]
        );
        assert_eq!(bytes_of(Vec::<i32>::new()), [b'[', b'$', b'B', 0x00, b'I']);
    }

    #[test]
    fn test_encode_list_modes() {
        let mut same = DataList::new();
        same.add(3i8).add(6i8);
        assert_eq!(bytes_of(same), [b'[', b'$', b'B', 0x02, b'B', 0x03, 0x06]);

        let mut mixed = DataList::new();
        mixed.add(3i8).add(true);
        assert_eq!(bytes_of(mixed), [b'[', b'#', b'B', 0x02, b'B', 0x03, b'T']);

        // true and false are different tags
        let mut bools = DataList::new();
        bools.add(true).add(false);
        assert_eq!(bytes_of(bools), [b'[', b'#', b'B', 0x02, b'T', b'F']);

        assert_eq!(bytes_of(DataList::new()), [b'[', b'#', b'B', 0x00]);
    }

    #[test]
    fn test_nested_values_in_typed_body_skip_tag() {
        let mut outer = DataList::new();
        outer.add(vec![1i8]).add(DataList::new());
        assert_eq!(
            bytes_of(outer),
            [
                b'[', b'$', b'B', 0x02, b'[', // shared array tag
                b'$', b'B', 0x01, b'B', 0x01, // byte array, no leading '['
                b'#', b'B', 0x00, // empty list
            ]
        );
    }

    #[test]
    fn test_encode_map_counted() {
        let mut map = DataMap::new();
        map.set("n", 1i8).unwrap();
        map.set("s", "x").unwrap();
        assert_eq!(
            bytes_of(map),
            [
                b'{', b'#', b'B', 0x02, //
                b'B', 0x01, b'n', b'B', 0x01, //
                b'B', 0x01, b's', b'U', b'B', 0x01, b'x',
            ]
        );
    }

    #[test]
    fn test_homogeneous_can_be_disabled() {
        let mut list = DataList::new();
        list.add(7i8).add(8i8);
        let value = DataValue::of(list);
        let config = CodecConfig::new().with_homogeneous(false);
        assert_eq!(
            to_bytes_with_config(&value, config).unwrap(),
            [b'[', b'#', b'B', 0x02, b'B', 0x07, b'B', 0x08]
        );
    }

    #[test]
    fn test_long_string_uses_short_size() {
        let s = "x".repeat(0x8F);
        let bytes = bytes_of(s.as_str());
        assert_eq!(&bytes[..4], &[b'U', b'S', 0x00, 0x8F]);
        assert_eq!(bytes.len(), 4 + 0x8F);
    }
}
