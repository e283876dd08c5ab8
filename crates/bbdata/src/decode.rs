//! Reading trees from the binary format.
//!
//! The decoder accepts everything the [encoder](crate::encode) writes plus the
//! forms it never produces: `N`-terminated containers with space padding,
//! little-endian numbers, `L` sizes and `H` huge numbers (kept as text).
//!
//! ```
//! use bbdata::decode;
//!
//! let value = decode::decode_slice(b"{NB\x01aI\x00\x00\x03\xFF}")?;
//! let map = value.get_map().unwrap();
//! assert_eq!(bbdata::DataView::get_short(map, "a"), Some(1023));
//! # Ok::<(), bbdata::Error>(())
//! ```

use std::io::Read;

use tracing::{debug, trace};

use crate::config::CodecConfig;
use crate::error::{Error, Result};
use crate::list::DataList;
use crate::map::DataMap;
use crate::node::Node;
use crate::tag::{Mode, Tag};
use crate::value::DataValue;
use crate::view::DataView;

/// Upper bound on capacity reserved from an untrusted size before any
/// element has been read.
const PREALLOC_LIMIT: usize = 4096;

/// Decode one value from `reader` with default settings.
///
/// # Errors
///
/// See [`Decoder::decode`].
pub fn decode<R: Read>(reader: R) -> Result<DataValue> {
    Decoder::new(reader).decode()
}

/// Decode one value from `reader`.
///
/// # Errors
///
/// See [`Decoder::decode`].
pub fn decode_with_config<R: Read>(reader: R, config: CodecConfig) -> Result<DataValue> {
    Decoder::with_config(reader, config).decode()
}

/// Decode one value from the start of `bytes`. Trailing bytes are ignored.
///
/// # Errors
///
/// See [`Decoder::decode`].
pub fn decode_slice(bytes: &[u8]) -> Result<DataValue> {
    decode(bytes)
}

/// Streaming decoder over a byte source.
#[derive(Debug)]
pub struct Decoder<R: Read> {
    reader: R,
    config: CodecConfig,
    depth: usize,
}

impl<R: Read> Decoder<R> {
    pub fn new(reader: R) -> Self {
        Self::with_config(reader, CodecConfig::default())
    }

    pub fn with_config(reader: R, config: CodecConfig) -> Self {
        Self {
            reader,
            config,
            depth: 0,
        }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Read one tagged value. A top-level `N` yields an empty holder.
    ///
    /// # Errors
    ///
    /// Any malformed byte aborts the whole decode; no partial tree is
    /// returned. See [`Error`] for the decode failure variants.
    pub fn decode(&mut self) -> Result<DataValue> {
        self.depth = 0;
        let result = self.read_tag().and_then(|tag| match tag {
            Tag::Null => Ok(DataValue::new()),
            tag => self.read_value(tag).map(DataValue::from),
        });
        if let Err(err) = &result {
            debug!(error = %err, depth = self.depth, "decode aborted");
        }
        result
    }

    fn read_bytes<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.reader.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn read_u8(&mut self) -> Result<u8> {
        let [b] = self.read_bytes()?;
        Ok(b)
    }

    fn read_tag(&mut self) -> Result<Tag> {
        let b = self.read_u8()?;
        Tag::from_byte(b).ok_or(Error::UnknownTag(b))
    }

    fn read_value(&mut self, tag: Tag) -> Result<Node> {
        let node = match tag {
            Tag::Null => Node::Null,
            Tag::True => Node::Bool(true),
            Tag::False => Node::Bool(false),
            Tag::Char => Node::Char(self.read_char()?),
            Tag::String | Tag::Huge => Node::String(self.read_string()?),
            Tag::Byte => Node::Byte(i8::from_be_bytes(self.read_bytes()?)),
            Tag::Short => Node::Short(i16::from_be_bytes(self.read_bytes()?)),
            Tag::Int => Node::Int(i32::from_be_bytes(self.read_bytes()?)),
            Tag::Long => Node::Long(i64::from_be_bytes(self.read_bytes()?)),
            Tag::Float => Node::Float(f32::from_be_bytes(self.read_bytes()?)),
            Tag::Double => Node::Double(f64::from_be_bytes(self.read_bytes()?)),
            Tag::ShortLe => Node::Short(i16::from_le_bytes(self.read_bytes()?)),
            Tag::IntLe => Node::Int(i32::from_le_bytes(self.read_bytes()?)),
            Tag::LongLe => Node::Long(i64::from_le_bytes(self.read_bytes()?)),
            Tag::FloatLe => Node::Float(f32::from_le_bytes(self.read_bytes()?)),
            Tag::DoubleLe => Node::Double(f64::from_le_bytes(self.read_bytes()?)),
            Tag::MapStart => Node::Map(self.read_map()?),
            Tag::ArrayStart => self.read_array()?,
            Tag::MapEnd | Tag::ArrayEnd | Tag::Nop => return Err(Error::UnknownTag(tag.raw())),
        };
        Ok(node)
    }

    /// Read a size whose tag byte was already consumed.
    fn size_from(&mut self, b: u8) -> Result<usize> {
        let raw = match Tag::from_byte(b) {
            Some(Tag::Byte) => i64::from(self.read_u8()?),
            Some(Tag::Short) => i64::from(u16::from_be_bytes(self.read_bytes()?)),
            Some(Tag::Int) => i64::from(i32::from_be_bytes(self.read_bytes()?)),
            Some(Tag::Long) => i64::from_be_bytes(self.read_bytes()?),
            Some(Tag::ShortLe) => i64::from(u16::from_le_bytes(self.read_bytes()?)),
            Some(Tag::IntLe) => i64::from(i32::from_le_bytes(self.read_bytes()?)),
            Some(Tag::LongLe) => i64::from_le_bytes(self.read_bytes()?),
            _ => return Err(Error::InvalidSizeTag(b)),
        };
        if !(0..=i64::from(i32::MAX)).contains(&raw) {
            return Err(Error::InvalidSize(raw));
        }
        usize::try_from(raw).map_err(|_| Error::InvalidSize(raw))
    }

    fn read_size(&mut self) -> Result<usize> {
        let b = self.read_u8()?;
        self.size_from(b)
    }

    /// Element count of a `#` or `$` container, bounded by `max_elements`.
    fn read_count(&mut self) -> Result<usize> {
        let count = self.read_size()?;
        if count > self.config.max_elements {
            return Err(Error::InvalidSize(count as i64));
        }
        Ok(count)
    }

    fn read_str(&mut self, size: usize) -> Result<String> {
        let mut buf = Vec::with_capacity(size.min(PREALLOC_LIMIT));
        (&mut self.reader).take(size as u64).read_to_end(&mut buf)?;
        if buf.len() < size {
            return Err(Error::UnexpectedEof);
        }
        String::from_utf8(buf).map_err(|_| Error::InvalidUtf8)
    }

    fn read_string(&mut self) -> Result<String> {
        let size = self.read_size()?;
        self.read_str(size)
    }

    fn read_continuation(&mut self) -> Result<u32> {
        let b = self.read_u8()?;
        if b & 0xC0 != 0x80 {
            return Err(Error::MalformedChar(b));
        }
        Ok(u32::from(b & 0x3F))
    }

    /// Read one 1-3 byte UTF-16 code unit. Surrogates have no `char`
    /// representation and are rejected.
    fn read_char(&mut self) -> Result<char> {
        let b1 = self.read_u8()?;
        let unit = match b1 >> 4 {
            0..=7 => u32::from(b1),
            12 | 13 => (u32::from(b1 & 0x1F) << 6) | self.read_continuation()?,
            14 => {
                let b2 = self.read_continuation()?;
                let b3 = self.read_continuation()?;
                (u32::from(b1 & 0x0F) << 12) | (b2 << 6) | b3
            }
            _ => return Err(Error::MalformedChar(b1)),
        };
        char::from_u32(unit).ok_or(Error::MalformedChar(b1))
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.config.max_depth {
            return Err(Error::DepthLimitExceeded(self.config.max_depth));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn read_map(&mut self) -> Result<DataMap> {
        self.enter()?;
        let mode = Mode::from_byte(self.read_u8()?)?;
        trace!(?mode, depth = self.depth, "map header");

        let mut map;
        match mode {
            Mode::Terminated => {
                map = DataMap::new();
                loop {
                    let b = self.read_u8()?;
                    if b == Tag::MapEnd.raw() {
                        break;
                    }
                    if b == Tag::Nop.raw() {
                        continue;
                    }
                    let size = self.size_from(b)?;
                    let key = self.read_str(size)?;
                    let tag = self.read_tag()?;
                    let value = self.read_value(tag)?;
                    map.insert(key.as_str(), value)?;
                }
            }
            Mode::Counted => {
                let count = self.read_count()?;
                map = DataMap::with_capacity(count.min(PREALLOC_LIMIT));
                for _ in 0..count {
                    let key = self.read_string()?;
                    let tag = self.read_tag()?;
                    let value = self.read_value(tag)?;
                    map.insert(key.as_str(), value)?;
                }
            }
            Mode::Typed => {
                let count = self.read_count()?;
                let tag = self.read_tag()?;
                trace!(count, shared = tag.name(), "typed map body");
                map = DataMap::with_capacity(count.min(PREALLOC_LIMIT));
                for _ in 0..count {
                    let key = self.read_string()?;
                    let value = self.read_value(tag)?;
                    map.insert(key.as_str(), value)?;
                }
            }
        }

        self.leave();
        Ok(map)
    }

    fn read_array(&mut self) -> Result<Node> {
        self.enter()?;
        let mode = Mode::from_byte(self.read_u8()?)?;
        trace!(?mode, depth = self.depth, "array header");

        let node = match mode {
            Mode::Terminated => {
                let mut list = DataList::new();
                loop {
                    let b = self.read_u8()?;
                    if b == Tag::ArrayEnd.raw() {
                        break;
                    }
                    if b == Tag::Nop.raw() {
                        continue;
                    }
                    let tag = Tag::from_byte(b).ok_or(Error::UnknownTag(b))?;
                    list.add(self.read_value(tag)?);
                }
                Node::List(list)
            }
            Mode::Counted => {
                let count = self.read_count()?;
                let mut list = DataList::with_capacity(count.min(PREALLOC_LIMIT));
                for _ in 0..count {
                    let tag = self.read_tag()?;
                    list.add(self.read_value(tag)?);
                }
                Node::List(list)
            }
            Mode::Typed => {
                let count = self.read_count()?;
                let tag = self.read_tag()?;
                trace!(count, shared = tag.name(), "typed array body");
                self.read_typed_array(count, tag)?
            }
        };

        self.leave();
        Ok(node)
    }

    fn read_primitives<T, const N: usize>(
        &mut self,
        count: usize,
        from_bytes: fn([u8; N]) -> T,
    ) -> Result<Vec<T>> {
        let mut out = Vec::with_capacity(count.min(PREALLOC_LIMIT));
        for _ in 0..count {
            out.push(from_bytes(self.read_bytes()?));
        }
        Ok(out)
    }

    fn read_nodes(
        &mut self,
        count: usize,
        mut read: impl FnMut(&mut Self) -> Result<Node>,
    ) -> Result<Node> {
        let mut list = DataList::with_capacity(count.min(PREALLOC_LIMIT));
        for _ in 0..count {
            list.add(read(self)?);
        }
        Ok(Node::List(list))
    }

    /// Body of a `$` array: `count` values sharing `tag`, none of them tagged.
    fn read_typed_array(&mut self, count: usize, tag: Tag) -> Result<Node> {
        let node = match tag {
            // no payload
            Tag::Null => Node::List(std::iter::repeat_n(Node::Null, count).collect()),
            Tag::True => Node::BoolArray(vec![true; count]),
            Tag::False => Node::BoolArray(vec![false; count]),

            Tag::Char => {
                let mut s = String::with_capacity(count.min(PREALLOC_LIMIT));
                for _ in 0..count {
                    s.push(self.read_char()?);
                }
                Node::String(s)
            }
            Tag::String | Tag::Huge => self.read_nodes(count, |d| d.read_string().map(Node::String))?,
            Tag::MapStart => self.read_nodes(count, |d| d.read_map().map(Node::Map))?,
            Tag::ArrayStart => self.read_nodes(count, Self::read_array)?,

            Tag::Byte => Node::ByteArray(self.read_primitives(count, i8::from_be_bytes)?),
            Tag::Short => Node::ShortArray(self.read_primitives(count, i16::from_be_bytes)?),
            Tag::Int => Node::IntArray(self.read_primitives(count, i32::from_be_bytes)?),
            Tag::Long => Node::LongArray(self.read_primitives(count, i64::from_be_bytes)?),
            Tag::Float => Node::FloatArray(self.read_primitives(count, f32::from_be_bytes)?),
            Tag::Double => Node::DoubleArray(self.read_primitives(count, f64::from_be_bytes)?),
            Tag::ShortLe => Node::ShortArray(self.read_primitives(count, i16::from_le_bytes)?),
            Tag::IntLe => Node::IntArray(self.read_primitives(count, i32::from_le_bytes)?),
            Tag::LongLe => Node::LongArray(self.read_primitives(count, i64::from_le_bytes)?),
            Tag::FloatLe => Node::FloatArray(self.read_primitives(count, f32::from_le_bytes)?),
            Tag::DoubleLe => Node::DoubleArray(self.read_primitives(count, f64::from_le_bytes)?),

            Tag::MapEnd | Tag::ArrayEnd | Tag::Nop => return Err(Error::UnknownTag(tag.raw())),
        };
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode;

    const SCENARIO_A: &[u8] = b"{N\
        B\x02abS\x00\x28\
        B\x03yayI\x00\x00\x03\xFF\
        B\x02ls[NB\x03B\x06B\x09]\
        }";

    #[test]
    fn test_decode_terminated_map() {
        let value = decode_slice(SCENARIO_A).unwrap();
        let map = value.get_map().unwrap();

        assert_eq!(map.len(), 3);
        assert_eq!(map.get_int("ab"), Some(40));
        assert_eq!(map.get_int("yay"), Some(1023));
        assert_eq!(map.get_short("yay"), Some(1023));
        assert_eq!(map.get_int_array("ls"), Some(vec![3, 6, 9]));
        assert_eq!(map.keys(), vec!["ab", "yay", "ls"]);
    }

    #[test]
    fn test_decode_little_endian() {
        let bytes = b"{NB\x03yayi\xFF\x03\x00\x00}";
        let value = decode_slice(bytes).unwrap();
        assert_eq!(value.get_map().unwrap().get("yay"), Some(&Node::Int(1023)));
    }

    #[test]
    fn test_decode_padding() {
        let value = decode_slice(b"[N T  F]").unwrap();
        assert_eq!(value.get_bool_array(), Some(vec![true, false]));
    }

    #[test]
    fn test_top_level_null_is_empty() {
        let value = decode_slice(b"N").unwrap();
        assert!(!value.is_present());

        let value = decode_slice(b"[#B\x01N").unwrap();
        assert_eq!(value.get_list().unwrap().get(0), Some(&Node::Null));
    }

    #[test]
    fn test_decode_typed_arrays() {
        let value = decode_slice(b"[$B\x02S\x00\x01\xFF\xFF").unwrap();
        assert_eq!(value.get(), Some(&Node::ShortArray(vec![1, -1])));

        let value = decode_slice(b"[$B\x02s\x01\x00\xFF\xFF").unwrap();
        assert_eq!(value.get(), Some(&Node::ShortArray(vec![1, -1])));

        let value = decode_slice(b"[$B\x03T").unwrap();
        assert_eq!(value.get(), Some(&Node::BoolArray(vec![true; 3])));

        let value = decode_slice(b"[$B\x02N").unwrap();
        assert_eq!(value.get_list().unwrap().len(), 2);

        let value = decode_slice(b"[$B\x02uhi").unwrap();
        assert_eq!(value.get(), Some(&Node::String("hi".to_string())));

        let value = decode_slice(b"[$B\x02UB\x01aB\x01b").unwrap();
        let list = value.get_list().unwrap();
        assert_eq!(list.get_string(1).as_deref(), Some("b"));
    }

    #[test]
    fn test_decode_huge_as_string() {
        let value = decode_slice(b"HB\x0512345").unwrap();
        assert_eq!(value.get_string().as_deref(), Some("12345"));
        assert_eq!(value.get_long(), Some(12345));
    }

    #[test]
    fn test_decode_chars() {
        assert_eq!(decode_slice(b"uA").unwrap().get_char(), Some('A'));
        assert_eq!(decode_slice(&[b'u', 0xC0, 0x80]).unwrap().get_char(), Some('\0'));
        assert_eq!(
            decode_slice(&[b'u', 0xE2, 0x82, 0xAC]).unwrap().get_char(),
            Some('\u{20AC}')
        );

        assert!(matches!(
            decode_slice(&[b'u', 0x80]),
            Err(Error::MalformedChar(0x80))
        ));
        assert!(matches!(
            decode_slice(&[b'u', 0xC3, 0x41]),
            Err(Error::MalformedChar(0x41))
        ));
        // lone surrogate
        assert!(matches!(
            decode_slice(&[b'u', 0xED, 0xA0, 0x80]),
            Err(Error::MalformedChar(0xED))
        ));
    }

    #[test]
    fn test_unsigned_short_sizes() {
        let s = "y".repeat(0x8FFE);
        let bytes = encode::to_bytes(&DataValue::of(s.as_str())).unwrap();
        assert_eq!(&bytes[..4], &[b'U', b'S', 0x8F, 0xFE]);
        assert_eq!(decode_slice(&bytes).unwrap().get_string(), Some(s));
    }

    #[test]
    fn test_decode_errors() {
        assert!(matches!(decode_slice(b"x"), Err(Error::UnknownTag(b'x'))));
        assert!(matches!(decode_slice(b"}"), Err(Error::UnknownTag(b'}'))));
        assert!(matches!(decode_slice(b"[#B\x01?"), Err(Error::UnknownTag(b'?'))));
        assert!(matches!(decode_slice(b"{?"), Err(Error::InvalidContainerMode(b'?'))));
        assert!(matches!(decode_slice(b"U,"), Err(Error::InvalidSizeTag(b','))));
        assert!(matches!(
            decode_slice(b"UI\xFF\xFF\xFF\xFF"),
            Err(Error::InvalidSize(-1))
        ));
        assert!(matches!(decode_slice(b""), Err(Error::UnexpectedEof)));
        assert!(matches!(decode_slice(b"I\x00\x01"), Err(Error::UnexpectedEof)));
        assert!(matches!(decode_slice(b"UB\x05ab"), Err(Error::UnexpectedEof)));
        assert!(matches!(decode_slice(b"UB\x01\xFF"), Err(Error::InvalidUtf8)));
    }

    #[test]
    fn test_depth_limit() {
        let bytes = b"[#B\x01[#B\x01[#B\x00";
        let config = CodecConfig::new().with_max_depth(2);
        assert!(matches!(
            decode_with_config(&bytes[..], config),
            Err(Error::DepthLimitExceeded(2))
        ));

        let config = CodecConfig::new().with_max_depth(3);
        assert!(decode_with_config(&bytes[..], config).is_ok());
    }

    #[test]
    fn test_element_budget() {
        // payload-free element types must not size an allocation from the header
        for bytes in [
            &b"[$I\x7f\xff\xff\xffN"[..],
            b"[$I\x7f\xff\xff\xffT",
            b"[$I\x7f\xff\xff\xffF",
        ] {
            assert!(matches!(
                decode_slice(bytes),
                Err(Error::InvalidSize(0x7fff_ffff))
            ));
        }
        assert!(matches!(
            decode_slice(b"[#I\x7f\xff\xff\xff"),
            Err(Error::InvalidSize(0x7fff_ffff))
        ));
        assert!(matches!(
            decode_slice(b"{$I\x00\x20\x00\x00T"),
            Err(Error::InvalidSize(0x0020_0000))
        ));

        let config = CodecConfig::new().with_max_elements(2);
        assert!(matches!(
            decode_with_config(&b"[$B\x03T"[..], config),
            Err(Error::InvalidSize(3))
        ));
        assert!(matches!(
            decode_with_config(&b"{#B\x03"[..], config),
            Err(Error::InvalidSize(3))
        ));
        let value = decode_with_config(&b"[$B\x02T"[..], config).unwrap();
        assert_eq!(value.get(), Some(&Node::BoolArray(vec![true, true])));

        // string lengths are not element counts
        let value = decode_with_config(&b"UB\x03abc"[..], config).unwrap();
        assert_eq!(value.get_string().as_deref(), Some("abc"));
    }

    #[test]
    fn test_encoded_tree_round_trips() {
        let mut root = DataMap::new();
        root.set("int", 7i32).unwrap();
        root.set("text", "héllo").unwrap();
        root.set("c", '\u{e9}').unwrap();
        root.set("longs", vec![1i64, -2, 3]).unwrap();
        root.set("empty", DataMap::new()).unwrap();
        root.set_at("nested.deep.value", 2.5f64).unwrap();
        root.create_list("mixed").unwrap().add(1i8).add("two").add(Node::Null);

        let value = DataValue::of(root);
        let bytes = encode::to_bytes(&value).unwrap();
        assert_eq!(decode_slice(&bytes).unwrap(), value);
    }
}
