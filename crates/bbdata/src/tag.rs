//! Type tags and size encoding for the binary format.
//!
//! Every value on the wire starts with a 1-byte ASCII type tag, unless it sits
//! inside a `$` container whose shared tag was written once up front.
//! Integers and floats are big-endian; the lowercase/punctuation variants are
//! little-endian and only ever decoded.

use crate::error::{Error, Result};
use crate::node::Node;

/// One-byte type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Tag {
    Null = b'N',
    True = b'T',
    False = b'F',
    Char = b'u',
    String = b'U',
    Byte = b'B',
    Short = b'S',
    Int = b'I',
    Long = b'L',
    Float = b',',
    Double = b';',
    ShortLe = b's',
    IntLe = b'i',
    LongLe = b'l',
    FloatLe = b'.',
    DoubleLe = b':',
    /// Arbitrary precision number carried as its decimal text.
    Huge = b'H',
    MapStart = b'{',
    MapEnd = b'}',
    ArrayStart = b'[',
    ArrayEnd = b']',
    /// Padding, skipped wherever a tag is expected in an `N`-mode body.
    Nop = b' ',
}

impl Tag {
    /// Parse a tag byte.
    #[must_use]
    pub fn from_byte(b: u8) -> Option<Self> {
        let tag = match b {
            b'N' => Tag::Null,
            b'T' => Tag::True,
            b'F' => Tag::False,
            b'u' => Tag::Char,
            b'U' => Tag::String,
            b'B' => Tag::Byte,
            b'S' => Tag::Short,
            b'I' => Tag::Int,
            b'L' => Tag::Long,
            b',' => Tag::Float,
            b';' => Tag::Double,
            b's' => Tag::ShortLe,
            b'i' => Tag::IntLe,
            b'l' => Tag::LongLe,
            b'.' => Tag::FloatLe,
            b':' => Tag::DoubleLe,
            b'H' => Tag::Huge,
            b'{' => Tag::MapStart,
            b'}' => Tag::MapEnd,
            b'[' => Tag::ArrayStart,
            b']' => Tag::ArrayEnd,
            b' ' => Tag::Nop,
            _ => return None,
        };
        Some(tag)
    }

    /// Get the raw tag byte.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u8 {
        self as u8
    }

    /// Get the tag name as a string (for logging).
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Tag::Null => "null",
            Tag::True => "true",
            Tag::False => "false",
            Tag::Char => "char",
            Tag::String => "string",
            Tag::Byte => "byte",
            Tag::Short => "short",
            Tag::Int => "int",
            Tag::Long => "long",
            Tag::Float => "float",
            Tag::Double => "double",
            Tag::ShortLe => "short-le",
            Tag::IntLe => "int-le",
            Tag::LongLe => "long-le",
            Tag::FloatLe => "float-le",
            Tag::DoubleLe => "double-le",
            Tag::Huge => "huge",
            Tag::MapStart => "map-start",
            Tag::MapEnd => "map-end",
            Tag::ArrayStart => "array-start",
            Tag::ArrayEnd => "array-end",
            Tag::Nop => "nop",
        }
    }

    /// Check if this tag may prefix a size.
    #[inline]
    #[must_use]
    pub fn is_size(self) -> bool {
        matches!(
            self,
            Tag::Byte | Tag::Short | Tag::Int | Tag::Long | Tag::ShortLe | Tag::IntLe | Tag::LongLe
        )
    }

    /// The tag the encoder writes for `node`. Booleans get `T` or `F` by
    /// value; every array kind and list shares `[`.
    #[must_use]
    pub fn of(node: &Node) -> Self {
        match node {
            Node::Null => Tag::Null,
            Node::Bool(true) => Tag::True,
            Node::Bool(false) => Tag::False,
            Node::Byte(_) => Tag::Byte,
            Node::Short(_) => Tag::Short,
            Node::Int(_) => Tag::Int,
            Node::Long(_) => Tag::Long,
            Node::Float(_) => Tag::Float,
            Node::Double(_) => Tag::Double,
            Node::Char(_) => Tag::Char,
            Node::String(_) => Tag::String,
            Node::Map(_) => Tag::MapStart,
            Node::BoolArray(_)
            | Node::ByteArray(_)
            | Node::ShortArray(_)
            | Node::IntArray(_)
            | Node::LongArray(_)
            | Node::FloatArray(_)
            | Node::DoubleArray(_)
            | Node::List(_) => Tag::ArrayStart,
        }
    }
}

/// Container body layout, the byte after `{` or `[`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Mode {
    /// Typed entries until the closing tag.
    Terminated = b'N',
    /// Size, then that many typed entries.
    Counted = b'#',
    /// Size, one shared tag, then that many untyped entries.
    Typed = b'$',
}

impl Mode {
    /// Parse a mode byte.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidContainerMode`] for any other byte.
    pub fn from_byte(b: u8) -> Result<Self> {
        match b {
            b'N' => Ok(Mode::Terminated),
            b'#' => Ok(Mode::Counted),
            b'$' => Ok(Mode::Typed),
            other => Err(Error::InvalidContainerMode(other)),
        }
    }

    #[inline]
    #[must_use]
    pub const fn raw(self) -> u8 {
        self as u8
    }
}

/// Pick the narrowest size tag for `size`: `B` below `0x8F`, `S` below
/// `0x8FFF`, `I` otherwise.
///
/// # Errors
///
/// Returns [`Error::SizeOverflow`] if `size` does not fit in a signed 32-bit
/// integer.
pub fn size_tag(size: usize) -> Result<Tag> {
    if size < 0x8F {
        Ok(Tag::Byte)
    } else if size < 0x8FFF {
        Ok(Tag::Short)
    } else if i32::try_from(size).is_ok() {
        Ok(Tag::Int)
    } else {
        Err(Error::SizeOverflow(size))
    }
}

/// Encode a size as tag plus big-endian value.
///
/// # Errors
///
/// See [`size_tag`].
pub fn encode_size(size: usize) -> Result<Vec<u8>> {
    let tag = size_tag(size)?;
    let mut out = Vec::with_capacity(5);
    out.push(tag.raw());
    match tag {
        Tag::Byte => out.push(size as u8),
        Tag::Short => out.extend_from_slice(&(size as u16).to_be_bytes()),
        _ => out.extend_from_slice(&(size as u32).to_be_bytes()),
    }
    Ok(out)
}
