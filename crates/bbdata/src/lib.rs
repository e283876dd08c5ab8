//! Schema-less typed data trees.
//!
//! A tree is built from [`DataMap`]s (ordered string keys) and [`DataList`]s
//! (dense indices) holding [`Node`] values. Values are read back through
//! lenient coercion, so a stored `"12"` answers `get_int` with `12`, and trees
//! travel as a compact UBJSON-style binary format.
//!
//! ```
//! use bbdata::{DataMap, DataView, decode, encode};
//!
//! let mut map = DataMap::new();
//! map.set("toasters", 22222i16)?;
//! map.set_at("color.red", 0x35i16)?;
//!
//! let bytes = encode::to_bytes(&map.into())?;
//! let back = decode::decode_slice(&bytes)?;
//! let map = back.get_map().unwrap();
//! assert_eq!(map.get_long("toasters"), Some(22222));
//! assert_eq!(map.get_string_at("color.red").as_deref(), Some("53"));
//! # Ok::<(), bbdata::Error>(())
//! ```

pub mod coerce;
pub mod config;
pub mod decode;
pub mod encode;
pub mod error;
pub mod ident;
pub mod json;
pub mod list;
pub mod map;
pub mod node;
pub mod path;
pub mod ser;
pub mod tag;
pub mod value;
pub mod view;

pub use coerce::{Coerce, TargetKind};
pub use config::CodecConfig;
pub use decode::Decoder;
pub use encode::Encoder;
pub use error::{Error, Result};
pub use list::{DataList, INVALID_INDEX};
pub use map::DataMap;
pub use node::{Node, NodeKind};
pub use path::{Holder, HolderMut, Path};
pub use ser::to_node;
pub use tag::{Mode, Tag};
pub use value::{DataValue, Serializable};
pub use view::DataView;
