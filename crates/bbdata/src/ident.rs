//! UUIDs stored as a pair of 64-bit integers.
//!
//! A UUID is written as a two-element long array, most significant half
//! first. Anything that coerces to a long array of exactly two elements reads
//! back as a UUID.

use uuid::Uuid;

use crate::coerce::{Coerce, TargetKind};
use crate::node::Node;
use crate::value::DataValue;

/// Wrap `id` in a holder as `[most_significant, least_significant]`.
#[must_use]
pub fn from_uuid(id: Uuid) -> DataValue {
    DataValue::of(id)
}

/// Read a UUID back from a holder.
#[must_use]
pub fn to_uuid(value: &DataValue) -> Option<Uuid> {
    value.get_as::<Uuid>()
}

impl From<Uuid> for Node {
    fn from(id: Uuid) -> Self {
        let (high, low) = id.as_u64_pair();
        Node::LongArray(vec![high as i64, low as i64])
    }
}

impl Coerce for Uuid {
    const TARGET: TargetKind = TargetKind::LongArray;

    fn coerce(node: &Node) -> Option<Self> {
        match Vec::<i64>::coerce(node)?.as_slice() {
            &[high, low] => Some(Uuid::from_u64_pair(high as u64, low as u64)),
            _ => None,
        }
    }
}
