//! Bincode family (compact binary).
//!
//! This is the default family for intermediate outputs: fixed-width
//! little-endian integers and length-prefixed strings, no field names.

use super::TypeFamily;
use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Bincode family - compact, schema-less binary.
///
/// # Example
///
/// ```
/// use strand_core::family::{BincodeFamily, TypeFamily};
///
/// let longs = BincodeFamily.longs();
/// let bytes = longs.encode(&42).unwrap();
/// assert_eq!(bytes.len(), 8);
/// assert_eq!(longs.decode(&bytes).unwrap(), 42);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BincodeFamily;

impl TypeFamily for BincodeFamily {
    fn family_id(&self) -> &'static str {
        "bincode"
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        Ok(::bincode::serialize(value)?)
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        Ok(::bincode::deserialize(bytes)?)
    }
}
