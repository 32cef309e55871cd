//! MessagePack family (self-describing binary).

use super::TypeFamily;
use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// MessagePack family via `rmp-serde`.
///
/// Structs are written as maps keyed by field name, so readers tolerate
/// reordered fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MsgPackFamily;

impl TypeFamily for MsgPackFamily {
    fn family_id(&self) -> &'static str {
        "msgpack"
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        Ok(rmp_serde::to_vec_named(value)?)
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        Ok(rmp_serde::from_slice(bytes)?)
    }
}
