//! JSON family (human-readable).

use super::TypeFamily;
use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// JSON family - UTF-8 text via `serde_json`.
///
/// Non-finite floats have no JSON form; they encode as `null` and fail to
/// decode back into `f64`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonFamily;

impl TypeFamily for JsonFamily {
    fn family_id(&self) -> &'static str {
        "json"
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(value)?)
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
