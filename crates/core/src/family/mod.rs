//! Type families
//!
//! A type family is a stateless factory bound to one serialization scheme.
//! Every descriptor it hands out encodes values with that scheme and carries
//! the family identifier, so composites can refuse to mix schemes.
//!
//! # Known Families
//!
//! - `"bincode"`: [`BincodeFamily`], compact binary
//! - `"json"`: [`JsonFamily`], human-readable
//! - `"msgpack"`: [`MsgPackFamily`], self-describing binary
//!
//! # Usage
//!
//! ```
//! use strand_core::family::{BincodeFamily, TypeFamily};
//!
//! let family = BincodeFamily;
//! let table = family.table_of(&family.ints(), &family.strings()).unwrap();
//!
//! assert!(table.sub_types()[0].same_as(&table.key_type().erase()));
//! assert_eq!(table.sub_types().len(), 2);
//! ```

mod bincode;
mod json;
mod msgpack;

pub use self::bincode::BincodeFamily;
pub use self::json::JsonFamily;
pub use self::msgpack::MsgPackFamily;

use crate::composite;
use crate::descriptor::{round_trip_detach, DecodeFn, DetachFn, EncodeFn, TypeDescriptor};
use crate::error::{Error, Result};
use crate::pair::Pair;
use crate::table_type::{GroupedTableType, TableType};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Factory for descriptors sharing one serialization scheme.
///
/// Implementations are unit structs; cloning one is free.
pub trait TypeFamily: Clone + Send + Sync + fmt::Debug + 'static {
    /// Unique family identifier, stored alongside encoded data
    fn family_id(&self) -> &'static str;

    /// Encode a serde value in this family's format
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>>;

    /// Decode a serde value from this family's format
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T>;

    /// Descriptor for an immutable serde type; detaches by cloning
    fn primitive<T>(&self, name: &str) -> TypeDescriptor<T>
    where
        T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        let detach: DetachFn<T> = Arc::new(|value: &T| Ok(value.clone()));
        serde_descriptor(self.clone(), name, detach)
    }

    /// Descriptor for any serde type; detaches by encoding and decoding again
    fn records<T>(&self) -> TypeDescriptor<T>
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        let encode = encode_fn::<Self, T>(self.clone());
        let decode = decode_fn::<Self, T>(self.clone());
        TypeDescriptor::from_parts(
            std::any::type_name::<T>().to_string(),
            self.family_id(),
            Vec::new(),
            encode.clone(),
            decode.clone(),
            round_trip_detach(encode, decode),
        )
    }

    /// `bool`
    fn booleans(&self) -> TypeDescriptor<bool> {
        self.primitive("bool")
    }

    /// `i32`
    fn ints(&self) -> TypeDescriptor<i32> {
        self.primitive("i32")
    }

    /// `i64`
    fn longs(&self) -> TypeDescriptor<i64> {
        self.primitive("i64")
    }

    /// `f32`
    fn floats(&self) -> TypeDescriptor<f32> {
        self.primitive("f32")
    }

    /// `f64`
    fn doubles(&self) -> TypeDescriptor<f64> {
        self.primitive("f64")
    }

    /// `String`
    fn strings(&self) -> TypeDescriptor<String> {
        self.primitive("String")
    }

    /// `Vec<u8>`
    fn bytes(&self) -> TypeDescriptor<Vec<u8>> {
        self.primitive("Vec<u8>")
    }

    /// `Pair<K, V>` with sub-types `[key, value]`
    ///
    /// # Errors
    ///
    /// Returns `InvalidType` if either component belongs to another family.
    fn pairs<K, V>(&self, key: &TypeDescriptor<K>, value: &TypeDescriptor<V>) -> Result<TypeDescriptor<Pair<K, V>>>
    where
        K: 'static,
        V: 'static,
    {
        self.check_member(key.family(), key.name())?;
        self.check_member(value.family(), value.name())?;
        composite::pair_of(key, value)
    }

    /// `Vec<T>` with sub-types `[element]`
    fn collections<T: 'static>(&self, element: &TypeDescriptor<T>) -> Result<TypeDescriptor<Vec<T>>> {
        self.check_member(element.family(), element.name())?;
        Ok(composite::collection_of(element))
    }

    /// `T` stored as `S`; see [`composite::derived`]
    fn derived<T, S, F, G>(
        &self,
        name: &str,
        base: &TypeDescriptor<S>,
        from_base: F,
        to_base: G,
    ) -> Result<TypeDescriptor<T>>
    where
        T: 'static,
        S: 'static,
        F: Fn(S) -> Result<T> + Send + Sync + 'static,
        G: Fn(&T) -> Result<S> + Send + Sync + 'static,
    {
        self.check_member(base.family(), base.name())?;
        Ok(composite::derived(name, base, from_base, to_base))
    }

    /// Table row type with sub-types exactly `[key, value]`
    ///
    /// # Errors
    ///
    /// Returns `InvalidType` if either component belongs to another family.
    fn table_of<K, V>(&self, key: &TypeDescriptor<K>, value: &TypeDescriptor<V>) -> Result<TableType<K, V>>
    where
        K: 'static,
        V: 'static,
    {
        self.check_member(key.family(), key.name())?;
        self.check_member(value.family(), value.name())?;
        TableType::compose(key, value)
    }

    /// Grouped row type for `table`
    fn grouped_table_of<K, V>(&self, table: &TableType<K, V>) -> Result<GroupedTableType<K, V>>
    where
        K: 'static,
        V: 'static,
    {
        self.check_member(table.family(), table.name())?;
        GroupedTableType::new(table)
    }

    /// Fails with `InvalidType` unless `family` is this family
    fn check_member(&self, family: &str, type_name: &str) -> Result<()> {
        if family == self.family_id() {
            Ok(())
        } else {
            Err(Error::invalid_type(format!(
                "{} belongs to family {}, not {}",
                type_name,
                family,
                self.family_id()
            )))
        }
    }
}

fn encode_fn<F, T>(family: F) -> EncodeFn<T>
where
    F: TypeFamily,
    T: Serialize + 'static,
{
    Arc::new(move |value: &T| family.encode(value))
}

fn decode_fn<F, T>(family: F) -> DecodeFn<T>
where
    F: TypeFamily,
    T: DeserializeOwned + 'static,
{
    Arc::new(move |bytes: &[u8]| family.decode(bytes))
}

fn serde_descriptor<F, T>(family: F, name: &str, detach: DetachFn<T>) -> TypeDescriptor<T>
where
    F: TypeFamily,
    T: Serialize + DeserializeOwned + 'static,
{
    TypeDescriptor::from_parts(
        name.to_string(),
        family.family_id(),
        Vec::new(),
        encode_fn::<F, T>(family.clone()),
        decode_fn::<F, T>(family),
        detach,
    )
}
