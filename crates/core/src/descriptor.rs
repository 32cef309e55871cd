//! Runtime type witnesses
//!
//! A [`TypeDescriptor<T>`] travels alongside every generic element type `T`.
//! It carries what a distributed runtime needs to know about `T` without
//! reflection:
//!
//! - a display name and the serialization family that encodes it
//! - the ordered list of structural sub-types (empty for primitives)
//! - encode/decode functions for the family's byte format
//! - a detach function returning an independently owned copy of a value
//!
//! Sub-types are stored type-erased as [`AnyType`] so that a descriptor for
//! `Pair<K, V>` can hand back typed descriptors for `K` and `V` through
//! [`AnyType::downcast`].
//!
//! Descriptors are immutable and cheap to clone (one `Arc`). Two clones of the
//! same descriptor are the *same* witness ([`TypeDescriptor::same_as`]); two
//! independently built descriptors with equal name, family and sub-types are
//! merely *equal* (`==`).

use crate::error::{Error, Result};
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Encodes a value into the family's byte format
pub type EncodeFn<T> = Arc<dyn Fn(&T) -> Result<Vec<u8>> + Send + Sync>;

/// Decodes a value from the family's byte format
pub type DecodeFn<T> = Arc<dyn Fn(&[u8]) -> Result<T> + Send + Sync>;

/// Produces an independently owned copy of a value
pub type DetachFn<T> = Arc<dyn Fn(&T) -> Result<T> + Send + Sync>;

struct DescriptorInner<T> {
    name: String,
    family: &'static str,
    sub_types: Vec<AnyType>,
    encode: EncodeFn<T>,
    decode: DecodeFn<T>,
    detach: DetachFn<T>,
}

/// Object-safe view of a descriptor used for sub-type storage
trait ErasedDescriptor: Send + Sync {
    fn name(&self) -> &str;
    fn family(&self) -> &'static str;
    fn value_type_id(&self) -> TypeId;
    fn sub_types(&self) -> &[AnyType];
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: 'static> ErasedDescriptor for DescriptorInner<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn family(&self) -> &'static str {
        self.family
    }

    fn value_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn sub_types(&self) -> &[AnyType] {
        &self.sub_types
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Serialization, decomposition and detach contract for element type `T`
///
/// ## Invariants
///
/// - `detach` never mutates its input
/// - `detach(detach(v)) == detach(v)` by value
/// - composite descriptors detach by recursing into every sub-type
pub struct TypeDescriptor<T> {
    inner: Arc<DescriptorInner<T>>,
}

impl<T> Clone for TypeDescriptor<T> {
    fn clone(&self) -> Self {
        TypeDescriptor {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: 'static> TypeDescriptor<T> {
    /// Start building a custom descriptor
    pub fn builder(name: impl Into<String>, family: &'static str) -> DescriptorBuilder<T> {
        DescriptorBuilder {
            name: name.into(),
            family,
            sub_types: Vec::new(),
            encode: None,
            decode: None,
            detach: None,
        }
    }

    pub(crate) fn from_parts(
        name: String,
        family: &'static str,
        sub_types: Vec<AnyType>,
        encode: EncodeFn<T>,
        decode: DecodeFn<T>,
        detach: DetachFn<T>,
    ) -> Self {
        TypeDescriptor {
            inner: Arc::new(DescriptorInner {
                name,
                family,
                sub_types,
                encode,
                decode,
                detach,
            }),
        }
    }

    /// Display name of the runtime representation
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Identifier of the serialization family
    pub fn family(&self) -> &'static str {
        self.inner.family
    }

    /// Ordered structural sub-types; empty for primitives
    pub fn sub_types(&self) -> &[AnyType] {
        &self.inner.sub_types
    }

    /// Returns true if this type declares structural sub-types
    pub fn is_composite(&self) -> bool {
        !self.inner.sub_types.is_empty()
    }

    /// Encode a value into the family's byte format
    pub fn encode(&self, value: &T) -> Result<Vec<u8>> {
        (self.inner.encode)(value)
    }

    /// Decode a value from the family's byte format
    pub fn decode(&self, bytes: &[u8]) -> Result<T> {
        (self.inner.decode)(bytes)
    }

    /// Return an independently owned copy of `value`
    ///
    /// Any failure is reported as [`Error::Detach`].
    pub fn detach(&self, value: &T) -> Result<T> {
        (self.inner.detach)(value).map_err(|e| match e {
            Error::Detach { .. } => e,
            other => Error::detach(self.name(), other.to_string()),
        })
    }

    /// Type-erased handle to this descriptor
    pub fn erase(&self) -> AnyType {
        AnyType {
            inner: self.inner.clone(),
        }
    }

    /// Returns true if both handles point at the same descriptor instance
    pub fn same_as(&self, other: &TypeDescriptor<T>) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: 'static> PartialEq for TypeDescriptor<T> {
    fn eq(&self, other: &Self) -> bool {
        self.erase() == other.erase()
    }
}

impl<T: 'static> fmt::Debug for TypeDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.erase(), f)
    }
}

impl<T: 'static> fmt::Display for TypeDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.family(), self.name())
    }
}

/// Type-erased descriptor handle
///
/// Structural metadata only; recover the typed descriptor with
/// [`AnyType::downcast`].
#[derive(Clone)]
pub struct AnyType {
    inner: Arc<dyn ErasedDescriptor>,
}

impl AnyType {
    /// Display name of the described type
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Identifier of the serialization family
    pub fn family(&self) -> &'static str {
        self.inner.family()
    }

    /// Ordered structural sub-types
    pub fn sub_types(&self) -> &[AnyType] {
        self.inner.sub_types()
    }

    /// Returns true if this handle describes values of type `T`
    pub fn is<T: 'static>(&self) -> bool {
        self.inner.value_type_id() == TypeId::of::<T>()
    }

    /// Recover the typed descriptor, or `None` if it describes another type
    pub fn downcast<T: 'static>(&self) -> Option<TypeDescriptor<T>> {
        Arc::clone(&self.inner)
            .into_any()
            .downcast::<DescriptorInner<T>>()
            .ok()
            .map(|inner| TypeDescriptor { inner })
    }

    /// Returns true if both handles point at the same descriptor instance
    pub fn same_as(&self, other: &AnyType) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.inner) as *const (),
            Arc::as_ptr(&other.inner) as *const (),
        )
    }
}

impl PartialEq for AnyType {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
            || (self.inner.value_type_id() == other.inner.value_type_id()
                && self.family() == other.family()
                && self.name() == other.name()
                && self.sub_types() == other.sub_types())
    }
}

impl fmt::Debug for AnyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name())
            .field("family", &self.family())
            .field("sub_types", &self.sub_types())
            .finish()
    }
}

/// Builder for custom descriptors
///
/// Encode and decode are required. Without an explicit detach function the
/// descriptor detaches by encoding and decoding the value again.
pub struct DescriptorBuilder<T> {
    name: String,
    family: &'static str,
    sub_types: Vec<AnyType>,
    encode: Option<EncodeFn<T>>,
    decode: Option<DecodeFn<T>>,
    detach: Option<DetachFn<T>>,
}

impl<T: 'static> DescriptorBuilder<T> {
    /// Append a structural sub-type
    pub fn sub_type(mut self, sub_type: AnyType) -> Self {
        self.sub_types.push(sub_type);
        self
    }

    /// Set the encode function
    pub fn encode_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&T) -> Result<Vec<u8>> + Send + Sync + 'static,
    {
        self.encode = Some(Arc::new(f));
        self
    }

    /// Set the decode function
    pub fn decode_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&[u8]) -> Result<T> + Send + Sync + 'static,
    {
        self.decode = Some(Arc::new(f));
        self
    }

    /// Set the detach function
    pub fn detach_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&T) -> Result<T> + Send + Sync + 'static,
    {
        self.detach = Some(Arc::new(f));
        self
    }

    /// Detach by cloning; suitable for types that own all of their storage
    pub fn clone_detach(self) -> Self
    where
        T: Clone,
    {
        self.detach_with(|value: &T| Ok(value.clone()))
    }

    /// Finish the descriptor
    ///
    /// # Errors
    ///
    /// Returns `InvalidType` if encode or decode was not supplied.
    pub fn build(self) -> Result<TypeDescriptor<T>> {
        let encode = self.encode.ok_or_else(|| {
            Error::invalid_type(format!("descriptor {} has no encode function", self.name))
        })?;
        let decode = self.decode.ok_or_else(|| {
            Error::invalid_type(format!("descriptor {} has no decode function", self.name))
        })?;
        let detach = match self.detach {
            Some(detach) => detach,
            None => round_trip_detach(encode.clone(), decode.clone()),
        };
        Ok(TypeDescriptor::from_parts(
            self.name,
            self.family,
            self.sub_types,
            encode,
            decode,
            detach,
        ))
    }
}

/// Detach by encoding and decoding, so the copy shares nothing with the input
pub(crate) fn round_trip_detach<T: 'static>(encode: EncodeFn<T>, decode: DecodeFn<T>) -> DetachFn<T> {
    Arc::new(move |value: &T| {
        let bytes = encode(value)?;
        decode(&bytes)
    })
}
