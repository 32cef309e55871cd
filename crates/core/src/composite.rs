//! Composite descriptors built from component descriptors
//!
//! Composites never re-derive their components: the sub-type list of a
//! composite holds the exact descriptor handles it was built from. Encoding,
//! decoding and detach all recurse into those components.

use crate::descriptor::{AnyType, DecodeFn, DetachFn, EncodeFn, TypeDescriptor};
use crate::error::{Error, Result};
use crate::framing;
use crate::pair::Pair;
use std::sync::Arc;

fn check_same_family(context: &str, types: &[&AnyType]) -> Result<&'static str> {
    let family = match types.first() {
        Some(first) => first.family(),
        None => return Err(Error::invalid_type(format!("{} needs at least one component", context))),
    };
    if let Some(other) = types.iter().find(|t| t.family() != family) {
        return Err(Error::invalid_type(format!(
            "{} mixes families {} and {} ({})",
            context,
            family,
            other.family(),
            other.name()
        )));
    }
    Ok(family)
}

/// Descriptor for `Pair<K, V>` with sub-types `[key, value]`
///
/// # Errors
///
/// Returns `InvalidType` if `key` and `value` belong to different families.
pub fn pair_of<K, V>(key: &TypeDescriptor<K>, value: &TypeDescriptor<V>) -> Result<TypeDescriptor<Pair<K, V>>>
where
    K: 'static,
    V: 'static,
{
    let family = check_same_family("pair", &[&key.erase(), &value.erase()])?;
    let name = format!("Pair<{}, {}>", key.name(), value.name());

    let (kt, vt) = (key.clone(), value.clone());
    let encode: EncodeFn<Pair<K, V>> = Arc::new(move |pair: &Pair<K, V>| {
        framing::encode_pair(&kt.encode(pair.first())?, &vt.encode(pair.second())?)
    });

    let (kt, vt) = (key.clone(), value.clone());
    let decode: DecodeFn<Pair<K, V>> = Arc::new(move |bytes: &[u8]| {
        let (k, v) = framing::decode_pair(bytes)?;
        Ok(Pair::of(kt.decode(k)?, vt.decode(v)?))
    });

    let (kt, vt) = (key.clone(), value.clone());
    let detach: DetachFn<Pair<K, V>> = Arc::new(move |pair: &Pair<K, V>| {
        Ok(Pair::of(kt.detach(pair.first())?, vt.detach(pair.second())?))
    });

    Ok(TypeDescriptor::from_parts(
        name,
        family,
        vec![key.erase(), value.erase()],
        encode,
        decode,
        detach,
    ))
}

/// Descriptor for `Vec<T>` with sub-types `[element]`
pub fn collection_of<T: 'static>(element: &TypeDescriptor<T>) -> TypeDescriptor<Vec<T>> {
    let name = format!("Vec<{}>", element.name());

    let et = element.clone();
    let encode: EncodeFn<Vec<T>> = Arc::new(move |items: &Vec<T>| {
        framing::encode_seq(items.iter().map(|item| et.encode(item)), items.len())
    });

    let et = element.clone();
    let decode: DecodeFn<Vec<T>> = Arc::new(move |bytes: &[u8]| {
        framing::decode_seq(bytes)?
            .into_iter()
            .map(|item| et.decode(item))
            .collect()
    });

    let et = element.clone();
    let detach: DetachFn<Vec<T>> =
        Arc::new(move |items: &Vec<T>| items.iter().map(|item| et.detach(item)).collect());

    TypeDescriptor::from_parts(
        name,
        element.family(),
        vec![element.erase()],
        encode,
        decode,
        detach,
    )
}

/// Descriptor for `T` stored as the base type `S`
///
/// `to_base` and `from_base` convert between the two representations. The
/// derived type exposes the base type's sub-types.
pub fn derived<T, S, F, G>(
    name: impl Into<String>,
    base: &TypeDescriptor<S>,
    from_base: F,
    to_base: G,
) -> TypeDescriptor<T>
where
    T: 'static,
    S: 'static,
    F: Fn(S) -> Result<T> + Send + Sync + 'static,
    G: Fn(&T) -> Result<S> + Send + Sync + 'static,
{
    let from_base = Arc::new(from_base);
    let to_base = Arc::new(to_base);

    let (bt, to) = (base.clone(), to_base.clone());
    let encode: EncodeFn<T> = Arc::new(move |value: &T| bt.encode(&to(value)?));

    let (bt, from) = (base.clone(), from_base.clone());
    let decode: DecodeFn<T> = Arc::new(move |bytes: &[u8]| from(bt.decode(bytes)?));

    let bt = base.clone();
    let detach: DetachFn<T> =
        Arc::new(move |value: &T| from_base(bt.detach(&to_base(value)?)?));

    TypeDescriptor::from_parts(
        name.into(),
        base.family(),
        base.sub_types().to_vec(),
        encode,
        decode,
        detach,
    )
}
