//! Byte framing for composite values
//!
//! Composite descriptors (pairs, collections) encode each component with the
//! component's own descriptor and concatenate the results with length
//! prefixes. The framing is family-independent, so a composite of
//! family `F` is readable by anything that can decode its components.
//!
//! ```text
//! pair:        len(first) u32 LE | first | second
//! collection:  count u32 LE | (len u32 LE | item)*
//! ```

use crate::error::{Error, Result};
use byteorder::{ByteOrder, LittleEndian};

const LEN_SIZE: usize = 4;

fn len_prefix(len: usize) -> Result<[u8; LEN_SIZE]> {
    let len = u32::try_from(len)
        .map_err(|_| Error::Serialization(format!("component of {} bytes exceeds u32 framing", len)))?;
    let mut buf = [0u8; LEN_SIZE];
    LittleEndian::write_u32(&mut buf, len);
    Ok(buf)
}

fn read_len(bytes: &[u8], what: &str) -> Result<usize> {
    if bytes.len() < LEN_SIZE {
        return Err(Error::Serialization(format!(
            "truncated {}: need {} length bytes, have {}",
            what,
            LEN_SIZE,
            bytes.len()
        )));
    }
    Ok(LittleEndian::read_u32(&bytes[..LEN_SIZE]) as usize)
}

/// Frame two encoded components as one pair
pub(crate) fn encode_pair(first: &[u8], second: &[u8]) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(LEN_SIZE + first.len() + second.len());
    buf.extend_from_slice(&len_prefix(first.len())?);
    buf.extend_from_slice(first);
    buf.extend_from_slice(second);
    Ok(buf)
}

/// Split a framed pair into its two encoded components
pub(crate) fn decode_pair(bytes: &[u8]) -> Result<(&[u8], &[u8])> {
    let first_len = read_len(bytes, "pair")?;
    let rest = &bytes[LEN_SIZE..];
    if rest.len() < first_len {
        return Err(Error::Serialization(format!(
            "truncated pair: first component needs {} bytes, have {}",
            first_len,
            rest.len()
        )));
    }
    Ok(rest.split_at(first_len))
}

/// Frame a sequence of encoded items
pub(crate) fn encode_seq<I>(items: I, count: usize) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = Result<Vec<u8>>>,
{
    let mut buf = Vec::new();
    buf.extend_from_slice(&len_prefix(count)?);
    for item in items {
        let item = item?;
        buf.extend_from_slice(&len_prefix(item.len())?);
        buf.extend_from_slice(&item);
    }
    Ok(buf)
}

/// Split a framed sequence into its encoded items
pub(crate) fn decode_seq(bytes: &[u8]) -> Result<Vec<&[u8]>> {
    let count = read_len(bytes, "collection")?;
    let mut rest = &bytes[LEN_SIZE..];
    // Cap the preallocation; the count comes from untrusted bytes.
    let mut items = Vec::with_capacity(count.min(rest.len() / LEN_SIZE));
    for _ in 0..count {
        let len = read_len(rest, "collection item")?;
        rest = &rest[LEN_SIZE..];
        if rest.len() < len {
            return Err(Error::Serialization(format!(
                "truncated collection item: need {} bytes, have {}",
                len,
                rest.len()
            )));
        }
        let (item, tail) = rest.split_at(len);
        items.push(item);
        rest = tail;
    }
    if !rest.is_empty() {
        return Err(Error::Serialization(format!(
            "{} trailing bytes after collection",
            rest.len()
        )));
    }
    Ok(items)
}
