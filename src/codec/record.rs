//! Typed records
//!
//! A `Record` is a plain struct with a fixed format. It lists its fields
//! in format order and is filled back positionally on unpack.

use std::io::{Read, Write};

use bytes::Bytes;

use crate::error::{LinkError, Result};
use super::{pack, unpack, Kind, Value};

/// A fixed-layout struct that maps one-to-one onto a format string
pub trait Record: Sized {
    /// Format string describing the wire layout
    const FORMAT: &'static str;

    /// Requested kind for each type directive, in order
    const KINDS: &'static [Kind];

    /// Field values in format order
    fn to_values(&self) -> Vec<Value>;

    /// Rebuild from values in format order (already coerced to `KINDS`)
    fn from_values(values: &[Value]) -> Result<Self>;

    /// Encode this record
    fn pack(&self) -> Result<Bytes> {
        pack(Self::FORMAT, &self.to_values())
    }

    /// Decode a record from the front of `buf`
    fn unpack(buf: &[u8]) -> Result<Self> {
        let values = unpack(Self::FORMAT, buf, Self::KINDS)?;
        Self::from_values(&values)
    }

    /// Encode, write and flush
    fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        let bytes = self.pack()?;
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(())
    }

    /// Read exactly one record from a stream
    fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let values = super::unpack_from(reader, Self::FORMAT, Self::KINDS)?;
        Self::from_values(&values)
    }
}

/// Take field `index` from a decoded value list
///
/// Helper for `Record::from_values` implementations.
pub fn field<T: super::Scalar>(values: &[Value], index: usize) -> Result<T> {
    let value = values.get(index).ok_or_else(|| {
        LinkError::Protocol(format!(
            "Missing field {} (record has {} values)",
            index,
            values.len()
        ))
    })?;
    value.get()
}
