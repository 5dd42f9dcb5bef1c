//! Pack / Unpack
//!
//! Linear left-to-right scan over the directives. The only running state is
//! the byte order (and, for unpack, a read cursor). Every call allocates its
//! own output, so calls are independent and safe to repeat from any thread.

use std::io::{Read, Write};

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{LinkError, Result};
use super::{Directive, Endian, Format, Kind, Scalar, Value};

// =============================================================================
// Encoding
// =============================================================================

impl Format {
    /// Pack values according to this format
    pub fn pack(&self, values: &[Value]) -> Result<Bytes> {
        if values.len() != self.type_count() {
            return Err(LinkError::Usage {
                directives: self.type_count(),
                supplied: values.len(),
            });
        }

        let mut out = BytesMut::with_capacity(self.size());
        let mut endian = Endian::default();
        let mut next = values.iter();

        for directive in self.directives() {
            match *directive {
                Directive::Mode(mode) => endian = mode,
                Directive::Pad => out.put_u8(0),
                Directive::Type(kind) => {
                    let value = next.next().ok_or(LinkError::Usage {
                        directives: self.type_count(),
                        supplied: values.len(),
                    })?;
                    put_scalar(&mut out, value.coerce(kind)?, endian);
                }
            }
        }

        debug_assert_eq!(out.len(), self.size());
        Ok(out.freeze())
    }

    /// Unpack `buf` into one value per requested kind
    ///
    /// `kinds` must have exactly one entry per type directive. Bytes past
    /// `size()` are ignored.
    pub fn unpack(&self, buf: &[u8], kinds: &[Kind]) -> Result<Vec<Value>> {
        if kinds.len() != self.type_count() {
            return Err(LinkError::Usage {
                directives: self.type_count(),
                supplied: kinds.len(),
            });
        }
        if buf.len() < self.size() {
            return Err(LinkError::BufferTooShort {
                needed: self.size(),
                available: buf.len(),
            });
        }

        let mut values = Vec::with_capacity(kinds.len());
        let mut endian = Endian::default();
        let mut cursor = 0usize;
        let mut requested = kinds.iter();

        for directive in self.directives() {
            match *directive {
                Directive::Mode(mode) => endian = mode,
                Directive::Pad => cursor += 1,
                Directive::Type(kind) => {
                    let width = kind.width();
                    let raw = get_scalar(&buf[cursor..cursor + width], kind, endian);
                    // Lengths were checked up front, so a slot always exists.
                    let target = requested.next().copied().unwrap_or(kind);
                    values.push(raw.coerce(target)?);
                    cursor += width;
                }
            }
        }

        Ok(values)
    }
}

/// Append one scalar in the requested byte order
fn put_scalar(out: &mut BytesMut, value: Value, endian: Endian) {
    let width = value.kind().width();
    let mut bytes = value.to_ne_bytes();
    let bytes = &mut bytes[..width];
    if endian.needs_swap() {
        bytes.reverse();
    }
    out.put_slice(bytes);
}

/// Read one scalar of `kind` from exactly `kind.width()` bytes
fn get_scalar(src: &[u8], kind: Kind, endian: Endian) -> Value {
    let mut scratch = [0u8; 8];
    let bytes = &mut scratch[..src.len()];
    bytes.copy_from_slice(src);
    if endian.needs_swap() {
        bytes.reverse();
    }
    Value::from_ne_bytes(kind, bytes)
}

// =============================================================================
// String-format entry points
// =============================================================================

/// Pack `values` according to `format`
///
/// ```
/// use scorelink::codec::{pack, Value};
///
/// let bytes = pack(">I", &[Value::U32(1)]).unwrap();
/// assert_eq!(&bytes[..], &[0, 0, 0, 1]);
/// ```
pub fn pack(format: &str, values: &[Value]) -> Result<Bytes> {
    Format::parse(format)?.pack(values)
}

/// Unpack `buf` according to `format`, coercing each slot to the kind the
/// caller asked for
pub fn unpack(format: &str, buf: &[u8], kinds: &[Kind]) -> Result<Vec<Value>> {
    Format::parse(format)?.unpack(buf, kinds)
}

/// Unpack a single-value format
pub fn unpack_one(format: &str, buf: &[u8], kind: Kind) -> Result<Value> {
    let mut values = unpack(format, buf, &[kind])?;
    // unpack returned exactly one value for one requested slot
    values
        .pop()
        .ok_or_else(|| LinkError::Protocol("unpack produced no value".to_string()))
}

/// Unpack a single-value format straight into a Rust scalar
pub fn unpack_scalar<T: Scalar>(format: &str, buf: &[u8]) -> Result<T> {
    unpack_one(format, buf, T::KIND)?.get()
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Pack and write to a stream
pub fn pack_into<W: Write>(writer: &mut W, format: &str, values: &[Value]) -> Result<()> {
    let bytes = pack(format, values)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Read exactly one format's worth of bytes from a stream and unpack it
///
/// Blocks until the full record is available or an error occurs
pub fn unpack_from<R: Read>(reader: &mut R, format: &str, kinds: &[Kind]) -> Result<Vec<Value>> {
    let format = Format::parse(format)?;

    // Validate slot count before touching the stream
    if kinds.len() != format.type_count() {
        return Err(LinkError::Usage {
            directives: format.type_count(),
            supplied: kinds.len(),
        });
    }

    let mut buf = vec![0u8; format.size()];
    reader.read_exact(&mut buf)?;
    format.unpack(&buf, kinds)
}
