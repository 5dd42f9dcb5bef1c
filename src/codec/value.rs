//! Scalar kinds and values
//!
//! The closed set of nine fixed-width kinds the codec understands, the
//! tagged value type that carries them, and checked coercion between them.

use std::fmt;
use std::str::FromStr;

use crate::error::{LinkError, Result};

/// Kind of a fixed-width scalar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Bool,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
}

impl Kind {
    /// All supported kinds, in directive-table order
    pub const ALL: [Kind; 9] = [
        Kind::I32,
        Kind::U32,
        Kind::I64,
        Kind::U64,
        Kind::I16,
        Kind::U16,
        Kind::I8,
        Kind::U8,
        Kind::Bool,
    ];

    /// Encoded width in bytes
    #[inline]
    pub const fn width(self) -> usize {
        match self {
            Kind::Bool | Kind::I8 | Kind::U8 => 1,
            Kind::I16 | Kind::U16 => 2,
            Kind::I32 | Kind::U32 => 4,
            Kind::I64 | Kind::U64 => 8,
        }
    }

    /// Format character for this kind
    pub const fn directive(self) -> char {
        match self {
            Kind::Bool => '?',
            Kind::I8 => 'b',
            Kind::U8 => 'B',
            Kind::I16 => 'h',
            Kind::U16 => 'H',
            Kind::I32 => 'i',
            Kind::U32 => 'I',
            Kind::I64 => 'q',
            Kind::U64 => 'Q',
        }
    }

    /// Kind for a format character, if it is a type directive
    pub fn from_directive(c: char) -> Option<Kind> {
        Self::ALL.into_iter().find(|k| k.directive() == c)
    }

    /// Smallest and largest integer representable by this kind
    fn range(self) -> (i128, i128) {
        match self {
            Kind::Bool => (0, 1),
            Kind::I8 => (i8::MIN as i128, i8::MAX as i128),
            Kind::U8 => (0, u8::MAX as i128),
            Kind::I16 => (i16::MIN as i128, i16::MAX as i128),
            Kind::U16 => (0, u16::MAX as i128),
            Kind::I32 => (i32::MIN as i128, i32::MAX as i128),
            Kind::U32 => (0, u32::MAX as i128),
            Kind::I64 => (i64::MIN as i128, i64::MAX as i128),
            Kind::U64 => (0, u64::MAX as i128),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Bool => "bool",
            Kind::I8 => "i8",
            Kind::U8 => "u8",
            Kind::I16 => "i16",
            Kind::U16 => "u16",
            Kind::I32 => "i32",
            Kind::U32 => "u32",
            Kind::I64 => "i64",
            Kind::U64 => "u64",
        };
        f.write_str(name)
    }
}

/// Accepts either a Rust type name (`i16`, `bool`) or a single directive
/// character (`h`, `?`).
impl FromStr for Kind {
    type Err = LinkError;

    fn from_str(s: &str) -> Result<Self> {
        if let Some(kind) = Self::ALL.into_iter().find(|k| k.to_string() == s) {
            return Ok(kind);
        }

        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Kind::from_directive(c).ok_or(LinkError::UnsupportedType(c)),
            _ => Err(LinkError::Protocol(format!("Unknown scalar kind: {:?}", s))),
        }
    }
}

/// A single fixed-width scalar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
}

impl Value {
    /// Kind of this value
    pub fn kind(&self) -> Kind {
        match self {
            Value::Bool(_) => Kind::Bool,
            Value::I8(_) => Kind::I8,
            Value::U8(_) => Kind::U8,
            Value::I16(_) => Kind::I16,
            Value::U16(_) => Kind::U16,
            Value::I32(_) => Kind::I32,
            Value::U32(_) => Kind::U32,
            Value::I64(_) => Kind::I64,
            Value::U64(_) => Kind::U64,
        }
    }

    /// Widen to i128 (lossless for every kind; bool is 0 or 1)
    pub fn as_i128(self) -> i128 {
        match self {
            Value::Bool(v) => v as i128,
            Value::I8(v) => v as i128,
            Value::U8(v) => v as i128,
            Value::I16(v) => v as i128,
            Value::U16(v) => v as i128,
            Value::I32(v) => v as i128,
            Value::U32(v) => v as i128,
            Value::I64(v) => v as i128,
            Value::U64(v) => v as i128,
        }
    }

    /// Convert to another kind
    ///
    /// Any value converts to `Bool` as "non-zero". Integer targets are
    /// range-checked; `true`/`false` become 1/0.
    pub fn coerce(self, kind: Kind) -> Result<Value> {
        if self.kind() == kind {
            return Ok(self);
        }

        let wide = self.as_i128();
        if kind == Kind::Bool {
            return Ok(Value::Bool(wide != 0));
        }

        let (min, max) = kind.range();
        if wide < min || wide > max {
            return Err(LinkError::ValueOutOfRange { value: wide, kind });
        }

        // Range checked above, so the narrowing casts are exact.
        Ok(match kind {
            Kind::Bool => Value::Bool(wide != 0),
            Kind::I8 => Value::I8(wide as i8),
            Kind::U8 => Value::U8(wide as u8),
            Kind::I16 => Value::I16(wide as i16),
            Kind::U16 => Value::U16(wide as u16),
            Kind::I32 => Value::I32(wide as i32),
            Kind::U32 => Value::U32(wide as u32),
            Kind::I64 => Value::I64(wide as i64),
            Kind::U64 => Value::U64(wide as u64),
        })
    }

    /// Native-order bytes, left-aligned in an 8-byte scratch array.
    /// Only the first `kind().width()` bytes are meaningful.
    pub(crate) fn to_ne_bytes(self) -> [u8; 8] {
        let mut out = [0u8; 8];
        match self {
            Value::Bool(v) => out[0] = v as u8,
            Value::I8(v) => out[..1].copy_from_slice(&v.to_ne_bytes()),
            Value::U8(v) => out[0] = v,
            Value::I16(v) => out[..2].copy_from_slice(&v.to_ne_bytes()),
            Value::U16(v) => out[..2].copy_from_slice(&v.to_ne_bytes()),
            Value::I32(v) => out[..4].copy_from_slice(&v.to_ne_bytes()),
            Value::U32(v) => out[..4].copy_from_slice(&v.to_ne_bytes()),
            Value::I64(v) => out[..8].copy_from_slice(&v.to_ne_bytes()),
            Value::U64(v) => out[..8].copy_from_slice(&v.to_ne_bytes()),
        }
        out
    }

    /// Interpret exactly `kind.width()` native-order bytes as `kind`.
    ///
    /// A bool is true for any non-zero byte.
    pub(crate) fn from_ne_bytes(kind: Kind, bytes: &[u8]) -> Value {
        debug_assert_eq!(bytes.len(), kind.width());
        match kind {
            Kind::Bool => Value::Bool(bytes[0] > 0),
            Kind::I8 => Value::I8(i8::from_ne_bytes(array(bytes))),
            Kind::U8 => Value::U8(bytes[0]),
            Kind::I16 => Value::I16(i16::from_ne_bytes(array(bytes))),
            Kind::U16 => Value::U16(u16::from_ne_bytes(array(bytes))),
            Kind::I32 => Value::I32(i32::from_ne_bytes(array(bytes))),
            Kind::U32 => Value::U32(u32::from_ne_bytes(array(bytes))),
            Kind::I64 => Value::I64(i64::from_ne_bytes(array(bytes))),
            Kind::U64 => Value::U64(u64::from_ne_bytes(array(bytes))),
        }
    }

    /// Extract a concrete Rust scalar, coercing if needed
    pub fn get<T: Scalar>(self) -> Result<T> {
        T::from_value(self)
    }
}

fn array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(bytes);
    out
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", v),
            other => write!(f, "{}", other.as_i128()),
        }
    }
}

/// Parses `true`/`false` or a decimal integer. Integers come back as `I64`
/// (or `U64` when they only fit unsigned); pack coerces them to the
/// directive's kind.
impl FromStr for Value {
    type Err = LinkError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "true" => return Ok(Value::Bool(true)),
            "false" => return Ok(Value::Bool(false)),
            _ => {}
        }
        if let Ok(v) = s.parse::<i64>() {
            return Ok(Value::I64(v));
        }
        s.parse::<u64>()
            .map(Value::U64)
            .map_err(|_| LinkError::Protocol(format!("Invalid scalar literal: {:?}", s)))
    }
}

// =============================================================================
// Rust scalar bridge
// =============================================================================

/// A Rust primitive the codec can carry
pub trait Scalar: Copy + Sized {
    /// Kind this type maps to
    const KIND: Kind;

    /// Wrap as a tagged value
    fn into_value(self) -> Value;

    /// Unwrap a tagged value, coercing from any kind
    fn from_value(value: Value) -> Result<Self>;
}

macro_rules! impl_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Scalar for $ty {
                const KIND: Kind = Kind::$variant;

                #[inline]
                fn into_value(self) -> Value {
                    Value::$variant(self)
                }

                fn from_value(value: Value) -> Result<Self> {
                    match value.coerce(Kind::$variant)? {
                        Value::$variant(v) => Ok(v),
                        other => unreachable!("coerce to {} returned {:?}", Kind::$variant, other),
                    }
                }
            }

            impl From<$ty> for Value {
                #[inline]
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_scalar! {
    bool => Bool,
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
}
