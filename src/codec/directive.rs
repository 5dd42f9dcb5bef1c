//! Format directives
//!
//! Parses a format string into an ordered list of directives and
//! answers size questions about it.

use crate::error::{LinkError, Result};
use super::Kind;

/// Byte order for subsequent type directives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endian {
    #[default]
    Little,
    Big,
}

impl Endian {
    /// Byte order of the target this crate was compiled for
    pub const NATIVE: Endian = if cfg!(target_endian = "little") {
        Endian::Little
    } else {
        Endian::Big
    };

    /// Whether bytes in native order must be reversed to reach this order
    #[inline]
    pub fn needs_swap(self) -> bool {
        self != Self::NATIVE
    }
}

/// A single parsed format character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// `<` or `>`: switch byte order, emits nothing
    Mode(Endian),

    /// `x`: one zero byte, no value
    Pad,

    /// One value of the given kind
    Type(Kind),
}

impl Directive {
    /// Parse one format character
    pub fn from_char(c: char) -> Result<Self> {
        match c {
            '<' => Ok(Directive::Mode(Endian::Little)),
            '>' => Ok(Directive::Mode(Endian::Big)),
            'x' => Ok(Directive::Pad),
            _ => Kind::from_directive(c)
                .map(Directive::Type)
                .ok_or(LinkError::UnsupportedType(c)),
        }
    }

    /// Bytes this directive occupies in a packed buffer
    #[inline]
    pub fn width(self) -> usize {
        match self {
            Directive::Mode(_) => 0,
            Directive::Pad => 1,
            Directive::Type(kind) => kind.width(),
        }
    }
}

/// A parsed format string
///
/// Parsing is the only fallible step that depends on the string alone, so a
/// `Format` can be built once and reused for every pack/unpack call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format {
    directives: Vec<Directive>,
    size: usize,
    type_count: usize,
}

impl Format {
    /// Parse a format string such as `"<?h?hh"`
    pub fn parse(format: &str) -> Result<Self> {
        let directives = format
            .chars()
            .map(Directive::from_char)
            .collect::<Result<Vec<_>>>()?;

        let size = directives.iter().map(|d| d.width()).sum();
        let type_count = directives
            .iter()
            .filter(|d| matches!(d, Directive::Type(_)))
            .count();

        Ok(Self {
            directives,
            size,
            type_count,
        })
    }

    /// Directives in format order
    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    /// Total packed size in bytes (type + padding widths)
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of type directives (values consumed or produced)
    pub fn type_count(&self) -> usize {
        self.type_count
    }

    /// Kinds of the type directives, in order
    pub fn kinds(&self) -> Vec<Kind> {
        self.directives
            .iter()
            .filter_map(|d| match d {
                Directive::Type(kind) => Some(*kind),
                _ => None,
            })
            .collect()
    }
}

/// Packed size of a format string
pub fn calcsize(format: &str) -> Result<usize> {
    Ok(Format::parse(format)?.size())
}
