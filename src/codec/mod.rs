//! Codec Module
//!
//! Format-string driven binary struct packing for fixed-width scalars.
//!
//! ## Format Directives
//! ```text
//! ┌───────────┬─────────────────────┬───────┐
//! │ Directive │ Type                │ Width │
//! ├───────────┼─────────────────────┼───────┤
//! │ i / I     │ i32 / u32           │ 4     │
//! │ q / Q     │ i64 / u64           │ 8     │
//! │ h / H     │ i16 / u16           │ 2     │
//! │ b / B     │ i8 / u8             │ 1     │
//! │ ?         │ bool (0x00 / 0x01)  │ 1     │
//! │ x         │ zero pad, no value  │ 1     │
//! │ < / >     │ little / big endian │ 0     │
//! └───────────┴─────────────────────┴───────┘
//! ```
//!
//! Byte order defaults to little-endian and a mode directive applies to
//! everything after it. The number of type directives must match the number
//! of values (pack) or requested kinds (unpack) exactly.

mod directive;
mod value;
mod pack;
mod record;

pub use directive::{calcsize, Directive, Endian, Format};
pub use value::{Kind, Scalar, Value};
pub use pack::{pack, pack_into, unpack, unpack_from, unpack_one, unpack_scalar};
pub use record::{field, Record};
