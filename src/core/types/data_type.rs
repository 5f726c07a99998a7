//! Typed interpretation of a span of bytes
//!
//! A [`DataType`] is written in a short textual form such as `<u4` or `>i2`:
//!
//! | position | meaning                                                             |
//! |----------|---------------------------------------------------------------------|
//! | 1        | byte order: `<` little, `>` big, `=` native, `\|` single byte       |
//! | 2        | kind: `i` signed integer, `u` unsigned integer, `f` IEEE float      |
//! | 3        | width in bytes: `1`, `2`, `4` or `8`                                |

use super::error::{SearchError, SearchResult};
use super::operator::ComparisonOperator;
use super::{Address, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Byte order of a multi-byte scalar
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    /// Byte order of the host running the search
    pub const fn native() -> Self {
        if cfg!(target_endian = "little") {
            ByteOrder::Little
        } else {
            ByteOrder::Big
        }
    }
}

/// Integer or floating point interpretation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Kind {
    Integer,
    Float,
}

/// How to interpret bytes at an address as a scalar.
///
/// Single-byte types always carry [`ByteOrder::Little`] so that `<u1`, `>u1`
/// and `|u1` are the same type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DataType {
    width: u8,
    signed: bool,
    byte_order: ByteOrder,
    kind: Kind,
}

impl DataType {
    /// Creates an integer type
    pub fn integer(width: usize, signed: bool, byte_order: ByteOrder) -> SearchResult<Self> {
        Self::build(width, signed, byte_order, Kind::Integer)
    }

    /// Creates an IEEE 754 float type (width 4 or 8)
    pub fn float(width: usize, byte_order: ByteOrder) -> SearchResult<Self> {
        Self::build(width, true, byte_order, Kind::Float)
    }

    fn build(width: usize, signed: bool, byte_order: ByteOrder, kind: Kind) -> SearchResult<Self> {
        let valid = match kind {
            Kind::Integer => matches!(width, 1 | 2 | 4 | 8),
            Kind::Float => matches!(width, 4 | 8),
        };
        if !valid {
            return Err(SearchError::invalid_configuration(format!(
                "unsupported width {} for {:?} type",
                width, kind
            )));
        }
        let byte_order = if width == 1 {
            ByteOrder::Little
        } else {
            byte_order
        };
        Ok(DataType {
            width: width as u8,
            signed,
            byte_order,
            kind,
        })
    }

    /// Width in bytes
    pub const fn width(&self) -> usize {
        self.width as usize
    }

    pub const fn is_signed(&self) -> bool {
        self.signed
    }

    pub const fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    pub const fn kind(&self) -> Kind {
        self.kind
    }

    /// Decodes a scalar from the first `width()` bytes of `bytes`
    pub fn decode(&self, bytes: &[u8]) -> SearchResult<Value> {
        let width = self.width();
        let raw = bytes
            .get(..width)
            .ok_or_else(|| SearchError::out_of_range(Address::new(0), width, bytes.len()))?;

        let mut buffer = [0u8; 8];
        let bits = match self.byte_order {
            ByteOrder::Little => {
                buffer[..width].copy_from_slice(raw);
                u64::from_le_bytes(buffer)
            }
            ByteOrder::Big => {
                buffer[8 - width..].copy_from_slice(raw);
                u64::from_be_bytes(buffer)
            }
        };

        Ok(match (self.kind, width) {
            (Kind::Float, 4) => Value::Float(f32::from_bits(bits as u32) as f64),
            (Kind::Float, _) => Value::Float(f64::from_bits(bits)),
            (Kind::Integer, _) if self.signed => {
                let shift = 64 - 8 * width as u32;
                Value::Int(((bits << shift) as i64) >> shift)
            }
            (Kind::Integer, _) => Value::UInt(bits),
        })
    }

    /// Encodes a value of this type into its in-memory byte representation
    pub fn encode(&self, value: Value) -> SearchResult<Vec<u8>> {
        self.check(&value)?;
        let width = self.width();
        let bits = match value {
            Value::Int(v) => v as u64,
            Value::UInt(v) => v,
            Value::Float(v) if width == 4 => (v as f32).to_bits() as u64,
            Value::Float(v) => v.to_bits(),
        };
        Ok(match self.byte_order {
            ByteOrder::Little => bits.to_le_bytes()[..width].to_vec(),
            ByteOrder::Big => bits.to_be_bytes()[8 - width..].to_vec(),
        })
    }

    /// Returns true if `value` could have been decoded by this type
    pub fn admits(&self, value: &Value) -> bool {
        let bits = 8 * self.width() as u32;
        match (*value, self.kind, self.signed) {
            (Value::Float(_), Kind::Float, _) => true,
            (Value::Int(v), Kind::Integer, true) => {
                bits == 64 || (v >= -(1i64 << (bits - 1)) && v < (1i64 << (bits - 1)))
            }
            (Value::UInt(v), Kind::Integer, false) => bits == 64 || v < (1u64 << bits),
            _ => false,
        }
    }

    /// Rounds a caller-supplied value to the precision this type stores.
    ///
    /// Float types turn any number into a float of their own width, so a
    /// target of `0.1` matches both a stored `0.1f32` and a stored `0.1f64`.
    /// Integer types switch between `Int` and `UInt` when the number fits and
    /// otherwise leave the value as is; integer comparisons stay exact.
    pub fn coerce(&self, value: Value) -> Value {
        match (self.kind, self.width, value) {
            (Kind::Float, 4, _) => Value::Float(value.as_f64() as f32 as f64),
            (Kind::Float, _, _) => Value::Float(value.as_f64()),
            (Kind::Integer, _, Value::Int(v)) if !self.signed && v >= 0 => Value::UInt(v as u64),
            (Kind::Integer, _, Value::UInt(v)) if self.signed && v <= i64::MAX as u64 => {
                Value::Int(v as i64)
            }
            (Kind::Integer, _, _) => value,
        }
    }

    fn check(&self, value: &Value) -> SearchResult<()> {
        if self.admits(value) {
            Ok(())
        } else {
            Err(SearchError::type_mismatch(
                *self,
                format_args!("{} {}", value.kind_name(), value),
            ))
        }
    }

    /// Evaluates `op` over two values previously decoded with this type.
    ///
    /// `previous` and `current` must both belong to this type; anything else
    /// is reported as [`SearchError::TypeMismatch`]. `reference` is coerced
    /// to this type first.
    pub fn compare(
        &self,
        op: ComparisonOperator,
        previous: Value,
        current: Value,
        reference: Option<Value>,
    ) -> SearchResult<bool> {
        self.check(&previous)?;
        self.check(&current)?;
        op.evaluate(previous, current, reference.map(|r| self.coerce(r)))
    }
}

impl FromStr for DataType {
    type Err = SearchError;

    fn from_str(s: &str) -> SearchResult<Self> {
        let invalid = || SearchError::invalid_configuration(format!("invalid data type '{}'", s));

        let mut chars = s.trim().chars();
        let order = chars.next().ok_or_else(invalid)?;
        let kind = chars.next().ok_or_else(invalid)?;
        let width: usize = chars.as_str().parse().map_err(|_| invalid())?;

        let byte_order = match order {
            '<' => ByteOrder::Little,
            '>' => ByteOrder::Big,
            '=' => ByteOrder::native(),
            '|' if width == 1 => ByteOrder::Little,
            _ => return Err(invalid()),
        };

        match kind {
            'i' => DataType::integer(width, true, byte_order),
            'u' => DataType::integer(width, false, byte_order),
            'f' => DataType::float(width, byte_order),
            _ => Err(invalid()),
        }
        .map_err(|_| invalid())
    }
}

impl TryFrom<String> for DataType {
    type Error = SearchError;

    fn try_from(value: String) -> SearchResult<Self> {
        value.parse()
    }
}

impl From<DataType> for String {
    fn from(value: DataType) -> Self {
        value.to_string()
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let order = match (self.width, self.byte_order) {
            (1, _) => '|',
            (_, ByteOrder::Little) => '<',
            (_, ByteOrder::Big) => '>',
        };
        let kind = match (self.kind, self.signed) {
            (Kind::Float, _) => 'f',
            (Kind::Integer, true) => 'i',
            (Kind::Integer, false) => 'u',
        };
        write!(f, "{}{}{}", order, kind, self.width)
    }
}
