//! Typed scalar values captured as raw bytes
//!
//! `Logger::value` copies a value's little-endian bytes together with a
//! [`ValueKind`] tag. The dispatcher decodes them again for a structured
//! rendering: type, decoded value, hex and binary.

use serde::{Deserialize, Serialize};
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueKind {
    I8,
    I16,
    I32,
    I64,
    I128,
    U8,
    U16,
    U32,
    U64,
    U128,
    F32,
    F64,
    Bool,
    Char,
}

impl ValueKind {
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::I8 => "i8",
            ValueKind::I16 => "i16",
            ValueKind::I32 => "i32",
            ValueKind::I64 => "i64",
            ValueKind::I128 => "i128",
            ValueKind::U8 => "u8",
            ValueKind::U16 => "u16",
            ValueKind::U32 => "u32",
            ValueKind::U64 => "u64",
            ValueKind::U128 => "u128",
            ValueKind::F32 => "f32",
            ValueKind::F64 => "f64",
            ValueKind::Bool => "bool",
            ValueKind::Char => "char",
        }
    }

    pub fn size(&self) -> usize {
        match self {
            ValueKind::I8 | ValueKind::U8 | ValueKind::Bool => 1,
            ValueKind::I16 | ValueKind::U16 => 2,
            ValueKind::I32 | ValueKind::U32 | ValueKind::F32 | ValueKind::Char => 4,
            ValueKind::I64 | ValueKind::U64 | ValueKind::F64 => 8,
            ValueKind::I128 | ValueKind::U128 => 16,
        }
    }

    /// Decode little-endian bytes of this kind into display text
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        macro_rules! decode_as {
            ($ty:ty) => {
                <[u8; std::mem::size_of::<$ty>()]>::try_from(bytes)
                    .ok()
                    .map(|raw| <$ty>::from_le_bytes(raw).to_string())
            };
        }

        match self {
            ValueKind::I8 => decode_as!(i8),
            ValueKind::I16 => decode_as!(i16),
            ValueKind::I32 => decode_as!(i32),
            ValueKind::I64 => decode_as!(i64),
            ValueKind::I128 => decode_as!(i128),
            ValueKind::U8 => decode_as!(u8),
            ValueKind::U16 => decode_as!(u16),
            ValueKind::U32 => decode_as!(u32),
            ValueKind::U64 => decode_as!(u64),
            ValueKind::U128 => decode_as!(u128),
            ValueKind::F32 => decode_as!(f32),
            ValueKind::F64 => decode_as!(f64),
            ValueKind::Bool => match bytes {
                [0] => Some("false".to_string()),
                [1] => Some("true".to_string()),
                _ => None,
            },
            ValueKind::Char => <[u8; 4]>::try_from(bytes)
                .ok()
                .and_then(|raw| char::from_u32(u32::from_le_bytes(raw)))
                .map(|c| format!("{:?}", c)),
        }
    }
}

/// Scalars that can be logged as typed values
pub trait LogValue: Copy + Send + 'static {
    const KIND: ValueKind;

    fn to_le_byte_vec(&self) -> Vec<u8>;
}

macro_rules! impl_log_value {
    ($($ty:ty => $kind:ident),+ $(,)?) => {
        $(
            impl LogValue for $ty {
                const KIND: ValueKind = ValueKind::$kind;

                fn to_le_byte_vec(&self) -> Vec<u8> {
                    self.to_le_bytes().to_vec()
                }
            }
        )+
    };
}

impl_log_value!(
    i8 => I8, i16 => I16, i32 => I32, i64 => I64, i128 => I128,
    u8 => U8, u16 => U16, u32 => U32, u64 => U64, u128 => U128,
    f32 => F32, f64 => F64,
);

impl LogValue for bool {
    const KIND: ValueKind = ValueKind::Bool;

    fn to_le_byte_vec(&self) -> Vec<u8> {
        vec![u8::from(*self)]
    }
}

impl LogValue for char {
    const KIND: ValueKind = ValueKind::Char;

    fn to_le_byte_vec(&self) -> Vec<u8> {
        u32::from(*self).to_le_bytes().to_vec()
    }
}

/// A copied value and its type tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedValue {
    pub kind: ValueKind,
    pub bytes: Vec<u8>,
}

impl TypedValue {
    pub fn capture<T: LogValue>(value: &T) -> Self {
        Self {
            kind: T::KIND,
            bytes: value.to_le_byte_vec(),
        }
    }

    /// `i32: 1000 | hex: 0x000003E8 | bin: 00000000 00000000 00000011 11101000`
    pub fn render(&self) -> String {
        let decoded = self
            .kind
            .decode(&self.bytes)
            .unwrap_or_else(|| "<invalid>".to_string());

        let mut hex = String::with_capacity(2 + self.bytes.len() * 2);
        hex.push_str("0x");
        for byte in self.bytes.iter().rev() {
            let _ = write!(hex, "{:02X}", byte);
        }

        let bin = self
            .bytes
            .iter()
            .rev()
            .map(|byte| format!("{:08b}", byte))
            .collect::<Vec<_>>()
            .join(" ");

        format!("{}: {} | hex: {} | bin: {}", self.kind.name(), decoded, hex, bin)
    }
}
