use crate::{
    bb::{ByteBuffer, ByteBufferMut},
    types::{HostType, WireType},
    value::{Value, ValueRange},
};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    #[error("buffer too small: need {need} bytes, have {have}")]
    BufferTooSmall { need: usize, have: usize },

    #[error("expected {expected} value, found {found}")]
    UnexpectedValue {
        expected: &'static str,
        found:    String,
    },

    #[error("wire type {wire} cannot carry host type {host}")]
    Incompatible { wire: WireType, host: HostType },
}

/// Converts between host values and their fixed-width wire encoding.
///
/// Implementations work on one element at a time; array properties are
/// encoded element-wise by the caller.
pub trait Codec: Send + Sync {
    /// Encode `value` as `wire` into the first `wire.size()` bytes of `out`.
    fn encode(&self, value: &Value, wire: WireType, out: &mut [u8]) -> Result<(), CodecError>;

    /// Decode the first `wire.size()` bytes of `bytes` into a value of `host` type.
    fn decode(&self, bytes: &[u8], wire: WireType, host: HostType) -> Result<Value, CodecError>;
}

/// Native-endian codec with numeric casts between wire and host types.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeCodec;

#[derive(Clone, Copy)]
enum Number {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
}

impl Number {
    fn of(value: &Value) -> Option<Number> {
        Some(match *value {
            Value::Bool(v) => Number::Unsigned(v as u64),
            Value::U8(v) => Number::Unsigned(v as u64),
            Value::U32(v) => Number::Unsigned(v as u64),
            Value::U64(v) => Number::Unsigned(v),
            Value::I32(v) => Number::Signed(v as i64),
            Value::I64(v) => Number::Signed(v),
            Value::F32(v) => Number::Float(v as f64),
            Value::F64(v) => Number::Float(v),
            Value::Range(_) | Value::Array(_) => return None,
        })
    }

    fn as_u64(self) -> u64 {
        match self {
            Number::Unsigned(v) => v,
            Number::Signed(v) => v as u64,
            Number::Float(v) => v as u64,
        }
    }

    fn as_i64(self) -> i64 {
        match self {
            Number::Unsigned(v) => v as i64,
            Number::Signed(v) => v,
            Number::Float(v) => v as i64,
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Number::Unsigned(v) => v as f64,
            Number::Signed(v) => v as f64,
            Number::Float(v) => v,
        }
    }

    fn is_nonzero(self) -> bool {
        match self {
            Number::Unsigned(v) => v != 0,
            Number::Signed(v) => v != 0,
            Number::Float(v) => v != 0.0,
        }
    }

    fn into_host(self, host: HostType) -> Value {
        match host {
            HostType::Bool => Value::Bool(self.is_nonzero()),
            HostType::U8 => Value::U8(self.as_u64() as u8),
            HostType::U32 => Value::U32(self.as_u64() as u32),
            HostType::I32 => Value::I32(self.as_i64() as i32),
            HostType::U64 => Value::U64(self.as_u64()),
            HostType::I64 => Value::I64(self.as_i64()),
            HostType::F32 => Value::F32(self.as_f64() as f32),
            HostType::F64 => Value::F64(self.as_f64()),
            HostType::ValueRange => unreachable!("range hosts are decoded separately"),
        }
    }
}

impl Codec for NativeCodec {
    fn encode(&self, value: &Value, wire: WireType, out: &mut [u8]) -> Result<(), CodecError> {
        if out.len() < wire.size() {
            return Err(CodecError::BufferTooSmall { need: wire.size(), have: out.len() });
        }

        let mut bb = ByteBufferMut::new();

        if wire == WireType::AudioValueRange {
            match value {
                Value::Range(range) => {
                    bb.write_f64(range.minimum);
                    bb.write_f64(range.maximum);
                }
                other => {
                    return Err(CodecError::UnexpectedValue {
                        expected: "Range",
                        found:    other.to_string(),
                    })
                }
            }
        } else {
            let number = Number::of(value).ok_or_else(|| CodecError::UnexpectedValue {
                expected: "scalar number",
                found:    value.to_string(),
            })?;

            match wire {
                WireType::UInt8 => bb.write_byte(number.as_u64() as u8),
                WireType::Boolean => bb.write_byte(number.is_nonzero() as u8),
                WireType::UInt32 | WireType::AudioObjectId | WireType::AudioClassId => {
                    bb.write_u32(number.as_u64() as u32)
                }
                WireType::SInt32 | WireType::Pid => bb.write_i32(number.as_i64() as i32),
                WireType::Float32 => bb.write_f32(number.as_f64() as f32),
                WireType::UInt64 => bb.write_u64(number.as_u64()),
                WireType::SInt64 => bb.write_i64(number.as_i64()),
                WireType::Float64 => bb.write_f64(number.as_f64()),
                WireType::AudioValueRange => unreachable!(),
            }
        }

        let data = bb.data();
        out[..data.len()].copy_from_slice(&data);
        Ok(())
    }

    fn decode(&self, bytes: &[u8], wire: WireType, host: HostType) -> Result<Value, CodecError> {
        if !wire.carries(host) {
            return Err(CodecError::Incompatible { wire, host });
        }

        let too_small = || CodecError::BufferTooSmall { need: wire.size(), have: bytes.len() };
        let mut bb = ByteBuffer::new(bytes);

        let number = match wire {
            WireType::AudioValueRange => {
                let minimum = bb.read_f64().map_err(|_| too_small())?;
                let maximum = bb.read_f64().map_err(|_| too_small())?;
                return Ok(Value::Range(ValueRange { minimum, maximum }));
            }
            WireType::UInt8 | WireType::Boolean => {
                Number::Unsigned(bb.read_byte().map_err(|_| too_small())? as u64)
            }
            WireType::UInt32 | WireType::AudioObjectId | WireType::AudioClassId => {
                Number::Unsigned(bb.read_u32().map_err(|_| too_small())? as u64)
            }
            WireType::SInt32 | WireType::Pid => {
                Number::Signed(bb.read_i32().map_err(|_| too_small())? as i64)
            }
            WireType::Float32 => Number::Float(bb.read_f32().map_err(|_| too_small())? as f64),
            WireType::UInt64 => Number::Unsigned(bb.read_u64().map_err(|_| too_small())?),
            WireType::SInt64 => Number::Signed(bb.read_i64().map_err(|_| too_small())?),
            WireType::Float64 => Number::Float(bb.read_f64().map_err(|_| too_small())?),
        };

        Ok(number.into_host(host))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_host_over_uint32_wire() {
        let mut out = [0xffu8; 4];
        NativeCodec.encode(&Value::Bool(true), WireType::UInt32, &mut out).unwrap();
        assert_eq!(out, 1u32.to_ne_bytes());

        let back = NativeCodec.decode(&7u32.to_ne_bytes(), WireType::UInt32, HostType::Bool);
        assert_eq!(back, Ok(Value::Bool(true)));
    }

    #[test]
    fn float_host_narrowed_to_float32_wire() {
        let mut out = [0u8; 4];
        NativeCodec.encode(&Value::F64(0.25), WireType::Float32, &mut out).unwrap();
        assert_eq!(out, 0.25f32.to_ne_bytes());
        assert_eq!(
            NativeCodec.decode(&out, WireType::Float32, HostType::F64),
            Ok(Value::F64(0.25))
        );
    }

    #[test]
    fn range_layout() {
        let mut out = [0u8; 16];
        let range = Value::Range(ValueRange::new(-96.0, 6.0));
        NativeCodec.encode(&range, WireType::AudioValueRange, &mut out).unwrap();
        assert_eq!(&out[..8], &(-96.0f64).to_ne_bytes());
        assert_eq!(&out[8..], &6.0f64.to_ne_bytes());
        assert_eq!(
            NativeCodec.decode(&out, WireType::AudioValueRange, HostType::ValueRange),
            Ok(range)
        );
    }

    #[test]
    fn encode_rejects_short_buffer_and_arrays() {
        let mut out = [0u8; 2];
        assert_eq!(
            NativeCodec.encode(&Value::U32(1), WireType::UInt32, &mut out),
            Err(CodecError::BufferTooSmall { need: 4, have: 2 })
        );

        let mut out = [0u8; 4];
        assert!(NativeCodec
            .encode(&Value::from(vec![1u32]), WireType::UInt32, &mut out)
            .is_err());
    }

    #[test]
    fn decode_rejects_incompatible_pair() {
        assert_eq!(
            NativeCodec.decode(&[0; 16], WireType::AudioValueRange, HostType::F64),
            Err(CodecError::Incompatible {
                wire: WireType::AudioValueRange,
                host: HostType::F64,
            })
        );
    }
}
