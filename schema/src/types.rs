use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fixed-width on-the-wire representation of a property value.
///
/// Every wire type has a constant encoded size; values are laid out in
/// native byte order, the way an in-process host reads them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WireType {
    UInt8,
    Boolean,
    UInt32,
    SInt32,
    #[serde(rename = "AudioObjectID")]
    AudioObjectId,
    #[serde(rename = "AudioClassID")]
    AudioClassId,
    #[serde(rename = "pid_t")]
    Pid,
    Float32,
    UInt64,
    SInt64,
    Float64,
    AudioValueRange,
}

pub const WIRE_TYPES: [WireType; 12] = [
    WireType::UInt8,
    WireType::Boolean,
    WireType::UInt32,
    WireType::SInt32,
    WireType::AudioObjectId,
    WireType::AudioClassId,
    WireType::Pid,
    WireType::Float32,
    WireType::UInt64,
    WireType::SInt64,
    WireType::Float64,
    WireType::AudioValueRange,
];

impl WireType {
    /// Encoded size of one value, in bytes.
    pub fn size(self) -> usize {
        match self {
            WireType::UInt8 | WireType::Boolean => 1,
            WireType::UInt32
            | WireType::SInt32
            | WireType::AudioObjectId
            | WireType::AudioClassId
            | WireType::Pid
            | WireType::Float32 => 4,
            WireType::UInt64 | WireType::SInt64 | WireType::Float64 => 8,
            WireType::AudioValueRange => 16,
        }
    }

    /// The host type a property gets when its schema does not name one.
    pub fn natural_host(self) -> HostType {
        match self {
            WireType::UInt8 => HostType::U8,
            WireType::Boolean => HostType::Bool,
            WireType::UInt32 | WireType::AudioObjectId | WireType::AudioClassId => HostType::U32,
            WireType::SInt32 | WireType::Pid => HostType::I32,
            WireType::Float32 => HostType::F32,
            WireType::UInt64 => HostType::U64,
            WireType::SInt64 => HostType::I64,
            WireType::Float64 => HostType::F64,
            WireType::AudioValueRange => HostType::ValueRange,
        }
    }

    /// Whether values of `host` can be carried by this wire type.
    pub fn carries(self, host: HostType) -> bool {
        (self == WireType::AudioValueRange) == (host == HostType::ValueRange)
    }

    pub fn name(self) -> &'static str {
        match self {
            WireType::UInt8 => "UInt8",
            WireType::Boolean => "Boolean",
            WireType::UInt32 => "UInt32",
            WireType::SInt32 => "SInt32",
            WireType::AudioObjectId => "AudioObjectID",
            WireType::AudioClassId => "AudioClassID",
            WireType::Pid => "pid_t",
            WireType::Float32 => "Float32",
            WireType::UInt64 => "UInt64",
            WireType::SInt64 => "SInt64",
            WireType::Float64 => "Float64",
            WireType::AudioValueRange => "AudioValueRange",
        }
    }
}

impl FromStr for WireType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        WIRE_TYPES.iter().copied().find(|t| t.name() == s).ok_or(())
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Host-side semantic representation of a property value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HostType {
    #[serde(rename = "bool")]
    Bool,
    #[serde(rename = "u8")]
    U8,
    #[serde(rename = "u32")]
    U32,
    #[serde(rename = "i32")]
    I32,
    #[serde(rename = "u64")]
    U64,
    #[serde(rename = "i64")]
    I64,
    #[serde(rename = "f32")]
    F32,
    #[serde(rename = "f64")]
    F64,
    ValueRange,
}

pub const HOST_TYPES: [HostType; 9] = [
    HostType::Bool,
    HostType::U8,
    HostType::U32,
    HostType::I32,
    HostType::U64,
    HostType::I64,
    HostType::F32,
    HostType::F64,
    HostType::ValueRange,
];

impl HostType {
    /// Name as written in schemas; also the Rust type used by generated code.
    pub fn name(self) -> &'static str {
        match self {
            HostType::Bool => "bool",
            HostType::U8 => "u8",
            HostType::U32 => "u32",
            HostType::I32 => "i32",
            HostType::U64 => "u64",
            HostType::I64 => "i64",
            HostType::F32 => "f32",
            HostType::F64 => "f64",
            HostType::ValueRange => "ValueRange",
        }
    }
}

impl FromStr for HostType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        HOST_TYPES.iter().copied().find(|t| t.name() == s).ok_or(())
    }
}

impl fmt::Display for HostType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}
