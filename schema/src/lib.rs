//! Wire-level value layer shared by the propdispatch compiler and runtime.
//!
//! A property has a fixed-width wire type and a host type. The [Codec]
//! converts one element between the two:
//!
//! ```
//! use propdispatch_schema::*;
//!
//! let mut out = [0u8; 4];
//! NativeCodec.encode(&Value::Bool(true), WireType::UInt32, &mut out).unwrap();
//! assert_eq!(out, 1u32.to_ne_bytes());
//!
//! let value = NativeCodec.decode(&out, WireType::UInt32, HostType::Bool).unwrap();
//! assert_eq!(value, Value::Bool(true));
//! ```

pub mod bb;
pub mod codec;
pub mod fourcc;
pub mod types;
pub mod value;

pub use bb::*;
pub use codec::*;
pub use fourcc::*;
pub use types::*;
pub use value::*;
