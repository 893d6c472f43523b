use crate::status::{OsStatus, UNSUPPORTED_OPERATION_ERROR};
use propdispatch_schema::Value;

/// Identifies the property a host hook is invoked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyKey<'a> {
    /// Class that declares the property.
    pub class:    &'a str,
    pub property: &'a str,
    pub selector: u32,
}

/// How a getter is asked for its value.
#[derive(Debug, Clone, PartialEq)]
pub enum Read {
    Plain,
    /// Scope of the querying address, for scoped getters.
    Scoped(u32),
    /// Decoded qualifier, for qualified getters.
    Qualified(Value),
}

/// Storage and hooks behind the properties of one object.
///
/// Values handed in and out are in the property's host type; array
/// properties use [Value::Array].
pub trait PropertyHost: Send + Sync {
    /// Current value of a gettable property.
    fn get(&self, key: &PropertyKey, read: Read) -> Result<Value, OsStatus>;

    /// Transforms a caller-supplied input, for converter properties.
    fn convert(&self, key: &PropertyKey, input: Value) -> Result<Value, OsStatus> {
        let _ = (key, input);
        Err(UNSUPPORTED_OPERATION_ERROR)
    }

    /// Validation hook for `validated` properties.
    fn check(&self, key: &PropertyKey, value: &Value) -> Result<(), OsStatus> {
        let _ = (key, value);
        Ok(())
    }

    /// Performs the mutation of a settable property.
    fn set(&self, key: &PropertyKey, value: Value) -> Result<(), OsStatus>;
}
