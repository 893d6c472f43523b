use crate::address::ObjectId;
use propdispatch_schema::{code_to_string, CodecError};
use thiserror::Error;

/// Protocol-level status code surfaced at the boundary.
pub type OsStatus = i32;

const fn status(code: &[u8; 4]) -> OsStatus {
    i32::from_be_bytes(*code)
}

pub const NO_ERROR: OsStatus = 0;
pub const UNSPECIFIED_ERROR: OsStatus = status(b"what");
pub const UNKNOWN_PROPERTY_ERROR: OsStatus = status(b"who?");
pub const BAD_PROPERTY_SIZE_ERROR: OsStatus = status(b"!siz");
pub const ILLEGAL_OPERATION_ERROR: OsStatus = status(b"nope");
pub const BAD_OBJECT_ERROR: OsStatus = status(b"!obj");
pub const UNSUPPORTED_OPERATION_ERROR: OsStatus = status(b"unop");

/// Name of a well-known status, or its raw rendering.
pub fn status_name(status: OsStatus) -> String {
    let name = match status {
        NO_ERROR => "OK",
        UNSPECIFIED_ERROR => "kAudioHardwareUnspecifiedError",
        UNKNOWN_PROPERTY_ERROR => "kAudioHardwareUnknownPropertyError",
        BAD_PROPERTY_SIZE_ERROR => "kAudioHardwareBadPropertySizeError",
        ILLEGAL_OPERATION_ERROR => "kAudioHardwareIllegalOperationError",
        BAD_OBJECT_ERROR => "kAudioHardwareBadObjectError",
        UNSUPPORTED_OPERATION_ERROR => "kAudioHardwareUnsupportedOperationError",
        other => return code_to_string(other as u32),
    };
    name.to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SizeMismatch {
    #[error("not enough space: need {need}, avail {have}")]
    TooSmall { need: usize, have: usize },

    #[error("invalid size: should be {need}, got {have}")]
    NotEqual { need: usize, have: usize },

    #[error("invalid size: {size} is not a multiple of {element}")]
    NotMultiple { element: usize, size: usize },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    #[error("address is null")]
    NullAddress,

    #[error("object {0} not found")]
    ObjectNotFound(ObjectId),

    #[error("property {} not found", code_to_string(*.0))]
    UnknownProperty(u32),

    #[error("no accessor named \"{0}\"")]
    NoSuchAccessor(String),

    #[error("bad property size: {0}")]
    SizeMismatch(#[from] SizeMismatch),

    #[error("input buffer is null but size is {0}")]
    NullBuffer(usize),

    #[error("value is invalid: {}", status_name(*.0))]
    ValidationRejected(OsStatus),

    #[error("setter failed: {}", status_name(*.0))]
    MutationFailed(OsStatus),

    #[error("getter failed: {}", status_name(*.0))]
    GetterFailed(OsStatus),

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}

impl DispatchError {
    /// The terminal status reported at the boundary.
    pub fn status(&self) -> OsStatus {
        match self {
            DispatchError::NullAddress => ILLEGAL_OPERATION_ERROR,
            DispatchError::ObjectNotFound(_) => BAD_OBJECT_ERROR,
            DispatchError::UnknownProperty(_) | DispatchError::NoSuchAccessor(_) => UNKNOWN_PROPERTY_ERROR,
            DispatchError::SizeMismatch(_) => BAD_PROPERTY_SIZE_ERROR,
            DispatchError::NullBuffer(_) => ILLEGAL_OPERATION_ERROR,
            DispatchError::ValidationRejected(status)
            | DispatchError::MutationFailed(status)
            | DispatchError::GetterFailed(status) => *status,
            DispatchError::Codec(_) => UNSPECIFIED_ERROR,
        }
    }
}

/// Status of a boundary result.
pub fn status_of(result: &Result<(), DispatchError>) -> OsStatus {
    match result {
        Ok(()) => NO_ERROR,
        Err(e) => e.status(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_are_four_char_codes() {
        assert_eq!(BAD_PROPERTY_SIZE_ERROR, 0x2173_697a);
        assert_eq!(status_name(UNKNOWN_PROPERTY_ERROR), "kAudioHardwareUnknownPropertyError");
        assert_eq!(status_name(NO_ERROR), "OK");
        assert_eq!(status_name(status(b"abcd")), "'abcd' (0x61626364)");
    }

    #[test]
    fn hook_statuses_pass_through() {
        assert_eq!(DispatchError::ValidationRejected(1234).status(), 1234);
        assert_eq!(DispatchError::MutationFailed(-5).status(), -5);
        assert_eq!(DispatchError::NullBuffer(4).status(), ILLEGAL_OPERATION_ERROR);
        assert_eq!(
            DispatchError::from(SizeMismatch::NotMultiple { element: 4, size: 6 }).status(),
            BAD_PROPERTY_SIZE_ERROR
        );
    }
}
