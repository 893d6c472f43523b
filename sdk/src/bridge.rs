use crate::status::{status_of, DispatchError, OsStatus, NO_ERROR};

/// Conversion of a forwarded call's result into a boundary status.
pub trait IntoStatus {
    fn into_status(self) -> OsStatus;
}

impl IntoStatus for OsStatus {
    fn into_status(self) -> OsStatus {
        self
    }
}

impl IntoStatus for Result<(), DispatchError> {
    fn into_status(self) -> OsStatus {
        status_of(&self)
    }
}

impl IntoStatus for Result<(), OsStatus> {
    fn into_status(self) -> OsStatus {
        match self {
            Ok(()) => NO_ERROR,
            Err(status) => status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn results_map_to_statuses() {
        use crate::status::ILLEGAL_OPERATION_ERROR;

        assert_eq!(Ok::<(), DispatchError>(()).into_status(), NO_ERROR);
        assert_eq!(Err::<(), _>(DispatchError::NullAddress).into_status(), ILLEGAL_OPERATION_ERROR);
        assert_eq!(Err::<(), OsStatus>(42).into_status(), 42);
    }
}
