use thiserror::Error;

/// Rule violations raised while toggling seats. These never abort the flow;
/// the selection stays exactly as it was.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SelectionError {
    #[error("you can select only {max_seats} seat(s)")]
    LimitExceeded { max_seats: u8 },
    #[error("please select at least one seat")]
    EmptySelection,
}

/// Everything that can go wrong between picking a show and holding a
/// confirmed booking.
#[derive(Debug, Error)]
pub enum BookingError {
    #[error(transparent)]
    Selection(#[from] SelectionError),
    /// A stage descriptor failed validation, usually because a hand-edited
    /// or truncated query string was fed back into the flow.
    #[error("invalid booking session: {0}")]
    InvalidSession(String),
    /// The server refused the submission because at least one requested
    /// seat is no longer free. Carries the server's detail message verbatim.
    #[error("{0}")]
    AvailabilityConflict(String),
    #[error("authentication required")]
    AuthRequired,
    /// Any other rejection the server sent back with a detail message.
    #[error("{0}")]
    Rejected(String),
    /// The request never produced a response. The submission may or may not
    /// have been applied; resubmit with the same key to find out.
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    /// Another submission from this submitter has not finished yet.
    #[error("a booking submission is already in flight")]
    SubmissionInFlight,
}

impl BookingError {
    /// Resubmitting is safe only when the outcome is unknown. Definitive
    /// rejections must not be retried blindly.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BookingError::Transport(_))
    }

    pub fn requires_login(&self) -> bool {
        matches!(self, BookingError::AuthRequired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_errors_convert_into_booking_errors() {
        let err: BookingError = SelectionError::LimitExceeded { max_seats: 4 }.into();
        assert!(matches!(
            err,
            BookingError::Selection(SelectionError::LimitExceeded { max_seats: 4 })
        ));
        assert_eq!(err.to_string(), "you can select only 4 seat(s)");
    }

    #[test]
    fn only_transport_failures_are_retryable() {
        assert!(!BookingError::AvailabilityConflict("taken".into()).is_retryable());
        assert!(!BookingError::AuthRequired.is_retryable());
        assert!(!BookingError::SubmissionInFlight.is_retryable());
        assert!(!BookingError::Rejected("no".into()).is_retryable());
    }

    #[test]
    fn only_auth_failures_require_login() {
        assert!(BookingError::AuthRequired.requires_login());
        assert!(!BookingError::Rejected("no".into()).requires_login());
    }
}
