use thiserror::Error;

/// Convenience alias used across the crate.
pub type SmartIdResult<T, E = SmartIdError> = std::result::Result<T, E>;

/// Error outputs from the Smart-ID client.
///
/// Every public operation either returns a fully populated result or fails with exactly one
/// of these kinds. Nothing here is retried by the session logic.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Error))]
#[cfg_attr(feature = "ffi", uniffi(flat_error))]
pub enum SmartIdError {
    /// The presented input is not valid for the requested operation.
    #[error("invalid_input: {attribute}: {reason}")]
    InvalidInput {
        /// The attribute that is invalid.
        attribute: String,
        /// The reason the input is invalid.
        reason: String,
    },
    /// A request builder was used incorrectly (missing or conflicting fields). Never reaches the network.
    #[error("builder_validation: {reason}")]
    BuilderValidation {
        /// What is wrong with the builder state.
        reason: String,
    },
    /// The HTTP layer failed (connection, TLS, per-request timeout).
    #[error("transport_error: {url}: {error}")]
    Transport {
        /// The URL that was requested.
        url: String,
        /// The error message from the HTTP client.
        error: String,
    },
    /// The service has no account for the given identity (HTTP 404).
    #[error("account_not_found")]
    AccountNotFound,
    /// The relying party is not allowed to make this request (HTTP 403).
    #[error("request_forbidden")]
    RequestForbidden,
    /// The client API version is no longer supported by the service (HTTP 480).
    #[error("client_too_old")]
    ClientTooOld,
    /// The service is under maintenance (HTTP 580).
    #[error("service_maintenance")]
    ServiceMaintenance,
    /// The user refused the operation on their device.
    #[error("user_refused")]
    UserRefused,
    /// The user did not respond before the service-side session timeout.
    #[error("session_timeout")]
    SessionTimeout,
    /// The user's document cannot be used for the operation.
    #[error("document_unusable")]
    DocumentUnusable,
    /// The user selected the wrong verification code on their device.
    #[error("wrong_verification_code")]
    WrongVerificationCode,
    /// The service answered with something this client does not understand.
    #[error("unexpected_response: status={status:?}: {details}")]
    UnexpectedResponse {
        /// HTTP status, if the failure came from a status code.
        status: Option<u16>,
        /// Response body or a description of what was unexpected.
        details: String,
    },
}

impl SmartIdError {
    pub(crate) fn invalid_input(attribute: &str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            attribute: attribute.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn builder(reason: impl Into<String>) -> Self {
        Self::BuilderValidation {
            reason: reason.into(),
        }
    }

    pub(crate) fn unexpected(details: impl Into<String>) -> Self {
        Self::UnexpectedResponse {
            status: None,
            details: details.into(),
        }
    }

    /// Whether the failure was reported by the service for a finished session, as opposed to a
    /// local, transport or HTTP-status failure.
    #[must_use]
    pub const fn is_session_end_result(&self) -> bool {
        matches!(
            self,
            Self::UserRefused
                | Self::SessionTimeout
                | Self::DocumentUnusable
                | Self::WrongVerificationCode
        )
    }
}
