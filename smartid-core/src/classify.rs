//! Maps HTTP statuses and session end results onto [`SmartIdError`].
//!
//! Pure classification: nothing here retries or talks to the network beyond reading the body
//! of a failed response.

use reqwest::Response;
use strum::{Display, EnumString};

use crate::{error::SmartIdError, SmartIdResult};

/// Outcome codes reported by the service for a completed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum EndResult {
    /// The operation succeeded.
    Ok,
    /// The user refused the operation.
    UserRefused,
    /// The user did not respond in time.
    Timeout,
    /// The user's document cannot be used.
    DocumentUnusable,
    /// The user picked the wrong verification code.
    WrongVc,
}

/// Classifies a non-2xx HTTP status from a submission or status query.
#[must_use]
pub fn classify_http_status(status: u16, body: String) -> SmartIdError {
    match status {
        403 => SmartIdError::RequestForbidden,
        404 => SmartIdError::AccountNotFound,
        480 => SmartIdError::ClientTooOld,
        580 => SmartIdError::ServiceMaintenance,
        _ => SmartIdError::UnexpectedResponse {
            status: Some(status),
            details: body,
        },
    }
}

/// Classifies the `endResult` of a completed session. `Ok(())` only for `OK`.
///
/// # Errors
/// Returns the failure kind designated for `end_result`, or `UnexpectedResponse` for a value
/// this client does not know.
pub fn classify_end_result(end_result: &str) -> SmartIdResult<()> {
    let parsed = end_result
        .parse::<EndResult>()
        .map_err(|_| SmartIdError::unexpected(format!("unrecognized end result `{end_result}`")))?;
    match parsed {
        EndResult::Ok => Ok(()),
        EndResult::UserRefused => Err(SmartIdError::UserRefused),
        EndResult::Timeout => Err(SmartIdError::SessionTimeout),
        EndResult::DocumentUnusable => Err(SmartIdError::DocumentUnusable),
        EndResult::WrongVc => Err(SmartIdError::WrongVerificationCode),
    }
}

/// Passes 2xx responses through and classifies everything else.
pub(crate) async fn ensure_success(response: Response) -> SmartIdResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().to_string();
    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            log::warn!("could not read body of {status} response from {url}: {e}");
            format!("<unreadable body: {e}>")
        }
    };
    let error = classify_http_status(status.as_u16(), body);
    log::warn!("request to {url} failed with status {status}: {error}");
    Err(error)
}
