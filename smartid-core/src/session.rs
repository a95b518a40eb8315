//! Session submission and polling.
//!
//! A session moves `SUBMITTED -> POLLING -> {SUCCEEDED, FAILED}`. The only suspension point is
//! the sleep between two status queries. Queries for one session are strictly sequential and
//! nothing is retried once a terminal state is reached.

use std::time::Duration;

use reqwest::{Response, Url};
use serde::{de::DeserializeOwned, Deserialize};

use crate::{
    classify::{classify_end_result, ensure_success},
    error::SmartIdError,
    http_request::Request,
    OperationRequest, SmartIdResult,
};

/// Identifier of a running session, returned by a submission.
///
/// Consumed by [`crate::SmartIdClient::await_completion`]; it cannot be polled twice.
#[derive(Debug, PartialEq, Eq)]
pub struct SessionHandle {
    session_id: String,
}

impl SessionHandle {
    /// The session id assigned by the service.
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

/// Session state reported by a status query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SessionState {
    /// The user has not finished yet.
    Running,
    /// The session is finished; `result.endResult` tells how.
    Complete,
}

/// Response to a session submission.
#[derive(Debug, Deserialize)]
struct SessionResponse {
    #[serde(rename = "sessionID")]
    session_id: String,
}

/// Body of a session status query.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    /// Running or complete.
    pub state: SessionState,
    /// Present once the session is complete.
    pub result: Option<SessionResult>,
    /// The signature, for successful signature and authentication sessions.
    pub signature: Option<SessionSignature>,
    /// The user's certificate, for successful sessions.
    pub cert: Option<SessionCertificate>,
    /// The hash the service signed, echoed back for authentication sessions.
    pub signed_hash_in_base64: Option<String>,
}

/// The `result` object of a completed session.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResult {
    /// Outcome code, e.g. `OK` or `USER_REFUSED`.
    pub end_result: String,
    /// Document number of the account that completed the session.
    pub document_number: Option<String>,
}

/// The `signature` object of a completed session.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionSignature {
    /// Signature value in base64.
    pub value: String,
    /// Signature algorithm name, e.g. `sha256WithRSAEncryption`.
    pub algorithm: String,
}

/// The `cert` object of a completed session.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCertificate {
    /// DER certificate in base64.
    pub value: String,
    /// Level of the certificate, e.g. `QUALIFIED`.
    pub certificate_level: String,
}

/// A session that reached `COMPLETE` with `endResult = OK`.
#[derive(Debug, Clone)]
pub struct CompletedSession {
    /// The session id.
    pub session_id: String,
    /// Document number reported with the result.
    pub document_number: Option<String>,
    /// The certificate payload, if any.
    pub cert: Option<SessionCertificate>,
    /// The signature payload, if any.
    pub signature: Option<SessionSignature>,
    /// The signed hash echoed by the service, if any.
    pub signed_hash_in_base64: Option<String>,
}

impl CompletedSession {
    /// Classifies a terminal status. Only `OK` yields a completed session.
    fn from_status(session_id: String, status: SessionStatus) -> SmartIdResult<Self> {
        let result = status
            .result
            .ok_or_else(|| SmartIdError::unexpected("completed session has no result"))?;
        classify_end_result(&result.end_result)?;
        Ok(Self {
            session_id,
            document_number: result.document_number,
            cert: status.cert,
            signature: status.signature,
            signed_hash_in_base64: status.signed_hash_in_base64,
        })
    }
}

/// Drives one session from submission to a terminal state.
pub(crate) struct SessionPoller<'a> {
    request: &'a Request,
    host_url: &'a Url,
    polling_sleep: Duration,
    socket_open: Duration,
}

impl<'a> SessionPoller<'a> {
    pub(crate) const fn new(
        request: &'a Request,
        host_url: &'a Url,
        polling_sleep: Duration,
        socket_open: Duration,
    ) -> Self {
        Self {
            request,
            host_url,
            polling_sleep,
            socket_open,
        }
    }

    /// Posts the request and captures the session id. A non-2xx answer fails immediately.
    pub(crate) async fn submit(
        &self,
        operation_request: &OperationRequest,
    ) -> SmartIdResult<SessionHandle> {
        let operation = operation_request.operation();
        let url = self.endpoint(
            std::iter::once(operation.path_prefix())
                .chain(operation_request.identity().resource_segments()),
        )?;

        log::debug!(
            "starting {operation} session for {}",
            operation_request.identity().kind()
        );
        let response = self
            .request
            .handle(self.request.post(url).json(&operation_request.body()))
            .await?;
        let response = ensure_success(response).await?;
        let session: SessionResponse = read_json(response).await?;

        log::debug!("{operation} session {} submitted", session.session_id);
        Ok(SessionHandle {
            session_id: session.session_id,
        })
    }

    /// Queries the session status until it is complete.
    pub(crate) async fn await_completion(
        &self,
        handle: SessionHandle,
    ) -> SmartIdResult<CompletedSession> {
        let SessionHandle { session_id } = handle;
        let mut url = self.endpoint(["session", session_id.as_str()])?;
        url.query_pairs_mut()
            .append_pair("timeoutMs", &self.socket_open.as_millis().to_string());

        let mut queries: u32 = 0;
        loop {
            queries += 1;
            let response = self.request.handle(self.request.get(url.clone())).await?;
            let response = ensure_success(response).await?;
            let status: SessionStatus = read_json(response).await?;

            match status.state {
                SessionState::Running => {
                    log::debug!(
                        "session {session_id} still running after {queries} queries, sleeping {:?}",
                        self.polling_sleep
                    );
                    tokio::time::sleep(self.polling_sleep).await;
                }
                SessionState::Complete => {
                    let completed = CompletedSession::from_status(session_id, status);
                    match &completed {
                        Ok(session) => {
                            log::info!("session {} completed", session.session_id);
                        }
                        Err(err) => log::warn!("session failed: {err}"),
                    }
                    return completed;
                }
            }
        }
    }

    /// Appends `segments` to the host URL, keeping any base path such as `/v1/`.
    fn endpoint<'s>(&self, segments: impl IntoIterator<Item = &'s str>) -> SmartIdResult<Url> {
        let mut url = self.host_url.clone();
        url.path_segments_mut()
            .map_err(|()| SmartIdError::invalid_input("host_url", "must be a base URL"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Reads a JSON body. A body that does not parse is an unexpected response, a body that
/// cannot be read is a transport failure.
async fn read_json<T: DeserializeOwned>(response: Response) -> SmartIdResult<T> {
    let status = response.status().as_u16();
    let url = response.url().to_string();
    let text = response.text().await.map_err(|e| SmartIdError::Transport {
        url,
        error: format!("failed to read response body: {e}"),
    })?;
    serde_json::from_str(&text).map_err(|e| SmartIdError::UnexpectedResponse {
        status: Some(status),
        details: format!("malformed response body: {e}"),
    })
}
