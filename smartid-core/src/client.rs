use reqwest::Url;

use crate::{
    error::SmartIdError,
    http_request::Request,
    session::{CompletedSession, SessionHandle, SessionPoller},
    AuthenticationRequestBuilder, AuthenticationResult, CertificateRequestBuilder,
    CertificateResult, ClientConfig, Operation, OperationRequest, SignatureRequestBuilder,
    SignatureResult, SmartIdResult,
};

/// Client for one relying party.
///
/// Holds no per-session state, so a single client can run any number of sessions, including
/// concurrently from several tasks.
#[derive(Debug, Clone)]
pub struct SmartIdClient {
    config: ClientConfig,
    host_url: Url,
    request: Request,
}

impl SmartIdClient {
    /// Creates a client with its own HTTP connection pool.
    ///
    /// # Errors
    /// Returns `InvalidInput` if the config does not validate.
    pub fn new(config: ClientConfig) -> SmartIdResult<Self> {
        Self::with_http_client(config, reqwest::Client::new())
    }

    /// Creates a client on top of an existing `reqwest::Client`, e.g. one with a custom TLS setup
    /// or proxy. The per-request timeout and headers from `config` still apply.
    ///
    /// # Errors
    /// Returns `InvalidInput` if the config does not validate.
    pub fn with_http_client(config: ClientConfig, client: reqwest::Client) -> SmartIdResult<Self> {
        let host_url = config.validate()?;
        let request = Request::new(client, &config)?;
        Ok(Self {
            config,
            host_url,
            request,
        })
    }

    /// The config this client was created with.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Starts a certificate choice request.
    pub fn certificate(&self) -> CertificateRequestBuilder<'_> {
        CertificateRequestBuilder::new(self)
    }

    /// Starts a signature request.
    pub fn signature(&self) -> SignatureRequestBuilder<'_> {
        SignatureRequestBuilder::new(self)
    }

    /// Starts an authentication request.
    pub fn authentication(&self) -> AuthenticationRequestBuilder<'_> {
        AuthenticationRequestBuilder::new(self)
    }

    /// Submits a request and returns the session handle without waiting for the user.
    ///
    /// Show the user [`OperationRequest::verification_code`] after this returns.
    ///
    /// # Errors
    /// `Transport` if the service is unreachable, a classified HTTP error for a non-2xx answer,
    /// `UnexpectedResponse` if the answer has no session id.
    pub async fn submit(&self, request: &OperationRequest) -> SmartIdResult<SessionHandle> {
        self.poller().submit(request).await
    }

    /// Polls a session until it completes.
    ///
    /// # Errors
    /// A classified HTTP error, the failure designated for a non-`OK` end result, or
    /// `UnexpectedResponse`.
    pub async fn await_completion(&self, handle: SessionHandle) -> SmartIdResult<CompletedSession> {
        self.poller().await_completion(handle).await
    }

    /// Runs a certificate choice session.
    ///
    /// # Errors
    /// `BuilderValidation` if `request` is not a certificate choice, otherwise anything
    /// [`Self::submit`] or [`Self::await_completion`] returns.
    pub async fn fetch_certificate(
        &self,
        request: &OperationRequest,
    ) -> SmartIdResult<CertificateResult> {
        expect_operation(request, Operation::CertificateChoice)?;
        let session = self.run(request).await?;
        CertificateResult::from_session(session)
    }

    /// Runs a signature session.
    ///
    /// # Errors
    /// `BuilderValidation` if `request` is not a signature request, otherwise anything
    /// [`Self::submit`] or [`Self::await_completion`] returns.
    pub async fn create_signature(
        &self,
        request: &OperationRequest,
    ) -> SmartIdResult<SignatureResult> {
        expect_operation(request, Operation::Signature)?;
        let session = self.run(request).await?;
        SignatureResult::from_session(session)
    }

    /// Runs an authentication session.
    ///
    /// # Errors
    /// `BuilderValidation` if `request` is not an authentication request, otherwise anything
    /// [`Self::submit`] or [`Self::await_completion`] returns.
    pub async fn authenticate(
        &self,
        request: &OperationRequest,
    ) -> SmartIdResult<AuthenticationResult> {
        expect_operation(request, Operation::Authentication)?;
        let digest = request
            .digest()
            .ok_or_else(|| SmartIdError::builder("authentication request has no hash"))?;
        let session = self.run(request).await?;
        AuthenticationResult::from_session(session, digest)
    }

    async fn run(&self, request: &OperationRequest) -> SmartIdResult<CompletedSession> {
        let poller = self.poller();
        let handle = poller.submit(request).await?;
        poller.await_completion(handle).await
    }

    pub(crate) const fn poller(&self) -> SessionPoller<'_> {
        SessionPoller::new(
            &self.request,
            &self.host_url,
            self.config.polling_sleep,
            self.config.session_status_socket_open,
        )
    }
}

fn expect_operation(request: &OperationRequest, expected: Operation) -> SmartIdResult<()> {
    if request.operation() == expected {
        Ok(())
    } else {
        Err(SmartIdError::builder(format!(
            "expected a {expected} request, got {}",
            request.operation()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> SmartIdClient {
        let config = ClientConfig::new(
            "de305d54-75b4-431b-adb2-eb6b9e546014",
            "BANK123",
            "http://localhost:18089",
        );
        SmartIdClient::new(config).unwrap()
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = ClientConfig::new("nope", "BANK123", "http://localhost:18089");
        assert!(matches!(
            SmartIdClient::new(config),
            Err(SmartIdError::InvalidInput { .. })
        ));
    }

    #[tokio::test]
    async fn test_request_of_the_wrong_kind_is_rejected_before_sending() {
        let client = client();
        let request = client
            .certificate()
            .with_document_number("PNOEE-31111111111")
            .build()
            .unwrap();

        let err = client.create_signature(&request).await.unwrap_err();
        assert!(matches!(err, SmartIdError::BuilderValidation { .. }));
        let err = client.authenticate(&request).await.unwrap_err();
        assert!(matches!(err, SmartIdError::BuilderValidation { .. }));
    }
}
