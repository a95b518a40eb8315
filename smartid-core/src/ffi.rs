//! Foreign-language surface. Builders borrow the client, which does not cross the FFI
//! boundary, so each operation is exposed as a single call taking all of its options.

use crate::{
    AuthenticationResult, CertificateLevel, CertificateResult, ClientConfig, HashableInput,
    IdentitySelector, SignatureResult, SmartIdClient, SmartIdError,
};

/// A Smart-ID client for one relying party.
#[derive(Debug, uniffi::Object)]
pub struct SmartId {
    inner: SmartIdClient,
}

#[uniffi::export(async_runtime = "tokio")]
impl SmartId {
    /// Creates a client from a config.
    ///
    /// # Errors
    /// Returns `InvalidInput` if the config does not validate.
    #[uniffi::constructor]
    pub fn new(config: ClientConfig) -> Result<Self, SmartIdError> {
        Ok(Self {
            inner: SmartIdClient::new(config)?,
        })
    }

    /// Lets the user choose a certificate and returns it.
    ///
    /// # Errors
    /// Any [`SmartIdError`] the session fails with.
    pub async fn fetch_certificate(
        &self,
        identity: IdentitySelector,
        certificate_level: Option<CertificateLevel>,
        nonce: Option<String>,
    ) -> Result<CertificateResult, SmartIdError> {
        let mut builder = self.inner.certificate().with_identity(identity);
        if let Some(level) = certificate_level {
            builder = builder.with_certificate_level(level);
        }
        if let Some(nonce) = nonce {
            builder = builder.with_nonce(nonce);
        }
        builder.fetch().await
    }

    /// Creates a signature with the certificate behind `document_number`.
    ///
    /// # Errors
    /// Any [`SmartIdError`] the session fails with.
    pub async fn create_signature(
        &self,
        document_number: String,
        input: HashableInput,
        certificate_level: Option<CertificateLevel>,
        nonce: Option<String>,
        display_text: Option<String>,
    ) -> Result<SignatureResult, SmartIdError> {
        let mut builder = self
            .inner
            .signature()
            .with_document_number(document_number)
            .with_hashable(input);
        if let Some(level) = certificate_level {
            builder = builder.with_certificate_level(level);
        }
        if let Some(nonce) = nonce {
            builder = builder.with_nonce(nonce);
        }
        if let Some(text) = display_text {
            builder = builder.with_display_text(text);
        }
        builder.sign().await
    }

    /// Authenticates the user by having them sign `input`.
    ///
    /// # Errors
    /// Any [`SmartIdError`] the session fails with.
    pub async fn authenticate(
        &self,
        identity: IdentitySelector,
        input: HashableInput,
        certificate_level: Option<CertificateLevel>,
        nonce: Option<String>,
        display_text: Option<String>,
    ) -> Result<AuthenticationResult, SmartIdError> {
        let mut builder = self
            .inner
            .authentication()
            .with_identity(identity)
            .with_hashable(input);
        if let Some(level) = certificate_level {
            builder = builder.with_certificate_level(level);
        }
        if let Some(nonce) = nonce {
            builder = builder.with_nonce(nonce);
        }
        if let Some(text) = display_text {
            builder = builder.with_display_text(text);
        }
        builder.authenticate().await
    }
}

/// The four-digit code to show the user for `input`.
///
/// # Errors
/// Returns `InvalidInput` if `input` is empty or its digest has the wrong length.
#[uniffi::export]
#[allow(clippy::needless_pass_by_value)]
pub fn verification_code(input: HashableInput) -> Result<String, SmartIdError> {
    input.verification_code()
}
