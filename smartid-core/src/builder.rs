//! Fluent builders for the three operations.
//!
//! Setters never fail; `build()` checks that exactly one identity selector (and, for signing
//! and authentication, exactly one hash input) was given and produces an immutable
//! [`OperationRequest`].

use crate::{
    error::SmartIdError,
    request::{validate_display_text, RequestParts},
    AuthenticationResult, CertificateLevel, CertificateResult, HashType, HashableInput,
    IdentitySelector, NationalIdentity, Nonce, OperationRequest, SignatureResult, SmartIdClient,
    SmartIdResult,
};

#[derive(Debug, Clone, Default)]
struct IdentityParts {
    document_number: Option<String>,
    national_identity: Option<NationalIdentity>,
    country_code: Option<String>,
    national_identity_number: Option<String>,
}

impl IdentityParts {
    fn set(&mut self, selector: IdentitySelector) {
        match selector {
            IdentitySelector::DocumentNumber { document_number } => {
                self.document_number = Some(document_number);
            }
            IdentitySelector::NationalIdentity { identity } => {
                self.national_identity = Some(identity);
            }
        }
    }

    fn resolve(self) -> SmartIdResult<IdentitySelector> {
        let pno = match (self.country_code, self.national_identity_number) {
            (None, None) => None,
            (Some(country_code), Some(number)) => {
                Some(IdentitySelector::national_identity(country_code, number))
            }
            _ => {
                return Err(SmartIdError::builder(
                    "country code and national identity number must be set together",
                ))
            }
        };

        let mut selected = [
            self.document_number
                .map(|document_number| IdentitySelector::DocumentNumber { document_number }),
            self.national_identity.map(IdentitySelector::from),
            pno,
        ]
        .into_iter()
        .flatten();

        match (selected.next(), selected.next()) {
            (Some(selector), None) => Ok(selector),
            (None, _) => Err(SmartIdError::builder(
                "an identity selector is required: document number or national identity",
            )),
            (Some(first), Some(second)) => Err(SmartIdError::builder(format!(
                "exactly one identity selector may be set, got {} and {}",
                first.kind(),
                second.kind()
            ))),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct HashParts {
    data: Option<HashableInput>,
    hash: Option<HashableInput>,
}

impl HashParts {
    fn set(&mut self, input: HashableInput) {
        match input {
            HashableInput::Data { .. } => self.data = Some(input),
            HashableInput::Hash { .. } => self.hash = Some(input),
        }
    }

    fn resolve(self) -> SmartIdResult<HashableInput> {
        match (self.data, self.hash) {
            (Some(input), None) | (None, Some(input)) => Ok(input),
            (None, None) => Err(SmartIdError::builder(
                "data to sign or a pre-computed hash is required",
            )),
            (Some(_), Some(_)) => Err(SmartIdError::builder(
                "either data to sign or a pre-computed hash may be set, not both",
            )),
        }
    }
}

/// Options every operation accepts.
#[derive(Debug, Clone, Default)]
struct CommonParts {
    identity: IdentityParts,
    certificate_level: Option<CertificateLevel>,
    nonce: Option<String>,
    display_text: Option<String>,
}

impl CommonParts {
    fn resolve(self, client: &SmartIdClient) -> SmartIdResult<RequestParts> {
        let identity = self.identity.resolve()?;
        let nonce = self.nonce.map(Nonce::new).transpose()?;
        if let Some(text) = &self.display_text {
            validate_display_text(text)?;
        }
        let config = client.config();
        Ok(RequestParts {
            relying_party_uuid: config.relying_party_uuid.clone(),
            relying_party_name: config.relying_party_name.clone(),
            identity,
            certificate_level: self.certificate_level.unwrap_or_default(),
            nonce,
            display_text: self.display_text,
        })
    }
}

/// Builds a certificate choice request. Created by [`SmartIdClient::certificate`].
#[derive(Debug, Clone)]
#[must_use]
pub struct CertificateRequestBuilder<'a> {
    client: &'a SmartIdClient,
    parts: CommonParts,
}

impl<'a> CertificateRequestBuilder<'a> {
    pub(crate) fn new(client: &'a SmartIdClient) -> Self {
        Self {
            client,
            parts: CommonParts::default(),
        }
    }

    /// Addresses the request by document number.
    pub fn with_document_number(mut self, document_number: impl Into<String>) -> Self {
        self.parts.identity.document_number = Some(document_number.into());
        self
    }

    /// Addresses the request by national identity.
    pub fn with_national_identity(mut self, identity: NationalIdentity) -> Self {
        self.parts.identity.national_identity = Some(identity);
        self
    }

    /// Addresses the request by either kind of selector.
    pub fn with_identity(mut self, selector: IdentitySelector) -> Self {
        self.parts.identity.set(selector);
        self
    }

    /// Country of the national identity number. Requires [`Self::with_national_identity_number`].
    pub fn with_country_code(mut self, country_code: impl Into<String>) -> Self {
        self.parts.identity.country_code = Some(country_code.into());
        self
    }

    /// National identity number. Requires [`Self::with_country_code`].
    pub fn with_national_identity_number(mut self, number: impl Into<String>) -> Self {
        self.parts.identity.national_identity_number = Some(number.into());
        self
    }

    /// Required certificate level. Defaults to [`CertificateLevel::Advanced`].
    pub const fn with_certificate_level(mut self, level: CertificateLevel) -> Self {
        self.parts.certificate_level = Some(level);
        self
    }

    /// Nonce making the request unique.
    pub fn with_nonce(mut self, nonce: impl Into<String>) -> Self {
        self.parts.nonce = Some(nonce.into());
        self
    }

    /// Validates the builder and produces the request.
    ///
    /// # Errors
    /// `BuilderValidation` for a missing or conflicting identity, `InvalidInput` for a bad nonce.
    pub fn build(self) -> SmartIdResult<OperationRequest> {
        let parts = self.parts.resolve(self.client)?;
        Ok(OperationRequest::certificate_choice(parts))
    }

    /// Builds the request, runs the session and returns the chosen certificate.
    ///
    /// # Errors
    /// Any [`SmartIdError`]; see [`SmartIdClient::fetch_certificate`].
    pub async fn fetch(self) -> SmartIdResult<CertificateResult> {
        let client = self.client;
        let request = self.build()?;
        client.fetch_certificate(&request).await
    }
}

/// Builds a signature request. Created by [`SmartIdClient::signature`].
///
/// Signature sessions are addressed by document number only, usually the one returned by a
/// certificate choice.
#[derive(Debug, Clone)]
#[must_use]
pub struct SignatureRequestBuilder<'a> {
    client: &'a SmartIdClient,
    parts: CommonParts,
    hash: HashParts,
}

impl<'a> SignatureRequestBuilder<'a> {
    pub(crate) fn new(client: &'a SmartIdClient) -> Self {
        Self {
            client,
            parts: CommonParts::default(),
            hash: HashParts::default(),
        }
    }

    /// The signer's document number.
    pub fn with_document_number(mut self, document_number: impl Into<String>) -> Self {
        self.parts.identity.document_number = Some(document_number.into());
        self
    }

    /// Data to sign, hashed locally with SHA-512.
    pub fn with_signable_data(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.hash.set(HashableInput::from_data(data));
        self
    }

    /// A hash computed by the caller.
    pub fn with_signable_hash(mut self, hash_type: HashType, digest: impl Into<Vec<u8>>) -> Self {
        self.hash.set(HashableInput::from_hash(hash_type, digest));
        self
    }

    /// Any hash input.
    pub fn with_hashable(mut self, input: HashableInput) -> Self {
        self.hash.set(input);
        self
    }

    /// Required certificate level. Defaults to [`CertificateLevel::Advanced`].
    pub const fn with_certificate_level(mut self, level: CertificateLevel) -> Self {
        self.parts.certificate_level = Some(level);
        self
    }

    /// Nonce making the request unique.
    pub fn with_nonce(mut self, nonce: impl Into<String>) -> Self {
        self.parts.nonce = Some(nonce.into());
        self
    }

    /// Text shown on the user's device, at most 60 characters.
    pub fn with_display_text(mut self, text: impl Into<String>) -> Self {
        self.parts.display_text = Some(text.into());
        self
    }

    /// Validates the builder and produces the request.
    ///
    /// # Errors
    /// `BuilderValidation` for a missing identity or hash input, or both data and hash set.
    /// `InvalidInput` for a bad digest, nonce or display text.
    pub fn build(self) -> SmartIdResult<OperationRequest> {
        let input = self.hash.resolve()?;
        let parts = self.parts.resolve(self.client)?;
        Ok(OperationRequest::signature(parts, input.digest()?))
    }

    /// Builds the request, runs the session and returns the signature.
    ///
    /// # Errors
    /// Any [`SmartIdError`]; see [`SmartIdClient::create_signature`].
    pub async fn sign(self) -> SmartIdResult<SignatureResult> {
        let client = self.client;
        let request = self.build()?;
        client.create_signature(&request).await
    }
}

/// Builds an authentication request. Created by [`SmartIdClient::authentication`].
#[derive(Debug, Clone)]
#[must_use]
pub struct AuthenticationRequestBuilder<'a> {
    client: &'a SmartIdClient,
    parts: CommonParts,
    hash: HashParts,
}

impl<'a> AuthenticationRequestBuilder<'a> {
    pub(crate) fn new(client: &'a SmartIdClient) -> Self {
        Self {
            client,
            parts: CommonParts::default(),
            hash: HashParts::default(),
        }
    }

    /// Addresses the request by document number.
    pub fn with_document_number(mut self, document_number: impl Into<String>) -> Self {
        self.parts.identity.document_number = Some(document_number.into());
        self
    }

    /// Addresses the request by national identity.
    pub fn with_national_identity(mut self, identity: NationalIdentity) -> Self {
        self.parts.identity.national_identity = Some(identity);
        self
    }

    /// Addresses the request by either kind of selector.
    pub fn with_identity(mut self, selector: IdentitySelector) -> Self {
        self.parts.identity.set(selector);
        self
    }

    /// Country of the national identity number. Requires [`Self::with_national_identity_number`].
    pub fn with_country_code(mut self, country_code: impl Into<String>) -> Self {
        self.parts.identity.country_code = Some(country_code.into());
        self
    }

    /// National identity number. Requires [`Self::with_country_code`].
    pub fn with_national_identity_number(mut self, number: impl Into<String>) -> Self {
        self.parts.identity.national_identity_number = Some(number.into());
        self
    }

    /// The challenge, as a hash computed by the caller.
    pub fn with_authentication_hash(
        mut self,
        hash_type: HashType,
        digest: impl Into<Vec<u8>>,
    ) -> Self {
        self.hash.set(HashableInput::from_hash(hash_type, digest));
        self
    }

    /// Any hash input. Raw data is hashed locally.
    pub fn with_hashable(mut self, input: HashableInput) -> Self {
        self.hash.set(input);
        self
    }

    /// Required certificate level. Defaults to [`CertificateLevel::Advanced`].
    pub const fn with_certificate_level(mut self, level: CertificateLevel) -> Self {
        self.parts.certificate_level = Some(level);
        self
    }

    /// Nonce making the request unique.
    pub fn with_nonce(mut self, nonce: impl Into<String>) -> Self {
        self.parts.nonce = Some(nonce.into());
        self
    }

    /// Text shown on the user's device, at most 60 characters.
    pub fn with_display_text(mut self, text: impl Into<String>) -> Self {
        self.parts.display_text = Some(text.into());
        self
    }

    /// Validates the builder and produces the request.
    ///
    /// # Errors
    /// Same as [`SignatureRequestBuilder::build`].
    pub fn build(self) -> SmartIdResult<OperationRequest> {
        let input = self.hash.resolve()?;
        let parts = self.parts.resolve(self.client)?;
        Ok(OperationRequest::authentication(parts, input.digest()?))
    }

    /// Builds the request, runs the session and returns the authentication response.
    ///
    /// # Errors
    /// Any [`SmartIdError`]; see [`SmartIdClient::authenticate`].
    pub async fn authenticate(self) -> SmartIdResult<AuthenticationResult> {
        let client = self.client;
        let request = self.build()?;
        client.authenticate(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ClientConfig, Operation};

    const SHA256_HASH: &str = "0nbgC2fVdLVQFZJdBbmG7oPoElpCYsQMtrY0c0wKYRg=";

    fn client() -> SmartIdClient {
        let config = ClientConfig::new(
            "de305d54-75b4-431b-adb2-eb6b9e546014",
            "BANK123",
            "http://localhost:18089",
        );
        SmartIdClient::new(config).unwrap()
    }

    fn sha256_hash() -> HashableInput {
        HashableInput::from_base64_hash(HashType::Sha256, SHA256_HASH).unwrap()
    }

    fn assert_builder_error(result: SmartIdResult<OperationRequest>) {
        let err = result.unwrap_err();
        assert!(
            matches!(err, SmartIdError::BuilderValidation { .. }),
            "expected BuilderValidation, got {err:?}"
        );
    }

    #[test]
    fn test_each_identity_variant_builds() {
        let client = client();
        let by_document = client
            .certificate()
            .with_document_number("PNOEE-31111111111")
            .build()
            .unwrap();
        assert_eq!(
            by_document.identity(),
            &IdentitySelector::document_number("PNOEE-31111111111")
        );

        let by_parts = client
            .certificate()
            .with_country_code("EE")
            .with_national_identity_number("31111111111")
            .build()
            .unwrap();
        let by_struct = client
            .certificate()
            .with_national_identity(NationalIdentity::new("EE", "31111111111"))
            .build()
            .unwrap();
        assert_eq!(by_parts.identity(), by_struct.identity());
        assert_eq!(by_parts.operation(), Operation::CertificateChoice);
        assert_eq!(by_parts.certificate_level(), CertificateLevel::Advanced);
        assert!(by_parts.digest().is_none());
    }

    #[test]
    fn test_missing_identity_is_rejected() {
        assert_builder_error(client().certificate().build());
        assert_builder_error(client().signature().with_hashable(sha256_hash()).build());
    }

    #[test]
    fn test_two_identity_variants_are_rejected() {
        let client = client();
        assert_builder_error(
            client
                .certificate()
                .with_document_number("PNOEE-31111111111")
                .with_national_identity(NationalIdentity::new("EE", "31111111111"))
                .build(),
        );
        assert_builder_error(
            client
                .authentication()
                .with_document_number("PNOEE-31111111111")
                .with_country_code("EE")
                .with_national_identity_number("31111111111")
                .with_hashable(sha256_hash())
                .build(),
        );
        assert_builder_error(
            client
                .certificate()
                .with_national_identity(NationalIdentity::new("EE", "31111111111"))
                .with_country_code("EE")
                .with_national_identity_number("31111111111")
                .build(),
        );
    }

    #[test]
    fn test_partial_national_identity_is_rejected() {
        assert_builder_error(client().certificate().with_country_code("EE").build());
        assert_builder_error(
            client()
                .certificate()
                .with_national_identity_number("31111111111")
                .build(),
        );
    }

    #[test]
    fn test_each_hash_variant_builds() {
        let client = client();
        let from_data = client
            .signature()
            .with_document_number("PNOEE-31111111111")
            .with_signable_data(b"Hello World!".to_vec())
            .build()
            .unwrap();
        assert_eq!(from_data.digest().unwrap().hash_type(), HashType::Sha512);
        assert_eq!(from_data.verification_code().as_deref(), Some("4664"));

        let from_hash = client
            .authentication()
            .with_document_number("PNOEE-31111111111")
            .with_hashable(sha256_hash())
            .with_certificate_level(CertificateLevel::Qualified)
            .build()
            .unwrap();
        assert_eq!(from_hash.operation(), Operation::Authentication);
        assert_eq!(from_hash.certificate_level(), CertificateLevel::Qualified);
        assert_eq!(from_hash.verification_code().as_deref(), Some("1796"));
    }

    #[test]
    fn test_missing_or_double_hash_is_rejected() {
        let client = client();
        assert_builder_error(
            client
                .signature()
                .with_document_number("PNOEE-31111111111")
                .build(),
        );
        assert_builder_error(
            client
                .signature()
                .with_document_number("PNOEE-31111111111")
                .with_signable_data(b"Hello World!".to_vec())
                .with_hashable(sha256_hash())
                .build(),
        );
    }

    #[test]
    fn test_wrong_digest_length_is_invalid_input() {
        let err = client()
            .signature()
            .with_document_number("PNOEE-31111111111")
            .with_signable_hash(HashType::Sha512, vec![0u8; 32])
            .build()
            .unwrap_err();
        assert!(matches!(err, SmartIdError::InvalidInput { .. }));
    }

    #[test]
    fn test_nonce_and_display_text_are_validated() {
        let client = client();
        let request = client
            .authentication()
            .with_document_number("PNOEE-31111111111")
            .with_hashable(sha256_hash())
            .with_nonce("g9rp4kjca3")
            .with_display_text("Log into internet banking system")
            .build()
            .unwrap();
        assert_eq!(request.nonce().map(Nonce::as_str), Some("g9rp4kjca3"));
        assert_eq!(
            request.display_text(),
            Some("Log into internet banking system")
        );
        assert_eq!(request.relying_party_name(), "BANK123");

        let err = client
            .certificate()
            .with_document_number("PNOEE-31111111111")
            .with_nonce("x".repeat(31))
            .build()
            .unwrap_err();
        let SmartIdError::InvalidInput { attribute, .. } = &err else {
            panic!("unexpected error: {err:?}");
        };
        assert_eq!(attribute, "nonce");

        let err = client
            .signature()
            .with_document_number("PNOEE-31111111111")
            .with_hashable(sha256_hash())
            .with_display_text("x".repeat(61))
            .build()
            .unwrap_err();
        let SmartIdError::InvalidInput { attribute, .. } = &err else {
            panic!("unexpected error: {err:?}");
        };
        assert_eq!(attribute, "display_text");
    }

    #[test]
    fn test_setting_the_same_selector_twice_keeps_the_last_value() {
        let request = client()
            .certificate()
            .with_document_number("PNOEE-1")
            .with_document_number("PNOEE-31111111111")
            .build()
            .unwrap();
        assert_eq!(
            request.identity(),
            &IdentitySelector::document_number("PNOEE-31111111111")
        );
    }
}
