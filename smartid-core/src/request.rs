//! Immutable operation requests and the values they are assembled from.

use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{
    error::SmartIdError, hashable::OperationDigest, HashType, IdentitySelector, SmartIdResult,
};

/// Maximum length, in characters, of the text shown on the user's device.
pub const DISPLAY_TEXT_MAX_LEN: usize = 60;

/// The three session-based operations the service offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Operation {
    /// Let the user choose which certificate to use.
    CertificateChoice,
    /// Create a signature over a hash.
    Signature,
    /// Challenge-response authentication.
    Authentication,
}

impl Operation {
    pub(crate) const fn path_prefix(self) -> &'static str {
        match self {
            Self::CertificateChoice => "certificatechoice",
            Self::Signature => "signature",
            Self::Authentication => "authentication",
        }
    }
}

/// Assurance tier of the certificate the operation requires.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumString,
    Display,
    Serialize,
    Deserialize,
)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum CertificateLevel {
    /// Advanced electronic signature certificate. Used when no level is requested.
    #[default]
    Advanced,
    /// Qualified electronic signature certificate.
    Qualified,
}

/// A caller-supplied token that makes otherwise identical requests distinct, so the service
/// does not treat them as replays.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Nonce(String);

impl Nonce {
    /// Maximum nonce length, in characters.
    pub const MAX_LEN: usize = 30;
    const RANDOM_LEN: usize = 10;

    /// Validates and wraps a nonce.
    ///
    /// # Errors
    /// Returns `InvalidInput` unless `value` is 1 to 30 printable ASCII characters.
    pub fn new(value: impl Into<String>) -> SmartIdResult<Self> {
        let value = value.into();
        if value.is_empty() || value.len() > Self::MAX_LEN {
            return Err(SmartIdError::invalid_input(
                "nonce",
                format!("must be between 1 and {} characters", Self::MAX_LEN),
            ));
        }
        if !value.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(SmartIdError::invalid_input(
                "nonce",
                "must only contain printable ASCII characters",
            ));
        }
        Ok(Self(value))
    }

    /// A fresh random alphanumeric nonce.
    #[must_use]
    pub fn random() -> Self {
        let value = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(Self::RANDOM_LEN)
            .map(char::from)
            .collect();
        Self(value)
    }

    /// The nonce value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub(crate) fn validate_display_text(text: &str) -> SmartIdResult<()> {
    let len = text.chars().count();
    if len == 0 || len > DISPLAY_TEXT_MAX_LEN {
        return Err(SmartIdError::invalid_input(
            "display_text",
            format!("must be between 1 and {DISPLAY_TEXT_MAX_LEN} characters, got {len}"),
        ));
    }
    Ok(())
}

/// A fully validated request for one session. Built once by a request builder and consumed
/// by a single submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRequest {
    operation: Operation,
    relying_party_uuid: String,
    relying_party_name: String,
    identity: IdentitySelector,
    certificate_level: CertificateLevel,
    digest: Option<OperationDigest>,
    nonce: Option<Nonce>,
    display_text: Option<String>,
}

/// Fields shared by every operation. Kept separate so builders can assemble it piecewise.
#[derive(Debug, Clone)]
pub(crate) struct RequestParts {
    pub relying_party_uuid: String,
    pub relying_party_name: String,
    pub identity: IdentitySelector,
    pub certificate_level: CertificateLevel,
    pub nonce: Option<Nonce>,
    pub display_text: Option<String>,
}

impl OperationRequest {
    pub(crate) fn certificate_choice(parts: RequestParts) -> Self {
        Self::new(Operation::CertificateChoice, parts, None)
    }

    pub(crate) fn signature(parts: RequestParts, digest: OperationDigest) -> Self {
        Self::new(Operation::Signature, parts, Some(digest))
    }

    pub(crate) fn authentication(parts: RequestParts, digest: OperationDigest) -> Self {
        Self::new(Operation::Authentication, parts, Some(digest))
    }

    fn new(operation: Operation, parts: RequestParts, digest: Option<OperationDigest>) -> Self {
        let RequestParts {
            relying_party_uuid,
            relying_party_name,
            identity,
            certificate_level,
            nonce,
            display_text,
        } = parts;
        Self {
            operation,
            relying_party_uuid,
            relying_party_name,
            identity,
            certificate_level,
            digest,
            nonce,
            display_text,
        }
    }

    /// Which operation this request starts.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        self.operation
    }

    /// The user the request is addressed to.
    #[must_use]
    pub const fn identity(&self) -> &IdentitySelector {
        &self.identity
    }

    /// The required certificate level.
    #[must_use]
    pub const fn certificate_level(&self) -> CertificateLevel {
        self.certificate_level
    }

    /// The digest to be signed. `None` for certificate choice.
    #[must_use]
    pub const fn digest(&self) -> Option<&OperationDigest> {
        self.digest.as_ref()
    }

    /// The nonce, if any.
    #[must_use]
    pub const fn nonce(&self) -> Option<&Nonce> {
        self.nonce.as_ref()
    }

    /// The text shown on the user's device, if any.
    #[must_use]
    pub fn display_text(&self) -> Option<&str> {
        self.display_text.as_deref()
    }

    /// The relying party's UUID.
    #[must_use]
    pub fn relying_party_uuid(&self) -> &str {
        &self.relying_party_uuid
    }

    /// The relying party's display name.
    #[must_use]
    pub fn relying_party_name(&self) -> &str {
        &self.relying_party_name
    }

    /// The verification code the user will be shown. `None` for certificate choice, which
    /// has nothing to verify.
    #[must_use]
    pub fn verification_code(&self) -> Option<String> {
        self.digest.as_ref().map(OperationDigest::verification_code)
    }

    pub(crate) fn body(&self) -> SessionRequestBody<'_> {
        SessionRequestBody {
            relying_party_uuid: &self.relying_party_uuid,
            relying_party_name: &self.relying_party_name,
            certificate_level: self.certificate_level,
            hash: self.digest.as_ref().map(OperationDigest::to_base64),
            hash_type: self.digest.as_ref().map(OperationDigest::hash_type),
            nonce: self.nonce.as_ref().map(Nonce::as_str),
            display_text: self.display_text.as_deref(),
        }
    }
}

/// JSON body posted to start a session.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SessionRequestBody<'a> {
    #[serde(rename = "relyingPartyUUID")]
    relying_party_uuid: &'a str,
    relying_party_name: &'a str,
    certificate_level: CertificateLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hash_type: Option<HashType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    nonce: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_text: Option<&'a str>,
}
