//! Typed results of the three operations, built from a completed session.

use base64::{engine::general_purpose::STANDARD, Engine};
use x509_cert::{
    der::{oid::ObjectIdentifier, Decode},
    Certificate,
};

use crate::{
    error::SmartIdError,
    hashable::OperationDigest,
    session::{CompletedSession, SessionCertificate, SessionSignature},
    CertificateLevel, HashType, SmartIdResult,
};

/// X.520 `serialNumber` attribute, which carries the document number in the certificate subject.
const SERIAL_NUMBER: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.5");

/// The certificate the user chose.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct CertificateResult {
    /// DER-encoded X.509 certificate.
    pub certificate: Vec<u8>,
    /// The user's document number. Use it to address later signature requests.
    pub document_number: String,
    /// Level of the returned certificate.
    pub certificate_level: CertificateLevel,
}

/// A signature created on the user's device.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct SignatureResult {
    /// Raw signature value.
    pub value: Vec<u8>,
    /// Signature algorithm, e.g. `sha512WithRSAEncryption`.
    pub algorithm_name: String,
}

/// A completed authentication. The caller still has to verify the signature against the
/// certificate and check the certificate's trust chain.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct AuthenticationResult {
    /// Session end result, always `OK` for a returned result.
    pub end_result: String,
    /// The hash that was signed, in base64.
    pub signed_hash_base64: String,
    /// Algorithm of the signed hash.
    pub hash_type: HashType,
    /// Signature value in base64.
    pub signature_value_base64: String,
    /// Signature algorithm, e.g. `sha256WithRSAEncryption`.
    pub algorithm_name: String,
    /// DER-encoded X.509 certificate of the signer.
    pub certificate: Vec<u8>,
    /// Level of the signer's certificate.
    pub certificate_level: CertificateLevel,
    /// The signer's document number, when reported.
    pub document_number: Option<String>,
}

impl CertificateResult {
    pub(crate) fn from_session(session: CompletedSession) -> SmartIdResult<Self> {
        let (certificate, certificate_level) = decode_certificate(session.cert)?;
        let document_number = session.document_number.ok_or_else(|| {
            SmartIdError::unexpected("certificate choice result has no document number")
        })?;
        Ok(Self {
            certificate,
            document_number,
            certificate_level,
        })
    }

    /// Parses the DER certificate.
    ///
    /// # Errors
    /// Returns `UnexpectedResponse` if the service returned bytes that are not a certificate.
    pub fn parse_certificate(&self) -> SmartIdResult<Certificate> {
        parse_certificate(&self.certificate)
    }

    /// The `serialNumber` attribute of the certificate subject, e.g. `PNOEE-31111111111`.
    ///
    /// # Errors
    /// See [`CertificateResult::parse_certificate`].
    pub fn subject_serial_number(&self) -> SmartIdResult<Option<String>> {
        subject_serial_number(&self.parse_certificate()?)
    }
}

impl SignatureResult {
    pub(crate) fn from_session(session: CompletedSession) -> SmartIdResult<Self> {
        let signature = require_signature(session.signature)?;
        let value = decode_base64("signature", &signature.value)?;
        Ok(Self {
            value,
            algorithm_name: signature.algorithm,
        })
    }

    /// The signature value in base64.
    #[must_use]
    pub fn value_base64(&self) -> String {
        STANDARD.encode(&self.value)
    }
}

impl AuthenticationResult {
    pub(crate) fn from_session(
        session: CompletedSession,
        digest: &OperationDigest,
    ) -> SmartIdResult<Self> {
        let signature = require_signature(session.signature)?;
        // Reject values that are not base64 before handing them on.
        decode_base64("signature", &signature.value)?;
        let (certificate, certificate_level) = decode_certificate(session.cert)?;
        Ok(Self {
            end_result: "OK".to_string(),
            signed_hash_base64: session
                .signed_hash_in_base64
                .unwrap_or_else(|| digest.to_base64()),
            hash_type: digest.hash_type(),
            signature_value_base64: signature.value,
            algorithm_name: signature.algorithm,
            certificate,
            certificate_level,
            document_number: session.document_number,
        })
    }

    /// Parses the signer's DER certificate.
    ///
    /// # Errors
    /// Returns `UnexpectedResponse` if the service returned bytes that are not a certificate.
    pub fn parse_certificate(&self) -> SmartIdResult<Certificate> {
        parse_certificate(&self.certificate)
    }

    /// The `serialNumber` attribute of the signer's certificate subject.
    ///
    /// # Errors
    /// See [`AuthenticationResult::parse_certificate`].
    pub fn subject_serial_number(&self) -> SmartIdResult<Option<String>> {
        subject_serial_number(&self.parse_certificate()?)
    }
}

fn require_signature(signature: Option<SessionSignature>) -> SmartIdResult<SessionSignature> {
    signature.ok_or_else(|| SmartIdError::unexpected("completed session has no signature"))
}

fn decode_certificate(
    cert: Option<SessionCertificate>,
) -> SmartIdResult<(Vec<u8>, CertificateLevel)> {
    let cert =
        cert.ok_or_else(|| SmartIdError::unexpected("completed session has no certificate"))?;
    let der = decode_base64("certificate", &cert.value)?;
    let level = cert
        .certificate_level
        .parse::<CertificateLevel>()
        .map_err(|_| {
            SmartIdError::unexpected(format!(
                "unknown certificate level `{}`",
                cert.certificate_level
            ))
        })?;
    Ok((der, level))
}

fn decode_base64(field: &str, value: &str) -> SmartIdResult<Vec<u8>> {
    STANDARD
        .decode(value)
        .map_err(|e| SmartIdError::unexpected(format!("{field} is not valid base64: {e}")))
}

fn parse_certificate(der: &[u8]) -> SmartIdResult<Certificate> {
    Certificate::from_der(der)
        .map_err(|e| SmartIdError::unexpected(format!("invalid certificate: {e}")))
}

fn subject_serial_number(certificate: &Certificate) -> SmartIdResult<Option<String>> {
    let subject = &certificate.tbs_certificate.subject;
    for rdn in &subject.0 {
        for attribute in rdn.0.iter() {
            if attribute.oid == SERIAL_NUMBER {
                let value = std::str::from_utf8(attribute.value.value()).map_err(|e| {
                    SmartIdError::unexpected(format!("subject serialNumber is not text: {e}"))
                })?;
                return Ok(Some(value.to_string()));
            }
        }
    }
    Ok(None)
}
