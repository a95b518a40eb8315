//! Data to be signed or authenticated, and the verification code derived from it.

use base64::{engine::general_purpose::STANDARD, Engine};
use sha2::{Digest, Sha256};

use crate::{error::SmartIdError, HashType, SmartIdResult};

/// What the end user is asked to sign: either raw bytes hashed locally, or a hash computed by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum HashableInput {
    /// Raw payload, hashed locally with `hash_type` before submission.
    Data {
        /// The payload bytes.
        data: Vec<u8>,
        /// The algorithm used to hash `data`.
        hash_type: HashType,
    },
    /// A digest computed by the caller.
    Hash {
        /// The algorithm that produced `digest`.
        hash_type: HashType,
        /// The digest bytes. Must be exactly `hash_type.digest_len()` long.
        digest: Vec<u8>,
    },
}

impl HashableInput {
    /// Raw payload hashed with the default algorithm (SHA-512).
    #[must_use]
    pub fn from_data(data: impl Into<Vec<u8>>) -> Self {
        Self::from_data_with(data, HashType::default())
    }

    /// Raw payload hashed with an explicit algorithm.
    #[must_use]
    pub fn from_data_with(data: impl Into<Vec<u8>>, hash_type: HashType) -> Self {
        Self::Data {
            data: data.into(),
            hash_type,
        }
    }

    /// Pre-computed digest bytes.
    #[must_use]
    pub fn from_hash(hash_type: HashType, digest: impl Into<Vec<u8>>) -> Self {
        Self::Hash {
            hash_type,
            digest: digest.into(),
        }
    }

    /// Pre-computed digest in base64.
    ///
    /// # Errors
    /// Returns `InvalidInput` if `hash_in_base64` is not valid standard base64.
    pub fn from_base64_hash(hash_type: HashType, hash_in_base64: &str) -> SmartIdResult<Self> {
        let digest = STANDARD.decode(hash_in_base64).map_err(|e| {
            SmartIdError::invalid_input("hash_in_base64", format!("invalid base64: {e}"))
        })?;
        Ok(Self::from_hash(hash_type, digest))
    }

    /// The algorithm this input is (or will be) hashed with.
    #[must_use]
    pub const fn hash_type(&self) -> HashType {
        match self {
            Self::Data { hash_type, .. } | Self::Hash { hash_type, .. } => *hash_type,
        }
    }

    /// Normalizes the input into a validated digest.
    ///
    /// # Errors
    /// Returns `InvalidInput` if raw data is empty, or if a pre-computed digest does not have
    /// the length of its declared algorithm.
    pub fn digest(&self) -> SmartIdResult<OperationDigest> {
        match self {
            Self::Data { data, hash_type } => {
                if data.is_empty() {
                    return Err(SmartIdError::invalid_input(
                        "data",
                        "data to be signed must not be empty",
                    ));
                }
                Ok(OperationDigest {
                    hash_type: *hash_type,
                    bytes: hash_type.digest(data),
                })
            }
            Self::Hash { hash_type, digest } => {
                if digest.len() != hash_type.digest_len() {
                    return Err(SmartIdError::invalid_input(
                        "digest",
                        format!(
                            "{hash_type} digest must be {} bytes, got {}",
                            hash_type.digest_len(),
                            digest.len()
                        ),
                    ));
                }
                Ok(OperationDigest {
                    hash_type: *hash_type,
                    bytes: digest.clone(),
                })
            }
        }
    }

    /// The code the end user sees on their device for this input. Can be shown before the
    /// request is submitted.
    ///
    /// # Errors
    /// Same as [`HashableInput::digest`].
    pub fn verification_code(&self) -> SmartIdResult<String> {
        Ok(self.digest()?.verification_code())
    }
}

/// A validated digest with the algorithm that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationDigest {
    hash_type: HashType,
    bytes: Vec<u8>,
}

impl OperationDigest {
    /// The hash algorithm.
    #[must_use]
    pub const fn hash_type(&self) -> HashType {
        self.hash_type
    }

    /// The raw digest bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The digest in standard base64, as sent to the service.
    #[must_use]
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// The verification code displayed on the user's device.
    ///
    /// The device derives it from the SHA-256 of the operation digest, so that value is what
    /// gets reduced here.
    #[must_use]
    pub fn verification_code(&self) -> String {
        let [.., high, low]: [u8; 32] = Sha256::digest(&self.bytes).into();
        code_from_trailing_bytes(high, low)
    }
}

/// Reduces a digest to a 4-digit code: the last two bytes as a big-endian `u16`, modulo 10000,
/// zero-padded.
///
/// # Errors
/// Returns `InvalidInput` if `digest` is shorter than two bytes.
pub fn calculate_verification_code(digest: &[u8]) -> SmartIdResult<String> {
    let [.., high, low] = digest else {
        return Err(SmartIdError::invalid_input(
            "digest",
            "at least two bytes are required",
        ));
    };
    Ok(code_from_trailing_bytes(*high, *low))
}

fn code_from_trailing_bytes(high: u8, low: u8) -> String {
    let value = u16::from_be_bytes([high, low]);
    format!("{:04}", value % 10_000)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHA256_HASH: &str = "0nbgC2fVdLVQFZJdBbmG7oPoElpCYsQMtrY0c0wKYRg=";
    const SHA512_HASH: &str =
        "K74MSLkafRuKZ1Ooucvh2xa4Q3nz+R/hFWIShN96SPHNcem+uQ6mFMe9kkJQqp5EaoZnJeaFpl310TmlzRgNyQ==";

    #[test]
    fn test_calculate_verification_code_pads_with_zeros() {
        assert_eq!(
            calculate_verification_code(&[0xAB, 0x00, 0x01]).unwrap(),
            "0001"
        );
        assert_eq!(calculate_verification_code(&[0x00, 0x00]).unwrap(), "0000");
        // 0xFFFF = 65535 -> 5535
        assert_eq!(calculate_verification_code(&[0xFF, 0xFF]).unwrap(), "5535");
        // 0x2710 = 10000 -> 0
        assert_eq!(calculate_verification_code(&[0x27, 0x10]).unwrap(), "0000");
    }

    #[test]
    fn test_calculate_verification_code_rejects_short_digest() {
        let err = calculate_verification_code(&[0x01]).unwrap_err();
        assert!(matches!(err, SmartIdError::InvalidInput { .. }));
    }

    #[test]
    fn test_verification_code_for_data_defaults_to_sha512() {
        let input = HashableInput::from_data(b"Hello World!".to_vec());
        assert_eq!(input.hash_type(), HashType::Sha512);
        assert_eq!(input.verification_code().unwrap(), "4664");
        assert_eq!(input.verification_code().unwrap(), "4664");
    }

    #[test]
    fn test_verification_code_for_precomputed_hashes() {
        let sha256 = HashableInput::from_base64_hash(HashType::Sha256, SHA256_HASH).unwrap();
        assert_eq!(sha256.verification_code().unwrap(), "1796");

        let sha512 = HashableInput::from_base64_hash(HashType::Sha512, SHA512_HASH).unwrap();
        assert_eq!(sha512.verification_code().unwrap(), "4430");
    }

    #[test]
    fn test_operation_code_reduces_sha256_of_digest() {
        let digest = HashableInput::from_data(b"Hello World!".to_vec())
            .digest()
            .unwrap();
        let vc_digest = HashType::Sha256.digest(digest.as_bytes());
        let expected = calculate_verification_code(&vc_digest).unwrap();
        assert_eq!(digest.verification_code(), expected);
        assert_eq!(expected, "4664");

        for hash_type in [HashType::Sha256, HashType::Sha384, HashType::Sha512] {
            let code = HashableInput::from_data_with(b"x".to_vec(), hash_type)
                .verification_code()
                .unwrap();
            assert_eq!(code.len(), 4);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_data_and_precomputed_hash_agree() {
        let data = HashableInput::from_data_with(b"Hello World!".to_vec(), HashType::Sha256);
        let digest = data.digest().unwrap();
        let hash = HashableInput::from_hash(HashType::Sha256, digest.as_bytes().to_vec());
        assert_eq!(hash.digest().unwrap(), digest);
        assert_eq!(
            digest.to_base64(),
            "f4OxZX/x/FO5LcGBSKHWXfwtSx+j1ncoSt3SABJtkGk="
        );
    }

    #[test]
    fn test_digest_length_must_match_algorithm() {
        let input = HashableInput::from_base64_hash(HashType::Sha512, SHA256_HASH).unwrap();
        let err = input.digest().unwrap_err();
        assert!(
            matches!(err, SmartIdError::InvalidInput { attribute, .. } if attribute == "digest")
        );
    }

    #[test]
    fn test_empty_data_is_rejected() {
        let err = HashableInput::from_data(Vec::new())
            .verification_code()
            .unwrap_err();
        assert!(matches!(err, SmartIdError::InvalidInput { attribute, .. } if attribute == "data"));
    }

    #[test]
    fn test_trailing_quote_in_base64_hash_is_rejected() {
        let malformed = format!("{SHA512_HASH}\"");
        let err = HashableInput::from_base64_hash(HashType::Sha512, &malformed).unwrap_err();
        assert!(matches!(err, SmartIdError::InvalidInput { .. }));
    }
}
