use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha384, Sha512};
use strum::{Display, EnumString};

/// Hash algorithms accepted by the service for signature and authentication sessions.
///
/// Serialized as the wire names `SHA256`, `SHA384` and `SHA512`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, EnumString, Display, Serialize, Deserialize,
)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum HashType {
    /// SHA-256, 32 byte digests.
    Sha256,
    /// SHA-384, 48 byte digests.
    Sha384,
    /// SHA-512, 64 byte digests. Default for data hashed locally.
    #[default]
    Sha512,
}

impl HashType {
    /// Length in bytes of a digest produced by this algorithm.
    #[must_use]
    pub const fn digest_len(&self) -> usize {
        match self {
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }

    /// Name of the signature algorithm the service reports for signatures over this hash,
    /// e.g. `sha256WithRSAEncryption`.
    #[must_use]
    pub const fn signature_algorithm_name(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256WithRSAEncryption",
            Self::Sha384 => "sha384WithRSAEncryption",
            Self::Sha512 => "sha512WithRSAEncryption",
        }
    }

    /// Hashes `data` with this algorithm.
    #[must_use]
    pub fn digest(&self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha256 => Sha256::digest(data).to_vec(),
            Self::Sha384 => Sha384::digest(data).to_vec(),
            Self::Sha512 => Sha512::digest(data).to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_wire_names() {
        assert_eq!(
            serde_json::to_string(&HashType::Sha256).unwrap(),
            "\"SHA256\""
        );
        assert_eq!(
            serde_json::to_string(&HashType::Sha384).unwrap(),
            "\"SHA384\""
        );
        assert_eq!(HashType::from_str("SHA512").unwrap(), HashType::Sha512);
        assert_eq!(HashType::Sha384.to_string(), "SHA384");
        assert!(HashType::from_str("MD5").is_err());
    }

    #[test]
    fn test_digest_lengths_match_algorithm() {
        for hash_type in [HashType::Sha256, HashType::Sha384, HashType::Sha512] {
            assert_eq!(
                hash_type.digest(b"Hello World!").len(),
                hash_type.digest_len()
            );
        }
    }

    #[test]
    fn test_signature_algorithm_name() {
        assert_eq!(
            HashType::Sha512.signature_algorithm_name(),
            "sha512WithRSAEncryption"
        );
        assert_eq!(HashType::default(), HashType::Sha512);
    }
}
