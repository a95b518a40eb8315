use serde::{Deserialize, Serialize};

/// A person identified by the country that issued their national identity number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct NationalIdentity {
    /// ISO 3166-1 alpha-2 country code, e.g. `EE`.
    pub country_code: String,
    /// The national identity number (personal code).
    pub national_identity_number: String,
}

impl NationalIdentity {
    /// Creates a new national identity.
    #[must_use]
    pub fn new(
        country_code: impl Into<String>,
        national_identity_number: impl Into<String>,
    ) -> Self {
        Self {
            country_code: country_code.into(),
            national_identity_number: national_identity_number.into(),
        }
    }
}

/// Who the operation is addressed to. Each variant resolves to a different resource path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum IdentitySelector {
    /// A Smart-ID document number, e.g. `PNOEE-31111111111`.
    DocumentNumber {
        /// The document number.
        document_number: String,
    },
    /// A national identity (`pno/<country>/<id>` on the wire).
    NationalIdentity {
        /// The national identity.
        identity: NationalIdentity,
    },
}

impl IdentitySelector {
    /// Selects by document number.
    #[must_use]
    pub fn document_number(document_number: impl Into<String>) -> Self {
        Self::DocumentNumber {
            document_number: document_number.into(),
        }
    }

    /// Selects by country code and national identity number.
    #[must_use]
    pub fn national_identity(
        country_code: impl Into<String>,
        national_identity_number: impl Into<String>,
    ) -> Self {
        Self::NationalIdentity {
            identity: NationalIdentity::new(country_code, national_identity_number),
        }
    }

    /// The path segments identifying the user, without the operation prefix.
    pub(crate) fn resource_segments(&self) -> Vec<&str> {
        match self {
            Self::DocumentNumber { document_number } => vec!["document", document_number.as_str()],
            Self::NationalIdentity { identity } => vec![
                "pno",
                identity.country_code.as_str(),
                identity.national_identity_number.as_str(),
            ],
        }
    }

    pub(crate) const fn kind(&self) -> &'static str {
        match self {
            Self::DocumentNumber { .. } => "document number",
            Self::NationalIdentity { .. } => "national identity",
        }
    }
}

impl From<NationalIdentity> for IdentitySelector {
    fn from(identity: NationalIdentity) -> Self {
        Self::NationalIdentity { identity }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_paths() {
        assert_eq!(
            IdentitySelector::document_number("PNOEE-31111111111")
                .resource_segments()
                .join("/"),
            "document/PNOEE-31111111111"
        );
        assert_eq!(
            IdentitySelector::national_identity("EE", "31111111111")
                .resource_segments()
                .join("/"),
            "pno/EE/31111111111"
        );
    }

    #[test]
    fn test_from_national_identity() {
        let selector: IdentitySelector = NationalIdentity::new("LT", "30303039914").into();
        assert_eq!(selector.kind(), "national identity");
        assert_eq!(selector.resource_segments(), ["pno", "LT", "30303039914"]);
    }
}
