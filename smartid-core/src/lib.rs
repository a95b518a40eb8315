//! `smartid-core` is a client for the Smart-ID relying-party API.
//!
//! A relying party starts a session (certificate choice, signature or authentication) for a
//! user, shows the user a verification code, and polls the session until the user confirms or
//! refuses on their device.
//!
//! ```rust,no_run
//! use smartid_core::{ClientConfig, Environment, HashableInput, SmartIdClient};
//!
//! # async fn run() -> smartid_core::SmartIdResult<()> {
//! let config = ClientConfig::for_environment(
//!     Environment::Demo,
//!     "00000000-0000-0000-0000-000000000000",
//!     "DEMO",
//! );
//! let client = SmartIdClient::new(config)?;
//!
//! let certificate = client
//!     .certificate()
//!     .with_country_code("EE")
//!     .with_national_identity_number("30303039914")
//!     .fetch()
//!     .await?;
//!
//! let request = client
//!     .signature()
//!     .with_document_number(&certificate.document_number)
//!     .with_hashable(HashableInput::from_data(b"Hello World!".to_vec()))
//!     .build()?;
//! println!("verification code: {:?}", request.verification_code());
//! let signature = client.create_signature(&request).await?;
//! # let _ = signature;
//! # Ok(())
//! # }
//! ```
use strum::{Display, EnumString};

/// Public deployments of the relying-party API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
#[strum(serialize_all = "lowercase")]
pub enum Environment {
    /// The demo environment, for integration testing with demo accounts.
    Demo,
    /// The live service.
    Production,
}

impl Environment {
    /// Base URL of the relying-party API in this environment.
    #[must_use]
    pub const fn host_url(self) -> &'static str {
        match self {
            Self::Demo => "https://sid.demo.sk.ee/smart-id-rp/v1/",
            Self::Production => "https://rp-api.smart-id.com/v1/",
        }
    }
}

mod builder;
pub use builder::*;

mod classify;
pub use classify::*;

mod client;
pub use client::*;

mod config;
pub use config::*;

mod error;
pub use error::*;

mod hash_type;
pub use hash_type::*;

mod hashable;
pub use hashable::*;

mod identity;
pub use identity::*;

/// Bridges log records to a foreign logger.
pub mod logger;

mod outcome;
pub use outcome::*;

mod request;
pub use request::*;

mod session;
pub use session::*;

// private modules
mod http_request;

#[cfg(feature = "ffi")]
mod ffi;
#[cfg(feature = "ffi")]
pub use ffi::*;

#[cfg(feature = "ffi")]
uniffi::setup_scaffolding!("smartid_core");
