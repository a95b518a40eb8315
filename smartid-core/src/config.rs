use std::{collections::HashMap, time::Duration};

use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Url,
};
use uuid::Uuid;

use crate::{error::SmartIdError, Environment, SmartIdResult};

const DEFAULT_POLLING_SLEEP: Duration = Duration::from_secs(1);
const DEFAULT_SOCKET_OPEN: Duration = Duration::from_secs(1);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything a client needs to talk to the service on behalf of one relying party.
///
/// This is a plain value: each client owns its copy, nothing is shared or mutated globally.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct ClientConfig {
    /// The relying party's UUID, as registered with the service.
    pub relying_party_uuid: String,
    /// The relying party's display name, as registered with the service.
    pub relying_party_name: String,
    /// Base URL of the relying-party API, e.g. `https://rp-api.smart-id.com/v1/`.
    pub host_url: String,
    /// How long to wait between two status queries while a session is running.
    pub polling_sleep: Duration,
    /// How long the service may hold a status query open before answering `RUNNING`.
    pub session_status_socket_open: Duration,
    /// Client-side timeout for a single HTTP request. Must exceed `session_status_socket_open`.
    pub request_timeout: Duration,
    /// Extra headers sent with every request.
    pub headers: HashMap<String, String>,
    /// How many times a request is re-sent after a failure to connect. Other failures are never
    /// retried.
    pub transport_retries: u32,
}

impl ClientConfig {
    /// Creates a config with default timings.
    #[must_use]
    pub fn new(
        relying_party_uuid: impl Into<String>,
        relying_party_name: impl Into<String>,
        host_url: impl Into<String>,
    ) -> Self {
        Self {
            relying_party_uuid: relying_party_uuid.into(),
            relying_party_name: relying_party_name.into(),
            host_url: host_url.into(),
            polling_sleep: DEFAULT_POLLING_SLEEP,
            session_status_socket_open: DEFAULT_SOCKET_OPEN,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            headers: HashMap::new(),
            transport_retries: 0,
        }
    }

    /// Creates a config pointing at one of the public service environments.
    #[must_use]
    pub fn for_environment(
        environment: Environment,
        relying_party_uuid: impl Into<String>,
        relying_party_name: impl Into<String>,
    ) -> Self {
        Self::new(
            relying_party_uuid,
            relying_party_name,
            environment.host_url(),
        )
    }

    /// Sets the sleep between status queries.
    #[must_use]
    pub fn with_polling_sleep(mut self, polling_sleep: Duration) -> Self {
        self.polling_sleep = polling_sleep;
        self
    }

    /// Sets how long the service may hold each status query open.
    #[must_use]
    pub fn with_session_status_socket_open(mut self, socket_open: Duration) -> Self {
        self.session_status_socket_open = socket_open;
        self
    }

    /// Sets the client-side timeout for a single HTTP request.
    #[must_use]
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Adds a header sent with every request.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Sets how many times a request is re-sent after a connection failure.
    #[must_use]
    pub fn with_transport_retries(mut self, transport_retries: u32) -> Self {
        self.transport_retries = transport_retries;
        self
    }

    /// Checks the config and returns the parsed host URL.
    ///
    /// # Errors
    /// Returns `InvalidInput` for a non-UUID relying-party id, an empty relying-party name, an
    /// unparsable host URL, invalid header names or values, or a request timeout that does not
    /// exceed the socket-open duration.
    pub fn validate(&self) -> SmartIdResult<Url> {
        Uuid::parse_str(&self.relying_party_uuid)
            .map_err(|e| SmartIdError::invalid_input("relying_party_uuid", e.to_string()))?;

        if self.relying_party_name.trim().is_empty() {
            return Err(SmartIdError::invalid_input(
                "relying_party_name",
                "must not be empty",
            ));
        }

        let host_url = Url::parse(&self.host_url)
            .map_err(|e| SmartIdError::invalid_input("host_url", e.to_string()))?;
        if host_url.cannot_be_a_base() {
            return Err(SmartIdError::invalid_input(
                "host_url",
                "must be a base URL",
            ));
        }

        if self.request_timeout <= self.session_status_socket_open {
            return Err(SmartIdError::invalid_input(
                "request_timeout",
                "must be longer than session_status_socket_open",
            ));
        }

        self.header_map()?;
        Ok(host_url)
    }

    pub(crate) fn header_map(&self) -> SmartIdResult<HeaderMap> {
        let mut headers = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| SmartIdError::invalid_input("headers", e.to_string()))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| SmartIdError::invalid_input("headers", e.to_string()))?;
            headers.insert(name, value);
        }
        Ok(headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RP_UUID: &str = "de305d54-75b4-431b-adb2-eb6b9e546014";

    #[test]
    fn test_defaults() {
        let config = ClientConfig::for_environment(Environment::Demo, RP_UUID, "DEMO");
        assert_eq!(config.host_url, "https://sid.demo.sk.ee/smart-id-rp/v1/");
        assert_eq!(config.polling_sleep, Duration::from_secs(1));
        assert_eq!(config.session_status_socket_open, Duration::from_secs(1));
        assert_eq!(config.transport_retries, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_invalid_relying_party_uuid() {
        let config = ClientConfig::new("not-a-uuid", "BANK123", "https://example.com/");
        let err = config.validate().unwrap_err();
        let SmartIdError::InvalidInput { attribute, .. } = &err else {
            panic!("unexpected error: {err:?}");
        };
        assert_eq!(attribute, "relying_party_uuid");
    }

    #[test]
    fn test_rejects_empty_relying_party_name() {
        let config = ClientConfig::new(RP_UUID, " ", "https://example.com/");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_host_url() {
        let config = ClientConfig::new(RP_UUID, "BANK123", "not a url");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_request_timeout_must_exceed_socket_open() {
        let config = ClientConfig::new(RP_UUID, "BANK123", "https://example.com/")
            .with_session_status_socket_open(Duration::from_secs(30))
            .with_request_timeout(Duration::from_secs(30));
        let err = config.validate().unwrap_err();
        let SmartIdError::InvalidInput { attribute, .. } = &err else {
            panic!("unexpected error: {err:?}");
        };
        assert_eq!(attribute, "request_timeout");
    }

    #[test]
    fn test_header_hook() {
        let config = ClientConfig::new(RP_UUID, "BANK123", "https://example.com/")
            .with_header("custom-header", "Hi!");
        let headers = config.header_map().unwrap();
        assert_eq!(headers.get("custom-header").unwrap(), "Hi!");

        let config = config.with_header("bad header", "x");
        assert!(config.validate().is_err());
    }
}
