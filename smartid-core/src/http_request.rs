use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use reqwest::{header::HeaderMap, Method, RequestBuilder, Response, Url};

use crate::{error::SmartIdError, ClientConfig, SmartIdResult};

/// A thin wrapper on the HTTP client. Applies the configured timeout, extra headers and
/// user-agent to every request, and optionally re-sends requests that failed to connect.
///
/// HTTP statuses are never retried here; they are handed back for classification.
#[derive(Debug, Clone)]
pub(crate) struct Request {
    client: reqwest::Client,
    timeout: Duration,
    headers: HeaderMap,
    max_retries: u32,
}

impl Request {
    /// Initializes a new `Request` on top of an existing HTTP client.
    pub(crate) fn new(client: reqwest::Client, config: &ClientConfig) -> SmartIdResult<Self> {
        Ok(Self {
            client,
            timeout: config.request_timeout,
            headers: config.header_map()?,
            max_retries: config.transport_retries,
        })
    }

    /// Creates a request builder with defaults applied.
    fn req(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .timeout(self.timeout)
            .headers(self.headers.clone())
            .header(
                "User-Agent",
                format!("smartid-core/{}", env!("CARGO_PKG_VERSION")),
            )
    }

    /// Creates a GET request builder with defaults applied.
    pub(crate) fn get(&self, url: Url) -> RequestBuilder {
        self.req(Method::GET, url)
    }

    /// Creates a POST request builder with defaults applied.
    pub(crate) fn post(&self, url: Url) -> RequestBuilder {
        self.req(Method::POST, url)
    }

    /// Sends a request built by `get`/`post`. Connection failures are re-sent up to
    /// `transport_retries` times; everything else is returned as-is.
    pub(crate) async fn handle(&self, request_builder: RequestBuilder) -> SmartIdResult<Response> {
        if self.max_retries == 0 {
            return execute_request_builder(request_builder)
                .await
                .map_err(Into::into);
        }

        let Some(template) = request_builder.try_clone() else {
            return execute_request_builder(request_builder)
                .await
                .map_err(Into::into);
        };

        let backoff = ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(200))
            .with_max_delay(Duration::from_secs(2))
            .with_max_times(self.max_retries as usize);

        (|| async {
            let request_builder = template.try_clone().ok_or_else(|| {
                RequestHandleError::permanent(
                    "<unknown>".to_string(),
                    "request cannot be retried because it is not cloneable".to_string(),
                )
            })?;
            execute_request_builder(request_builder).await
        })
        .retry(backoff)
        .when(RequestHandleError::is_retryable)
        .notify(|err: &RequestHandleError, delay: Duration| {
            log::debug!("retrying {} in {delay:?}: {}", err.url, err.error);
        })
        .await
        .map_err(Into::into)
    }
}

#[derive(Debug)]
struct RequestHandleError {
    url: String,
    error: String,
    retryable: bool,
}

impl RequestHandleError {
    const fn retryable(url: String, error: String) -> Self {
        Self {
            url,
            error,
            retryable: true,
        }
    }

    const fn permanent(url: String, error: String) -> Self {
        Self {
            url,
            error,
            retryable: false,
        }
    }

    const fn is_retryable(&self) -> bool {
        self.retryable
    }
}

impl From<RequestHandleError> for SmartIdError {
    fn from(value: RequestHandleError) -> Self {
        Self::Transport {
            url: value.url,
            error: value.error,
        }
    }
}

async fn execute_request_builder(
    request_builder: RequestBuilder,
) -> Result<Response, RequestHandleError> {
    let (client, request) = request_builder.build_split();
    let request = request.map_err(|err| {
        RequestHandleError::permanent(
            err.url()
                .map_or_else(|| "<unknown>".to_string(), ToString::to_string),
            format!("request build failed: {err}"),
        )
    })?;
    let url = request.url().to_string();

    match client.execute(request).await {
        Ok(resp) => Ok(resp),
        Err(err) if err.is_connect() => Err(RequestHandleError::retryable(
            url,
            format!("connect error: {err}"),
        )),
        Err(err) if err.is_timeout() => Err(RequestHandleError::permanent(
            url,
            format!("request timed out: {err}"),
        )),
        Err(err) => Err(RequestHandleError::permanent(
            url,
            format!("request failed: {err}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RP_UUID: &str = "de305d54-75b4-431b-adb2-eb6b9e546014";

    #[tokio::test]
    async fn test_applies_configured_headers() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/ping")
            .match_header("custom-header", "Hello?!")
            .match_header(
                "user-agent",
                mockito::Matcher::Regex("^smartid-core/".to_string()),
            )
            .with_status(200)
            .create_async()
            .await;

        let config = ClientConfig::new(RP_UUID, "BANK123", server.url())
            .with_header("custom-header", "Hello?!");
        let request = Request::new(reqwest::Client::new(), &config).unwrap();
        let url = Url::parse(&format!("{}/ping", server.url())).unwrap();

        let response = request.handle(request.get(url)).await.unwrap();
        assert_eq!(response.status().as_u16(), 200);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_statuses_are_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/busy")
            .with_status(503)
            .expect(1)
            .create_async()
            .await;

        let config = ClientConfig::new(RP_UUID, "BANK123", server.url()).with_transport_retries(3);
        let request = Request::new(reqwest::Client::new(), &config).unwrap();
        let url = Url::parse(&format!("{}/busy", server.url())).unwrap();

        let response = request.handle(request.post(url)).await.unwrap();
        assert_eq!(response.status().as_u16(), 503);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_connection_failure_is_a_transport_error() {
        // Nothing listens on port 9 on test machines.
        let config =
            ClientConfig::new(RP_UUID, "BANK123", "http://127.0.0.1:9").with_transport_retries(1);
        let request = Request::new(reqwest::Client::new(), &config).unwrap();
        let url = Url::parse("http://127.0.0.1:9/session/x").unwrap();

        let err = request.handle(request.get(url)).await.unwrap_err();
        assert!(matches!(err, SmartIdError::Transport { url, .. } if url.contains("/session/x")));
    }
}
