//! HTTP transport for the i2b2 proxy
//!
//! Posts the request document as `text/xml` to the configured proxy URL
//! with reqwest. Transient faults (connection failures, timeouts, 5xx) are
//! retried with exponential backoff; the request body, and therefore the
//! message id, is the same on every attempt.

use super::transport::{random_message_id, ResponseDocument, XmlPostSupport};
use crate::config::{RetryConfig, ServiceConfig};
use crate::domain::{I2b2Error, Result, TransportError};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, ClientBuilder, StatusCode};
use std::time::Duration;
use tokio::sync::watch;

/// [`XmlPostSupport`] over HTTP(S)
///
/// # Example
///
/// ```no_run
/// use i2b2_pdo::adapters::HttpXmlPostSupport;
/// use i2b2_pdo::config::ServiceConfig;
///
/// # fn example() -> i2b2_pdo::domain::Result<()> {
/// let transport = HttpXmlPostSupport::new(&ServiceConfig::default())?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpXmlPostSupport {
    client: Client,
    proxy_url: String,
    retry: RetryConfig,
    shutdown: Option<watch::Receiver<bool>>,
}

impl HttpXmlPostSupport {
    /// Builds the HTTP client from the service configuration
    ///
    /// # Errors
    ///
    /// Returns [`I2b2Error::Configuration`] if the TLS backend cannot be
    /// initialized.
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let mut builder = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds));

        if !config.tls_verify {
            tracing::warn!("TLS certificate verification is disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder.build().map_err(|e| {
            I2b2Error::Configuration(format!("Failed to build HTTP client: {e}"))
        })?;

        Ok(Self {
            client,
            proxy_url: config.proxy_url.clone(),
            retry: config.retry.clone(),
            shutdown: None,
        })
    }

    /// Cancels in-flight requests and pending retries once the watched
    /// value becomes `true`
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// URL requests are posted to
    pub fn proxy_url(&self) -> &str {
        &self.proxy_url
    }

    async fn send_once(&self, xml: &str) -> std::result::Result<ResponseDocument, TransportError> {
        let response = self
            .client
            .post(&self.proxy_url)
            .header(CONTENT_TYPE, "text/xml; charset=UTF-8")
            .body(xml.to_string())
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_status(status, body));
        }

        let body = response
            .text()
            .await
            .map_err(|e| TransportError::MalformedResponse(e.to_string()))?;

        ResponseDocument::parse(body)
    }

    /// Runs `send_once`, racing it against the shutdown signal if one is set
    async fn attempt(
        &self,
        xml: &str,
        shutdown: &mut Option<watch::Receiver<bool>>,
    ) -> std::result::Result<ResponseDocument, TransportError> {
        match shutdown {
            Some(rx) => tokio::select! {
                biased;
                _ = shutdown_requested(rx) => Err(cancelled()),
                result = self.send_once(xml) => result,
            },
            None => self.send_once(xml).await,
        }
    }
}

#[async_trait]
impl XmlPostSupport for HttpXmlPostSupport {
    async fn post_xml_request(&self, xml: &str) -> std::result::Result<ResponseDocument, TransportError> {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut shutdown = self.shutdown.clone();
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.attempt(xml, &mut shutdown).await {
                Ok(document) => {
                    tracing::debug!(attempt, bytes = document.as_str().len(), "Received PDO response");
                    return Ok(document);
                }
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    let delay_ms = self.retry.delay_ms(attempt);
                    crate::log_retry_attempt!(attempt, max_attempts, delay_ms, e);

                    let delay = tokio::time::sleep(Duration::from_millis(delay_ms));
                    match shutdown.as_mut() {
                        Some(rx) => tokio::select! {
                            biased;
                            _ = shutdown_requested(rx) => return Err(cancelled()),
                            _ = delay => {}
                        },
                        None => delay.await,
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn generate_message_id(&self) -> String {
        random_message_id()
    }
}

/// Resolves once the shutdown flag is set; never resolves if the sender
/// is dropped without setting it
async fn shutdown_requested(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow() {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

fn cancelled() -> TransportError {
    TransportError::Cancelled("shutdown requested".to_string())
}

fn map_request_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(err.to_string())
    } else {
        TransportError::ConnectionFailed(err.to_string())
    }
}

fn map_status(status: StatusCode, body: String) -> TransportError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            TransportError::AuthenticationFailed(format!("{status}: {body}"))
        }
        s if s.is_server_error() => TransportError::ServerError {
            status: s.as_u16(),
            message: body,
        },
        s => TransportError::ClientError {
            status: s.as_u16(),
            message: body,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(proxy_url: String) -> ServiceConfig {
        ServiceConfig {
            proxy_url,
            timeout_seconds: 5,
            retry: RetryConfig {
                max_attempts: 3,
                initial_delay_ms: 1,
                max_delay_ms: 5,
                backoff_multiplier: 2.0,
            },
            ..ServiceConfig::default()
        }
    }

    #[tokio::test]
    async fn test_post_returns_document() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/index.php")
            .match_header("content-type", "text/xml; charset=UTF-8")
            .match_body(mockito::Matcher::Regex("<request/>".to_string()))
            .with_status(200)
            .with_header("content-type", "text/xml")
            .with_body("<response><ok/></response>")
            .create_async()
            .await;

        let transport =
            HttpXmlPostSupport::new(&config(format!("{}/index.php", server.url()))).unwrap();
        let doc = transport.post_xml_request("<request/>").await.unwrap();

        assert_eq!(doc.as_str(), "<response><ok/></response>");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_errors_are_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/index.php")
            .with_status(503)
            .with_body("unavailable")
            .expect(3)
            .create_async()
            .await;

        let transport =
            HttpXmlPostSupport::new(&config(format!("{}/index.php", server.url()))).unwrap();
        let err = transport.post_xml_request("<request/>").await.unwrap_err();

        assert!(matches!(err, TransportError::ServerError { status: 503, .. }));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/index.php")
            .with_status(400)
            .with_body("bad request")
            .expect(1)
            .create_async()
            .await;

        let transport =
            HttpXmlPostSupport::new(&config(format!("{}/index.php", server.url()))).unwrap();
        let err = transport.post_xml_request("<request/>").await.unwrap_err();

        match err {
            TransportError::ClientError { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "bad request");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_authentication_failed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/index.php")
            .with_status(401)
            .create_async()
            .await;

        let transport =
            HttpXmlPostSupport::new(&config(format!("{}/index.php", server.url()))).unwrap();
        let err = transport.post_xml_request("<request/>").await.unwrap_err();
        assert!(matches!(err, TransportError::AuthenticationFailed(_)));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/index.php")
            .with_status(200)
            .with_body("<html><body>proxy error")
            .create_async()
            .await;

        let transport =
            HttpXmlPostSupport::new(&config(format!("{}/index.php", server.url()))).unwrap();
        let err = transport.post_xml_request("<request/>").await.unwrap_err();
        assert!(matches!(err, TransportError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let mut cfg = config("http://127.0.0.1:1/index.php".to_string());
        cfg.retry = RetryConfig::disabled();
        let transport = HttpXmlPostSupport::new(&cfg).unwrap();

        let err = transport.post_xml_request("<request/>").await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_shutdown_cancels_request() {
        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();

        let transport = HttpXmlPostSupport::new(&config("http://127.0.0.1:1/index.php".to_string()))
            .unwrap()
            .with_shutdown(rx);

        let err = transport.post_xml_request("<request/>").await.unwrap_err();
        assert!(matches!(err, TransportError::Cancelled(_)));
    }

    #[test]
    fn test_generate_message_id() {
        let transport = HttpXmlPostSupport::new(&ServiceConfig::default()).unwrap();
        assert_ne!(transport.generate_message_id(), transport.generate_message_id());
        assert_eq!(transport.proxy_url(), "http://localhost/webclient/index.php");
    }
}
