// # HTTP IP Source
//
// This crate provides an HTTP-based IP source for the DDNS reconciler.
//
// ## Behavior
//
// Fetches the body of an IP-echo endpoint (e.g. ipinfo.io/ip, api.ipify.org)
// once per call and returns it verbatim. The body is not trimmed, parsed or
// checked against the HTTP status: whatever the endpoint says is the IP.
// The raw bytes are decoded as UTF-8 regardless of any charset label, and a
// leading byte-order mark is kept.
// Only transport-level failures (connect, timeout, body read) are errors; their
// message carries the full cause chain (e.g. "...: Connection refused").

use ddns_core::traits::IpSource;
use ddns_core::{Error, Result};
use std::time::Duration;

/// HTTP echo-endpoint IP source
#[derive(Debug)]
pub struct HttpIpSource {
    /// URL to fetch IP from
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a new HTTP IP source
    ///
    /// # Parameters
    ///
    /// - `url`: URL to fetch IP from (e.g., "https://ipinfo.io/ip")
    /// - `timeout`: Upper bound for the whole request
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// Endpoint this source queries
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<String> {
        tracing::debug!("Fetching public IP from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::ip_source(error_chain(&e)))?;

        if !response.status().is_success() {
            tracing::warn!(
                "IP endpoint {} answered {}, using body anyway",
                self.url,
                response.status()
            );
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::ip_source(error_chain(&e)))?;

        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Render an error and each of its sources, joined with `": "`
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        // Some layers already embed their cause in their own Display
        if !message.ends_with(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve exactly one raw HTTP response and return the endpoint URL
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        serve_once_as(status_line, "text/plain", body).await
    }

    /// Like `serve_once`, with an explicit Content-Type header
    async fn serve_once_as(
        status_line: &'static str,
        content_type: &'static str,
        body: &'static str,
    ) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                content_type,
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        });

        format!("http://{}/ip", addr)
    }

    #[tokio::test]
    async fn returns_body_verbatim() {
        let url = serve_once("200 OK", "203.0.113.5").await;
        let source = HttpIpSource::new(url, Duration::from_secs(5)).unwrap();

        assert_eq!(source.current().await.unwrap(), "203.0.113.5");
    }

    #[tokio::test]
    async fn does_not_trim_whitespace() {
        let url = serve_once("200 OK", "203.0.113.5\n").await;
        let source = HttpIpSource::new(url, Duration::from_secs(5)).unwrap();

        assert_eq!(source.current().await.unwrap(), "203.0.113.5\n");
    }

    #[tokio::test]
    async fn error_status_body_is_still_returned() {
        let url = serve_once("429 Too Many Requests", "Rate limit exceeded").await;
        let source = HttpIpSource::new(url, Duration::from_secs(5)).unwrap();

        assert_eq!(source.current().await.unwrap(), "Rate limit exceeded");
    }

    #[tokio::test]
    async fn transport_failure_is_ip_source_error() {
        // Bind then drop to get a port nobody listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let source = HttpIpSource::new(format!("http://{}/ip", addr), Duration::from_secs(5)).unwrap();
        let err = source.current().await.unwrap_err();

        let Error::IpSource(message) = &err else {
            panic!("expected IpSource, got {:?}", err);
        };
        assert!(message.starts_with("error sending request"), "got {:?}", message);
        assert!(
            message.to_lowercase().contains("connection refused"),
            "cause should be included, got {:?}",
            message
        );
    }

    #[tokio::test]
    async fn keeps_leading_byte_order_mark() {
        let url = serve_once("200 OK", "\u{FEFF}203.0.113.5").await;
        let source = HttpIpSource::new(url, Duration::from_secs(5)).unwrap();

        assert_eq!(source.current().await.unwrap(), "\u{FEFF}203.0.113.5");
    }

    #[tokio::test]
    async fn ignores_charset_label_and_decodes_utf8() {
        let url = serve_once_as("200 OK", "text/plain; charset=iso-8859-1", "203.0.113.5 é").await;
        let source = HttpIpSource::new(url, Duration::from_secs(5)).unwrap();

        assert_eq!(source.current().await.unwrap(), "203.0.113.5 é");
    }

    #[derive(Debug)]
    struct Layer(&'static str, Option<Box<Layer>>);

    impl std::fmt::Display for Layer {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(self.0)
        }
    }

    impl std::error::Error for Layer {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            self.1.as_deref().map(|l| l as &(dyn std::error::Error + 'static))
        }
    }

    #[test]
    fn error_chain_joins_every_cause() {
        let err = Layer(
            "error sending request",
            Some(Box::new(Layer(
                "client error (Connect)",
                Some(Box::new(Layer("Connection refused (os error 111)", None))),
            ))),
        );

        assert_eq!(
            error_chain(&err),
            "error sending request: client error (Connect): Connection refused (os error 111)"
        );
    }

    #[test]
    fn describe_names_endpoint() {
        let source = HttpIpSource::new("https://ipinfo.io/ip", Duration::from_secs(5)).unwrap();
        assert_eq!(source.describe(), "https://ipinfo.io/ip");
        assert_eq!(source.url(), "https://ipinfo.io/ip");
    }
}
