//! Minimal HTTP/1.1 JSON client over plain TCP or TLS.
//!
//! Every call opens a fresh connection, performs one request, and drops
//! the connection. There is no pooling, retry, or redirect handling.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::header::{ACCEPT, CONTENT_TYPE, HOST, USER_AGENT};
use http::{Method, Request, StatusCode, Uri};
use http_body_util::{BodyExt, Full};
use hyper_util::rt::TokioIo;
use rustls::pki_types::ServerName;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tracing::debug;

const USER_AGENT_VALUE: &str = concat!("flop-client/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("connect to {addr} failed: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("tls error: {0}")]
    Tls(String),

    #[error("http error: {0}")]
    Http(#[from] hyper::Error),

    #[error("failed to build request: {0}")]
    Request(#[from] http::Error),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

/// A parsed service base URL, e.g. `https://bridge.example.org/v2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    scheme: Scheme,
    host: String,
    port: u16,
    base_path: String,
}

impl Endpoint {
    pub fn parse(url: &str) -> Result<Self, TransportError> {
        let invalid = |reason: &str| TransportError::InvalidUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        };

        let uri: Uri = url.trim().parse().map_err(|_| invalid("not a valid uri"))?;
        let scheme = match uri.scheme_str().map(str::to_ascii_lowercase).as_deref() {
            Some("http") => Scheme::Http,
            Some("https") => Scheme::Https,
            Some(_) => return Err(invalid("scheme must be http or https")),
            None => return Err(invalid("missing scheme")),
        };
        let host = uri
            .host()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| invalid("missing host"))?
            .to_string();
        let port = uri.port_u16().unwrap_or(match scheme {
            Scheme::Http => 80,
            Scheme::Https => 443,
        });
        let base_path = uri.path().trim_end_matches('/').to_string();

        Ok(Self {
            scheme,
            host,
            port,
            base_path,
        })
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Host without IPv6 brackets, suitable for DNS and TLS SNI.
    pub fn host(&self) -> &str {
        self.host.trim_start_matches('[').trim_end_matches(']')
    }

    /// Value for the `Host` header; the port is omitted when it is the default.
    pub fn host_header(&self) -> String {
        let default_port = match self.scheme {
            Scheme::Http => 80,
            Scheme::Https => 443,
        };
        if self.port == default_port {
            self.host.clone()
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// Origin-form request target for `path` under the base path.
    pub fn request_path(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            if self.base_path.is_empty() {
                "/".to_string()
            } else {
                self.base_path.clone()
            }
        } else {
            format!("{}/{path}", self.base_path)
        }
    }
}

/// Status and raw body of one HTTP exchange.
#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: StatusCode,
    pub body: Bytes,
}

/// Sends JSON POST requests, optionally bounded by a timeout.
#[derive(Clone)]
pub struct HttpTransport {
    tls: Arc<rustls::ClientConfig>,
    timeout: Option<Duration>,
}

impl HttpTransport {
    /// Create a transport that verifies TLS peers against the Mozilla root store.
    pub fn new(timeout: Option<Duration>) -> Result<Self, TransportError> {
        let mut root_store = rustls::RootCertStore::empty();
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

        let config = rustls::ClientConfig::builder_with_provider(
            rustls::crypto::ring::default_provider().into(),
        )
        .with_safe_default_protocol_versions()
        .map_err(|e| TransportError::Tls(format!("protocol version error: {e}")))?
        .with_root_certificates(root_store)
        .with_no_client_auth();

        Ok(Self::with_tls_config(Arc::new(config), timeout))
    }

    /// Create a transport from a pre-built `rustls` client configuration.
    pub fn with_tls_config(tls: Arc<rustls::ClientConfig>, timeout: Option<Duration>) -> Self {
        Self { tls, timeout }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// POST `body` as JSON to `path` under `endpoint`.
    pub async fn post_json(
        &self,
        endpoint: &Endpoint,
        path: &str,
        body: Vec<u8>,
    ) -> Result<HttpReply, TransportError> {
        let exchange = self.send(endpoint, path, Bytes::from(body));
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, exchange)
                .await
                .map_err(|_| TransportError::Timeout(limit))?,
            None => exchange.await,
        }
    }

    async fn send(
        &self,
        endpoint: &Endpoint,
        path: &str,
        body: Bytes,
    ) -> Result<HttpReply, TransportError> {
        let target = endpoint.request_path(path);
        let request = Request::builder()
            .method(Method::POST)
            .uri(target.as_str())
            .header(HOST, endpoint.host_header())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, USER_AGENT_VALUE)
            .body(Full::new(body))?;

        let addr = format!("{}:{}", endpoint.host(), endpoint.port());
        let stream = TcpStream::connect((endpoint.host(), endpoint.port()))
            .await
            .map_err(|source| TransportError::Connect {
                addr: addr.clone(),
                source,
            })?;
        if let Err(e) = stream.set_nodelay(true) {
            debug!(%addr, error = %e, "failed to set TCP_NODELAY");
        }
        debug!(%addr, %target, "connected");

        match endpoint.scheme() {
            Scheme::Http => exchange(stream, request).await,
            Scheme::Https => {
                let server_name = ServerName::try_from(endpoint.host().to_string())
                    .map_err(|e| TransportError::Tls(format!("invalid server name: {e}")))?;
                let tls = TlsConnector::from(self.tls.clone())
                    .connect(server_name, stream)
                    .await
                    .map_err(|e| TransportError::Tls(e.to_string()))?;
                exchange(tls, request).await
            }
        }
    }
}

async fn exchange<S>(stream: S, request: Request<Full<Bytes>>) -> Result<HttpReply, TransportError>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let io = TokioIo::new(stream);
    let (mut sender, conn) = hyper::client::conn::http1::handshake(io).await?;

    // Drive the connection in the background.
    tokio::spawn(async move {
        if let Err(e) = conn.await {
            debug!(error = %e, "connection closed with error");
        }
    });

    let response = sender.send_request(request).await?;
    let status = response.status();
    let body = response.into_body().collect().await?.to_bytes();
    debug!(%status, bytes = body.len(), "response received");

    Ok(HttpReply { status, body })
}
