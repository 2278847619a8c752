//! Upstream connector.
//!
//! # Responsibilities
//! - Join the backend base URL with an inbound path
//! - Open one outbound HTTP exchange per call
//! - Stream the request body out and hand back the response unread
//!
//! # Design Decisions
//! - No retries; every failure is reported to the caller once
//! - Transport failures carry the whole error source chain as text
//! - Only the wait for response headers is time-bounded

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, Method, Request, Response, Uri};
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::error::Error as StdError;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub type HttpClient = Client<HttpConnector, Body>;

/// Error type for upstream exchanges.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    #[error("invalid upstream URI '{uri}': {reason}")]
    InvalidUri { uri: String, reason: String },

    #[error("{0}")]
    Unavailable(String),

    #[error("upstream did not respond within {0:?}")]
    Timeout(Duration),
}

/// Forwards exchanges to the configured WebDriver server.
#[derive(Clone)]
pub struct UpstreamConnector {
    client: HttpClient,
    response_timeout: Option<Duration>,
}

impl UpstreamConnector {
    pub fn new(response_timeout: Option<Duration>) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self {
            client,
            response_timeout,
        }
    }

    /// Send `method path_and_query` to `backend`, streaming `body`.
    ///
    /// Headers are passed through except `Host`, which names the backend.
    /// The returned response body has not been read.
    pub async fn forward(
        &self,
        backend: &Url,
        method: Method,
        path_and_query: &str,
        headers: HeaderMap,
        body: Body,
    ) -> Result<Response<Incoming>, UpstreamError> {
        let uri = backend_uri(backend, path_and_query)?;

        let mut request = Request::builder()
            .method(method)
            .uri(uri.clone())
            .body(body)
            .map_err(|e| UpstreamError::InvalidUri {
                uri: uri.to_string(),
                reason: e.to_string(),
            })?;

        let outbound = request.headers_mut();
        *outbound = headers;
        outbound.remove(header::HOST);
        if let Some(authority) = uri.authority() {
            if let Ok(host) = HeaderValue::from_str(authority.as_str()) {
                outbound.insert(header::HOST, host);
            }
        }

        let exchange = self.client.request(request);
        let result = match self.response_timeout {
            Some(limit) => tokio::time::timeout(limit, exchange)
                .await
                .map_err(|_| UpstreamError::Timeout(limit))?,
            None => exchange.await,
        };

        result.map_err(|e| UpstreamError::Unavailable(error_chain(&e)))
    }
}

/// Append `path_and_query` to the backend's base path.
///
/// `http://localhost:4444/wd/hub` + `/session/abc/url` becomes
/// `http://localhost:4444/wd/hub/session/abc/url`.
pub fn backend_uri(backend: &Url, path_and_query: &str) -> Result<Uri, UpstreamError> {
    let base = backend.as_str().trim_end_matches('/');
    let joined = if path_and_query.starts_with('/') {
        format!("{base}{path_and_query}")
    } else {
        format!("{base}/{path_and_query}")
    };

    joined.parse::<Uri>().map_err(|e| UpstreamError::InvalidUri {
        uri: joined.clone(),
        reason: e.to_string(),
    })
}

/// Render an error and all of its sources, outermost first.
pub fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn joins_base_path() {
        let uri = backend_uri(&url("http://localhost:4444/wd/hub"), "/session/abc/url").unwrap();
        assert_eq!(uri.to_string(), "http://localhost:4444/wd/hub/session/abc/url");
    }

    #[test]
    fn root_base_path_has_no_double_slash() {
        let uri = backend_uri(&url("http://grid:4444"), "/status").unwrap();
        assert_eq!(uri.to_string(), "http://grid:4444/status");

        let uri = backend_uri(&url("http://grid:4444/wd/hub/"), "/status").unwrap();
        assert_eq!(uri.to_string(), "http://grid:4444/wd/hub/status");
    }

    #[test]
    fn keeps_query_string() {
        let uri = backend_uri(&url("http://grid:4444/wd/hub"), "/sessions?full=1").unwrap();
        assert_eq!(uri.path(), "/wd/hub/sessions");
        assert_eq!(uri.query(), Some("full=1"));
    }

    #[test]
    fn error_chain_includes_sources() {
        #[derive(Debug, Error)]
        #[error("client error")]
        struct Outer(#[source] std::io::Error);

        let err = Outer(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "connection refused",
        ));
        assert_eq!(error_chain(&err), "client error: connection refused");
    }

    #[tokio::test]
    async fn refused_connection_is_unavailable() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let connector = UpstreamConnector::new(Some(Duration::from_secs(5)));
        let backend = url(&format!("http://{addr}/wd/hub"));
        let err = connector
            .forward(&backend, Method::GET, "/status", HeaderMap::new(), Body::empty())
            .await
            .unwrap_err();
        assert!(matches!(err, UpstreamError::Unavailable(_)), "{err:?}");
    }
}
