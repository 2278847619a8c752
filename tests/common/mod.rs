//! Shared utilities for integration testing.

#![allow(dead_code)]

use axum::{
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use stability_proxy::config::{ProxyConfig, RuntimeConfig};
use stability_proxy::{HttpServer, Shutdown};

/// Base path the mock WebDriver server is mounted under.
pub const BASE_PATH: &str = "/wd/hub";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Received,
    Responded,
}

#[derive(Debug, Clone)]
pub struct Event {
    pub phase: Phase,
    pub method: String,
    pub path: String,
    pub body: String,
}

/// A WebDriver server stand-in that records every exchange.
///
/// - `.../execute_async` answers with the configured probe reply
/// - `.../teapot` answers 418 with an `x-mock` header
/// - anything else echoes method, path, query and body as JSON
#[derive(Clone)]
pub struct MockWebDriver {
    pub addr: SocketAddr,
    events: Arc<Mutex<Vec<Event>>>,
    probe_reply: Arc<Mutex<String>>,
    probe_delay: Duration,
}

impl MockWebDriver {
    pub async fn start(probe_reply: &str) -> Self {
        Self::start_with_delay(probe_reply, Duration::ZERO).await
    }

    pub async fn start_with_delay(probe_reply: &str, probe_delay: Duration) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mock = Self {
            addr: listener.local_addr().unwrap(),
            events: Arc::new(Mutex::new(Vec::new())),
            probe_reply: Arc::new(Mutex::new(probe_reply.to_string())),
            probe_delay,
        };

        let app = Router::new().fallback(mock_handler).with_state(mock.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        mock
    }

    pub fn url(&self) -> String {
        format!("http://{}{}", self.addr, BASE_PATH)
    }

    pub fn set_probe_reply(&self, reply: &str) {
        *self.probe_reply.lock().unwrap() = reply.to_string();
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    /// Requests received, in arrival order.
    pub fn calls(&self) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|e| e.phase == Phase::Received)
            .collect()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        let full = format!("{BASE_PATH}{path}");
        self.calls().iter().filter(|e| e.path == full).count()
    }

    fn record(&self, phase: Phase, method: &str, path: &str, body: &str) {
        self.events.lock().unwrap().push(Event {
            phase,
            method: method.to_string(),
            path: path.to_string(),
            body: body.to_string(),
        });
    }
}

async fn mock_handler(State(mock): State<MockWebDriver>, request: Request) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let query = request.uri().query().unwrap_or("").to_string();
    let bytes = axum::body::to_bytes(request.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = String::from_utf8_lossy(&bytes).to_string();

    mock.record(Phase::Received, &method, &path, &body);

    let response = if path.ends_with("/execute_async") {
        tokio::time::sleep(mock.probe_delay).await;
        let reply = mock.probe_reply.lock().unwrap().clone();
        (StatusCode::OK, [("content-type", "application/json")], reply).into_response()
    } else if path.ends_with("/teapot") {
        (StatusCode::IM_A_TEAPOT, [("x-mock", "teapot")], "short and stout").into_response()
    } else {
        let echo = json!({
            "status": 0,
            "value": {
                "method": method,
                "path": path,
                "query": query,
                "body": body,
            },
        });
        (StatusCode::OK, [("content-type", "application/json")], echo.to_string()).into_response()
    };

    mock.record(Phase::Responded, &method, &path, "");
    response
}

/// A running proxy bound to an ephemeral port.
pub struct TestProxy {
    pub addr: SocketAddr,
    pub runtime: Arc<RuntimeConfig>,
    shutdown: Shutdown,
}

impl TestProxy {
    pub async fn start(config: ProxyConfig) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = HttpServer::new(&config).unwrap();
        let runtime = server.runtime();

        let shutdown = Shutdown::new();
        let server_shutdown = shutdown.subscribe();
        tokio::spawn(async move {
            let _ = server.run(listener, server_shutdown).await;
        });

        Self {
            addr,
            runtime,
            shutdown,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestProxy {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub fn proxy_config(selenium_address: &str) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.backend.selenium_address = selenium_address.to_string();
    config.timeouts.probe_secs = 5;
    config.timeouts.upstream_secs = 5;
    config
}

/// Start a raw upstream that answers with a chunked body: headers and
/// `first_chunk` immediately, the terminating chunk only after `stall`.
pub async fn start_stalling_chunked_backend(first_chunk: &'static str, stall: Duration) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                read_request_head(&mut socket).await;
                let head = format!(
                    "HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n{:x}\r\n{}\r\n",
                    first_chunk.len(),
                    first_chunk
                );
                let _ = socket.write_all(head.as_bytes()).await;
                let _ = socket.flush().await;
                tokio::time::sleep(stall).await;
                let _ = socket.write_all(b"0\r\n\r\n").await;
                let _ = socket.shutdown().await;
            });
        }
    });
    addr
}

/// Start a raw upstream that reads each request and never answers.
pub async fn start_silent_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                read_request_head(&mut socket).await;
                tokio::time::sleep(Duration::from_secs(30)).await;
                drop(socket);
            });
        }
    });
    addr
}

async fn read_request_head(socket: &mut TcpStream) {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }
}

/// An address nothing is listening on.
pub async fn closed_address() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
