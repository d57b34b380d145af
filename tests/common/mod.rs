//! Shared utilities for integration and load testing.
#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use roundrobin_proxy::config::{BackendList, ProxyConfig};
use roundrobin_proxy::{BackendPool, HttpServer, Shutdown};

/// Read until the end of the request head so closing the socket never resets it.
async fn read_request_head(socket: &mut TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
}

async fn serve_on<F, Fut>(listener: TcpListener, f: F)
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let f = Arc::new(f);
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let f = f.clone();
            tokio::spawn(async move {
                read_request_head(&mut socket).await;
                let (status, body) = f().await;
                let status_text = match status {
                    200 => "200 OK",
                    500 => "500 Internal Server Error",
                    503 => "503 Service Unavailable",
                    _ => "200 OK",
                };
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_text,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });
}

/// Start a mock backend on a free port that always answers 200 with `response`.
pub async fn start_mock_backend(response: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    serve_on(listener, move || async move { (200, response.to_string()) }).await;
    addr
}

/// Start a mock backend on a specific address (used to bring a backend back).
pub async fn start_mock_backend_at(addr: SocketAddr, response: &'static str) {
    let listener = TcpListener::bind(addr).await.unwrap();
    serve_on(listener, move || async move { (200, response.to_string()) }).await;
}

/// Start a backend that accepts connections and never answers.
pub async fn start_stalled_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    addr
}

/// An address nothing listens on.
pub async fn dead_address() -> SocketAddr {
    dead_addresses(1).await[0]
}

/// `n` distinct addresses nothing listens on.
pub async fn dead_addresses(n: usize) -> Vec<SocketAddr> {
    // Hold every listener until all ports are picked so none repeats.
    let mut listeners = Vec::new();
    for _ in 0..n {
        listeners.push(TcpListener::bind("127.0.0.1:0").await.unwrap());
    }
    listeners.iter().map(|l| l.local_addr().unwrap()).collect()
}

/// Config pointing at the given backends, health checks off, short retries.
pub fn config_for(backends: &[SocketAddr]) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.backends = BackendList(backends.iter().map(|a| format!("http://{}", a)).collect());
    config.health_check.enabled = false;
    config.retries.backoff_ms = 10;
    config.timeouts.upstream_secs = 2;
    config
}

/// A running proxy plus handles to inspect and stop it.
pub struct TestProxy {
    pub addr: SocketAddr,
    pub pool: Arc<BackendPool>,
    pub shutdown: Shutdown,
}

impl TestProxy {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

pub async fn start_proxy(config: ProxyConfig) -> TestProxy {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config).expect("valid test config");
    let pool = server.pool().clone();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestProxy {
        addr,
        pool,
        shutdown,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
