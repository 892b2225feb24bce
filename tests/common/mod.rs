//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use route_gateway::filter::FilterRegistry;
use route_gateway::{compile_gateway, GatewayConfig, GatewayServer, Shutdown};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// Start a backend that answers every request with `<name> <METHOD> <path>`.
pub async fn start_echo_backend(name: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let (read, mut write) = socket.into_split();
                let mut reader = BufReader::new(read);

                let mut request_line = String::new();
                if reader.read_line(&mut request_line).await.is_err() {
                    return;
                }
                let mut parts = request_line.split_whitespace();
                let method = parts.next().unwrap_or_default().to_string();
                let target = parts.next().unwrap_or_default().to_string();

                let mut content_length = 0usize;
                let mut forwarded_host = String::new();
                loop {
                    let mut line = String::new();
                    if reader.read_line(&mut line).await.unwrap_or(0) == 0 || line == "\r\n" {
                        break;
                    }
                    let lower = line.to_ascii_lowercase();
                    if let Some(v) = lower.strip_prefix("content-length:") {
                        content_length = v.trim().parse().unwrap_or(0);
                    }
                    if let Some(v) = lower.strip_prefix("x-forwarded-host:") {
                        forwarded_host = v.trim().to_string();
                    }
                }
                let mut body = vec![0u8; content_length];
                let _ = tokio::io::AsyncReadExt::read_exact(&mut reader, &mut body).await;

                let payload = format!(
                    "{} {} {} {}",
                    name,
                    method,
                    target,
                    String::from_utf8_lossy(&body)
                );
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nX-Backend: {}\r\nX-Seen-Host: {}\r\nConnection: close\r\n\r\n{}",
                    payload.len(),
                    name,
                    forwarded_host,
                    payload
                );
                let _ = write.write_all(response.as_bytes()).await;
                let _ = write.shutdown().await;
            });
        }
    });

    addr
}

/// A running gateway bound to an ephemeral port.
pub struct TestGateway {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub reload_tx: mpsc::UnboundedSender<GatewayConfig>,
}

impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Compile `config` with `registry` and serve it.
pub async fn start_gateway(config: GatewayConfig, registry: FilterRegistry) -> TestGateway {
    let compiled = compile_gateway(&config, &registry, &registry).unwrap();
    let server = GatewayServer::new(config, compiled).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let (reload_tx, reload_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let _ = server.run(listener, reload_rx, server_shutdown).await;
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    TestGateway {
        addr,
        shutdown,
        reload_tx,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Start a backend that accepts connections and never answers.
#[allow(dead_code)]
pub async fn start_silent_backend() -> SocketAddr {
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

/// Start a backend that sends headers and one chunk, then stalls without
/// finishing the body.
pub async fn start_trickle_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            let (read, mut write) = socket.into_split();
            let mut reader = BufReader::new(read);
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).await.unwrap_or(0) == 0 || line == "\r\n" {
                    break;
                }
            }
            let head = "HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\nX-Backend: trickle\r\n\r\n5\r\nfirst\r\n";
            let _ = write.write_all(head.as_bytes()).await;
            let _ = write.flush().await;
            held.push((reader, write));
        }
    });

    addr
}
