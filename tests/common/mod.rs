//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

/// Start a simple mock upstream that returns a fixed response.
pub async fn start_mock_upstream(addr: SocketAddr, response: &'static str) {
    let listener = TcpListener::bind(addr).await.unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let response_str = format!(
                            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            response.len(),
                            response
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });
}

/// Start a mock JSON backend (credential bridge or document store) that
/// answers every request with the given body.
#[allow(dead_code)]
pub async fn start_json_backend(addr: SocketAddr, body: &'static str) {
    let listener = TcpListener::bind(addr).await.unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let response_str = format!(
                            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });
}
