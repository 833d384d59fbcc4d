//! TCP transport for one GNTP request/response cycle
//!
//! Each exchange opens its own connection, writes the whole request and
//! reads until the daemon closes the socket or the response is complete.
//! The socket is dropped, and therefore closed, on every return path.

use async_trait::async_trait;
use std::time::Duration;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;

use super::response::ResponseReader;
use crate::common::{Error, Result};

/// Where and how long to talk to a daemon
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
    /// Bound on the connect phase
    pub connect_timeout: Duration,
    /// Bound on writing the request and reading the full response
    pub read_timeout: Duration,
}

impl Endpoint {
    pub fn addr(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

/// Sends a serialized request and returns the raw response text
#[async_trait]
pub trait Transport: Send + Sync {
    async fn exchange(&self, endpoint: &Endpoint, payload: &[u8]) -> Result<String>;
}

/// Plain TCP, no TLS and no connection reuse
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpTransport;

#[async_trait]
impl Transport for TcpTransport {
    async fn exchange(&self, endpoint: &Endpoint, payload: &[u8]) -> Result<String> {
        let addr = endpoint.addr();

        let stream = timeout(endpoint.connect_timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| Error::ConnectTimeout {
                addr: addr.clone(),
                secs: endpoint.connect_timeout.as_secs(),
            })?
            .map_err(|e| Error::connection_failed(&addr, e))?;

        tracing::debug!("Connected to {}", addr);

        timeout(endpoint.read_timeout, send_and_receive(stream, payload))
            .await
            .map_err(|_| Error::ReadTimeout(endpoint.read_timeout.as_secs()))?
    }
}

async fn send_and_receive(stream: TcpStream, payload: &[u8]) -> Result<String> {
    let (read_half, mut write_half) = stream.into_split();

    write_half
        .write_all(payload)
        .await
        .map_err(Error::TransportWrite)?;
    write_half.flush().await.map_err(Error::TransportWrite)?;
    tracing::trace!("Wrote {} bytes", payload.len());

    let mut reader = BufReader::new(read_half);
    let raw = ResponseReader::new().read_from(&mut reader).await?;

    tracing::trace!("Read {} bytes", raw.len());
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncBufReadExt, AsyncReadExt};
    use tokio::net::{TcpListener, TcpSocket};

    fn endpoint(port: u16) -> Endpoint {
        Endpoint {
            host: "127.0.0.1".to_string(),
            port,
            connect_timeout: Duration::from_secs(2),
            read_timeout: Duration::from_secs(2),
        }
    }

    #[test]
    fn test_addr_formats_ipv6() {
        let mut ep = endpoint(23053);
        assert_eq!(ep.addr(), "127.0.0.1:23053");
        ep.host = "::1".to_string();
        assert_eq!(ep.addr(), "[::1]:23053");
    }

    #[tokio::test]
    async fn test_exchange_reads_until_close() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 5];
            socket.read_exact(&mut buf).await.unwrap();
            socket.write_all(b"GNTP/1.0 -OK NONE\r\n").await.unwrap();
            buf
        });

        let raw = TcpTransport.exchange(&endpoint(port), b"hello").await.unwrap();
        assert_eq!(raw, "GNTP/1.0 -OK NONE\r\n");
        assert_eq!(server.await.unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_exchange_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = TcpTransport.exchange(&endpoint(port), b"hello").await.unwrap_err();
        assert!(err.is_connect_error(), "unexpected error: {err}");
    }

    #[tokio::test]
    async fn test_exchange_read_deadline() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let mut reader = tokio::io::BufReader::new(socket);
            let mut line = String::new();
            reader.read_line(&mut line).await.unwrap();
            // Hold the connection open without answering
            tokio::time::sleep(Duration::from_secs(3)).await;
        });

        let mut ep = endpoint(port);
        ep.read_timeout = Duration::from_millis(200);

        let err = TcpTransport.exchange(&ep, b"hello\r\n").await.unwrap_err();
        assert!(matches!(err, Error::ReadTimeout(_)));
        server.abort();
    }

    #[tokio::test]
    async fn test_exchange_rejects_oversized_reply() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 5];
            socket.read_exact(&mut buf).await.unwrap();
            let chunk = vec![b'A'; 1024 * 1024];
            for _ in 0..4 {
                if socket.write_all(&chunk).await.is_err() {
                    break;
                }
            }
        });

        let err = TcpTransport.exchange(&endpoint(port), b"hello").await.unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(ref m) if m == "response too large"));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_exchange_connect_timeout() {
        // A listener nobody accepts on stops answering SYNs once its queue is full
        let socket = TcpSocket::new_v4().unwrap();
        socket.bind("127.0.0.1:0".parse().unwrap()).unwrap();
        let listener = socket.listen(1).unwrap();
        let addr = listener.local_addr().unwrap();

        let mut queued = Vec::new();
        for _ in 0..16 {
            match timeout(Duration::from_millis(200), TcpStream::connect(addr)).await {
                Ok(Ok(stream)) => queued.push(stream),
                _ => break,
            }
        }

        let mut ep = endpoint(addr.port());
        ep.connect_timeout = Duration::from_millis(300);

        let err = TcpTransport.exchange(&ep, b"hello").await.unwrap_err();
        assert!(
            matches!(err, Error::ConnectTimeout { ref addr, .. } if addr == &ep.addr()),
            "unexpected error: {err}"
        );
        assert!(err.is_connect_error());
    }

    #[tokio::test]
    async fn test_exchange_write_fails_when_peer_closes() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            drop(socket);
        });

        // Larger than any socket buffer, so the write cannot complete
        let payload = vec![b'A'; 32 * 1024 * 1024];
        let err = TcpTransport.exchange(&endpoint(port), &payload).await.unwrap_err();
        assert!(matches!(err, Error::TransportWrite(_)), "unexpected error: {err}");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_exchange_read_fails_on_reset() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            // Closing with the request still unread makes the kernel send RST
            tokio::time::sleep(Duration::from_millis(200)).await;
            drop(socket);
        });

        let err = TcpTransport
            .exchange(&endpoint(port), b"GNTP/1.0 NOTIFY NONE \r\n\r\n")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TransportRead(_)), "unexpected error: {err}");
        server.await.unwrap();
    }
}
