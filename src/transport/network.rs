//! Raw TCP link (port 9100 style).
//!
//! Most thermal printers with an Ethernet interface accept ESC/POS bytes on a
//! plain TCP socket. The address is validated when the link is built; the
//! connection is only opened when a job is written.

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{info, instrument};

use super::PrinterLink;
use crate::error::BridgeError;

/// Default connect/write timeout for TCP links.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Printer reachable over TCP.
#[derive(Debug, Clone)]
pub struct NetworkLink {
    addr: String,
    timeout: Duration,
}

impl NetworkLink {
    /// Parse `host:port` or `tcp://host:port`.
    ///
    /// ## Example
    ///
    /// ```
    /// use receipt_bridge::transport::NetworkLink;
    ///
    /// let link = NetworkLink::parse("tcp://localhost:9100").unwrap();
    /// assert_eq!(link.addr(), "localhost:9100");
    /// assert!(NetworkLink::parse("localhost").is_err());
    /// ```
    pub fn parse(addr: &str) -> Result<Self, BridgeError> {
        let trimmed = addr.trim();
        let bare = trimmed.strip_prefix("tcp://").unwrap_or(trimmed);

        let valid = bare
            .rsplit_once(':')
            .is_some_and(|(host, port)| !host.is_empty() && port.parse::<u16>().is_ok());
        if !valid {
            return Err(BridgeError::InvalidInput(format!(
                "Invalid printer address: {}",
                addr
            )));
        }

        Ok(Self {
            addr: bare.to_string(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }
}

#[async_trait]
impl PrinterLink for NetworkLink {
    fn endpoint(&self) -> String {
        self.addr.clone()
    }

    #[instrument(skip(self, data), fields(addr = %self.addr, data_len = data.len()))]
    async fn write(&self, data: &[u8]) -> Result<(), BridgeError> {
        let mut stream = tokio::time::timeout(self.timeout, TcpStream::connect(&self.addr))
            .await
            .map_err(|_| BridgeError::Transport(format!("Connection timeout: {}", self.addr)))?
            .map_err(|e| BridgeError::Transport(format!("{}: {}", self.addr, e)))?;

        let send = async {
            stream.write_all(data).await?;
            stream.flush().await?;
            stream.shutdown().await
        };

        tokio::time::timeout(self.timeout, send)
            .await
            .map_err(|_| BridgeError::Transport(format!("Write timeout: {}", self.addr)))?
            .map_err(|e| BridgeError::Transport(format!("Write failed: {}", e)))?;

        info!("Print job sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    #[test]
    fn test_parse_accepts_scheme_and_bare() {
        assert_eq!(NetworkLink::parse("tcp://localhost:9100").unwrap().addr(), "localhost:9100");
        assert_eq!(NetworkLink::parse("192.168.1.50:9100").unwrap().addr(), "192.168.1.50:9100");
    }

    #[test]
    fn test_parse_rejects_bad_addresses() {
        for bad in ["", "tcp://", "printer", ":9100", "host:port", "host:70000"] {
            assert!(NetworkLink::parse(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[tokio::test]
    async fn test_write_delivers_bytes() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            socket.read_to_end(&mut received).await.unwrap();
            received
        });

        let link = NetworkLink::parse(&addr.to_string()).unwrap();
        link.write(b"\x1b@hello").await.unwrap();

        assert_eq!(server.await.unwrap(), b"\x1b@hello");
    }

    #[tokio::test]
    async fn test_refused_connection_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let link = NetworkLink::parse(&addr.to_string()).unwrap();
        let err = link.write(b"x").await.unwrap_err();
        assert!(matches!(err, BridgeError::Transport(_)));
    }
}
