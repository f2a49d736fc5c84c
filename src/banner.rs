//! Banner grabbing for open TCP connections.
//!
//! A single read of whatever the service sends first. Nothing is written
//! to the peer, and a failed read never changes the port's open status.

use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::timeout;
use tracing::trace;

/// Maximum bytes to read for a banner.
pub const MAX_BANNER_SIZE: usize = 1024;

/// Default timeout for the banner read.
pub const BANNER_TIMEOUT: Duration = Duration::from_secs(1);

/// Banner reported when the service sent nothing usable.
pub const NOT_DISCLOSED: &str = "Not disclosed";

/// Read one banner from a freshly opened connection.
///
/// Returns [`NOT_DISCLOSED`] on timeout, read error, EOF, or an all-whitespace
/// payload.
pub async fn read_banner<R>(reader: &mut R, wait: Duration) -> String
where
    R: AsyncRead + Unpin,
{
    let mut buffer = vec![0u8; MAX_BANNER_SIZE];

    match timeout(wait, reader.read(&mut buffer)).await {
        Ok(Ok(n)) => decode_banner(&buffer[..n]),
        Ok(Err(e)) => {
            trace!(error = %e, "banner read failed");
            NOT_DISCLOSED.to_string()
        }
        Err(_) => {
            trace!("banner read timed out");
            NOT_DISCLOSED.to_string()
        }
    }
}

/// Decode raw banner bytes, dropping invalid UTF-8 and surrounding whitespace.
pub fn decode_banner(data: &[u8]) -> String {
    let text: String = data.utf8_chunks().map(|chunk| chunk.valid()).collect();
    let text = text.trim();

    if text.is_empty() {
        NOT_DISCLOSED.to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    #[test]
    fn test_decode_banner() {
        assert_eq!(decode_banner(b"SSH-2.0-OpenSSH_8.9\r\n"), "SSH-2.0-OpenSSH_8.9");
    }

    #[test]
    fn test_decode_drops_invalid_utf8() {
        assert_eq!(decode_banner(b"\xffHello\xfe World\xc3"), "Hello World");
    }

    #[test]
    fn test_decode_empty_payload() {
        assert_eq!(decode_banner(b""), NOT_DISCLOSED);
        assert_eq!(decode_banner(b" \r\n\t"), NOT_DISCLOSED);
        assert_eq!(decode_banner(b"\xff\xfe"), NOT_DISCLOSED);
    }

    #[tokio::test]
    async fn test_read_banner_from_stream() {
        let (mut client, mut server) = tokio::io::duplex(64);
        server.write_all(b"220 mail.example.com ESMTP\r\n").await.unwrap();

        let banner = read_banner(&mut client, Duration::from_millis(500)).await;
        assert_eq!(banner, "220 mail.example.com ESMTP");
    }

    #[tokio::test]
    async fn test_read_banner_timeout() {
        let (mut client, _server) = tokio::io::duplex(64);

        let banner = read_banner(&mut client, Duration::from_millis(50)).await;
        assert_eq!(banner, NOT_DISCLOSED);
    }

    #[tokio::test]
    async fn test_read_banner_eof() {
        let (mut client, server) = tokio::io::duplex(64);
        drop(server);

        let banner = read_banner(&mut client, Duration::from_millis(500)).await;
        assert_eq!(banner, NOT_DISCLOSED);
    }
}
