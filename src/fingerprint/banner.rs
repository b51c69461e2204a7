//! Banner grabbing functionality for TCP connections.
//!
//! Connects, sends a probe suited to the port (nothing for services that
//! greet first), and decodes the first read into a short single-line string.

use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Maximum bytes to read for a banner.
const MAX_BANNER_SIZE: usize = 1024;

/// Maximum characters kept from a decoded banner.
pub const MAX_BANNER_CHARS: usize = 100;

/// Returned when the service answered with nothing printable.
pub const NO_BANNER: &str = "No banner";

/// Returned when the connection or read failed.
pub const UNKNOWN_BANNER: &str = "Unknown";

const HTTP_PROBE: &[u8] = b"HEAD / HTTP/1.0\r\n\r\n";
const FTP_PROBE: &[u8] = b"HELP\r\n";

/// Payload to send after connecting, empty when the service speaks first.
pub fn probe_payload(port: u16) -> &'static [u8] {
    match port {
        21 => FTP_PROBE,
        p if is_http_port(p) => HTTP_PROBE,
        _ => b"",
    }
}

/// Grab a banner from `addr`, bounding connect and read by `wait` each.
///
/// Never fails: returns [`UNKNOWN_BANNER`] when connecting, sending or
/// reading fails or times out, and [`NO_BANNER`] when the service closed
/// without sending anything printable. The stream is closed on return.
pub async fn grab_banner(addr: SocketAddr, wait: Duration) -> String {
    let mut stream = match timeout(wait, TcpStream::connect(addr)).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(e)) => {
            tracing::debug!(%addr, error = %e, "banner connect failed");
            return UNKNOWN_BANNER.to_string();
        }
        Err(_) => {
            tracing::debug!(%addr, "banner connect timed out");
            return UNKNOWN_BANNER.to_string();
        }
    };

    let payload = probe_payload(addr.port());
    if !payload.is_empty() {
        if let Err(e) = stream.write_all(payload).await {
            tracing::debug!(%addr, error = %e, "banner probe write failed");
            return UNKNOWN_BANNER.to_string();
        }
    }

    let mut buffer = vec![0u8; MAX_BANNER_SIZE];
    match timeout(wait, stream.read(&mut buffer)).await {
        Ok(Ok(n)) => {
            let banner = decode_banner(&buffer[..n]);
            if banner.is_empty() {
                NO_BANNER.to_string()
            } else {
                banner
            }
        }
        Ok(Err(e)) => {
            tracing::debug!(%addr, error = %e, "banner read failed");
            UNKNOWN_BANNER.to_string()
        }
        Err(_) => {
            tracing::debug!(%addr, "banner read timed out");
            UNKNOWN_BANNER.to_string()
        }
    }
}

/// Decode raw banner bytes into one trimmed line of at most
/// [`MAX_BANNER_CHARS`] characters.
///
/// Invalid UTF-8 becomes U+FFFD and whitespace runs (including CR/LF)
/// collapse to a single space.
pub fn decode_banner(data: &[u8]) -> String {
    let text = String::from_utf8_lossy(data);
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(MAX_BANNER_CHARS).collect()
}

/// Check if a port is commonly used for plaintext HTTP.
fn is_http_port(port: u16) -> bool {
    matches!(port, 80 | 8000 | 8008 | 8080 | 8888)
}
