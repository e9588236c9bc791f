use std::str::FromStr;

use memchr::{memchr, memmem};
use strum::{EnumString, IntoStaticStr};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::server_impl::request::Request;

/// Largest request head we will buffer before giving up on the peer.
pub const MAX_HEAD_BYTES: usize = 8 * 1024;

/// Read-call budget. A peer that trickles bytes forever and never sends
/// the terminating blank line gets cut off instead of pinning the worker.
pub const MAX_READ_STEPS: usize = 64;

#[allow(clippy::upper_case_acronyms, non_camel_case_types)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, EnumString, IntoStaticStr)]
pub enum Method {
    CONNECT,
    DELETE,
    GET,
    HEAD,
    POST,
    PUT,
}

/// A first line we cannot act on: unreadable, fewer than two tokens, an
/// unknown method, or a target that does not start with `/`. The worker
/// still answers with a full not-found exchange, never a silent drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    MalformedRequest,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::MalformedRequest => write!(f, "malformed request line"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Accumulates bytes from the stream until the blank line that ends the
/// header section, end-of-input, or the head budget is exhausted. The
/// await on `read` is the only suspension point; there is no polling.
pub async fn read_request_head<R>(stream: &mut R) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut head = Vec::with_capacity(1024);
    let mut buf = [0_u8; 1024];

    for _ in 0..MAX_READ_STEPS {
        if find_head_end(&head).is_some() || head.len() >= MAX_HEAD_BYTES {
            break;
        }
        let read_bytes = stream.read(&mut buf).await?;
        if read_bytes == 0 {
            // peer closed its write side
            break;
        }
        head.extend_from_slice(&buf[..read_bytes]);
    }

    Ok(head)
}

/// Byte offset just past the header terminator, if present. Bare-LF peers
/// are tolerated alongside CRLF ones.
pub fn find_head_end(head: &[u8]) -> Option<usize> {
    memmem::find(head, b"\r\n\r\n")
        .map(|idx| idx + 4)
        .or_else(|| memmem::find(head, b"\n\n").map(|idx| idx + 2))
}

/// Splits the request line into method and target. Token 0 is the method,
/// token 1 the target; a trailing version token is discarded. Everything
/// after the first line is already-drained noise.
pub fn parse_request(head: &[u8]) -> Result<Request<'_>, ParseError> {
    let line_end = memchr(b'\n', head).unwrap_or(head.len());
    let line = std::str::from_utf8(&head[..line_end])
        .map_err(|_| ParseError::MalformedRequest)?
        .trim_end_matches('\r');

    let mut tokens = line.split_whitespace();
    let method = tokens
        .next()
        .and_then(|token| Method::from_str(token).ok())
        .ok_or(ParseError::MalformedRequest)?;
    let target = tokens.next().ok_or(ParseError::MalformedRequest)?;

    if !target.starts_with('/') {
        return Err(ParseError::MalformedRequest);
    }

    Ok(Request { method, target })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_simple_get() {
        let sample = b"GET /index.html HTTP/1.1\r\nHost: localhost\r\n\r\n";

        let request = parse_request(sample).unwrap();
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.target, "/index.html");
    }

    #[test]
    fn success_without_version_token() {
        let request = parse_request(b"GET /\r\n\r\n").unwrap();
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.target, "/");
    }

    #[test]
    fn success_bare_lf_lines() {
        let request = parse_request(b"POST /submit HTTP/1.0\nHost: x\n\n").unwrap();
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.target, "/submit");
    }

    #[test]
    fn malformed_empty_line() {
        assert_eq!(parse_request(b"\r\n\r\n"), Err(ParseError::MalformedRequest));
        assert_eq!(parse_request(b""), Err(ParseError::MalformedRequest));
    }

    #[test]
    fn malformed_single_token() {
        assert_eq!(parse_request(b"GET\r\n\r\n"), Err(ParseError::MalformedRequest));
    }

    #[test]
    fn malformed_unknown_method() {
        let result = parse_request(b"BREW /coffee HTTP/1.1\r\n\r\n");
        assert_eq!(result, Err(ParseError::MalformedRequest));
    }

    #[test]
    fn malformed_relative_target() {
        let result = parse_request(b"GET index.html HTTP/1.1\r\n\r\n");
        assert_eq!(result, Err(ParseError::MalformedRequest));
    }

    #[test]
    fn malformed_non_utf8_line() {
        assert_eq!(
            parse_request(b"GET /\xff\xfe HTTP/1.1\r\n\r\n"),
            Err(ParseError::MalformedRequest)
        );
    }

    #[test]
    fn head_end_variants() {
        assert_eq!(find_head_end(b"GET / HTTP/1.1\r\n\r\n"), Some(18));
        assert_eq!(find_head_end(b"GET / HTTP/1.1\n\n"), Some(16));
        assert_eq!(find_head_end(b"GET / HTTP/1.1\r\nHost: x"), None);
    }

    #[tokio::test]
    async fn head_read_tolerates_incremental_delivery() {
        let (mut client, mut server) = tokio::io::duplex(64);

        let writer = tokio::spawn(async move {
            use tokio::io::AsyncWriteExt;
            for chunk in [&b"GET /inde"[..], b"x.html HTTP/1.1\r\n", b"Host: x\r\n\r\n"] {
                client.write_all(chunk).await.unwrap();
            }
        });

        let head = read_request_head(&mut server).await.unwrap();
        writer.await.unwrap();

        assert!(find_head_end(&head).is_some());
        let request = parse_request(&head).unwrap();
        assert_eq!(request.target, "/index.html");
    }

    #[tokio::test]
    async fn head_read_cuts_off_unterminated_peer() {
        let (mut client, mut server) = tokio::io::duplex(1024);

        // far more than the budget, no blank line, write side stays open
        let writer = tokio::spawn(async move {
            use tokio::io::AsyncWriteExt;
            let chunk = [b'a'; 512];
            for _ in 0..(MAX_HEAD_BYTES / chunk.len()) * 3 {
                if client.write_all(&chunk).await.is_err() {
                    break;
                }
            }
        });

        let head = read_request_head(&mut server).await.unwrap();
        drop(server);
        writer.await.unwrap();

        assert!(head.len() >= MAX_HEAD_BYTES);
        assert!(find_head_end(&head).is_none());
    }

    #[tokio::test]
    async fn head_read_stops_at_eof() {
        let (mut client, mut server) = tokio::io::duplex(64);
        {
            use tokio::io::AsyncWriteExt;
            client.write_all(b"GET /partial").await.unwrap();
            client.shutdown().await.unwrap();
        }

        let head = read_request_head(&mut server).await.unwrap();
        assert_eq!(head, b"GET /partial");
        assert!(find_head_end(&head).is_none());
    }
}
