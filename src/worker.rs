use std::sync::Arc;

use time::OffsetDateTime;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use crate::config::ServerConfig;
use crate::resource::{self, Resource};
use crate::server_impl::response::{ResponseHead, StatusCode};
use crate::server_impl::server::{self, ParseError};
use crate::template;
use crate::AnyResult;

const BODY_OPEN: &str = "<html><head></head><body>\n";
const BODY_CLOSE: &str = "</body></html>\n";
const NOT_FOUND_LINE: &str = "<h3>404 Not Found</h3>\n";

/// One worker, one connection, one exchange. The listener hands over an
/// already-open duplex stream; the worker owns it through shutdown and
/// shares nothing with sibling workers.
///
/// Control flow is linear: read head, resolve, write header, write body,
/// close. No phase is retried. A request that cannot be parsed still gets
/// a full not-found exchange; only transport failures abandon the
/// response, and those surface to the caller after the stream is torn
/// down.
#[derive(Debug)]
pub struct ConnectionWorker<S> {
    stream: S,
    config: Arc<ServerConfig>,
}

impl<S> ConnectionWorker<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, config: Arc<ServerConfig>) -> Self {
        Self { stream, config }
    }

    pub async fn run(mut self) -> AnyResult<()> {
        let exchange = self.exchange().await;
        // one request per connection: close no matter how it went
        let _ = self.stream.shutdown().await;
        exchange
    }

    async fn exchange(&mut self) -> AnyResult<()> {
        let head = server::read_request_head(&mut self.stream).await?;
        let resource = match server::parse_request(&head) {
            Ok(request) => {
                resource::open_resource(&self.config.document_root, &request).await
            }
            // a bad request line still deserves a complete response
            Err(ParseError::MalformedRequest) => Resource::NotFound,
        };

        let status = if resource.exists() {
            StatusCode::Ok
        } else {
            StatusCode::NotFound
        };
        let header = ResponseHead::new(status).into_http(&self.config.server_ident);
        self.stream.write_all(&header).await?;

        self.stream.write_all(BODY_OPEN.as_bytes()).await?;
        match resource {
            Resource::Found(file) => self.write_file_body(file).await?,
            Resource::NotFound => self.stream.write_all(NOT_FOUND_LINE.as_bytes()).await?,
        }
        self.stream.write_all(BODY_CLOSE.as_bytes()).await?;
        self.stream.flush().await?;

        Ok(())
    }

    /// Streams the whole file, line by line and in order, through marker
    /// substitution. Line terminators are preserved as read, so a
    /// marker-free file round-trips byte-identical; lines that are not
    /// UTF-8 pass through untouched. A file that errors out mid-read
    /// truncates the body at the last good line; the envelope still
    /// closes. The handle is dropped here on every path, including write
    /// failures.
    async fn write_file_body<R>(&mut self, file: R) -> AnyResult<()>
    where
        R: AsyncRead + Unpin,
    {
        let date_text = template::render_date(OffsetDateTime::now_utc());
        let mut reader = BufReader::new(file);
        let mut raw = Vec::new();

        loop {
            raw.clear();
            match reader.read_until(b'\n', &mut raw).await {
                Ok(0) => break,
                Ok(_) => {
                    let had_newline = raw.last() == Some(&b'\n');
                    let line = &raw[..raw.len() - usize::from(had_newline)];
                    match std::str::from_utf8(line) {
                        Ok(text) => {
                            let substituted = template::substitute_line(
                                text,
                                &date_text,
                                &self.config.server_ident,
                            );
                            self.stream.write_all(substituted.as_bytes()).await?;
                        }
                        // not text; no marker can hide in here
                        Err(_) => self.stream.write_all(line).await?,
                    }
                    if had_newline {
                        self.stream.write_all(b"\n").await?;
                    }
                }
                // the file went away under us; emit what we have
                Err(_) => break,
            }
        }

        Ok(())
    }
}
