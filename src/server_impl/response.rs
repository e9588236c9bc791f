use std::fmt::Write;

use bytes::Bytes;
use strum::{EnumMessage, EnumString, IntoStaticStr};
use time::macros::format_description;
use time::OffsetDateTime;

/// The only two outcomes a one-shot exchange can have.
#[allow(clippy::upper_case_acronyms, non_camel_case_types)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, IntoStaticStr, EnumString, EnumMessage)]
pub enum StatusCode {
    #[strum(serialize = "200", message = "OK")]
    Ok,
    #[strum(serialize = "404", message = "Not Found")]
    NotFound,
}

#[derive(Debug, Clone, Copy)]
pub struct ResponseHead {
    pub status_code: StatusCode,
    pub content_type: &'static str,
}

impl ResponseHead {
    pub fn new(status_code: StatusCode) -> Self {
        Self {
            status_code,
            content_type: "text/html",
        }
    }

    /// Renders the header block, newline-terminated lines in fixed order,
    /// ending with the blank line that closes the head. No Content-Length
    /// is emitted: the body runs until the connection closes, which is
    /// what `Connection: close` promises.
    pub fn into_http(self, server_ident: &str) -> Bytes {
        let mut buf = String::with_capacity(160);
        let status_code: &str = self.status_code.into();
        let status_message = self
            .status_code
            .get_message()
            .expect("every status variant carries a message");
        let date = http_date(OffsetDateTime::now_utc());

        write!(
            buf,
            "HTTP/1.1 {status_code} {status_message}\n\
             Date: {date}\n\
             Server: {server_ident}\n\
             Connection: close\n\
             Content-Type: {content_type}\n\n",
            content_type = self.content_type,
        )
        .expect("No reason to fail.");

        buf.into()
    }
}

/// IMF-fixdate against UTC, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`.
pub fn http_date(at: OffsetDateTime) -> String {
    let format = format_description!(
        "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
    );
    at.format(&format)
        .expect("formatting into a String cannot fail")
}
