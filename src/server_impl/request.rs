use crate::server_impl::server::Method;

/// The slice of the request line a worker actually acts on. Header lines
/// past the first are drained off the socket but carry no semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request<'a> {
    pub method: Method,
    pub target: &'a str,
}
