//! Outbound request encoding for proxied HTTP exchanges.
//!
//! A [`Request`] renders to an HTTP/1.0 request so that the peer closes the
//! connection after the response, which is how the reassembler learns where
//! the body ends.

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;

/// Largest URI, header block, or body a proxy client can hand over.
pub const MAX_REQUEST_FIELD: usize = 512;

const PROTOCOL: &[u8] = b"HTTP/1.0";
const CRLF: &[u8] = b"\r\n";
const FORM_CONTENT_TYPE: &[u8] = b"Content-Type:application/x-www-form-urlencoded";

/// Request methods a proxy client may ask for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    /// `GET`
    Get,
    /// `HEAD`
    Head,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
}

impl Method {
    /// Method token as written on the request line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    /// True for methods whose request carries a body.
    #[must_use]
    pub const fn carries_body(self) -> bool { matches!(self, Self::Post | Self::Put) }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Errors raised while building a [`Request`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    /// A field exceeded [`MAX_REQUEST_FIELD`].
    #[error("{field} is {len} bytes, limit is {MAX_REQUEST_FIELD}")]
    FieldTooLong {
        /// Name of the oversized field.
        field: &'static str,
        /// Length that was supplied.
        len: usize,
    },
    /// The URI was empty or contained whitespace.
    #[error("invalid request uri")]
    InvalidUri,
}

/// An outbound request: method, URI, raw header block, and body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    method: Method,
    uri: Bytes,
    headers: Bytes,
    body: Bytes,
}

impl Request {
    /// Create a request with no extra headers and no body.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError`] when the URI is empty, contains whitespace,
    /// or is longer than [`MAX_REQUEST_FIELD`].
    pub fn new(method: Method, uri: impl Into<Bytes>) -> Result<Self, RequestError> {
        let uri = uri.into();
        check_len("uri", &uri)?;
        if uri.is_empty() || uri.iter().any(u8::is_ascii_whitespace) {
            return Err(RequestError::InvalidUri);
        }
        Ok(Self {
            method,
            uri,
            headers: Bytes::new(),
            body: Bytes::new(),
        })
    }

    /// Attach a raw header block, one `Name: value` line per header.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::FieldTooLong`] for blocks over
    /// [`MAX_REQUEST_FIELD`].
    pub fn with_headers(mut self, headers: impl Into<Bytes>) -> Result<Self, RequestError> {
        let headers = headers.into();
        check_len("headers", &headers)?;
        self.headers = headers;
        Ok(self)
    }

    /// Attach a body. Methods that do not carry a body ignore it on encode.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::FieldTooLong`] for bodies over
    /// [`MAX_REQUEST_FIELD`].
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Result<Self, RequestError> {
        let body = body.into();
        check_len("body", &body)?;
        self.body = body;
        Ok(self)
    }

    /// Request method.
    #[must_use]
    pub const fn method(&self) -> Method { self.method }

    /// Request URI.
    #[must_use]
    pub fn uri(&self) -> &[u8] { &self.uri }

    /// Render the request bytes.
    #[must_use]
    pub fn encode(&self) -> Bytes {
        let mut out = BytesMut::with_capacity(
            self.uri.len() + self.headers.len() + self.body.len() + 128,
        );
        out.put_slice(self.method.as_str().as_bytes());
        out.put_u8(b' ');
        out.put_slice(&self.uri);
        out.put_u8(b' ');
        out.put_slice(PROTOCOL);
        out.put_slice(CRLF);

        if !self.headers.is_empty() {
            out.put_slice(&self.headers);
            if !self.headers.ends_with(CRLF) {
                out.put_slice(CRLF);
            }
        }
        if self.method.carries_body() {
            out.put_slice(format!("Content-Length:{}", self.body.len()).as_bytes());
            out.put_slice(CRLF);
            out.put_slice(FORM_CONTENT_TYPE);
            out.put_slice(CRLF);
        }
        out.put_slice(CRLF);
        if self.method.carries_body() {
            out.put_slice(&self.body);
        }
        out.freeze()
    }
}

fn check_len(field: &'static str, value: &[u8]) -> Result<(), RequestError> {
    if value.len() > MAX_REQUEST_FIELD {
        return Err(RequestError::FieldTooLong {
            field,
            len: value.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Method::Get, &b"GET /index.html HTTP/1.0\r\n\r\n"[..])]
    #[case(Method::Head, &b"HEAD /index.html HTTP/1.0\r\n\r\n"[..])]
    #[case(Method::Delete, &b"DELETE /index.html HTTP/1.0\r\n\r\n"[..])]
    fn bodiless_methods_end_after_request_line(#[case] method: Method, #[case] expected: &[u8]) {
        let request = Request::new(method, "/index.html")
            .and_then(|request| request.with_body("ignored"))
            .expect("valid request");
        assert_eq!(request.encode().as_ref(), expected);
    }

    #[test]
    fn post_carries_length_and_form_type() {
        let request = Request::new(Method::Post, "/submit")
            .and_then(|request| request.with_body("a=1&b=2"))
            .expect("valid request");
        assert_eq!(
            request.encode().as_ref(),
            b"POST /submit HTTP/1.0\r\nContent-Length:7\r\n\
              Content-Type:application/x-www-form-urlencoded\r\n\r\na=1&b=2"
        );
    }

    #[test]
    fn caller_headers_are_terminated() {
        let request = Request::new(Method::Get, "/")
            .and_then(|request| request.with_headers("Host: example.com"))
            .expect("valid request");
        assert_eq!(
            request.encode().as_ref(),
            b"GET / HTTP/1.0\r\nHost: example.com\r\n\r\n"
        );
    }

    #[rstest]
    #[case("")]
    #[case("/with space")]
    fn rejects_invalid_uri(#[case] uri: &'static str) {
        assert_eq!(
            Request::new(Method::Get, uri).expect_err("uri must be rejected"),
            RequestError::InvalidUri
        );
    }

    #[test]
    fn rejects_oversized_body() {
        let err = Request::new(Method::Put, "/")
            .and_then(|request| request.with_body(vec![b'x'; MAX_REQUEST_FIELD + 1]))
            .expect_err("oversized body must be rejected");
        assert_eq!(
            err,
            RequestError::FieldTooLong {
                field: "body",
                len: MAX_REQUEST_FIELD + 1,
            }
        );
    }
}
