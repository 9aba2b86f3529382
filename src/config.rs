//! Construction-time constants for the response reassembler.
//!
//! [`ReassemblerConfig`] bundles the working-window capacity, the per-field
//! capture cap, and the framing tokens used to split a response into its
//! status line, header block, and body.

use std::num::NonZeroUsize;

use crate::error::ConfigError;

/// Default working-window capacity, matching the transport's largest read.
pub const DEFAULT_MAX_CHUNK: usize = 1540;
/// Default cap applied to captured headers and body.
pub const DEFAULT_MAX_FIELD: usize = 1024;
/// Default number of bytes retained while resynchronising after a header
/// overflow.
pub const DEFAULT_RESYNC_TAIL: usize = 10;

const DEFAULT_STATUS_MARKER: &[u8] = b"HTTP/1.";
const DEFAULT_LINE_TERMINATOR: &[u8] = b"\r\n";
const DEFAULT_HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Limits and framing tokens for a [`StreamResponseReassembler`](crate::StreamResponseReassembler).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReassemblerConfig {
    max_chunk: NonZeroUsize,
    max_field: NonZeroUsize,
    resync_tail: usize,
    status_marker: Box<[u8]>,
    line_terminator: Box<[u8]>,
    header_terminator: Box<[u8]>,
}

impl ReassemblerConfig {
    /// Build a configuration with custom size limits and the default tokens.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the limits cannot guarantee progress, for
    /// example when `max_field` is not smaller than `max_chunk`.
    pub fn new(max_chunk: NonZeroUsize, max_field: NonZeroUsize) -> Result<Self, ConfigError> {
        let config = Self {
            max_chunk,
            max_field,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Replace the protocol-version marker searched for on the status line.
    #[must_use]
    pub fn with_status_marker(mut self, marker: impl Into<Box<[u8]>>) -> Self {
        self.status_marker = marker.into();
        self
    }

    /// Replace the status-line terminator.
    #[must_use]
    pub fn with_line_terminator(mut self, terminator: impl Into<Box<[u8]>>) -> Self {
        self.line_terminator = terminator.into();
        self
    }

    /// Replace the header/body separator.
    #[must_use]
    pub fn with_header_terminator(mut self, terminator: impl Into<Box<[u8]>>) -> Self {
        self.header_terminator = terminator.into();
        self
    }

    /// Replace the number of bytes kept while scanning past an oversized
    /// header block.
    #[must_use]
    pub fn with_resync_tail(mut self, tail: usize) -> Self {
        self.resync_tail = tail;
        self
    }

    /// Check that the limits and tokens are mutually consistent.
    ///
    /// Setters do not validate; [`StreamResponseReassembler::new`](crate::StreamResponseReassembler::new)
    /// calls this before accepting a configuration.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_field >= self.max_chunk {
            return Err(ConfigError::FieldCapNotBelowChunk {
                max_field: self.max_field,
                max_chunk: self.max_chunk,
            });
        }
        for (name, token) in [
            ("status_marker", &self.status_marker),
            ("line_terminator", &self.line_terminator),
            ("header_terminator", &self.header_terminator),
        ] {
            if token.is_empty() {
                return Err(ConfigError::EmptyToken { name });
            }
        }
        let straddle = self.header_terminator.len() - 1;
        if self.resync_tail < straddle || self.resync_tail >= self.max_field.get() {
            return Err(ConfigError::ResyncTailOutOfRange {
                tail: self.resync_tail,
                min: straddle,
                max_field: self.max_field,
            });
        }
        Ok(())
    }

    /// Capacity of the working window.
    #[must_use]
    pub const fn max_chunk(&self) -> usize { self.max_chunk.get() }

    /// Cap applied to captured headers and body.
    #[must_use]
    pub const fn max_field(&self) -> usize { self.max_field.get() }

    /// Bytes retained while resynchronising after a header overflow.
    #[must_use]
    pub const fn resync_tail(&self) -> usize { self.resync_tail }

    /// Protocol-version marker preceding the status code.
    #[must_use]
    pub fn status_marker(&self) -> &[u8] { &self.status_marker }

    /// Terminator ending the status line.
    #[must_use]
    pub fn line_terminator(&self) -> &[u8] { &self.line_terminator }

    /// Separator between the header block and the body.
    #[must_use]
    pub fn header_terminator(&self) -> &[u8] { &self.header_terminator }
}

impl Default for ReassemblerConfig {
    fn default() -> Self {
        Self {
            max_chunk: NonZeroUsize::new(DEFAULT_MAX_CHUNK).unwrap_or(NonZeroUsize::MIN),
            max_field: NonZeroUsize::new(DEFAULT_MAX_FIELD).unwrap_or(NonZeroUsize::MIN),
            resync_tail: DEFAULT_RESYNC_TAIL,
            status_marker: DEFAULT_STATUS_MARKER.into(),
            line_terminator: DEFAULT_LINE_TERMINATOR.into(),
            header_terminator: DEFAULT_HEADER_TERMINATOR.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use rstest::rstest;

    use super::*;

    fn nz(value: usize) -> NonZeroUsize { NonZeroUsize::new(value).expect("non-zero") }

    #[test]
    fn default_matches_proxy_limits() {
        let config = ReassemblerConfig::default();
        assert_eq!(config.max_chunk(), 1540);
        assert_eq!(config.max_field(), 1024);
        assert_eq!(config.resync_tail(), 10);
        assert_eq!(config.status_marker(), b"HTTP/1.");
        assert_eq!(config.header_terminator(), b"\r\n\r\n");
        config.validate().expect("default config must be valid");
    }

    #[rstest]
    #[case(64, 64)]
    #[case(64, 128)]
    fn field_cap_must_be_below_chunk(#[case] max_chunk: usize, #[case] max_field: usize) {
        let err = ReassemblerConfig::new(nz(max_chunk), nz(max_field))
            .expect_err("field cap at or above chunk must be rejected");
        assert!(matches!(err, ConfigError::FieldCapNotBelowChunk { .. }));
    }

    #[test]
    fn resync_tail_must_straddle_terminator() {
        let err = ReassemblerConfig::default()
            .with_resync_tail(2)
            .validate()
            .expect_err("tail shorter than terminator straddle must be rejected");
        assert!(matches!(
            err,
            ConfigError::ResyncTailOutOfRange { tail: 2, min: 3, .. }
        ));
    }

    #[test]
    fn empty_marker_is_rejected() {
        let err = ReassemblerConfig::default()
            .with_status_marker(Vec::new())
            .validate()
            .expect_err("empty marker must be rejected");
        assert_eq!(
            err,
            ConfigError::EmptyToken {
                name: "status_marker"
            }
        );
    }
}
