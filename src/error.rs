//! Canonical error types for the crate.
//!
//! [`FailureReason`] names why an exchange ended in the `Failed` state,
//! [`ReassemblerError`] is the surface returned by the reassembler and the
//! drivers, and [`ConfigError`] reports inconsistent limits.

use std::{io, num::NonZeroUsize};

use thiserror::Error;

use crate::reassembler::ReassemblyState;

/// Terminal failure of a single exchange.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash)]
pub enum FailureReason {
    /// The status line carried no parsable status code.
    #[error("malformed status line")]
    MalformedStatusLine,
    /// The working window filled without the state machine making progress,
    /// or a chunk larger than the window was fed.
    #[error("working buffer overflow")]
    BufferOverflow,
    /// The transport closed before the header block was complete.
    #[error("stream closed before headers were complete")]
    Truncated,
    /// The transport reported a read failure.
    #[error("transport error")]
    TransportError,
    /// The driver cancelled the exchange.
    #[error("exchange aborted")]
    Aborted,
    /// Memory for a captured field could not be reserved.
    #[error("allocation failure")]
    AllocationFailure,
}

impl FailureReason {
    /// Stable label used for logging and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MalformedStatusLine => "malformed_status_line",
            Self::BufferOverflow => "buffer_overflow",
            Self::Truncated => "truncated",
            Self::TransportError => "transport_error",
            Self::Aborted => "aborted",
            Self::AllocationFailure => "allocation_failure",
        }
    }
}

/// Errors surfaced by the reassembler and its drivers.
#[derive(Debug, Error)]
pub enum ReassemblerError {
    /// An operation was invoked in a state that does not permit it.
    ///
    /// Misuse never changes the reassembler's state.
    #[error("cannot {operation} while reassembler is {state}")]
    InvalidState {
        /// Operation that was attempted.
        operation: &'static str,
        /// State the reassembler was in.
        state: ReassemblyState,
    },
    /// The exchange ended in the `Failed` state.
    #[error("exchange failed: {0}")]
    Exchange(#[from] FailureReason),
    /// The transport failed while an exchange was being driven.
    #[error("transport error: {0}")]
    Io(#[from] io::Error),
}

impl ReassemblerError {
    /// The failure reason recorded for the exchange, if any.
    #[must_use]
    pub fn failure_reason(&self) -> Option<FailureReason> {
        match self {
            Self::Exchange(reason) => Some(*reason),
            Self::Io(_) => Some(FailureReason::TransportError),
            Self::InvalidState { .. } => None,
        }
    }
}

/// Inconsistent [`ReassemblerConfig`](crate::ReassemblerConfig) limits.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Header overflow would never trigger before the window filled.
    #[error("max_field ({max_field}) must be smaller than max_chunk ({max_chunk})")]
    FieldCapNotBelowChunk {
        /// Configured field cap.
        max_field: NonZeroUsize,
        /// Configured window capacity.
        max_chunk: NonZeroUsize,
    },
    /// A framing token was empty.
    #[error("{name} must not be empty")]
    EmptyToken {
        /// Name of the offending token.
        name: &'static str,
    },
    /// The resync tail cannot straddle a split terminator, or leaves no room
    /// for new bytes.
    #[error("resync tail {tail} must be at least {min} and below max_field ({max_field})")]
    ResyncTailOutOfRange {
        /// Configured tail length.
        tail: usize,
        /// Smallest tail that still catches a split terminator.
        min: usize,
        /// Configured field cap.
        max_field: NonZeroUsize,
    },
}
