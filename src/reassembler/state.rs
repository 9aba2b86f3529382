//! States and step outcomes of the reassembly state machine.

use std::fmt;

use crate::error::FailureReason;

/// Whether the header block is still being captured or was already cut at
/// the field cap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeaderCapture {
    /// Header bytes are buffered until the separator arrives.
    Capturing,
    /// The first `max_field` bytes were captured; the window only keeps a
    /// short tail while scanning for the real separator.
    Truncated,
}

/// Lifecycle of a single exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReassemblyState {
    /// No exchange in progress.
    Idle,
    /// Looking for the status-line terminator.
    AwaitingStatusLine,
    /// Looking for the separator that ends the header block.
    AwaitingHeaders(HeaderCapture),
    /// Accumulating body bytes until the transport closes.
    AwaitingBody,
    /// A complete record is ready for [`take_result`](super::StreamResponseReassembler::take_result).
    Done,
    /// The exchange cannot proceed.
    Failed(FailureReason),
}

impl ReassemblyState {
    /// True while an exchange accepts bytes.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(
            self,
            Self::AwaitingStatusLine | Self::AwaitingHeaders(_) | Self::AwaitingBody
        )
    }

    /// True for `Done` and `Failed`.
    #[must_use]
    pub const fn is_terminal(self) -> bool { matches!(self, Self::Done | Self::Failed(_)) }
}

impl fmt::Display for ReassemblyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::AwaitingStatusLine => f.write_str("awaiting status line"),
            Self::AwaitingHeaders(HeaderCapture::Capturing) => f.write_str("awaiting headers"),
            Self::AwaitingHeaders(HeaderCapture::Truncated) => {
                f.write_str("awaiting headers (resyncing)")
            }
            Self::AwaitingBody => f.write_str("awaiting body"),
            Self::Done => f.write_str("done"),
            Self::Failed(reason) => write!(f, "failed ({reason})"),
        }
    }
}

/// Outcome of feeding bytes or signalling end-of-stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepResult {
    /// The exchange needs more bytes.
    NeedMore,
    /// A record is ready.
    Completed,
    /// The exchange failed and must be restarted.
    Failed(FailureReason),
}
