//! Incremental reassembly of a response from bounded stream chunks.
//!
//! [`StreamResponseReassembler`] classifies bytes arriving from a transport
//! into a status line, a header block, and a body while holding at most
//! `max_chunk` unclassified bytes. Captured headers and body are capped at
//! `max_field`; excess is dropped and flagged rather than treated as an
//! error.
//!
//! ## Header overflow
//!
//! When the header block grows past `max_field` before its separator
//! arrives, the first `max_field` bytes become the (truncated) header
//! capture and the window keeps only a short tail so a separator split
//! across reads is still found. Header bytes between the cap and the
//! separator are lost. Body capture starts after the real separator.
//!
//! ## End of body
//!
//! The body has no length framing at this layer: it ends when the transport
//! closes cleanly, signalled through [`StreamResponseReassembler::finish`].

mod buffer;
mod record;
mod state;
mod status;

use tracing::{debug, trace, warn};

pub use record::{DataStatus, ResponseRecord};
pub use state::{HeaderCapture, ReassemblyState, StepResult};

use self::{buffer::WorkingBuffer, record::PartialRecord, status::parse_status_code};
use crate::{
    config::ReassemblerConfig,
    error::{ConfigError, FailureReason, ReassemblerError},
    metrics::{self, Field, Outcome},
};

/// Single-exchange response reassembler with bounded working memory.
///
/// One instance drives one exchange at a time from one calling context.
/// Call [`start`](Self::start), then [`feed`](Self::feed) every chunk read
/// from the transport in order, then [`finish`](Self::finish) on a clean
/// close, and collect the record with [`take_result`](Self::take_result).
///
/// # Examples
///
/// ```
/// use hps_reassembler::{ReassemblerConfig, StepResult, StreamResponseReassembler};
///
/// let mut reassembler =
///     StreamResponseReassembler::new(ReassemblerConfig::default()).expect("valid config");
/// reassembler.start();
/// let step = reassembler
///     .feed(b"HTTP/1.1 200 OK\r\nX-Id: 7\r\n\r\nhello")
///     .expect("exchange is active");
/// assert_eq!(step, StepResult::NeedMore);
/// assert_eq!(reassembler.finish().expect("exchange is active"), StepResult::Completed);
///
/// let record = reassembler.take_result().expect("record is ready");
/// assert_eq!(record.status_code(), 200);
/// assert_eq!(record.body(), b"hello");
/// ```
#[derive(Debug)]
pub struct StreamResponseReassembler {
    config: ReassemblerConfig,
    state: ReassemblyState,
    buffer: WorkingBuffer,
    partial: PartialRecord,
    completed: Option<ResponseRecord>,
}

impl StreamResponseReassembler {
    /// Create an idle reassembler.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `config` fails
    /// [`ReassemblerConfig::validate`].
    pub fn new(config: ReassemblerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_validated(config))
    }

    fn with_validated(config: ReassemblerConfig) -> Self {
        let buffer = WorkingBuffer::with_capacity(config.max_chunk());
        let partial = PartialRecord::new(config.max_field());
        Self {
            config,
            state: ReassemblyState::Idle,
            buffer,
            partial,
            completed: None,
        }
    }

    /// Begin a new exchange, discarding any partial or unclaimed record.
    pub fn start(&mut self) {
        self.reset();
        self.state = ReassemblyState::AwaitingStatusLine;
        debug!(state = %self.state, "exchange started");
    }

    /// Feed the next chunk read from the transport.
    ///
    /// Chunks larger than the working window violate the transport contract
    /// and fail the exchange with [`FailureReason::BufferOverflow`]. An empty
    /// chunk is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ReassemblerError::InvalidState`] when no exchange is active.
    /// Protocol failures are reported as [`StepResult::Failed`].
    pub fn feed(&mut self, chunk: &[u8]) -> Result<StepResult, ReassemblerError> {
        if !self.state.is_active() {
            return Err(self.invalid_state("feed"));
        }
        trace!(len = chunk.len(), state = %self.state, "chunk received");
        if chunk.len() > self.buffer.capacity() {
            warn!(
                len = chunk.len(),
                cap = self.buffer.capacity(),
                "chunk exceeds working window"
            );
            return Ok(self.fail(FailureReason::BufferOverflow));
        }

        let mut remaining = chunk;
        loop {
            if self.state == ReassemblyState::AwaitingBody {
                if let Err(reason) = self.capture_body(remaining) {
                    return Ok(self.fail(reason));
                }
                return Ok(StepResult::NeedMore);
            }

            let rejected = self.buffer.append(remaining);
            remaining = &remaining[remaining.len() - rejected..];
            if let Err(reason) = self.advance() {
                return Ok(self.fail(reason));
            }
            if self.state != ReassemblyState::AwaitingBody && self.buffer.is_full() {
                warn!(
                    state = %self.state,
                    cap = self.buffer.capacity(),
                    "working window filled without progress"
                );
                return Ok(self.fail(FailureReason::BufferOverflow));
            }
            if remaining.is_empty() {
                return Ok(StepResult::NeedMore);
            }
        }
    }

    /// Signal a clean end-of-stream from the transport.
    ///
    /// Closing while awaiting the body completes the exchange with whatever
    /// body bytes were captured. Closing earlier fails the exchange with
    /// [`FailureReason::Truncated`]. Terminal states report their outcome
    /// again.
    ///
    /// # Errors
    ///
    /// Returns [`ReassemblerError::InvalidState`] when the reassembler is idle.
    pub fn finish(&mut self) -> Result<StepResult, ReassemblerError> {
        match self.state {
            ReassemblyState::Idle => Err(self.invalid_state("finish")),
            ReassemblyState::AwaitingBody => Ok(self.complete()),
            ReassemblyState::AwaitingStatusLine | ReassemblyState::AwaitingHeaders(_) => {
                Ok(self.fail(FailureReason::Truncated))
            }
            ReassemblyState::Done => Ok(StepResult::Completed),
            ReassemblyState::Failed(reason) => Ok(StepResult::Failed(reason)),
        }
    }

    /// Cancel the exchange.
    ///
    /// Forces [`FailureReason::Aborted`] from any non-terminal state and is a
    /// no-op once the exchange is `Done` or `Failed`.
    pub fn abort(&mut self) {
        if !self.state.is_terminal() {
            self.fail(FailureReason::Aborted);
        }
    }

    /// Record a transport read failure.
    ///
    /// Forces [`FailureReason::TransportError`] from any non-terminal state.
    pub fn fail_transport(&mut self) {
        if !self.state.is_terminal() {
            self.fail(FailureReason::TransportError);
        }
    }

    /// Take the completed record and return to `Idle`.
    ///
    /// # Errors
    ///
    /// Returns [`ReassemblerError::InvalidState`] unless the exchange has
    /// completed.
    pub fn take_result(&mut self) -> Result<ResponseRecord, ReassemblerError> {
        if self.state != ReassemblyState::Done {
            return Err(self.invalid_state("take result"));
        }
        let record = self
            .completed
            .take()
            .ok_or_else(|| self.invalid_state("take result"))?;
        self.state = ReassemblyState::Idle;
        Ok(record)
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> ReassemblyState { self.state }

    /// Failure reason when the exchange has failed.
    #[must_use]
    pub const fn failure(&self) -> Option<FailureReason> {
        match self.state {
            ReassemblyState::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    /// Unclassified bytes currently held in the working window.
    #[must_use]
    pub fn buffered_len(&self) -> usize { self.buffer.len() }

    /// Capacity of the working window.
    #[must_use]
    pub fn capacity(&self) -> usize { self.buffer.capacity() }

    /// Configuration this reassembler was built with.
    #[must_use]
    pub const fn config(&self) -> &ReassemblerConfig { &self.config }

    /// Run the state machine until it needs more bytes.
    fn advance(&mut self) -> Result<(), FailureReason> {
        loop {
            let progressed = match self.state {
                ReassemblyState::AwaitingStatusLine => self.parse_status_line()?,
                ReassemblyState::AwaitingHeaders(capture) => self.scan_headers(capture)?,
                ReassemblyState::AwaitingBody => {
                    let pending = self.buffer.drain();
                    self.capture_body(&pending)?;
                    false
                }
                ReassemblyState::Idle | ReassemblyState::Done | ReassemblyState::Failed(_) => {
                    false
                }
            };
            if !progressed {
                return Ok(());
            }
        }
    }

    fn parse_status_line(&mut self) -> Result<bool, FailureReason> {
        let Some(line_len) = self.buffer.find(self.config.line_terminator()) else {
            return Ok(false);
        };
        let line = &self.buffer.as_slice()[..line_len];
        let Some(status_code) = parse_status_code(line, self.config.status_marker()) else {
            warn!(line_len, "status line carries no status code");
            return Err(FailureReason::MalformedStatusLine);
        };

        self.buffer
            .discard_front(line_len + self.config.line_terminator().len());
        self.partial.status_code = Some(status_code);
        self.transition(ReassemblyState::AwaitingHeaders(HeaderCapture::Capturing));
        debug!(status_code, "status line parsed");
        Ok(true)
    }

    fn scan_headers(&mut self, capture: HeaderCapture) -> Result<bool, FailureReason> {
        let terminator_len = self.config.header_terminator().len();
        if let Some(offset) = self.buffer.find(self.config.header_terminator()) {
            let block_len = offset + terminator_len;
            match capture {
                HeaderCapture::Capturing => {
                    let block = self.buffer.consume_front(block_len);
                    self.capture_headers(&block)?;
                }
                HeaderCapture::Truncated => self.buffer.discard_front(block_len),
            }
            self.transition(ReassemblyState::AwaitingBody);
            return Ok(true);
        }

        match capture {
            HeaderCapture::Capturing if self.buffer.len() > self.config.max_field() => {
                let window = self.buffer.consume_front(self.buffer.len());
                self.capture_headers(&window)?;
                let tail = self.config.resync_tail();
                self.buffer.append(&window[window.len() - tail..]);
                self.transition(ReassemblyState::AwaitingHeaders(HeaderCapture::Truncated));
            }
            HeaderCapture::Truncated => self.buffer.retain_tail(self.config.resync_tail()),
            HeaderCapture::Capturing => {}
        }
        Ok(false)
    }

    fn capture_headers(&mut self, block: &[u8]) -> Result<(), FailureReason> {
        if self.partial.headers.push(block)? {
            warn!(
                len = block.len(),
                cap = self.config.max_field(),
                "header block truncated"
            );
            metrics::inc_truncations(Field::Headers);
        }
        Ok(())
    }

    fn capture_body(&mut self, data: &[u8]) -> Result<(), FailureReason> {
        if self.partial.body.push(data)? {
            warn!(
                captured = self.partial.body.len(),
                cap = self.config.max_field(),
                "body truncated, discarding remaining bytes"
            );
            metrics::inc_truncations(Field::Body);
        }
        Ok(())
    }

    fn complete(&mut self) -> StepResult {
        let partial = std::mem::replace(
            &mut self.partial,
            PartialRecord::new(self.config.max_field()),
        );
        let Some(record) = partial.finish() else {
            return self.fail(FailureReason::Truncated);
        };
        debug!(
            status_code = record.status_code(),
            headers_len = record.headers().len(),
            headers_truncated = record.headers_truncated(),
            body_len = record.body().len(),
            body_truncated = record.body_truncated(),
            "exchange completed"
        );
        metrics::inc_exchanges(Outcome::Completed);
        self.buffer.clear();
        self.completed = Some(record);
        self.transition(ReassemblyState::Done);
        StepResult::Completed
    }

    fn fail(&mut self, reason: FailureReason) -> StepResult {
        warn!(state = %self.state, reason = reason.as_str(), "exchange failed");
        metrics::inc_exchanges(Outcome::Failed);
        metrics::inc_failures(reason);
        self.reset();
        self.state = ReassemblyState::Failed(reason);
        StepResult::Failed(reason)
    }

    fn reset(&mut self) {
        self.buffer.clear();
        self.partial = PartialRecord::new(self.config.max_field());
        self.completed = None;
    }

    fn transition(&mut self, next: ReassemblyState) {
        trace!(from = %self.state, to = %next, "state transition");
        self.state = next;
    }

    fn invalid_state(&self, operation: &'static str) -> ReassemblerError {
        ReassemblerError::InvalidState {
            operation,
            state: self.state,
        }
    }
}

impl Default for StreamResponseReassembler {
    fn default() -> Self { Self::with_validated(ReassemblerConfig::default()) }
}
