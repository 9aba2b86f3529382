//! Response builders and feeding helpers.

use hps_reassembler::{ReassemblerError, StepResult, StreamResponseReassembler};

/// Build an HTTP/1.1 response with the given status, header lines, and body.
///
/// `headers` holds `Name: value` lines joined by CRLF, without a trailing
/// line break; the header terminator is appended here.
#[must_use]
pub fn response(status: u16, headers: &[u8], body: &[u8]) -> Vec<u8> {
    let mut wire = format!("HTTP/1.1 {status} Reason\r\n").into_bytes();
    wire.extend_from_slice(headers);
    wire.extend_from_slice(b"\r\n\r\n");
    wire.extend_from_slice(body);
    wire
}

/// Start an exchange, feed every chunk, then signal a clean close.
///
/// Stops at the first failure and returns it.
///
/// # Errors
///
/// Propagates [`ReassemblerError::InvalidState`] from the reassembler.
pub fn feed_all<'a>(
    reassembler: &mut StreamResponseReassembler,
    chunks: impl IntoIterator<Item = &'a [u8]>,
) -> Result<StepResult, ReassemblerError> {
    reassembler.start();
    for chunk in chunks {
        if let failed @ StepResult::Failed(_) = reassembler.feed(chunk)? {
            return Ok(failed);
        }
    }
    reassembler.finish()
}

/// Feed `wire` split into two chunks at `split`, then close.
///
/// # Errors
///
/// See [`feed_all`].
pub fn feed_split(
    reassembler: &mut StreamResponseReassembler,
    wire: &[u8],
    split: usize,
) -> Result<StepResult, ReassemblerError> {
    let (head, tail) = wire.split_at(split);
    feed_all(reassembler, [head, tail])
}
