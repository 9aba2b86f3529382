//! Read loops that drive a reassembler from a transport.
//!
//! The reassembler itself never blocks; these helpers own the reads. Each
//! read is capped at the reassembler's window capacity, a zero-length read is
//! a clean close, and interrupted or would-block reads are retried.

use std::io::{self, Read, Write};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::{
    error::ReassemblerError,
    reassembler::{ResponseRecord, StepResult, StreamResponseReassembler},
    request::Request,
};

/// Drive one exchange to completion from a blocking reader.
///
/// # Errors
///
/// Returns [`ReassemblerError::Exchange`] when the exchange fails and
/// [`ReassemblerError::Io`] when the reader fails; in both cases the
/// reassembler is left in the `Failed` state.
pub fn drive<R: Read>(
    mut reader: R,
    reassembler: &mut StreamResponseReassembler,
) -> Result<ResponseRecord, ReassemblerError> {
    reassembler.start();
    let mut chunk = vec![0_u8; reassembler.capacity()];
    loop {
        let read = match reader.read(&mut chunk) {
            Ok(read) => read,
            Err(error) if is_retryable(&error) => continue,
            Err(error) => return Err(transport_failed(reassembler, error)),
        };
        if let Some(record) = step(reassembler, &chunk[..read])? {
            return Ok(record);
        }
    }
}

/// Drive one exchange to completion from an async reader.
///
/// # Errors
///
/// See [`drive`].
pub async fn drive_async<R: AsyncRead + Unpin>(
    mut reader: R,
    reassembler: &mut StreamResponseReassembler,
) -> Result<ResponseRecord, ReassemblerError> {
    reassembler.start();
    let mut chunk = vec![0_u8; reassembler.capacity()];
    loop {
        let read = match reader.read(&mut chunk).await {
            Ok(read) => read,
            Err(error) if is_retryable(&error) => continue,
            Err(error) => return Err(transport_failed(reassembler, error)),
        };
        if let Some(record) = step(reassembler, &chunk[..read])? {
            return Ok(record);
        }
    }
}

/// Write `request` to a blocking stream, then drive its response.
///
/// # Errors
///
/// Write failures are reported as [`ReassemblerError::Io`]; see [`drive`]
/// for read-side failures.
pub fn exchange<S: Read + Write>(
    mut stream: S,
    request: &Request,
    reassembler: &mut StreamResponseReassembler,
) -> Result<ResponseRecord, ReassemblerError> {
    let encoded = request.encode();
    stream.write_all(&encoded)?;
    stream.flush()?;
    debug!(method = %request.method(), len = encoded.len(), "request written");
    drive(stream, reassembler)
}

/// Write `request` to an async stream, then drive its response.
///
/// # Errors
///
/// See [`exchange`].
pub async fn exchange_async<S: AsyncRead + AsyncWrite + Unpin>(
    mut stream: S,
    request: &Request,
    reassembler: &mut StreamResponseReassembler,
) -> Result<ResponseRecord, ReassemblerError> {
    let encoded = request.encode();
    stream.write_all(&encoded).await?;
    stream.flush().await?;
    debug!(method = %request.method(), len = encoded.len(), "request written");
    drive_async(stream, reassembler).await
}

/// Feed one read into the reassembler.
///
/// Returns `Ok(Some(_))` once the exchange has completed.
fn step(
    reassembler: &mut StreamResponseReassembler,
    read: &[u8],
) -> Result<Option<ResponseRecord>, ReassemblerError> {
    let result = if read.is_empty() {
        debug!("transport closed");
        reassembler.finish()?
    } else {
        reassembler.feed(read)?
    };
    match result {
        StepResult::NeedMore => Ok(None),
        StepResult::Completed => reassembler.take_result().map(Some),
        StepResult::Failed(reason) => Err(ReassemblerError::Exchange(reason)),
    }
}

fn is_retryable(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock
    )
}

fn transport_failed(
    reassembler: &mut StreamResponseReassembler,
    error: io::Error,
) -> ReassemblerError {
    warn!(%error, "transport read failed");
    reassembler.fail_transport();
    ReassemblerError::Io(error)
}
