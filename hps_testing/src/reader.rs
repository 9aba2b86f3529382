//! Scripted blocking and async reader.

use std::{
    collections::VecDeque,
    io::{self, Read},
    pin::Pin,
    task::{Context, Poll},
};

use tokio::io::{AsyncRead, ReadBuf};

/// One scripted transport event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScriptedRead {
    /// Bytes returned by the next read, split further if the caller's buffer
    /// is smaller.
    ///
    /// An empty vector reads as `Ok(0)`, which drivers treat as a clean
    /// close; use it to script an early end-of-stream.
    Data(Vec<u8>),
    /// A read that fails with `ErrorKind::Interrupted`.
    Interrupted,
    /// A read that fails with the given kind.
    Error(io::ErrorKind),
}

/// Reader that replays a script, then reports end-of-stream.
#[derive(Clone, Debug, Default)]
pub struct ChunkedReader {
    script: VecDeque<ScriptedRead>,
}

impl ChunkedReader {
    /// Build a reader from an explicit script.
    ///
    /// Events after an empty [`ScriptedRead::Data`] are never reached by a
    /// driver, since that read ends the stream.
    #[must_use]
    pub fn new(script: impl IntoIterator<Item = ScriptedRead>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }

    /// Split `data` into reads of at most `chunk_size` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is zero.
    #[must_use]
    pub fn from_chunks(data: &[u8], chunk_size: usize) -> Self {
        Self::new(
            data.chunks(chunk_size)
                .map(|chunk| ScriptedRead::Data(chunk.to_vec())),
        )
    }

    /// Append a failing read after the scripted data.
    #[must_use]
    pub fn then_fail(mut self, kind: io::ErrorKind) -> Self {
        self.script.push_back(ScriptedRead::Error(kind));
        self
    }

    /// Number of scripted events not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize { self.script.len() }

    fn next_read(&mut self, capacity: usize) -> io::Result<Vec<u8>> {
        match self.script.pop_front() {
            None => Ok(Vec::new()),
            Some(ScriptedRead::Data(mut data)) => {
                if data.len() > capacity {
                    let rest = data.split_off(capacity);
                    self.script.push_front(ScriptedRead::Data(rest));
                }
                Ok(data)
            }
            Some(ScriptedRead::Interrupted) => Err(io::ErrorKind::Interrupted.into()),
            Some(ScriptedRead::Error(kind)) => Err(kind.into()),
        }
    }
}

impl Read for ChunkedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let data = self.next_read(buf.len())?;
        buf[..data.len()].copy_from_slice(&data);
        Ok(data.len())
    }
}

impl AsyncRead for ChunkedReader {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let capacity = buf.remaining();
        let data = self.get_mut().next_read(capacity)?;
        buf.put_slice(&data);
        Poll::Ready(Ok(()))
    }
}
