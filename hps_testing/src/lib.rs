//! Utilities for driving a
//! [`StreamResponseReassembler`](hps_reassembler::StreamResponseReassembler)
//! from scripted transports during tests.
//!
//! [`ChunkedReader`] replays a fixed sequence of reads, interruptions, and
//! failures through both `std::io::Read` and `tokio::io::AsyncRead`, and the
//! fixture helpers build responses and push them through a reassembler in
//! chosen chunk sizes.
//!
//! ```rust
//! use hps_reassembler::StreamResponseReassembler;
//! use hps_testing::{ChunkedReader, response};
//!
//! let wire = response(200, b"Server: demo", b"hello");
//! let mut reassembler = StreamResponseReassembler::default();
//! let record = hps_reassembler::drive(ChunkedReader::from_chunks(&wire, 7), &mut reassembler)
//!     .expect("exchange completes");
//! assert_eq!(record.body(), b"hello");
//! ```

pub mod fixtures;
pub mod reader;

pub use fixtures::{feed_all, feed_split, response};
pub use reader::{ChunkedReader, ScriptedRead};
