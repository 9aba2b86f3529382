//! Command line interface for the `hps-reassembler` binary.
//!
//! The binary replays a captured response through the reassembler in fixed
//! size reads and reports what was captured.

use std::path::PathBuf;

use clap::Parser;

/// Command line arguments for the `hps-reassembler` binary.
#[derive(Debug, Parser)]
#[command(
    name = "hps-reassembler",
    version,
    about = "Reassemble a captured HTTP response under proxy memory limits"
)]
pub struct Cli {
    /// Captured response to replay; reads stdin when omitted.
    pub input: Option<PathBuf>,

    /// Bytes delivered per simulated transport read.
    #[arg(short, long, default_value_t = 512)]
    pub chunk_size: usize,

    /// Working window capacity.
    #[arg(long, default_value_t = 1540)]
    pub max_chunk: usize,

    /// Cap for captured headers and body.
    #[arg(long, default_value_t = 1024)]
    pub max_field: usize,
}
