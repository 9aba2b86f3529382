//! Replays a captured HTTP response through the reassembler.
//!
//! Reads the capture from a file or stdin, feeds it in fixed-size reads,
//! and prints the resulting record summary.

mod cli;

use std::{error::Error, num::NonZeroUsize};

use clap::Parser;
use hps_reassembler::{
    DataStatus,
    ReassemblerConfig,
    ReassemblerError,
    StepResult,
    StreamResponseReassembler,
};
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();
    let config = ReassemblerConfig::new(
        NonZeroUsize::new(cli.max_chunk).ok_or("--max-chunk must be non-zero")?,
        NonZeroUsize::new(cli.max_field).ok_or("--max-field must be non-zero")?,
    )?;
    if cli.chunk_size == 0 || cli.chunk_size > config.max_chunk() {
        return Err(format!(
            "--chunk-size must be between 1 and {}",
            config.max_chunk()
        )
        .into());
    }

    let capture = match &cli.input {
        Some(path) => tokio::fs::read(path).await?,
        None => {
            let mut data = Vec::new();
            tokio::io::stdin().read_to_end(&mut data).await?;
            data
        }
    };

    let mut reassembler = StreamResponseReassembler::new(config)?;
    reassembler.start();
    for chunk in capture.chunks(cli.chunk_size) {
        if let StepResult::Failed(reason) = reassembler.feed(chunk)? {
            return Err(ReassemblerError::Exchange(reason).into());
        }
    }
    if let StepResult::Failed(reason) = reassembler.finish()? {
        return Err(ReassemblerError::Exchange(reason).into());
    }

    let record = reassembler.take_result()?;
    let status = record.data_status();
    println!("status code:  {}", record.status_code());
    println!("data status:  {:#04x}", status.bits());
    println!(
        "headers:      {} bytes{}",
        record.headers().len(),
        if status.contains(DataStatus::HEADERS_TRUNCATED) {
            " (truncated)"
        } else {
            ""
        }
    );
    println!(
        "body:         {} bytes{}",
        record.body().len(),
        if status.contains(DataStatus::BODY_TRUNCATED) {
            " (truncated)"
        } else {
            ""
        }
    );
    Ok(())
}
