#![doc(html_root_url = "https://docs.rs/hps-reassembler/latest")]
//! Public API for the `hps_reassembler` library.
//!
//! This crate turns an HTTP/1.x response arriving in bounded transport reads
//! into a single record of status code, header block, and body, holding a
//! fixed amount of unclassified data at any time and capping what it keeps
//! of each field.

pub mod config;
pub mod driver;
pub mod error;
pub mod metrics;
pub mod reassembler;
pub mod request;

pub use config::ReassemblerConfig;
pub use driver::{drive, drive_async, exchange, exchange_async};
pub use error::{ConfigError, FailureReason, ReassemblerError};
pub use reassembler::{
    DataStatus,
    HeaderCapture,
    ReassemblyState,
    ResponseRecord,
    StepResult,
    StreamResponseReassembler,
};
pub use request::{Method, Request, RequestError};
