//! Core-facing boundary of the velo measurement server.
//!
//! The surrounding HTTP layer parses transport-level requests and calls the
//! handlers here with typed parameters and a sink; everything transportish
//! (routing, headers, CORS, body-size plumbing) stays outside. This crate
//! owns parameter validation, the immutable server configuration, response
//! shaping, and upload accounting.
//!
//! Validation failures are reported before any byte is streamed; once a
//! stream has started, failures are logged and the connection simply ends
//! short; a streaming response cannot change its status after the fact.

pub use self::config::ServerConfig;
pub use self::error::{ApiError, ErrorBody};
pub use self::handler::{
    PreparedDownload, handle_adaptive, handle_latency, handle_upload, handle_warmup,
    prepare_download,
};
pub use self::params::{AdaptiveParams, DownloadParams, ProbeParams, UploadMeta};
pub use self::response::{DownloadStarted, UploadReport};

mod config;
mod error;
mod handler;
mod params;
mod response;
mod upload;
