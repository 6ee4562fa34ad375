//! Shortest-path search progress, streamed as newline-delimited JSON.

pub mod client;
pub mod decoder;

pub use client::{InFlight, PathClient, path_status_error};
pub use decoder::{LineDecoder, StreamData, consume_stream};
