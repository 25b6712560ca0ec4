//! Document number sequencing.
//!
//! Every document type (transcode) owns a monotonic counter. Allocation
//! increments the counter and renders the new value through the transcode's
//! format template. Numbers are never reused or back-filled.

pub mod error;
pub mod service;
pub mod template;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::SequenceError;
pub use service::SequenceService;
pub use template::{FormatTemplate, SEQ_WIDTH, Segment};
pub use types::{Allocation, TranscodeCategory, TranscodeDefinition, TranscodeState};
