//! Ready-made Processor Hooks for `Record` pipelines.
//!
//! - `SequenceNamer`: names payloads received by a listener
//! - `TextAnnotator`: sends record data out and stores the text reply
//! - `JsonEncoder`: serializes records for broadcasting

mod annotate;
mod json;
mod naming;

pub use annotate::TextAnnotator;
pub use json::JsonEncoder;
pub use naming::SequenceNamer;
