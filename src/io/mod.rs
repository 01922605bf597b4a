//! File access: line sources and record decoding.

pub mod decode;
pub mod source;

pub use decode::RecordDecoder;
pub use source::LineSource;
