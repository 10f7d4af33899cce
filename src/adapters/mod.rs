// Adapters layer: concrete record sources and download sinks.

pub mod sink;
pub mod source;

#[cfg(feature = "lambda")]
pub mod s3;
