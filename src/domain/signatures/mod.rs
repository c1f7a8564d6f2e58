//! Signature universe collection

pub mod signature_collector;

pub use signature_collector::{SignatureCollector, DEFAULT_MAX_SIGNATURES};
