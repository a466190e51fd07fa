//! CoreNLP client library
//! Async Rust client for the Stanford CoreNLP annotation server: launches or
//! attaches to a server, annotates text and runs tokensregex, semgrex and
//! tregex queries.

pub mod client;
pub mod demo;
pub mod error;
pub mod pipeline;
pub mod properties;
pub mod protocol;
pub mod server;

// Re-export for convenience
pub use client::{AnnotateOptions, Annotation, Client, ClientBuilder, RegexOptions, ServerProperties, StartServer};
pub use error::*;
pub use properties::Properties;
