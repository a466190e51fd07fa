pub mod launch;
pub mod service;

pub use launch::*;
pub use service::*;
