pub mod builder;
pub mod core;

pub use builder::*;
pub use self::core::*;
