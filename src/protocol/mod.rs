pub mod document;
pub mod format;
pub mod matches;
pub mod tree;

pub use document::*;
pub use format::*;
pub use matches::*;
pub use tree::*;
