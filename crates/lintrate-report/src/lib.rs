pub mod document;
pub mod writer;

pub use document::*;
pub use writer::*;
