pub mod engine;
pub mod model;
pub mod month;
pub mod summary;
pub mod types;

pub use engine::*;
pub use model::*;
pub use month::*;
pub use summary::*;
pub use types::*;
