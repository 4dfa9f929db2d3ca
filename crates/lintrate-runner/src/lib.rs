pub mod aggregate;
pub mod catalog;
pub mod config;
pub mod error;
pub mod months;
pub mod runner;

pub use aggregate::*;
pub use catalog::*;
pub use config::*;
pub use error::*;
pub use months::*;
pub use runner::*;
