pub mod config;
pub mod error;
pub mod types;

pub use config::CompilerConfig;
pub use error::{ExportError, Result};
pub use types::{fr, num, Num};
