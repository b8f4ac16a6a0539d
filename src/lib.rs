pub mod assertion;
pub mod config;
pub mod error;
pub mod http;
pub mod logger;
pub mod parser;
pub mod runner;
pub mod utils;
pub mod validator;
pub mod variable;

// Re-export commonly used types
pub use error::{Result, RucheckError};
pub use runner::{RunOptions, TestSummary, run_file};
