pub mod client;
pub mod executor;
pub mod request;
pub mod response;
pub mod types;

// Re-export commonly used types for convenient access
pub use client::Client;
pub use executor::RequestExecutor;
pub use request::{Payload, Request};
pub use response::Response;
pub use types::{Method, RequestError, Status};
