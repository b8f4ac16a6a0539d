pub mod capture;
pub mod loader;
pub mod manager;
pub mod processor;
pub mod resolver;
pub mod types;

pub use capture::{UpdateExpression, VariableUpdate};
pub use loader::VariablesLoader;
pub use manager::VariableManager;
pub use processor::{ResponseProcessor, UpdateError};
pub use resolver::VariableResolver;
pub use types::VariableValue;
