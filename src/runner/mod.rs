pub mod manager;
pub mod reporter;
pub mod session;
pub mod types;

pub use manager::{RunState, TestManager};
pub use reporter::TestReporter;
pub use session::{RunOptions, load_variables, run_file};
pub use types::{TestResult, TestResultCollector, TestSummary};
