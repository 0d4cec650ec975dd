mod command;
mod executor;
mod store;

pub use command::{build_command, sanitize, ExecConfig, RunEnv};
pub use executor::{Executor, MAX_CAPTURE_BYTES};
pub use store::{ExecutionRecord, ExecutionStore};
