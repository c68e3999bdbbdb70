mod environment;
mod process;

pub use environment::{Environment, SetupEnvironmentError, PRIVATE_MODE};
pub use process::{ControlProcessError, ProcessController};
