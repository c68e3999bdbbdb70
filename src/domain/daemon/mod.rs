pub mod dispatcher;
pub mod inbound;
pub mod outbound;
pub mod recorder;

mod app;
mod worker;

pub use app::{ApplicationCore, SetupApplicationCoreError};
