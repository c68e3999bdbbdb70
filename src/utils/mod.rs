pub mod stream;
pub mod time;
pub mod tracing;
pub mod xdg;
