pub mod app;
pub mod outbound;
