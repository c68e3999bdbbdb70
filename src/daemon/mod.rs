pub mod app;
pub mod config;
pub mod outbound;
pub mod repository;
pub mod runtime;
