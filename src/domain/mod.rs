pub mod client;
pub mod daemon;
pub mod entity;
pub mod repository;
