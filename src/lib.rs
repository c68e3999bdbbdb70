pub mod client;
pub mod daemon;
pub mod domain;
pub mod protocol;
pub mod utils;
