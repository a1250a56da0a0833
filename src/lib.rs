pub mod cli;
pub mod client;
pub mod config;
pub mod core;
pub mod error;
pub mod handlers;
pub mod scheduler;
pub mod server;
pub mod storage;
pub mod utils;
