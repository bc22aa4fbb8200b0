pub mod config;
pub mod dataset;
pub mod output;
pub mod scoring;
pub mod server;
