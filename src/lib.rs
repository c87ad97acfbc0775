pub mod config;
pub mod constants;
pub mod error;
pub mod http_client;
pub mod listing;
pub mod logging;
pub mod parser;
pub mod pipeline;
pub mod report;
pub mod storage;
pub mod types;
