pub mod analytics;
pub mod config;
pub mod cycle;
pub mod db;
pub mod notify;
pub mod shutdown;
pub mod store;

pub mod error;
pub mod logger;
