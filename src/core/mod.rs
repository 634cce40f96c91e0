pub mod aggregator;
pub mod config;
pub mod cost;
pub mod error;
pub mod formatter;
pub mod layout;
pub mod models;
