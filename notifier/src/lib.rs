pub mod config;
pub mod driver;
pub mod error;
pub mod metrics;
pub mod push;
pub mod quote;
pub mod time;
