//! Command implementations for the sikuwat CLI

pub mod ask;
pub mod config;
pub mod knowledge;
pub mod migrate;
pub mod serve;

pub use ask::run_ask;
pub use config::run_config;
pub use knowledge::run_knowledge;
pub use migrate::run_migrate;
pub use serve::run_serve;
