mod config;

pub use config::ConfigStorage;
