//! Configuration loading and management for the attendance engine.
//!
//! This module provides functionality to load engine configurations from YAML files,
//! including deployment metadata, tolerance windows, presence state classification
//! and batch settings.
//!
//! # Example
//!
//! ```no_run
//! use attendance_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config").unwrap();
//! println!("Loaded configuration: {}", config.metadata().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    BatchConfig, EngineConfig, EngineFile, EngineMetadata, PresenceConfig, ToleranceConfig,
};
