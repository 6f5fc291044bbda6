//! Configuration module for Noon-Harvest
//!
//! This module handles loading, parsing, and clamping TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use noon_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Fetch gate size: {}", config.connection_limiter);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::Config;

// Re-export parser functions
pub use parser::load_config;

// Re-export validation helpers
pub use validation::clamp_limits;
