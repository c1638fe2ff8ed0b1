//! Configuration module for gridharvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use gridharvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Guard stops after {} empty pages", config.guard.max_empty_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlConfig, FilterConfig, GuardConfig, OutputConfig, ScraperEntry,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
