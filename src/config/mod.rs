//! Configuration module for phishnet
//!
//! This module handles:
//! - `phishnet.toml` discovery and parsing
//! - Environment overrides
//! - Resolving the configured feature schema

mod project_config;

pub use project_config::{
    load_config, PathsConfig, PhishnetConfig, SchemaConfig, SplitConfig, CONFIG_FILE,
};
