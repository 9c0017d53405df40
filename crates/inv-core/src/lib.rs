//! # inv-core
//!
//! Core types, traits, and utilities for the device inventory.
//!
//! This crate provides the foundational building blocks used across all other crates:
//! - Service-wide error type and its classification
//! - Core traits (Entity, Identifiable, Timestamped)
//! - Configuration types loaded from the environment

pub mod config;
pub mod error;
pub mod traits;

pub use config::{AppConfig, ConfigError, DatabaseConfig, LogFormat, LoggingConfig, PaginationConfig};
pub use error::*;
pub use traits::*;
