//! # inv-db
//!
//! Database layer for the device inventory.
//!
//! This crate provides PostgreSQL database access using SQLx, including:
//!
//! - Connection pool management and schema bootstrap
//! - Repository pattern for CRUD operations
//! - Filtered device listing with offset or keyset pagination
//!
//! ## Example
//!
//! ```ignore
//! use inv_core::AppConfig;
//! use inv_db::{Database, DeviceFilter, DeviceRepository};
//!
//! let config = AppConfig::from_env()?;
//! let db = Database::connect(&config.database).await?;
//!
//! let repo = DeviceRepository::new(db.pool().clone()).with_limits(config.pagination);
//! let page = repo.list(&DeviceFilter::new().brand("Apple")).await?;
//!
//! if let Some(token) = page.pagination.next_cursor {
//!     let next = repo.list(&DeviceFilter::new().brand("Apple").cursor(token)).await?;
//! }
//! ```

pub mod devices;
pub mod filter;
pub mod listing;
pub mod pool;
pub mod repository;

// Re-exports
pub use devices::{DeviceRepository, DeviceRow};
pub use filter::{DeviceFilter, DEFAULT_SORT};
pub use listing::{list_devices, DeviceQueries};
pub use pool::{Database, SCHEMA};
pub use repository::{Page, PageMeta, Repository, RepositoryError, RepositoryResult};
