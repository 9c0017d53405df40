//! # inv-models
//!
//! Domain models for the device inventory.
//!
//! Each model implements the core traits from `inv-core` (Entity, Identifiable,
//! Timestamped) and exposes its queryable fields as a column allow-list.

pub use inv_core::traits::{Entity, Id, Identifiable, Timestamped};

pub mod device;

// Re-exports for convenience
pub use device::{device_columns, Device, DevicePatch, DeviceState, NewDevice, ParseStateError};
