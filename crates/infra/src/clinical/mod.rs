//! Ownership index for tenant-owned clinical records.
//!
//! Only the links the scoping policy walks (`Note → Visit → Patient → Tenant`)
//! live here; clinical content itself belongs to other services.

pub mod in_memory;

pub use in_memory::{InMemoryClinicalIndex, PatientEntry};
