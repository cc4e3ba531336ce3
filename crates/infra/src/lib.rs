//! Infrastructure layer: storage adapters behind the `clinidoc-auth` directory traits.

pub mod clinical;
pub mod directory;
pub mod store;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use clinical::{InMemoryClinicalIndex, PatientEntry};
pub use directory::InMemoryDirectory;
pub use store::{ClinicalStore, PrincipalStore};
