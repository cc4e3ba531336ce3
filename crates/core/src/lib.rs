//! `clinidoc-core`: shared identifiers and the domain error model.
//!
//! Every other crate in the workspace speaks in these types, so they carry no
//! storage or transport concerns.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{NoteId, PatientId, PrincipalId, TenantId, VisitId};
