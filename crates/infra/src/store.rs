//! Write seams the API process needs on top of the read-only directory traits.
//!
//! Both the in-memory stores and the Postgres adapter implement these, so the
//! process wiring only ever holds trait objects.

use async_trait::async_trait;

use clinidoc_auth::PrincipalRecord;
use clinidoc_core::{DomainResult, NoteId, PatientId, TenantId, VisitId};

use crate::clinical::PatientEntry;

#[async_trait]
pub trait PrincipalStore: Send + Sync {
    /// `Conflict` when the username is taken within the same home tenant.
    async fn insert_principal(&self, record: PrincipalRecord) -> DomainResult<()>;
}

#[async_trait]
pub trait ClinicalStore: Send + Sync {
    async fn register_patient(&self, tenant_id: TenantId, record_number: String) -> DomainResult<PatientEntry>;

    /// `NotFound` when the patient does not exist.
    async fn register_visit(&self, patient_id: PatientId) -> DomainResult<VisitId>;

    /// `NotFound` when the visit does not exist.
    async fn register_note(&self, visit_id: VisitId) -> DomainResult<NoteId>;

    async fn patient(&self, id: PatientId) -> DomainResult<Option<PatientEntry>>;
}
