//! Lookups the auth layer needs from the external relational store.
//!
//! Implementations live in `clinidoc-infra`; everything here is consumed
//! through `Arc<dyn ...>` so request handlers stay backend-agnostic.

use async_trait::async_trait;

use clinidoc_core::{DomainResult, NoteId, PatientId, PrincipalId, TenantId, VisitId};

use crate::{NewTenant, PrincipalRecord, Tenant};

#[async_trait]
pub trait PrincipalDirectory: Send + Sync {
    /// Exact, case-sensitive username match within `home_tenant_id`
    /// (`None` = platform-level principals).
    async fn find_by_username(
        &self,
        home_tenant_id: Option<TenantId>,
        username: &str,
    ) -> DomainResult<Option<PrincipalRecord>>;

    async fn find_by_id(&self, id: PrincipalId) -> DomainResult<Option<PrincipalRecord>>;
}

#[async_trait]
pub trait TenantDirectory: Send + Sync {
    async fn find_tenant(&self, id: TenantId) -> DomainResult<Option<Tenant>>;

    /// Lookup by numeric code or short identifier (case-insensitive).
    async fn find_tenant_by_code(&self, code: &str) -> DomainResult<Option<Tenant>>;

    async fn list_tenants(&self) -> DomainResult<Vec<Tenant>>;

    /// Fails with `DomainError::Conflict` when the numeric code or short
    /// identifier is already taken.
    async fn create_tenant(&self, new: NewTenant) -> DomainResult<Tenant>;

    /// Atomically bump and return the tenant's record counter.
    async fn next_record_number(&self, id: TenantId) -> DomainResult<u64>;
}

/// Ownership links of tenant-owned clinical resources.
#[async_trait]
pub trait TenantResolver: Send + Sync {
    async fn patient_tenant(&self, id: PatientId) -> DomainResult<Option<TenantId>>;

    async fn visit_patient(&self, id: VisitId) -> DomainResult<Option<PatientId>>;

    async fn note_visit(&self, id: NoteId) -> DomainResult<Option<VisitId>>;
}
