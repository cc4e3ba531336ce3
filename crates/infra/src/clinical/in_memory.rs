use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde::Serialize;

use clinidoc_auth::TenantResolver;
use clinidoc_core::{DomainError, DomainResult, NoteId, PatientId, TenantId, VisitId};

use crate::store::ClinicalStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientEntry {
    pub id: PatientId,
    pub tenant_id: TenantId,
    pub record_number: String,
}

/// In-memory clinical ownership index for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryClinicalIndex {
    patients: RwLock<HashMap<PatientId, PatientEntry>>,
    visits: RwLock<HashMap<VisitId, PatientId>>,
    notes: RwLock<HashMap<NoteId, VisitId>>,
}

fn poisoned() -> DomainError {
    DomainError::unavailable("clinical index lock poisoned")
}

impl InMemoryClinicalIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_patient(&self, tenant_id: TenantId, record_number: String) -> DomainResult<PatientEntry> {
        let entry = PatientEntry {
            id: PatientId::new(),
            tenant_id,
            record_number,
        };
        let mut map = self.patients.write().map_err(|_| poisoned())?;
        map.insert(entry.id, entry.clone());
        Ok(entry)
    }

    pub fn register_visit(&self, patient_id: PatientId) -> DomainResult<VisitId> {
        if !self.patients.read().map_err(|_| poisoned())?.contains_key(&patient_id) {
            return Err(DomainError::NotFound);
        }
        let id = VisitId::new();
        self.visits.write().map_err(|_| poisoned())?.insert(id, patient_id);
        Ok(id)
    }

    pub fn register_note(&self, visit_id: VisitId) -> DomainResult<NoteId> {
        if !self.visits.read().map_err(|_| poisoned())?.contains_key(&visit_id) {
            return Err(DomainError::NotFound);
        }
        let id = NoteId::new();
        self.notes.write().map_err(|_| poisoned())?.insert(id, visit_id);
        Ok(id)
    }

    pub fn patient(&self, id: PatientId) -> DomainResult<Option<PatientEntry>> {
        Ok(self.patients.read().map_err(|_| poisoned())?.get(&id).cloned())
    }
}

#[async_trait]
impl TenantResolver for InMemoryClinicalIndex {
    async fn patient_tenant(&self, id: PatientId) -> DomainResult<Option<TenantId>> {
        Ok(self.patient(id)?.map(|p| p.tenant_id))
    }

    async fn visit_patient(&self, id: VisitId) -> DomainResult<Option<PatientId>> {
        Ok(self.visits.read().map_err(|_| poisoned())?.get(&id).copied())
    }

    async fn note_visit(&self, id: NoteId) -> DomainResult<Option<VisitId>> {
        Ok(self.notes.read().map_err(|_| poisoned())?.get(&id).copied())
    }
}

#[async_trait]
impl ClinicalStore for InMemoryClinicalIndex {
    async fn register_patient(&self, tenant_id: TenantId, record_number: String) -> DomainResult<PatientEntry> {
        InMemoryClinicalIndex::register_patient(self, tenant_id, record_number)
    }

    async fn register_visit(&self, patient_id: PatientId) -> DomainResult<VisitId> {
        InMemoryClinicalIndex::register_visit(self, patient_id)
    }

    async fn register_note(&self, visit_id: VisitId) -> DomainResult<NoteId> {
        InMemoryClinicalIndex::register_note(self, visit_id)
    }

    async fn patient(&self, id: PatientId) -> DomainResult<Option<PatientEntry>> {
        InMemoryClinicalIndex::patient(self, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn chain_links_resolve() {
        let index = InMemoryClinicalIndex::new();
        let tenant = TenantId::new();
        let patient = index.register_patient(tenant, "MERCY-000001".to_string()).unwrap();
        let visit = index.register_visit(patient.id).unwrap();
        let note = index.register_note(visit).unwrap();

        assert_eq!(index.note_visit(note).await.unwrap(), Some(visit));
        assert_eq!(index.visit_patient(visit).await.unwrap(), Some(patient.id));
        assert_eq!(index.patient_tenant(patient.id).await.unwrap(), Some(tenant));
    }

    #[tokio::test]
    async fn store_seam_registers_through_trait_object() {
        let index: std::sync::Arc<dyn ClinicalStore> = std::sync::Arc::new(InMemoryClinicalIndex::new());
        let tenant = TenantId::new();
        let patient = index.register_patient(tenant, "HARBOR-000001".to_string()).await.unwrap();
        let visit = index.register_visit(patient.id).await.unwrap();
        index.register_note(visit).await.unwrap();

        assert_eq!(index.patient(patient.id).await.unwrap(), Some(patient));
        assert_eq!(index.register_note(VisitId::new()).await.unwrap_err(), DomainError::NotFound);
    }

    #[test]
    fn dangling_parents_are_rejected() {
        let index = InMemoryClinicalIndex::new();
        assert_eq!(index.register_visit(PatientId::new()).unwrap_err(), DomainError::NotFound);
        assert_eq!(index.register_note(VisitId::new()).unwrap_err(), DomainError::NotFound);
    }
}
