//! In-crate stand-in for the external store.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use clinidoc_core::{DomainError, DomainResult, NoteId, PatientId, PrincipalId, TenantId, VisitId};

use crate::{NewTenant, PrincipalDirectory, PrincipalRecord, Role, Tenant, TenantDirectory, TenantResolver};

#[derive(Default)]
pub(crate) struct StubDirectory {
    principals: Mutex<HashMap<PrincipalId, PrincipalRecord>>,
    tenants: Mutex<HashMap<TenantId, Tenant>>,
    patients: Mutex<HashMap<PatientId, TenantId>>,
    visits: Mutex<HashMap<VisitId, PatientId>>,
    notes: Mutex<HashMap<NoteId, VisitId>>,
}

impl StubDirectory {
    pub(crate) fn add_tenant(&self, code: u32, short_code: &str, active: bool) -> Tenant {
        let mut tenant = NewTenant {
            code,
            short_code: short_code.to_string(),
            name: format!("{short_code} clinic"),
        }
        .into_tenant(TenantId::new());
        tenant.active = active;
        self.tenants.lock().unwrap().insert(tenant.id, tenant.clone());
        tenant
    }

    pub(crate) fn add_principal(
        &self,
        home_tenant_id: Option<TenantId>,
        username: &str,
        role: Role,
        secondary_role: Option<Role>,
    ) -> PrincipalRecord {
        let record = PrincipalRecord {
            id: PrincipalId::new(),
            home_tenant_id,
            username: username.to_string(),
            full_name: username.to_string(),
            password_hash: String::from("!"),
            role,
            secondary_role,
            active: true,
        };
        self.principals.lock().unwrap().insert(record.id, record.clone());
        record
    }

    fn update(&self, id: PrincipalId, f: impl FnOnce(&mut PrincipalRecord)) {
        if let Some(p) = self.principals.lock().unwrap().get_mut(&id) {
            f(p);
        }
    }

    pub(crate) fn set_password_hash(&self, id: PrincipalId, hash: String) {
        self.update(id, |p| p.password_hash = hash);
    }

    pub(crate) fn set_secondary_role(&self, id: PrincipalId, role: Option<Role>) {
        self.update(id, |p| p.secondary_role = role);
    }

    pub(crate) fn deactivate(&self, id: PrincipalId) {
        self.update(id, |p| p.active = false);
    }

    pub(crate) fn seed_chart(&self, tenant_id: TenantId) -> (PatientId, VisitId, NoteId) {
        let (patient, visit, note) = (PatientId::new(), VisitId::new(), NoteId::new());
        self.patients.lock().unwrap().insert(patient, tenant_id);
        self.visits.lock().unwrap().insert(visit, patient);
        self.notes.lock().unwrap().insert(note, visit);
        (patient, visit, note)
    }

    pub(crate) fn unlink_visit(&self, visit: VisitId) {
        self.visits.lock().unwrap().remove(&visit);
    }
}

#[async_trait]
impl PrincipalDirectory for StubDirectory {
    async fn find_by_username(
        &self,
        home_tenant_id: Option<TenantId>,
        username: &str,
    ) -> DomainResult<Option<PrincipalRecord>> {
        Ok(self
            .principals
            .lock()
            .unwrap()
            .values()
            .find(|p| p.home_tenant_id == home_tenant_id && p.username == username)
            .cloned())
    }

    async fn find_by_id(&self, id: PrincipalId) -> DomainResult<Option<PrincipalRecord>> {
        Ok(self.principals.lock().unwrap().get(&id).cloned())
    }
}

#[async_trait]
impl TenantDirectory for StubDirectory {
    async fn find_tenant(&self, id: TenantId) -> DomainResult<Option<Tenant>> {
        Ok(self.tenants.lock().unwrap().get(&id).cloned())
    }

    async fn find_tenant_by_code(&self, code: &str) -> DomainResult<Option<Tenant>> {
        Ok(self
            .tenants
            .lock()
            .unwrap()
            .values()
            .find(|t| t.matches_code(code))
            .cloned())
    }

    async fn list_tenants(&self) -> DomainResult<Vec<Tenant>> {
        Ok(self.tenants.lock().unwrap().values().cloned().collect())
    }

    async fn create_tenant(&self, new: NewTenant) -> DomainResult<Tenant> {
        let mut tenants = self.tenants.lock().unwrap();
        if tenants.values().any(|t| new.collides_with(t)) {
            return Err(DomainError::conflict("tenant code taken"));
        }
        let tenant = new.into_tenant(TenantId::new());
        tenants.insert(tenant.id, tenant.clone());
        Ok(tenant)
    }

    async fn next_record_number(&self, id: TenantId) -> DomainResult<u64> {
        let mut tenants = self.tenants.lock().unwrap();
        let tenant = tenants.get_mut(&id).ok_or(DomainError::NotFound)?;
        tenant.record_counter += 1;
        Ok(tenant.record_counter)
    }
}

#[async_trait]
impl TenantResolver for StubDirectory {
    async fn patient_tenant(&self, id: PatientId) -> DomainResult<Option<TenantId>> {
        Ok(self.patients.lock().unwrap().get(&id).copied())
    }

    async fn visit_patient(&self, id: VisitId) -> DomainResult<Option<PatientId>> {
        Ok(self.visits.lock().unwrap().get(&id).copied())
    }

    async fn note_visit(&self, id: NoteId) -> DomainResult<Option<VisitId>> {
        Ok(self.notes.lock().unwrap().get(&id).copied())
    }
}
