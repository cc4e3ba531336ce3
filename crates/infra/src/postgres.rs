//! Postgres-backed directory and ownership index.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | DomainError |
//! |------------|----------------------|-------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (other) | Any other | `Unavailable` |
//! | PoolClosed / network / other | N/A | `Unavailable` |
//!
//! ## Record numbering
//!
//! `next_record_number` is a single `UPDATE ... RETURNING`, so concurrent
//! callers serialize on the organization row and never observe the same value.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use clinidoc_auth::{NewTenant, PrincipalDirectory, PrincipalRecord, Role, Tenant, TenantDirectory, TenantResolver};
use clinidoc_core::{DomainError, DomainResult, NoteId, PatientId, PrincipalId, TenantId, VisitId};

use crate::clinical::PatientEntry;
use crate::store::{ClinicalStore, PrincipalStore};

/// Tables this adapter touches. Clinical tables carry more columns in the full
/// schema; only the ownership links and record numbers are listed.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS organizations (
    id             UUID PRIMARY KEY,
    code           INTEGER NOT NULL UNIQUE,
    short_code     TEXT NOT NULL,
    name           TEXT NOT NULL,
    active         BOOLEAN NOT NULL DEFAULT TRUE,
    record_counter BIGINT NOT NULL DEFAULT 0
);
CREATE UNIQUE INDEX IF NOT EXISTS organizations_short_code_ci ON organizations (lower(short_code));

CREATE TABLE IF NOT EXISTS employees (
    id              UUID PRIMARY KEY,
    organization_id UUID REFERENCES organizations(id),
    username        TEXT NOT NULL,
    full_name       TEXT NOT NULL,
    password_hash   TEXT NOT NULL,
    role            TEXT NOT NULL,
    secondary_role  TEXT,
    active          BOOLEAN NOT NULL DEFAULT TRUE
);
CREATE UNIQUE INDEX IF NOT EXISTS employees_username_per_org
    ON employees (COALESCE(organization_id, '00000000-0000-0000-0000-000000000000'::uuid), username);

CREATE TABLE IF NOT EXISTS patients (
    id              UUID PRIMARY KEY,
    organization_id UUID NOT NULL REFERENCES organizations(id),
    record_number   TEXT NOT NULL,
    UNIQUE (organization_id, record_number)
);
CREATE TABLE IF NOT EXISTS visits (
    id         UUID PRIMARY KEY,
    patient_id UUID NOT NULL REFERENCES patients(id)
);
CREATE TABLE IF NOT EXISTS notes (
    id       UUID PRIMARY KEY,
    visit_id UUID NOT NULL REFERENCES visits(id)
);
"#;

pub struct PostgresDirectory {
    pool: Arc<PgPool>,
}

impl PostgresDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    pub async fn connect(database_url: &str) -> DomainResult<Self> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Apply [`SCHEMA`] (idempotent).
    pub async fn migrate(&self) -> DomainResult<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> DomainError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            if db_err.is_unique_violation() {
                DomainError::Conflict(msg)
            } else {
                DomainError::Unavailable(msg)
            }
        }
        other => DomainError::Unavailable(format!("sqlx error in {}: {}", operation, other)),
    }
}

fn decode_err(operation: &str, detail: impl core::fmt::Display) -> DomainError {
    DomainError::Unavailable(format!("bad row in {}: {}", operation, detail))
}

fn principal_from_row(row: &PgRow) -> DomainResult<PrincipalRecord> {
    let get = |e: sqlx::Error| decode_err("employees", e);
    let role: String = row.try_get("role").map_err(get)?;
    let secondary_role: Option<String> = row.try_get("secondary_role").map_err(get)?;

    Ok(PrincipalRecord {
        id: PrincipalId::from_uuid(row.try_get::<Uuid, _>("id").map_err(get)?),
        home_tenant_id: row
            .try_get::<Option<Uuid>, _>("organization_id")
            .map_err(get)?
            .map(TenantId::from_uuid),
        username: row.try_get("username").map_err(get)?,
        full_name: row.try_get("full_name").map_err(get)?,
        password_hash: row.try_get("password_hash").map_err(get)?,
        role: role.parse::<Role>().map_err(|e| decode_err("employees", e))?,
        secondary_role: secondary_role
            .map(|r| r.parse::<Role>())
            .transpose()
            .map_err(|e| decode_err("employees", e))?,
        active: row.try_get("active").map_err(get)?,
    })
}

fn tenant_from_row(row: &PgRow) -> DomainResult<Tenant> {
    let get = |e: sqlx::Error| decode_err("organizations", e);
    let code: i32 = row.try_get("code").map_err(get)?;
    let counter: i64 = row.try_get("record_counter").map_err(get)?;

    Ok(Tenant {
        id: TenantId::from_uuid(row.try_get::<Uuid, _>("id").map_err(get)?),
        code: u32::try_from(code).map_err(|e| decode_err("organizations", e))?,
        short_code: row.try_get("short_code").map_err(get)?,
        name: row.try_get("name").map_err(get)?,
        active: row.try_get("active").map_err(get)?,
        record_counter: u64::try_from(counter).map_err(|e| decode_err("organizations", e))?,
    })
}

const EMPLOYEE_COLUMNS: &str =
    "id, organization_id, username, full_name, password_hash, role, secondary_role, active";
const ORGANIZATION_COLUMNS: &str = "id, code, short_code, name, active, record_counter";

#[async_trait]
impl PrincipalDirectory for PostgresDirectory {
    #[instrument(skip(self), fields(operation = "find_employee_by_username"))]
    async fn find_by_username(
        &self,
        home_tenant_id: Option<TenantId>,
        username: &str,
    ) -> DomainResult<Option<PrincipalRecord>> {
        let sql = format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees \
             WHERE username = $1 AND organization_id IS NOT DISTINCT FROM $2"
        );
        let row = sqlx::query(&sql)
            .bind(username)
            .bind(home_tenant_id.map(Uuid::from))
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_by_username", e))?;
        row.as_ref().map(principal_from_row).transpose()
    }

    #[instrument(skip(self), fields(operation = "find_employee_by_id"))]
    async fn find_by_id(&self, id: PrincipalId) -> DomainResult<Option<PrincipalRecord>> {
        let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(Uuid::from(id))
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_by_id", e))?;
        row.as_ref().map(principal_from_row).transpose()
    }
}

#[async_trait]
impl TenantDirectory for PostgresDirectory {
    async fn find_tenant(&self, id: TenantId) -> DomainResult<Option<Tenant>> {
        let sql = format!("SELECT {ORGANIZATION_COLUMNS} FROM organizations WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(Uuid::from(id))
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_tenant", e))?;
        row.as_ref().map(tenant_from_row).transpose()
    }

    async fn find_tenant_by_code(&self, code: &str) -> DomainResult<Option<Tenant>> {
        let code = code.trim();
        let row = match code.parse::<u32>() {
            Ok(numeric) => {
                let numeric = i32::try_from(numeric).map_err(|e| DomainError::validation(e.to_string()))?;
                let sql = format!("SELECT {ORGANIZATION_COLUMNS} FROM organizations WHERE code = $1");
                sqlx::query(&sql).bind(numeric).fetch_optional(&*self.pool).await
            }
            Err(_) => {
                let sql = format!(
                    "SELECT {ORGANIZATION_COLUMNS} FROM organizations WHERE lower(short_code) = lower($1)"
                );
                sqlx::query(&sql).bind(code).fetch_optional(&*self.pool).await
            }
        }
        .map_err(|e| map_sqlx_error("find_tenant_by_code", e))?;
        row.as_ref().map(tenant_from_row).transpose()
    }

    async fn list_tenants(&self) -> DomainResult<Vec<Tenant>> {
        let sql = format!("SELECT {ORGANIZATION_COLUMNS} FROM organizations ORDER BY code");
        let rows = sqlx::query(&sql)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_tenants", e))?;
        rows.iter().map(tenant_from_row).collect()
    }

    #[instrument(skip(self, new), fields(code = new.code))]
    async fn create_tenant(&self, new: NewTenant) -> DomainResult<Tenant> {
        new.validate()?;
        let code = i32::try_from(new.code).map_err(|e| DomainError::validation(e.to_string()))?;
        let tenant = new.into_tenant(TenantId::new());

        sqlx::query(
            "INSERT INTO organizations (id, code, short_code, name, active, record_counter) \
             VALUES ($1, $2, $3, $4, TRUE, 0)",
        )
        .bind(Uuid::from(tenant.id))
        .bind(code)
        .bind(&tenant.short_code)
        .bind(&tenant.name)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_tenant", e))?;

        Ok(tenant)
    }

    async fn next_record_number(&self, id: TenantId) -> DomainResult<u64> {
        let row = sqlx::query(
            "UPDATE organizations SET record_counter = record_counter + 1 \
             WHERE id = $1 RETURNING record_counter",
        )
        .bind(Uuid::from(id))
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("next_record_number", e))?
        .ok_or(DomainError::NotFound)?;

        let counter: i64 = row
            .try_get("record_counter")
            .map_err(|e| decode_err("organizations", e))?;
        u64::try_from(counter).map_err(|e| decode_err("organizations", e))
    }
}

#[async_trait]
impl TenantResolver for PostgresDirectory {
    async fn patient_tenant(&self, id: PatientId) -> DomainResult<Option<TenantId>> {
        let row = sqlx::query("SELECT organization_id FROM patients WHERE id = $1")
            .bind(Uuid::from(id))
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("patient_tenant", e))?;
        row.map(|r| r.try_get::<Uuid, _>("organization_id").map(TenantId::from_uuid))
            .transpose()
            .map_err(|e| decode_err("patients", e))
    }

    async fn visit_patient(&self, id: VisitId) -> DomainResult<Option<PatientId>> {
        let row = sqlx::query("SELECT patient_id FROM visits WHERE id = $1")
            .bind(Uuid::from(id))
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("visit_patient", e))?;
        row.map(|r| r.try_get::<Uuid, _>("patient_id").map(PatientId::from_uuid))
            .transpose()
            .map_err(|e| decode_err("visits", e))
    }

    async fn note_visit(&self, id: NoteId) -> DomainResult<Option<VisitId>> {
        let row = sqlx::query("SELECT visit_id FROM notes WHERE id = $1")
            .bind(Uuid::from(id))
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("note_visit", e))?;
        row.map(|r| r.try_get::<Uuid, _>("visit_id").map(VisitId::from_uuid))
            .transpose()
            .map_err(|e| decode_err("notes", e))
    }
}

#[async_trait]
impl PrincipalStore for PostgresDirectory {
    #[instrument(skip(self, record), fields(username = %record.username))]
    async fn insert_principal(&self, record: PrincipalRecord) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO employees \
             (id, organization_id, username, full_name, password_hash, role, secondary_role, active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(Uuid::from(record.id))
        .bind(record.home_tenant_id.map(Uuid::from))
        .bind(&record.username)
        .bind(&record.full_name)
        .bind(&record.password_hash)
        .bind(record.role.as_str())
        .bind(record.secondary_role.map(|r| r.as_str()))
        .bind(record.active)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_principal", e))?;
        Ok(())
    }
}

#[async_trait]
impl ClinicalStore for PostgresDirectory {
    async fn register_patient(&self, tenant_id: TenantId, record_number: String) -> DomainResult<PatientEntry> {
        let entry = PatientEntry {
            id: PatientId::new(),
            tenant_id,
            record_number,
        };
        sqlx::query("INSERT INTO patients (id, organization_id, record_number) VALUES ($1, $2, $3)")
            .bind(Uuid::from(entry.id))
            .bind(Uuid::from(tenant_id))
            .bind(&entry.record_number)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("register_patient", e))?;
        Ok(entry)
    }

    async fn register_visit(&self, patient_id: PatientId) -> DomainResult<VisitId> {
        let id = VisitId::new();
        let inserted = sqlx::query("INSERT INTO visits (id, patient_id) SELECT $1, id FROM patients WHERE id = $2")
            .bind(Uuid::from(id))
            .bind(Uuid::from(patient_id))
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("register_visit", e))?;
        if inserted.rows_affected() == 0 {
            return Err(DomainError::NotFound);
        }
        Ok(id)
    }

    async fn register_note(&self, visit_id: VisitId) -> DomainResult<NoteId> {
        let id = NoteId::new();
        let inserted = sqlx::query("INSERT INTO notes (id, visit_id) SELECT $1, id FROM visits WHERE id = $2")
            .bind(Uuid::from(id))
            .bind(Uuid::from(visit_id))
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("register_note", e))?;
        if inserted.rows_affected() == 0 {
            return Err(DomainError::NotFound);
        }
        Ok(id)
    }

    async fn patient(&self, id: PatientId) -> DomainResult<Option<PatientEntry>> {
        let row = sqlx::query("SELECT id, organization_id, record_number FROM patients WHERE id = $1")
            .bind(Uuid::from(id))
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("patient", e))?;
        let Some(row) = row else {
            return Ok(None);
        };
        let get = |e: sqlx::Error| decode_err("patients", e);
        Ok(Some(PatientEntry {
            id: PatientId::from_uuid(row.try_get::<Uuid, _>("id").map_err(get)?),
            tenant_id: TenantId::from_uuid(row.try_get::<Uuid, _>("organization_id").map_err(get)?),
            record_number: row.try_get("record_number").map_err(get)?,
        }))
    }
}
