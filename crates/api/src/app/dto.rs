use serde::{Deserialize, Serialize};

use clinidoc_auth::{Claims, IssuedToken, LoginOutcome, PrincipalProfile, Tenant};
use clinidoc_core::{NoteId, PatientId, TenantId, VisitId};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginBody {
    #[serde(default)]
    pub tenant_code: Option<TenantCode>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Tenant codes arrive either as JSON numbers (`1002`) or strings
/// (`"1002"`, `"MERCY"`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TenantCode {
    Numeric(u32),
    Text(String),
}

impl TenantCode {
    pub fn into_string(self) -> String {
        match self {
            TenantCode::Numeric(n) => n.to_string(),
            TenantCode::Text(s) => s,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchTenantBody {
    #[serde(default)]
    pub tenant_code: Option<TenantCode>,
}

#[derive(Debug, Deserialize)]
pub struct SwitchRoleBody {
    #[serde(default)]
    pub role: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrganizationBody {
    pub code: u32,
    pub short_code: String,
    pub name: String,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub claims: Claims,
    pub principal: PrincipalProfile,
    pub tenant: Option<Tenant>,
}

impl From<LoginOutcome> for LoginResponse {
    fn from(outcome: LoginOutcome) -> Self {
        Self {
            token: outcome.token.token,
            claims: outcome.token.claims,
            principal: outcome.principal,
            tenant: outcome.tenant,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub claims: Claims,
}

impl From<IssuedToken> for TokenResponse {
    fn from(issued: IssuedToken) -> Self {
        Self {
            token: issued.token,
            claims: issued.claims,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub claims: Claims,
    pub effective_tenant_id: Option<TenantId>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitResponse {
    pub id: VisitId,
    pub patient_id: PatientId,
    pub tenant_id: TenantId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteResponse {
    pub id: NoteId,
    pub visit_id: VisitId,
    pub tenant_id: TenantId,
}
