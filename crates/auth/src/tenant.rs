//! Tenant (organization) records.

use serde::{Deserialize, Serialize};

use clinidoc_core::{DomainError, DomainResult, TenantId};

/// Stored tenant.
///
/// `code` and `short_code` are unique across tenants; `short_code` uniqueness
/// is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: TenantId,
    pub code: u32,
    pub short_code: String,
    pub name: String,
    pub active: bool,
    /// Last record number handed out; only ever increases.
    pub record_counter: u64,
}

impl Tenant {
    /// Whether `code` names this tenant, either by numeric code or by short
    /// identifier (case-insensitive).
    pub fn matches_code(&self, code: &str) -> bool {
        let code = code.trim();
        match code.parse::<u32>() {
            Ok(numeric) => numeric == self.code,
            Err(_) => self.short_code.eq_ignore_ascii_case(code),
        }
    }

    /// Human-readable record identifier for counter value `n`.
    pub fn record_number(&self, n: u64) -> String {
        format!("{}-{:06}", self.short_code.to_ascii_uppercase(), n)
    }
}

/// Input for tenant creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTenant {
    pub code: u32,
    pub short_code: String,
    pub name: String,
}

impl NewTenant {
    pub fn validate(&self) -> DomainResult<()> {
        let len = self.short_code.len();
        if !(2..=12).contains(&len) || !self.short_code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(DomainError::validation(
                "shortCode must be 2-12 ASCII letters or digits",
            ));
        }
        // A purely numeric short code would be ambiguous with the numeric code.
        if self.short_code.chars().all(|c| c.is_ascii_digit()) {
            return Err(DomainError::validation("shortCode must contain a letter"));
        }
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name is required"));
        }
        Ok(())
    }

    /// Whether this would collide with `existing` on either unique key.
    pub fn collides_with(&self, existing: &Tenant) -> bool {
        existing.code == self.code || existing.short_code.eq_ignore_ascii_case(&self.short_code)
    }

    pub fn into_tenant(self, id: TenantId) -> Tenant {
        Tenant {
            id,
            code: self.code,
            short_code: self.short_code,
            name: self.name,
            active: true,
            record_counter: 0,
        }
    }
}
