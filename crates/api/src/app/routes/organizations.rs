use std::str::FromStr;
use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
};

use clinidoc_auth::{AuthError, ForbiddenReason, NewTenant, authorize_tenant_administration};
use clinidoc_core::TenantId;

use crate::app::{dto, errors, services::AppServices};
use crate::context::SessionContext;

/// GET /organizations
///
/// An impersonating administrator only sees the tenant they are acting in.
pub async fn list_organizations(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
) -> axum::response::Response {
    let mut items = match services.tenants.list_tenants().await {
        Ok(items) => items,
        Err(e) => return errors::domain_error_to_response(e),
    };
    if session.claims().grant().is_impersonating() {
        let effective = session.effective_tenant();
        items.retain(|t| Some(t.id) == effective);
    }
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

/// POST /organizations
pub async fn create_organization(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Json(body): Json<dto::CreateOrganizationBody>,
) -> axum::response::Response {
    if session.claims().grant().is_impersonating() {
        tracing::info!(
            principal_id = %session.principal_id(),
            reason = "impersonating",
            "organization registration refused"
        );
        return errors::auth_error_to_response(ForbiddenReason::AccessDenied.into());
    }

    let new = NewTenant {
        code: body.code,
        short_code: body.short_code,
        name: body.name,
    };

    match services.tenants.create_tenant(new).await {
        Ok(tenant) => {
            tracing::info!(
                principal_id = %session.principal_id(),
                tenant_id = %tenant.id,
                code = tenant.code,
                "organization registered"
            );
            (StatusCode::CREATED, Json(tenant)).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// GET /organizations/:id
///
/// Platform administrators may read any organization; everyone else only
/// their effective one.
pub async fn get_organization(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let tenant_id = match TenantId::from_str(&id) {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(e),
    };

    if let Err(e) = authorize_tenant_administration(session.claims(), tenant_id).into_result() {
        return errors::auth_error_to_response(e);
    }

    match services.tenants.find_tenant(tenant_id).await {
        Ok(Some(tenant)) => (StatusCode::OK, Json(tenant)).into_response(),
        Ok(None) => errors::auth_error_to_response(AuthError::NotFound("organization")),
        Err(e) => errors::domain_error_to_response(e),
    }
}
