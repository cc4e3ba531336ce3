//! Login and session re-issuance endpoints.

use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use clinidoc_auth::LoginRequest;

use crate::app::{dto, errors, services::AppServices};
use crate::context::SessionContext;

/// POST /auth/login
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginBody>,
) -> axum::response::Response {
    let request = LoginRequest {
        tenant_code: body.tenant_code.map(dto::TenantCode::into_string),
        username: body.username,
        password: body.password,
    };

    match services.login.login(request).await {
        Ok(outcome) => (StatusCode::OK, Json(dto::LoginResponse::from(outcome))).into_response(),
        Err(e) => errors::auth_error_to_response(e),
    }
}

/// GET /auth/me
pub async fn me(Extension(session): Extension<SessionContext>) -> axum::response::Response {
    let body = dto::SessionResponse {
        effective_tenant_id: session.effective_tenant(),
        claims: session.claims().clone(),
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// POST /auth/switch-tenant
pub async fn switch_tenant(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Json(body): Json<dto::SwitchTenantBody>,
) -> axum::response::Response {
    let code = body.tenant_code.map(dto::TenantCode::into_string).unwrap_or_default();
    token_response(services.sessions.switch_tenant(session.claims(), &code).await)
}

/// POST /auth/clear-impersonation
pub async fn clear_impersonation(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
) -> axum::response::Response {
    token_response(services.sessions.clear_impersonation(session.claims()).await)
}

/// POST /auth/switch-role
pub async fn switch_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Json(body): Json<dto::SwitchRoleBody>,
) -> axum::response::Response {
    token_response(services.sessions.switch_role(session.claims(), &body.role).await)
}

fn token_response(
    result: Result<clinidoc_auth::IssuedToken, clinidoc_auth::AuthError>,
) -> axum::response::Response {
    match result {
        Ok(issued) => (StatusCode::OK, Json(dto::TokenResponse::from(issued))).into_response(),
        Err(e) => errors::auth_error_to_response(e),
    }
}
