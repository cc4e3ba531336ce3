//! Tenant-owned clinical records.
//!
//! Every handler resolves the owning tenant through the ownership chain
//! before touching the record; unknown ids and foreign-tenant ids produce
//! the same refusal.

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
};

use clinidoc_auth::{AuthError, ForbiddenReason, ResourceRef, authorize_resource, authorize_tenant_access};
use clinidoc_core::{NoteId, PatientId, VisitId};

use crate::app::{dto, errors, services::AppServices};
use crate::context::SessionContext;

/// POST /patients
///
/// Registers a patient in the caller's effective tenant and mints its record
/// number from the tenant counter.
pub async fn create_patient(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
) -> axum::response::Response {
    match create_patient_inner(&services, &session).await {
        Ok(entry) => (StatusCode::CREATED, Json(entry)).into_response(),
        Err(e) => errors::auth_error_to_response(e),
    }
}

async fn create_patient_inner(
    services: &AppServices,
    session: &SessionContext,
) -> Result<clinidoc_infra::PatientEntry, AuthError> {
    let tenant_id = session
        .effective_tenant()
        .ok_or(AuthError::Forbidden(ForbiddenReason::AccessDenied))?;
    authorize_tenant_access(session.claims(), tenant_id).into_result()?;

    let tenant = services
        .tenants
        .find_tenant(tenant_id)
        .await?
        .ok_or(AuthError::NotFound("organization"))?;
    if !tenant.active {
        return Err(ForbiddenReason::TenantInactive.into());
    }

    let n = services.tenants.next_record_number(tenant_id).await?;
    let entry = services
        .clinical
        .register_patient(tenant_id, tenant.record_number(n))
        .await?;

    tracing::info!(
        principal_id = %session.principal_id(),
        tenant_id = %tenant_id,
        record_number = %entry.record_number,
        "patient registered"
    );
    Ok(entry)
}

/// GET /patients/:id
pub async fn get_patient(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let result = async {
        let patient_id = PatientId::from_str(&id)?;
        authorize_resource(session.claims(), &*services.resolver, ResourceRef::Patient(patient_id)).await?;
        services
            .clinical
            .patient(patient_id)
            .await?
            .ok_or(AuthError::NotFound("patient"))
    }
    .await;

    match result {
        Ok(entry) => (StatusCode::OK, Json(entry)).into_response(),
        Err(e) => errors::auth_error_to_response(e),
    }
}

/// POST /patients/:id/visits
pub async fn create_visit(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let result = async {
        let patient_id = PatientId::from_str(&id)?;
        let tenant_id =
            authorize_resource(session.claims(), &*services.resolver, ResourceRef::Patient(patient_id)).await?;
        let visit_id = services.clinical.register_visit(patient_id).await?;
        Ok::<_, AuthError>(dto::VisitResponse {
            id: visit_id,
            patient_id,
            tenant_id,
        })
    }
    .await;

    match result {
        Ok(visit) => (StatusCode::CREATED, Json(visit)).into_response(),
        Err(e) => errors::auth_error_to_response(e),
    }
}

/// GET /visits/:id
pub async fn get_visit(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let result = async {
        let visit_id = VisitId::from_str(&id)?;
        let tenant_id =
            authorize_resource(session.claims(), &*services.resolver, ResourceRef::Visit(visit_id)).await?;
        let patient_id = services
            .resolver
            .visit_patient(visit_id)
            .await?
            .ok_or(AuthError::NotFound("visit"))?;
        Ok::<_, AuthError>(dto::VisitResponse {
            id: visit_id,
            patient_id,
            tenant_id,
        })
    }
    .await;

    match result {
        Ok(visit) => (StatusCode::OK, Json(visit)).into_response(),
        Err(e) => errors::auth_error_to_response(e),
    }
}

/// POST /visits/:id/notes
pub async fn create_note(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let result = async {
        let visit_id = VisitId::from_str(&id)?;
        let tenant_id =
            authorize_resource(session.claims(), &*services.resolver, ResourceRef::Visit(visit_id)).await?;
        let note_id = services.clinical.register_note(visit_id).await?;
        Ok::<_, AuthError>(dto::NoteResponse {
            id: note_id,
            visit_id,
            tenant_id,
        })
    }
    .await;

    match result {
        Ok(note) => (StatusCode::CREATED, Json(note)).into_response(),
        Err(e) => errors::auth_error_to_response(e),
    }
}

/// GET /notes/:id
pub async fn get_note(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let result = async {
        let note_id = NoteId::from_str(&id)?;
        let tenant_id =
            authorize_resource(session.claims(), &*services.resolver, ResourceRef::Note(note_id)).await?;
        let visit_id = services
            .resolver
            .note_visit(note_id)
            .await?
            .ok_or(AuthError::NotFound("note"))?;
        Ok::<_, AuthError>(dto::NoteResponse {
            id: note_id,
            visit_id,
            tenant_id,
        })
    }
    .await;

    match result {
        Ok(note) => (StatusCode::OK, Json(note)).into_response(),
        Err(e) => errors::auth_error_to_response(e),
    }
}
