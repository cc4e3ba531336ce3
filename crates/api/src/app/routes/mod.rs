use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use clinidoc_auth::{Action, TokenCodec};

use crate::middleware::{self, GuardState};

pub mod auth;
pub mod clinical;
pub mod organizations;
pub mod system;

/// Router for login plus every bearer-guarded endpoint.
///
/// Each guarded route names the action its active role must hold; `None`
/// only asks for a valid session.
pub fn router(codec: Arc<TokenCodec>) -> Router {
    let guard = |required: Option<Action>| {
        axum::middleware::from_fn_with_state(
            GuardState::new(codec.clone(), required),
            middleware::auth_middleware,
        )
    };

    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me).route_layer(guard(None)))
        .route("/auth/switch-tenant", post(auth::switch_tenant).route_layer(guard(None)))
        .route(
            "/auth/clear-impersonation",
            post(auth::clear_impersonation).route_layer(guard(None)),
        )
        .route("/auth/switch-role", post(auth::switch_role).route_layer(guard(None)))
        .route(
            "/organizations",
            get(organizations::list_organizations)
                .post(organizations::create_organization)
                .route_layer(guard(Some(Action::TenantManage))),
        )
        .route(
            "/organizations/:id",
            get(organizations::get_organization).route_layer(guard(Some(Action::OrganizationRead))),
        )
        .route(
            "/patients",
            post(clinical::create_patient).route_layer(guard(Some(Action::PatientWrite))),
        )
        .route(
            "/patients/:id",
            get(clinical::get_patient).route_layer(guard(Some(Action::PatientRead))),
        )
        .route(
            "/patients/:id/visits",
            post(clinical::create_visit).route_layer(guard(Some(Action::VisitWrite))),
        )
        .route(
            "/visits/:id",
            get(clinical::get_visit).route_layer(guard(Some(Action::VisitRead))),
        )
        .route(
            "/visits/:id/notes",
            post(clinical::create_note).route_layer(guard(Some(Action::NoteWrite))),
        )
        .route(
            "/notes/:id",
            get(clinical::get_note).route_layer(guard(Some(Action::NoteRead))),
        )
}
