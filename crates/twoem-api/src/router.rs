//! Route definitions for the TWOEM HTTP API.
//!
//! All routes are organized by area and mounted under `/api`.
//! The router receives `AppState` and passes it to all handlers via Axum's
//! `State` extractor.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::middleware::cors::build_cors_layer;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let max_upload = state.config.storage.max_upload_size_bytes as usize;

    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(reset_admin_routes())
        .merge(student_admin_routes())
        .merge(student_routes())
        .merge(content_admin_routes())
        .merge(content_public_routes())
        .merge(health_routes());

    let cors = build_cors_layer(&state.config.server.cors);

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Login, whoami, password change and reset
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/me", get(handlers::auth::me))
        .route("/auth/change-password", post(handlers::auth::change_password))
        .route("/auth/forgot-password", post(handlers::auth::forgot_password))
        .route("/auth/reset-password", post(handlers::auth::reset_password))
}

/// Admin reset queue
fn reset_admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/admin/password-resets",
            get(handlers::reset::list_pending),
        )
        .route(
            "/admin/password-resets/{id}/approve",
            put(handlers::reset::approve),
        )
        .route(
            "/admin/password-resets/{id}/reject",
            put(handlers::reset::reject),
        )
}

/// Admin student management
fn student_admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/admin/students",
            post(handlers::admin_student::create).get(handlers::admin_student::list),
        )
        .route(
            "/admin/students/{id}",
            get(handlers::admin_student::get).delete(handlers::admin_student::delete),
        )
        .route(
            "/admin/students/{id}/profile",
            put(handlers::admin_student::update_profile),
        )
        .route(
            "/admin/students/{id}/academic",
            put(handlers::admin_student::update_academic),
        )
        .route(
            "/admin/students/{id}/finance",
            put(handlers::admin_student::update_finance),
        )
        .route(
            "/admin/students/{id}/certificate",
            post(handlers::admin_student::upload_certificate)
                .get(handlers::admin_student::download_certificate),
        )
}

/// Student self-service
fn student_routes() -> Router<AppState> {
    Router::new()
        .route("/student/profile", get(handlers::student::profile))
        .route(
            "/student/parent-contacts",
            put(handlers::student::update_parent_contacts),
        )
        .route(
            "/student/certificate",
            get(handlers::student::download_certificate),
        )
        .route("/student/downloads", get(handlers::student::downloads))
}

/// Admin eulogy and download management
fn content_admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/admin/eulogies",
            post(handlers::content::upload_eulogy).get(handlers::content::admin_list_eulogies),
        )
        .route(
            "/admin/eulogies/{id}",
            delete(handlers::content::delete_eulogy),
        )
        .route(
            "/admin/downloads",
            post(handlers::content::upload_download)
                .get(handlers::content::admin_list_downloads),
        )
        .route(
            "/admin/downloads/{id}",
            delete(handlers::content::delete_download),
        )
}

/// Public listings and file fetches
fn content_public_routes() -> Router<AppState> {
    Router::new()
        .route("/eulogies", get(handlers::content::list_eulogies))
        .route(
            "/eulogies/{id}/download",
            get(handlers::content::download_eulogy),
        )
        .route("/downloads", get(handlers::content::list_downloads))
        .route(
            "/downloads/{id}/download",
            get(handlers::content::download_download),
        )
}

/// Liveness
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
