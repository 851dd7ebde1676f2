pub mod adapters;
pub mod claimer;
pub mod clock;
pub mod cli;
pub mod config;
pub mod db;
pub mod executor;
pub mod hot_cache;
pub mod janitor;
pub mod logger;
pub mod metrics;
pub mod planner;
pub mod routes;
pub mod schema;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use diesel::PgConnection;
use diesel_migrations::embed_migrations;
use diesel_migrations::EmbeddedMigrations;
use diesel_migrations::MigrationHarness;
use serde_json::json;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

pub fn run_migration(conn: &mut PgConnection) {
    conn.run_pending_migrations(MIGRATIONS)
        .expect("migrations to succeed");
}

/// Our app's top level error type, mapped to the HTTP statuses in
/// `spec.md` §7.
#[derive(Debug)]
pub enum AppError {
    ValidationError(String),
    ConflictError(String),
    StoreUnavailable(String),
    AdapterError(String),
    SignatureError(String),
    NotFound(String),
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::StoreUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            AppError::AdapterError(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::SignatureError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<db::intent_store::StoreError> for AppError {
    fn from(e: db::intent_store::StoreError) -> Self {
        match e {
            db::intent_store::StoreError::Duplicate => {
                AppError::ConflictError("payment_hash already exists".to_string())
            }
            db::intent_store::StoreError::Unavailable(e) => AppError::StoreUnavailable(e.to_string()),
        }
    }
}
