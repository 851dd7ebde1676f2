//! Admin-only read surface: aggregate stats over a configurable window.
//! Split into its own module the way the reference service keeps its
//! admin routes apart from the main API surface.

use super::AppState;
use super::StatsQuery;
use crate::db::intent_store;
use crate::AppError;
use axum::extract::Query;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Json;
use axum::Router;
use serde::Serialize;
use std::sync::Arc;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/stats", get(stats))
}

#[derive(Debug, Serialize)]
struct StatsEntry {
    status: String,
    count: i64,
    total_amount_sat: i64,
    tip_amount_sat: i64,
}

/// Compares the `Authorization: Bearer <token>` header against the
/// configured admin secret. An empty configured secret never matches —
/// there is no "admin disabled, let everyone through" mode.
fn require_admin(headers: &HeaderMap, admin_secret: &str) -> Result<(), AppError> {
    if admin_secret.is_empty() {
        return Err(AppError::SignatureError("admin access is not configured".to_string()));
    }

    let presented = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match presented {
        Some(token) if token == admin_secret => Ok(()),
        _ => Err(AppError::SignatureError("invalid or missing admin bearer token".to_string())),
    }
}

/// `GET /admin/stats?window_seconds=3600`: aggregate intent counts/sums
/// by status over the trailing window (default one hour).
async fn stats(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<StatsQuery>,
) -> Result<impl IntoResponse, AppError> {
    require_admin(&headers, &state.settings.admin_secret)?;

    let mut conn = state
        .pool
        .get()
        .map_err(|e| AppError::StoreUnavailable(e.to_string()))?;

    let since = query.since(state.clock.as_ref());
    let stats = intent_store::stats(&mut conn, since)?;

    let entries: Vec<StatsEntry> = stats
        .into_iter()
        .map(|s| StatsEntry {
            status: format!("{:?}", s.status).to_lowercase(),
            count: s.count,
            total_amount_sat: s.total_amount_sat,
            tip_amount_sat: s.tip_amount_sat,
        })
        .collect();

    Ok(Json(serde_json::json!({ "since": since.to_string(), "stats": entries })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_admin_rejects_when_no_secret_is_configured() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            "Bearer anything".parse().unwrap(),
        );
        assert!(require_admin(&headers, "").is_err());
    }

    #[test]
    fn require_admin_rejects_missing_or_mismatched_token() {
        let admin_secret = "admin-secret";
        assert!(require_admin(&HeaderMap::new(), admin_secret).is_err());

        let mut wrong = HeaderMap::new();
        wrong.insert(axum::http::header::AUTHORIZATION, "Bearer nope".parse().unwrap());
        assert!(require_admin(&wrong, admin_secret).is_err());
    }

    #[test]
    fn require_admin_accepts_a_matching_bearer_token() {
        let admin_secret = "admin-secret";
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            format!("Bearer {admin_secret}").parse().unwrap(),
        );
        assert!(require_admin(&headers, admin_secret).is_ok());
    }
}
