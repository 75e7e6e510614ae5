use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, StatusCode},
    middleware::from_fn_with_state,
    response::{IntoResponse, Json},
    routing::{delete, get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::handlers::{data, elevated, protected, public};
use crate::middleware::{jwt_auth_middleware, require_admin};
use crate::state::AppState;

/// Full router over the given state.
pub fn app(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(user_public_routes())
        .merge(user_protected_routes(state.clone()))
        .merge(user_elevated_routes(state.clone()))
        .merge(children_routes())
        .merge(group_routes())
        .merge(program_routes())
        .merge(attendance_routes())
        .merge(payment_routes())
        .route("/api/statistics", get(data::statistics::statistics_get))
        .layer(DefaultBodyLimit::max(state.config.api.max_request_size_bytes));

    if let Some(cors) = cors_layer(&state.config.security) {
        router = router.layer(cors);
    }
    if state.config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn user_public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users/register", post(public::register_post))
        .route("/api/users/login", post(public::login_post))
}

fn user_protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/users/me", get(protected::me_get))
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

fn user_elevated_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/users", get(elevated::user_list))
        .route("/api/users/:id", delete(elevated::user_delete))
        .route_layer(from_fn_with_state(state, require_admin))
}

fn children_routes() -> Router<AppState> {
    use data::children::*;

    Router::new()
        .route("/api/children", post(child_create).get(child_list))
        .route("/api/children/:id", get(child_get).put(child_update).delete(child_delete))
}

fn group_routes() -> Router<AppState> {
    use data::groups::*;

    Router::new()
        .route("/api/groups", post(group_create).get(group_list))
        .route("/api/groups/:id", get(group_get).put(group_update).delete(group_delete))
}

fn program_routes() -> Router<AppState> {
    use data::programs::*;

    Router::new()
        .route("/api/programs", post(program_create).get(program_list))
        .route("/api/programs/:id", get(program_get).put(program_update).delete(program_delete))
}

fn attendance_routes() -> Router<AppState> {
    use data::attendance::*;

    Router::new()
        .route("/api/attendance", post(attendance_create).get(attendance_list))
        .route("/api/attendance/child/:child_id", get(attendance_by_child))
        .route("/api/attendance/group/:group_id", get(attendance_by_group))
        .route("/api/attendance/:id", get(attendance_get).put(attendance_update).delete(attendance_delete))
}

fn payment_routes() -> Router<AppState> {
    use data::payments::*;

    Router::new()
        .route("/api/payments", post(payment_create).get(payment_list))
        .route("/api/payments/child/:child_id", get(payment_by_child))
        .route("/api/payments/date/:date", get(payment_by_date))
        .route("/api/payments/:id", get(payment_get).put(payment_update).delete(payment_delete))
}

/// Permissive when no origins are configured, an explicit list otherwise.
fn cors_layer(security: &SecurityConfig) -> Option<CorsLayer> {
    if !security.enable_cors {
        return None;
    }
    if security.cors_origins.is_empty() {
        return Some(CorsLayer::permissive());
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any),
    )
}

async fn root() -> Json<Value> {
    Json(json!({
        "name": "After-school API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "users": "/api/users/register, /api/users/login (public), /api/users/me (token), /api/users[/:id] (admin)",
            "children": "/api/children[/:id]",
            "groups": "/api/groups[/:id]",
            "programs": "/api/programs[/:id]",
            "attendance": "/api/attendance[/:id], /api/attendance/child/:childId, /api/attendance/group/:groupId",
            "payments": "/api/payments[/:id], /api/payments/child/:childId, /api/payments/date/:date",
            "statistics": "/api/statistics",
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "timestamp": now, "database": "ok" })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded", "timestamp": now, "message": "database unavailable" })),
            )
        }
    }
}
