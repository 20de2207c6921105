//! Rutas de la API
//!
//! Este módulo arma el router completo: rutas públicas de autenticación y
//! registro, y rutas protegidas por el middleware JWT.

pub mod auth_routes;
pub mod car_routes;
pub mod client_routes;
pub mod sale_routes;
pub mod user_routes;

use axum::{middleware, response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::middleware::{auth::auth_middleware, cors::cors_layer};
use crate::state::AppState;

/// Construir el router de la aplicación con su estado
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .nest("/cars", car_routes::create_car_router())
        .nest("/sales", sale_routes::create_sale_router())
        .nest("/clients", client_routes::create_client_router())
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let public = Router::new()
        .route("/health", get(health_check))
        .nest("/auth", auth_routes::create_auth_router())
        .nest("/users", user_routes::create_user_router(state.clone()));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
