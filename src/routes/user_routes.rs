use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};

use crate::dto::{UserRequest, UserResponse};
use crate::middleware::auth::{auth_middleware, AuthenticatedUser};
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Rutas de usuarios. El registro y la verificación de email quedan abiertos.
pub fn create_user_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/email/:email", get(get_user_by_email))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
        .route("/register", post(register_user))
        .route("/check-email/:email", get(check_email))
}

async fn register_user(
    State(state): State<AppState>,
    Json(request): Json<UserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let user = state.user_service().register_user(request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn check_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<bool>, AppError> {
    Ok(Json(state.user_service().check_repeated_email(&email).await?))
}

async fn list_users(
    State(state): State<AppState>,
    Extension(current): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    Ok(Json(state.user_service().list_users(&current).await?))
}

async fn get_user_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    Ok(Json(state.user_service().get_user_by_email(&email).await?))
}
