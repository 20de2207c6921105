use axum::{
    extract::{Path, Query, State},
    routing::get,
    Extension, Json, Router,
};

use crate::dto::{ClientFilterParams, ClientResponse, Page, PageParams};
use crate::middleware::auth::AuthenticatedUser;
use crate::specifications::client_specifications::client_sort_field;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_client_router() -> Router<AppState> {
    Router::new()
        .route("/search/page", get(clients_page))
        .route("/search/:filter", get(search_clients))
        .route("/exists/phone/:phone", get(exists_phone))
        .route("/exists/dni/:dni", get(exists_dni))
}

async fn clients_page(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(filter): Query<ClientFilterParams>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<ClientResponse>>, AppError> {
    let page = params.resolve(client_sort_field)?;
    let clients = state
        .client_service()
        .clients_page_by_filter(filter.filter.as_deref(), &user.email, &page)
        .await?;
    Ok(Json(clients))
}

async fn search_clients(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(filter): Path<String>,
) -> Result<Json<Vec<ClientResponse>>, AppError> {
    let clients = state
        .client_service()
        .search_clients_by_filter(&filter, &user.email)
        .await?;
    Ok(Json(clients))
}

async fn exists_phone(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(phone): Path<String>,
) -> Result<Json<bool>, AppError> {
    Ok(Json(state.client_service().exists_phone(&phone, &user.email).await?))
}

async fn exists_dni(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(dni): Path<String>,
) -> Result<Json<bool>, AppError> {
    Ok(Json(state.client_service().exists_dni(&dni, &user.email).await?))
}
