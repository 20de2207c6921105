use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};

use crate::dto::{Page, PageParams, PostSaleDto, PostSaleWithClientDto, SaleResponse};
use crate::middleware::auth::AuthenticatedUser;
use crate::specifications::sale_specifications::{sale_sort_field, SaleFilters};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_sale_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register_sale))
        .route("/register/with-client", post(register_sale_with_client))
        .route("/search", get(search_sales))
        .route("/client/:dni", get(sales_by_client_dni))
}

async fn register_sale(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<PostSaleDto>,
) -> Result<(StatusCode, Json<SaleResponse>), AppError> {
    let sale = state.sale_service().save_sale(request, &user.email).await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

async fn register_sale_with_client(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<PostSaleWithClientDto>,
) -> Result<(StatusCode, Json<SaleResponse>), AppError> {
    let sale = state
        .sale_service()
        .save_sale_with_client(request, &user.email)
        .await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

async fn search_sales(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(filters): Query<SaleFilters>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<SaleResponse>>, AppError> {
    let page = params.resolve(sale_sort_field)?;
    let sales = state
        .sale_service()
        .search_sales(&filters, &user.email, &page)
        .await?;
    Ok(Json(sales))
}

async fn sales_by_client_dni(
    State(state): State<AppState>,
    Path(dni): Path<String>,
) -> Result<Json<Vec<SaleResponse>>, AppError> {
    Ok(Json(state.sale_service().sales_by_client_dni(&dni).await?))
}
