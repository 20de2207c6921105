use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Extension, Json, Router,
};

use crate::dto::{CarQueryParams, CarResponse, ModelResponse, Page, PageParams, PostCarDto, UpdateCarDto};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::Brand;
use crate::specifications::car_specifications::{car_sort_field, CarFilters};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_car_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register_car))
        .route("/update", put(update_car))
        .route("/search", get(search_cars))
        .route("/available", get(available_cars))
        .route("/models", get(list_models))
        .route("/brands", get(list_brands))
        .route("/exists/:plate", get(exists_license_plate))
}

async fn register_car(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<PostCarDto>,
) -> Result<(StatusCode, Json<CarResponse>), AppError> {
    let car = state.car_service().create_car(request, &user.email).await?;
    Ok((StatusCode::CREATED, Json(car)))
}

async fn update_car(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<UpdateCarDto>,
) -> Result<Json<CarResponse>, AppError> {
    let car = state.car_service().update_car(request, &user.email).await?;
    Ok(Json(car))
}

async fn search_cars(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(filters): Query<CarFilters>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<CarResponse>>, AppError> {
    let page = params.resolve(car_sort_field)?;
    let cars = state
        .car_service()
        .search_cars(&filters, &user.email, &page)
        .await?;
    Ok(Json(cars))
}

async fn available_cars(
    State(state): State<AppState>,
    Query(params): Query<CarQueryParams>,
) -> Result<Json<Vec<CarResponse>>, AppError> {
    let cars = state
        .car_service()
        .available_cars(params.car_query.as_deref())
        .await?;
    Ok(Json(cars))
}

async fn list_models(State(state): State<AppState>) -> Result<Json<Vec<ModelResponse>>, AppError> {
    Ok(Json(state.car_service().list_models().await?))
}

async fn list_brands(State(state): State<AppState>) -> Result<Json<Vec<Brand>>, AppError> {
    Ok(Json(state.car_service().list_brands().await?))
}

async fn exists_license_plate(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(plate): Path<String>,
) -> Result<Json<bool>, AppError> {
    let exists = state
        .car_service()
        .exists_license_plate(&plate, &user.email)
        .await?;
    Ok(Json(exists))
}
