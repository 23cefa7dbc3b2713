use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::popularity::{MapPage, RegionPage, ZipPayload},
    error::AppResult,
    response::{ApiResponse, Outcome},
    services::popularity_service,
    state::AppState,
};

/// Mounted under `/cart` next to the cart routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/popularity", get(region_view))
        .route("/popularity/map", get(map_view))
        .route("/popularity.json", get(zip_json))
}

#[utoipa::path(
    get,
    path = "/api/cart/popularity",
    responses(
        (status = 200, description = "Top movies per region", body = ApiResponse<RegionPage>)
    ),
    tag = "Popularity"
)]
pub async fn region_view(State(state): State<AppState>) -> AppResult<Outcome<RegionPage>> {
    popularity_service::region_page(&state).await
}

#[utoipa::path(
    get,
    path = "/api/cart/popularity/map",
    responses(
        (status = 200, description = "Map page", body = ApiResponse<MapPage>)
    ),
    tag = "Popularity"
)]
pub async fn map_view() -> Outcome<MapPage> {
    popularity_service::map_page()
}

#[utoipa::path(
    get,
    path = "/api/cart/popularity.json",
    responses(
        (status = 200, description = "Per-ZIP totals and top movies", body = ZipPayload)
    ),
    tag = "Popularity"
)]
pub async fn zip_json(State(state): State<AppState>) -> AppResult<Json<ZipPayload>> {
    let payload = popularity_service::zip_payload(&state).await?;
    Ok(Json(payload))
}
