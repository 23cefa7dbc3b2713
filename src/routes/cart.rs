use axum::{
    Form, Router,
    extract::{
        Path, State,
        rejection::{FormRejection, PathRejection},
    },
    routing::{get, post},
};

use crate::{
    dto::cart::{AddToCartForm, CartPage, PurchaseForm, PurchaseReceipt},
    error::AppResult,
    middleware::auth::AuthUser,
    response::{ApiResponse, Outcome},
    routes::{
        params::{form_or_default, path_or_not_found},
        paths, popularity,
    },
    services::cart_service,
    session::SessionId,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(cart_index))
        .route("/{id}/add", post(add_to_cart))
        .route("/clear", get(clear_cart).post(clear_cart))
        .route("/purchase", get(purchase_page).post(purchase))
        .merge(popularity::router())
}

#[utoipa::path(
    get,
    path = "/api/cart",
    responses(
        (status = 200, description = "Movies in the session cart", body = ApiResponse<CartPage>)
    ),
    tag = "Cart"
)]
pub async fn cart_index(
    State(state): State<AppState>,
    session: SessionId,
) -> AppResult<Outcome<CartPage>> {
    cart_service::cart_index(&state, &session).await
}

#[utoipa::path(
    post,
    path = "/api/cart/{id}/add",
    params(
        ("id" = i32, Path, description = "Movie ID")
    ),
    request_body(content = AddToCartForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Redirect to the cart"),
        (status = 404, description = "Movie not found")
    ),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    session: SessionId,
    id: Result<Path<i32>, PathRejection>,
    form: Result<Form<AddToCartForm>, FormRejection>,
) -> AppResult<Outcome<()>> {
    let id = path_or_not_found(id)?;
    cart_service::add_to_cart(&state, &session, id, form_or_default(form)).await
}

#[utoipa::path(
    method(get, post),
    path = "/api/cart/clear",
    responses(
        (status = 303, description = "Cart emptied, redirect to the cart")
    ),
    tag = "Cart"
)]
pub async fn clear_cart(State(state): State<AppState>, session: SessionId) -> Outcome<()> {
    cart_service::clear_cart(&state, &session)
}

#[utoipa::path(
    get,
    path = "/api/cart/purchase",
    responses(
        (status = 303, description = "Redirect to the cart, or to login when anonymous")
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn purchase_page(_user: AuthUser) -> Outcome<()> {
    Outcome::redirect(paths::CART)
}

#[utoipa::path(
    post,
    path = "/api/cart/purchase",
    request_body(content = PurchaseForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Order placed", body = ApiResponse<PurchaseReceipt>),
        (status = 303, description = "Empty cart, or not logged in"),
        (status = 500, description = "Order rolled back, cart kept")
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn purchase(
    State(state): State<AppState>,
    user: AuthUser,
    session: SessionId,
    form: Result<Form<PurchaseForm>, FormRejection>,
) -> AppResult<Outcome<PurchaseReceipt>> {
    cart_service::purchase(&state, &user, &session, form_or_default(form)).await
}
