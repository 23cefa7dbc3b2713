use axum::{
    Form, Json, Router,
    extract::{Query, State, rejection::FormRejection},
    routing::get,
};

use crate::{
    dto::accounts::{FormPage, LoginForm, LoginResponse, OrderList, SignupForm},
    error::AppResult,
    middleware::auth::AuthUser,
    response::{ApiResponse, Outcome},
    routes::params::{Pagination, form_or_default},
    services::{auth_service, order_service},
    session::SessionId,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", get(signup_page).post(signup))
        .route("/login", get(login_page).post(login))
        .route("/logout", get(logout).post(logout))
        .route("/orders", get(orders))
}

#[utoipa::path(
    get,
    path = "/api/accounts/signup",
    responses(
        (status = 200, description = "Signup form", body = ApiResponse<FormPage>)
    ),
    tag = "Accounts"
)]
pub async fn signup_page() -> Outcome<FormPage> {
    auth_service::signup_page()
}

#[utoipa::path(
    post,
    path = "/api/accounts/signup",
    request_body(content = SignupForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Account created, redirect to login"),
        (status = 400, description = "Form errors")
    ),
    tag = "Accounts"
)]
pub async fn signup(
    State(state): State<AppState>,
    form: Result<Form<SignupForm>, FormRejection>,
) -> AppResult<Outcome<()>> {
    auth_service::signup(&state, form_or_default(form)).await
}

#[utoipa::path(
    get,
    path = "/api/accounts/login",
    responses(
        (status = 200, description = "Login form", body = ApiResponse<FormPage>)
    ),
    tag = "Accounts"
)]
pub async fn login_page() -> Outcome<FormPage> {
    auth_service::login_page()
}

#[utoipa::path(
    post,
    path = "/api/accounts/login",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Bearer token", body = ApiResponse<LoginResponse>),
        (status = 400, description = "Invalid username or password")
    ),
    tag = "Accounts"
)]
pub async fn login(
    State(state): State<AppState>,
    form: Result<Form<LoginForm>, FormRejection>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let resp = auth_service::login(&state, form_or_default(form)).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    method(get, post),
    path = "/api/accounts/logout",
    responses(
        (status = 303, description = "Session dropped, redirect to movies")
    ),
    security(("bearer_auth" = [])),
    tag = "Accounts"
)]
pub async fn logout(
    State(state): State<AppState>,
    user: AuthUser,
    session: SessionId,
) -> Outcome<()> {
    auth_service::logout(&state, &user, &session).await
}

#[utoipa::path(
    get,
    path = "/api/accounts/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "Orders of the current user", body = ApiResponse<OrderList>),
        (status = 303, description = "Not logged in")
    ),
    security(("bearer_auth" = [])),
    tag = "Accounts"
)]
pub async fn orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Outcome<OrderList>> {
    order_service::list_orders(&state, &user, pagination).await
}
