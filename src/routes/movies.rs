use axum::{
    Form, Router,
    extract::{
        Path, Query, State,
        rejection::{FormRejection, PathRejection},
    },
    routing::{get, post},
};

use crate::{
    dto::movies::{MovieDetail, MovieList, RatingForm, ReviewEditPage, ReviewForm},
    error::AppResult,
    middleware::auth::AuthUser,
    response::{ApiResponse, Outcome},
    routes::params::{MovieQuery, form_or_default, path_or_not_found},
    services::{movie_service, review_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_movies))
        .route("/{id}", get(show_movie))
        .route("/{id}/reviews", post(create_review))
        .route(
            "/{id}/reviews/{review_id}/edit",
            get(edit_review_page).post(update_review),
        )
        .route(
            "/{id}/reviews/{review_id}/delete",
            get(delete_review).post(delete_review),
        )
        .route("/{id}/rate", post(rate_movie))
}

#[utoipa::path(
    get,
    path = "/api/movies",
    params(
        ("search" = Option<String>, Query, description = "Case-insensitive name filter"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "List movies", body = ApiResponse<MovieList>)
    ),
    tag = "Movies"
)]
pub async fn list_movies(
    State(state): State<AppState>,
    Query(query): Query<MovieQuery>,
) -> AppResult<Outcome<MovieList>> {
    movie_service::list_movies(&state, query).await
}

#[utoipa::path(
    get,
    path = "/api/movies/{id}",
    params(
        ("id" = i32, Path, description = "Movie ID")
    ),
    responses(
        (status = 200, description = "Movie detail", body = ApiResponse<MovieDetail>),
        (status = 404, description = "Movie not found")
    ),
    tag = "Movies"
)]
pub async fn show_movie(
    State(state): State<AppState>,
    viewer: Option<AuthUser>,
    id: Result<Path<i32>, PathRejection>,
) -> AppResult<Outcome<MovieDetail>> {
    let id = path_or_not_found(id)?;
    movie_service::show_movie(&state, viewer.as_ref(), id).await
}

#[utoipa::path(
    post,
    path = "/api/movies/{id}/reviews",
    params(
        ("id" = i32, Path, description = "Movie ID")
    ),
    request_body(content = ReviewForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Redirect to the movie"),
        (status = 404, description = "Movie not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn create_review(
    State(state): State<AppState>,
    user: AuthUser,
    id: Result<Path<i32>, PathRejection>,
    form: Result<Form<ReviewForm>, FormRejection>,
) -> AppResult<Outcome<()>> {
    let id = path_or_not_found(id)?;
    review_service::create_review(&state, &user, id, form_or_default(form)).await
}

#[utoipa::path(
    get,
    path = "/api/movies/{id}/reviews/{review_id}/edit",
    params(
        ("id" = i32, Path, description = "Movie ID"),
        ("review_id" = i32, Path, description = "Review ID")
    ),
    responses(
        (status = 200, description = "Own review", body = ApiResponse<ReviewEditPage>),
        (status = 404, description = "No such review for this user")
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn edit_review_page(
    State(state): State<AppState>,
    user: AuthUser,
    ids: Result<Path<(i32, i32)>, PathRejection>,
) -> AppResult<Outcome<ReviewEditPage>> {
    let (id, review_id) = path_or_not_found(ids)?;
    review_service::edit_review_page(&state, &user, id, review_id).await
}

#[utoipa::path(
    post,
    path = "/api/movies/{id}/reviews/{review_id}/edit",
    params(
        ("id" = i32, Path, description = "Movie ID"),
        ("review_id" = i32, Path, description = "Review ID")
    ),
    request_body(content = ReviewForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Redirect to the movie"),
        (status = 404, description = "No such review for this user")
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn update_review(
    State(state): State<AppState>,
    user: AuthUser,
    ids: Result<Path<(i32, i32)>, PathRejection>,
    form: Result<Form<ReviewForm>, FormRejection>,
) -> AppResult<Outcome<()>> {
    let (id, review_id) = path_or_not_found(ids)?;
    review_service::update_review(&state, &user, id, review_id, form_or_default(form)).await
}

#[utoipa::path(
    method(get, post),
    path = "/api/movies/{id}/reviews/{review_id}/delete",
    params(
        ("id" = i32, Path, description = "Movie ID"),
        ("review_id" = i32, Path, description = "Review ID")
    ),
    responses(
        (status = 303, description = "Deleted, redirect to the movie"),
        (status = 404, description = "No such review for this user")
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn delete_review(
    State(state): State<AppState>,
    user: AuthUser,
    ids: Result<Path<(i32, i32)>, PathRejection>,
) -> AppResult<Outcome<()>> {
    let (id, review_id) = path_or_not_found(ids)?;
    review_service::delete_review(&state, &user, id, review_id).await
}

#[utoipa::path(
    post,
    path = "/api/movies/{id}/rate",
    params(
        ("id" = i32, Path, description = "Movie ID")
    ),
    request_body(content = RatingForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Redirect to the movie"),
        (status = 404, description = "Movie not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Ratings"
)]
pub async fn rate_movie(
    State(state): State<AppState>,
    user: AuthUser,
    id: Result<Path<i32>, PathRejection>,
    form: Result<Form<RatingForm>, FormRejection>,
) -> AppResult<Outcome<()>> {
    let id = path_or_not_found(id)?;
    review_service::rate_movie(&state, &user, id, form_or_default(form)).await
}
