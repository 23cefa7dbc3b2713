use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, Set};

use crate::{
    audit,
    dto::movies::{RatingForm, ReviewEditPage, ReviewForm},
    entity::{
        movie_ratings::{ActiveModel as RatingActive, Column as RatingCol, Entity as MovieRatings},
        movies::{Entity as Movies, Model as MovieModel},
        reviews::{
            ActiveModel as ReviewActive, Column as ReviewCol, Entity as Reviews,
            Model as ReviewModel,
        },
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Review,
    response::Outcome,
    routes::paths,
    state::AppState,
};

pub const COMMENT_MAX_LEN: usize = 255;

/// A submitted comment worth storing: not blank and within the column limit.
pub fn clean_comment(raw: Option<&str>) -> Option<&str> {
    raw.filter(|c| !c.trim().is_empty())
        .filter(|c| c.chars().count() <= COMMENT_MAX_LEN)
}

/// Accepts only an all-digit rating between 1 and 5.
pub fn parse_rating(raw: Option<&str>) -> Option<i16> {
    let raw = raw?;
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse::<i16>().ok().filter(|n| (1..=5).contains(n))
}

async fn find_movie(state: &AppState, id: i32) -> AppResult<MovieModel> {
    Movies::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

/// Review lookup scoped to its author; anything else is not found.
async fn find_own_review(
    state: &AppState,
    user: &AuthUser,
    movie_id: i32,
    review_id: i32,
) -> AppResult<ReviewModel> {
    Reviews::find()
        .filter(ReviewCol::Id.eq(review_id))
        .filter(ReviewCol::MovieId.eq(movie_id))
        .filter(ReviewCol::UserId.eq(user.user_id))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn create_review(
    state: &AppState,
    user: &AuthUser,
    movie_id: i32,
    form: ReviewForm,
) -> AppResult<Outcome<()>> {
    let movie = find_movie(state, movie_id).await?;

    if let Some(comment) = clean_comment(form.comment.as_deref()) {
        let review = ReviewActive {
            id: NotSet,
            movie_id: Set(movie.id),
            user_id: Set(user.user_id),
            comment: Set(comment.to_string()),
            created_at: NotSet,
        }
        .insert(&state.orm)
        .await?;

        audit::record(
            &state.pool,
            user.user_id,
            "review_create",
            "reviews",
            serde_json::json!({ "review_id": review.id, "movie_id": movie.id }),
        )
        .await;
    } else {
        tracing::debug!(movie_id, "ignored empty review");
    }

    Ok(Outcome::redirect(paths::movie(movie.id)))
}

pub async fn edit_review_page(
    state: &AppState,
    user: &AuthUser,
    movie_id: i32,
    review_id: i32,
) -> AppResult<Outcome<ReviewEditPage>> {
    let review = find_own_review(state, user, movie_id, review_id).await?;
    Ok(Outcome::render(
        "Edit Review",
        ReviewEditPage {
            review: Review::from(review),
        },
    ))
}

pub async fn update_review(
    state: &AppState,
    user: &AuthUser,
    movie_id: i32,
    review_id: i32,
    form: ReviewForm,
) -> AppResult<Outcome<()>> {
    let review = find_own_review(state, user, movie_id, review_id).await?;

    if let Some(comment) = clean_comment(form.comment.as_deref()) {
        let mut active: ReviewActive = review.into();
        active.comment = Set(comment.to_string());
        active.update(&state.orm).await?;

        audit::record(
            &state.pool,
            user.user_id,
            "review_update",
            "reviews",
            serde_json::json!({ "review_id": review_id, "movie_id": movie_id }),
        )
        .await;
    }

    Ok(Outcome::redirect(paths::movie(movie_id)))
}

pub async fn delete_review(
    state: &AppState,
    user: &AuthUser,
    movie_id: i32,
    review_id: i32,
) -> AppResult<Outcome<()>> {
    let review = find_own_review(state, user, movie_id, review_id).await?;
    review.delete(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "review_delete",
        "reviews",
        serde_json::json!({ "review_id": review_id, "movie_id": movie_id }),
    )
    .await;

    Ok(Outcome::redirect(paths::movie(movie_id)))
}

/// Sets the caller's rating, creating or overwriting the single (movie, user) row.
pub async fn rate_movie(
    state: &AppState,
    user: &AuthUser,
    movie_id: i32,
    form: RatingForm,
) -> AppResult<Outcome<()>> {
    let movie = find_movie(state, movie_id).await?;

    let Some(value) = parse_rating(form.rating.as_deref()) else {
        tracing::debug!(movie_id, "ignored invalid rating");
        return Ok(Outcome::redirect(paths::movie(movie.id)));
    };

    let now = Utc::now();
    let rating = RatingActive {
        id: NotSet,
        movie_id: Set(movie.id),
        user_id: Set(user.user_id),
        value: Set(value),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };
    MovieRatings::insert(rating)
        .on_conflict(
            OnConflict::columns([RatingCol::MovieId, RatingCol::UserId])
                .update_columns([RatingCol::Value, RatingCol::UpdatedAt])
                .to_owned(),
        )
        .exec_without_returning(&state.orm)
        .await?;

    audit::record(
        &state.pool,
        user.user_id,
        "movie_rate",
        "movie_ratings",
        serde_json::json!({ "movie_id": movie.id, "value": value }),
    )
    .await;

    Ok(Outcome::redirect(paths::movie(movie.id)))
}
