use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};

use crate::{
    dto::movies::{MovieDetail, MovieList, ReviewView},
    entity::{
        movie_ratings::{Column as RatingCol, Entity as MovieRatings},
        movies::{Column as MovieCol, Entity as Movies},
        reviews::{Column as ReviewCol, Entity as Reviews},
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Movie,
    response::{Meta, Outcome},
    routes::params::MovieQuery,
    state::AppState,
};

/// Escapes LIKE wildcards so the search term matches literally.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

pub async fn list_movies(state: &AppState, query: MovieQuery) -> AppResult<Outcome<MovieList>> {
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    let search = query.search.as_deref().map(str::trim).unwrap_or_default();
    if !search.is_empty() {
        let name_matches = Expr::col(MovieCol::Name).ilike(like_pattern(search));
        condition = condition.add(name_matches);
    }

    let finder = Movies::find().filter(condition).order_by_asc(MovieCol::Id);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Movie::from)
        .collect();

    Ok(Outcome::render_with_meta(
        "Movies",
        MovieList { items },
        Meta::new(page, limit, total),
    ))
}

pub async fn show_movie(
    state: &AppState,
    viewer: Option<&AuthUser>,
    id: i32,
) -> AppResult<Outcome<MovieDetail>> {
    let movie = Movies::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let reviews = Reviews::find()
        .filter(ReviewCol::MovieId.eq(id))
        .order_by_asc(ReviewCol::Id)
        .find_also_related(Users)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(review, author)| ReviewView {
            id: review.id,
            user_id: review.user_id,
            username: author.map(|u| u.username).unwrap_or_default(),
            comment: review.comment,
            date: review.created_at.with_timezone(&chrono::Utc),
        })
        .collect();

    let average_rating = average_rating(state, id).await?;

    let user_rating = match viewer {
        Some(user) => MovieRatings::find()
            .filter(RatingCol::MovieId.eq(id))
            .filter(RatingCol::UserId.eq(user.user_id))
            .one(&state.orm)
            .await?
            .map(|rating| rating.value),
        None => None,
    };

    let movie = Movie::from(movie);
    Ok(Outcome::render(
        movie.name.clone(),
        MovieDetail {
            movie,
            reviews,
            average_rating,
            user_rating,
        },
    ))
}

/// Mean of all ratings for the movie, `None` when it has none.
pub async fn average_rating(state: &AppState, movie_id: i32) -> AppResult<Option<f64>> {
    let average = MovieRatings::find()
        .select_only()
        .column_as(Expr::cust("AVG(\"value\")::float8"), "average")
        .filter(RatingCol::MovieId.eq(movie_id))
        .into_tuple::<Option<f64>>()
        .one(&state.orm)
        .await?
        .flatten();
    Ok(average)
}
