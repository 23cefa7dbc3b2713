use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Movie, Review};

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct MovieList {
    #[schema(value_type = Vec<Movie>)]
    pub items: Vec<Movie>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewView {
    pub id: i32,
    pub user_id: Uuid,
    pub username: String,
    pub comment: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MovieDetail {
    pub movie: Movie,
    pub reviews: Vec<ReviewView>,
    pub average_rating: Option<f64>,
    pub user_rating: Option<i16>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewEditPage {
    pub review: Review,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ReviewForm {
    pub comment: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RatingForm {
    pub rating: Option<String>,
}
