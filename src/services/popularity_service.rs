use sea_orm::sea_query::Expr;
use sea_orm::{EntityTrait, JoinType, QuerySelect, RelationTrait};

use crate::{
    dto::popularity::{MapPage, RegionPage, ZipPayload},
    entity::{
        movies::Column as MovieCol,
        popularity::{self, Column as PopCol, Entity as Popularity},
    },
    error::AppResult,
    popularity::{ZipMovieCount, rank_regions, rank_zips},
    response::Outcome,
    routes::paths,
    state::AppState,
};

/// Counter totals per (zip, movie), read fresh from the table.
pub async fn zip_movie_counts(state: &AppState) -> AppResult<Vec<ZipMovieCount>> {
    let rows = Popularity::find()
        .select_only()
        .column(PopCol::Zip)
        .column(PopCol::MovieId)
        .column_as(MovieCol::Name, "movie_name")
        .column_as(Expr::cust("SUM(\"popularity\".\"count\")::bigint"), "total")
        .join(JoinType::InnerJoin, popularity::Relation::Movies.def())
        .group_by(PopCol::Zip)
        .group_by(PopCol::MovieId)
        .group_by(MovieCol::Name)
        .into_model::<ZipMovieCount>()
        .all(&state.orm)
        .await?;
    Ok(rows)
}

pub async fn region_page(state: &AppState) -> AppResult<Outcome<RegionPage>> {
    let rows = zip_movie_counts(state).await?;
    Ok(Outcome::render(
        "Local Popularity",
        RegionPage {
            regions: rank_regions(&rows),
        },
    ))
}

pub fn map_page() -> Outcome<MapPage> {
    Outcome::render(
        "Local Popularity (Map)",
        MapPage {
            data_url: paths::POPULARITY_JSON.into(),
        },
    )
}

pub async fn zip_payload(state: &AppState) -> AppResult<ZipPayload> {
    let rows = zip_movie_counts(state).await?;
    Ok(ZipPayload {
        data: rank_zips(&rows),
    })
}
