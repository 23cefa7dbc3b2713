//! Read-side popularity rankings, recomputed from the counter rows on every call.

use std::collections::BTreeMap;

use sea_orm::FromQueryResult;
use serde::Serialize;
use utoipa::ToSchema;

/// Entries kept per region or ZIP.
pub const TOP_N: usize = 5;

const REGION_PREFIX_LEN: usize = 3;

/// Summed counter for one (zip, movie) pair.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct ZipMovieCount {
    pub zip: String,
    pub movie_id: i32,
    pub movie_name: String,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RegionMovie {
    pub movie_id: i32,
    pub movie_name: String,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RegionPopularity {
    pub region: String,
    pub top: Vec<RegionMovie>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ZipMovie {
    pub movie_name: String,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ZipPopularity {
    pub zip: String,
    /// Sum over every movie bought in this ZIP, not just `top`.
    pub total: i64,
    pub top: Vec<ZipMovie>,
}

/// `"30332"` becomes `"303**"`.
pub fn region_key(zip: &str) -> String {
    let mut key: String = zip.chars().take(REGION_PREFIX_LEN).collect();
    key.push_str("**");
    key
}

/// Top movies per region, regions in ascending key order.
pub fn rank_regions(rows: &[ZipMovieCount]) -> Vec<RegionPopularity> {
    let mut regions: BTreeMap<String, BTreeMap<i32, RegionMovie>> = BTreeMap::new();
    for row in rows {
        regions
            .entry(region_key(&row.zip))
            .or_default()
            .entry(row.movie_id)
            .and_modify(|m| m.total += row.total)
            .or_insert_with(|| RegionMovie {
                movie_id: row.movie_id,
                movie_name: row.movie_name.clone(),
                total: row.total,
            });
    }

    regions
        .into_iter()
        .map(|(region, movies)| {
            let mut top: Vec<RegionMovie> = movies.into_values().collect();
            top.sort_by(|a, b| {
                b.total
                    .cmp(&a.total)
                    .then_with(|| a.movie_name.cmp(&b.movie_name))
                    .then_with(|| a.movie_id.cmp(&b.movie_id))
            });
            top.truncate(TOP_N);
            RegionPopularity { region, top }
        })
        .collect()
}

/// Top movies and grand total per exact ZIP, ZIPs in ascending order.
pub fn rank_zips(rows: &[ZipMovieCount]) -> Vec<ZipPopularity> {
    let mut zips: BTreeMap<&str, BTreeMap<i32, (&str, i64)>> = BTreeMap::new();
    for row in rows {
        zips.entry(row.zip.as_str())
            .or_default()
            .entry(row.movie_id)
            .and_modify(|(_, total)| *total += row.total)
            .or_insert((row.movie_name.as_str(), row.total));
    }

    zips.into_iter()
        .map(|(zip, movies)| {
            let mut ranked: Vec<(i32, &str, i64)> = movies
                .into_iter()
                .map(|(id, (name, total))| (id, name, total))
                .collect();
            let total: i64 = ranked.iter().map(|(_, _, t)| t).sum();
            ranked.sort_by(|a, b| {
                b.2.cmp(&a.2)
                    .then_with(|| a.1.cmp(b.1))
                    .then_with(|| a.0.cmp(&b.0))
            });
            let top = ranked
                .into_iter()
                .take(TOP_N)
                .map(|(_, name, total)| ZipMovie {
                    movie_name: name.to_string(),
                    total,
                })
                .collect();
            ZipPopularity {
                zip: zip.to_string(),
                total,
                top,
            }
        })
        .collect()
}
