use serde::Serialize;
use utoipa::ToSchema;

use crate::popularity::{RegionPopularity, ZipPopularity};

#[derive(Debug, Serialize, ToSchema)]
pub struct RegionPage {
    pub regions: Vec<RegionPopularity>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MapPage {
    pub data_url: String,
}

/// Map payload: `{"data": [{"zip", "total", "top": [{"movie_name", "total"}]}]}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ZipPayload {
    pub data: Vec<ZipPopularity>,
}
