use axum::{
    Form,
    extract::{
        Path,
        rejection::{FormRejection, PathRejection},
    },
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;
        (page, per_page, offset)
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct MovieQuery {
    pub search: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl MovieQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

/// Unreadable form bodies count as empty submissions and fail validation downstream.
pub fn form_or_default<T: Default>(form: Result<Form<T>, FormRejection>) -> T {
    match form {
        Ok(Form(value)) => value,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "unreadable form body");
            T::default()
        }
    }
}

/// Ids that do not parse are treated like ids that do not exist.
pub fn path_or_not_found<T>(path: Result<Path<T>, PathRejection>) -> AppResult<T> {
    match path {
        Ok(Path(value)) => Ok(value),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "unparsable path");
            Err(AppError::NotFound)
        }
    }
}
