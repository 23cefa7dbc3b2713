use axum::{
    Json,
    response::{IntoResponse, Redirect, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct Meta {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub total: Option<i64>,
}

impl Meta {
    pub fn new(page: i64, per_page: i64, total: i64) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
            total: Some(total),
        }
    }

    pub fn empty() -> Self {
        Self {
            page: None,
            per_page: None,
            total: None,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: Option<T>,
    pub meta: Option<Meta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T, meta: Option<Meta>) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
            meta,
        }
    }
}

/// What a page handler produces: a rendered view model or a redirect to a safe page.
#[derive(Debug)]
pub enum Outcome<T> {
    Render(ApiResponse<T>),
    Redirect(String),
}

impl<T: Serialize> Outcome<T> {
    pub fn render(title: impl Into<String>, data: T) -> Self {
        Outcome::Render(ApiResponse::success(title, data, Some(Meta::empty())))
    }

    pub fn render_with_meta(title: impl Into<String>, data: T, meta: Meta) -> Self {
        Outcome::Render(ApiResponse::success(title, data, Some(meta)))
    }

    pub fn redirect(to: impl Into<String>) -> Self {
        Outcome::Redirect(to.into())
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, Outcome::Redirect(_))
    }

    /// Rendered payload, `None` for redirects.
    pub fn into_data(self) -> Option<T> {
        match self {
            Outcome::Render(resp) => resp.data,
            Outcome::Redirect(_) => None,
        }
    }
}

impl<T: Serialize> IntoResponse for Outcome<T> {
    fn into_response(self) -> Response {
        match self {
            Outcome::Render(body) => Json(body).into_response(),
            Outcome::Redirect(to) => Redirect::to(&to).into_response(),
        }
    }
}
