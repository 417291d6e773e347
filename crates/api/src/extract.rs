//! Request extractors with API-shaped rejections.
//!
//! `axum::Json` rejects malformed bodies with 422 and a plain-text message;
//! this wrapper converts those rejections into the API's standard 400
//! `{"message": "..."}` envelope so body validation failures look like every
//! other validation failure.

use axum::extract::FromRequest;
use axum::extract::rejection::JsonRejection;
use axum::response::{IntoResponse, Response};

use crate::error::AppError;

/// `axum::Json` with rejections converted to the API's error envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct Json<T>(pub T);

impl<T> IntoResponse for Json<T>
where
    axum::Json<T>: IntoResponse,
{
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}
