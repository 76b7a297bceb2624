//! Request extractors whose rejections use the API's error body.

use axum::extract::FromRequest;

use crate::error::AppError;

/// `axum::Json` with rejections rendered as `{"error": ...}`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
