/// Request extractors with structured rejections
///
/// Axum's stock `Json` and `Path` answer malformed input with plain-text
/// bodies before a handler ever runs, and a type-mismatched JSON body gets a
/// 422. These wrappers route those rejections through [`ApiError`] instead,
/// so malformed input is always a 400 carrying the same
/// `{error, message, details?}` envelope as every other failure.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::ApiError;

/// `axum::Json` whose rejection is an [`ApiError`]
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `axum::extract::Path` whose rejection is an [`ApiError`]
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);
