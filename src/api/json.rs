use axum::extract::FromRequest;
use crate::api::ApiError;

/// `axum::Json` whose rejections answer with the error envelope.
#[derive(FromRequest, Debug)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
