use axum::extract::rejection::JsonRejection;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::error;
use crate::api::Envelope;
use crate::error::SiteError;

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("Admin key not configured")]
    AdminKeyNotConfigured,

    #[error("Invalid admin key")]
    InvalidAdminKey,

    #[error("Route not found")]
    RouteNotFound,

    #[error("Too many requests from this IP, please try again later.")]
    TooManyRequests,

    #[error("{}", .0.body_text())]
    InvalidJson(#[from] JsonRejection),

    #[error(transparent)]
    Site(#[from] SiteError),
}

/// The real cause of a 500, carried in the response extensions. Only the
/// development-mode layer ever puts it in a body.
#[derive(Clone, Debug)]
pub struct InternalErrorCause {
    error: &'static str,
    cause: String,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::AdminKeyNotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidAdminKey => StatusCode::UNAUTHORIZED,
            Self::RouteNotFound => StatusCode::NOT_FOUND,
            Self::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            Self::InvalidJson(_) => StatusCode::BAD_REQUEST,
            Self::Site(e) => match e {
                SiteError::NotFound(_) => StatusCode::NOT_FOUND,
                SiteError::DbIOError(_)
                | SiteError::DbSerializationError(_)
                | SiteError::PluginFetchError(_) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_REQUEST,
            },
        }
    }

    /// The public message for unexpected failures, which never leaks the cause.
    fn generic_message(&self) -> &'static str {
        match self {
            Self::Site(SiteError::PluginFetchError(_)) => "Failed to fetch plugins",
            _ => "Something went wrong!",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            Self::Site(SiteError::DbIOError(e)) => error!("Storage IO error: {:?}", e),
            Self::Site(SiteError::DbSerializationError(e)) => error!("Storage serialization error: {:?}", e),
            Self::Site(SiteError::PluginFetchError(e)) => error!("Plugin catalog error: {}", e),
            Self::AdminKeyNotConfigured => error!("Admin endpoint called but no admin key is configured"),
            _ => (),
        }

        let is_internal = status == StatusCode::INTERNAL_SERVER_ERROR && !matches!(self, Self::AdminKeyNotConfigured);
        if !is_internal {
            return (status, Envelope::<()>::error(self.to_string())).into_response();
        }
        let error = self.generic_message();
        let mut response = (status, Envelope::<()>::error(error).message("Internal server error")).into_response();
        response.extensions_mut().insert(InternalErrorCause { error, cause: self.to_string() });
        response
    }
}

/// Rewrites 500 bodies to include their cause. Only mounted in development.
pub async fn expose_internal_errors(req: Request, next: Next) -> Response {
    let response = next.run(req).await;
    match response.extensions().get::<InternalErrorCause>().cloned() {
        Some(x) => (response.status(), Envelope::<()>::error(x.error).message(x.cause)).into_response(),
        None => response,
    }
}
