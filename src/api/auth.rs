use std::convert::Infallible;
use std::net::SocketAddr;
use async_trait::async_trait;
use axum::extract::{ConnectInfo, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use axum::Extension;
use serde::Deserialize;
use crate::api::{ApiContext, ApiError};

pub const CLIENT_ID_HEADER: &str = "x-client-id";
pub const ADMIN_KEY_HEADER: &str = "x-admin-key";
pub const ANONYMOUS_CLIENT: &str = "anonymous";

/// Who is calling, for likes: the `x-client-id` header, else the peer IP,
/// else `"anonymous"`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientId(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for ClientId
    where
        S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self, Self::Rejection> {
        let header = parts.headers.get(CLIENT_ID_HEADER)
            .and_then(|x| x.to_str().ok())
            .map(str::trim)
            .filter(|x| !x.is_empty());
        if let Some(client_id) = header {
            return Ok(Self(client_id.to_string()));
        }
        let client_id = peer_ip(parts)
            .unwrap_or_else(|| ANONYMOUS_CLIENT.to_string());
        Ok(Self(client_id))
    }
}

pub(crate) fn peer_ip(parts: &Parts) -> Option<String> {
    parts.extensions.get::<ConnectInfo<SocketAddr>>()
        .map(|x| x.0.ip().to_string())
}

#[derive(Deserialize, Debug, Default)]
pub struct AdminKeyQuery {
    #[serde(rename = "adminKey")]
    admin_key: Option<String>,
}

pub fn is_key_valid(provided: Option<&str>, expected: &str) -> Result<(), ApiError> {
    match provided {
        Some(key) if key == expected => Ok(()),
        _ => Err(ApiError::InvalidAdminKey),
    }
}

/// Lets the request through only with the configured admin key, taken from
/// the `x-admin-key` header or the `adminKey` query parameter.
pub async fn require_admin_key(
    ctx: Extension<ApiContext>,
    query: Option<Query<AdminKeyQuery>>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let expected = ctx.cfg.server.admin_key.as_ref()
        .ok_or(ApiError::AdminKeyNotConfigured)?;
    let provided = req.headers().get(ADMIN_KEY_HEADER)
        .and_then(|x| x.to_str().ok())
        .map(str::to_string)
        .or_else(|| query.and_then(|Query(x)| x.admin_key));
    is_key_valid(provided.as_deref(), expected.expose())?;
    Ok(next.run(req).await)
}
