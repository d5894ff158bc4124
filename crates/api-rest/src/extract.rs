//! Request extractors.
//!
//! - [`AuthUser`] validates the bearer identity token on protected routes.
//! - [`ClientVisitor`] captures the caller address and user agent for the share audit trail.
//! - [`ApiJson`], [`ApiPath`] and [`ApiQuery`] wrap axum's extractors so malformed input is
//!   answered with the JSON error body instead of axum's plain-text rejection.

use crate::error::ApiError;
use crate::AppState;
use api_shared::{bearer_token, Claims};
use axum::async_trait;
use axum::extract::{ConnectInfo, FromRequest, FromRequestParts};
use axum::http::header::{AUTHORIZATION, USER_AGENT};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use medvault_core::Visitor;
use std::convert::Infallible;
use std::net::SocketAddr;
use uuid::Uuid;

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// The authenticated caller.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn id(&self) -> Uuid {
        self.0.sub
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| ApiError::unauthorized("Authorization header required"))?
            .to_str()
            .map_err(|_| ApiError::unauthorized("Invalid Authorization header format"))?;

        let token = bearer_token(header).ok_or_else(|| {
            ApiError::unauthorized("Authorization header must use Bearer scheme")
        })?;

        Ok(AuthUser(state.tokens.validate(token)?))
    }
}

/// Caller details recorded when a share link is opened.
#[derive(Debug, Clone)]
pub struct ClientVisitor(pub Visitor);

#[async_trait]
impl<S> FromRequestParts<S> for ClientVisitor
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        Ok(ClientVisitor(Visitor {
            ip_address: client_address(&parts.headers, peer),
            user_agent: header_str(&parts.headers, USER_AGENT.as_str())
                .unwrap_or_default()
                .to_owned(),
        }))
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Caller address: first `X-Forwarded-For` entry, then `X-Real-IP`, then the socket peer.
pub(crate) fn client_address(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    header_str(headers, "x-forwarded-for")
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .or_else(|| header_str(headers, "x-real-ip"))
        .map(str::to_owned)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_client_address_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.9, 10.0.0.1"),
        );
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.4"));
        let peer: SocketAddr = "127.0.0.1:5000".parse().unwrap();

        assert_eq!(client_address(&headers, Some(peer)), "203.0.113.9");
    }

    #[test]
    fn test_client_address_fallbacks() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.4"));
        let peer: SocketAddr = "127.0.0.1:5000".parse().unwrap();
        assert_eq!(client_address(&headers, Some(peer)), "198.51.100.4");

        let headers = HeaderMap::new();
        assert_eq!(client_address(&headers, Some(peer)), "127.0.0.1");
        assert_eq!(client_address(&headers, None), "");
    }
}
