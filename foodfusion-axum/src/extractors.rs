use std::{convert::Infallible, net::SocketAddr};

use axum::{
    Extension, RequestPartsExt,
    extract::{ConnectInfo, FromRequestParts, OptionalFromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use foodfusion::{ClientId, User};

use crate::error::ApiError;

const UNKNOWN_CLIENT: &str = "unknown";

/// Whether client-supplied proxy headers are trusted when identifying a client.
///
/// Off by default: a client that can set `X-Forwarded-For` itself could
/// otherwise pick a fresh identifier for every attempt.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientIpConfig {
    pub trust_proxy_headers: bool,
}

/// The identifier the login attempt guard counts failures against.
///
/// Resolved from the peer address, falling back to `"unknown"`. With
/// [`ClientIpConfig::trust_proxy_headers`] on, the `Client-IP` header and then
/// the first entry of `X-Forwarded-For` take precedence.
pub struct ClientIp(pub ClientId);

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let config = parts
            .extensions
            .get::<ClientIpConfig>()
            .copied()
            .unwrap_or_default();

        let mut candidates: Vec<String> = Vec::new();
        if config.trust_proxy_headers {
            if let Some(ip) = header_value(parts, "Client-IP") {
                candidates.push(ip.to_string());
            }
            if let Some(forwarded) = header_value(parts, "X-Forwarded-For") {
                if let Some(first) = forwarded.split(',').next() {
                    candidates.push(first.to_string());
                }
            }
        }
        if let Ok(ConnectInfo(addr)) = parts.extract::<ConnectInfo<SocketAddr>>().await {
            candidates.push(addr.ip().to_string());
        }

        let client_id = candidates
            .iter()
            .find_map(|candidate| ClientId::new(candidate).ok())
            .map_or_else(|| ClientId::new(UNKNOWN_CLIENT), Ok)
            .map_err(|e| ApiError::InternalError(e.to_string()))?;

        Ok(ClientIp(client_id))
    }
}

fn header_value<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// The raw token from an `Authorization: Bearer` header. Expiry is not checked.
pub struct BearerToken(pub String);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .extract::<Option<TypedHeader<Authorization<Bearer>>>>()
            .await
            .map_err(|_| ApiError::Unauthorized("Invalid Authorization header".to_string()))?
            .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

        Ok(BearerToken(header.token().to_string()))
    }
}

/// The active user behind a valid bearer token, resolved by the auth middleware.
pub struct AuthUser(pub User);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Extension(user): Extension<User> = parts
            .extract()
            .await
            .map_err(|_| ApiError::Unauthorized("Unauthorized access".to_string()))?;

        Ok(AuthUser(user))
    }
}

/// `Option<AuthUser>` is `None` for guests and for rejected tokens.
impl<S> OptionalFromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<User>().cloned().map(AuthUser))
    }
}
