//! Custom extractors for the HTTP server.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Request},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        request::Parts,
    },
};
use serde::de::DeserializeOwned;

use crate::catalog::AccessToken;
use crate::error::AppError;

/// Extractor for request bodies encoded as `MessagePack` or JSON.
///
/// `application/json` bodies are parsed as JSON. Bodies without a content
/// type, or with `application/msgpack` / `application/x-msgpack`, are
/// parsed as `MessagePack`.
pub struct MsgPackOrJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for MsgPackOrJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();

        let is_json = content_type.contains("json");
        if !is_json && !content_type.contains("msgpack") && !content_type.is_empty() {
            return Err(AppError::BadRequest(format!(
                "Invalid content type: expected application/msgpack or application/json, got {content_type}"
            )));
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read request body: {e}")))?;

        if is_json {
            serde_json::from_slice(&bytes)
                .map(MsgPackOrJson)
                .map_err(|e| AppError::Serialization(format!("Failed to deserialize JSON: {e}")))
        } else {
            rmp_serde::from_slice(&bytes).map(MsgPackOrJson).map_err(|e| {
                AppError::Serialization(format!("Failed to deserialize MessagePack: {e}"))
            })
        }
    }
}

/// Access credential from an `Authorization: Bearer <token>` header
pub struct BearerToken(pub AccessToken);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing access token".to_string()))?;

        parse_bearer(header)
            .map(|token| BearerToken(AccessToken::new(token)))
            .ok_or_else(|| AppError::Unauthorized("Invalid authorization header".to_string()))
    }
}

fn parse_bearer(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bearer() {
        assert_eq!(parse_bearer("Bearer abc"), Some("abc"));
        assert_eq!(parse_bearer("bearer  abc "), Some("abc"));
        assert_eq!(parse_bearer("Basic abc"), None);
        assert_eq!(parse_bearer("Bearer "), None);
        assert_eq!(parse_bearer("abc"), None);
    }
}
