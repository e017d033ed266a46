use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::WebError;

/// Header carrying the authenticated climber id, set by the identity proxy.
pub const CLIMBER_ID_HEADER: &str = "x-climber-id";

/// The climber on whose behalf the request is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActingUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for ActingUser
where
    S: Send + Sync,
{
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(CLIMBER_ID_HEADER)
            .ok_or(WebError::Unauthorized)?;

        value
            .to_str()
            .ok()
            .and_then(|v| Uuid::parse_str(v.trim()).ok())
            .map(ActingUser)
            .ok_or_else(|| {
                tracing::warn!("Rejected malformed {} header", CLIMBER_ID_HEADER);
                WebError::Unauthorized
            })
    }
}
