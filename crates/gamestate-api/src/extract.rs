//! Request extractors that reject with [`ApiError`].
//!
//! Axum's stock `Path` and `Query` rejections answer with a `text/plain`
//! body. These wrappers keep every rejection on the JSON error envelope.

use axum::extract::{FromRequestParts, Path, Query};
use axum::http::request::Parts;
use tracing::debug;

use crate::error::ApiError;

/// Error message for a `{name}` segment that is not valid UTF-8.
pub const INVALID_PLAYER_NAME: &str = "Invalid player name";

/// Error message for an undecodable query string.
pub const INVALID_QUERY: &str = "Invalid query string";

/// The `{name}` capture of a player-scoped route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerName(pub String);

impl<S> FromRequestParts<S> for PlayerName
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(name) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                debug!(error = %rejection.body_text(), "player name rejected");
                ApiError::BadRequest(INVALID_PLAYER_NAME.to_owned())
            })?;
        Ok(Self(name))
    }
}

/// Query string as ordered key/value pairs. Repeated keys are kept; lookups
/// take the first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(pub Vec<(String, String)>);

impl QueryParams {
    /// First value given for `key`.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl<S> FromRequestParts<S> for QueryParams
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                debug!(error = %rejection.body_text(), "query string rejected");
                ApiError::BadRequest(INVALID_QUERY.to_owned())
            })?;
        Ok(Self(pairs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_occurrence_wins() {
        let params = QueryParams(vec![
            (String::from("include"), String::from("stats")),
            (String::from("include"), String::from("equipment")),
        ]);
        assert_eq!(params.first("include"), Some("stats"));
        assert_eq!(params.first("equipment"), None);
    }
}
