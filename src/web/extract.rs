//! JSON body extractor that rejects with the API error envelope.

use axum::{
    extract::{FromRequest, OptionalFromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use super::response::ApiError;

/// Like [`Json`], but a malformed or incomplete body is answered as
/// `{success: false, error}` with status 400.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = <Json<T> as FromRequest<S>>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// A missing body (no JSON content type) is `None`; a bad body is still rejected.
impl<S, T> OptionalFromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Option<Self>, Self::Rejection> {
        let value = <Json<T> as OptionalFromRequest<S>>::from_request(req, state).await?;
        Ok(value.map(|Json(value)| Self(value)))
    }
}
