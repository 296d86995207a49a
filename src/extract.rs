use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::AppError;

/// Integer item id taken from the path.
///
/// Anything that does not parse as an integer is treated as an unmatched
/// route (404), not a bad request.
pub struct ItemId(pub i64);

impl<S> FromRequestParts<S> for ItemId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<i64>::from_request_parts(parts, state).await {
            Ok(Path(id)) => Ok(ItemId(id)),
            Err(rejection) => {
                debug!(%rejection, path = %parts.uri.path(), "Non-integer item id");
                Err(AppError::NotFound)
            }
        }
    }
}

/// JSON request body. Every way the body can fail to parse (syntax, types,
/// content type) becomes a 400 with the parser's message.
pub struct Payload<T>(pub T);

impl<T, S> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Payload(value)),
            Err(rejection) => {
                let message = rejection.body_text();
                warn!(error = %message, "Rejected malformed request body");
                Err(AppError::BadRequest(message))
            }
        }
    }
}
