//! Request extractors.

use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use spendquest_core::errors::Error as CoreError;
use spendquest_core::validation::{validate, Validate};

use crate::error::ApiError;

/// JSON body checked against the type's schema before it is deserialized.
///
/// Schema failures surface as a 400 carrying every field message, so the
/// handler only ever sees a well-formed payload.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<Value>::from_request(req, state).await?;
        let payload = validate(T::schema(), payload).map_err(CoreError::from)?;
        let value = serde_json::from_value(payload)
            .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {e}")))?;
        Ok(Self(value))
    }
}
