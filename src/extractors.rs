use std::collections::HashMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use crate::response::AppError;
use crate::validation::validate_learner_id;

/// `axum::Json<T>` that rejects with `AppError` instead of a plain-text body.
pub struct JsonBody<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(json_rejection_to_app_error(rejection)),
        }
    }
}

fn json_rejection_to_app_error(rejection: JsonRejection) -> AppError {
    let kind = match &rejection {
        JsonRejection::JsonDataError(_) => "data",
        JsonRejection::JsonSyntaxError(_) => "syntax",
        JsonRejection::MissingJsonContentType(_) => "content-type",
        JsonRejection::BytesRejection(_) => "body",
        _ => "other",
    };
    tracing::warn!(kind, error = %rejection, "Rejected JSON request body");
    AppError::bad_request("INVALID_REQUEST_BODY", &rejection.body_text())
}

impl<T> std::ops::Deref for JsonBody<T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// The validated `:learner_id` path segment.
#[derive(Debug, Clone)]
pub struct LearnerId(pub String);

#[axum::async_trait]
impl<S> FromRequestParts<S> for LearnerId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::bad_request("INVALID_PATH", &rejection.body_text()))?;
        let learner_id = params
            .get("learner_id")
            .ok_or_else(|| AppError::bad_request("INVALID_PATH", "missing learner id"))?;
        validate_learner_id(learner_id)
            .map_err(|msg| AppError::bad_request("INVALID_LEARNER_ID", msg))?;
        Ok(LearnerId(learner_id.clone()))
    }
}

impl LearnerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
