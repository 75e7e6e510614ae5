use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use std::collections::HashMap;

use crate::error::ApiError;

/// JSON request body whose failures come back as `ApiError`s: unparseable
/// input is `InvalidJson`, a body of the wrong shape is a validation error.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(JsonRejection::JsonDataError(err)) => Err(data_error(&err.body_text())),
            Err(JsonRejection::JsonSyntaxError(_)) => Err(ApiError::invalid_json("Malformed JSON body")),
            Err(JsonRejection::MissingJsonContentType(_)) => {
                Err(ApiError::invalid_json("Expected Content-Type: application/json"))
            }
            Err(other) => Err(ApiError::bad_request(other.body_text())),
        }
    }
}

/// serde reports `field: message at line x column y`; keep the field when
/// it is recognisable so clients can point at it.
fn data_error(detail: &str) -> ApiError {
    let detail = detail
        .strip_prefix("Failed to deserialize the JSON body into the target type: ")
        .unwrap_or(detail);
    let field_errors = detail.split_once(": ").and_then(|(field, reason)| {
        let field = field.trim();
        let is_path = !field.is_empty()
            && field
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '[' | ']'));
        is_path.then(|| HashMap::from([(field.to_string(), reason.to_string())]))
    });
    ApiError::validation_error(format!("Invalid request body: {}", detail), field_errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_errors_keep_the_field_path() {
        let err = data_error(
            "Failed to deserialize the JSON body into the target type: paymentMethod: unknown variant `cheque` at line 1 column 30",
        );
        match err {
            ApiError::ValidationError { message, field_errors } => {
                assert!(message.starts_with("Invalid request body: paymentMethod"));
                assert!(field_errors.unwrap().contains_key("paymentMethod"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn data_errors_without_path_have_no_field_errors() {
        let err = data_error("invalid type: string \"x\", expected a map at line 1 column 3");
        assert!(matches!(err, ApiError::ValidationError { field_errors: None, .. }));
    }
}
