//! Validated JSON extractor for automatic request validation.
//!
//! `ValidatedJson<T>` deserializes a JSON body and validates it with the
//! `validator` crate. Malformed bodies are rejected with 400 Bad Request,
//! failed validation with 422 Unprocessable Entity and field-level details.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use roster_core::{field_errors, ErrorResponse};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

/// JSON extractor that validates the deserialized value.
///
/// ```ignore
/// async fn create_user(ValidatedJson(request): ValidatedJson<CreateUserRequest>) {
///     // request is guaranteed to be valid here
/// }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T> std::ops::Deref for ValidatedJson<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Rejection type for validated JSON extraction.
#[derive(Debug)]
pub enum ValidatedJsonRejection {
    /// JSON parsing/deserialization error.
    JsonError(JsonRejection),
    /// Validation error with field-level details.
    ValidationError(ValidationErrors),
}

impl IntoResponse for ValidatedJsonRejection {
    fn into_response(self) -> Response {
        match self {
            Self::JsonError(rejection) => {
                let error_response = ErrorResponse {
                    code: "INVALID_JSON".to_string(),
                    message: format!("Invalid JSON: {}", rejection.body_text()),
                    details: None,
                };
                (StatusCode::BAD_REQUEST, Json(error_response)).into_response()
            }
            Self::ValidationError(errors) => {
                let mut details = field_errors(&errors);
                details.sort_by(|a, b| a.field.cmp(&b.field));

                let error_response = ErrorResponse {
                    code: "VALIDATION_ERROR".to_string(),
                    message: "Request validation failed".to_string(),
                    details: Some(details),
                };
                (StatusCode::UNPROCESSABLE_ENTITY, Json(error_response)).into_response()
            }
        }
    }
}

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ValidatedJsonRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(ValidatedJsonRejection::JsonError)?;

        value
            .validate()
            .map_err(ValidatedJsonRejection::ValidationError)?;

        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::header::CONTENT_TYPE};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct AgeForm {
        #[validate(range(max = 150, message = "Age must be at most 150"))]
        age: u32,
    }

    fn json_request(body: &'static str) -> Request {
        axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_body_is_extracted() {
        let ValidatedJson(form) = ValidatedJson::<AgeForm>::from_request(json_request(r#"{"age":20}"#), &())
            .await
            .unwrap();
        assert_eq!(form.age, 20);
    }

    #[tokio::test]
    async fn test_invalid_value_is_unprocessable() {
        let rejection = ValidatedJson::<AgeForm>::from_request(json_request(r#"{"age":200}"#), &())
            .await
            .unwrap_err();
        assert_eq!(rejection.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let rejection = ValidatedJson::<AgeForm>::from_request(json_request("{age:"), &())
            .await
            .unwrap_err();
        assert_eq!(rejection.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_wrong_type_is_bad_request() {
        let rejection = ValidatedJson::<AgeForm>::from_request(json_request(r#"{"age":"old"}"#), &())
            .await
            .unwrap_err();
        assert_eq!(rejection.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
