//! Request extractors that report rejections as `ErrorResponse` bodies.
//!
//! axum's own `Json`, `Path` and `Query` reject with plain-text 4xx responses.
//! These wrappers delegate to them and translate the rejection instead.

use axum::{
    async_trait,
    extract::{
        FromRequest, FromRequestParts, Json, Path, Query, Request,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, request::Parts},
};
use serde::de::DeserializeOwned;
use service::error::FieldErrors;
use tracing::warn;

use crate::schemas::ApiError;

/// Key used for errors that cannot be attributed to a single field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// JSON request body.
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

/// Path parameters. A malformed id identifies no resource and is a 404.
#[derive(Debug, Clone)]
pub struct ApiPath<T>(pub T);

/// Query string parameters.
#[derive(Debug, Clone)]
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

#[async_trait]
impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(ApiPath(value)),
            Err(rejection) => {
                warn!("Rejected path parameters: {}", rejection.body_text());
                Err(ApiError::new(
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    "No resource matches the requested path",
                ))
            }
        }
    }
}

#[async_trait]
impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(ApiQuery(value)),
            Err(rejection) => Err(query_rejection(rejection)),
        }
    }
}

fn json_rejection(rejection: JsonRejection) -> ApiError {
    let text = rejection.body_text();
    warn!("Rejected JSON body: {}", text);
    let fields = match rejection {
        JsonRejection::JsonDataError(_) => deserialize_field_errors(&text),
        _ => non_field(text),
    };
    ApiError::validation("Invalid request body", fields)
}

fn query_rejection(rejection: QueryRejection) -> ApiError {
    let text = rejection.body_text();
    warn!("Rejected query string: {}", text);
    let detail = text.split_once(": ").map_or(text.as_str(), |(_, d)| d);
    ApiError::validation("Invalid query parameters", non_field(detail.to_string()))
}

fn non_field(message: String) -> FieldErrors {
    FieldErrors::from([(NON_FIELD_ERRORS.to_string(), vec![message])])
}

/// Maps a JSON data error onto the top-level field it concerns.
///
/// The rejection text looks like
/// `<prefix>: ingredients[0].amount: invalid type: ... at line 1 column 40`
/// or `<prefix>: missing field `ingredients` at line 1 column 80`.
fn deserialize_field_errors(text: &str) -> FieldErrors {
    let detail = text.split_once(": ").map_or(text, |(_, d)| d);
    let detail = detail
        .rfind(" at line ")
        .map_or(detail, |pos| &detail[..pos]);

    if let Some(rest) = detail.strip_prefix("missing field `") {
        if let Some((name, _)) = rest.split_once('`') {
            return FieldErrors::from([(
                name.to_string(),
                vec!["This field is required.".to_string()],
            )]);
        }
    }

    match detail.split_once(": ") {
        Some((path, message)) if !path.is_empty() && !path.contains(char::is_whitespace) => {
            let field = path
                .split(['.', '['])
                .next()
                .filter(|f| !f.is_empty())
                .unwrap_or(NON_FIELD_ERRORS);
            FieldErrors::from([(field.to_string(), vec![message.to_string()])])
        }
        _ => non_field(detail.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: &str = "Failed to deserialize the JSON body into the target type";

    #[test]
    fn test_missing_field_is_attributed() {
        let fields =
            deserialize_field_errors(&format!("{PREFIX}: missing field `ingredients` at line 1 column 80"));
        assert_eq!(fields["ingredients"], vec!["This field is required.".to_string()]);
    }

    #[test]
    fn test_nested_type_error_maps_to_top_level_field() {
        let fields = deserialize_field_errors(&format!(
            "{PREFIX}: ingredients[0].amount: invalid type: string \"abc\", expected i32 at line 1 column 42"
        ));
        assert_eq!(
            fields["ingredients"],
            vec!["invalid type: string \"abc\", expected i32".to_string()]
        );
    }

    #[test]
    fn test_unattributable_error_goes_to_non_field_errors() {
        let fields = deserialize_field_errors(&format!(
            "{PREFIX}: invalid type: integer `5`, expected struct RecipeWrite at line 1 column 1"
        ));
        assert!(fields.contains_key(NON_FIELD_ERRORS));
    }
}
