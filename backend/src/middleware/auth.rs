//! Bearer token authentication

use std::sync::Arc;

use aide::OperationIo;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use uuid::Uuid;

use crate::{jwt::JwtManager, types::AppError, upload::UploadError};

/// Authenticated user information extracted from JWT
#[derive(Debug, Clone, Copy, PartialEq, Eq, OperationIo)]
pub struct AuthenticatedUser {
    /// The user id from the JWT subject
    pub user_id: Uuid,
}

/// Returns the credential of an `Authorization: Bearer <token>` header
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Axum extractor for authenticated user
///
/// Validates the bearer token against the `JwtManager` installed as an extension.
/// Place it after the path extractors so malformed ids are rejected first:
/// ```ignore
/// async fn protected_handler(
///     VideoId(id): VideoId,
///     user: AuthenticatedUser,
/// ) -> Result<impl IntoResponse, AppError> {
///     Ok(user.user_id.to_string())
/// }
/// ```
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let jwt_manager = parts.extensions.get::<Arc<JwtManager>>().ok_or_else(|| {
            tracing::error!("JwtManager extension missing from router");
            AppError::internal()
        })?;

        let token = bearer_token(parts).ok_or(UploadError::Unauthenticated(
            "Authorization header must contain a Bearer token",
        ))?;

        let user_id = jwt_manager.validate_user(token).map_err(|e| {
            tracing::debug!("Token validation failed: {e}");
            UploadError::Unauthenticated("invalid or expired token")
        })?;

        Ok(Self { user_id })
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{Request, StatusCode};

    use super::*;
    use crate::jwt::TOKEN_EXPIRATION;

    fn parts_with(header: Option<&str>, manager: Option<Arc<JwtManager>>) -> Parts {
        let mut builder = Request::get("/videos");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        let (mut parts, ()) = builder.body(()).unwrap().into_parts();
        if let Some(manager) = manager {
            parts.extensions.insert(manager);
        }
        parts
    }

    #[tokio::test]
    async fn test_valid_token() {
        let manager = Arc::new(JwtManager::new("secret"));
        let user_id = Uuid::new_v4();
        let token = manager.issue_token(user_id, TOKEN_EXPIRATION).unwrap();

        let mut parts = parts_with(Some(&format!("Bearer {token}")), Some(manager));
        let user = AuthenticatedUser::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(user.user_id, user_id);
    }

    #[tokio::test]
    async fn test_missing_or_malformed_header() {
        let manager = Arc::new(JwtManager::new("secret"));

        for header in [None, Some("Basic abc"), Some("Bearer "), Some("bearer abc")] {
            let mut parts = parts_with(header, Some(manager.clone()));
            let err = AuthenticatedUser::from_request_parts(&mut parts, &())
                .await
                .unwrap_err();
            assert_eq!(err.status(), StatusCode::UNAUTHORIZED, "header {header:?}");
        }
    }

    #[tokio::test]
    async fn test_token_from_other_secret() {
        let token = JwtManager::new("other")
            .issue_token(Uuid::new_v4(), TOKEN_EXPIRATION)
            .unwrap();

        let mut parts = parts_with(
            Some(&format!("Bearer {token}")),
            Some(Arc::new(JwtManager::new("secret"))),
        );
        let err = AuthenticatedUser::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_missing_manager_is_server_error() {
        let mut parts = parts_with(Some("Bearer abc"), None);
        let err = AuthenticatedUser::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
