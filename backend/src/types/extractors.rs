//! Custom extractors for request validation

use std::convert::Infallible;

use aide::operation::OperationInput;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{FromRequest, FromRequestParts, Multipart, Path, Request};
use axum::http::{header::CONTENT_TYPE, request::Parts, StatusCode};
use schemars::JsonSchema;
use serde::Deserialize;
use uuid::Uuid;

use crate::types::error::AppError;
use crate::upload::UploadError;

/// Path parameters of the `/videos/{video_id}` routes
#[derive(Debug, Deserialize, JsonSchema)]
pub struct VideoIdParams {
    /// Id of the video record
    pub video_id: Uuid,
}

/// Video id taken from the request path
///
/// Anything that is not a UUID is rejected with a 400 before credentials are looked at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoId(pub Uuid);

impl<S> FromRequestParts<S> for VideoId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| UploadError::InvalidIdentifier(e.body_text()))?;

        Uuid::parse_str(&raw)
            .map(Self)
            .map_err(|_| UploadError::InvalidIdentifier(raw).into())
    }
}

impl OperationInput for VideoId {
    fn operation_input(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) {
        // Same parameter shape as a typed path extractor
        Path::<VideoIdParams>::operation_input(ctx, operation);
    }
}

/// Multipart body whose rejection is deferred to the handler
///
/// Lets record and ownership checks run before a malformed or non-multipart
/// body is reported.
pub struct UploadForm {
    content_type: Option<String>,
    multipart: Result<Multipart, MultipartRejection>,
}

impl UploadForm {
    /// The parsed multipart body
    ///
    /// # Errors
    ///
    /// - `UploadError::UnsupportedMediaType` if the request is not `multipart/form-data`
    /// - `UploadError::MalformedUpload` for any other rejection
    pub fn into_multipart(self) -> Result<Multipart, UploadError> {
        self.multipart.map_err(|rejection| match rejection {
            MultipartRejection::InvalidBoundary(_) => UploadError::UnsupportedMediaType {
                declared: self.content_type,
                expected: &["multipart/form-data"],
            },
            other => UploadError::MalformedUpload(other.body_text()),
        })
    }
}

impl<S> FromRequest<S> for UploadForm
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string);

        Ok(Self {
            content_type,
            multipart: Multipart::from_request(req, state).await,
        })
    }
}

impl OperationInput for UploadForm {
    fn operation_input(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) {
        Multipart::operation_input(ctx, operation);
    }
}

/// Maps errors raised while reading multipart fields
#[must_use]
pub fn multipart_error(error: MultipartError) -> UploadError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadError::PayloadTooLarge
    } else {
        UploadError::MalformedUpload(error.body_text())
    }
}
