//! The API error model.
//!
//! Every failure a handler can return maps onto one closed error kind;
//! clients get `{error, message}` with the kind's status code and can
//! switch on `error` programmatically instead of parsing free text.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use lifeos_core::domains::DomainError;
use lifeos_core::findings::FindingError;
use lifeos_core::pkg::PkgError;
use lifeos_core::questions::QuestionError;
use lifeos_core::scenario::{LogError, ScenarioError};
use lifeos_core::store::StoreError;
use lifeos_core::versions::VersionError;
use lifeos_core::vignettes::VignetteError;
use serde::Serialize;

/// The closed set of API error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidRequest,
    Conflict,
    StoreFailure,
    UpstreamFailure,
}

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::InvalidRequest => StatusCode::BAD_REQUEST,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::StoreFailure => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::UpstreamFailure => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::InvalidRequest => "invalid_request",
            ErrorKind::Conflict => "conflict",
            ErrorKind::StoreFailure => "store_failure",
            ErrorKind::UpstreamFailure => "upstream_failure",
        }
    }
}

/// A handler error: kind plus a human-readable message.
#[derive(Debug)]
pub struct ApiError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::NotFound,
            message: message.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::InvalidRequest,
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Conflict,
            message: message.into(),
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::UpstreamFailure,
            message: message.into(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.kind.as_str(),
            message: self.message,
        };
        (self.kind.status(), Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        let kind = if e.is_not_found() {
            ErrorKind::NotFound
        } else {
            ErrorKind::StoreFailure
        };
        Self {
            kind,
            message: e.to_string(),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound(_) => Self::not_found(e.to_string()),
            DomainError::AlreadyExists(_) => Self::conflict(e.to_string()),
            DomainError::UnknownCollection(_) => Self::invalid(e.to_string()),
            DomainError::Store(inner) => inner.into(),
        }
    }
}

impl From<QuestionError> for ApiError {
    fn from(e: QuestionError) -> Self {
        match e {
            QuestionError::NotFound(_) => Self::not_found(e.to_string()),
            QuestionError::Store(inner) => inner.into(),
        }
    }
}

impl From<VignetteError> for ApiError {
    fn from(e: VignetteError) -> Self {
        match e {
            VignetteError::NotFound(_) => Self::not_found(e.to_string()),
            VignetteError::AlreadyExists(_) => Self::conflict(e.to_string()),
            VignetteError::MissingTitle => Self::invalid(e.to_string()),
            VignetteError::Store(inner) => inner.into(),
        }
    }
}

impl From<FindingError> for ApiError {
    fn from(e: FindingError) -> Self {
        match e {
            FindingError::NotFound(_) => Self::not_found(e.to_string()),
            FindingError::AlreadyReflected(_) => Self::conflict(e.to_string()),
            FindingError::Store(inner) => inner.into(),
        }
    }
}

impl From<VersionError> for ApiError {
    fn from(e: VersionError) -> Self {
        match e {
            VersionError::NotFound(_) => Self::not_found(e.to_string()),
            VersionError::Duplicate(_) => Self::conflict(e.to_string()),
            VersionError::InvalidVersion(_) => Self::invalid(e.to_string()),
            VersionError::Store(inner) => inner.into(),
        }
    }
}

impl From<PkgError> for ApiError {
    fn from(e: PkgError) -> Self {
        match e {
            PkgError::InvalidName(_) => Self::invalid(e.to_string()),
            PkgError::NotFound(_) => Self::not_found(e.to_string()),
            PkgError::Store(inner) => inner.into(),
        }
    }
}

impl From<LogError> for ApiError {
    fn from(e: LogError) -> Self {
        match e {
            LogError::NotFound(_) => Self::not_found(e.to_string()),
            LogError::Store(inner) => inner.into(),
        }
    }
}

impl From<ScenarioError> for ApiError {
    fn from(e: ScenarioError) -> Self {
        Self::upstream(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_kind_status_mapping() {
        assert_eq!(ErrorKind::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorKind::InvalidRequest.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorKind::Conflict.status(), StatusCode::CONFLICT);
        assert_eq!(
            ErrorKind::StoreFailure.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ErrorKind::UpstreamFailure.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_store_not_found_becomes_404() {
        let err: ApiError = StoreError::NotFound(PathBuf::from("x.yaml")).into();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[test]
    fn test_duplicate_version_becomes_conflict() {
        let err: ApiError = VersionError::Duplicate("1.0.0".to_string()).into();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[test]
    fn test_already_reflected_becomes_conflict() {
        let err: ApiError = FindingError::AlreadyReflected("session_1".to_string()).into();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }
}
