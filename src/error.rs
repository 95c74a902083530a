use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::ids::IdError;
use crate::paging::TokenError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("No object of this type exists with id '{0}'")]
    ObjectNotFound(String),

    #[error("{0}")]
    NotSupported(String),

    #[error("{0}")]
    Inconsistent(String),

    #[error("invalid page token: {0}")]
    InvalidPageToken(#[from] TokenError),

    #[error("requested range [{start}, {end}) is outside the sequence bounds [0, {length})")]
    RangeOutOfBounds { start: i64, end: i64, length: u64 },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Closed taxonomy of failure categories reported to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    ObjectNotFound,
    RequestNotSupported,
    RequestInconsistent,
    RangeOutOfBounds,
    InvalidRequest,
    InternalFailure,
}

impl ErrorCategory {
    pub const ALL: [ErrorCategory; 6] = [
        ErrorCategory::ObjectNotFound,
        ErrorCategory::RequestNotSupported,
        ErrorCategory::RequestInconsistent,
        ErrorCategory::RangeOutOfBounds,
        ErrorCategory::InvalidRequest,
        ErrorCategory::InternalFailure,
    ];

    /// Public name the numeric code is derived from. Other GA4GH server
    /// implementations hash the same names, so these must never change.
    pub fn code_name(&self) -> &'static str {
        match self {
            ErrorCategory::ObjectNotFound => "ObjectWithIdNotFoundException",
            ErrorCategory::RequestNotSupported => "NotImplementedException",
            ErrorCategory::RequestInconsistent => "BadRequestException",
            ErrorCategory::RangeOutOfBounds => "ReferenceRangeErrorException",
            ErrorCategory::InvalidRequest => "InvalidJsonException",
            ErrorCategory::InternalFailure => "ServerError",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCategory::ObjectNotFound => StatusCode::NOT_FOUND,
            ErrorCategory::RequestNotSupported => StatusCode::NOT_IMPLEMENTED,
            ErrorCategory::RequestInconsistent => StatusCode::BAD_REQUEST,
            ErrorCategory::RangeOutOfBounds => StatusCode::RANGE_NOT_SATISFIABLE,
            ErrorCategory::InvalidRequest => StatusCode::BAD_REQUEST,
            ErrorCategory::InternalFailure => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// CRC-32 of the code name folded into a positive 31-bit integer.
    pub fn error_code(&self) -> i32 {
        (crc32fast::hash(self.code_name().as_bytes()) & 0x7fff_ffff) as i32
    }
}

/// Wire body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GaException {
    pub error_code: i32,
    pub message: String,
}

impl Error {
    pub fn not_found(id: impl Into<String>) -> Self {
        Error::ObjectNotFound(id.into())
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::ObjectNotFound(_) => ErrorCategory::ObjectNotFound,
            Error::NotSupported(_) => ErrorCategory::RequestNotSupported,
            Error::Inconsistent(_) | Error::InvalidPageToken(_) => {
                ErrorCategory::RequestInconsistent
            }
            Error::RangeOutOfBounds { .. } => ErrorCategory::RangeOutOfBounds,
            Error::InvalidRequest(_) => ErrorCategory::InvalidRequest,
            Error::Json(_) | Error::Io(_) | Error::Internal(_) => ErrorCategory::InternalFailure,
        }
    }

    pub fn to_exception(&self) -> GaException {
        let category = self.category();
        let mut message = self.to_string();
        if message.is_empty() {
            message = category.code_name().to_string();
        }
        GaException {
            error_code: category.error_code(),
            message,
        }
    }
}

impl From<IdError> for Error {
    fn from(err: IdError) -> Self {
        match err {
            IdError::MalformedId(id) => Error::ObjectNotFound(id),
            IdError::InvalidSegment(_) | IdError::KindMismatch { .. } => {
                Error::Internal(err.to_string())
            }
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Error::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let category = self.category();
        if category == ErrorCategory::InternalFailure {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, ?category, "request rejected");
        }
        (category.status_code(), axum::Json(self.to_exception())).into_response()
    }
}
