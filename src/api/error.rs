//! HTTP rendering of workflow errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::app_system::{
    CheckoutError, Classify, DeliveryWorkflowError, ErrorKind, PurchaseAdminError, RefundWorkflowError,
};

/// Error returned by every handler.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub kind: ErrorKind,
    pub message: String,
    pub rolled_back: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody<'a> {
    error: &'a str,
    message: &'a str,
    rolled_back: bool,
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// A store read failed. The detail is logged, not returned.
    pub fn unavailable(err: impl std::fmt::Display) -> Self {
        tracing::error!(error = %err, "Store read failed");
        Self::new(ErrorKind::DependencyFailure, "Storage unavailable")
    }

    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            rolled_back: false,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.kind {
            ErrorKind::Validation | ErrorKind::Conflict => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::DependencyFailure => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

macro_rules! impl_from_workflow_error {
    ($($error:ty),+ $(,)?) => {
        $(
            impl From<$error> for ApiError {
                fn from(err: $error) -> Self {
                    Self {
                        kind: err.kind(),
                        message: err.to_string(),
                        rolled_back: err.rolled_back(),
                    }
                }
            }
        )+
    };
}

impl_from_workflow_error!(CheckoutError, DeliveryWorkflowError, RefundWorkflowError, PurchaseAdminError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.kind == ErrorKind::DependencyFailure {
            tracing::error!(error = %self.message, rolled_back = self.rolled_back, "Request failed on a dependency");
        }

        let body = ErrorBody {
            error: self.kind.as_str(),
            message: &self.message,
            rolled_back: self.rolled_back,
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflicts_are_bad_requests_and_keep_the_rollback_flag() {
        let err: ApiError = CheckoutError::InsufficientStock {
            product_id: "product_2".to_string(),
            requested: 99,
            available: 5,
            rolled_back: true,
        }
        .into();

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.rolled_back);
        assert_eq!(err.kind.as_str(), "conflict");
    }

    #[test]
    fn status_codes() {
        let forbidden: ApiError = RefundWorkflowError::NotOwner {
            delivery_id: "delivery_1".to_string(),
            user_id: "user_9".to_string(),
        }
        .into();
        assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

        let missing: ApiError = PurchaseAdminError::PurchaseNotFound("purchase_9".to_string()).into();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        assert_eq!(ApiError::unavailable("timeout").status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
