use crate::application::loan::{ErrorKind, LoanApplicationError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーをラップし、HTTPレスポンスへのマッピングを提供する。
#[derive(Debug)]
pub struct ApiError(LoanApplicationError);

impl From<LoanApplicationError> for ApiError {
    fn from(err: LoanApplicationError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    /// エラーコード（クライアントが分岐に使う安定した識別子）
    fn code(&self) -> &'static str {
        match self.0 {
            LoanApplicationError::BookNotFound => "BOOK_NOT_FOUND",
            LoanApplicationError::BookUnavailable => "BOOK_UNAVAILABLE",
            LoanApplicationError::MemberNotFound => "MEMBER_NOT_FOUND",
            LoanApplicationError::MemberInactive => "MEMBER_INACTIVE",
            LoanApplicationError::LoanNotFound => "LOAN_NOT_FOUND",
            LoanApplicationError::NotificationNotFound => "NOTIFICATION_NOT_FOUND",
            LoanApplicationError::AlreadyReturned => "ALREADY_RETURNED",
            LoanApplicationError::Validation(_) => "VALIDATION_ERROR",
            LoanApplicationError::BookStoreError(_)
            | LoanApplicationError::LoanRepositoryError(_)
            | LoanApplicationError::MemberLookupError(_)
            | LoanApplicationError::NotificationError(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0.kind() {
            // 404 Not Found - リクエストされたリソースが存在しない
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            // 409 Conflict - 現在の状態と矛盾する操作
            ErrorKind::Conflict => StatusCode::CONFLICT,
            // 400 Bad Request - 入力が不正
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            // 500 Internal Server Error - システム障害
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            match std::error::Error::source(&self.0) {
                Some(source) => tracing::error!("{}: {}", self.0, source),
                None => tracing::error!("{}", self.0),
            }
            "An unexpected error occurred".to_string()
        } else {
            self.0.to_string()
        };

        let body = Json(ErrorResponse::new(self.code(), message));
        (status, body).into_response()
    }
}
