//! # 에러 처리 모듈
//!
//! 애플리케이션에서 발생할 수 있는 모든 에러 타입을 정의합니다.
//!
//! 이 모듈의 핵심:
//! - `AppError` 열거형(enum): 모든 에러 종류를 하나의 타입으로 통합
//! - `IntoResponse` 구현: 에러를 HTTP 응답으로 자동 변환
//!
//! ## 에러 분류
//! | 종류 | 상태 코드 | 복구 가능? |
//! |------|-----------|-----------|
//! | 검증 실패 (`Validation`) | 400 | 클라이언트가 요청을 고치면 됨 |
//! | 없음 (`NotFound`) | 404 | - |
//! | 권한 없음 (`Forbidden`) | 403 | 존재하지만 다른 사용자의 데이터 |
//! | 저장소 오류 (`Database`) | 500 | 해당 요청만 실패, 커밋된 데이터는 안전 |
//! | 외부 서비스 오류 (`External`) | 502 | 가능하면 호출하는 쪽에서 기본값으로 대체 |

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::{validator::ValidationError, ExternalError};

/// 애플리케이션에서 발생할 수 있는 모든 에러 종류
///
/// 각 에러 variant는 적절한 HTTP 상태 코드와 메시지로 변환됩니다.
/// 핸들러에서 `Result<T, AppError>`를 반환하면,
/// Axum이 자동으로 `IntoResponse`를 호출하여 HTTP 응답으로 변환합니다.
#[derive(Debug, Error)]
pub enum AppError {
    /// 요청한 리소스를 찾을 수 없음 (HTTP 404)
    #[error("Resource not found")]
    NotFound,

    /// 리소스는 있지만 요청한 사용자의 것이 아님 (HTTP 403)
    /// NotFound와 구분하여 응답합니다.
    #[error("You do not have access to this resource")]
    Forbidden,

    /// 세션 결과 검증 실패 (HTTP 400)
    /// #[from]: ValidationError → AppError 자동 변환. 가장 먼저 어긴 규칙의 메시지를 전달합니다.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// 잘못된 요청 (HTTP 400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// 인증 실패 (HTTP 401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 리소스 충돌 (HTTP 409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// 외부 서비스(문장 생성, 읽기 변환) 호출 실패 (HTTP 502)
    #[error("External service error: {0}")]
    External(#[from] ExternalError),

    /// 서버 내부 오류 (HTTP 500)
    #[error("Internal error: {0}")]
    Internal(String),

    /// 데이터베이스 오류 (HTTP 500)
    /// #[from]: sqlx 함수에서 반환된 에러에 `?`를 쓰면 자동으로 AppError::Database로 변환됩니다.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// missed_keys JSON 직렬화/역직렬화 오류 (HTTP 500)
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    /// SQLite 제약 조건 위반(UNIQUE, FOREIGN KEY 등)인지 확인합니다.
    ///
    /// 카탈로그 관리 API에서 중복 등록이나 존재하지 않는 장르 참조를
    /// 500 대신 적절한 4xx 응답으로 바꾸기 위해 사용합니다.
    pub fn constraint_kind(&self) -> Option<ConstraintKind> {
        let AppError::Database(sqlx::Error::Database(db_err)) = self else {
            return None;
        };
        match db_err.kind() {
            sqlx::error::ErrorKind::UniqueViolation => Some(ConstraintKind::Unique),
            sqlx::error::ErrorKind::ForeignKeyViolation => Some(ConstraintKind::ForeignKey),
            _ => None,
        }
    }
}

/// `AppError::constraint_kind()`의 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Unique,
    ForeignKey,
}

impl IntoResponse for AppError {
    /// AppError를 HTTP 응답으로 변환합니다.
    ///
    /// 내부 에러(Database, Serialization, Internal, External)는 실제 에러 내용을 로그에만 기록하고,
    /// 클라이언트에는 일반적인 메시지만 반환합니다.
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "not_found", self.to_string()),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "forbidden", self.to_string()),
            AppError::Validation(ref e) => {
                (StatusCode::BAD_REQUEST, "validation_error", e.to_string())
            }
            AppError::BadRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", msg.clone())
            }
            AppError::Unauthorized(ref msg) => {
                (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone())
            }
            AppError::Conflict(ref msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            AppError::External(ref e) => {
                tracing::error!("External service error: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "external_error",
                    "An external service is unavailable".to_string(),
                )
            }
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Serialization(ref e) => {
                tracing::error!("Serialization error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        // 결과: { "error": { "code": "not_found", "message": "Resource not found" } }
        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn validation_error_maps_to_400_with_rule_message() {
        let response = AppError::from(ValidationError::EmptyProblemResults).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "validation_error");
        assert_eq!(
            json["error"]["message"],
            ValidationError::EmptyProblemResults.to_string()
        );
    }

    #[tokio::test]
    async fn storage_errors_do_not_leak_details() {
        let response = AppError::Database(sqlx::Error::RowNotFound).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["message"], "A database error occurred");
    }

    #[test]
    fn forbidden_and_not_found_are_distinct() {
        assert_eq!(
            AppError::Forbidden.into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::NotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
    }
}
