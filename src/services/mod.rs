//! # 서비스 계층
//!
//! HTTP나 SQL에 묶이지 않은 비즈니스 로직을 모아둔 모듈입니다.
//!
//! - `validator`: 세션 결과 검증
//! - `tally`: 미스 키 집계와 랭킹
//! - `sampler`: 문제 무작위 추출
//! - `paginator`: 페이지 계산
//! - `stats`: 사용자별 통계 (DB 조회 + 집계)
//! - `text_gen`: 외부 문장 생성 서비스 (문제 생성, 코칭 코멘트)
//! - `reading`: 외부 읽기(후리가나) 변환 서비스

pub mod paginator;
pub mod reading;
pub mod sampler;
pub mod stats;
pub mod tally;
pub mod text_gen;
pub mod validator;

use thiserror::Error;

/// 외부 서비스 호출 실패.
///
/// 호출하는 쪽에서 기본값으로 대체할 수 있으면 대체하고,
/// 그럴 수 없을 때만 `AppError::External`(502)로 전달합니다.
#[derive(Debug, Error)]
pub enum ExternalError {
    /// API 키 등 설정이 없어 서비스를 사용할 수 없음
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// 서비스가 에러 응답을 돌려줌
    #[error("provider error: {0}")]
    Provider(String),

    #[error("provider returned an empty response")]
    EmptyResponse,
}
