//! # 데이터 모델 모듈
//!
//! 애플리케이션에서 사용하는 데이터 구조체(struct)들을 정의합니다.
//! 각 하위 모듈은 특정 도메인의 데이터 타입을 담당합니다:
//! - `catalog`: 장르(Genre)와 문제(Problem) 관련 구조체
//! - `session`: 타이핑 세션과 문제별 결과 구조체
//! - `stats`: 마이페이지 통계 구조체
//! - `typing`: 문장 생성/코칭/읽기 변환 요청·응답 구조체
//! - `user`: 사용자(User) 관련 구조체
//!
//! `pub use X::*;`는 하위 모듈의 모든 공개 항목을
//! 이 모듈에서 바로 접근할 수 있게 재공개(re-export)합니다.
//! 예: `crate::models::session::NewSession` 대신 `crate::models::NewSession`으로 접근 가능

pub mod catalog;
pub mod session;
pub mod stats;
pub mod typing;
pub mod user;

pub use catalog::*;
pub use session::*;
pub use stats::*;
pub use typing::*;
pub use user::*;
