//! # 라우트 핸들러 모듈
//!
//! HTTP 요청을 처리하는 핸들러 함수들과, 이들을 URL에 연결하는 라우터를 모아둔 모듈입니다.
//!
//! 각 하위 모듈:
//! - `auth`: 회원가입, 로그인, 내 정보
//! - `catalog`: 장르 목록(공개)과 장르/문제 관리(관리자)
//! - `typing`: 연습 준비(문제 추출, 문장 생성, 읽기 변환)와 결과 저장, 코칭 코멘트
//! - `mypage`: 통계, 세션 이력, 세션 상세
//! - `health`: 서버 상태 확인 (헬스체크)

pub mod auth;
pub mod catalog;
pub mod health;
pub mod mypage;
pub mod typing;

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use sqlx::SqlitePool;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::services::{reading::ReadingConverter, text_gen::TextGenerator};

/// 애플리케이션 공유 상태
///
/// 모든 요청 핸들러가 `State(state): State<AppState>`로 접근합니다.
/// 외부 서비스는 트레이트 객체로 주입되어, 테스트에서는 가짜 구현을 넣습니다.
#[derive(Clone)]
pub struct AppState {
    /// SQLite 연결 풀 (내부적으로 Arc로 공유)
    pub pool: SqlitePool,
    /// JWT 토큰 서명용 비밀키
    pub jwt_secret: String,
    pub text_generator: Arc<dyn TextGenerator>,
    pub reading_converter: Arc<dyn ReadingConverter>,
}

/// 전체 API 라우터를 만듭니다. 모든 경로는 `/api/v1` 아래에 놓입니다.
pub fn router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me));

    let typing_routes = Router::new()
        .route("/typing/problems", get(typing::sample_problems))
        .route("/typing/generated", get(typing::generate_problems))
        .route("/typing/readings", post(typing::convert_readings))
        .route("/typing/results", post(typing::submit_result))
        .route("/typing/coach-comment", post(typing::coach_comment));

    let mypage_routes = Router::new()
        .route("/me/stats", get(mypage::stats))
        .route("/me/sessions", get(mypage::list_sessions))
        .route("/me/sessions/{id}", get(mypage::get_session));

    let admin_routes = Router::new()
        .route("/admin/genres", get(catalog::admin_list_genres).post(catalog::create_genre))
        .route(
            "/admin/genres/{id}",
            put(catalog::update_genre).delete(catalog::delete_genre),
        )
        .route(
            "/admin/problems",
            get(catalog::list_problems).post(catalog::create_problem),
        )
        .route(
            "/admin/problems/{id}",
            put(catalog::update_problem).delete(catalog::delete_problem),
        );

    let api_routes = Router::new()
        .merge(auth_routes)
        .merge(typing_routes)
        .merge(mypage_routes)
        .merge(admin_routes)
        .route("/genres", get(catalog::list_genres))
        .route("/health", get(health::health_check))
        .with_state(state);

    // 개발 환경에서는 Any(모두 허용)로 설정합니다.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn health_is_public() {
        let state = test_state().await;
        let (status, body) = send(&state, Method::GET, "/api/v1/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn protected_routes_require_a_token() {
        let state = test_state().await;
        for uri in ["/api/v1/me/stats", "/api/v1/me/sessions", "/api/v1/auth/me"] {
            let (status, body) = send(&state, Method::GET, uri, None, None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
            assert_eq!(body["error"]["code"], "missing_token");
        }
    }

    #[tokio::test]
    async fn practice_routes_are_public() {
        let state = test_state().await;
        for uri in ["/api/v1/typing/problems", "/api/v1/genres"] {
            let (status, _) = send(&state, Method::GET, uri, None, None).await;
            assert_eq!(status, StatusCode::OK, "{uri}");
        }
    }

    #[tokio::test]
    async fn admin_routes_reject_regular_users() {
        let state = test_state().await;
        let token = token_for("someone", false);
        let (status, _) = send(&state, Method::GET, "/api/v1/admin/genres", Some(&token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
