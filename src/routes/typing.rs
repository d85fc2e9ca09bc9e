//! # 타이핑 연습 라우트 핸들러
//!
//! ## 엔드포인트
//! | 메서드 | 경로 | 권한 | 설명 |
//! |--------|------|------|------|
//! | GET | /api/v1/typing/problems?count&genre_id | 공개 | 카탈로그에서 문제 무작위 추출 |
//! | GET | /api/v1/typing/generated?prompt&count | 공개 | 테마로 문제 생성 (외부 서비스) |
//! | POST | /api/v1/typing/readings | 공개 | 문제문 → 읽기(후리가나) 변환 (외부 서비스) |
//! | POST | /api/v1/typing/results | 로그인 | 연습 결과 저장 → 201 `{ session_id }` |
//! | POST | /api/v1/typing/coach-comment | 공개 | 코칭 코멘트 (실패 시 기본 문구) |
//!
//! 게스트도 연습할 수 있고, 결과 저장만 로그인이 필요합니다.
//!
//! ## 흐름
//! ```text
//! problems / generated → readings → (브라우저에서 연습) → results → coach-comment
//! ```

use crate::{
    db,
    error::AppError,
    middleware::auth::AuthUser,
    models::*,
    routes::AppState,
    services::{reading, sampler, text_gen, validator, ExternalError},
};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct SampleQuery {
    pub count: Option<String>,
    pub genre_id: Option<String>,
}

/// `GET /typing/problems` — 후보 ID를 모아 무작위로 뽑은 뒤, 뽑힌 순서대로 문제를 불러옵니다.
///
/// 후보가 없으면 빈 배열을 반환합니다. 숫자가 아닌 `genre_id`는 무시하고 전체에서 뽑습니다.
pub async fn sample_problems(
    State(state): State<AppState>,
    Query(query): Query<SampleQuery>,
) -> Result<Json<Vec<ProblemWithGenre>>, AppError> {
    let genre_id = query
        .genre_id
        .as_deref()
        .and_then(|raw| raw.trim().parse::<i64>().ok());
    let count = sampler::requested_count(query.count.as_deref());

    let candidates = db::problem_ids(&state.pool, genre_id).await?;
    // ThreadRng는 Send가 아니므로 await 전에 버립니다.
    let picked = sampler::sample(&candidates, count, &mut rand::thread_rng());
    let problems = db::problems_by_ids(&state.pool, &picked).await?;

    Ok(Json(problems))
}

#[derive(Debug, Deserialize)]
pub struct GenerateQuery {
    pub prompt: Option<String>,
    pub count: Option<String>,
}

/// `GET /typing/generated` — 테마(prompt)로 연습 문장을 만듭니다.
pub async fn generate_problems(
    State(state): State<AppState>,
    Query(query): Query<GenerateQuery>,
) -> Result<Json<Vec<GeneratedProblem>>, AppError> {
    let prompt = query
        .prompt
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::BadRequest("prompt is required".to_string()))?;
    let count = sampler::generated_count(query.count.as_deref());

    let lines = state.text_generator.generate_sentences(prompt, count).await?;
    let sentences = sampler::pass_through(lines, count);
    if sentences.is_empty() {
        return Err(ExternalError::EmptyResponse.into());
    }

    Ok(Json(
        sentences
            .into_iter()
            .map(|problem_text| GeneratedProblem { problem_text })
            .collect(),
    ))
}

/// `POST /typing/readings` — 문제문들을 동시에 읽기로 변환합니다. 순서는 입력과 같습니다.
pub async fn convert_readings(
    State(state): State<AppState>,
    Json(req): Json<ReadingRequest>,
) -> Result<Json<ReadingResponse>, AppError> {
    let texts = req
        .texts
        .filter(|texts| !texts.is_empty())
        .ok_or_else(|| AppError::BadRequest("texts must be a non-empty array".to_string()))?;

    let readings = reading::convert_all(state.reading_converter.as_ref(), &texts).await?;
    Ok(Json(ReadingResponse { readings }))
}

/// `POST /typing/results` — 연습 결과를 검증하여 저장합니다.
///
/// 본문은 먼저 `Value`로 받고 검증기가 규칙 순서대로 확인합니다.
/// 타입이 안 맞는 필드도 serde 에러 대신 "처음 어긴 규칙" 메시지로 응답하기 위해서입니다.
pub async fn submit_result(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<Value>,
) -> Result<(StatusCode, Json<CreatedSession>), AppError> {
    let session = validator::validate_submission(&payload).map_err(|e| {
        tracing::debug!(user_id = %user.user_id, rule = %e, "session result rejected");
        e
    })?;

    let session_id = db::create_session(&state.pool, &user.user_id, &session).await?;

    Ok((StatusCode::CREATED, Json(CreatedSession { session_id })))
}

/// `POST /typing/coach-comment` — 외부 서비스가 실패해도 기본 문구로 200을 반환합니다.
pub async fn coach_comment(
    State(state): State<AppState>,
    Json(req): Json<CoachRequest>,
) -> Json<CoachComment> {
    let comment = text_gen::coach_comment_or_fallback(state.text_generator.as_ref(), &req).await;
    Json(CoachComment { comment })
}
