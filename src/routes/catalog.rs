//! # 카탈로그(장르/문제) 라우트 핸들러
//!
//! ## 엔드포인트
//! | 메서드 | 경로 | 권한 | 설명 |
//! |--------|------|------|------|
//! | GET | /api/v1/genres | 공개 | 장르 목록 |
//! | GET, POST | /api/v1/admin/genres | 관리자 | 장르 목록 / 추가 |
//! | PUT, DELETE | /api/v1/admin/genres/{id} | 관리자 | 장르 이름 변경 / 삭제 |
//! | GET, POST | /api/v1/admin/problems | 관리자 | 문제 목록(`?page&genre_id&search`) / 추가 |
//! | PUT, DELETE | /api/v1/admin/problems/{id} | 관리자 | 문제 수정 / 삭제 |
//!
//! ## 제약 조건 위반 → 응답
//! - 이름 중복, 같은 장르 안의 같은 문제문 → 409
//! - 존재하지 않는 장르에 문제 등록 → 400
//! - 문제가 남아 있는 장르 삭제 → 409

use crate::{
    db::{self, ProblemFilter},
    error::{AppError, ConstraintKind},
    middleware::auth::AdminUser,
    models::*,
    routes::AppState,
    services::paginator::{paginate, PAGE_SIZE},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

/// 제약 조건 위반을 4xx 에러로 바꿉니다. 그 밖의 에러는 그대로 둡니다.
fn on_constraint(
    err: AppError,
    unique: impl FnOnce() -> AppError,
    foreign_key: impl FnOnce() -> AppError,
) -> AppError {
    match err.constraint_kind() {
        Some(ConstraintKind::Unique) => unique(),
        Some(ConstraintKind::ForeignKey) => foreign_key(),
        None => err,
    }
}

fn non_blank(value: Option<String>, field: &str) -> Result<String, AppError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("{field} is required")))
}

// ============================================================
// 장르
// ============================================================

fn genre_conflict(e: AppError) -> AppError {
    let duplicate = || AppError::Conflict("Genre already exists".to_string());
    on_constraint(e, duplicate, duplicate)
}

/// `GET /genres` — 연습 화면의 장르 선택용 (로그인 불필요)
pub async fn list_genres(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let genres = db::list_genres(&state.pool).await?;
    Ok(Json(json!({ "genres": genres })))
}

pub async fn admin_list_genres(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Value>, AppError> {
    list_genres(State(state)).await
}

pub async fn create_genre(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<GenreRequest>,
) -> Result<(StatusCode, Json<Genre>), AppError> {
    let name = non_blank(req.name, "name")?;

    let genre = db::create_genre(&state.pool, &name)
        .await
        .map_err(genre_conflict)?;

    Ok((StatusCode::CREATED, Json(genre)))
}

pub async fn update_genre(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    Json(req): Json<GenreRequest>,
) -> Result<Json<Genre>, AppError> {
    let name = non_blank(req.name, "name")?;

    let genre = db::update_genre(&state.pool, id, &name)
        .await
        .map_err(genre_conflict)?;

    Ok(Json(genre))
}

pub async fn delete_genre(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    db::delete_genre(&state.pool, id).await.map_err(|e| {
        let in_use = || AppError::Conflict("Genre is still referenced by problems or sessions".to_string());
        on_constraint(e, in_use, in_use)
    })?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================
// 문제
// ============================================================

/// `GET /admin/problems`의 쿼리 파라미터. 모두 선택이며 문자열로 받아 직접 해석합니다.
#[derive(Debug, Deserialize)]
pub struct ProblemListQuery {
    pub page: Option<String>,
    pub genre_id: Option<String>,
    pub search: Option<String>,
}

impl ProblemListQuery {
    fn filter(&self) -> Result<ProblemFilter, AppError> {
        let genre_id = match self.genre_id.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                raw.parse::<i64>()
                    .map_err(|_| AppError::BadRequest("genre_id must be a number".to_string()))?,
            ),
        };
        let search = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(ProblemFilter { genre_id, search })
    }
}

pub async fn list_problems(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<ProblemListQuery>,
) -> Result<Json<ProblemPage>, AppError> {
    let filter = query.filter()?;

    let total = db::count_problems(&state.pool, &filter).await?;
    let page = paginate(total, PAGE_SIZE, query.page.as_deref());
    let problems = db::list_problems(&state.pool, &filter, &page).await?;

    Ok(Json(ProblemPage {
        problems,
        total_pages: page.total_pages,
        current_page: page.current_page,
    }))
}

fn problem_fields(req: ProblemRequest) -> Result<(i64, String), AppError> {
    let genre_id = req
        .genre_id
        .ok_or_else(|| AppError::BadRequest("genre_id is required".to_string()))?;
    let problem_text = non_blank(req.problem_text, "problem_text")?;
    Ok((genre_id, problem_text))
}

fn problem_conflict(e: AppError) -> AppError {
    on_constraint(
        e,
        || AppError::Conflict("Problem already exists in this genre".to_string()),
        || AppError::BadRequest("Genre does not exist".to_string()),
    )
}

pub async fn create_problem(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<ProblemRequest>,
) -> Result<(StatusCode, Json<Problem>), AppError> {
    let (genre_id, problem_text) = problem_fields(req)?;

    let problem = db::create_problem(&state.pool, genre_id, &problem_text)
        .await
        .map_err(problem_conflict)?;

    Ok((StatusCode::CREATED, Json(problem)))
}

pub async fn update_problem(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    Json(req): Json<ProblemRequest>,
) -> Result<Json<Problem>, AppError> {
    let (genre_id, problem_text) = problem_fields(req)?;

    let problem = db::update_problem(&state.pool, id, genre_id, &problem_text)
        .await
        .map_err(problem_conflict)?;

    Ok(Json(problem))
}

pub async fn delete_problem(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    db::delete_problem(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
