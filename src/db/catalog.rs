//! # 장르/문제 카탈로그 쿼리
//!
//! 연습용 문제(problem)는 반드시 하나의 장르(genre)에 속합니다.
//! 관리자 API의 CRUD와, 연습 시작 시 문제를 뽑기 위한 후보 조회를 담당합니다.
//!
//! 제약 조건 위반(이름 중복, 없는 장르 참조, 문제가 남은 장르 삭제)은
//! 여기서 해석하지 않고 `AppError::Database`로 그대로 올려보냅니다.
//! 어떤 HTTP 응답으로 바꿀지는 라우트 핸들러가 `AppError::constraint_kind()`로 판단합니다.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::error::AppError;
use crate::models::{Genre, Problem, ProblemWithGenre};
use crate::services::paginator::Pagination;

// ============================================================
// 장르
// ============================================================

pub async fn list_genres(pool: &SqlitePool) -> Result<Vec<Genre>, AppError> {
    let genres = sqlx::query_as::<_, Genre>("SELECT id, name, created_at FROM genres ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(genres)
}

pub async fn get_genre(pool: &SqlitePool, id: i64) -> Result<Option<Genre>, AppError> {
    let genre = sqlx::query_as::<_, Genre>("SELECT id, name, created_at FROM genres WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(genre)
}

pub async fn create_genre(pool: &SqlitePool, name: &str) -> Result<Genre, AppError> {
    let genre = sqlx::query_as::<_, Genre>(
        "INSERT INTO genres (name) VALUES (?) RETURNING id, name, created_at",
    )
    .bind(name)
    .fetch_one(pool)
    .await?;
    Ok(genre)
}

/// 장르 이름 변경. 대상이 없으면 `NotFound`.
pub async fn update_genre(pool: &SqlitePool, id: i64, name: &str) -> Result<Genre, AppError> {
    sqlx::query_as::<_, Genre>(
        "UPDATE genres SET name = ? WHERE id = ? RETURNING id, name, created_at",
    )
    .bind(name)
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound)
}

/// 장르 삭제. 문제나 세션이 참조 중이면 외래키 위반으로 실패합니다.
pub async fn delete_genre(pool: &SqlitePool, id: i64) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM genres WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

// ============================================================
// 문제 추출 후보
// ============================================================

/// 추출 후보가 되는 문제 ID 목록. `genre_id`가 없으면 전체 문제가 후보입니다.
pub async fn problem_ids(pool: &SqlitePool, genre_id: Option<i64>) -> Result<Vec<i64>, AppError> {
    let mut query = QueryBuilder::<Sqlite>::new("SELECT id FROM problems");
    if let Some(genre_id) = genre_id {
        query.push(" WHERE genre_id = ").push_bind(genre_id);
    }
    query.push(" ORDER BY id");

    let ids = query
        .build_query_scalar::<i64>()
        .fetch_all(pool)
        .await?;
    Ok(ids)
}

/// ID 목록에 해당하는 문제를 장르 이름과 함께 가져옵니다.
///
/// 결과는 `ids`에 적힌 순서를 따릅니다. (추출 결과의 무작위 순서 유지)
pub async fn problems_by_ids(pool: &SqlitePool, ids: &[i64]) -> Result<Vec<ProblemWithGenre>, AppError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut query = QueryBuilder::<Sqlite>::new(
        r#"
        SELECT p.id, p.genre_id, g.name AS genre_name, p.problem_text, p.created_at
        FROM problems p
        JOIN genres g ON g.id = p.genre_id
        WHERE p.id IN (
        "#,
    );
    let mut separated = query.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");

    let mut rows = query
        .build_query_as::<ProblemWithGenre>()
        .fetch_all(pool)
        .await?;

    rows.sort_by_key(|row| ids.iter().position(|id| *id == row.id));
    Ok(rows)
}

// ============================================================
// 문제 관리
// ============================================================

/// 관리 화면 목록의 필터 조건
#[derive(Debug, Default, Clone)]
pub struct ProblemFilter {
    pub genre_id: Option<i64>,
    /// 문제문에 포함된 부분 문자열
    pub search: Option<String>,
}

fn push_filter(query: &mut QueryBuilder<'_, Sqlite>, filter: &ProblemFilter) {
    query.push(" WHERE 1 = 1");
    if let Some(genre_id) = filter.genre_id {
        query.push(" AND p.genre_id = ").push_bind(genre_id);
    }
    if let Some(search) = &filter.search {
        // LIKE의 와일드카드(%, _) 이스케이프를 피하려고 instr로 부분 일치를 검사합니다.
        query
            .push(" AND instr(p.problem_text, ")
            .push_bind(search.clone())
            .push(") > 0");
    }
}

pub async fn count_problems(pool: &SqlitePool, filter: &ProblemFilter) -> Result<i64, AppError> {
    let mut query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM problems p");
    push_filter(&mut query, filter);

    let count = query.build_query_scalar::<i64>().fetch_one(pool).await?;
    Ok(count)
}

/// 필터 조건에 맞는 문제 한 페이지 (최신 등록순)
pub async fn list_problems(
    pool: &SqlitePool,
    filter: &ProblemFilter,
    page: &Pagination,
) -> Result<Vec<ProblemWithGenre>, AppError> {
    let mut query = QueryBuilder::<Sqlite>::new(
        r#"
        SELECT p.id, p.genre_id, g.name AS genre_name, p.problem_text, p.created_at
        FROM problems p
        JOIN genres g ON g.id = p.genre_id
        "#,
    );
    push_filter(&mut query, filter);
    query
        .push(" ORDER BY p.id DESC LIMIT ")
        .push_bind(page.take)
        .push(" OFFSET ")
        .push_bind(page.skip);

    let problems = query
        .build_query_as::<ProblemWithGenre>()
        .fetch_all(pool)
        .await?;
    Ok(problems)
}

pub async fn create_problem(pool: &SqlitePool, genre_id: i64, problem_text: &str) -> Result<Problem, AppError> {
    let problem = sqlx::query_as::<_, Problem>(
        r#"
        INSERT INTO problems (genre_id, problem_text)
        VALUES (?, ?)
        RETURNING id, genre_id, problem_text, created_at
        "#,
    )
    .bind(genre_id)
    .bind(problem_text)
    .fetch_one(pool)
    .await?;
    Ok(problem)
}

pub async fn update_problem(
    pool: &SqlitePool,
    id: i64,
    genre_id: i64,
    problem_text: &str,
) -> Result<Problem, AppError> {
    sqlx::query_as::<_, Problem>(
        r#"
        UPDATE problems SET genre_id = ?, problem_text = ?
        WHERE id = ?
        RETURNING id, genre_id, problem_text, created_at
        "#,
    )
    .bind(genre_id)
    .bind(problem_text)
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound)
}

pub async fn delete_problem(pool: &SqlitePool, id: i64) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM problems WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}
