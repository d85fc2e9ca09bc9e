//! # 타이핑 세션 데이터베이스 쿼리 모듈
//!
//! 세션(부모)과 문제별 결과(자식)의 저장과 조회를 담당하는 SQL 쿼리 함수들입니다.
//!
//! ## 세션 라이프사이클
//! ```text
//! [연습 종료] create_session() → 저장 완료 (이후 변경/삭제 없음)
//!                                 ├─ get_session_detail()      상세 조회
//!                                 ├─ list_sessions_for_owner() 이력 목록
//!                                 └─ session_totals() / missed_keys_for_owner()  통계
//! ```
//!
//! ## 원자성
//! 부모 1행과 자식 N행은 하나의 트랜잭션으로 저장합니다.
//! 도중에 하나라도 실패하면 트랜잭션이 롤백되어, "자식 없는 부모" 같은
//! 반쪽짜리 세션이 다른 조회에 보이는 일이 없습니다.

use crate::error::AppError;
use crate::models::*;
use crate::services::paginator::Pagination;
use sqlx::{SqliteConnection, SqlitePool};

/// 세션 목록/상세에서 공통으로 쓰는 SELECT 절 (장르 이름은 LEFT JOIN)
const SESSION_COLUMNS: &str = r#"
    SELECT s.id, s.user_id, s.session_type, s.genre_id, g.name AS genre_name,
           s.source_prompt, s.average_speed, s.average_accuracy,
           s.most_missed_key, s.total_keystrokes, s.created_at
    FROM typing_sessions s
    LEFT JOIN genres g ON g.id = s.genre_id
"#;

/// `session_problems` 한 행. missed_keys는 아직 JSON 문자열 상태입니다.
#[derive(Debug, sqlx::FromRow)]
struct ProblemResultRow {
    id: i64,
    position: i64,
    problem_text: String,
    speed: f64,
    accuracy: f64,
    missed_keys: String,
}

impl TryFrom<ProblemResultRow> for ProblemResult {
    type Error = serde_json::Error;

    fn try_from(row: ProblemResultRow) -> Result<Self, Self::Error> {
        Ok(ProblemResult {
            id: row.id,
            position: row.position,
            problem_text: row.problem_text,
            speed: row.speed,
            accuracy: row.accuracy,
            missed_keys: serde_json::from_str(&row.missed_keys)?,
        })
    }
}

/// 검증된 세션 결과를 저장하고 새 세션 ID를 반환합니다.
///
/// ## 처리 순서
/// 1. 트랜잭션 시작 (`pool.begin()`)
/// 2. 부모(`typing_sessions`) INSERT
/// 3. 자식(`session_problems`) INSERT, 제출 순서를 `position`으로 기록
/// 4. 커밋
///
/// `?`로 중간에 빠져나가면 `tx`가 drop되면서 자동으로 롤백됩니다.
/// 존재하지 않는 장르를 참조하면 외래키 제약 위반으로 `AppError::Database`가 됩니다.
pub async fn create_session(
    pool: &SqlitePool,
    user_id: &str,
    session: &NewSession,
) -> Result<String, AppError> {
    let id = uuid::Uuid::now_v7().to_string();

    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO typing_sessions (
            id, user_id, session_type, genre_id, source_prompt,
            average_speed, average_accuracy, most_missed_key, total_keystrokes
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(user_id)
    .bind(session.source.session_type().as_str())
    .bind(session.source.genre_id())
    .bind(session.source.source_prompt())
    .bind(session.average_speed)
    .bind(session.average_accuracy)
    .bind(&session.most_missed_key)
    .bind(session.total_keystrokes)
    .execute(&mut *tx)
    .await?;

    for (position, result) in session.problem_results.iter().enumerate() {
        // {"k": 2, "a": 1} 형태의 JSON 문자열로 저장 (키 순서 유지)
        let missed_keys = serde_json::to_string(&result.missed_keys)?;

        sqlx::query(
            r#"
            INSERT INTO session_problems (
                session_id, position, problem_text, speed, accuracy, missed_keys
            )
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(position as i64)
        .bind(&result.problem_text)
        .bind(result.speed)
        .bind(result.accuracy)
        .bind(missed_keys)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::info!(
        session_id = %id,
        user_id,
        problem_count = session.problem_results.len(),
        "typing session saved"
    );
    Ok(id)
}

/// 세션 하나를 자식 결과까지 포함하여 조회합니다.
///
/// ## 반환값
/// - `Ok(SessionDetail)`: 요청한 사용자의 세션
/// - `Err(AppError::NotFound)`: 해당 ID의 세션이 없음
/// - `Err(AppError::Forbidden)`: 세션은 있지만 다른 사용자의 것
///
/// 부모와 자식을 같은 트랜잭션 안에서 읽어 일관된 스냅샷을 보장합니다.
pub async fn get_session_detail(
    pool: &SqlitePool,
    session_id: &str,
    caller_id: &str,
) -> Result<SessionDetail, AppError> {
    let mut tx = pool.begin().await?;

    let query = format!("{SESSION_COLUMNS} WHERE s.id = ?");
    let session = sqlx::query_as::<_, SessionSummary>(&query)
        .bind(session_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotFound)?;

    if session.user_id != caller_id {
        return Err(AppError::Forbidden);
    }

    let rows = sqlx::query_as::<_, ProblemResultRow>(
        r#"
        SELECT id, position, problem_text, speed, accuracy, missed_keys
        FROM session_problems
        WHERE session_id = ?
        ORDER BY position
        "#,
    )
    .bind(session_id)
    .fetch_all(&mut *tx)
    .await?;

    tx.commit().await?;

    let problem_results = rows
        .into_iter()
        .map(ProblemResult::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SessionDetail {
        session,
        problem_results,
    })
}

/// 사용자의 세션 수 (페이지 계산용)
pub async fn count_sessions_for_owner(pool: &SqlitePool, user_id: &str) -> Result<i64, AppError> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM typing_sessions WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// 사용자의 세션 이력 한 페이지를 최신순으로 조회합니다.
///
/// 같은 시각(밀리초)에 만들어진 세션은 UUIDv7 ID의 역순으로 정렬합니다.
pub async fn list_sessions_for_owner(
    pool: &SqlitePool,
    user_id: &str,
    page: &Pagination,
) -> Result<Vec<SessionSummary>, AppError> {
    let query = format!(
        "{SESSION_COLUMNS} WHERE s.user_id = ? ORDER BY s.created_at DESC, s.id DESC LIMIT ? OFFSET ?"
    );
    let sessions = sqlx::query_as::<_, SessionSummary>(&query)
        .bind(user_id)
        .bind(page.take)
        .bind(page.skip)
        .fetch_all(pool)
        .await?;

    Ok(sessions)
}

/// 세션 단위로 저장된 값들의 집계 결과
#[derive(Debug, Clone, Copy, PartialEq, sqlx::FromRow)]
pub struct SessionTotals {
    pub session_count: i64,
    pub total_keystrokes: i64,
    /// 세션이 없으면 SQL AVG가 NULL을 돌려주므로 Option
    pub average_speed: Option<f64>,
    pub average_accuracy: Option<f64>,
}

/// 사용자의 모든 세션에 대한 합계/평균.
///
/// 트랜잭션 안에서 다른 조회와 함께 실행할 수 있도록 연결(`SqliteConnection`)을 받습니다.
pub async fn session_totals(conn: &mut SqliteConnection, user_id: &str) -> Result<SessionTotals, AppError> {
    let totals = sqlx::query_as::<_, SessionTotals>(
        r#"
        SELECT COUNT(*) AS session_count,
               COALESCE(SUM(total_keystrokes), 0) AS total_keystrokes,
               AVG(average_speed) AS average_speed,
               AVG(average_accuracy) AS average_accuracy
        FROM typing_sessions
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(totals)
}

/// 사용자의 모든 문제별 missed_keys를 세션 생성순 → 문제 순서대로 가져옵니다.
///
/// 이 순서가 랭킹의 "먼저 등장한 키" 기준이 됩니다.
pub async fn missed_keys_for_owner(conn: &mut SqliteConnection, user_id: &str) -> Result<Vec<MissedKeys>, AppError> {
    let rows: Vec<(String,)> = sqlx::query_as(
        r#"
        SELECT p.missed_keys
        FROM session_problems p
        JOIN typing_sessions s ON s.id = p.session_id
        WHERE s.user_id = ?
        ORDER BY s.created_at, s.id, p.position
        "#,
    )
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await?;

    let maps = rows
        .into_iter()
        .map(|(raw,)| serde_json::from_str::<MissedKeys>(&raw))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(maps)
}
