//! # 마이페이지 라우트 핸들러
//!
//! ## 엔드포인트 (모두 로그인 필요)
//! | 메서드 | 경로 | 설명 |
//! |--------|------|------|
//! | GET | /api/v1/me/stats | 누적 통계 |
//! | GET | /api/v1/me/sessions?page=N | 세션 이력 (최신순, 10개씩) |
//! | GET | /api/v1/me/sessions/{id} | 세션 상세 (문제별 결과 포함) |

use crate::{
    db,
    error::AppError,
    middleware::auth::AuthUser,
    models::*,
    routes::AppState,
    services::{
        paginator::{paginate, PAGE_SIZE},
        stats,
    },
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

pub async fn stats(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<UserStats>, AppError> {
    let stats = stats::compute_stats(&state.pool, &user.user_id).await?;
    Ok(Json(stats))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub page: Option<String>,
}

/// `GET /me/sessions` — 마지막 페이지를 넘으면 빈 목록을 반환합니다.
pub async fn list_sessions(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<SessionHistoryPage>, AppError> {
    let total = db::count_sessions_for_owner(&state.pool, &user.user_id).await?;
    let page = paginate(total, PAGE_SIZE, query.page.as_deref());
    let sessions = db::list_sessions_for_owner(&state.pool, &user.user_id, &page).await?;

    Ok(Json(SessionHistoryPage {
        sessions,
        total_pages: page.total_pages,
        current_page: page.current_page,
    }))
}

/// `GET /me/sessions/{id}` — 없으면 404, 다른 사용자의 세션이면 403.
pub async fn get_session(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<SessionDetail>, AppError> {
    let detail = db::get_session_detail(&state.pool, &id, &user.user_id).await?;
    Ok(Json(detail))
}

#[cfg(test)]
mod tests {
    use crate::db::testing::{seed_genre, seed_user};
    use crate::routes::testing::{send, test_state, token_for};
    use crate::routes::AppState;
    use axum::http::{Method, StatusCode};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    async fn submit(state: &AppState, token: &str, payload: Value) -> String {
        let (status, body) = send(state, Method::POST, "/api/v1/typing/results", Some(token), Some(payload)).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["session_id"].as_str().unwrap().to_string()
    }

    fn db_session(genre_id: i64, missed: Vec<Value>) -> Value {
        let problem_results: Vec<Value> = missed
            .into_iter()
            .enumerate()
            .map(|(i, missed_keys)| {
                json!({
                    "problem_text": format!("problem {i}"),
                    "kpm": 100,
                    "speed": 100,
                    "accuracy": 95,
                    "missed_keys": missed_keys
                })
            })
            .collect();
        json!({
            "session_type": "db",
            "genre_id": genre_id,
            "average_speed": 100,
            "average_accuracy": 95,
            "most_missed_key": "a",
            "total_keystrokes": 50,
            "problem_results": problem_results
        })
    }

    #[tokio::test]
    async fn stats_use_session_level_averages() {
        let state = test_state().await;
        let user = seed_user(&state.pool, "alice").await;
        let token = token_for(&user, false);
        let genre = seed_genre(&state.pool, "kana").await;

        submit(
            &state,
            &token,
            json!({
                "session_type": "db",
                "genre_id": genre,
                "average_speed": 52,
                "average_accuracy": 88,
                "most_missed_key": null,
                "total_keystrokes": 150,
                "problem_results": [
                    { "problem_text": "one", "speed": 60, "accuracy": 100, "missed_keys": {} },
                    { "problem_text": "two", "speed": 40, "accuracy": 80, "missed_keys": {} },
                    { "problem_text": "three", "speed": 50, "accuracy": 90, "missed_keys": {} }
                ]
            }),
        )
        .await;

        let (status, body) = send(&state, Method::GET, "/api/v1/me/stats", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "totalKeystrokes": 150,
                "averageSpeed": 52,
                "averageAccuracy": 88,
                "missedKeyRanking": []
            })
        );
    }

    #[tokio::test]
    async fn ranking_ties_keep_first_seen_order() {
        let state = test_state().await;
        let user = seed_user(&state.pool, "bob").await;
        let token = token_for(&user, false);
        let genre = seed_genre(&state.pool, "words").await;

        submit(&state, &token, db_session(genre, vec![json!({ "a": 2, "k": 1 })])).await;
        submit(&state, &token, db_session(genre, vec![json!({ "a": 1, "s": 3 })])).await;

        let (_, body) = send(&state, Method::GET, "/api/v1/me/stats", Some(&token), None).await;
        assert_eq!(
            body["missedKeyRanking"],
            json!([
                { "key": "a", "count": 3 },
                { "key": "s", "count": 3 },
                { "key": "k", "count": 1 }
            ])
        );
        assert_eq!(body["totalKeystrokes"], 100);
    }

    #[tokio::test]
    async fn stats_stay_readable_at_the_largest_accepted_counts() {
        let state = test_state().await;
        let user = seed_user(&state.pool, "frank").await;
        let token = token_for(&user, false);
        let genre = seed_genre(&state.pool, "kana").await;
        let max = u32::MAX as i64;

        let mut payload = db_session(genre, vec![json!({ "a": max })]);
        payload["total_keystrokes"] = json!(max);
        for _ in 0..3 {
            submit(&state, &token, payload.clone()).await;
        }

        let mut too_big = payload.clone();
        too_big["total_keystrokes"] = json!(i64::MAX);
        let (status, _) = send(&state, Method::POST, "/api/v1/typing/results", Some(&token), Some(too_big)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let mut too_big = payload;
        too_big["problem_results"][0]["missed_keys"] = json!({ "a": i64::MAX });
        let (status, _) = send(&state, Method::POST, "/api/v1/typing/results", Some(&token), Some(too_big)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(&state, Method::GET, "/api/v1/me/stats", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["totalKeystrokes"], json!(3 * max));
        assert_eq!(body["missedKeyRanking"], json!([{ "key": "a", "count": 3 * max }]));
    }

    #[tokio::test]
    async fn history_pages_through_fifteen_sessions() {
        let state = test_state().await;
        let user = seed_user(&state.pool, "carol").await;
        let token = token_for(&user, false);
        let genre = seed_genre(&state.pool, "kana").await;

        for _ in 0..15 {
            submit(&state, &token, db_session(genre, vec![json!({})])).await;
        }

        let (status, body) = send(&state, Method::GET, "/api/v1/me/sessions?page=2", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sessions"].as_array().unwrap().len(), 5);
        assert_eq!(body["totalPages"], 2);
        assert_eq!(body["currentPage"], 2);
        assert_eq!(body["sessions"][0]["genre_name"], "kana");

        let (_, body) = send(&state, Method::GET, "/api/v1/me/sessions?page=abc", Some(&token), None).await;
        assert_eq!(body["currentPage"], 1);
        assert_eq!(body["sessions"].as_array().unwrap().len(), 10);

        let (_, body) = send(&state, Method::GET, "/api/v1/me/sessions?page=7", Some(&token), None).await;
        assert_eq!(body["currentPage"], 7);
        assert_eq!(body["sessions"], json!([]));
    }

    #[tokio::test]
    async fn detail_is_owner_only() {
        let state = test_state().await;
        let owner = seed_user(&state.pool, "dave").await;
        let stranger = seed_user(&state.pool, "erin").await;
        let genre = seed_genre(&state.pool, "code").await;
        let owner_token = token_for(&owner, false);

        let id = submit(
            &state,
            &owner_token,
            db_session(genre, vec![json!({ "w": 4, "a": 1, "s": 0 }), json!({})]),
        )
        .await;
        let uri = format!("/api/v1/me/sessions/{id}");

        let (status, body) = send(&state, Method::GET, &uri, Some(&owner_token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], id.as_str());
        assert_eq!(body["session_type"], "db");
        assert_eq!(body["problem_results"].as_array().unwrap().len(), 2);
        // 0회는 저장되지 않고, 나머지는 순서 그대로
        assert_eq!(body["problem_results"][0]["missed_keys"], json!({ "w": 4, "a": 1 }));
        assert_eq!(
            body["problem_results"][0]["missed_keys"]
                .as_object()
                .unwrap()
                .keys()
                .collect::<Vec<_>>(),
            vec!["w", "a"]
        );

        let (status, _) = send(&state, Method::GET, &uri, Some(&token_for(&stranger, false)), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(&state, Method::GET, "/api/v1/me/sessions/missing", Some(&owner_token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
