//! # 사용자 통계
//!
//! 마이페이지 상단의 누적 통계를 계산합니다.
//!
//! - 총 타수: 세션별 `total_keystrokes`의 합
//! - 평균 속도/정확도: **세션 단위로 저장된** 평균값들의 산술 평균 (문제별 값에서 다시 계산하지 않음)
//! - 미스 키 랭킹: 모든 문제 결과의 missed_keys를 합친 뒤 상위 5개
//!
//! 세션의 `most_missed_key`는 표시용 캐시일 뿐이라 여기서는 읽지 않습니다.

use sqlx::SqlitePool;

use crate::db::{self, SessionTotals};
use crate::error::AppError;
use crate::models::{MissedKeys, UserStats};
use crate::services::tally;

/// 랭킹에 표시할 최대 키 개수
pub const RANKING_SIZE: usize = 5;

/// 사용자의 통계를 계산합니다.
///
/// 합계 쿼리와 missed_keys 조회를 하나의 읽기 트랜잭션에서 실행하여,
/// 도중에 새 세션이 저장되어도 두 결과가 서로 어긋나지 않게 합니다.
pub async fn compute_stats(pool: &SqlitePool, user_id: &str) -> Result<UserStats, AppError> {
    let mut tx = pool.begin().await?;
    let totals = db::session_totals(&mut *tx, user_id).await?;
    let missed = db::missed_keys_for_owner(&mut *tx, user_id).await?;
    tx.commit().await?;

    Ok(summarize(&totals, &missed))
}

/// DB에서 읽어온 값으로 통계를 만듭니다. 세션이 없으면 모든 값이 0입니다.
pub fn summarize(totals: &SessionTotals, missed: &[MissedKeys]) -> UserStats {
    let cumulative = tally::merge(missed);

    UserStats {
        total_keystrokes: totals.total_keystrokes,
        average_speed: round_average(totals.average_speed),
        average_accuracy: round_average(totals.average_accuracy),
        missed_key_ranking: tally::top_n(&cumulative, RANKING_SIZE),
    }
}

// 0.5는 0에서 먼 쪽으로 반올림
fn round_average(value: Option<f64>) -> i64 {
    value.map(|v| v.round() as i64).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::{seed_genre, seed_user, test_pool};
    use crate::models::*;
    use pretty_assertions::assert_eq;

    fn missed(pairs: &[(&str, u64)]) -> MissedKeys {
        pairs.iter().map(|(k, c)| (k.to_string(), *c)).collect()
    }

    fn problem(speed: f64, accuracy: f64, missed_keys: MissedKeys) -> NewProblemResult {
        NewProblemResult {
            problem_text: "practice".to_string(),
            speed,
            accuracy,
            missed_keys,
        }
    }

    #[tokio::test]
    async fn no_sessions_yields_zeroes() {
        let pool = test_pool().await;
        let user = seed_user(&pool, "nobody").await;

        let stats = compute_stats(&pool, &user).await.unwrap();
        assert_eq!(
            stats,
            UserStats {
                total_keystrokes: 0,
                average_speed: 0,
                average_accuracy: 0,
                missed_key_ranking: vec![],
            }
        );
    }

    #[tokio::test]
    async fn averages_come_from_session_level_values() {
        let pool = test_pool().await;
        let user = seed_user(&pool, "alice").await;
        let genre = seed_genre(&pool, "kana").await;

        // 문제별 값의 평균은 (50, 90)이지만, 세션에 저장된 평균은 (47, 87)입니다.
        let session = NewSession {
            source: SessionSource::Catalog { genre_id: genre },
            average_speed: 47.0,
            average_accuracy: 87.0,
            most_missed_key: String::new(),
            total_keystrokes: 150,
            problem_results: vec![
                problem(60.0, 100.0, MissedKeys::new()),
                problem(40.0, 80.0, MissedKeys::new()),
                problem(50.0, 90.0, MissedKeys::new()),
            ],
        };
        db::create_session(&pool, &user, &session).await.unwrap();

        let stats = compute_stats(&pool, &user).await.unwrap();
        assert_eq!(stats.total_keystrokes, 150);
        assert_eq!(stats.average_speed, 47);
        assert_eq!(stats.average_accuracy, 87);
    }

    #[tokio::test]
    async fn ranking_merges_every_session_in_first_seen_order() {
        let pool = test_pool().await;
        let user = seed_user(&pool, "bob").await;
        let other = seed_user(&pool, "carol").await;
        let genre = seed_genre(&pool, "words").await;

        let session = |missed_keys: MissedKeys, average_speed: f64| NewSession {
            source: SessionSource::Catalog { genre_id: genre },
            average_speed,
            average_accuracy: 90.0,
            // 캐시 필드는 랭킹에 영향을 주지 않아야 합니다.
            most_missed_key: "z".to_string(),
            total_keystrokes: 40,
            problem_results: vec![problem(average_speed, 90.0, missed_keys)],
        };

        db::create_session(&pool, &user, &session(missed(&[("a", 2), ("k", 1)]), 100.0))
            .await
            .unwrap();
        db::create_session(&pool, &user, &session(missed(&[("a", 1), ("s", 3)]), 111.0))
            .await
            .unwrap();
        db::create_session(&pool, &other, &session(missed(&[("q", 9)]), 10.0))
            .await
            .unwrap();

        let stats = compute_stats(&pool, &user).await.unwrap();
        assert_eq!(
            stats.missed_key_ranking,
            vec![
                MissedKeyCount { key: "a".into(), count: 3 },
                MissedKeyCount { key: "s".into(), count: 3 },
                MissedKeyCount { key: "k".into(), count: 1 },
            ]
        );
        assert_eq!(stats.total_keystrokes, 80);
        // (100 + 111) / 2 = 105.5 → 106
        assert_eq!(stats.average_speed, 106);
    }

    #[test]
    fn ranking_is_capped_at_five() {
        let totals = SessionTotals {
            session_count: 1,
            total_keystrokes: 10,
            average_speed: Some(99.4),
            average_accuracy: Some(99.5),
        };
        let maps = vec![missed(&[("a", 1), ("b", 2), ("c", 3), ("d", 4), ("e", 5), ("f", 6)])];

        let stats = summarize(&totals, &maps);
        assert_eq!(stats.missed_key_ranking.len(), RANKING_SIZE);
        assert_eq!(stats.missed_key_ranking[0].key, "f");
        assert_eq!(stats.average_speed, 99);
        assert_eq!(stats.average_accuracy, 100);
    }
}
