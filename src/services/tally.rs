//! # 미스 키 집계
//!
//! 문제별 `{키: 미스 횟수}` 맵들을 하나로 합치고, 많이 틀린 순서로 랭킹을 뽑습니다.
//! I/O가 전혀 없는 순수 함수들입니다.

use crate::models::{MissedKeyCount, MissedKeys};

/// 여러 미스 키 맵을 하나의 누적 맵으로 합칩니다.
///
/// 없는 키는 0으로 취급하고, 결과 맵의 키 순서는 처음 등장한 순서입니다.
/// 빈 입력이면 빈 맵을 반환합니다. 합계는 `u64::MAX`에서 멈춥니다.
pub fn merge<'a, I>(maps: I) -> MissedKeys
where
    I: IntoIterator<Item = &'a MissedKeys>,
{
    let mut total = MissedKeys::new();
    for map in maps {
        for (key, count) in map {
            let sum = total.entry(key.clone()).or_insert(0);
            *sum = sum.saturating_add(*count);
        }
    }
    total
}

/// 누적 맵에서 미스 횟수가 많은 순으로 최대 `n`개를 뽑습니다.
///
/// `sort_by`는 안정 정렬이므로 횟수가 같으면 처음 등장한 키가 앞에 옵니다.
pub fn top_n(cumulative: &MissedKeys, n: usize) -> Vec<MissedKeyCount> {
    let mut entries: Vec<MissedKeyCount> = cumulative
        .iter()
        .map(|(key, count)| MissedKeyCount {
            key: key.clone(),
            count: *count,
        })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries.truncate(n);
    entries
}
