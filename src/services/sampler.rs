//! # 문제 무작위 추출
//!
//! 연습을 시작할 때 카탈로그의 문제 후보 중에서 중복 없이 N개를 뽑습니다.
//! 생성 모드에서는 외부 서비스가 만든 문장 목록을 정리만 하고 그대로 넘깁니다.
//!
//! ## 문제 수 파라미터 처리
//! | 모드 | 기본값 | 범위 |
//! |------|--------|------|
//! | 카탈로그 (`requested_count`) | 10 | 1 ~ 100 |
//! | 생성 (`generated_count`) | 5 | 1 ~ 10 |
//!
//! 값이 없거나, 숫자가 아니거나, 1보다 작으면 기본값을 씁니다.

use rand::{seq::SliceRandom, Rng};

pub const DEFAULT_SAMPLE_COUNT: usize = 10;
pub const MAX_SAMPLE_COUNT: usize = 100;
pub const DEFAULT_GENERATED_COUNT: usize = 5;
pub const MAX_GENERATED_COUNT: usize = 10;

/// 쿼리 문자열의 `count`를 카탈로그 추출 개수로 변환합니다.
pub fn requested_count(raw: Option<&str>) -> usize {
    parse_count(raw, DEFAULT_SAMPLE_COUNT, MAX_SAMPLE_COUNT)
}

/// 쿼리 문자열의 `count`를 생성 문장 개수로 변환합니다.
pub fn generated_count(raw: Option<&str>) -> usize {
    parse_count(raw, DEFAULT_GENERATED_COUNT, MAX_GENERATED_COUNT)
}

fn parse_count(raw: Option<&str>, default: usize, max: usize) -> usize {
    match raw.and_then(|s| s.trim().parse::<i64>().ok()) {
        Some(n) if n >= 1 => (n as usize).min(max),
        _ => default,
    }
}

/// `pool`에서 중복 없이 최대 `requested`개를 무작위로 뽑습니다.
///
/// - `requested`는 먼저 1 ~ 100 범위로 맞춥니다.
/// - 후보가 비어 있으면 빈 Vec을 반환합니다 (에러 아님).
/// - 후보가 요청보다 적으면 전부 반환하되 순서는 섞습니다.
///
/// `partial_shuffle`은 앞쪽 `amount`개만 Fisher–Yates로 섞으므로
/// 후보가 많고 요청이 적어도 전체를 섞지 않으며, 모든 순열이 같은 확률로 나옵니다.
pub fn sample<T, R>(pool: &[T], requested: usize, rng: &mut R) -> Vec<T>
where
    T: Clone,
    R: Rng + ?Sized,
{
    if pool.is_empty() {
        return Vec::new();
    }

    let amount = requested.clamp(1, MAX_SAMPLE_COUNT).min(pool.len());
    let mut candidates = pool.to_vec();
    let (picked, _rest) = candidates.partial_shuffle(rng, amount);
    picked.to_vec()
}

/// 생성된 문장 목록을 정리합니다: 앞뒤 공백 제거, 빈 줄 제거, 최대 `count`개.
pub fn pass_through<I, S>(generated: I, count: usize) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    generated
        .into_iter()
        .map(|line| line.as_ref().trim().to_string())
        .filter(|line| !line.is_empty())
        .take(count)
        .collect()
}
