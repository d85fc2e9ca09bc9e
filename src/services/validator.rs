//! # 세션 결과 검증기
//!
//! 연습이 끝난 뒤 클라이언트가 보내는 세션 결과 JSON을 검사하여,
//! 통과하면 정규화된 `NewSession`을, 실패하면 **가장 먼저 어긴 규칙**을 담은
//! `ValidationError`를 반환합니다.
//!
//! ## 검사 순서 (고정)
//! 1. `session_type`이 "db" 또는 "generated"인가
//! 2. db면 `genre_id`(정수), generated면 `source_prompt`(공백 제외 비어 있지 않은 문자열)
//! 3. `average_speed`: 0 이상의 유한한 수
//! 4. `average_accuracy`: 유한한 수 (범위는 검사하지 않음)
//! 5. `total_keystrokes`: 0 이상, `MAX_TOTAL_KEYSTROKES` 이하의 정수
//! 6. `most_missed_key`: 없거나 null이면 "", 있으면 문자열
//! 7. `problem_results`: 비어 있지 않은 배열
//! 8. 각 항목: `problem_text` → `speed` → `accuracy` → `missed_keys` (횟수는 `MAX_MISSED_KEY_COUNT` 이하)
//!
//! 순서가 고정되어 있으므로 같은 입력에는 항상 같은 에러 메시지가 나옵니다.
//! 하나라도 실패하면 전체가 거부되고 아무것도 저장되지 않습니다.
//!
//! 입력을 구조체로 바로 역직렬화하지 않고 `serde_json::Value`로 받는 이유는
//! "정수인가", "배열이 아니라 객체인가" 같은 타입 검사 자체가 규칙의 일부이기 때문입니다.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::{MissedKeys, NewProblemResult, NewSession, SessionSource, SessionType};

/// 한 세션의 총 타수 상한. 사용자별 합계가 i64 범위를 넘지 않게 묶어 둡니다.
pub const MAX_TOTAL_KEYSTROKES: i64 = u32::MAX as i64;

/// 문제 하나에서 한 키의 미스 횟수 상한
pub const MAX_MISSED_KEY_COUNT: i64 = u32::MAX as i64;

/// 검증 규칙별 에러. Display 메시지가 그대로 클라이언트에 전달됩니다.
///
/// 문제별 규칙은 몇 번째 항목(0부터)에서 실패했는지 함께 알려줍니다.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("session_type must be \"db\" or \"generated\"")]
    InvalidSessionType,

    #[error("genre_id (integer) is required when session_type is \"db\"")]
    MissingGenre,

    #[error("source_prompt (non-empty string) is required when session_type is \"generated\"")]
    MissingPrompt,

    #[error("average_speed must be a non-negative number")]
    InvalidAverageSpeed,

    #[error("average_accuracy must be a number")]
    InvalidAverageAccuracy,

    #[error("total_keystrokes must be an integer between 0 and 4294967295")]
    InvalidTotalKeystrokes,

    #[error("most_missed_key must be a string")]
    InvalidMostMissedKey,

    #[error("problem_results must be a non-empty array")]
    EmptyProblemResults,

    #[error("problem_results[{0}].problem_text must be a non-empty string")]
    InvalidProblemText(usize),

    #[error("problem_results[{0}].speed must be a non-negative number")]
    InvalidSpeed(usize),

    #[error("problem_results[{0}].accuracy must be a number")]
    InvalidAccuracy(usize),

    #[error("problem_results[{0}].missed_keys must be an object like {{\"k\": 1}}")]
    InvalidMissedKeys(usize),

    #[error("problem_results[{0}].missed_keys counts must be integers between 0 and 4294967295")]
    InvalidMissedKeyCount(usize),
}

/// 세션 결과 JSON을 검증하고 정규화합니다.
///
/// 정규화 내용:
/// - 세션 타입에 맞지 않는 필드(db인데 source_prompt 등)는 버립니다.
/// - `most_missed_key`가 없으면 빈 문자열로 채웁니다.
/// - `missed_keys`에서 횟수가 0인 키는 제거합니다.
pub fn validate_submission(payload: &Value) -> Result<NewSession, ValidationError> {
    // 1. session_type
    let session_type = payload
        .get("session_type")
        .and_then(Value::as_str)
        .and_then(SessionType::parse)
        .ok_or(ValidationError::InvalidSessionType)?;

    // 2. 세션 타입에 따른 조건부 필수 필드
    let source = match session_type {
        SessionType::Db => {
            let genre_id = payload
                .get("genre_id")
                .and_then(as_integer)
                .ok_or(ValidationError::MissingGenre)?;
            SessionSource::Catalog { genre_id }
        }
        SessionType::Generated => {
            let prompt = payload
                .get("source_prompt")
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
                .ok_or(ValidationError::MissingPrompt)?;
            SessionSource::Generated {
                prompt: prompt.to_string(),
            }
        }
    };

    // 3. average_speed
    let average_speed = payload
        .get("average_speed")
        .and_then(as_finite)
        .filter(|v| *v >= 0.0)
        .ok_or(ValidationError::InvalidAverageSpeed)?;

    // 4. average_accuracy: 0~100 범위를 벗어나도 그대로 받습니다
    let average_accuracy = payload
        .get("average_accuracy")
        .and_then(as_finite)
        .ok_or(ValidationError::InvalidAverageAccuracy)?;

    // 5. total_keystrokes
    let total_keystrokes = payload
        .get("total_keystrokes")
        .and_then(as_integer)
        .filter(|v| (0..=MAX_TOTAL_KEYSTROKES).contains(v))
        .ok_or(ValidationError::InvalidTotalKeystrokes)?;

    // 6. most_missed_key
    let most_missed_key = match payload.get("most_missed_key") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(_) => return Err(ValidationError::InvalidMostMissedKey),
    };

    // 7. problem_results
    let entries = payload
        .get("problem_results")
        .and_then(Value::as_array)
        .filter(|arr| !arr.is_empty())
        .ok_or(ValidationError::EmptyProblemResults)?;

    // 8. 항목별 검사
    let problem_results = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| validate_problem_result(index, entry))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(NewSession {
        source,
        average_speed,
        average_accuracy,
        most_missed_key,
        total_keystrokes,
        problem_results,
    })
}

fn validate_problem_result(index: usize, entry: &Value) -> Result<NewProblemResult, ValidationError> {
    let problem_text = entry
        .get("problem_text")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or(ValidationError::InvalidProblemText(index))?;

    let speed = entry
        .get("speed")
        .and_then(as_finite)
        .filter(|v| *v >= 0.0)
        .ok_or(ValidationError::InvalidSpeed(index))?;

    let accuracy = entry
        .get("accuracy")
        .and_then(as_finite)
        .ok_or(ValidationError::InvalidAccuracy(index))?;

    // 객체만 허용 (배열, null, 누락은 거부). 빈 객체 {}는 "미스 없음"으로 유효합니다.
    let raw_keys = entry
        .get("missed_keys")
        .and_then(Value::as_object)
        .ok_or(ValidationError::InvalidMissedKeys(index))?;

    Ok(NewProblemResult {
        problem_text: problem_text.to_string(),
        speed,
        accuracy,
        missed_keys: normalize_missed_keys(index, raw_keys)?,
    })
}

/// 입력 순서를 유지한 채 `{키: 횟수}`를 MissedKeys로 변환합니다. 0회인 키는 버립니다.
fn normalize_missed_keys(index: usize, raw: &Map<String, Value>) -> Result<MissedKeys, ValidationError> {
    let mut keys = MissedKeys::with_capacity(raw.len());
    for (key, value) in raw {
        let count = as_integer(value)
            .filter(|c| (0..=MAX_MISSED_KEY_COUNT).contains(c))
            .ok_or(ValidationError::InvalidMissedKeyCount(index))?;
        if count > 0 {
            keys.insert(key.clone(), count as u64);
        }
    }
    Ok(keys)
}

/// JSON 숫자를 유한한 f64로 꺼냅니다. 문자열 "12" 같은 값은 숫자로 보지 않습니다.
fn as_finite(value: &Value) -> Option<f64> {
    value.as_f64().filter(|v| v.is_finite())
}

/// JSON 숫자를 정수로 꺼냅니다. `150.0`처럼 소수부가 0인 실수도 정수로 인정합니다.
fn as_integer(value: &Value) -> Option<i64> {
    if let Some(i) = value.as_i64() {
        return Some(i);
    }
    let f = value.as_f64()?;
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}
