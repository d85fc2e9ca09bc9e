//! # 연습 준비/마무리용 요청·응답 구조체
//!
//! 외부 서비스(문장 생성, 읽기 변환)를 거치는 엔드포인트들이 사용합니다.

use serde::{Deserialize, Serialize};

use super::MissedKeys;

/// 생성 모드에서 만들어진 문제 한 개
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedProblem {
    pub problem_text: String,
}

/// 코칭 코멘트 요청 (`POST /typing/coach-comment`)
///
/// 프론트엔드가 보내는 키 이름(`missedKeys`)을 그대로 받습니다.
#[derive(Debug, Clone, Deserialize)]
pub struct CoachRequest {
    #[serde(default)]
    pub kpm: f64,
    #[serde(default)]
    pub accuracy: f64,
    #[serde(default, rename = "missedKeys")]
    pub missed_keys: MissedKeys,
}

#[derive(Debug, Serialize)]
pub struct CoachComment {
    pub comment: String,
}

/// 읽기(후리가나) 변환 요청 (`POST /typing/readings`)
#[derive(Debug, Deserialize)]
pub struct ReadingRequest {
    pub texts: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct ReadingResponse {
    pub readings: Vec<String>,
}
