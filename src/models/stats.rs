use serde::{Deserialize, Serialize};

/// 미스 키 랭킹의 한 항목
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissedKeyCount {
    pub key: String,
    pub count: u64,
}

/// 마이페이지 통계 (`GET /me/stats`의 응답 본문)
///
/// 평균값은 세션 단위로 저장된 값의 평균을 정수로 반올림한 것입니다.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_keystrokes: i64,
    pub average_speed: i64,
    pub average_accuracy: i64,
    pub missed_key_ranking: Vec<MissedKeyCount>,
}
