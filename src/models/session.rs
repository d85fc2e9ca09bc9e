//! # 타이핑 세션 모델 정의
//!
//! 한 번의 타이핑 연습(세션)과 그 안의 문제별 결과를 표현하는 구조체들입니다.
//!
//! ## 두 가지 표현
//! - **검증된 입력** (`NewSession`, `NewProblemResult`): 클라이언트가 보낸 JSON을
//!   `services::validator`가 검사한 뒤 만들어지는 값. DB에 저장하기 직전의 형태입니다.
//! - **저장된 행** (`SessionSummary`, `ProblemResult`, `SessionDetail`): DB에서 읽어온 값.
//!
//! 세션은 생성된 뒤 수정/삭제되지 않습니다.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// 키 라벨 → 미스 횟수.
///
/// 삽입 순서를 유지합니다. 랭킹에서 동점이면 먼저 등장한 키가 앞에 옵니다.
/// 값이 0인 키는 저장하지 않습니다.
pub type MissedKeys = IndexMap<String, u64>;

/// 세션의 문제 출처 종류.
///
/// - `Db`: 관리자가 등록한 문제 카탈로그에서 뽑은 문제
/// - `Generated`: 외부 문장 생성 서비스가 만든 문제
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    Db,
    Generated,
}

impl SessionType {
    /// DB와 JSON에서 쓰는 문자열 표현
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::Db => "db",
            SessionType::Generated => "generated",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "db" => Some(SessionType::Db),
            "generated" => Some(SessionType::Generated),
            _ => None,
        }
    }
}

/// 세션 타입에 따라 달라지는 필수 필드.
///
/// "장르 ID"와 "생성 프롬프트" 중 정확히 하나만 존재해야 하므로,
/// Option 두 개 대신 enum으로 표현하여 잘못된 조합을 타입 수준에서 막습니다.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionSource {
    /// 카탈로그 모드: 어떤 장르에서 문제를 뽑았는지
    Catalog { genre_id: i64 },
    /// 생성 모드: 어떤 주제(프롬프트)로 문제를 생성했는지
    Generated { prompt: String },
}

impl SessionSource {
    pub fn session_type(&self) -> SessionType {
        match self {
            SessionSource::Catalog { .. } => SessionType::Db,
            SessionSource::Generated { .. } => SessionType::Generated,
        }
    }

    pub fn genre_id(&self) -> Option<i64> {
        match self {
            SessionSource::Catalog { genre_id } => Some(*genre_id),
            SessionSource::Generated { .. } => None,
        }
    }

    pub fn source_prompt(&self) -> Option<&str> {
        match self {
            SessionSource::Catalog { .. } => None,
            SessionSource::Generated { prompt } => Some(prompt),
        }
    }
}

/// 검증을 통과한 문제별 결과 (저장 직전)
#[derive(Debug, Clone, PartialEq)]
pub struct NewProblemResult {
    pub problem_text: String,
    pub speed: f64,
    pub accuracy: f64,
    pub missed_keys: MissedKeys,
}

/// 검증을 통과한 세션 결과 (저장 직전)
#[derive(Debug, Clone, PartialEq)]
pub struct NewSession {
    pub source: SessionSource,
    /// 세션 평균 타속 (KPM)
    pub average_speed: f64,
    /// 세션 평균 정확도 (%). 범위 검사는 하지 않습니다.
    pub average_accuracy: f64,
    /// 가장 많이 틀린 키. 표시용 캐시일 뿐이며, 통계 계산에는 사용하지 않습니다.
    /// 실제 랭킹은 항상 문제별 missed_keys에서 다시 계산합니다.
    pub most_missed_key: String,
    pub total_keystrokes: i64,
    /// 1개 이상. 순서는 제출 순서 그대로 유지됩니다.
    pub problem_results: Vec<NewProblemResult>,
}

/// 타이핑 세션 엔티티: `typing_sessions` 테이블 한 행에 장르 이름을 붙인 형태.
///
/// 이력 목록(`GET /me/sessions`)과 상세 조회의 부모 부분에 쓰입니다.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SessionSummary {
    /// 세션 고유 식별자 (UUIDv7)
    pub id: String,
    pub user_id: String,
    /// "db" 또는 "generated"
    pub session_type: String,
    pub genre_id: Option<i64>,
    /// LEFT JOIN으로 가져온 장르 이름 (생성 모드면 None)
    pub genre_name: Option<String>,
    pub source_prompt: Option<String>,
    pub average_speed: f64,
    pub average_accuracy: f64,
    pub most_missed_key: String,
    pub total_keystrokes: i64,
    /// 생성 시각 (ISO 8601, DB 기본값)
    pub created_at: String,
}

/// 저장된 문제별 결과. missed_keys는 JSON 문자열에서 다시 맵으로 복원된 상태
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProblemResult {
    pub id: i64,
    /// 세션 안에서의 순서 (0부터)
    pub position: i64,
    pub problem_text: String,
    pub speed: f64,
    pub accuracy: f64,
    pub missed_keys: MissedKeys,
}

/// 세션 상세 (`GET /me/sessions/{id}`의 응답 본문)
#[derive(Debug, Clone, Serialize)]
pub struct SessionDetail {
    /// `#[serde(flatten)]`: 부모 필드를 같은 JSON 객체 레벨로 펼칩니다.
    #[serde(flatten)]
    pub session: SessionSummary,
    pub problem_results: Vec<ProblemResult>,
}

/// 세션 이력 페이지 (`GET /me/sessions?page=N`의 응답 본문)
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionHistoryPage {
    pub sessions: Vec<SessionSummary>,
    pub total_pages: i64,
    pub current_page: i64,
}

/// 세션 저장 성공 응답
#[derive(Debug, Serialize)]
pub struct CreatedSession {
    pub session_id: String,
}
