//! # 애플리케이션 설정(Configuration) 모듈
//!
//! 환경변수에서 서버 설정값을 읽어오는 모듈입니다.
//! `.env` 파일이나 시스템 환경변수에서 값을 가져옵니다.
//!
//! 설정 항목:
//! - `DATABASE_URL`: SQLite 데이터베이스 경로 (필수)
//! - `JWT_SECRET`: JWT 토큰 서명에 사용할 비밀키 (필수)
//! - `HOST`: 서버 바인딩 주소
//! - `PORT`: 서버 포트 번호
//! - `GEMINI_API_KEY`, `GEMINI_MODEL_NAME`: 문장 생성 서비스
//! - `YAHOO_CLIENT_ID`: 읽기(후리가나) 변환 서비스

use std::env;

/// 문장 생성 서비스의 기본 모델
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// 애플리케이션 전체 설정을 담는 구조체
///
/// 서버 시작 시 환경변수에서 한 번 읽어온 후,
/// 애플리케이션 전체에서 공유됩니다.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite 데이터베이스 파일 경로 (예: "sqlite:data/keydojo.db")
    pub database_url: String,
    /// JWT 토큰 서명/검증에 사용하는 비밀키
    pub jwt_secret: String,
    /// 서버가 바인딩할 호스트 주소 (기본값: "0.0.0.0")
    pub host: String,
    /// 서버 포트 번호 (기본값: 3002)
    pub port: u16,
    /// 없으면 문장 생성과 코칭 코멘트가 비활성화됩니다 (코멘트는 기본 문구로 대체).
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    /// 없으면 읽기 변환 API가 502를 반환합니다.
    pub yahoo_client_id: Option<String>,
}

impl Config {
    /// 환경변수에서 설정값을 읽어 Config 인스턴스를 생성합니다.
    ///
    /// # 에러
    /// `DATABASE_URL`과 `JWT_SECRET`은 필수이며, 없으면 에러가 발생합니다.
    /// 나머지 설정은 기본값이 있거나 선택 사항입니다.
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")?, // 필수: 없으면 에러
            jwt_secret: env::var("JWT_SECRET")?,     // 필수: 없으면 에러
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            // 파싱 실패 시에도 기본값
            port: env::var("PORT")
                .ok()
                .and_then(|port| port.parse().ok())
                .unwrap_or(3002),
            gemini_api_key: optional_var("GEMINI_API_KEY"),
            gemini_model: optional_var("GEMINI_MODEL_NAME")
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            yahoo_client_id: optional_var("YAHOO_CLIENT_ID"),
        })
    }
}

/// 값이 없거나 공백뿐이면 None
fn optional_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
