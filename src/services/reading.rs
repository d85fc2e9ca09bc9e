//! # 읽기(후리가나) 변환 서비스
//!
//! 한자가 섞인 일본어 문장을 히라가나 읽기로 바꿉니다.
//! 타이핑 판정은 읽기 기준으로 하므로, 연습 시작 전에 문제문마다 한 번씩 호출됩니다.
//!
//! Yahoo! 후리가나 API(JSON-RPC)를 사용합니다.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::try_join_all;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::ExternalError;

const FURIGANA_URL: &str = "https://jlp.yahooapis.jp/FuriganaService/V2/furigana";

#[async_trait]
pub trait ReadingConverter: Send + Sync {
    async fn to_reading(&self, text: &str) -> Result<String, ExternalError>;
}

/// 여러 문장을 동시에 변환합니다. 하나라도 실패하면 전체가 실패합니다.
pub async fn convert_all(converter: &dyn ReadingConverter, texts: &[String]) -> Result<Vec<String>, ExternalError> {
    try_join_all(texts.iter().map(|text| converter.to_reading(text))).await
}

/// 클라이언트 ID가 설정되지 않았을 때 쓰는 구현
pub struct DisabledReadingConverter;

#[async_trait]
impl ReadingConverter for DisabledReadingConverter {
    async fn to_reading(&self, _text: &str) -> Result<String, ExternalError> {
        Err(ExternalError::NotConfigured("YAHOO_CLIENT_ID"))
    }
}

#[derive(Clone)]
pub struct YahooFuriganaClient {
    client: Client,
    client_id: String,
}

#[derive(Debug, Deserialize)]
struct FuriganaResponse {
    result: Option<FuriganaResult>,
    error: Option<FuriganaError>,
}

#[derive(Debug, Deserialize)]
struct FuriganaResult {
    #[serde(default)]
    word: Vec<Word>,
}

#[derive(Debug, Deserialize)]
struct Word {
    surface: String,
    furigana: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FuriganaError {
    message: String,
}

impl YahooFuriganaClient {
    pub fn new(client_id: impl Into<String>) -> Result<Self, ExternalError> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            client,
            client_id: client_id.into(),
        })
    }
}

#[async_trait]
impl ReadingConverter for YahooFuriganaClient {
    async fn to_reading(&self, text: &str) -> Result<String, ExternalError> {
        let body = json!({
            "id": "keydojo-1",
            "jsonrpc": "2.0",
            "method": "jlp.furiganaservice.furigana",
            "params": { "q": text },
        });

        let response: FuriganaResponse = self
            .client
            .post(FURIGANA_URL)
            .header("User-Agent", format!("Yahoo AppID: {}", self.client_id))
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(error) = response.error {
            return Err(ExternalError::Provider(error.message));
        }
        let result = response.result.ok_or(ExternalError::EmptyResponse)?;
        Ok(join_reading(result.word))
    }
}

/// 단어별 후리가나를 이어 붙입니다. 후리가나가 없는 단어(히라가나, 기호 등)는 표기 그대로.
fn join_reading(words: Vec<Word>) -> String {
    words
        .into_iter()
        .map(|w| w.furigana.unwrap_or(w.surface))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Upper;

    #[async_trait]
    impl ReadingConverter for Upper {
        async fn to_reading(&self, text: &str) -> Result<String, ExternalError> {
            if text.is_empty() {
                return Err(ExternalError::EmptyResponse);
            }
            Ok(text.to_uppercase())
        }
    }

    #[tokio::test]
    async fn convert_all_keeps_input_order() {
        let texts = vec!["abc".to_string(), "xy".to_string()];
        let readings = convert_all(&Upper, &texts).await.unwrap();
        assert_eq!(readings, vec!["ABC", "XY"]);
    }

    #[tokio::test]
    async fn convert_all_fails_if_any_text_fails() {
        let texts = vec!["abc".to_string(), String::new()];
        assert!(convert_all(&Upper, &texts).await.is_err());
    }

    #[test]
    fn words_without_furigana_keep_their_surface() {
        let response: FuriganaResponse = serde_json::from_value(json!({
            "result": { "word": [
                { "surface": "漢字", "furigana": "かんじ" },
                { "surface": "を" },
                { "surface": "読む", "furigana": "よむ" }
            ]}
        }))
        .unwrap();
        assert_eq!(join_reading(response.result.unwrap().word), "かんじをよむ");
    }
}
