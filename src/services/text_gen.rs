//! # 문장 생성 서비스
//!
//! 생성 모드의 연습 문장과 연습 후 코칭 코멘트를 외부 생성형 AI(Gemini)에 요청합니다.
//!
//! 핸들러는 구체 타입 대신 `Arc<dyn TextGenerator>`를 통해 호출하므로,
//! 테스트에서는 가짜 구현으로 바꿔 끼울 수 있습니다.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{tally, ExternalError};
use crate::models::CoachRequest;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// 코칭 코멘트 생성에 실패했을 때 대신 보여줄 문구
pub const FALLBACK_COMMENT: &str = "お疲れさま！最後まで集中できていたね。次もがんばろう！";

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// `theme`에 맞는 연습 문장을 만들어 줄 단위로 반환합니다 (정리 전의 원본 줄).
    async fn generate_sentences(&self, theme: &str, count: usize) -> Result<Vec<String>, ExternalError>;

    /// 이번 연습 성적에 대한 짧은 코멘트를 만듭니다.
    async fn coach_comment(&self, request: &CoachRequest) -> Result<String, ExternalError>;
}

/// 코칭 코멘트를 요청하되, 실패하면 고정 문구로 대체합니다.
///
/// 코멘트는 부가 기능이므로 외부 서비스 장애가 결과 화면을 막으면 안 됩니다.
pub async fn coach_comment_or_fallback(generator: &dyn TextGenerator, request: &CoachRequest) -> String {
    match generator.coach_comment(request).await {
        Ok(comment) => comment,
        Err(e) => {
            tracing::warn!(error = %e, "coach comment generation failed, using fallback");
            FALLBACK_COMMENT.to_string()
        }
    }
}

/// API 키가 설정되지 않았을 때 쓰는 구현. 항상 `NotConfigured`를 반환합니다.
pub struct DisabledTextGenerator;

#[async_trait]
impl TextGenerator for DisabledTextGenerator {
    async fn generate_sentences(&self, _theme: &str, _count: usize) -> Result<Vec<String>, ExternalError> {
        Err(ExternalError::NotConfigured("GEMINI_API_KEY"))
    }

    async fn coach_comment(&self, _request: &CoachRequest) -> Result<String, ExternalError> {
        Err(ExternalError::NotConfigured("GEMINI_API_KEY"))
    }
}

/// Gemini `generateContent` REST API 클라이언트
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<PartIn<'a>>,
}

#[derive(Debug, Serialize)]
struct PartIn<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<PartOut>,
}

#[derive(Debug, Deserialize)]
struct PartOut {
    #[serde(default)]
    text: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, ExternalError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            base_url: GEMINI_BASE_URL.to_string(),
        })
    }

    async fn generate(&self, prompt: &str) -> Result<String, ExternalError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![PartIn { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ExternalError::Provider(format!("{status}: {detail}")));
        }

        let parsed: GenerateResponse = response.json().await?;
        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .map(|c| c.content.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ExternalError::EmptyResponse);
        }
        Ok(text)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate_sentences(&self, theme: &str, count: usize) -> Result<Vec<String>, ExternalError> {
        let prompt = sentence_prompt(theme, count);
        let text = self.generate(&prompt).await?;
        Ok(text.lines().map(str::to_string).collect())
    }

    async fn coach_comment(&self, request: &CoachRequest) -> Result<String, ExternalError> {
        let prompt = coach_prompt(request);
        let text = self.generate(&prompt).await?;
        Ok(text.trim().to_string())
    }
}

fn sentence_prompt(theme: &str, count: usize) -> String {
    format!(
        "あなたはタイピング練習ゲームの出題担当です。\n\
         テーマ「{theme}」に沿った短い日本語の文（テーマによっては英語の文や単語）を{count}個作ってください。\n\
         条件:\n\
         - 難しい漢字や記号は避け、読みやすい文にする\n\
         - ときどき句読点（、。）を含める\n\
         - 1文は20文字程度まで\n\
         - 箇条書きの記号や番号は付けない\n\
         - 1行に1文ずつ、文だけを出力する（挨拶や説明は不要）"
    )
}

fn coach_prompt(request: &CoachRequest) -> String {
    // 多く間違えたキー上位3つだけを伝える
    let missed = tally::top_n(&request.missed_keys, 3)
        .into_iter()
        .map(|entry| format!("{}({}回)", entry.key, entry.count))
        .collect::<Vec<_>>()
        .join(", ");
    let missed = if missed.is_empty() {
        "なし".to_string()
    } else {
        missed
    };

    format!(
        "あなたはタイピング練習ゲームの明るいコーチです。\n\
         今回の成績に、短く前向きなコメント（アドバイスか称賛）をください。\n\
         成績:\n\
         - KPM（1分あたりの打鍵数）: {kpm}\n\
         - 正確率: {accuracy}%\n\
         - よくミスしたキー: {missed}\n\
         条件:\n\
         - 100文字以内\n\
         - 親しみやすい口調で、敬語は使いすぎない\n\
         - KPMが300以上なら大いに褒める\n\
         - 正確率が95%未満なら正確さを意識するよう助言する\n\
         - ミスしたキーがあれば具体的な練習方法を含める\n\
         - 絵文字を1〜2個使う",
        kpm = request.kpm,
        accuracy = request.accuracy,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MissedKeys;

    struct FailingGenerator;

    #[async_trait]
    impl TextGenerator for FailingGenerator {
        async fn generate_sentences(&self, _theme: &str, _count: usize) -> Result<Vec<String>, ExternalError> {
            Err(ExternalError::EmptyResponse)
        }

        async fn coach_comment(&self, _request: &CoachRequest) -> Result<String, ExternalError> {
            Err(ExternalError::Provider("503: overloaded".to_string()))
        }
    }

    fn request(missed: &[(&str, u64)]) -> CoachRequest {
        CoachRequest {
            kpm: 320.0,
            accuracy: 91.5,
            missed_keys: missed
                .iter()
                .map(|(k, c)| (k.to_string(), *c))
                .collect::<MissedKeys>(),
        }
    }

    #[tokio::test]
    async fn failed_comment_falls_back_to_fixed_text() {
        let comment = coach_comment_or_fallback(&FailingGenerator, &request(&[])).await;
        assert_eq!(comment, FALLBACK_COMMENT);

        let comment = coach_comment_or_fallback(&DisabledTextGenerator, &request(&[])).await;
        assert_eq!(comment, FALLBACK_COMMENT);
    }

    #[test]
    fn coach_prompt_lists_top_three_missed_keys() {
        let prompt = coach_prompt(&request(&[("a", 1), ("k", 5), ("s", 2), ("j", 3)]));
        assert!(prompt.contains("k(5回), j(3回), s(2回)"));
        assert!(!prompt.contains("a(1回)"));
        assert!(prompt.contains("320"));
    }

    #[test]
    fn coach_prompt_without_misses() {
        assert!(coach_prompt(&request(&[])).contains("よくミスしたキー: なし"));
    }

    #[test]
    fn sentence_prompt_mentions_theme_and_count() {
        let prompt = sentence_prompt("動物", 7);
        assert!(prompt.contains("テーマ「動物」"));
        assert!(prompt.contains("7個"));
    }
}
