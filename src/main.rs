//! # KeyDojo 웹 서버 진입점
//!
//! 타이핑 연습 결과를 저장하고 통계/이력을 제공하는 API 서버입니다.
//!
//! 이 파일이 수행하는 작업:
//! 1. 환경변수(.env) 로딩
//! 2. 로깅(tracing) 초기화
//! 3. SQLite 연결 풀 생성과 마이그레이션
//! 4. 외부 서비스 클라이언트 준비 (설정이 없으면 비활성 구현)
//! 5. API 라우터 설정과 HTTP 서버 시작

mod config;
mod db;
mod error;
mod middleware;
mod models;
mod routes;
mod services;

use std::sync::Arc;

use anyhow::Result;
use config::Config;
use routes::AppState;
use services::{
    reading::{DisabledReadingConverter, ReadingConverter, YahooFuriganaClient},
    text_gen::{DisabledTextGenerator, GeminiClient, TextGenerator},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // .env 파일이 없어도 에러 없이 넘어갑니다.
    dotenvy::dotenv().ok();

    // RUST_LOG 환경변수로 로그 레벨을 제어합니다.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "keydojo=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!("Starting KeyDojo server on {}:{}", config.host, config.port);

    let pool = db::connect(&config.database_url).await?;

    tracing::info!("Running database migrations...");
    db::migrate(&pool).await?;

    // 외부 서비스는 키가 있을 때만 실제 클라이언트를 씁니다.
    let text_generator: Arc<dyn TextGenerator> = match &config.gemini_api_key {
        Some(key) => {
            tracing::info!(model = %config.gemini_model, "text generation enabled");
            Arc::new(GeminiClient::new(key.clone(), config.gemini_model.clone())?)
        }
        None => {
            tracing::warn!("GEMINI_API_KEY not set, text generation disabled");
            Arc::new(DisabledTextGenerator)
        }
    };
    let reading_converter: Arc<dyn ReadingConverter> = match &config.yahoo_client_id {
        Some(client_id) => Arc::new(YahooFuriganaClient::new(client_id.clone())?),
        None => {
            tracing::warn!("YAHOO_CLIENT_ID not set, reading conversion disabled");
            Arc::new(DisabledReadingConverter)
        }
    };

    let state = AppState {
        pool,
        jwt_secret: config.jwt_secret.clone(),
        text_generator,
        reading_converter,
    };

    let app = routes::router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
