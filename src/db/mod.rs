//! # 데이터베이스 접근 계층 (Data Access Layer)
//!
//! 데이터베이스와 직접 상호작용하는 함수들을 모아둔 모듈입니다.
//! 라우트 핸들러(routes/)와 서비스(services/)에서 이 모듈의 함수를 호출하여 DB 작업을 수행합니다.
//!
//! 각 하위 모듈:
//! - `catalog`: 장르와 문제 CRUD, 추출 후보 조회
//! - `sessions`: 타이핑 세션 저장(트랜잭션)과 조회, 통계용 집계 쿼리
//! - `users`: 사용자 인증 관련 쿼리

pub mod catalog;
pub mod sessions;
pub mod users;

pub use catalog::*;
pub use sessions::*;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

/// SQLite 연결 풀을 만듭니다.
///
/// - `create_if_missing`: DB 파일이 없으면 새로 만듭니다.
/// - `foreign_keys`: 세션 → 사용자/장르 참조 무결성을 DB가 검사하게 합니다.
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
}

/// `./migrations` 폴더의 SQL 파일들을 아직 적용되지 않은 것만 순서대로 실행합니다.
/// `sqlx::migrate!`는 컴파일 타임에 SQL 파일을 바이너리에 포함시킵니다.
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

#[cfg(test)]
pub mod testing {
    //! 테스트용 인메모리 DB와 기본 데이터

    use super::*;

    /// 마이그레이션이 적용된 인메모리 DB.
    ///
    /// 인메모리 DB는 연결마다 따로 생기므로 연결을 하나로 고정하고,
    /// 유휴 연결이 닫혀 데이터가 사라지지 않도록 타임아웃을 끕니다.
    pub async fn test_pool() -> SqlitePool {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .unwrap()
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .expect("should open in-memory database");
        migrate(&pool).await.expect("migrations should apply");
        pool
    }

    /// 비밀번호 해시 없이 사용자 한 명을 만들고 ID를 반환합니다.
    pub async fn seed_user(pool: &SqlitePool, name: &str) -> String {
        let id = uuid::Uuid::now_v7().to_string();
        super::users::create_user(pool, &id, name, &format!("{name}@example.com"), "not-a-hash")
            .await
            .expect("should create user");
        id
    }

    pub async fn seed_genre(pool: &SqlitePool, name: &str) -> i64 {
        super::catalog::create_genre(pool, name)
            .await
            .expect("should create genre")
            .id
    }
}
