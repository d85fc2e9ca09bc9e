use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Genre {
    pub id: i64,
    pub name: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Problem {
    pub id: i64,
    pub genre_id: i64,
    pub problem_text: String,
    pub created_at: String,
}

/// 장르 이름을 JOIN해서 가져온 문제 (연습 화면, 관리 화면 목록용)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProblemWithGenre {
    pub id: i64,
    pub genre_id: i64,
    pub genre_name: String,
    pub problem_text: String,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct GenreRequest {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProblemRequest {
    pub genre_id: Option<i64>,
    pub problem_text: Option<String>,
}

/// 관리 화면 문제 목록 페이지
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemPage {
    pub problems: Vec<ProblemWithGenre>,
    pub total_pages: i64,
    pub current_page: i64,
}
