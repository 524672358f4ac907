// 请求与响应数据结构

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::errors::{ApiError, ApiResult};
use crate::services::{Category, NewQuestion, Question};

pub const MIN_DIFFICULTY: i64 = 1;
pub const MAX_DIFFICULTY: i64 = 5;

/// id → 分类名称
pub type CategoryMap = BTreeMap<i64, String>;

pub fn category_map(categories: Vec<Category>) -> CategoryMap {
    categories.into_iter().map(|c| (c.id, c.kind)).collect()
}

// ==================== 请求 ====================

/// 分页查询参数
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    /// 未提供时为第 1 页，必须是正整数
    pub fn page(&self) -> ApiResult<u32> {
        match self.page.as_deref().map(str::trim) {
            None | Some("") => Ok(1),
            Some(raw) => match raw.parse::<u32>() {
                Ok(page) if page >= 1 => Ok(page),
                _ => Err(ApiError::BadRequest(format!(
                    "page: expected a positive integer, got {:?}",
                    raw
                ))),
            },
        }
    }
}

/// 新建题目
#[derive(Debug, Clone, Deserialize)]
pub struct CreateQuestionRequest {
    pub question: String,
    pub answer: String,
    #[serde(deserialize_with = "int_or_numeric_string")]
    pub difficulty: i64,
    #[serde(deserialize_with = "int_or_numeric_string")]
    pub category: i64,
}

impl CreateQuestionRequest {
    /// 难度必须在 1..=5
    pub fn validate(self) -> ApiResult<NewQuestion> {
        if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&self.difficulty) {
            return Err(ApiError::BadRequest(format!(
                "difficulty: must be between {} and {}, got {}",
                MIN_DIFFICULTY, MAX_DIFFICULTY, self.difficulty
            )));
        }

        Ok(NewQuestion {
            question: self.question,
            answer: self.answer,
            category: self.category,
            difficulty: self.difficulty as i32,
        })
    }
}

/// 搜索
#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    #[serde(rename = "searchTerm", default)]
    pub search_term: Option<String>,
}

impl SearchRequest {
    pub fn term(&self) -> ApiResult<&str> {
        match self.search_term.as_deref() {
            Some(term) if !term.is_empty() => Ok(term),
            _ => Err(ApiError::BadRequest(
                "searchTerm: must be a non-empty string".to_string(),
            )),
        }
    }
}

/// 答题模式
#[derive(Debug, Clone, Deserialize)]
pub struct QuizRequest {
    pub previous_questions: Vec<i64>,
    pub quiz_category: QuizCategory,
}

/// id 为 0 表示全部分类
#[derive(Debug, Clone, Deserialize)]
pub struct QuizCategory {
    #[serde(deserialize_with = "int_or_numeric_string")]
    pub id: i64,
}

impl QuizCategory {
    pub fn filter(&self) -> Option<i64> {
        (self.id != 0).then_some(self.id)
    }
}

/// 前端会把对象键（字符串）当作 id 传回
fn int_or_numeric_string<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IntOrString {
        Int(i64),
        Str(String),
    }

    match IntOrString::deserialize(deserializer)? {
        IntOrString::Int(v) => Ok(v),
        IntOrString::Str(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid integer {:?}", s))),
    }
}

// ==================== 响应 ====================

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: u16,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoriesResponse {
    pub success: bool,
    pub categories: CategoryMap,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuestionsResponse {
    pub success: bool,
    pub questions: Vec<Question>,
    pub total_questions: usize,
    pub categories: CategoryMap,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteQuestionResponse {
    pub success: bool,
    pub deleted: Question,
    pub questions: Vec<Question>,
    pub total_questions: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateQuestionResponse {
    pub success: bool,
    pub created: i64,
    pub questions: Vec<Question>,
    pub total_questions: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub success: bool,
    pub questions: Vec<Question>,
    pub total_questions: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryQuestionsResponse {
    pub success: bool,
    pub questions: Vec<Question>,
    pub total_questions: usize,
    pub current_category: Category,
}

/// `question` 为 null 表示该分类题目已全部答过
#[derive(Debug, Serialize, Deserialize)]
pub struct QuizResponse {
    pub success: bool,
    pub question: Option<Question>,
    pub total_questions: usize,
}
