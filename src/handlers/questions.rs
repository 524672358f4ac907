// 题目相关接口：列表、删除、新建、搜索、按分类查询

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;

use super::AppState;
use crate::errors::{ApiError, ApiResult};
use crate::models::{
    category_map, CategoryQuestionsResponse, CreateQuestionRequest, CreateQuestionResponse,
    DeleteQuestionResponse, PageQuery, QuestionsResponse, SearchRequest, SearchResponse,
};
use crate::services::{paginate, DbResult, Question};

/// 全部题目及指定页
async fn current_page(state: &AppState, page: u32) -> DbResult<(Vec<Question>, usize)> {
    let all = state.db.call(|db| db.list_questions()).await?;
    let questions = paginate(&all, page).to_vec();
    Ok((questions, all.len()))
}

/// GET /questions?page=N
pub async fn list_questions(
    State(state): State<AppState>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<Json<QuestionsResponse>> {
    let Query(query) = query?;
    let page = query.page()?;

    let (questions, total) = current_page(&state, page).await?;
    if total == 0 {
        return Err(ApiError::not_found());
    }

    let categories = state.db.call(|db| db.list_categories_by_type()).await?;

    log::debug!(
        "Listing page {} ({} of {} questions)",
        page,
        questions.len(),
        total
    );
    Ok(Json(QuestionsResponse {
        success: true,
        questions,
        total_questions: total,
        categories: category_map(categories),
    }))
}

/// DELETE /api/questions/{id}
pub async fn delete_question(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<Json<DeleteQuestionResponse>> {
    let Path(id) = id?;
    let Query(query) = query?;
    let page = query.page()?;

    // 删除流程中任何持久化失败都报告为 422
    let persistence = |e| ApiError::from_persistence("Delete question", e);

    let deleted = state
        .db
        .call(move |db| db.get_question(id))
        .await
        .map_err(persistence)?
        .ok_or_else(ApiError::not_found)?;

    let removed = state
        .db
        .call(move |db| db.delete_question(id))
        .await
        .map_err(persistence)?;
    if !removed {
        return Err(ApiError::not_found());
    }

    log::info!("Deleted question {}", id);

    let (questions, total) = current_page(&state, page).await.map_err(persistence)?;
    Ok(Json(DeleteQuestionResponse {
        success: true,
        deleted,
        questions,
        total_questions: total,
    }))
}

/// POST /api/questions
pub async fn create_question(
    State(state): State<AppState>,
    query: Result<Query<PageQuery>, QueryRejection>,
    payload: Result<Json<CreateQuestionRequest>, JsonRejection>,
) -> ApiResult<Json<CreateQuestionResponse>> {
    let Query(query) = query?;
    let page = query.page()?;
    let Json(request) = payload?;
    let new_question = request.validate()?;
    let persistence = |e| ApiError::from_persistence("Create question", e);

    let created = state
        .db
        .call(move |db| db.insert_question(&new_question))
        .await
        .map_err(persistence)?;

    log::info!("Created question {}", created);

    let (questions, total) = current_page(&state, page).await.map_err(persistence)?;
    Ok(Json(CreateQuestionResponse {
        success: true,
        created,
        questions,
        total_questions: total,
    }))
}

/// POST /api/questions/search
pub async fn search_questions(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> ApiResult<Json<SearchResponse>> {
    let Json(request) = payload?;
    let term = request.term()?.to_string();

    log::debug!("Searching questions for {:?}", term);
    let questions = state.db.call(move |db| db.search_questions(&term)).await?;

    if questions.is_empty() {
        return Err(ApiError::not_found());
    }

    Ok(Json(SearchResponse {
        success: true,
        total_questions: questions.len(),
        questions,
    }))
}

/// GET /api/questions/categories/{id}/questions
pub async fn questions_by_category(
    State(state): State<AppState>,
    category_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<CategoryQuestionsResponse>> {
    let Path(category_id) = category_id?;
    let current_category = state
        .db
        .call(move |db| db.get_category(category_id))
        .await?
        .ok_or_else(ApiError::not_found)?;

    let questions = state
        .db
        .call(move |db| db.questions_by_category(category_id))
        .await?;

    if questions.is_empty() {
        return Err(ApiError::not_found());
    }

    log::debug!(
        "Category {} has {} questions",
        current_category.kind,
        questions.len()
    );
    Ok(Json(CategoryQuestionsResponse {
        success: true,
        total_questions: questions.len(),
        questions,
        current_category,
    }))
}
