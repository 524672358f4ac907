use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use super::AppState;
use crate::errors::{ApiError, ApiResult};
use crate::models::{QuizRequest, QuizResponse};
use crate::services::select_unseen;

/// POST /api/quizzes
pub async fn play_quiz(
    State(state): State<AppState>,
    payload: Result<Json<QuizRequest>, JsonRejection>,
) -> ApiResult<Json<QuizResponse>> {
    let Json(request) = payload?;
    let filter = request.quiz_category.filter();

    let candidates = state
        .db
        .call(move |db| match filter {
            Some(category) => db.questions_by_category(category),
            None => db.list_questions(),
        })
        .await?;

    if candidates.is_empty() {
        return Err(ApiError::not_found());
    }

    let question = select_unseen(
        &candidates,
        &request.previous_questions,
        &mut rand::thread_rng(),
    )
    .cloned();

    match &question {
        Some(q) => log::debug!("Quiz picked question {}", q.id),
        None => log::info!(
            "Quiz exhausted after {} questions",
            request.previous_questions.len()
        ),
    }

    Ok(Json(QuizResponse {
        success: true,
        question,
        total_questions: candidates.len(),
    }))
}
