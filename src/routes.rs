// 路由表

use axum::http::{header, Method};
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::handlers::{categories, fallback, method_not_allowed, questions, quizzes, AppState};

/// `/api/*` 的跨域策略
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/questions", post(questions::create_question))
        .route("/questions/:id", delete(questions::delete_question))
        .route("/questions/search", post(questions::search_questions))
        .route(
            "/questions/categories/:id/questions",
            get(questions::questions_by_category),
        )
        .route("/quizzes", post(quizzes::play_quiz))
        // 先设置 405 兜底，再套 CORS，预检请求仍由 CORS 处理
        .method_not_allowed_fallback(method_not_allowed)
        .layer(cors_layer())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/categories", get(categories::list_categories))
        .route("/questions", get(questions::list_questions))
        .method_not_allowed_fallback(method_not_allowed)
        .nest("/api", api_routes())
        .fallback(fallback)
        .with_state(state)
}
