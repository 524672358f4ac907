use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use trivia_api::services::NewQuestion;
use trivia_api::{build_router, AppState, DatabaseService};

fn seeded_db() -> DatabaseService {
    let db = DatabaseService::open_in_memory().unwrap();
    db.seed_default_categories().unwrap();
    db
}

fn add_question(db: &DatabaseService, text: &str, category: i64) -> i64 {
    db.insert_question(&NewQuestion {
        question: text.to_string(),
        answer: format!("answer to {}", text),
        category,
        difficulty: 2,
    })
    .unwrap()
}

fn app(db: &DatabaseService) -> Router {
    build_router(AppState::new(db.clone()))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn assert_error(status: StatusCode, body: &Value, expected: StatusCode) {
    assert_eq!(status, expected);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], expected.as_u16());
    assert!(body["message"].is_string());
}

// ==================== 分类 ====================

#[tokio::test]
async fn test_list_categories() {
    let db = seeded_db();
    let (status, body) = send(&app(&db), Method::GET, "/categories", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["categories"]["1"], "Science");
    assert_eq!(body["categories"].as_object().unwrap().len(), 6);
}

#[tokio::test]
async fn test_list_categories_empty_is_not_found() {
    let db = DatabaseService::open_in_memory().unwrap();
    let (status, body) = send(&app(&db), Method::GET, "/categories", None).await;
    assert_error(status, &body, StatusCode::NOT_FOUND);
}

// ==================== 题目列表 ====================

#[tokio::test]
async fn test_list_questions_paginates() {
    let db = seeded_db();
    for i in 0..12 {
        add_question(&db, &format!("question {}", i), 1);
    }
    let app = app(&db);

    let (status, body) = send(&app, Method::GET, "/questions", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["questions"].as_array().unwrap().len(), 10);
    assert_eq!(body["total_questions"], 12);
    assert_eq!(body["categories"]["2"], "Art");

    let (status, body) = send(&app, Method::GET, "/questions?page=2", None).await;
    assert_eq!(status, StatusCode::OK);
    let page = body["questions"].as_array().unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0]["question"], "question 10");
}

#[tokio::test]
async fn test_page_beyond_last_is_empty() {
    let db = seeded_db();
    add_question(&db, "only one", 1);

    let (status, body) = send(&app(&db), Method::GET, "/questions?page=5", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["questions"].as_array().unwrap().is_empty());
    assert_eq!(body["total_questions"], 1);
}

#[tokio::test]
async fn test_no_questions_is_not_found() {
    let db = seeded_db();
    let (status, body) = send(&app(&db), Method::GET, "/questions", None).await;
    assert_error(status, &body, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_page_is_bad_request() {
    let db = seeded_db();
    add_question(&db, "q", 1);
    let app = app(&db);

    for uri in ["/questions?page=0", "/questions?page=-1", "/questions?page=abc"] {
        let (status, body) = send(&app, Method::GET, uri, None).await;
        assert_error(status, &body, StatusCode::BAD_REQUEST);
    }
}

// ==================== 新建与删除 ====================

#[tokio::test]
async fn test_create_list_delete_flow() {
    let db = seeded_db();
    let app = app(&db);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/questions",
        Some(json!({"question": "Q1", "answer": "A1", "difficulty": 3, "category": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["total_questions"], 1);
    let created = body["created"].as_i64().unwrap();

    let (status, body) = send(&app, Method::GET, "/questions", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["questions"]
        .as_array()
        .unwrap()
        .iter()
        .any(|q| q["id"] == created && q["question"] == "Q1"));

    let uri = format!("/api/questions/{}", created);
    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"]["id"], created);
    assert_eq!(body["deleted"]["answer"], "A1");
    assert_eq!(body["total_questions"], 0);

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_error(status, &body, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_unknown_question() {
    let db = seeded_db();
    let app = app(&db);

    let (status, body) = send(&app, Method::DELETE, "/api/questions/999", None).await;
    assert_error(status, &body, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, Method::DELETE, "/api/questions/abc", None).await;
    assert_error(status, &body, StatusCode::NOT_FOUND);
}

/// 在服务之外删除题目表，模拟持久化层故障
fn drop_questions_table(path: &std::path::Path) {
    let conn = rusqlite::Connection::open(path).unwrap();
    conn.execute_batch("DROP TABLE questions").unwrap();
}

#[tokio::test]
async fn test_write_paths_report_store_failures_as_unprocessable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trivia.db");
    let db = DatabaseService::open(&path).unwrap();
    db.seed_default_categories().unwrap();
    let id = add_question(&db, "doomed", 1);
    let app = app(&db);

    drop_questions_table(&path);

    let (status, body) = send(&app, Method::DELETE, &format!("/api/questions/{}", id), None).await;
    assert_error(status, &body, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/questions",
        Some(json!({"question": "Q", "answer": "A", "difficulty": 1, "category": 1})),
    )
    .await;
    assert_error(status, &body, StatusCode::UNPROCESSABLE_ENTITY);

    // 只读接口的同类故障仍是 500
    let (status, body) = send(&app, Method::GET, "/questions", None).await;
    assert_error(status, &body, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_create_accepts_every_valid_difficulty() {
    let db = seeded_db();
    let app = app(&db);

    for difficulty in 1..=5 {
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/questions",
            Some(json!({"question": "Q", "answer": "A", "difficulty": difficulty, "category": 2})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
    assert_eq!(db.count_questions().unwrap(), 5);
}

#[tokio::test]
async fn test_create_rejects_out_of_range_difficulty() {
    let db = seeded_db();
    let app = app(&db);

    for difficulty in [0, 6, -1] {
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/questions",
            Some(json!({"question": "Q", "answer": "A", "difficulty": difficulty, "category": 1})),
        )
        .await;
        assert_error(status, &body, StatusCode::BAD_REQUEST);
    }
    assert_eq!(db.count_questions().unwrap(), 0);
}

#[tokio::test]
async fn test_create_persistence_failures_are_unprocessable() {
    let db = seeded_db();
    let app = app(&db);

    let bodies = [
        json!({"question": "Q", "answer": "A", "difficulty": 2, "category": 99}),
        json!({"question": "Q", "answer": "A", "difficulty": "hard", "category": 1}),
        json!({"question": "Q", "answer": "A", "difficulty": 2}),
    ];
    for payload in bodies {
        let (status, body) = send(&app, Method::POST, "/api/questions", Some(payload)).await;
        assert_error(status, &body, StatusCode::UNPROCESSABLE_ENTITY);
    }
    assert_eq!(db.count_questions().unwrap(), 0);
}

#[tokio::test]
async fn test_create_malformed_json_is_bad_request() {
    let db = seeded_db();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/questions")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app(&db).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ==================== 搜索 ====================

#[tokio::test]
async fn test_search_is_case_insensitive() {
    let db = seeded_db();
    add_question(&db, "What is the Title of this book?", 2);
    add_question(&db, "Who is the author?", 2);

    let (status, body) = send(
        &app(&db),
        Method::POST,
        "/api/questions/search",
        Some(json!({"searchTerm": "title"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_questions"], 1);
    assert_eq!(body["questions"][0]["question"], "What is the Title of this book?");
}

#[tokio::test]
async fn test_search_without_matches() {
    let db = seeded_db();
    add_question(&db, "Something", 1);

    let (status, body) = send(
        &app(&db),
        Method::POST,
        "/api/questions/search",
        Some(json!({"searchTerm": "nothing like it"})),
    )
    .await;
    assert_error(status, &body, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_search_requires_term() {
    let db = seeded_db();
    let app = app(&db);

    for payload in [json!({"searchTerm": ""}), json!({})] {
        let (status, body) = send(&app, Method::POST, "/api/questions/search", Some(payload)).await;
        assert_error(status, &body, StatusCode::BAD_REQUEST);
    }
}

// ==================== 按分类 ====================

#[tokio::test]
async fn test_questions_by_category() {
    let db = seeded_db();
    add_question(&db, "science 1", 1);
    add_question(&db, "art 1", 2);
    add_question(&db, "science 2", 1);

    let (status, body) = send(
        &app(&db),
        Method::GET,
        "/api/questions/categories/1/questions",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let questions = body["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 2);
    assert!(questions.iter().all(|q| q["category"] == 1));
    assert_eq!(body["total_questions"], 2);
    assert_eq!(body["current_category"]["id"], 1);
    assert_eq!(body["current_category"]["type"], "Science");
}

#[tokio::test]
async fn test_questions_by_category_not_found() {
    let db = seeded_db();
    add_question(&db, "science 1", 1);
    let app = app(&db);

    // 分类不存在
    let (status, body) = send(&app, Method::GET, "/api/questions/categories/42/questions", None).await;
    assert_error(status, &body, StatusCode::NOT_FOUND);

    // 分类存在但没有题目
    let (status, body) = send(&app, Method::GET, "/api/questions/categories/3/questions", None).await;
    assert_error(status, &body, StatusCode::NOT_FOUND);
}

// ==================== 答题 ====================

#[tokio::test]
async fn test_quiz_skips_previous_questions() {
    let db = seeded_db();
    let first = add_question(&db, "one", 1);
    let second = add_question(&db, "two", 1);
    let third = add_question(&db, "three", 1);
    add_question(&db, "other category", 2);
    let app = app(&db);

    for _ in 0..20 {
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/quizzes",
            Some(json!({"previous_questions": [first, third], "quiz_category": {"type": "Science", "id": 1}})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["question"]["id"], second);
        assert_eq!(body["total_questions"], 3);
    }
}

#[tokio::test]
async fn test_quiz_all_categories() {
    let db = seeded_db();
    let science = add_question(&db, "science", 1);
    let art = add_question(&db, "art", 2);

    let (status, body) = send(
        &app(&db),
        Method::POST,
        "/api/quizzes",
        Some(json!({"previous_questions": [science], "quiz_category": {"type": "click", "id": 0}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["question"]["id"], art);
    assert_eq!(body["total_questions"], 2);
}

#[tokio::test]
async fn test_quiz_exhausted_terminates() {
    let db = seeded_db();
    let a = add_question(&db, "a", 1);
    let b = add_question(&db, "b", 1);

    let (status, body) = send(
        &app(&db),
        Method::POST,
        "/api/quizzes",
        Some(json!({"previous_questions": [a, b], "quiz_category": {"id": "1"}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["question"].is_null());
}

#[tokio::test]
async fn test_quiz_empty_candidates_is_not_found() {
    let db = seeded_db();
    add_question(&db, "a", 1);

    let (status, body) = send(
        &app(&db),
        Method::POST,
        "/api/quizzes",
        Some(json!({"previous_questions": [], "quiz_category": {"id": 4}})),
    )
    .await;
    assert_error(status, &body, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_quiz_bad_shape_is_unprocessable() {
    let db = seeded_db();
    let (status, body) = send(
        &app(&db),
        Method::POST,
        "/api/quizzes",
        Some(json!({"quiz_category": {"id": 1}})),
    )
    .await;
    assert_error(status, &body, StatusCode::UNPROCESSABLE_ENTITY);
}

// ==================== 其他 ====================

#[tokio::test]
async fn test_cors_preflight_on_api_routes() {
    let db = seeded_db();
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/questions")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();

    let response = app(&db).oneshot(request).await.unwrap();
    let headers = response.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");

    let methods = headers[header::ACCESS_CONTROL_ALLOW_METHODS].to_str().unwrap();
    for method in ["GET", "POST", "PATCH", "DELETE", "OPTIONS"] {
        assert!(methods.contains(method));
    }
    let allowed = headers[header::ACCESS_CONTROL_ALLOW_HEADERS]
        .to_str()
        .unwrap()
        .to_ascii_lowercase();
    assert!(allowed.contains("content-type"));
    assert!(allowed.contains("authorization"));
}

#[tokio::test]
async fn test_wrong_method_is_json_method_not_allowed() {
    let db = seeded_db();
    let app = app(&db);

    for (method, uri) in [
        (Method::GET, "/api/questions"),
        (Method::DELETE, "/api/questions/search"),
        (Method::POST, "/categories"),
    ] {
        let (status, body) = send(&app, method, uri, None).await;
        assert_error(status, &body, StatusCode::METHOD_NOT_ALLOWED);
    }
}

#[tokio::test]
async fn test_unknown_route_is_json_not_found() {
    let db = seeded_db();
    let (status, body) = send(&app(&db), Method::GET, "/nope", None).await;
    assert_error(status, &body, StatusCode::NOT_FOUND);
}
