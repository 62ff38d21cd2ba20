mod common;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use common::{Fixture, seed};
use lms_portal::{create_router, models::AdminDashboardStats};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower::ServiceExt;
use uuid::Uuid;

// --- Helpers ---

struct TestApp {
    router: Router,
    fixture: Fixture,
}

async fn spawn_router() -> TestApp {
    let fixture = seed().await;
    TestApp {
        router: create_router(fixture.state.clone()),
        fixture,
    }
}

/// Sends one request through the full middleware stack. `as_user` uses the local
/// `x-user-id` bypass, which `AppConfig::default()` enables.
async fn send(app: &TestApp, method: Method, uri: &str, as_user: Option<Uuid>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user_id) = as_user {
        builder = builder.header("x-user-id", user_id.to_string());
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

// --- Tests ---

#[tokio::test]
async fn test_health_check() {
    let app = spawn_router().await;

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let address = format!("http://{}", listener.local_addr().unwrap());
    let router = app.router.clone();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let response = reqwest::Client::new()
        .get(format!("{}/health", address))
        .send()
        .await
        .expect("req fail");

    assert!(response.status().is_success());
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_openapi_document_served() {
    let app = spawn_router().await;

    let (status, doc) = send(&app, Method::GET, "/api-docs/openapi.json", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/quizzes/{id}/submit"].is_object());
}

#[tokio::test]
async fn test_catalog_is_public() {
    let app = spawn_router().await;

    let (status, courses) = send(&app, Method::GET, "/courses?search=operating", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(courses.as_array().unwrap().len(), 1);
    assert_eq!(courses[0]["price"], "1000.00");

    let (status, _) = send(&app, Method::GET, "/categories", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let uri = format!("/reviews?course={}", app.fixture.course.id);
    let (status, reviews) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(reviews.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_writes_need_authentication() {
    let app = spawn_router().await;
    let payload = json!({
        "title": "Anonymous course",
        "description": "Should never exist",
        "category_id": app.fixture.category.id,
    });

    let (status, _) = send(&app, Method::POST, "/courses", None, Some(payload.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, Method::POST, "/courses", Some(app.fixture.student.id), Some(payload.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "wrong_role");

    let (status, body) = send(&app, Method::POST, "/courses", Some(app.fixture.instructor.id), Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["instructor_id"], app.fixture.instructor.id.to_string());
}

#[tokio::test]
async fn test_course_data_over_http() {
    let app = spawn_router().await;
    let uri = format!("/course-data/{}", app.fixture.course.id);

    let (status, body) = send(&app, Method::GET, &uri, Some(app.fixture.outsider.id), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "not_enrolled");

    let (status, tree) = send(&app, Method::GET, &uri, Some(app.fixture.student.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tree["title"], "Operating Systems");
    let contents = tree["lessons"][0]["contents"].as_array().unwrap();
    assert_eq!(contents.len(), 2);
    assert_eq!(contents[1]["body"]["type"], "quiz");
    assert!(contents[1]["body"]["data"]["questions"][0].get("answer").is_none());
}

#[tokio::test]
async fn test_quiz_submission_once_over_http() {
    let app = spawn_router().await;
    let uri = format!("/quizzes/{}/submit", app.fixture.quiz.id);
    let answers = json!({ "answers": { "0": "A", "1": "B", "2": "C", "3": "A" } });

    let (status, result) = send(&app, Method::POST, &uri, Some(app.fixture.student.id), Some(answers.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(result["score"], 75.0);

    let (status, body) = send(&app, Method::POST, &uri, Some(app.fixture.student.id), Some(answers)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "already_submitted");
}

#[tokio::test]
async fn test_grade_validation_over_http() {
    let app = spawn_router().await;
    let uri = format!("/enrollments/{}/grade", app.fixture.enrollment.id);

    let (status, body) = send(&app, Method::PUT, &uri, Some(app.fixture.instructor.id), Some(json!({ "grade": "Z" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_grade");

    let (status, body) = send(&app, Method::PUT, &uri, Some(app.fixture.instructor.id), Some(json!({ "grade": "A+" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["grade"], "A+");
}

#[tokio::test]
async fn test_review_round_trip_updates_course_rating() {
    let app = spawn_router().await;
    let payload = json!({
        "course_id": app.fixture.course.id,
        "rating": 5,
        "comment": "Best course I've taken",
    });

    let (status, _) = send(&app, Method::POST, "/reviews", Some(app.fixture.student.id), Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);

    let uri = format!("/courses/{}", app.fixture.course.id);
    let (status, course) = send(&app, Method::GET, &uri, Some(app.fixture.outsider.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(course["average_rating"], 5.0);
}

#[tokio::test]
async fn test_admin_routes_require_staff() {
    let app = spawn_router().await;

    let (status, _) = send(&app, Method::GET, "/admin/stats", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, Method::GET, "/admin/stats", Some(app.fixture.instructor.id), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "wrong_role");

    let (status, body) = send(&app, Method::GET, "/admin/stats", Some(app.fixture.staff.id), None).await;
    assert_eq!(status, StatusCode::OK);
    let stats: AdminDashboardStats = serde_json::from_value(body).unwrap();
    assert_eq!(stats.total_users, 5);
    assert_eq!(stats.total_courses, 1);
    assert_eq!(stats.total_enrollments, 1);
    assert_eq!(stats.total_reviews, 0);
}

#[tokio::test]
async fn test_me_returns_profile() {
    let app = spawn_router().await;

    let (status, me) = send(&app, Method::GET, "/me", Some(app.fixture.student.id), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "linus");
    assert_eq!(me["role"], "student");
}

#[tokio::test]
async fn test_register_without_provider_is_server_error() {
    let app = spawn_router().await;
    let payload = json!({
        "username": "newbie",
        "email": "newbie@example.com",
        "password": "hunter22",
        "is_student": true,
    });

    let (status, body) = send(&app, Method::POST, "/register", None, Some(payload)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "internal");
}

#[tokio::test]
async fn test_register_rejects_both_roles_before_calling_provider() {
    let app = spawn_router().await;
    let payload = json!({
        "username": "greedy",
        "email": "greedy@example.com",
        "password": "hunter22",
        "is_student": true,
        "is_instructor": true,
    });

    let (status, body) = send(&app, Method::POST, "/register", None, Some(payload)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "conflicting_roles");
}

#[tokio::test]
async fn test_catalog_lists_instructor_and_category_names() {
    let app = spawn_router().await;

    let (status, courses) = send(&app, Method::GET, "/courses", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(courses[0]["title"], "Operating Systems");
    assert_eq!(courses[0]["instructor_name"], "ada");
    assert_eq!(courses[0]["category_name"], "Systems");
}

#[tokio::test]
async fn test_profile_patch_route() {
    let app = spawn_router().await;
    let payload = json!({ "bio": "Writes schedulers" });

    let (status, _) = send(&app, Method::PATCH, "/me", None, Some(payload.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, profile) = send(&app, Method::PATCH, "/me", Some(app.fixture.student.id), Some(payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["bio"], "Writes schedulers");
    assert_eq!(profile["username"], "linus");
}

#[tokio::test]
async fn test_admin_user_management_routes() {
    let app = spawn_router().await;

    let (status, _) = send(&app, Method::GET, "/admin/users", Some(app.fixture.student.id), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, users) = send(&app, Method::GET, "/admin/users", Some(app.fixture.staff.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users.as_array().unwrap().len(), 5);

    let uri = format!("/admin/users/{}", app.fixture.outsider.id);
    let (status, _) = send(&app, Method::DELETE, &uri, Some(app.fixture.staff.id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, stats) = send(&app, Method::GET, "/admin/stats", Some(app.fixture.staff.id), None).await;
    assert_eq!(stats["total_users"], 4);
}
