//! End-to-end router tests over an in-memory SQLite database.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header::CONTENT_TYPE, Request, StatusCode};
use axum::Router;
use chrono::{Datelike, NaiveDate, Utc};
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use users_rest::{Service, UsersRepository};

async fn test_router() -> Router {
    // One connection so every query sees the same in-memory database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("connect in-memory sqlite");
    let repo = UsersRepository::new(pool);
    repo.init_schema().await.expect("init schema");
    users_rest::router(Arc::new(Service::new(repo)))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("send request");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn payload(name: &str, email: &str, birth_date: &str) -> Value {
    json!({
        "name": name,
        "email": email,
        "password": "secret",
        "cpf": "52998224725",
        "birthDate": birth_date,
        "avatar": "https://example.com/a.png"
    })
}

async fn create(app: &Router, name: &str, email: &str, birth_date: &str) -> Value {
    let (status, body) = send(
        app,
        json_request("POST", "/api/users", &payload(name, email, birth_date)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
    body
}

/// Completed calendar years from `birth` until today.
fn years_since(birth: NaiveDate) -> i64 {
    let today = Utc::now().date_naive();
    let mut age = i64::from(today.year() - birth.year());
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}

#[tokio::test]
async fn empty_list_answers_message_object() {
    let app = test_router().await;

    let (status, body) = send(&app, get("/api/users")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "No users found");
}

#[tokio::test]
async fn create_omits_password_but_list_carries_it() {
    let app = test_router().await;

    let created = create(&app, "ada", "ada@example.com", "1990-05-10").await;
    assert!(created.get("password").is_none());
    assert!(!created["id"].as_str().unwrap().is_empty());
    assert_eq!(created["email"], "ada@example.com");
    assert_eq!(created["birthDate"], "1990-05-10");
    assert!(created.get("createdAt").is_some());

    let (status, body) = send(&app, get("/api/users")).await;
    assert_eq!(status, StatusCode::OK);
    let users = body.as_array().expect("array body");
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["password"], "secret");
}

#[tokio::test]
async fn create_rejects_missing_and_blank_fields() {
    let app = test_router().await;

    let mut body = payload("ada", "ada@example.com", "1990-05-10");
    body.as_object_mut().unwrap().remove("avatar");
    let (status, response) = send(&app, json_request("POST", "/api/users", &body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["message"], "All fields are required");

    let mut body = payload("ada", "ada@example.com", "1990-05-10");
    body["name"] = json!("   ");
    let (status, response) = send(&app, json_request("POST", "/api/users", &body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["message"], "All fields are required");
}

#[tokio::test]
async fn create_rejects_duplicate_email() {
    let app = test_router().await;
    create(&app, "ada", "ada@example.com", "1990-05-10").await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/users",
            &payload("impostor", "ada@example.com", "1991-01-01"),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email already registered");
}

#[tokio::test]
async fn list_orders_by_name_descending() {
    let app = test_router().await;
    create(&app, "ada", "ada@example.com", "1990-05-10").await;
    create(&app, "bea", "bea@example.com", "1992-03-01").await;

    let (_, body) = send(&app, get("/api/users")).await;
    let users = body.as_array().expect("array body");

    assert_eq!(users[0]["name"], "bea");
    assert_eq!(users[1]["name"], "ada");
}

#[tokio::test]
async fn get_user_by_id_and_not_found() {
    let app = test_router().await;
    let created = create(&app, "ada", "ada@example.com", "1990-05-10").await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = send(&app, get(&format!("/api/users/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"].as_str(), Some(id));
    assert_eq!(body["password"], "secret");

    let (status, body) = send(&app, get("/api/users/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");
}

#[tokio::test]
async fn update_merges_partial_body() {
    let app = test_router().await;
    let created = create(&app, "ada", "ada@example.com", "1990-05-10").await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/users/{id}"),
            &json!({ "name": "grace" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "grace");
    // Untouched fields survive the merge, password included.
    assert_eq!(body["email"], "ada@example.com");
    assert_eq!(body["password"], "secret");
    assert_eq!(body["birthDate"], "1990-05-10");

    let (status, _) = send(&app, get(&format!("/api/users/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn update_unknown_id_is_not_found() {
    let app = test_router().await;

    let (status, body) = send(
        &app,
        json_request("PUT", "/api/users/nope", &json!({ "name": "x" })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");
}

#[tokio::test]
async fn delete_succeeds_once_then_404s() {
    let app = test_router().await;
    let created = create(&app, "ada", "ada@example.com", "1990-05-10").await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = send(&app, delete(&format!("/api/users/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null, "delete answers an empty body");

    let (status, body) = send(&app, delete(&format!("/api/users/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");
}

#[tokio::test]
async fn average_age_is_404_with_zero_when_empty() {
    let app = test_router().await;

    let (status, body) = send(&app, get("/api/users/age")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["media_idade"], 0);
    assert!(body.get("message").is_some());
}

#[tokio::test]
async fn average_age_is_the_rounded_mean() {
    let app = test_router().await;
    create(&app, "ada", "ada@example.com", "1990-05-10").await;
    create(&app, "bea", "bea@example.com", "2000-05-10").await;

    let (status, body) = send(&app, get("/api/users/age")).await;
    assert_eq!(status, StatusCode::OK);

    let a = years_since(NaiveDate::from_ymd_opt(1990, 5, 10).unwrap());
    let b = years_since(NaiveDate::from_ymd_opt(2000, 5, 10).unwrap());
    let expected = ((a + b) as f64 / 2.0).round() as i64;
    assert_eq!(body["media_idade"], expected);
}

#[tokio::test]
async fn new_users_is_404_when_window_is_empty() {
    let app = test_router().await;

    let (status, body) = send(&app, get("/api/users/new")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No new users in the last 7 days");
}

#[tokio::test]
async fn freshly_created_users_appear_in_the_window() {
    let app = test_router().await;
    create(&app, "ada", "ada@example.com", "1990-05-10").await;
    create(&app, "bea", "bea@example.com", "1992-03-01").await;

    let (status, body) = send(&app, get("/api/users/new")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    let entries = body["novos_users"].as_array().expect("novos_users array");
    let emails: Vec<&str> = entries
        .iter()
        .map(|u| u["email"].as_str().unwrap())
        .collect();
    assert!(emails.contains(&"ada@example.com"));
    assert!(emails.contains(&"bea@example.com"));
}
