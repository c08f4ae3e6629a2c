use std::sync::Arc;

use axum::{
    extract::Path,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Extension,
};
use tracing::{error, info};

use crate::api::rest::dto::{
    AverageAgeDto, CreateUserReq, CreatedUserDto, MessageDto, NewUsersDto, UpdateUserReq, UserDto,
};
use crate::domain::error::DomainError;
use crate::domain::service::Service;

fn message(text: &str) -> Json<MessageDto> {
    Json(MessageDto {
        message: text.to_string(),
    })
}

/// Map domain errors to HTTP status codes plus a `{ message }` body.
fn error_response(error: &DomainError) -> Response {
    let (status, text) = match error {
        DomainError::UserNotFound { .. } => (StatusCode::NOT_FOUND, "User not found".to_string()),
        DomainError::EmailAlreadyExists { .. } => {
            (StatusCode::BAD_REQUEST, "Email already registered".to_string())
        }
        DomainError::MissingFields => {
            (StatusCode::BAD_REQUEST, "All fields are required".to_string())
        }
        DomainError::Database { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        ),
    };
    (status, Json(MessageDto { message: text })).into_response()
}

/// List all users. An empty table answers `{ message }` instead of `[]`;
/// the client coerces that to an empty list.
pub async fn list_users(Extension(svc): Extension<Arc<Service>>) -> Response {
    match svc.list_users().await {
        Ok(users) if users.is_empty() => message("No users found").into_response(),
        Ok(users) => {
            let dto: Vec<UserDto> = users.into_iter().map(UserDto::from).collect();
            Json(dto).into_response()
        }
        Err(e) => {
            error!("Failed to list users: {}", e);
            error_response(&e)
        }
    }
}

/// Rounded mean age, 404 with a zeroed value when no birth dates exist.
pub async fn average_age(Extension(svc): Extension<Arc<Service>>) -> Response {
    match svc.average_age().await {
        Ok(Some(media_idade)) => Json(AverageAgeDto { media_idade }).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "media_idade": 0,
                "message": "No users with a birth date on record"
            })),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to compute average age: {}", e);
            error_response(&e)
        }
    }
}

/// Users created in the last 7 days, 404 when there are none.
pub async fn new_users(Extension(svc): Extension<Arc<Service>>) -> Response {
    match svc.new_users().await {
        Ok(users) if users.is_empty() => (
            StatusCode::NOT_FOUND,
            message("No new users in the last 7 days"),
        )
            .into_response(),
        Ok(users) => {
            let total = users.len();
            let novos_users: Vec<UserDto> = users.into_iter().map(UserDto::from).collect();
            Json(NewUsersDto { novos_users, total }).into_response()
        }
        Err(e) => {
            error!("Failed to list new users: {}", e);
            error_response(&e)
        }
    }
}

/// Get a specific user by ID
pub async fn get_user(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
) -> Response {
    match svc.get_user(&id).await {
        Ok(user) => Json(UserDto::from(user)).into_response(),
        Err(e) => {
            error!("Failed to get user {}: {}", id, e);
            error_response(&e)
        }
    }
}

/// Create a new user
pub async fn create_user(
    Extension(svc): Extension<Arc<Service>>,
    Json(req): Json<CreateUserReq>,
) -> Response {
    match svc.create_user(req.into()).await {
        Ok(user) => {
            info!(user_id = %user.id, "created user");
            (StatusCode::CREATED, Json(CreatedUserDto::from(user))).into_response()
        }
        Err(e) => {
            error!("Failed to create user: {}", e);
            error_response(&e)
        }
    }
}

/// Update an existing user
pub async fn update_user(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserReq>,
) -> Response {
    match svc.update_user(&id, req.into()).await {
        Ok(user) => Json(UserDto::from(user)).into_response(),
        Err(e) => {
            error!("Failed to update user {}: {}", id, e);
            error_response(&e)
        }
    }
}

/// Delete a user by ID. Success is a 200 with an empty body.
pub async fn delete_user(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
) -> Response {
    match svc.delete_user(&id).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => {
            error!("Failed to delete user {}: {}", id, e);
            error_response(&e)
        }
    }
}
