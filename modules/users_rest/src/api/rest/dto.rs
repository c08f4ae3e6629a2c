use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::model::{NewUser, User, UserPatch};

/// Full user representation, as `GET`/`PUT` serve it, plain text password
/// included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDto {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub cpf: String,
    #[serde(rename = "birthDate")]
    pub birth_date: NaiveDate,
    pub avatar: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// The create response omits the password.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedUserDto {
    pub id: String,
    pub name: String,
    pub email: String,
    pub cpf: String,
    #[serde(rename = "birthDate")]
    pub birth_date: NaiveDate,
    pub avatar: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Request body for `POST /users`. Everything is required; the service
/// turns missing or blank values into a 400.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserReq {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub cpf: Option<String>,
    #[serde(rename = "birthDate")]
    pub birth_date: Option<NaiveDate>,
    pub avatar: Option<String>,
}

/// Request body for `PUT /users/{id}` (partial).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserReq {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub cpf: Option<String>,
    #[serde(rename = "birthDate")]
    pub birth_date: Option<NaiveDate>,
    pub avatar: Option<String>,
}

/// Plain `{ message }` body used by error responses and the empty-list case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageDto {
    pub message: String,
}

/// `GET /users/new` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUsersDto {
    pub novos_users: Vec<UserDto>,
    pub total: usize,
}

/// `GET /users/age` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AverageAgeDto {
    pub media_idade: u32,
}

// Conversion implementations between REST DTOs and domain models

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            password: user.password,
            cpf: user.cpf,
            birth_date: user.birth_date,
            avatar: user.avatar,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<User> for CreatedUserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            cpf: user.cpf,
            birth_date: user.birth_date,
            avatar: user.avatar,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<CreateUserReq> for NewUser {
    fn from(req: CreateUserReq) -> Self {
        Self {
            name: req.name,
            email: req.email,
            password: req.password,
            cpf: req.cpf,
            birth_date: req.birth_date,
            avatar: req.avatar,
        }
    }
}

impl From<UpdateUserReq> for UserPatch {
    fn from(req: UpdateUserReq) -> Self {
        Self {
            name: req.name,
            email: req.email,
            password: req.password,
            cpf: req.cpf,
            birth_date: req.birth_date,
            avatar: req.avatar,
        }
    }
}
