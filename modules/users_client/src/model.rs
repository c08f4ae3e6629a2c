use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A user record as the backend serves it.
///
/// `password` travels in plain text on most responses but is omitted from
/// the create response, hence the `default`. Field names on the wire are the
/// backend's camelCase ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub cpf: String,
    #[serde(rename = "birthDate")]
    pub birth_date: NaiveDate,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body for `POST /users`. Every field is required by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPayload {
    pub name: String,
    pub email: String,
    pub password: String,
    pub cpf: String,
    #[serde(rename = "birthDate")]
    pub birth_date: NaiveDate,
    pub avatar: Option<String>,
}

/// Partial body for `PUT /users/{id}`; unspecified fields keep their stored
/// values on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpf: Option<String>,
    #[serde(rename = "birthDate", skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// One entry of the 7-day "new users" response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUserEntry {
    pub email: String,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// `GET /users/new` response; `novos_users` is the backend's wire name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUsersResponse {
    #[serde(rename = "novos_users")]
    pub new_users: Vec<NewUserEntry>,
    pub total: u32,
}

/// `GET /users/age` response; `media_idade` is the backend's wire name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AverageAgeResponse {
    #[serde(rename = "media_idade")]
    pub average_age: u32,
}
