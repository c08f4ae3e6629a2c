use chrono::{DateTime, NaiveDate, Utc};

/// A stored user record. The password travels in plain text; the wire
/// contract expects it on every read except the create response.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub cpf: String,
    pub birth_date: NaiveDate,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a user. Every field is required by the API; the
/// service rejects missing or blank values before touching storage.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub cpf: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub avatar: Option<String>,
}

/// Partial update; unspecified fields keep their stored values.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub cpf: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub avatar: Option<String>,
}
