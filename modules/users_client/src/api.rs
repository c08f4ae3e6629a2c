use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tracing::instrument;
use url::Url;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::model::{AverageAgeResponse, NewUsersResponse, User, UserPatch, UserPayload};

/// Port to the remote user collection. The store depends on this trait, not
/// on the HTTP adapter, so tests can substitute transports.
#[async_trait]
pub trait UsersApi: Send + Sync {
    /// `GET /users`. Non-array bodies (the backend's empty-case message
    /// object) are coerced to an empty list.
    async fn list(&self) -> Result<Vec<User>, ClientError>;

    /// `GET /users/{id}`.
    async fn get(&self, id: &str) -> Result<User, ClientError>;

    /// `POST /users`.
    async fn create(&self, payload: &UserPayload) -> Result<User, ClientError>;

    /// `PUT /users/{id}` with a partial body.
    async fn update(&self, id: &str, patch: &UserPatch) -> Result<User, ClientError>;

    /// `DELETE /users/{id}`.
    async fn delete(&self, id: &str) -> Result<(), ClientError>;

    /// `GET /users/new`, users created in the last 7 days.
    async fn new_users(&self) -> Result<NewUsersResponse, ClientError>;

    /// `GET /users/age`, the rounded mean age.
    async fn average_age(&self) -> Result<AverageAgeResponse, ClientError>;
}

/// Reqwest adapter for [`UsersApi`]. Owns transport details only: URL
/// assembly, timeout, status mapping and JSON decoding.
pub struct HttpUsersApi {
    client: Client,
    base: Url,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

impl HttpUsersApi {
    /// Build an adapter from config, with an explicit request timeout.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self::with_client(client, config.api_url.clone()))
    }

    /// Build an adapter around an existing client (tests, shared pools).
    pub fn with_client(client: Client, base: Url) -> Self {
        Self { client, base }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::invalid("API base URL cannot be a base"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Map a non-success response to the error taxonomy: 404 is not-found,
/// 400 covers both missing fields and duplicate emails, the rest keep
/// their status. The server's `{ message }` body is carried when present.
async fn error_from_response(response: Response) -> ClientError {
    let status = response.status();
    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.message)
        .unwrap_or_default();

    match status {
        StatusCode::NOT_FOUND => ClientError::not_found(message),
        StatusCode::BAD_REQUEST => ClientError::invalid(message),
        _ => ClientError::api(status, message),
    }
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    if response.status().is_success() {
        Ok(response.json::<T>().await?)
    } else {
        Err(error_from_response(response).await)
    }
}

#[async_trait]
impl UsersApi for HttpUsersApi {
    #[instrument(name = "users_client.http.list", skip_all, fields(base = %self.base))]
    async fn list(&self) -> Result<Vec<User>, ClientError> {
        let url = self.endpoint(&["users"])?;
        let response = self.client.get(url).send().await?;
        let value: serde_json::Value = decode(response).await?;

        // The backend answers `{ message }` instead of `[]` when the table
        // is empty; anything that is not an array counts as empty.
        match value {
            serde_json::Value::Array(_) => Ok(serde_json::from_value(value)?),
            _ => Ok(Vec::new()),
        }
    }

    #[instrument(name = "users_client.http.get", skip_all, fields(user_id = %id))]
    async fn get(&self, id: &str) -> Result<User, ClientError> {
        let url = self.endpoint(&["users", id])?;
        let response = self.client.get(url).send().await?;
        decode(response).await
    }

    #[instrument(name = "users_client.http.create", skip_all, fields(email = %payload.email))]
    async fn create(&self, payload: &UserPayload) -> Result<User, ClientError> {
        let url = self.endpoint(&["users"])?;
        let response = self.client.post(url).json(payload).send().await?;
        decode(response).await
    }

    #[instrument(name = "users_client.http.update", skip_all, fields(user_id = %id))]
    async fn update(&self, id: &str, patch: &UserPatch) -> Result<User, ClientError> {
        let url = self.endpoint(&["users", id])?;
        let response = self.client.put(url).json(patch).send().await?;
        decode(response).await
    }

    #[instrument(name = "users_client.http.delete", skip_all, fields(user_id = %id))]
    async fn delete(&self, id: &str) -> Result<(), ClientError> {
        let url = self.endpoint(&["users", id])?;
        let response = self.client.delete(url).send().await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(error_from_response(response).await)
        }
    }

    #[instrument(name = "users_client.http.new_users", skip_all)]
    async fn new_users(&self) -> Result<NewUsersResponse, ClientError> {
        let url = self.endpoint(&["users", "new"])?;
        let response = self.client.get(url).send().await?;
        decode(response).await
    }

    #[instrument(name = "users_client.http.average_age", skip_all)]
    async fn average_age(&self) -> Result<AverageAgeResponse, ClientError> {
        let url = self.endpoint(&["users", "age"])?;
        let response = self.client.get(url).send().await?;
        decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_appends_segments_to_base_path() {
        let api = HttpUsersApi::with_client(
            Client::new(),
            Url::parse("http://localhost:4000/api").unwrap(),
        );
        assert_eq!(
            api.endpoint(&["users"]).unwrap().as_str(),
            "http://localhost:4000/api/users"
        );
        assert_eq!(
            api.endpoint(&["users", "abc-1"]).unwrap().as_str(),
            "http://localhost:4000/api/users/abc-1"
        );
    }

    #[test]
    fn endpoint_handles_root_path_base() {
        let api = HttpUsersApi::with_client(
            Client::new(),
            Url::parse("http://localhost:4000").unwrap(),
        );
        assert_eq!(
            api.endpoint(&["users"]).unwrap().as_str(),
            "http://localhost:4000/users"
        );
    }
}
