use chrono::{Datelike, Duration, NaiveDate, Utc};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::model::{NewUser, User, UserPatch};
use crate::infra::storage::repo::UsersRepository;

/// Window, in days, for the "new users" aggregate.
const NEW_USERS_WINDOW_DAYS: i64 = 7;

/// Domain service with the (few) business rules of the directory: required
/// fields and email uniqueness on create, merge semantics on update, and
/// the two aggregates.
#[derive(Clone)]
pub struct Service {
    repo: UsersRepository,
}

impl Service {
    pub fn new(repo: UsersRepository) -> Self {
        Self { repo }
    }

    #[instrument(name = "users_rest.service.list_users", skip(self))]
    pub async fn list_users(&self) -> Result<Vec<User>, DomainError> {
        let users = self.repo.list().await?;
        debug!("listed {} users", users.len());
        Ok(users)
    }

    #[instrument(name = "users_rest.service.get_user", skip(self), fields(user_id = %id))]
    pub async fn get_user(&self, id: &str) -> Result<User, DomainError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::user_not_found(id))
    }

    #[instrument(name = "users_rest.service.create_user", skip(self, new_user))]
    pub async fn create_user(&self, new_user: NewUser) -> Result<User, DomainError> {
        let NewUser {
            name,
            email,
            password,
            cpf,
            birth_date,
            avatar,
        } = new_user;

        let name = required(name)?;
        let email = required(email)?;
        let password = required(password)?;
        let cpf = required(cpf)?;
        let birth_date = birth_date.ok_or_else(DomainError::missing_fields)?;
        let avatar = required(avatar)?;

        if self.repo.email_exists(&email).await? {
            return Err(DomainError::email_already_exists(email));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            name,
            email,
            password,
            cpf,
            birth_date,
            avatar: Some(avatar),
            created_at: now,
            updated_at: now,
        };

        self.repo.insert(&user).await?;
        info!(user_id = %user.id, "created user");
        Ok(user)
    }

    /// Merge the patch over the stored record; unspecified fields keep
    /// their values. Returns the merged record.
    #[instrument(name = "users_rest.service.update_user", skip(self, patch), fields(user_id = %id))]
    pub async fn update_user(&self, id: &str, patch: UserPatch) -> Result<User, DomainError> {
        let mut user = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::user_not_found(id))?;

        if let Some(name) = patch.name {
            user.name = name;
        }
        if let Some(email) = patch.email {
            user.email = email;
        }
        if let Some(password) = patch.password {
            user.password = password;
        }
        if let Some(cpf) = patch.cpf {
            user.cpf = cpf;
        }
        if let Some(birth_date) = patch.birth_date {
            user.birth_date = birth_date;
        }
        if let Some(avatar) = patch.avatar {
            user.avatar = Some(avatar);
        }
        user.updated_at = Utc::now();

        self.repo.update(&user).await?;
        info!(user_id = %id, "updated user");
        Ok(user)
    }

    #[instrument(name = "users_rest.service.delete_user", skip(self), fields(user_id = %id))]
    pub async fn delete_user(&self, id: &str) -> Result<(), DomainError> {
        if !self.repo.delete(id).await? {
            return Err(DomainError::user_not_found(id));
        }
        info!(user_id = %id, "deleted user");
        Ok(())
    }

    /// Rounded mean of whole-year ages, or None when nobody has a birth
    /// date on record.
    #[instrument(name = "users_rest.service.average_age", skip(self))]
    pub async fn average_age(&self) -> Result<Option<u32>, DomainError> {
        let dates = self.repo.birth_dates().await?;
        if dates.is_empty() {
            return Ok(None);
        }

        let today = Utc::now().date_naive();
        let sum: i64 = dates.iter().map(|d| i64::from(age_on(today, *d))).sum();
        let mean = (sum as f64 / dates.len() as f64).round() as u32;
        Ok(Some(mean))
    }

    /// Users created inside the trailing 7-day window.
    #[instrument(name = "users_rest.service.new_users", skip(self))]
    pub async fn new_users(&self) -> Result<Vec<User>, DomainError> {
        let cutoff = Utc::now() - Duration::days(NEW_USERS_WINDOW_DAYS);
        self.repo.created_since(cutoff).await
    }
}

fn required(value: Option<String>) -> Result<String, DomainError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(DomainError::missing_fields()),
    }
}

/// Completed years between `birth` and `today` (birthday not yet reached
/// this year subtracts one).
fn age_on(today: NaiveDate, birth: NaiveDate) -> u32 {
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age.max(0) as u32
}
