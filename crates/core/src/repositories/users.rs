//! Account registration and credential checks.

use crate::constants::MIN_PASSWORD_LEN;
use crate::credentials::{hash_password, verify_password};
use crate::models::{NewUser, User, UserRole};
use crate::{Database, EmailAddress, RecordError, RecordResult};
use chrono::Utc;
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct UserService {
    db: Database,
}

impl UserService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create a patient account.
    ///
    /// # Errors
    ///
    /// - [`RecordError::InvalidInput`] if the password is shorter than the minimum length.
    /// - [`RecordError::Conflict`] if the email is already registered.
    pub async fn register(&self, new_user: NewUser) -> RecordResult<User> {
        if new_user.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(RecordError::InvalidInput(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        if self.find_by_email(&new_user.email).await?.is_some() {
            return Err(RecordError::Conflict("user with this email".into()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email.as_str().to_owned(),
            phone: new_user.phone.trim().to_owned(),
            password_hash: hash_password(&new_user.password)?,
            first_name: new_user.first_name.into_inner(),
            last_name: new_user.last_name.into_inner(),
            date_of_birth: None,
            is_email_verified: false,
            is_phone_verified: false,
            role: UserRole::Patient,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO users (id, email, phone, password_hash, first_name, last_name, \
             date_of_birth, is_email_verified, is_phone_verified, role, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.date_of_birth)
        .bind(user.is_email_verified)
        .bind(user.is_phone_verified)
        .bind(user.role)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(self.db.pool())
        .await
        .map_err(|e| RecordError::conflict_on_unique(e, "user with this email"))?;

        tracing::info!("registered user {}", user.id);
        Ok(user)
    }

    /// Check an email and password pair.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidCredentials`] for an unknown email or a wrong password;
    /// the two cases are indistinguishable to callers.
    pub async fn login(&self, email: &EmailAddress, password: &str) -> RecordResult<User> {
        let user = self
            .find_by_email(email)
            .await?
            .ok_or(RecordError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash) {
            return Err(RecordError::InvalidCredentials);
        }
        Ok(user)
    }

    pub async fn get(&self, id: Uuid) -> RecordResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or(RecordError::NotFound("user"))
    }

    pub async fn find_by_email(&self, email: &EmailAddress) -> RecordResult<Option<User>> {
        Ok(
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
                .bind(email.as_str())
                .fetch_optional(self.db.pool())
                .await?,
        )
    }
}
