//! Identity and credential store
//!
//! Account registration, credential checks and profile maintenance. The
//! user store's unique constraints are the final word on email and phone
//! collisions; the lookups here only produce the error earlier.

use hms_auth::PasswordService;
use hms_core::config::SeedAccount;
use hms_core::models::{normalize_email, EmployeeSearchField, ProfileUpdate, User, UserRole};
use hms_core::traits::{Page, Pagination, UserRepository};
use hms_core::{AppError, AppResult};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Data for a new account
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub phone_number: String,
    pub role: UserRole,
}

impl NewAccount {
    pub fn from_seed(seed: &SeedAccount, role: UserRole) -> Self {
        Self {
            full_name: seed.full_name.clone(),
            email: seed.email.clone(),
            password: seed.password.clone(),
            phone_number: seed.phone_number.clone(),
            role,
        }
    }
}

/// Account management over a user repository
pub struct IdentityService<U: ?Sized> {
    users: Arc<U>,
    passwords: PasswordService,
}

impl<U: UserRepository + ?Sized> IdentityService<U> {
    pub fn new(users: Arc<U>, passwords: PasswordService) -> Self {
        Self { users, passwords }
    }

    /// Create an active account
    #[instrument(skip(self, account), fields(email = %account.email, role = %account.role))]
    pub async fn register(&self, account: NewAccount) -> AppResult<User> {
        let email = normalize_email(&account.email);
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::EmailExists);
        }
        if self.users.find_by_phone(&account.phone_number).await?.is_some() {
            return Err(AppError::PhoneExists);
        }

        let user = User {
            full_name: account.full_name,
            email,
            phone_number: account.phone_number,
            password_hash: self.passwords.hash_password(&account.password)?,
            role: account.role,
            active: true,
            ..Default::default()
        };

        let user = self.users.create(&user).await?;
        info!(user_id = user.id, "Account registered");
        Ok(user)
    }

    /// Check a login attempt: lookup, then hash, then the active flag
    #[instrument(skip(self, password))]
    pub async fn verify_credentials(&self, email: &str, password: &str) -> AppResult<User> {
        let user = self
            .users
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        self.passwords.check(password, &user.password_hash)?;

        if !user.can_login() {
            warn!(user_id = user.id, "Login attempt on inactive account");
            return Err(AppError::AccountNotActive);
        }

        Ok(user)
    }

    pub async fn get(&self, user_id: i32) -> AppResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::UserNotFound)
    }

    /// Apply a partial profile update
    ///
    /// Only the supplied columns are written, so a concurrent change of the
    /// account's active flag is never overwritten.
    #[instrument(skip(self))]
    pub async fn update_profile(&self, user_id: i32, mut update: ProfileUpdate) -> AppResult<User> {
        let user = self.get(user_id).await?;
        if update.is_empty() {
            return Ok(user);
        }

        update.email = update.email.as_deref().map(normalize_email);
        if let Some(email) = update.email.as_deref() {
            if let Some(other) = self.users.find_by_email(email).await? {
                if other.id != user_id {
                    return Err(AppError::EmailExists);
                }
            }
        }
        if let Some(phone) = update.phone_number.as_deref() {
            if let Some(other) = self.users.find_by_phone(phone).await? {
                if other.id != user_id {
                    return Err(AppError::PhoneExists);
                }
            }
        }

        let user = self
            .users
            .update_profile(user_id, &update)
            .await?
            .ok_or(AppError::UserNotFound)?;
        debug!(user_id, "Profile updated");
        Ok(user)
    }

    #[instrument(skip(self, current, new_password))]
    pub async fn change_password(
        &self,
        user_id: i32,
        current: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let user = self.get(user_id).await?;
        self.passwords.check(current, &user.password_hash)?;

        let hash = self.passwords.hash_password(new_password)?;
        if !self.users.set_password_hash(user_id, &hash).await? {
            return Err(AppError::UserNotFound);
        }
        info!(user_id, "Password changed");
        Ok(())
    }

    /// Flip another account's active flag
    #[instrument(skip(self))]
    pub async fn toggle_active(&self, caller_id: i32, target_id: i32) -> AppResult<User> {
        if caller_id == target_id {
            return Err(AppError::forbidden("cannot change the state of your own account"));
        }

        let user = self
            .users
            .toggle_active(target_id)
            .await?
            .ok_or(AppError::UserNotFound)?;
        info!(user_id = user.id, active = user.active, "Account state toggled");
        Ok(user)
    }

    pub async fn list_employees(
        &self,
        keyword: Option<&str>,
        field: EmployeeSearchField,
        pagination: Pagination,
    ) -> AppResult<Page<User>> {
        let (users, total) = self
            .users
            .list_by_role(
                UserRole::Employee,
                keyword,
                field,
                pagination.limit(),
                pagination.offset(),
            )
            .await?;
        Ok(Page::new(users, total, pagination))
    }

    /// Create the account unless its email is already registered
    ///
    /// Returns the new user, or `None` when nothing had to be created.
    pub async fn ensure_account(&self, seed: &SeedAccount, role: UserRole) -> AppResult<Option<User>> {
        if self
            .users
            .find_by_email(&normalize_email(&seed.email))
            .await?
            .is_some()
        {
            debug!(email = %seed.email, "Seed account already present");
            return Ok(None);
        }
        self.register(NewAccount::from_seed(seed, role)).await.map(Some)
    }
}
