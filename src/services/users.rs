//! Authentication and user management service

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{
        CreateManager, Identity, NewUser, RegisterUser, Role, UpdateUser, User, UserClaims,
        ADMINISTRATOR_GROUP, EMPLOYEE_GROUP, MANAGER_GROUP,
    },
    repository::Store,
};

/// A freshly issued token together with who it belongs to
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: User,
    pub role: Role,
}

#[derive(Clone)]
pub struct UsersService {
    store: Arc<dyn Store>,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(store: Arc<dyn Store>, config: AuthConfig) -> Self {
        Self { store, config }
    }

    /// Authenticate by username and password
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<Session> {
        let user = self
            .store
            .user_get_by_username(username)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid username or password".to_string()))?;

        if !self.verify_password(&user, password)? {
            return Err(AppError::Authentication("Invalid username or password".to_string()));
        }
        if !user.is_active {
            return Err(AppError::Authentication("Account is disabled".to_string()));
        }

        let role = self.role_of(&user).await?;
        let token = self.issue_token(&user)?;
        tracing::info!(user_id = user.id, role = %role, "User logged in");
        Ok(Session { token, user, role })
    }

    /// Self-registration: new accounts join the employee group and are logged in
    pub async fn register(&self, data: RegisterUser) -> AppResult<Session> {
        data.validate()?;
        let new_user = NewUser {
            username: data.username,
            password_hash: self.hash_password(&data.password)?,
            email: data.email,
            first_name: data.first_name,
            last_name: data.last_name,
        };
        let user = self.create_in_group(&new_user, EMPLOYEE_GROUP).await?;
        let token = self.issue_token(&user)?;
        Ok(Session {
            token,
            user,
            role: Role::Employee,
        })
    }

    /// Create a manager account
    pub async fn create_manager(&self, data: CreateManager) -> AppResult<User> {
        data.validate()?;
        let new_user = NewUser {
            username: data.username,
            password_hash: self.hash_password(&data.password)?,
            email: Some(data.email),
            first_name: data.first_name,
            last_name: data.last_name,
        };
        self.create_in_group(&new_user, MANAGER_GROUP).await
    }

    /// Create the first administrator unless one already exists.
    ///
    /// Returns the new account, or `None` when nothing was created.
    pub async fn ensure_admin(&self, username: &str, password: &str) -> AppResult<Option<User>> {
        if !self.store.user_list_in_group(ADMINISTRATOR_GROUP).await?.is_empty() {
            return Ok(None);
        }
        if self.store.user_get_by_username(username).await?.is_some() {
            tracing::warn!(username, "Cannot seed administrator: username is taken");
            return Ok(None);
        }
        let new_user = NewUser {
            username: username.to_string(),
            password_hash: self.hash_password(password)?,
            email: None,
            first_name: None,
            last_name: None,
        };
        let user = self.create_in_group(&new_user, ADMINISTRATOR_GROUP).await?;
        tracing::info!(user_id = user.id, "Initial administrator created");
        Ok(Some(user))
    }

    async fn create_in_group(&self, new_user: &NewUser, group: &str) -> AppResult<User> {
        if self.store.user_get_by_username(&new_user.username).await?.is_some() {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }
        let user = self.store.user_create(new_user, group).await?;
        tracing::info!(user_id = user.id, group, "User created");
        Ok(user)
    }

    /// Resolve a bearer token into the acting identity.
    ///
    /// The role is recomputed from the user's current groups every time.
    pub async fn identify(&self, token: &str) -> AppResult<Identity> {
        let claims = UserClaims::from_token(token, &self.config.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        let user = match self.store.user_get(claims.user_id).await {
            Ok(user) => user,
            Err(AppError::NotFound(_)) => {
                return Err(AppError::Authentication("Unknown user".to_string()))
            }
            Err(e) => return Err(e),
        };
        if !user.is_active {
            return Err(AppError::Authentication("Account is disabled".to_string()));
        }

        let groups = self.store.user_groups(user.id).await?;
        Ok(Identity {
            user_id: user.id,
            username: user.username,
            role: Role::from_membership(user.is_superuser, groups.as_slice()),
            groups,
        })
    }

    pub async fn role_of(&self, user: &User) -> AppResult<Role> {
        let groups = self.store.user_groups(user.id).await?;
        Ok(Role::from_membership(user.is_superuser, groups.as_slice()))
    }

    /// Create a signed token for a user
    pub fn issue_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.username.clone(),
            user_id: user.id,
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash a password using Argon2
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    pub async fn get(&self, id: i32) -> AppResult<User> {
        self.store.user_get(id).await
    }

    pub async fn list(&self) -> AppResult<Vec<User>> {
        self.store.user_list().await
    }

    pub async fn update(&self, id: i32, data: &UpdateUser) -> AppResult<User> {
        data.validate()?;
        if let Some(ref username) = data.username {
            if let Some(existing) = self.store.user_get_by_username(username).await? {
                if existing.id != id {
                    return Err(AppError::Conflict("Username already exists".to_string()));
                }
            }
        }
        self.store.user_update(id, data).await
    }

    /// Delete a user. Administrators cannot delete themselves.
    pub async fn delete(&self, actor: &Identity, id: i32) -> AppResult<()> {
        if actor.user_id == id {
            return Err(AppError::BusinessRule("You cannot delete your own account".to_string()));
        }
        self.store.user_delete(id).await?;
        tracing::info!(user_id = id, deleted_by = actor.user_id, "User deleted");
        Ok(())
    }
}
