//! User service.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use forum_common::{AppError, AppResult, IdGenerator, TokenIssuer};
use forum_db::{
    entities::{
        post,
        user::{self, UserRole},
    },
    repositories::{DUPLICATE_EMAIL, PostRepository, UserRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    post_repo: PostRepository,
    tokens: TokenIssuer,
    id_gen: IdGenerator,
}

/// Input for registering a new account.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterInput {
    #[serde(default)]
    #[validate(length(min = 1, max = 128, message = "Name is required"))]
    pub name: String,

    #[serde(default)]
    #[validate(email(message = "A valid email is required"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Input for logging in.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginInput {
    #[serde(default)]
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Input for updating the caller's profile.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProfileInput {
    #[validate(length(min = 1, max = 128))]
    pub name: Option<String>,

    #[validate(length(max = 500))]
    pub bio: Option<String>,

    #[validate(length(min = 1, max = 512))]
    pub image: Option<String>,
}

/// Input for changing the caller's password.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordInput {
    #[serde(default)]
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,

    #[serde(default)]
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub new_password: String,
}

/// Token and account returned by register and login.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: user::Model,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository, post_repo: PostRepository, tokens: TokenIssuer) -> Self {
        Self {
            user_repo,
            post_repo,
            tokens,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new account and sign the caller in.
    pub async fn register(&self, input: RegisterInput) -> AppResult<AuthResponse> {
        let input = RegisterInput {
            email: normalize_email(&input.email),
            name: input.name.trim().to_string(),
            ..input
        };
        input.validate()?;

        if self.user_repo.find_by_email(&input.email).await?.is_some() {
            return Err(AppError::BadRequest(DUPLICATE_EMAIL.to_string()));
        }

        let password_hash = hash_password(&input.password)?;

        let now = Utc::now();
        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(input.name),
            email: Set(input.email),
            password_hash: Set(password_hash),
            bio: Set(None),
            image: Set(user::DEFAULT_IMAGE.to_string()),
            role: Set(UserRole::User),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let user = self.user_repo.create(model).await?;
        tracing::info!(user_id = %user.id, "Registered user");

        let token = self.tokens.issue(&user.id)?;
        Ok(AuthResponse { token, user })
    }

    /// Check credentials and issue a token.
    pub async fn login(&self, input: LoginInput) -> AppResult<AuthResponse> {
        input.validate()?;

        let invalid = || AppError::BadRequest("Invalid email or password".to_string());

        let user = self
            .user_repo
            .find_by_email(&normalize_email(&input.email))
            .await?
            .ok_or_else(invalid)?;

        if !verify_password(&input.password, &user.password_hash)? {
            tracing::debug!(user_id = %user.id, "Rejected login");
            return Err(invalid());
        }

        let token = self.tokens.issue(&user.id)?;
        Ok(AuthResponse { token, user })
    }

    /// Resolve a bearer token to its user.
    pub async fn authenticate(&self, token: &str) -> AppResult<user::Model> {
        let claims = self.tokens.verify(token)?;

        self.user_repo
            .find_by_id(&claims.sub)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Get a user by ID.
    pub async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// Update the caller's profile.
    pub async fn update_profile(
        &self,
        user: user::Model,
        input: UpdateProfileInput,
    ) -> AppResult<user::Model> {
        input.validate()?;

        let mut active: user::ActiveModel = user.into();
        if let Some(name) = input.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(bio) = input.bio {
            active.bio = Set(Some(bio));
        }
        if let Some(image) = input.image {
            active.image = Set(image);
        }
        active.updated_at = Set(Utc::now().into());

        self.user_repo.update(active).await
    }

    /// Change the caller's password after checking the current one.
    pub async fn change_password(
        &self,
        user: user::Model,
        input: ChangePasswordInput,
    ) -> AppResult<()> {
        input.validate()?;

        if !verify_password(&input.current_password, &user.password_hash)? {
            return Err(AppError::BadRequest(
                "Current password is incorrect".to_string(),
            ));
        }

        let password_hash = hash_password(&input.new_password)?;
        let user_id = user.id.clone();

        let mut active: user::ActiveModel = user.into();
        active.password_hash = Set(password_hash);
        active.updated_at = Set(Utc::now().into());
        self.user_repo.update(active).await?;

        tracing::info!(user_id = %user_id, "Changed password");
        Ok(())
    }

    /// Posts authored by a user, newest first.
    pub async fn threads(&self, user_id: &str) -> AppResult<Vec<post::Model>> {
        self.post_repo.find_by_author(user_id).await
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
