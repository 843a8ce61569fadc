use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::account::{AccountError, AccountStore};
use crate::core_types::UserId;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Email already registered")]
    EmailTaken,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account is suspended")]
    Suspended,

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Auth internal error: {0}")]
    Internal(String),
}

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // Subject (user_id as string)
    pub admin: bool, // Admin role flag
    pub exp: usize,  // Expiration time (as UTC timestamp)
    pub iat: usize,  // Issued at
}

impl Claims {
    /// Parse the subject back into a user id
    pub fn user_id(&self) -> Result<UserId, AuthError> {
        self.sub
            .parse::<UserId>()
            .map_err(|_| AuthError::Internal("malformed subject claim".to_string()))
    }
}

/// User Registration Request
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "user1")]
    pub username: String,
    #[schema(example = "user1@example.com")]
    pub email: String,
    #[schema(example = "password123")]
    pub password: String,
}

/// User Login Request
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "user1@example.com")]
    pub email: String,
    #[schema(example = "password123")]
    pub password: String,
}

/// Auth Response (JWT)
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user_id: UserId,
    pub username: String,
    pub email: String,
}

pub struct UserAuthService {
    accounts: Arc<AccountStore>,
    jwt_secret: String,
}

impl UserAuthService {
    pub fn new(accounts: Arc<AccountStore>, jwt_secret: String) -> Self {
        Self {
            accounts,
            jwt_secret,
        }
    }

    /// Register a new user with the configured opening balance
    pub fn register(&self, req: RegisterRequest) -> Result<UserId, AuthError> {
        self.create_account(&req.username, &req.email, &req.password, false)
    }

    /// Create the bootstrap admin account (startup path only)
    pub fn register_admin(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<UserId, AuthError> {
        self.create_account(username, email, password, true)
    }

    fn create_account(
        &self,
        username: &str,
        email: &str,
        password: &str,
        is_admin: bool,
    ) -> Result<UserId, AuthError> {
        // 1. Hash password
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::Internal(format!("Hashing failed: {}", e)))?
            .to_string();

        // 2. Insert into the store
        let account = self
            .accounts
            .create(username, email, &password_hash, is_admin)
            .map_err(|e| match e {
                AccountError::EmailTaken(_) => AuthError::EmailTaken,
                other => AuthError::Internal(other.to_string()),
            })?;

        Ok(account.user_id)
    }

    /// Login user and issue JWT. Suspended accounts are refused even
    /// with valid credentials.
    pub fn login(&self, req: LoginRequest) -> Result<AuthResponse, AuthError> {
        // 1. Find user by email
        let account = self
            .accounts
            .get_by_email(&req.email)
            .ok_or(AuthError::InvalidCredentials)?;

        // 2. Verify password
        let parsed_hash = PasswordHash::new(&account.password_hash)
            .map_err(|e| AuthError::Internal(format!("Invalid hash format: {}", e)))?;

        Argon2::default()
            .verify_password(req.password.as_bytes(), &parsed_hash)
            .map_err(|_| AuthError::InvalidCredentials)?;

        // 3. Suspension gate comes after credential verification, so a
        // wrong password never leaks the suspension state
        if account.is_suspended() {
            return Err(AuthError::Suspended);
        }

        // 4. Generate JWT
        let token = self.issue_token(account.user_id, account.is_admin)?;

        Ok(AuthResponse {
            token,
            user_id: account.user_id,
            username: account.username,
            email: account.email,
        })
    }

    /// Issue an HS256 token with a 24h expiry
    pub fn issue_token(&self, user_id: UserId, is_admin: bool) -> Result<String, AuthError> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(Duration::hours(24))
            .ok_or_else(|| AuthError::Internal("timestamp overflow".to_string()))?
            .timestamp();

        let claims = Claims {
            sub: user_id.to_string(),
            admin: is_admin,
            exp: expiration as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?)
    }

    /// Verify JWT token
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let decoding_key = DecodingKey::from_secret(self.jwt_secret.as_bytes());
        let validation = Validation::new(Algorithm::HS256);
        let token_data = decode::<Claims>(token, &decoding_key, &validation)?;
        Ok(token_data.claims)
    }
}
