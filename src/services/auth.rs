// src/services/auth.rs
use crate::db::DbPool;
use crate::error::AppError;
use crate::models::auth::{AuthSession, Claims, User, UserResponse};
use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

#[derive(Clone)]
pub struct AuthService {
    pool: DbPool,
    jwt_secret: String,
    token_ttl: Duration,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(pool: DbPool, jwt_secret: String, token_ttl_days: i64, bcrypt_cost: u32) -> Self {
        Self {
            pool,
            jwt_secret,
            token_ttl: Duration::days(token_ttl_days),
            bcrypt_cost,
        }
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        password_confirm: &str,
    ) -> Result<AuthSession, AppError> {
        let name = name.trim();
        let email = normalize_email(email);

        if name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(AppError::BadRequest(
                "Name, email, and password are required".to_string(),
            ));
        }
        if password != password_confirm {
            return Err(AppError::BadRequest("Passwords do not match".to_string()));
        }

        tracing::info!(email = %email, "Signup request received");

        let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE email = ?")
            .bind(&email)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(AppError::Conflict("User already exists!".to_string()));
        }

        let password_hash = hash(password, self.bcrypt_cost)?;

        let inserted = sqlx::query_as::<_, User>(
            "INSERT INTO users (name, email, password_hash, created_at)
             VALUES (?, ?, ?, ?)
             RETURNING id, name, email, password_hash, created_at",
        )
        .bind(name)
        .bind(&email)
        .bind(&password_hash)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await;

        let user = match inserted {
            Ok(user) => user,
            // Lost a race with a concurrent registration of the same email.
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                return Err(AppError::Conflict("User already exists!".to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(user_id = user.id, "New user created");

        let token = self.issue_token(&user)?;
        Ok(AuthSession {
            token,
            user: UserResponse::from(user),
        })
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AppError> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(AppError::BadRequest(
                "Email and password are required".to_string(),
            ));
        }

        tracing::info!(email = %email, "Login request received");

        let user = self
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found!".to_string()))?;

        if !verify(password, &user.password_hash)? {
            tracing::warn!(user_id = user.id, "Password validation failed");
            return Err(AppError::Unauthorized("Invalid Email or Password".to_string()));
        }

        let token = self.issue_token(&user)?;
        Ok(AuthSession {
            token,
            user: UserResponse::from(user),
        })
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, created_at FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, created_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub fn issue_token(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(self.token_ttl)
            .ok_or_else(|| AppError::UnexpectedServerError("token expiry overflow".to_string()))?;

        let claims = Claims {
            sub: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            exp: expiration.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?;
        Ok(token)
    }

    /// Checks signature and expiry.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::warn!("JWT verification failed: {}", e);
            AppError::Unauthorized("Invalid or expired token".to_string())
        })
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
