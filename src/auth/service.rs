use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::db::models::{NewUser, PublicUser, User};
use crate::db::store::UserStore;
use crate::error::{AppError, AuthError};
use crate::messaging::is_valid_phone;

const MIN_PASSWORD_LEN: usize = 8;

// Verified against when the email is unknown, so both failures cost one bcrypt check
const DUMMY_PASSWORD: &str = "no-such-account";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,   // User ID
    pub email: String,
    pub name: String,
    pub exp: i64,      // Expiration time
    pub iat: i64,      // Issued at
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAccount {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub mobile_number: Option<String>,
    pub location: Option<String>,
}

/// Result of a successful login or signup.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: PublicUser,
}

/// The single authentication path: one user store, one token format.
pub struct AuthService {
    users: Arc<dyn UserStore>,
    jwt_secret: String,
    token_ttl: Duration,
    hash_cost: u32,
    dummy_hash: OnceCell<String>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, jwt_secret: String, token_expiry_hours: i64) -> Self {
        Self {
            users,
            jwt_secret,
            token_ttl: Duration::hours(token_expiry_hours),
            hash_cost: bcrypt::DEFAULT_COST,
            dummy_hash: OnceCell::new(),
        }
    }

    /// Override the bcrypt cost for new hashes; tests use the minimum.
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    /// Compute the unknown-account hash ahead of the first login.
    pub async fn prime(&self) -> Result<(), AppError> {
        self.dummy_hash().await.map(|_| ())
    }

    async fn dummy_hash(&self) -> Result<&str, AppError> {
        let cost = self.hash_cost;
        self.dummy_hash
            .get_or_try_init(|| hash_password(DUMMY_PASSWORD.to_string(), cost))
            .await
            .map(String::as_str)
    }

    pub async fn authenticate(&self, credentials: &Credentials) -> Result<Session, AppError> {
        let email = credentials.email.trim();
        if email.is_empty() {
            return Err(AppError::validation("Email is required"));
        }
        if credentials.password.is_empty() {
            return Err(AppError::validation("Password is required"));
        }

        // Unknown email and wrong password must be indistinguishable to the caller
        let user = match self.users.find_user_by_email(email).await? {
            Some(user) => user,
            None => {
                debug!("No account for {}", email);
                let dummy = self.dummy_hash().await?;
                verify_password(&credentials.password, dummy).await?;
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        if !verify_password(&credentials.password, &user.password_hash).await? {
            debug!("Password mismatch for {}", email);
            return Err(AuthError::InvalidCredentials.into());
        }

        info!("User {} authenticated", user.id);
        self.start_session(user)
    }

    pub async fn register(&self, account: NewAccount) -> Result<Session, AppError> {
        let full_name = account.full_name.trim();
        let email = account.email.trim();
        if full_name.is_empty() {
            return Err(AppError::validation("Full name is required"));
        }
        if !is_plausible_email(email) {
            return Err(AppError::validation("A valid email is required"));
        }
        if account.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        let mobile_number = account
            .mobile_number
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty());
        if let Some(mobile) = &mobile_number {
            if !is_valid_phone(mobile) {
                return Err(AppError::validation("Invalid mobile number"));
            }
        }

        let password_hash = hash_password(account.password, self.hash_cost).await?;
        let user = self
            .users
            .create_user(NewUser {
                full_name: full_name.to_string(),
                email: email.to_string(),
                password_hash,
                mobile_number,
                location: account.location.filter(|l| !l.trim().is_empty()),
            })
            .await?;

        info!("Registered user {}", user.id);
        self.start_session(user)
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AppError> {
        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )?;

        Ok(claims.claims)
    }

    /// Resolve a bearer token to the user it was issued for.
    pub async fn current_user(&self, token: &str) -> Result<PublicUser, AppError> {
        let claims = self.verify_token(token)?;
        let id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;

        match self.users.find_user_by_id(id).await? {
            Some(user) => Ok(user.into()),
            None => {
                warn!("Token for unknown user {}", id);
                Err(AuthError::InvalidToken.into())
            }
        }
    }

    fn start_session(&self, user: User) -> Result<Session, AppError> {
        let (token, expires_at) = self.generate_token(&user)?;
        Ok(Session {
            token,
            expires_at,
            user: user.into(),
        })
    }

    fn generate_token(&self, user: &User) -> Result<(String, DateTime<Utc>), AppError> {
        let now = Utc::now();
        let exp = (now + self.token_ttl).timestamp();
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            name: user.full_name.clone(),
            exp,
            iat: now.timestamp(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?;

        let expires_at = Utc
            .timestamp_opt(exp, 0)
            .single()
            .ok_or_else(|| AppError::InternalError("token expiry out of range".into()))?;

        Ok((token, expires_at))
    }
}

// bcrypt is deliberately slow; keep it off the async workers
async fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let password = password.to_string();
    let hash = hash.to_string();
    let outcome = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

    match outcome {
        Ok(matches) => Ok(matches),
        Err(e) => {
            // A malformed stored hash is a data problem, not a caller problem
            warn!("Stored password hash could not be verified: {}", e);
            Ok(false)
        }
    }
}

async fn hash_password(password: String, cost: u32) -> Result<String, AppError> {
    let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))??;
    Ok(hashed)
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}
