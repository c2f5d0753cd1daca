use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;
use tracing::{info, warn};

use crate::auth::service::{Credentials, NewAccount, Session};
use crate::error::{AppError, AuthError};
use crate::AppState;

fn session_body(session: &Session) -> serde_json::Value {
    json!({
        "success": true,
        "token": session.token,
        "expires_at": session.expires_at,
        "user": session.user,
    })
}

async fn login_with(
    path: &str,
    credentials: &Credentials,
    state: &AppState,
) -> Result<HttpResponse, AppError> {
    info!("Received login request on {} for email: {}", path, credentials.email);
    match state.auth.authenticate(credentials).await {
        Ok(session) => {
            info!("Login successful for email: {}", credentials.email);
            Ok(HttpResponse::Ok().json(session_body(&session)))
        }
        Err(e) => {
            warn!("Login failed for email: {}: {}", credentials.email, e);
            Err(e)
        }
    }
}

/// POST /api/auth/login
pub async fn login(
    req: web::Json<Credentials>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    login_with("/api/auth/login", &req, &state).await
}

/// POST /api/auth/passport-login
///
/// Older clients still call this path; it shares the login flow above.
pub async fn passport_login(
    req: web::Json<Credentials>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    login_with("/api/auth/passport-login", &req, &state).await
}

/// POST /api/auth/signup
pub async fn signup(
    req: web::Json<NewAccount>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    info!("Received signup request for email: {}", req.email);
    let email = req.email.clone();

    match state.auth.register(req.into_inner()).await {
        Ok(session) => {
            info!("Signup successful for email: {}", email);
            Ok(HttpResponse::Created().json(session_body(&session)))
        }
        Err(e) => {
            warn!("Signup failed for email: {}: {}", email, e);
            Err(e)
        }
    }
}

/// GET /api/auth/me
pub async fn me(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let token = bearer_token(&req)?;
    let user = state.auth.current_user(token).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "user": user,
    })))
}

fn bearer_token(req: &HttpRequest) -> Result<&str, AppError> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AuthError::MissingToken.into())
}
