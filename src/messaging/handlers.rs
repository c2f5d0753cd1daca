use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SendRequest {
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub message: String,
}

/// POST /api/whatsapp/send
pub async fn send_message(
    req: web::Json<SendRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let sent = state.messaging.send(&req.to, &req.message)?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message_id": sent.message_id,
        "to": sent.to,
        "status": sent.status,
    })))
}
