//! Development-only diagnostics. Only mounted when `debug.enabled` is set.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::db::schema::{check_schema as run_schema_check, is_contract_table};
use crate::error::AppError;
use crate::AppState;

const SAMPLE_LIMIT: i64 = 20;

#[derive(Debug, Deserialize)]
pub struct ColumnsQuery {
    pub table: Option<String>,
}

/// GET /api/check-schema
pub async fn check_schema(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let report = run_schema_check(state.schema.as_ref()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "report": report,
    })))
}

/// GET /api/debug-columns?table=vendors
pub async fn debug_columns(
    query: web::Query<ColumnsQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let table = query.table.as_deref().unwrap_or("vendors");
    if !is_contract_table(table) {
        return Err(AppError::validation(format!("Unknown table: {}", table)));
    }

    let columns = state.schema.table_columns(table).await?;
    info!("Debug column listing for {}: {} columns", table, columns.len());

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "table": table,
        "columns": columns,
    })))
}

async fn dump(state: &AppState, table: &str) -> Result<HttpResponse, AppError> {
    let rows = state.schema.sample_rows(table, SAMPLE_LIMIT).await?;
    info!("Debug dump of {}: {} rows", table, rows.len());

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "table": table,
        "count": rows.len(),
        "rows": rows,
    })))
}

/// GET /api/debug-vendors
pub async fn debug_vendors(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    dump(&state, "vendors").await
}

/// GET /api/debug-events
pub async fn debug_events(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    dump(&state, "events").await
}
