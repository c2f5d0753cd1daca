use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::catalog::{aggregate_event_types, EventSummary, VendorSummary};
use crate::db::models::VendorFilter;
use crate::error::{AppError, DatabaseError};
use crate::AppState;

/// GET /api/events
pub async fn list_events(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let events: Vec<EventSummary> = state
        .catalog
        .list_events()
        .await?
        .into_iter()
        .map(EventSummary::from)
        .collect();

    info!("Returning {} events", events.len());
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "events": events,
    })))
}

/// GET /api/event-types
pub async fn list_event_types(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let names = state.catalog.published_story_event_types().await?;
    let event_types = aggregate_event_types(&names);

    info!("Aggregated {} event types from {} stories", event_types.len(), names.len());
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "event_types": event_types,
    })))
}

/// GET /api/vendors
pub async fn list_vendors(
    query: web::Query<VendorFilter>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let filter = normalize_filter(query.into_inner())?;
    let vendors: Vec<VendorSummary> = state
        .catalog
        .list_vendors(&filter)
        .await?
        .into_iter()
        .map(VendorSummary::from)
        .collect();

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "vendors": vendors,
    })))
}

/// GET /api/vendors/{id}
pub async fn get_vendor(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id = Uuid::parse_str(&path).map_err(|_| AppError::validation("Invalid vendor id"))?;
    let vendor = state
        .catalog
        .get_vendor(id)
        .await?
        .ok_or(DatabaseError::NotFound)?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "vendor": VendorSummary::from(vendor),
    })))
}

fn normalize_filter(filter: VendorFilter) -> Result<VendorFilter, AppError> {
    if let Some(rating) = filter.min_rating {
        if !(0.0..=5.0).contains(&rating) {
            return Err(AppError::validation("min_rating must be between 0 and 5"));
        }
    }

    let blank_to_none = |value: Option<String>| {
        value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
    };

    Ok(VendorFilter {
        category: blank_to_none(filter.category),
        location: blank_to_none(filter.location),
        min_rating: filter.min_rating,
    })
}
