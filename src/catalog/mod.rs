//! Vendor and event reads, reshaped for the frontend.

pub mod handlers;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::db::models::{EventRecord, Vendor};

pub const DEFAULT_MIN_GUESTS: i32 = 50;
pub const DEFAULT_MAX_GUESTS: i32 = 500;

/// URL-safe slug: lowercase alphanumerics joined by single dashes.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// First whole amount in a display price. Grouping commas and spaces are
/// skipped, the fractional part is dropped.
///
/// `"₹50,000"` → `50000`; `"₹1,50,000 - ₹2,00,000"` → `150000`.
pub fn parse_currency(text: &str) -> Option<u64> {
    let mut digits = String::new();
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch.is_ascii_digit() {
            digits.push(ch);
        } else if !digits.is_empty() {
            let continues = matches!(ch, ',' | ' ')
                && chars.peek().map_or(false, |next| next.is_ascii_digit());
            if !continues {
                break;
            }
        }
    }

    digits.parse().ok()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventSummary {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub base_price: u64,
    pub min_guests: i32,
    pub max_guests: i32,
}

impl From<EventRecord> for EventSummary {
    fn from(event: EventRecord) -> Self {
        let base_price = event.avg_budget.as_deref().and_then(parse_currency).unwrap_or(0);
        let min_guests = event.min_guests.unwrap_or(DEFAULT_MIN_GUESTS);
        // A bound below the minimum is treated as missing
        let max_guests = event
            .max_guests
            .filter(|max| *max >= min_guests)
            .unwrap_or_else(|| DEFAULT_MAX_GUESTS.max(min_guests));

        Self {
            id: event.id,
            slug: slugify(&event.name),
            name: event.name,
            description: event.description,
            image: event.image_url,
            base_price,
            min_guests,
            max_guests,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VendorSummary {
    pub id: Uuid,
    pub name: String,
    pub categories: Vec<String>,
    pub category_slugs: Vec<String>,
    pub rating: f64,
    pub price: Option<String>,
    pub base_price: Option<u64>,
    pub location: Option<String>,
    pub portfolio_images: Vec<String>,
    pub availability: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Vendor> for VendorSummary {
    fn from(vendor: Vendor) -> Self {
        Self {
            id: vendor.id,
            name: vendor.name,
            category_slugs: vendor.categories.iter().map(|c| slugify(c)).collect(),
            categories: vendor.categories,
            rating: vendor.rating.unwrap_or(0.0),
            base_price: vendor.price.as_deref().and_then(parse_currency),
            price: vendor.price,
            location: vendor.location,
            portfolio_images: vendor.portfolio_images.unwrap_or_default(),
            availability: vendor.availability,
            created_at: vendor.created_at,
            updated_at: vendor.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventTypeCount {
    pub name: String,
    pub count: usize,
}

/// Count event types, most frequent first; ties go alphabetically.
pub fn aggregate_event_types<I, S>(names: I) -> Vec<EventTypeCount>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut counts: HashMap<String, usize> = HashMap::new();
    for name in names {
        let name = name.as_ref().trim();
        if !name.is_empty() {
            *counts.entry(name.to_string()).or_insert(0) += 1;
        }
    }

    let mut types: Vec<EventTypeCount> = counts
        .into_iter()
        .map(|(name, count)| EventTypeCount { name, count })
        .collect();
    types.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    types
}
