//! The columns this service reads, and a check of a live store against them.
//!
//! `migrations/` creates exactly this shape. The check runs at startup so a
//! drifted database (e.g. `vendors.portfolio_images` never added) is caught
//! before the first request instead of surfacing as a 500.

use serde::Serialize;
use tracing::{info, warn};

use crate::db::store::SchemaInspector;
use crate::error::DatabaseError;

pub const SCHEMA_CONTRACT: &[(&str, &[&str])] = &[
    (
        "users",
        &["id", "full_name", "email", "password_hash", "mobile_number", "location", "created_at"],
    ),
    (
        "vendors",
        &[
            "id",
            "name",
            "categories",
            "rating",
            "price",
            "location",
            "portfolio_images",
            "availability",
            "created_at",
            "updated_at",
        ],
    ),
    (
        "events",
        &["id", "name", "description", "image_url", "avg_budget", "min_guests", "max_guests"],
    ),
    ("community_stories", &["id", "event_type", "is_published"]),
];

/// Tables the debug endpoints may dump. `users` holds password hashes and is never listed.
const DUMPABLE_TABLES: &[&str] = &["vendors", "events", "community_stories"];

pub fn is_contract_table(table: &str) -> bool {
    SCHEMA_CONTRACT.iter().any(|(name, _)| *name == table)
}

pub fn is_dumpable_table(table: &str) -> bool {
    DUMPABLE_TABLES.contains(&table)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableReport {
    pub table: String,
    pub exists: bool,
    pub present: Vec<String>,
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaReport {
    pub ok: bool,
    pub tables: Vec<TableReport>,
}

impl SchemaReport {
    /// `table.column` for every missing column.
    pub fn missing_columns(&self) -> Vec<String> {
        self.tables
            .iter()
            .flat_map(|t| t.missing.iter().map(move |c| format!("{}.{}", t.table, c)))
            .collect()
    }

    pub fn into_result(self) -> Result<Self, DatabaseError> {
        if self.ok {
            Ok(self)
        } else {
            Err(DatabaseError::SchemaDrift(self.missing_columns()))
        }
    }
}

pub async fn check_schema(inspector: &dyn SchemaInspector) -> Result<SchemaReport, DatabaseError> {
    let mut tables = Vec::with_capacity(SCHEMA_CONTRACT.len());

    for (table, expected) in SCHEMA_CONTRACT {
        let actual = inspector.table_columns(table).await?;
        let (present, missing): (Vec<&str>, Vec<&str>) = expected
            .iter()
            .copied()
            .partition(|column| actual.iter().any(|a| a.as_str() == *column));

        if !missing.is_empty() {
            warn!("Table {} is missing columns: {}", table, missing.join(", "));
        }

        tables.push(TableReport {
            table: table.to_string(),
            exists: !actual.is_empty(),
            present: present.into_iter().map(str::to_string).collect(),
            missing: missing.into_iter().map(str::to_string).collect(),
        });
    }

    let ok = tables.iter().all(|t| t.missing.is_empty());
    if ok {
        info!("Schema matches contract ({} tables)", tables.len());
    }

    Ok(SchemaReport { ok, tables })
}
