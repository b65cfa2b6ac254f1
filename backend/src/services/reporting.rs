//! Reporting service for ledger export

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::models::{Action, Resource, TransactionRecord};
use shared::types::Actor;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::require;
use crate::store::InventoryStore;

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    store: InventoryStore,
}

/// One ledger record as a flat CSV row
#[derive(Debug, Serialize)]
pub struct LedgerCsvRow {
    pub id: Uuid,
    pub item_id: Uuid,
    pub item_name: String,
    #[serde(rename = "type")]
    pub transaction_type: &'static str,
    pub quantity: Decimal,
    pub previous_stock: Decimal,
    pub new_stock: Decimal,
    pub status: &'static str,
    pub reason: Option<String>,
    pub supplier: Option<String>,
    pub batch_number: Option<String>,
    pub destination: Option<String>,
    pub value: Option<Decimal>,
    pub performed_by: Uuid,
    pub performed_by_role: &'static str,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl LedgerCsvRow {
    fn from_record(record: &TransactionRecord, item_name: String) -> Self {
        Self {
            id: record.id,
            item_id: record.item_id,
            item_name,
            transaction_type: record.transaction_type.as_str(),
            quantity: record.quantity,
            previous_stock: record.previous_stock,
            new_stock: record.new_stock,
            status: record.status().as_str(),
            reason: record.reason.clone(),
            supplier: record.details.supplier.clone(),
            batch_number: record.details.batch_number.clone(),
            destination: record.details.destination.clone(),
            value: record.details.value,
            performed_by: record.performed_by,
            performed_by_role: record.performed_by_role.as_str(),
            approved_by: record.approved_by,
            approved_at: record.approved_at,
            created_at: record.created_at,
        }
    }
}

impl ReportingService {
    pub fn new(store: InventoryStore) -> Self {
        Self { store }
    }

    /// The whole ledger as CSV, one row per record in append order
    pub fn export_ledger_csv(&self, actor: &Actor) -> AppResult<String> {
        require(actor, Resource::Transactions, Action::Export)?;

        let rows: Vec<LedgerCsvRow> = {
            let state = self.store.read()?;
            state
                .ledger()
                .iter()
                .map(|record| {
                    let name = state
                        .item(record.item_id)
                        .map(|item| item.name.clone())
                        .unwrap_or_default();
                    LedgerCsvRow::from_record(record, name)
                })
                .collect()
        };

        tracing::info!(rows = rows.len(), exported_by = %actor.user_id, "Exported ledger");
        Self::export_to_csv(&rows)
    }

    /// Export data to CSV format
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))
    }
}
