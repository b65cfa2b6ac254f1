//! Stock audits, counted discrepancies and compliance scoring

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// What an audit covers
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuditScope {
    /// Empty means every category
    pub categories: Vec<String>,
    pub locations: Vec<String>,
    pub sampling_percent: Decimal,
}

impl AuditScope {
    pub fn covers_category(&self, category: &str) -> bool {
        self.categories.is_empty() || self.categories.iter().any(|c| c == category)
    }
}

/// Audit lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum AuditStatus {
    InProgress,
    Completed,
    Approved,
    RequiresReview,
}

impl AuditStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditStatus::InProgress => "in-progress",
            AuditStatus::Completed => "completed",
            AuditStatus::Approved => "approved",
            AuditStatus::RequiresReview => "requires-review",
        }
    }

    /// Whether counts may still be recorded
    pub fn accepts_counts(&self) -> bool {
        matches!(self, AuditStatus::InProgress | AuditStatus::RequiresReview)
    }

    /// Whether the compliance score means anything yet
    pub fn is_scored(&self) -> bool {
        matches!(self, AuditStatus::Completed | AuditStatus::Approved)
    }
}

/// Kinds of discrepancy found during an audit
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum DiscrepancyType {
    Shortage,
    Excess,
    /// Set explicitly by the auditor
    Damaged,
    /// Set explicitly by the auditor
    Expired,
}

impl DiscrepancyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscrepancyType::Shortage => "shortage",
            DiscrepancyType::Excess => "excess",
            DiscrepancyType::Damaged => "damaged",
            DiscrepancyType::Expired => "expired",
        }
    }

    /// Types the auditor may assign; shortage and excess are inferred
    pub fn is_explicit(&self) -> bool {
        matches!(self, DiscrepancyType::Damaged | DiscrepancyType::Expired)
    }
}

/// A single expected-vs-actual count
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuditCount {
    pub item_id: Uuid,
    pub expected_stock: Decimal,
    pub actual_stock: Decimal,
    pub notes: Option<String>,
    pub counted_by: Uuid,
    pub counted_at: DateTime<Utc>,
}

impl AuditCount {
    pub fn variance(&self) -> Decimal {
        self.actual_stock - self.expected_stock
    }
}

/// A discrepancy derived from a count. `quantity` is always positive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Discrepancy {
    pub id: Uuid,
    pub audit_id: Uuid,
    pub item_id: Uuid,
    #[serde(rename = "type")]
    pub discrepancy_type: DiscrepancyType,
    pub quantity: Decimal,
    pub expected_stock: Decimal,
    pub notes: Option<String>,
    pub resolution: Option<String>,
    pub resolved_by: Option<Uuid>,
    pub resolved_at: Option<DateTime<Utc>>,
    /// Adjustment request raised from this discrepancy
    pub adjustment_request_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Discrepancy {
    /// Derive a discrepancy from a count; zero variance yields none.
    pub fn from_count(
        audit_id: Uuid,
        count: &AuditCount,
        explicit_type: Option<DiscrepancyType>,
    ) -> Option<Self> {
        let variance = count.variance();
        if variance.is_zero() {
            return None;
        }

        let inferred = if variance < Decimal::ZERO {
            DiscrepancyType::Shortage
        } else {
            DiscrepancyType::Excess
        };

        Some(Self {
            id: Uuid::new_v4(),
            audit_id,
            item_id: count.item_id,
            discrepancy_type: explicit_type.unwrap_or(inferred),
            quantity: variance.abs(),
            expected_stock: count.expected_stock,
            notes: count.notes.clone(),
            resolution: None,
            resolved_by: None,
            resolved_at: None,
            adjustment_request_id: None,
            created_at: Utc::now(),
        })
    }

    pub fn is_open(&self) -> bool {
        self.resolved_at.is_none()
    }
}

/// An audit with its counts and discrepancies
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    pub id: Uuid,
    pub name: String,
    pub scope: AuditScope,
    pub counts: Vec<AuditCount>,
    pub discrepancies: Vec<Discrepancy>,
    pub compliance_score: Decimal,
    pub status: AuditStatus,
    pub review_reason: Option<String>,
    pub created_by: Uuid,
    pub approved_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
}

/// Input for opening an audit
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAuditInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub scope: AuditScope,
}

/// Input for recording a count
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordCountInput {
    pub item_id: Uuid,
    pub expected_stock: Decimal,
    pub actual_stock: Decimal,
    pub notes: Option<String>,
    pub discrepancy_type: Option<DiscrepancyType>,
}

impl AuditRecord {
    pub fn new(input: CreateAuditInput, created_by: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: input.name,
            scope: input.scope,
            counts: Vec::new(),
            discrepancies: Vec::new(),
            compliance_score: Decimal::ZERO,
            status: AuditStatus::InProgress,
            review_reason: None,
            created_by,
            approved_by: None,
            created_at: Utc::now(),
            completed_at: None,
            approved_at: None,
        }
    }

    pub fn open_discrepancies(&self) -> impl Iterator<Item = &Discrepancy> {
        self.discrepancies.iter().filter(|d| d.is_open())
    }

    /// Recompute and store the compliance score
    pub fn refresh_score(&mut self) {
        self.compliance_score = compute_compliance_score(self);
    }
}

/// Score an audit from 0 to 100.
///
/// Zero until the audit is completed or approved. Each unresolved
/// discrepancy costs `min(1, quantity / max(expected, 1))` of one sampled
/// item, so the score falls as open discrepancies grow in number or size.
pub fn compute_compliance_score(audit: &AuditRecord) -> Decimal {
    if !audit.status.is_scored() {
        return Decimal::ZERO;
    }

    let sampled: HashSet<Uuid> = audit.counts.iter().map(|c| c.item_id).collect();
    if sampled.is_empty() {
        return Decimal::ZERO;
    }

    let hundred = Decimal::ONE_HUNDRED;
    let penalty: Decimal = audit
        .open_discrepancies()
        .map(|d| {
            let base = d.expected_stock.max(Decimal::ONE);
            (d.quantity / base).min(Decimal::ONE)
        })
        .sum();

    let ratio = penalty / Decimal::from(sampled.len() as u64);
    (hundred * (Decimal::ONE - ratio))
        .max(Decimal::ZERO)
        .round_dp(2)
}
