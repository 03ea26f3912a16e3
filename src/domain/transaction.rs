use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Cents;

pub type TransactionId = Uuid;
pub type OwnerId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money coming in (salary, interest, refunds)
    Income,
    /// Money going out (purchases, bills)
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "income" => Some(TransactionKind::Income),
            "expense" => Some(TransactionKind::Expense),
            _ => None,
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single income or expense event recorded by one user.
/// The owner is fixed at creation and never changes; corrections go
/// through partial updates or deletion of the record itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    /// The user this record belongs to. The only tenancy boundary.
    pub owner: OwnerId,
    /// Magnitude in cents (never negative; sign comes from `kind`)
    pub amount_cents: Cents,
    pub kind: TransactionKind,
    /// Free-text label for grouping (e.g., "Salary", "Food")
    pub category: String,
    pub note: Option<String>,
    /// Calendar date the event occurred (no time-of-day)
    pub date: NaiveDate,
    /// When we recorded this transaction in the system
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Create a new transaction owned by `owner`.
    pub fn new(
        owner: OwnerId,
        amount_cents: Cents,
        kind: TransactionKind,
        category: String,
        date: NaiveDate,
    ) -> Self {
        assert!(amount_cents >= 0, "Transaction amount must not be negative");
        Self {
            id: Uuid::new_v4(),
            owner,
            amount_cents,
            kind,
            category,
            note: None,
            date,
            created_at: Utc::now(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Partial set of fields for updating an existing transaction.
/// Absent fields are left untouched; `owner`, `id` and `created_at` are not
/// updatable through any path.
#[derive(Debug, Clone, Default)]
pub struct TransactionPatch {
    pub amount_cents: Option<Cents>,
    pub kind: Option<TransactionKind>,
    pub category: Option<String>,
    pub note: Option<String>,
    pub date: Option<NaiveDate>,
}

impl TransactionPatch {
    pub fn is_empty(&self) -> bool {
        self.amount_cents.is_none()
            && self.kind.is_none()
            && self.category.is_none()
            && self.note.is_none()
            && self.date.is_none()
    }
}
