use chrono::NaiveDate;
use tracing::{debug, info};

use crate::auth::{Identity, IdentityVerifier};
use crate::domain::{
    Cents, OwnerId, Transaction, TransactionId, TransactionKind, TransactionPatch,
};
use crate::storage::Repository;

use super::AppError;

/// Application service providing tenant-scoped operations over the ledger.
/// This is the primary interface for any client (CLI, API, TUI, etc.):
/// every operation takes the owner id produced by [`LedgerService::authenticate`]
/// and never trusts an owner supplied in caller data.
pub struct LedgerService {
    repo: Repository,
    verifier: Box<dyn IdentityVerifier>,
}

/// Fields supplied by the caller when recording a transaction.
/// The owner is deliberately absent; it always comes from the verified
/// identity.
#[derive(Debug, Clone)]
pub struct TransactionDraft {
    pub amount_cents: Cents,
    pub kind: TransactionKind,
    pub category: String,
    pub note: Option<String>,
    pub date: NaiveDate,
}

impl LedgerService {
    /// Create a new ledger service with the given repository and verifier.
    pub fn new(repo: Repository, verifier: Box<dyn IdentityVerifier>) -> Self {
        Self { repo, verifier }
    }

    /// Initialize a new database at the given path.
    pub async fn init(
        database_path: &str,
        verifier: Box<dyn IdentityVerifier>,
    ) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo, verifier))
    }

    /// Connect to an existing database.
    pub async fn connect(
        database_path: &str,
        verifier: Box<dyn IdentityVerifier>,
    ) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo, verifier))
    }

    /// Verify a credential and yield the identity it proves.
    /// Must succeed before any other operation runs; the returned owner id is
    /// the only tenancy boundary in the system.
    pub fn authenticate(&self, token: Option<&str>) -> Result<Identity, AppError> {
        Ok(self.verifier.verify(token)?)
    }

    /// Record a new transaction for the authenticated owner.
    pub async fn create(
        &self,
        owner_id: OwnerId,
        draft: TransactionDraft,
    ) -> Result<Transaction, AppError> {
        validate_draft(&draft)?;

        let mut tx = Transaction::new(
            owner_id,
            draft.amount_cents,
            draft.kind,
            draft.category,
            draft.date,
        );
        if let Some(note) = draft.note {
            tx = tx.with_note(note);
        }

        self.repo.save_transaction(&tx).await?;
        info!(transaction = %tx.id, owner = %owner_id, "recorded transaction");
        Ok(tx)
    }

    /// List all of the owner's transactions, newest date first.
    /// An owner with no records gets an empty list, never an error.
    pub async fn list(&self, owner_id: OwnerId) -> Result<Vec<Transaction>, AppError> {
        let txs = self.repo.list_for_owner(owner_id).await?;
        debug!(owner = %owner_id, count = txs.len(), "listed transactions");
        Ok(txs)
    }

    /// Fetch a single transaction, enforcing ownership.
    pub async fn get(
        &self,
        id: TransactionId,
        owner_id: OwnerId,
    ) -> Result<Transaction, AppError> {
        let tx = self
            .repo
            .get_transaction(id)
            .await?
            .ok_or(AppError::NotFound(id))?;

        if tx.owner != owner_id {
            return Err(AppError::Forbidden(id));
        }
        Ok(tx)
    }

    /// Apply a partial update to a transaction the owner holds.
    /// Validation rules match `create`, applied only to fields present.
    pub async fn update(
        &self,
        id: TransactionId,
        owner_id: OwnerId,
        patch: TransactionPatch,
    ) -> Result<Transaction, AppError> {
        // Ownership is re-checked on every mutation, not just at creation
        self.get(id, owner_id).await?;
        validate_patch(&patch)?;

        let updated = self
            .repo
            .update_fields(id, &patch)
            .await?
            .ok_or(AppError::NotFound(id))?;

        info!(transaction = %id, owner = %owner_id, "updated transaction");
        Ok(updated)
    }

    /// Delete a transaction the owner holds.
    pub async fn delete(&self, id: TransactionId, owner_id: OwnerId) -> Result<(), AppError> {
        self.get(id, owner_id).await?;

        if !self.repo.delete_transaction(id).await? {
            return Err(AppError::NotFound(id));
        }

        info!(transaction = %id, owner = %owner_id, "deleted transaction");
        Ok(())
    }
}

/// Parse a transaction kind from caller input.
pub fn parse_kind(input: &str) -> Result<TransactionKind, AppError> {
    TransactionKind::from_str(input).ok_or_else(|| AppError::validation("kind"))
}

/// Parse a calendar date (YYYY-MM-DD) from caller input.
pub fn parse_tx_date(input: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| AppError::validation("date"))
}

fn validate_draft(draft: &TransactionDraft) -> Result<(), AppError> {
    let mut fields = Vec::new();

    if draft.amount_cents < 0 {
        fields.push("amount".to_string());
    }
    if draft.category.trim().is_empty() {
        fields.push("category".to_string());
    }

    if fields.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation { fields })
    }
}

fn validate_patch(patch: &TransactionPatch) -> Result<(), AppError> {
    let mut fields = Vec::new();

    if matches!(patch.amount_cents, Some(amount) if amount < 0) {
        fields.push("amount".to_string());
    }
    if matches!(patch.category.as_deref(), Some(category) if category.trim().is_empty()) {
        fields.push("category".to_string());
    }

    if fields.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation { fields })
    }
}
