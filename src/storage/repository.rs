use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::domain::{
    OwnerId, Transaction, TransactionId, TransactionKind, TransactionPatch,
};

use super::MIGRATION_001_INITIAL;

const DATE_FORMAT: &str = "%Y-%m-%d";

const TRANSACTION_COLUMNS: &str =
    "id, owner_id, amount_cents, kind, category, note, date, created_at";

/// Repository for persisting and querying transactions.
/// Each operation is atomic at single-record granularity; nothing here spans
/// multiple records.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given path.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        // raw_sql: the migration script holds more than one statement
        sqlx::raw_sql(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;

        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    /// Persist a new transaction.
    pub async fn save_transaction(&self, tx: &Transaction) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO transactions (id, owner_id, amount_cents, kind, category, note, date, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(tx.id.to_string())
        .bind(tx.owner.to_string())
        .bind(tx.amount_cents)
        .bind(tx.kind.as_str())
        .bind(&tx.category)
        .bind(&tx.note)
        .bind(tx.date.format(DATE_FORMAT).to_string())
        .bind(tx.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save transaction")?;

        Ok(())
    }

    /// Get a transaction by ID.
    pub async fn get_transaction(&self, id: TransactionId) -> Result<Option<Transaction>> {
        let row = sqlx::query(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = ?"
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch transaction")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_transaction(&row)?)),
            None => Ok(None),
        }
    }

    /// List all transactions belonging to an owner, newest date first,
    /// ties broken by insertion time (newest first).
    pub async fn list_for_owner(&self, owner_id: OwnerId) -> Result<Vec<Transaction>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {TRANSACTION_COLUMNS}
            FROM transactions
            WHERE owner_id = ?
            ORDER BY date DESC, created_at DESC
            "#
        ))
        .bind(owner_id.to_string())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list transactions")?;

        rows.iter().map(Self::row_to_transaction).collect()
    }

    /// Apply a partial update to a transaction, returning the updated record
    /// or `None` when no such record exists.
    pub async fn update_fields(
        &self,
        id: TransactionId,
        patch: &TransactionPatch,
    ) -> Result<Option<Transaction>> {
        if patch.is_empty() {
            return self.get_transaction(id).await;
        }

        // Build the SET clause from the fields actually present
        let mut assignments: Vec<&'static str> = Vec::new();
        if patch.amount_cents.is_some() {
            assignments.push("amount_cents = ?");
        }
        if patch.kind.is_some() {
            assignments.push("kind = ?");
        }
        if patch.category.is_some() {
            assignments.push("category = ?");
        }
        if patch.note.is_some() {
            assignments.push("note = ?");
        }
        if patch.date.is_some() {
            assignments.push("date = ?");
        }

        let query = format!(
            "UPDATE transactions SET {} WHERE id = ? RETURNING {TRANSACTION_COLUMNS}",
            assignments.join(", ")
        );

        let mut sql_query = sqlx::query(&query);
        if let Some(amount) = patch.amount_cents {
            sql_query = sql_query.bind(amount);
        }
        if let Some(kind) = patch.kind {
            sql_query = sql_query.bind(kind.as_str());
        }
        if let Some(ref category) = patch.category {
            sql_query = sql_query.bind(category);
        }
        if let Some(ref note) = patch.note {
            sql_query = sql_query.bind(note);
        }
        if let Some(date) = patch.date {
            sql_query = sql_query.bind(date.format(DATE_FORMAT).to_string());
        }

        let row = sql_query
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .context("Failed to update transaction")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_transaction(&row)?)),
            None => Ok(None),
        }
    }

    /// Delete a transaction. Returns true when a record was removed.
    pub async fn delete_transaction(&self, id: TransactionId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to delete transaction")?;

        Ok(result.rows_affected() > 0)
    }

    fn row_to_transaction(row: &sqlx::sqlite::SqliteRow) -> Result<Transaction> {
        let id_str: String = row.get("id");
        let owner_str: String = row.get("owner_id");
        let kind_str: String = row.get("kind");
        let date_str: String = row.get("date");
        let created_at_str: String = row.get("created_at");

        Ok(Transaction {
            id: Uuid::parse_str(&id_str).context("Invalid transaction ID")?,
            owner: Uuid::parse_str(&owner_str).context("Invalid owner ID")?,
            amount_cents: row.get("amount_cents"),
            kind: TransactionKind::from_str(&kind_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid transaction kind: {}", kind_str))?,
            category: row.get("category"),
            note: row.get("note"),
            date: NaiveDate::parse_from_str(&date_str, DATE_FORMAT)
                .context("Invalid transaction date")?,
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
        })
    }
}
