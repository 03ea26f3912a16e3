// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::{Duration, NaiveDate, Utc};
use tally::application::{LedgerService, TransactionDraft};
use tally::auth::{sign_token, HmacTokenVerifier};
use tally::domain::{Cents, OwnerId, TransactionKind};
use tempfile::TempDir;
use uuid::Uuid;

/// Signing key shared by the test verifier and minted tokens
pub const TEST_KEY: &[u8] = b"integration-test-key";

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let verifier = Box::new(HmacTokenVerifier::new(TEST_KEY));
    let service = LedgerService::init(db_path.to_str().unwrap(), verifier).await?;
    Ok((service, temp_dir))
}

pub fn owner() -> OwnerId {
    Uuid::new_v4()
}

/// Mint a token for `owner` that the test verifier accepts
pub fn token_for(owner: OwnerId) -> String {
    sign_token(TEST_KEY, owner, Utc::now() + Duration::hours(1))
}

pub fn parse_date(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
}

pub fn draft(
    amount_cents: Cents,
    kind: TransactionKind,
    category: &str,
    date: &str,
) -> TransactionDraft {
    TransactionDraft {
        amount_cents,
        kind,
        category: category.to_string(),
        note: None,
        date: parse_date(date),
    }
}
