use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::application::{parse_kind, parse_tx_date, AppError, LedgerService, TransactionDraft};
use crate::auth::{sign_token, HmacTokenVerifier};
use crate::domain::{
    format_cents, monthly_flows, parse_cents, summarize, totals_by_category, Transaction,
    TransactionId, TransactionPatch,
};

/// Tally - Personal Finance Transaction Ledger
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "A multi-user transaction ledger with derived income/expense reports")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, default_value = "tally.db")]
    pub database: String,

    /// Bearer token proving identity (falls back to TALLY_TOKEN)
    #[arg(short, long, global = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Mint a signed token locally (stand-in for an external issuer)
    Token {
        /// Owner id to embed (omit to generate a fresh one)
        #[arg(long)]
        owner: Option<String>,

        /// Token validity in days
        #[arg(long, default_value = "30")]
        days: i64,
    },

    /// Record a transaction
    Add {
        /// Amount (e.g., "50.00" or "50")
        amount: String,

        /// income or expense
        #[arg(short, long)]
        kind: String,

        /// Category label (e.g., "Salary", "Food")
        #[arg(short, long)]
        category: String,

        /// Optional free-text note
        #[arg(short, long)]
        note: Option<String>,

        /// Date of the transaction (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// List your transactions, newest first
    List {
        /// Emit JSON instead of the table view
        #[arg(long)]
        json: bool,
    },

    /// Update fields of one of your transactions
    Update {
        /// Transaction ID
        id: String,

        #[arg(long)]
        amount: Option<String>,

        /// income or expense
        #[arg(short, long)]
        kind: Option<String>,

        #[arg(short, long)]
        category: Option<String>,

        #[arg(short, long)]
        note: Option<String>,

        /// YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,
    },

    /// Delete one of your transactions
    Delete {
        /// Transaction ID
        id: String,
    },

    /// Show overall income/expense totals and balance
    Summary {
        #[arg(long)]
        json: bool,
    },

    /// Show summed amounts per category
    Categories {
        #[arg(long)]
        json: bool,
    },

    /// Show income/expense totals per calendar month
    Monthly {
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub async fn run(&self) -> Result<(), AppError> {
        let secret = signing_secret()?;

        // Commands that never touch the ledger
        match &self.command {
            Commands::Init => {
                LedgerService::init(&self.database, Box::new(HmacTokenVerifier::new(secret)))
                    .await?;
                println!("Initialized database at {}", self.database);
                return Ok(());
            }
            Commands::Token { owner, days } => {
                let owner_id = match owner {
                    Some(raw) => {
                        Uuid::parse_str(raw).map_err(|_| AppError::validation("owner"))?
                    }
                    None => Uuid::new_v4(),
                };
                let token = sign_token(&secret, owner_id, Utc::now() + Duration::days(*days));
                println!("owner: {}", owner_id);
                println!("token: {}", token);
                return Ok(());
            }
            _ => {}
        }

        let service = LedgerService::connect(
            &self.database,
            Box::new(HmacTokenVerifier::new(secret)),
        )
        .await?;

        let token = self
            .token
            .clone()
            .or_else(|| std::env::var("TALLY_TOKEN").ok());
        let identity = service.authenticate(token.as_deref())?;
        let owner_id = identity.owner_id;

        match &self.command {
            Commands::Init | Commands::Token { .. } => unreachable!("handled above"),

            Commands::Add {
                amount,
                kind,
                category,
                note,
                date,
            } => {
                let draft = TransactionDraft {
                    amount_cents: parse_amount(amount)?,
                    kind: parse_kind(kind)?,
                    category: category.clone(),
                    note: note.clone(),
                    date: match date {
                        Some(raw) => parse_tx_date(raw)?,
                        None => Utc::now().date_naive(),
                    },
                };

                let tx = service.create(owner_id, draft).await?;
                println!("Recorded {} {}: {}", tx.kind, format_cents(tx.amount_cents), tx.id);
            }

            Commands::List { json } => {
                let txs = service.list(owner_id).await?;
                if *json {
                    println!("{}", to_json(&txs)?);
                } else if txs.is_empty() {
                    println!("No transactions yet.");
                } else {
                    for tx in &txs {
                        print_transaction(tx);
                    }
                }
            }

            Commands::Update {
                id,
                amount,
                kind,
                category,
                note,
                date,
            } => {
                let id = parse_id(id)?;
                let patch = TransactionPatch {
                    amount_cents: amount.as_deref().map(parse_amount).transpose()?,
                    kind: kind.as_deref().map(parse_kind).transpose()?,
                    category: category.clone(),
                    note: note.clone(),
                    date: date.as_deref().map(parse_tx_date).transpose()?,
                };

                let tx = service.update(id, owner_id, patch).await?;
                println!("Updated {}", tx.id);
                print_transaction(&tx);
            }

            Commands::Delete { id } => {
                let id = parse_id(id)?;
                service.delete(id, owner_id).await?;
                println!("Deleted {}", id);
            }

            Commands::Summary { json } => {
                let txs = service.list(owner_id).await?;
                let summary = summarize(&txs);
                if *json {
                    println!("{}", to_json(&summary)?);
                } else {
                    println!("Income:  {:>12}", format_cents(summary.total_income));
                    println!("Expense: {:>12}", format_cents(summary.total_expense));
                    println!("Balance: {:>12}", format_cents(summary.balance));
                }
            }

            Commands::Categories { json } => {
                let txs = service.list(owner_id).await?;
                let totals = totals_by_category(&txs);
                if *json {
                    println!("{}", to_json(&totals)?);
                } else if totals.is_empty() {
                    println!("No transactions yet.");
                } else {
                    // Stable display order: biggest first, then by name
                    let mut entries: Vec<_> = totals.into_iter().collect();
                    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
                    for (category, total) in entries {
                        println!("{:>12}  {}", format_cents(total), category);
                    }
                }
            }

            Commands::Monthly { json } => {
                let txs = service.list(owner_id).await?;
                let flows = monthly_flows(&txs);
                if *json {
                    println!("{}", to_json(&flows)?);
                } else if flows.is_empty() {
                    println!("No transactions yet.");
                } else {
                    println!("{:<5} {:>12} {:>12}", "", "income", "expense");
                    for flow in flows {
                        println!(
                            "{:<5} {:>12} {:>12}",
                            flow.month,
                            format_cents(flow.income),
                            format_cents(flow.expense)
                        );
                    }
                }
            }
        }

        Ok(())
    }
}

fn signing_secret() -> Result<Vec<u8>, AppError> {
    std::env::var("TALLY_SECRET")
        .map(String::into_bytes)
        .map_err(|_| AppError::Store(anyhow::anyhow!("TALLY_SECRET is not set")))
}

fn parse_amount(raw: &str) -> Result<i64, AppError> {
    parse_cents(raw).map_err(|_| AppError::validation("amount"))
}

fn parse_id(raw: &str) -> Result<TransactionId, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::validation("id"))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value)
        .map_err(|err| AppError::Store(anyhow::anyhow!("JSON encoding failed: {}", err)))
}

fn print_transaction(tx: &Transaction) {
    println!(
        "{}  {:>7}  {:>12}  {}{}",
        tx.date,
        tx.kind,
        format_cents(tx.amount_cents),
        tx.category,
        tx.note
            .as_deref()
            .map(|note| format!("  ({})", note))
            .unwrap_or_default()
    );
    println!("  id: {}", tx.id);
}
