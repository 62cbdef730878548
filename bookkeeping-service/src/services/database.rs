//! Database service for bookkeeping-service.
//!
//! All ledger writes go through here. A posting is a single SQL transaction:
//! account rows are locked in sorted id order, validated, the header (and any
//! journal legs) inserted, and stored balances updated, all atomically.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::anyhow;
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, Transaction};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::models::{
    validate_journal_entries, Account, AccountDetail, AccountSummary, AccountType, CreateAccount,
    CreateJournal, CreateTransaction, CreateUser, Direction, ListTransactionsFilter,
    TransactionDetail, TransactionEntry, TransactionRow, TransactionStatus, User,
};
use crate::services::metrics::{ACCOUNTS_CREATED, DB_QUERY_DURATION, TRANSACTIONS_TOTAL};
use service_core::error::AppError;

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "bookkeeping-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check database health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Account Operations
    // -------------------------------------------------------------------------

    /// Create a new account in the chart of accounts.
    #[instrument(skip(self, input), fields(code = %input.code, account_type = %input.account_type))]
    pub async fn create_account(&self, input: &CreateAccount) -> Result<Account, AppError> {
        CreateAccount::validate_code(&input.code)?;

        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_account"])
            .start_timer();

        let account_id = Uuid::new_v4();
        let account = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (account_id, code, name, account_type, balance, description, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING account_id, code, name, account_type, balance, description, is_active, created_utc, updated_utc
            "#,
        )
        .bind(account_id)
        .bind(&input.code)
        .bind(&input.name)
        .bind(input.account_type.as_str())
        .bind(input.initial_balance)
        .bind(&input.description)
        .bind(input.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(anyhow!("Account code '{}' already exists", input.code))
            }
            _ => AppError::DatabaseError(anyhow!("Failed to create account: {}", e)),
        })?;

        timer.observe_duration();

        ACCOUNTS_CREATED
            .with_label_values(&[input.account_type.as_str()])
            .inc();

        info!(
            account_id = %account.account_id,
            code = %account.code,
            "Account created"
        );

        Ok(account)
    }

    /// List accounts with posting counts, ordered by type, code, name.
    #[instrument(skip(self))]
    pub async fn list_accounts(
        &self,
        account_type: Option<AccountType>,
        include_inactive: bool,
    ) -> Result<Vec<AccountSummary>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_accounts"])
            .start_timer();

        let accounts = sqlx::query_as::<_, AccountSummary>(
            r#"
            SELECT a.account_id, a.code, a.name, a.account_type, a.balance, a.description,
                   a.is_active, a.created_utc, a.updated_utc,
                   (SELECT COUNT(*) FROM transactions t
                    WHERE t.debit_account = a.account_id OR t.credit_account = a.account_id
                   ) AS transaction_count
            FROM accounts a
            WHERE ($1::varchar IS NULL OR a.account_type = $1)
              AND ($2 OR a.is_active = TRUE)
            ORDER BY a.account_type, a.code, a.name
            "#,
        )
        .bind(account_type.map(|t| t.as_str()))
        .bind(include_inactive)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow!("Failed to list accounts: {}", e)))?;

        timer.observe_duration();

        Ok(accounts)
    }

    /// Get an account with its derived posting totals.
    ///
    /// `current_balance` is recomputed as total debits minus total credits
    /// over the postings; `balance` is the stored running balance.
    #[instrument(skip(self), fields(account_id = %account_id))]
    pub async fn get_account(&self, account_id: Uuid) -> Result<AccountDetail, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_account"])
            .start_timer();

        let account = sqlx::query_as::<_, AccountDetail>(
            r#"
            SELECT account_id, code, name, account_type, balance, description, is_active,
                   created_utc, updated_utc, total_debits, total_credits,
                   total_debits - total_credits AS current_balance
            FROM (
                SELECT a.*,
                       COALESCE((SELECT SUM(t.amount) FROM transactions t
                                 WHERE t.debit_account = a.account_id), 0.00) AS total_debits,
                       COALESCE((SELECT SUM(t.amount) FROM transactions t
                                 WHERE t.credit_account = a.account_id), 0.00) AS total_credits
                FROM accounts a
                WHERE a.account_id = $1
            ) account
            "#,
        )
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow!("Failed to get account: {}", e)))?
        .ok_or_else(|| AppError::NotFound(anyhow!("Account not found")))?;

        timer.observe_duration();

        Ok(account)
    }

    /// Get the stored balance of an account, zero when the account is absent.
    #[instrument(skip(self), fields(account_id = %account_id))]
    pub async fn get_balance(&self, account_id: Uuid) -> Result<Decimal, AppError> {
        let balance: Option<Decimal> =
            sqlx::query_scalar("SELECT balance FROM accounts WHERE account_id = $1")
                .bind(account_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| AppError::DatabaseError(anyhow!("Failed to get balance: {}", e)))?;

        Ok(balance.unwrap_or(Decimal::ZERO))
    }

    // -------------------------------------------------------------------------
    // Transaction Operations
    // -------------------------------------------------------------------------

    /// Post a two-sided transaction.
    ///
    /// Locks both account rows, validates they exist and are active, inserts
    /// the header, and applies the type-signed balance deltas when the
    /// transaction is posted. Any failure rolls the whole posting back.
    #[instrument(skip(self, input), fields(reference = %input.reference, amount = %input.amount))]
    pub async fn create_transaction(&self, input: &CreateTransaction) -> Result<Uuid, AppError> {
        if input.debit_account == input.credit_account {
            return Err(AppError::BadRequest(anyhow!(
                "Debit and credit accounts cannot be the same"
            )));
        }
        if input.amount <= Decimal::ZERO {
            return Err(AppError::BadRequest(anyhow!(
                "Amount must be greater than 0"
            )));
        }

        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_transaction"])
            .start_timer();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::DatabaseError(anyhow!("Failed to begin transaction: {}", e)))?;

        let account_types =
            lock_accounts(&mut tx, &[input.debit_account, input.credit_account]).await?;

        let transaction_id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO transactions (transaction_id, date, reference, description, amount,
                                      status, debit_account, credit_account, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(transaction_id)
        .bind(input.date)
        .bind(&input.reference)
        .bind(&input.description)
        .bind(input.amount)
        .bind(input.status.as_str())
        .bind(input.debit_account)
        .bind(input.credit_account)
        .bind(input.created_by)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow!("Failed to insert transaction: {}", e)))?;

        if input.status == TransactionStatus::Posted {
            let debit_type = account_types[&input.debit_account];
            let credit_type = account_types[&input.credit_account];
            apply_balance(
                &mut tx,
                input.debit_account,
                debit_type.signed_delta(Direction::Debit, input.amount),
            )
            .await?;
            apply_balance(
                &mut tx,
                input.credit_account,
                credit_type.signed_delta(Direction::Credit, input.amount),
            )
            .await?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::DatabaseError(anyhow!("Failed to commit transaction: {}", e)))?;

        timer.observe_duration();

        TRANSACTIONS_TOTAL
            .with_label_values(&[input.status.as_str()])
            .inc();

        info!(
            transaction_id = %transaction_id,
            amount = %input.amount,
            status = %input.status,
            "Transaction created"
        );

        Ok(transaction_id)
    }

    /// Post a multi-entry journal.
    ///
    /// The header row carries no two-sided fields; the legs live in
    /// `transaction_entries`. Debits must equal credits across the legs.
    #[instrument(skip(self, input), fields(reference = %input.reference, entry_count = input.entries.len()))]
    pub async fn create_journal(&self, input: &CreateJournal) -> Result<Uuid, AppError> {
        let (debit_total, _) = validate_journal_entries(&input.entries)?;

        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_journal"])
            .start_timer();

        let mut ids: Vec<Uuid> = input.entries.iter().map(|e| e.account_id).collect();
        ids.sort();
        ids.dedup();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::DatabaseError(anyhow!("Failed to begin transaction: {}", e)))?;

        let account_types = lock_accounts(&mut tx, &ids).await?;

        let transaction_id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO transactions (transaction_id, date, reference, description, amount,
                                      status, debit_account, credit_account, created_by)
            VALUES ($1, $2, $3, $4, NULL, $5, NULL, NULL, $6)
            "#,
        )
        .bind(transaction_id)
        .bind(input.date)
        .bind(&input.reference)
        .bind(&input.description)
        .bind(input.status.as_str())
        .bind(input.created_by)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow!("Failed to insert journal: {}", e)))?;

        for entry in &input.entries {
            sqlx::query(
                r#"
                INSERT INTO transaction_entries (entry_id, transaction_id, account_id, debit, credit)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(transaction_id)
            .bind(entry.account_id)
            .bind(entry.debit)
            .bind(entry.credit)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow!("Failed to insert entry: {}", e)))?;

            if input.status == TransactionStatus::Posted {
                let account_type = account_types[&entry.account_id];
                // One side is always zero, so the two deltas sum to the leg's impact.
                let delta = account_type.signed_delta(Direction::Debit, entry.debit)
                    + account_type.signed_delta(Direction::Credit, entry.credit);
                apply_balance(&mut tx, entry.account_id, delta).await?;
            }
        }

        tx.commit()
            .await
            .map_err(|e| AppError::DatabaseError(anyhow!("Failed to commit journal: {}", e)))?;

        timer.observe_duration();

        TRANSACTIONS_TOTAL
            .with_label_values(&[input.status.as_str()])
            .inc();

        info!(
            transaction_id = %transaction_id,
            entry_count = input.entries.len(),
            total_amount = %debit_total,
            "Journal created"
        );

        Ok(transaction_id)
    }

    /// List two-sided transactions, most recent first.
    ///
    /// The inner joins on accounts exclude journal headers, which have no
    /// two-sided fields. The account filter matches either side.
    #[instrument(skip(self, filter))]
    pub async fn list_transactions(
        &self,
        filter: &ListTransactionsFilter,
    ) -> Result<Vec<TransactionRow>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_transactions"])
            .start_timer();

        let limit = filter.limit.clamp(1, 500);
        let offset = filter.offset.max(0);

        let transactions = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT t.transaction_id, t.date, t.reference, t.description, t.amount, t.status,
                   t.debit_account, da.name AS debit_account_name, da.code AS debit_account_code,
                   t.credit_account, ca.name AS credit_account_name, ca.code AS credit_account_code,
                   t.created_by, t.created_utc, t.updated_utc
            FROM transactions t
            JOIN accounts da ON t.debit_account = da.account_id
            JOIN accounts ca ON t.credit_account = ca.account_id
            WHERE ($1::uuid IS NULL OR t.debit_account = $1 OR t.credit_account = $1)
              AND ($2::date IS NULL OR t.date >= $2)
              AND ($3::date IS NULL OR t.date <= $3)
            ORDER BY t.date DESC, t.transaction_id DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(filter.account_id)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow!("Failed to list transactions: {}", e)))?;

        timer.observe_duration();

        Ok(transactions)
    }

    /// Get a transaction with joined account names and journal legs.
    #[instrument(skip(self), fields(transaction_id = %transaction_id))]
    pub async fn get_transaction(
        &self,
        transaction_id: Uuid,
    ) -> Result<TransactionDetail, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_transaction"])
            .start_timer();

        let mut transaction = sqlx::query_as::<_, TransactionDetail>(
            r#"
            SELECT t.transaction_id, t.date, t.reference, t.description, t.amount, t.status,
                   t.debit_account, da.name AS debit_account_name, da.code AS debit_account_code,
                   t.credit_account, ca.name AS credit_account_name, ca.code AS credit_account_code,
                   t.created_by, u.username AS created_by_username, t.created_utc, t.updated_utc
            FROM transactions t
            LEFT JOIN accounts da ON t.debit_account = da.account_id
            LEFT JOIN accounts ca ON t.credit_account = ca.account_id
            LEFT JOIN users u ON t.created_by = u.user_id
            WHERE t.transaction_id = $1
            "#,
        )
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow!("Failed to get transaction: {}", e)))?
        .ok_or_else(|| AppError::NotFound(anyhow!("Transaction not found")))?;

        transaction.entries = sqlx::query_as::<_, TransactionEntry>(
            r#"
            SELECT entry_id, transaction_id, account_id, debit, credit
            FROM transaction_entries
            WHERE transaction_id = $1
            ORDER BY entry_id
            "#,
        )
        .bind(transaction_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow!("Failed to get entries: {}", e)))?;

        timer.observe_duration();

        Ok(transaction)
    }

    // -------------------------------------------------------------------------
    // User Operations
    // -------------------------------------------------------------------------

    /// Create a user.
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn create_user(&self, input: &CreateUser) -> Result<User, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_user"])
            .start_timer();

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (user_id, username, email, password_hash, is_active)
            VALUES ($1, $2, $3, $4, TRUE)
            RETURNING user_id, username, email, password_hash, is_active, created_utc
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&input.username)
        .bind(&input.email)
        .bind(&input.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(anyhow!("Username or email already exists"))
            }
            _ => AppError::DatabaseError(anyhow!("Failed to create user: {}", e)),
        })?;

        timer.observe_duration();

        info!(user_id = %user.user_id, username = %user.username, "User created");

        Ok(user)
    }

    /// Look up an active user by username.
    #[instrument(skip(self))]
    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, username, email, password_hash, is_active, created_utc
            FROM users
            WHERE username = $1 AND is_active = TRUE
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow!("Failed to get user: {}", e)))?;

        Ok(user)
    }
}

/// Lock the given account rows in sorted id order and return their types.
///
/// Sorted lock order keeps concurrent postings that touch the same accounts
/// from deadlocking. Missing accounts and inactive accounts reject the
/// posting before anything is written.
async fn lock_accounts(
    tx: &mut Transaction<'_, Postgres>,
    account_ids: &[Uuid],
) -> Result<HashMap<Uuid, AccountType>, AppError> {
    let mut sorted: Vec<Uuid> = account_ids.to_vec();
    sorted.sort();
    sorted.dedup();

    let mut types = HashMap::with_capacity(sorted.len());
    for account_id in sorted {
        let row: Option<(String, bool)> = sqlx::query_as(
            "SELECT account_type, is_active FROM accounts WHERE account_id = $1 FOR UPDATE",
        )
        .bind(account_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow!("Failed to lock account: {}", e)))?;

        let (type_str, is_active) = row.ok_or_else(|| {
            AppError::BadRequest(anyhow!("Invalid debit or credit account"))
        })?;
        if !is_active {
            return Err(AppError::BadRequest(anyhow!("Cannot use inactive accounts")));
        }
        let account_type = AccountType::from_str(&type_str)
            .ok_or_else(|| AppError::DatabaseError(anyhow!("Unknown account type: {}", type_str)))?;
        types.insert(account_id, account_type);
    }

    Ok(types)
}

/// Apply a signed balance delta to an account row already locked in this
/// transaction.
async fn apply_balance(
    tx: &mut Transaction<'_, Postgres>,
    account_id: Uuid,
    delta: Decimal,
) -> Result<(), AppError> {
    sqlx::query("UPDATE accounts SET balance = balance + $1, updated_utc = NOW() WHERE account_id = $2")
        .bind(delta)
        .bind(account_id)
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow!("Failed to update balance: {}", e)))?;
    Ok(())
}
