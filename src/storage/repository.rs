use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use thiserror::Error;
use tokio::time::timeout;
use uuid::Uuid;

use crate::domain::{Account, Customer, Paise};

use super::MIGRATION_001_INITIAL;

/// Default bound on a single store round trip.
const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(5);

/// Store-level failures. Timeouts are transient and retryable; the
/// caller must never treat one as success.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store operation timed out: {0}")]
    Timeout(&'static str),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("corrupt record: {0}")]
    Corrupt(#[from] anyhow::Error),
}

/// Indexed account columns available for generic lookup.
/// Only `AccountNumber` is used by the endpoints in practice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountField {
    AccountNumber,
    CustomerId,
}

impl AccountField {
    fn column(&self) -> &'static str {
        match self {
            AccountField::AccountNumber => "account_number",
            AccountField::CustomerId => "customer_id",
        }
    }
}

/// Outcome of an atomic two-account transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferApply {
    /// Both sides updated; carries the new source balance.
    Applied(Paise),
    /// The guarded source debit matched no row (floor breached or the
    /// balance moved concurrently). Nothing was changed.
    SourceRejected,
    /// The destination account vanished between validation and credit.
    /// The source debit was rolled back.
    DestinationMissing,
}

/// Repository for persisting and querying customers and accounts.
///
/// Balance mutations are guarded single-statement updates: the
/// precondition is re-checked inside the UPDATE itself, so concurrent
/// check-then-apply sequences on the same account cannot lose updates.
pub struct Repository {
    pool: SqlitePool,
    op_timeout: Duration,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            op_timeout: DEFAULT_OP_TIMEOUT,
        }
    }

    pub fn with_op_timeout(mut self, op_timeout: Duration) -> Self {
        self.op_timeout = op_timeout;
        self
    }

    /// Connect to a SQLite database at the given URL.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = match timeout(DEFAULT_OP_TIMEOUT, SqlitePool::connect(database_url)).await {
            Ok(result) => result?,
            Err(_) => return Err(StoreError::Timeout("connect")),
        };
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        self.bounded(
            "migrate",
            sqlx::query(MIGRATION_001_INITIAL).execute(&self.pool),
        )
        .await?;
        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self, StoreError> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    /// Bound a store call with the configured timeout.
    async fn bounded<T, F>(&self, what: &'static str, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match timeout(self.op_timeout, fut).await {
            Ok(result) => result.map_err(StoreError::Database),
            Err(_) => Err(StoreError::Timeout(what)),
        }
    }

    // ========================
    // Customer operations
    // ========================

    /// Persist a new customer together with their account, atomically.
    pub async fn save_customer_and_account(
        &self,
        customer: &Customer,
        account: &Account,
    ) -> Result<(), StoreError> {
        let op = async {
            let mut tx = self.pool.begin().await?;

            sqlx::query(
                r#"
                INSERT INTO customers (id, name, aadhaar, email, phone, created_at)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(customer.id.to_string())
            .bind(&customer.name)
            .bind(&customer.aadhaar)
            .bind(&customer.email)
            .bind(&customer.phone)
            .bind(customer.created_at.to_rfc3339())
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                INSERT INTO accounts (account_number, customer_id, balance, is_active, created_at, deactivated_at)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&account.account_number)
            .bind(account.customer_id.to_string())
            .bind(account.balance)
            .bind(account.is_active)
            .bind(account.created_at.to_rfc3339())
            .bind(account.deactivated_at.map(|dt| dt.to_rfc3339()))
            .execute(&mut *tx)
            .await?;

            tx.commit().await
        };

        self.bounded("save customer and account", op).await?;
        Ok(())
    }

    /// Get the customer owning the given account, if any.
    pub async fn get_account_holder(
        &self,
        account_number: &str,
    ) -> Result<Option<Customer>, StoreError> {
        let row = self
            .bounded(
                "fetch account holder",
                sqlx::query(
                    r#"
                    SELECT c.id, c.name, c.aadhaar, c.email, c.phone, c.created_at
                    FROM customers c
                    JOIN accounts a ON a.customer_id = c.id
                    WHERE a.account_number = ?
                    "#,
                )
                .bind(account_number)
                .fetch_optional(&self.pool),
            )
            .await?;

        match row {
            Some(row) => Ok(Some(Self::row_to_customer(&row)?)),
            None => Ok(None),
        }
    }

    /// True if any account references a customer with this Aadhaar.
    pub async fn account_exists_for_aadhaar(&self, aadhaar: &str) -> Result<bool, StoreError> {
        let row = self
            .bounded(
                "check customer account",
                sqlx::query(
                    r#"
                    SELECT EXISTS (
                        SELECT 1
                        FROM accounts a
                        JOIN customers c ON c.id = a.customer_id
                        WHERE c.aadhaar = ?
                    ) as present
                    "#,
                )
                .bind(aadhaar)
                .fetch_one(&self.pool),
            )
            .await?;

        Ok(row.get::<i64, _>("present") != 0)
    }

    // ========================
    // Account operations
    // ========================

    /// Get an account by an indexed field.
    pub async fn get_account_by_field(
        &self,
        field: AccountField,
        value: &str,
    ) -> Result<Option<Account>, StoreError> {
        let query = format!(
            "SELECT account_number, customer_id, balance, is_active, created_at, deactivated_at \
             FROM accounts WHERE {} = ?",
            field.column()
        );

        let row = self
            .bounded(
                "fetch account",
                sqlx::query(&query).bind(value).fetch_optional(&self.pool),
            )
            .await?;

        match row {
            Some(row) => Ok(Some(Self::row_to_account(&row)?)),
            None => Ok(None),
        }
    }

    /// Get an account by its account number.
    pub async fn get_account(&self, account_number: &str) -> Result<Option<Account>, StoreError> {
        self.get_account_by_field(AccountField::AccountNumber, account_number)
            .await
    }

    /// Read only the balance of an account.
    pub async fn get_balance(&self, account_number: &str) -> Result<Option<Paise>, StoreError> {
        let row = self
            .bounded(
                "fetch balance",
                sqlx::query("SELECT balance FROM accounts WHERE account_number = ?")
                    .bind(account_number)
                    .fetch_optional(&self.pool),
            )
            .await?;

        Ok(row.map(|r| r.get("balance")))
    }

    /// Credit an active account. Returns the new balance, or None when
    /// the account is missing or deactivated.
    pub async fn deposit(
        &self,
        account_number: &str,
        amount: Paise,
    ) -> Result<Option<Paise>, StoreError> {
        let row = self
            .bounded(
                "deposit",
                sqlx::query(
                    r#"
                    UPDATE accounts
                    SET balance = balance + ?
                    WHERE account_number = ? AND is_active = 1
                    RETURNING balance
                    "#,
                )
                .bind(amount)
                .bind(account_number)
                .fetch_optional(&self.pool),
            )
            .await?;

        Ok(row.map(|r| r.get("balance")))
    }

    /// Compare-and-swap on a persisted balance. The new balance is
    /// computed by the caller; the update applies only while the stored
    /// balance still equals `observed`. Returns the new balance, or
    /// None when the account is missing or the balance moved.
    pub async fn swap_balance(
        &self,
        account_number: &str,
        observed: Paise,
        updated: Paise,
    ) -> Result<Option<Paise>, StoreError> {
        let row = self
            .bounded(
                "swap balance",
                sqlx::query(
                    r#"
                    UPDATE accounts
                    SET balance = ?3
                    WHERE account_number = ?1 AND balance = ?2
                    RETURNING balance
                    "#,
                )
                .bind(account_number)
                .bind(observed)
                .bind(updated)
                .fetch_optional(&self.pool),
            )
            .await?;

        Ok(row.map(|r| r.get("balance")))
    }

    /// Move funds between two accounts in a single transaction. The
    /// source debit is guarded by the floor; on any failure both sides
    /// are rolled back.
    pub async fn transfer(
        &self,
        source: &str,
        destination: &str,
        amount: Paise,
        floor: Paise,
    ) -> Result<TransferApply, StoreError> {
        let op = async {
            let mut tx = self.pool.begin().await?;

            let debited = sqlx::query(
                r#"
                UPDATE accounts
                SET balance = balance - ?1
                WHERE account_number = ?2 AND balance >= ?3 AND balance - ?1 >= ?3
                RETURNING balance
                "#,
            )
            .bind(amount)
            .bind(source)
            .bind(floor)
            .fetch_optional(&mut *tx)
            .await?;

            let Some(row) = debited else {
                tx.rollback().await?;
                return Ok(TransferApply::SourceRejected);
            };
            let source_balance: Paise = row.get("balance");

            let credited = sqlx::query(
                r#"
                UPDATE accounts
                SET balance = balance + ?
                WHERE account_number = ?
                RETURNING balance
                "#,
            )
            .bind(amount)
            .bind(destination)
            .fetch_optional(&mut *tx)
            .await?;

            if credited.is_none() {
                tx.rollback().await?;
                return Ok(TransferApply::DestinationMissing);
            }

            tx.commit().await?;
            Ok(TransferApply::Applied(source_balance))
        };

        self.bounded("transfer", op).await
    }

    /// Soft-delete every active account whose balance is below the
    /// threshold. Returns the affected account numbers; running it
    /// again with no newly-qualifying accounts returns an empty list.
    pub async fn deactivate_below(&self, threshold: Paise) -> Result<Vec<String>, StoreError> {
        let now = Utc::now().to_rfc3339();
        let rows = self
            .bounded(
                "deactivate accounts",
                sqlx::query(
                    r#"
                    UPDATE accounts
                    SET is_active = 0, deactivated_at = ?
                    WHERE is_active = 1 AND balance < ?
                    RETURNING account_number
                    "#,
                )
                .bind(&now)
                .bind(threshold)
                .fetch_all(&self.pool),
            )
            .await?;

        Ok(rows.iter().map(|r| r.get("account_number")).collect())
    }

    fn row_to_customer(row: &sqlx::sqlite::SqliteRow) -> Result<Customer, StoreError> {
        let id_str: String = row.get("id");
        let created_at_str: String = row.get("created_at");

        Ok(Customer {
            id: Uuid::parse_str(&id_str).context("Invalid customer ID")?,
            name: row.get("name"),
            aadhaar: row.get("aadhaar"),
            email: row.get("email"),
            phone: row.get("phone"),
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
        })
    }

    fn row_to_account(row: &sqlx::sqlite::SqliteRow) -> Result<Account, StoreError> {
        let customer_id_str: String = row.get("customer_id");
        let created_at_str: String = row.get("created_at");
        let deactivated_at_str: Option<String> = row.get("deactivated_at");

        Ok(Account {
            account_number: row.get("account_number"),
            customer_id: Uuid::parse_str(&customer_id_str).context("Invalid customer ID")?,
            balance: row.get("balance"),
            is_active: row.get::<i64, _>("is_active") != 0,
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
            deactivated_at: deactivated_at_str
                .map(|s| DateTime::parse_from_rfc3339(&s))
                .transpose()
                .context("Invalid deactivated_at timestamp")?
                .map(|dt| dt.with_timezone(&Utc)),
        })
    }
}
