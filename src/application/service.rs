use std::time::Duration;

use crate::domain::{self, Account, Customer, MINIMUM_BALANCE, OperationKind, Paise};
use crate::storage::{AccountField, Repository, TransferApply};

use super::AppError;

/// How many times a guarded balance update is retried when the account
/// balance moves between validation and apply.
const CONTENTION_RETRIES: u32 = 5;

/// Policy knobs owned by the lifecycle manager.
#[derive(Debug, Clone)]
pub struct BankConfig {
    /// Balance a freshly opened account starts with.
    pub opening_balance: Paise,
    /// Active accounts below this balance are deactivated by the sweep.
    pub invalid_balance_threshold: Paise,
    /// Bound on a single account-store round trip.
    pub store_timeout: Duration,
}

impl Default for BankConfig {
    fn default() -> Self {
        Self {
            opening_balance: 0,
            invalid_balance_threshold: 1,
            store_timeout: Duration::from_secs(5),
        }
    }
}

/// Details requested when opening an account.
pub struct NewCustomer {
    pub name: String,
    pub aadhaar: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Result of opening an account.
#[derive(Debug)]
pub struct OpenAccountResult {
    pub customer: Customer,
    pub account: Account,
}

/// An account record together with its holder.
#[derive(Debug)]
pub struct AccountDetails {
    pub account: Account,
    pub holder: Customer,
}

/// Application service providing the account-management operations.
/// This is the primary interface for any client (CLI, API, etc.).
pub struct BankService {
    repo: Repository,
    config: BankConfig,
}

impl BankService {
    /// Create a new bank service with the given repository.
    pub fn new(repo: Repository, config: BankConfig) -> Self {
        Self { repo, config }
    }

    /// Initialize a new database at the given path.
    pub async fn init(database_path: &str, config: BankConfig) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url)
            .await?
            .with_op_timeout(config.store_timeout);
        Ok(Self::new(repo, config))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str, config: BankConfig) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url)
            .await?
            .with_op_timeout(config.store_timeout);
        Ok(Self::new(repo, config))
    }

    // ========================
    // Account lifecycle
    // ========================

    /// True if any account is registered under this Aadhaar.
    pub async fn account_exists_for_customer(&self, aadhaar: &str) -> Result<bool, AppError> {
        Ok(self.repo.account_exists_for_aadhaar(aadhaar).await?)
    }

    /// Open a new customer account. At most one account per Aadhaar.
    pub async fn open_account(&self, details: NewCustomer) -> Result<OpenAccountResult, AppError> {
        if self.account_exists_for_customer(&details.aadhaar).await? {
            return Err(AppError::DuplicateCustomer(details.aadhaar));
        }

        let mut customer = Customer::new(details.name, details.aadhaar);
        if let Some(email) = details.email {
            customer = customer.with_email(email);
        }
        if let Some(phone) = details.phone {
            customer = customer.with_phone(phone);
        }

        let account = Account::new(customer.id, self.config.opening_balance);
        self.repo
            .save_customer_and_account(&customer, &account)
            .await?;

        tracing::info!(
            account_number = %account.account_number,
            "account opened"
        );

        Ok(OpenAccountResult { customer, account })
    }

    /// Look up an account by an indexed field, together with its holder.
    pub async fn account_details(
        &self,
        field: AccountField,
        value: &str,
    ) -> Result<AccountDetails, AppError> {
        let account = self
            .repo
            .get_account_by_field(field, value)
            .await?
            .ok_or_else(|| AppError::AccountNotFound(value.to_string()))?;

        let holder = self
            .repo
            .get_account_holder(&account.account_number)
            .await?
            .ok_or_else(|| {
                AppError::Internal(anyhow::anyhow!(
                    "account {} has no customer record",
                    account.account_number
                ))
            })?;

        Ok(AccountDetails { account, holder })
    }

    /// Current balance of an account.
    pub async fn account_balance(&self, account_number: &str) -> Result<Paise, AppError> {
        self.repo
            .get_balance(account_number)
            .await?
            .ok_or_else(|| AppError::AccountNotFound(account_number.to_string()))
    }

    /// Deactivate every active account matching the invalid-account
    /// policy (balance below the configured threshold). Returns the
    /// affected account numbers; idempotent.
    pub async fn deactivate_invalid_accounts(&self) -> Result<Vec<String>, AppError> {
        let deactivated = self
            .repo
            .deactivate_below(self.config.invalid_balance_threshold)
            .await?;

        if !deactivated.is_empty() {
            tracing::info!(count = deactivated.len(), "deactivated invalid accounts");
        }

        Ok(deactivated)
    }

    // ========================
    // Balance mutations
    // ========================

    /// Deposit into an account. No minimum-balance check applies, but
    /// deactivated accounts reject deposits.
    pub async fn deposit(&self, account_number: &str, amount: Paise) -> Result<Paise, AppError> {
        let account = self
            .repo
            .get_account(account_number)
            .await?
            .ok_or_else(|| AppError::AccountNotFound(account_number.to_string()))?;

        if account.is_deactivated() {
            return Err(AppError::AccountInactive(account_number.to_string()));
        }

        domain::validate_deposit(amount)?;

        match self.repo.deposit(account_number, amount).await? {
            Some(balance) => Ok(balance),
            // The account was deactivated (or removed) between the
            // read and the guarded update.
            None => Err(AppError::AccountInactive(account_number.to_string())),
        }
    }

    /// Withdraw from an account. Checks, in order: amount granularity,
    /// account existence, the minimum-balance floor. The debited
    /// balance is computed by the ledger and persisted with a
    /// compare-and-swap against the balance the checks ran on.
    pub async fn withdraw(&self, account_number: &str, amount: Paise) -> Result<Paise, AppError> {
        domain::validate_granularity(amount)?;

        for attempt in 0..CONTENTION_RETRIES {
            let balance = self
                .repo
                .get_balance(account_number)
                .await?
                .ok_or_else(|| AppError::AccountNotFound(account_number.to_string()))?;

            domain::validate_floor(balance, amount)?;
            let debited = domain::apply(balance, OperationKind::Withdraw, amount);

            if let Some(updated) = self
                .repo
                .swap_balance(account_number, balance, debited)
                .await?
            {
                return Ok(updated);
            }

            // Guard matched no row: the balance moved under us.
            tracing::warn!(account_number, attempt, "withdrawal contention, retrying");
        }

        Err(AppError::StoreUnavailable(format!(
            "withdrawal from {} kept losing the balance race",
            account_number
        )))
    }

    /// Transfer between two accounts. Both sides must exist (source
    /// checked first); the floor applies to the source only, and no
    /// granularity rule applies. Debit and credit are atomic.
    pub async fn transfer(
        &self,
        source: &str,
        destination: &str,
        amount: Paise,
    ) -> Result<Paise, AppError> {
        for attempt in 0..CONTENTION_RETRIES {
            let source_balance = self
                .repo
                .get_balance(source)
                .await?
                .ok_or_else(|| AppError::SourceAccountNotFound(source.to_string()))?;

            if self.repo.get_balance(destination).await?.is_none() {
                return Err(AppError::DestinationAccountNotFound(destination.to_string()));
            }

            domain::validate_floor(source_balance, amount)?;

            match self.repo.transfer(source, destination, amount, MINIMUM_BALANCE).await? {
                TransferApply::Applied(updated) => return Ok(updated),
                TransferApply::DestinationMissing => {
                    return Err(AppError::DestinationAccountNotFound(destination.to_string()));
                }
                TransferApply::SourceRejected => {
                    tracing::warn!(source, attempt, "transfer contention, retrying");
                }
            }
        }

        Err(AppError::StoreUnavailable(format!(
            "transfer from {} kept losing the balance race",
            source
        )))
    }
}
