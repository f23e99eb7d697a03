use thiserror::Error;

use crate::domain::{LedgerViolation, Paise};
use crate::storage::StoreError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Account does not exist with account number {0}. Please recheck your account number.")]
    AccountNotFound(String),

    #[error(
        "Source account does not exist with account number {0}. Please recheck source account number."
    )]
    SourceAccountNotFound(String),

    #[error(
        "Destination account does not exist with account number {0}. Please recheck destination account number."
    )]
    DestinationAccountNotFound(String),

    #[error("Customer already has an account registered under Aadhaar {0}")]
    DuplicateCustomer(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Insufficient funds. Available balance {balance}")]
    InsufficientFunds { balance: Paise },

    #[error("Insufficient funds - cannot withdraw more than {max_withdrawable}")]
    ExceedsWithdrawable {
        balance: Paise,
        max_withdrawable: Paise,
    },

    #[error("Your account {0} is de-activated. Cannot deposit amount now.")]
    AccountInactive(String),

    #[error("Account store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// HTTP-style severity code carried in the response envelope.
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::AccountNotFound(_)
            | AppError::SourceAccountNotFound(_)
            | AppError::DestinationAccountNotFound(_) => 404,
            AppError::DuplicateCustomer(_) => 409,
            AppError::InvalidAmount(_) => 400,
            AppError::InsufficientFunds { .. } | AppError::ExceedsWithdrawable { .. } => 406,
            // The deposit endpoint reports a deactivated account as a
            // 200 with a message and no mutation.
            AppError::AccountInactive(_) => 200,
            AppError::StoreUnavailable(_) => 503,
            AppError::Internal(_) => 500,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Timeout(what) => AppError::StoreUnavailable(what.to_string()),
            other => AppError::Internal(anyhow::Error::new(other)),
        }
    }
}

impl From<LedgerViolation> for AppError {
    fn from(violation: LedgerViolation) -> Self {
        match violation {
            LedgerViolation::InvalidGranularity { .. } | LedgerViolation::NonPositiveAmount { .. } => {
                AppError::InvalidAmount(violation.to_string())
            }
            LedgerViolation::BelowFloor { balance } => AppError::InsufficientFunds { balance },
            LedgerViolation::ExceedsWithdrawable {
                balance,
                max_withdrawable,
            } => AppError::ExceedsWithdrawable {
                balance,
                max_withdrawable,
            },
        }
    }
}
