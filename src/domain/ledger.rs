use super::Paise;

/// Minimum balance (in paise) an account must retain after a
/// withdrawal or transfer.
pub const MINIMUM_BALANCE: Paise = 3000;

/// Closed set of balance mutations the ledger knows how to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Deposit,
    Withdraw,
}

/// A rejected balance mutation. These are expected outcomes, surfaced
/// directly to the caller and never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerViolation {
    /// Amount fails the 500/2000 granularity rule.
    InvalidGranularity { amount: Paise },
    /// Deposit amount must be strictly positive.
    NonPositiveAmount { amount: Paise },
    /// Balance is already below the minimum-balance floor.
    BelowFloor { balance: Paise },
    /// Applying the mutation would leave the balance below the floor.
    ExceedsWithdrawable {
        balance: Paise,
        max_withdrawable: Paise,
    },
}

/// Granularity rule for withdrawal amounts, preserved exactly as the
/// bank documented it: an amount is rejected when it is not a multiple
/// of 500 OR not a multiple of 2000. In practice only multiples of
/// 2000 pass.
pub fn validate_granularity(amount: Paise) -> Result<(), LedgerViolation> {
    if amount % 500 != 0 || amount % 2000 != 0 {
        return Err(LedgerViolation::InvalidGranularity { amount });
    }
    Ok(())
}

/// Deposits carry no floor or granularity constraints, only positivity.
pub fn validate_deposit(amount: Paise) -> Result<(), LedgerViolation> {
    if amount <= 0 {
        return Err(LedgerViolation::NonPositiveAmount { amount });
    }
    Ok(())
}

/// Minimum-balance checks for withdrawals and transfers, in documented
/// order: the current balance must be at or above the floor, and the
/// debited balance must not drop below it.
pub fn validate_floor(balance: Paise, amount: Paise) -> Result<(), LedgerViolation> {
    if balance < MINIMUM_BALANCE {
        return Err(LedgerViolation::BelowFloor { balance });
    }
    if balance - amount < MINIMUM_BALANCE {
        return Err(LedgerViolation::ExceedsWithdrawable {
            balance,
            max_withdrawable: balance - MINIMUM_BALANCE,
        });
    }
    Ok(())
}

/// Apply a validated mutation to a balance.
pub fn apply(balance: Paise, kind: OperationKind, amount: Paise) -> Paise {
    match kind {
        OperationKind::Deposit => balance + amount,
        OperationKind::Withdraw => balance - amount,
    }
}

impl std::fmt::Display for LedgerViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerViolation::InvalidGranularity { amount } => {
                write!(
                    f,
                    "Invalid amount provided {}. Please provide amount in multiples of 500 / 2000",
                    amount
                )
            }
            LedgerViolation::NonPositiveAmount { amount } => {
                write!(f, "Amount must be positive, got {}", amount)
            }
            LedgerViolation::BelowFloor { balance } => {
                write!(f, "Insufficient funds. Available balance {}", balance)
            }
            LedgerViolation::ExceedsWithdrawable {
                max_withdrawable, ..
            } => {
                write!(
                    f,
                    "Insufficient funds - cannot withdraw more than {}",
                    max_withdrawable
                )
            }
        }
    }
}

impl std::error::Error for LedgerViolation {}
