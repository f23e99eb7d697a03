use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Paise;

pub type CustomerId = Uuid;

/// An account holder. The Aadhaar number is the identity document and
/// must be unique across customers: at most one customer (and thus one
/// account) per Aadhaar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub aadhaar: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    pub fn new(name: String, aadhaar: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            aadhaar,
            email: None,
            phone: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

/// A bank account. Balance is held in paise and is only mutated through
/// validated ledger operations; it never goes below zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub account_number: String,
    pub customer_id: CustomerId,
    pub balance: Paise,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub deactivated_at: Option<DateTime<Utc>>,
}

impl Account {
    /// Open a new active account with the given opening balance.
    pub fn new(customer_id: CustomerId, opening_balance: Paise) -> Self {
        Self {
            account_number: generate_account_number(),
            customer_id,
            balance: opening_balance,
            is_active: true,
            created_at: Utc::now(),
            deactivated_at: None,
        }
    }

    pub fn is_deactivated(&self) -> bool {
        !self.is_active
    }
}

/// Generate a 12-digit account number from a random UUID.
fn generate_account_number() -> String {
    let n = Uuid::new_v4().as_u128() % 1_000_000_000_000;
    format!("{:012}", n)
}
