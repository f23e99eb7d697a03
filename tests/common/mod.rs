// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use passbook::application::{BankConfig, BankService, NewCustomer};
use passbook::domain::Paise;
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(BankService, TempDir)> {
    test_service_with(BankConfig::default()).await
}

/// Helper to create a test service with a custom configuration
pub async fn test_service_with(config: BankConfig) -> Result<(BankService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = BankService::init(db_path.to_str().unwrap(), config).await?;
    Ok((service, temp_dir))
}

/// Open an account for a fresh customer, returning its account number.
pub async fn open_account(service: &BankService, name: &str, aadhaar: &str) -> Result<String> {
    let opened = service
        .open_account(NewCustomer {
            name: name.into(),
            aadhaar: aadhaar.into(),
            email: None,
            phone: None,
        })
        .await?;
    Ok(opened.account.account_number)
}

/// Open an account and deposit funds up to the target balance.
pub async fn open_funded_account(
    service: &BankService,
    aadhaar: &str,
    balance: Paise,
) -> Result<String> {
    let account_number = open_account(service, "Test Customer", aadhaar).await?;
    if balance > 0 {
        service.deposit(&account_number, balance).await?;
    }
    Ok(account_number)
}
