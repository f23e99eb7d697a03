mod common;

use anyhow::Result;
use common::{open_funded_account, test_service};
use passbook::application::AppError;

// ========================
// Deposits
// ========================

#[tokio::test]
async fn test_deposit_never_requires_minimum_balance() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let account = open_funded_account(&service, "111122223333", 0).await?;

    let updated = service.deposit(&account, 100).await?;
    assert_eq!(updated, 100);
    assert_eq!(service.account_balance(&account).await?, 100);

    Ok(())
}

#[tokio::test]
async fn test_deposit_requires_positive_amount() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let account = open_funded_account(&service, "111122223333", 1000).await?;

    let err = service.deposit(&account, 0).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidAmount(_)));
    assert_eq!(err.status_code(), 400);

    let err = service.deposit(&account, -500).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidAmount(_)));

    assert_eq!(service.account_balance(&account).await?, 1000);

    Ok(())
}

#[tokio::test]
async fn test_deposit_to_missing_account() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let err = service.deposit("000000000000", 100).await.unwrap_err();
    assert!(matches!(err, AppError::AccountNotFound(_)));

    Ok(())
}

#[tokio::test]
async fn test_deposit_amounts_are_not_granularity_checked() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let account = open_funded_account(&service, "111122223333", 0).await?;

    // 1234 would be rejected by the withdrawal rule
    let updated = service.deposit(&account, 1234).await?;
    assert_eq!(updated, 1234);

    Ok(())
}

// ========================
// Withdrawals
// ========================

#[tokio::test]
async fn test_withdraw_happy_path_boundary_inclusive() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let account = open_funded_account(&service, "111122223333", 5000).await?;

    // 5000 - 2000 = 3000, exactly at the floor: allowed
    let updated = service.withdraw(&account, 2000).await?;
    assert_eq!(updated, 3000);
    assert_eq!(service.account_balance(&account).await?, 3000);

    Ok(())
}

#[tokio::test]
async fn test_withdraw_granularity_rule_is_literal() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let account = open_funded_account(&service, "111122223333", 100000).await?;

    // 1000 is a multiple of 500 but not of 2000: rejected
    let err = service.withdraw(&account, 1000).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidAmount(_)));

    // 500 likewise
    let err = service.withdraw(&account, 500).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidAmount(_)));

    // 2000 is a multiple of both: accepted
    let updated = service.withdraw(&account, 2000).await?;
    assert_eq!(updated, 98000);

    // 4000 accepted as well
    let updated = service.withdraw(&account, 4000).await?;
    assert_eq!(updated, 94000);

    Ok(())
}

#[tokio::test]
async fn test_withdraw_granularity_checked_before_existence() -> Result<()> {
    let (service, _temp) = test_service().await?;

    // The amount check short-circuits before the account lookup
    let err = service.withdraw("000000000000", 1000).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidAmount(_)));

    let err = service.withdraw("000000000000", 2000).await.unwrap_err();
    assert!(matches!(err, AppError::AccountNotFound(_)));

    Ok(())
}

#[tokio::test]
async fn test_withdraw_rejected_below_floor() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let account = open_funded_account(&service, "111122223333", 2500).await?;

    let err = service.withdraw(&account, 2000).await.unwrap_err();
    assert!(matches!(err, AppError::InsufficientFunds { balance: 2500 }));
    assert_eq!(err.status_code(), 406);

    assert_eq!(service.account_balance(&account).await?, 2500);

    Ok(())
}

#[tokio::test]
async fn test_withdraw_cannot_breach_floor() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let account = open_funded_account(&service, "111122223333", 3000).await?;

    // 3000 - 2000 = 1000 < 3000: rejected, reports max withdrawable 0
    let err = service.withdraw(&account, 2000).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::ExceedsWithdrawable {
            balance: 3000,
            max_withdrawable: 0,
        }
    ));

    assert_eq!(service.account_balance(&account).await?, 3000);

    Ok(())
}

#[tokio::test]
async fn test_withdraw_negative_amount_credits_the_account() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let account = open_funded_account(&service, "111122223333", 5000).await?;

    // -2000 is a multiple of both 500 and 2000, and 5000 - (-2000)
    // stays above the floor, so the "withdrawal" goes through and
    // credits the account. Long-standing behavior, kept as is.
    let updated = service.withdraw(&account, -2000).await?;
    assert_eq!(updated, 7000);
    assert_eq!(service.account_balance(&account).await?, 7000);

    Ok(())
}

#[tokio::test]
async fn test_balance_never_negative_after_permitted_operations() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let account = open_funded_account(&service, "111122223333", 9000).await?;

    let _ = service.withdraw(&account, 2000).await;
    let _ = service.withdraw(&account, 4000).await;
    let _ = service.withdraw(&account, 2000).await;
    let _ = service.withdraw(&account, 2000).await;

    let balance = service.account_balance(&account).await?;
    assert!(balance >= 0);
    assert!(balance >= 3000, "floor must hold after any withdrawal mix");

    Ok(())
}
