use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::json;

use crate::application::{ApiResponse, BankConfig, BankService, NewCustomer};
use crate::domain::{Paise, format_paise, parse_paise};
use crate::storage::AccountField;

/// Passbook - Bank Account Management
#[derive(Parser)]
#[command(name = "passbook")]
#[command(about = "A local-first bank account management service")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, default_value = "passbook.db")]
    pub database: String,

    /// Opening balance (in rupees) for newly created accounts
    #[arg(long, global = true, default_value = "0", value_parser = parse_paise)]
    pub opening_balance: Paise,

    /// Active accounts below this balance (in rupees) are deactivated
    /// by the sweep
    #[arg(long, global = true, default_value = "0.01", value_parser = parse_paise)]
    pub invalid_threshold: Paise,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Open an account for a new customer
    Open {
        /// Customer name
        name: String,

        /// Aadhaar number (unique per customer)
        #[arg(long)]
        aadhaar: String,

        /// Contact email
        #[arg(long)]
        email: Option<String>,

        /// Contact phone number
        #[arg(long)]
        phone: Option<String>,
    },

    /// Show account details
    Details {
        /// Account number
        account_number: String,
    },

    /// Show account balance
    Balance {
        /// Account number
        account_number: String,
    },

    /// Deposit an amount into an account
    Deposit {
        /// Account number
        account_number: String,

        /// Amount in rupees, e.g. 20 or 12.34
        #[arg(value_parser = parse_paise)]
        amount: Paise,
    },

    /// Withdraw an amount from an account
    Withdraw {
        /// Account number
        account_number: String,

        /// Amount in rupees (multiples of 5 / 20 rule applies)
        #[arg(value_parser = parse_paise)]
        amount: Paise,
    },

    /// Transfer an amount between two accounts
    Transfer {
        /// Amount in rupees
        #[arg(value_parser = parse_paise)]
        amount: Paise,

        /// Source account number
        #[arg(long)]
        from: String,

        /// Destination account number
        #[arg(long)]
        to: String,
    },

    /// Deactivate all invalid accounts (soft delete)
    Deactivate,
}

impl Cli {
    fn config(&self) -> BankConfig {
        BankConfig {
            opening_balance: self.opening_balance,
            invalid_balance_threshold: self.invalid_threshold,
            ..BankConfig::default()
        }
    }

    pub async fn run(self) -> Result<()> {
        let config = self.config();

        let envelope = match self.command {
            Commands::Init => {
                BankService::init(&self.database, config).await?;
                ApiResponse::message_only(format!("Database initialized: {}", self.database))
            }

            Commands::Open {
                name,
                aadhaar,
                email,
                phone,
            } => {
                let service = BankService::connect(&self.database, config).await?;
                let result = service
                    .open_account(NewCustomer {
                        name,
                        aadhaar,
                        email,
                        phone,
                    })
                    .await;

                match result {
                    Ok(opened) => {
                        let message = format!(
                            "Account has been created under Aadhaar {}",
                            opened.customer.aadhaar
                        );
                        ApiResponse::ok(
                            json!({
                                "account_holder_details": opened.customer,
                                "account_details": opened.account,
                            }),
                            message,
                        )
                    }
                    Err(ref err) => ApiResponse::from(err),
                }
            }

            Commands::Details { account_number } => {
                let service = BankService::connect(&self.database, config).await?;
                let result = service
                    .account_details(AccountField::AccountNumber, &account_number)
                    .await;

                match result {
                    Ok(details) => ApiResponse::ok(
                        json!({
                            "account": details.account,
                            "account_holder": details.holder,
                        }),
                        "Retrieved account details",
                    ),
                    Err(ref err) => ApiResponse::from(err),
                }
            }

            Commands::Balance { account_number } => {
                let service = BankService::connect(&self.database, config).await?;
                match service.account_balance(&account_number).await {
                    Ok(balance) => ApiResponse::ok(
                        json!({ "balance": balance, "display": format_paise(balance) }),
                        "Retrieved account balance",
                    ),
                    Err(ref err) => ApiResponse::from(err),
                }
            }

            Commands::Deposit {
                account_number,
                amount,
            } => {
                let service = BankService::connect(&self.database, config).await?;
                match service.deposit(&account_number, amount).await {
                    Ok(updated_balance) => ApiResponse::ok(
                        json!({ "updated_balance": updated_balance }),
                        format!("{} deposited into your account", format_paise(amount)),
                    ),
                    Err(ref err) => ApiResponse::from(err),
                }
            }

            Commands::Withdraw {
                account_number,
                amount,
            } => {
                let service = BankService::connect(&self.database, config).await?;
                match service.withdraw(&account_number, amount).await {
                    Ok(updated_balance) => ApiResponse::ok(
                        json!({ "updated_balance": updated_balance }),
                        format!("{} withdrawn from your account", format_paise(amount)),
                    ),
                    Err(ref err) => ApiResponse::from(err),
                }
            }

            Commands::Transfer { amount, from, to } => {
                let service = BankService::connect(&self.database, config).await?;
                match service.transfer(&from, &to, amount).await {
                    Ok(updated_balance) => ApiResponse::ok(
                        json!({ "updated_balance": updated_balance }),
                        format!(
                            "Transferred {} from {} to {}",
                            format_paise(amount),
                            from,
                            to
                        ),
                    ),
                    Err(ref err) => ApiResponse::from(err),
                }
            }

            Commands::Deactivate => {
                let service = BankService::connect(&self.database, config).await?;
                match service.deactivate_invalid_accounts().await {
                    Ok(deactivated) => {
                        let message = format!("Deactivated {} account(s)", deactivated.len());
                        ApiResponse::ok(json!({ "deactivated_accounts": deactivated }), message)
                    }
                    Err(ref err) => ApiResponse::from(err),
                }
            }
        };

        println!("{}", serde_json::to_string_pretty(&envelope)?);
        Ok(())
    }
}
