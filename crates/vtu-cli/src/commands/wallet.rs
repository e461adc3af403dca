use crate::app::App;
use crate::cli::WalletCommand;
use crate::commands::{output, CommandHandler};
use crate::error::AppResult;
use crate::render::format_naira;
use async_trait::async_trait;

#[async_trait]
impl CommandHandler for WalletCommand {
    async fn execute(&self, app: &App) -> AppResult<String> {
        match self {
            WalletCommand::Balance => {
                let wallet = app.client.wallet_balance().await?;
                output(app, &wallet, |wallet| {
                    if wallet.currency == "NGN" {
                        format!("Balance: {}", format_naira(wallet.balance))
                    } else {
                        format!("Balance: {} {}", wallet.balance, wallet.currency)
                    }
                })
            }
        }
    }
}
