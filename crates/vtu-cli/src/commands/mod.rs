//! Command handlers.

mod proxy;
mod sms;
mod vtu;
mod wallet;

use crate::app::App;
use crate::cli::Command;
use crate::error::AppResult;
use async_trait::async_trait;
use serde::Serialize;
use tracing::warn;

/// Command handler trait.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Execute the command and return the text to print.
    async fn execute(&self, app: &App) -> AppResult<String>;
}

#[async_trait]
impl CommandHandler for Command {
    async fn execute(&self, app: &App) -> AppResult<String> {
        match self {
            Command::Sms(command) => command.execute(app).await,
            Command::Vtu(command) => command.execute(app).await,
            Command::Proxy(command) => command.execute(app).await,
            Command::Wallet(command) => command.execute(app).await,
            Command::Health => health(app).await,
        }
    }
}

async fn health(app: &App) -> AppResult<String> {
    let healthy = app.client.health_check().await;
    if !healthy {
        warn!("Backend not reachable at {}", app.client.base_url());
    }

    if app.json {
        return Ok(serde_json::to_string_pretty(&serde_json::json!({
            "base_url": app.client.base_url(),
            "healthy": healthy,
        }))?);
    }

    Ok(if healthy {
        format!("API healthy ({})", app.client.base_url())
    } else {
        format!("API unreachable ({})", app.client.base_url())
    })
}

/// Pretty JSON when `--json` is set, otherwise the text rendering.
pub(crate) fn output<T: Serialize + ?Sized>(
    app: &App,
    value: &T,
    text: impl FnOnce(&T) -> String,
) -> AppResult<String> {
    if app.json {
        Ok(serde_json::to_string_pretty(value)?)
    } else {
        Ok(text(value))
    }
}
