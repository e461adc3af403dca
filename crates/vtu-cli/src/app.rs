//! Shared state handed to every command.

use crate::cli::PollingArgs;
use crate::commands::CommandHandler;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use secrecy::ExposeSecret;
use sms_order::{CancellationToken, OrderRequester, PollConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use vtu_api_client::VtuApiClient;

/// How long a command may keep running after Ctrl-C to clean up.
const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

pub struct App {
    pub client: Arc<VtuApiClient>,
    pub requester: OrderRequester,
    pub poll: PollConfig,
    pub cancel_on_abort: bool,
    /// Print raw JSON instead of formatted text
    pub json: bool,
    /// Fired on Ctrl-C; long-running commands listen to a child of it.
    pub shutdown: CancellationToken,
    pub shutdown_grace: Duration,
}

impl App {
    pub fn new(config: &Config, json: bool) -> AppResult<Self> {
        let client = Arc::new(VtuApiClient::new(
            &config.api.base_url,
            config
                .api
                .api_key
                .as_ref()
                .map(|key| key.expose_secret().clone()),
            config.api.timeout,
        )?);

        Ok(Self {
            requester: OrderRequester::new(client.clone()),
            client,
            poll: config.sms.poll_config(),
            cancel_on_abort: config.sms.cancel_on_abort,
            json,
            shutdown: CancellationToken::new(),
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        })
    }

    /// Execute a command, giving up `shutdown_grace` after Ctrl-C.
    ///
    /// Commands that listen to `shutdown` (code polling) use the grace
    /// period to cancel their order; everything else is abandoned.
    pub async fn run<C>(&self, command: &C) -> AppResult<String>
    where
        C: CommandHandler + ?Sized,
    {
        let execute = command.execute(self);
        tokio::pin!(execute);

        tokio::select! {
            result = &mut execute => result,
            _ = self.shutdown.cancelled() => {
                match tokio::time::timeout(self.shutdown_grace, &mut execute).await {
                    Ok(result) => result,
                    Err(_) => {
                        warn!("Command did not stop within {:?}", self.shutdown_grace);
                        Err(AppError::Interrupted)
                    }
                }
            }
        }
    }

    /// Configured polling parameters with command-line overrides applied.
    pub fn poll_config(&self, overrides: &PollingArgs) -> AppResult<PollConfig> {
        let config = PollConfig::new(
            overrides.interval.unwrap_or(self.poll.interval),
            overrides.attempts.unwrap_or(self.poll.max_attempts),
        );
        config
            .validate()
            .map_err(|e| AppError::Input(e.to_string()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_poll_overrides() {
        let app = App::new(&Config::default(), false).unwrap();

        let config = app.poll_config(&PollingArgs::default()).unwrap();
        assert_eq!(config, PollConfig::new(Duration::from_secs(5), 60));

        let config = app
            .poll_config(&PollingArgs {
                interval: Some(Duration::from_secs(2)),
                attempts: None,
            })
            .unwrap();
        assert_eq!(config, PollConfig::new(Duration::from_secs(2), 60));

        let zero = PollingArgs {
            interval: None,
            attempts: Some(0),
        };
        assert!(matches!(app.poll_config(&zero), Err(AppError::Input(_))));
    }
}
