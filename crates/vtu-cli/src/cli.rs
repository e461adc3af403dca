//! Command-line interface definition.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use vtu_api_client::{NetworkCode, SelectionMode};

#[derive(Debug, Parser)]
#[command(name = "vtu")]
#[command(about = "Airtime, data, virtual numbers and proxies from the terminal", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Optional TOML configuration file (environment variables still apply)
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Print raw JSON instead of formatted text
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Virtual numbers for SMS verification
    #[command(subcommand)]
    Sms(SmsCommand),
    /// Airtime and data top-ups
    #[command(subcommand)]
    Vtu(VtuCommand),
    /// Residential proxy management
    #[command(subcommand)]
    Proxy(ProxyCommand),
    /// Wallet information
    #[command(subcommand)]
    Wallet(WalletCommand),
    /// Check that the backend is reachable
    Health,
}

#[derive(Debug, Subcommand)]
pub enum SmsCommand {
    /// List supported countries
    Countries,
    /// List services available in a country
    Services {
        #[arg(long, default_value = "ng")]
        country: String,
    },
    /// List providers for a country and service
    Providers {
        #[arg(long, default_value = "ng")]
        country: String,
        #[arg(long)]
        service: String,
    },
    /// Rent a virtual number
    Order {
        #[arg(long, default_value = "ng")]
        country: String,
        #[arg(long)]
        service: String,
        /// Provider selection: auto or manual
        #[arg(long, default_value = "auto")]
        mode: SelectionMode,
        /// Provider id, required in manual mode
        #[arg(long)]
        provider: Option<String>,
        /// Keep polling until the code arrives
        #[arg(long)]
        wait: bool,
        #[command(flatten)]
        polling: PollingArgs,
    },
    /// Fetch the code for an order
    Code {
        order_id: String,
        /// Keep polling until the code arrives
        #[arg(long)]
        wait: bool,
        #[command(flatten)]
        polling: PollingArgs,
    },
    /// Cancel a pending order
    Cancel { order_id: String },
    /// Show order statistics
    Stats,
}

/// Overrides for the configured polling parameters.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct PollingArgs {
    /// Delay between code requests, e.g. "5s"
    #[arg(long, value_parser = parse_duration)]
    pub interval: Option<Duration>,
    /// Number of code requests before giving up
    #[arg(long)]
    pub attempts: Option<u32>,
}

#[derive(Debug, Subcommand)]
pub enum VtuCommand {
    /// List mobile networks
    Networks,
    /// List data bundles for a network
    Bundles {
        #[arg(long)]
        network: NetworkCode,
    },
    /// Buy airtime
    Airtime {
        #[arg(long)]
        phone: String,
        /// Amount in naira
        #[arg(long)]
        amount: u32,
        /// Network, detected from the number when omitted
        #[arg(long)]
        network: Option<NetworkCode>,
    },
    /// Buy a data bundle
    Data {
        #[arg(long)]
        phone: String,
        #[arg(long)]
        bundle: String,
        /// Network, detected from the number when omitted
        #[arg(long)]
        network: Option<NetworkCode>,
    },
}

#[derive(Debug, Subcommand)]
pub enum ProxyCommand {
    /// Show the proxy account profile
    Profile,
    /// List assigned proxies
    List,
    /// Show usage statistics
    Stats,
    /// List purchasable plans
    Plans,
    /// Show account proxy settings
    Config,
    /// List IPs allowed without credentials
    AuthorizedIps,
    /// Allow an IP to use the proxies without credentials
    AuthorizeIp {
        ip: String,
        #[arg(long)]
        label: Option<String>,
    },
    /// Remove an authorized IP
    RevokeIp { ip: String },
    /// Show recent account activity
    Activities {
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
}

#[derive(Debug, Subcommand)]
pub enum WalletCommand {
    /// Show the wallet balance
    Balance,
}

fn parse_duration(s: &str) -> Result<Duration, String> {
    humantime_serde::re::humantime::parse_duration(s).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_order_with_polling_overrides() {
        let cli = Cli::try_parse_from([
            "vtu", "sms", "order", "--service", "wa", "--mode", "manual", "--provider",
            "smspool", "--wait", "--interval", "2s", "--attempts", "10",
        ])
        .unwrap();

        match cli.command {
            Command::Sms(SmsCommand::Order {
                country,
                mode,
                provider,
                wait,
                polling,
                ..
            }) => {
                assert_eq!(country, "ng");
                assert_eq!(mode, SelectionMode::Manual);
                assert_eq!(provider.as_deref(), Some("smspool"));
                assert!(wait);
                assert_eq!(polling.interval, Some(Duration::from_secs(2)));
                assert_eq!(polling.attempts, Some(10));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_network_value() {
        let cli = Cli::try_parse_from(["vtu", "vtu", "bundles", "--network", "9mobile"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Vtu(VtuCommand::Bundles {
                network: NetworkCode::NineMobile
            })
        ));

        assert!(Cli::try_parse_from(["vtu", "vtu", "bundles", "--network", "vodafone"]).is_err());
    }

    #[test]
    fn test_global_json_flag() {
        let cli = Cli::try_parse_from(["vtu", "wallet", "balance", "--json"]).unwrap();
        assert!(cli.json);
    }
}
