//! Airtime and data commands.

use crate::app::App;
use crate::cli::VtuCommand;
use crate::commands::{output, CommandHandler};
use crate::error::{AppError, AppResult};
use crate::render::{format_naira, list};
use async_trait::async_trait;
use tracing::info;
use vtu_api_client::validation::detect_network;
use vtu_api_client::{AirtimeRequest, DataRequest, NetworkCode, Transaction, TransactionKind};

#[async_trait]
impl CommandHandler for VtuCommand {
    async fn execute(&self, app: &App) -> AppResult<String> {
        match self {
            VtuCommand::Networks => {
                let networks = app.client.list_networks().await?;
                output(app, &networks, |networks| {
                    list("Networks:", networks, "No networks available.", |n| {
                        format!(
                            "- {} {}{}",
                            n.code,
                            n.name,
                            if n.available { "" } else { " (unavailable)" }
                        )
                    })
                })
            }
            VtuCommand::Bundles { network } => {
                let bundles = app.client.list_bundles(*network).await?;
                output(app, &bundles, |bundles| {
                    list(
                        &format!("{} data bundles:", network),
                        bundles,
                        "No bundles available.",
                        |b| {
                            format!(
                                "- {} {} {} / {} {}",
                                b.id,
                                b.name,
                                b.size,
                                b.validity,
                                format_naira(b.price)
                            )
                        },
                    )
                })
            }
            VtuCommand::Airtime {
                phone,
                amount,
                network,
            } => {
                let network = resolve_network(phone, *network)?;
                let transaction = app
                    .client
                    .buy_airtime(&AirtimeRequest {
                        network,
                        phone: phone.clone(),
                        amount: *amount,
                    })
                    .await?;
                info!(reference = %transaction.reference, status = %transaction.status, "Airtime purchase");
                output(app, &transaction, describe_transaction)
            }
            VtuCommand::Data {
                phone,
                bundle,
                network,
            } => {
                let network = resolve_network(phone, *network)?;
                let transaction = app
                    .client
                    .buy_data(&DataRequest {
                        network,
                        phone: phone.clone(),
                        bundle_id: bundle.clone(),
                    })
                    .await?;
                info!(reference = %transaction.reference, status = %transaction.status, "Data purchase");
                output(app, &transaction, describe_transaction)
            }
        }
    }
}

/// Explicit network, or the one the number's prefix belongs to.
fn resolve_network(phone: &str, explicit: Option<NetworkCode>) -> AppResult<NetworkCode> {
    if let Some(network) = explicit {
        return Ok(network);
    }
    detect_network(phone).ok_or_else(|| {
        AppError::Input(format!(
            "Cannot detect the network for {}; pass --network",
            phone
        ))
    })
}

fn describe_transaction(transaction: &Transaction) -> String {
    let mut out = format!(
        "{} {} to {} ({}): {}\nReference: {}",
        format_naira(transaction.amount),
        match transaction.kind {
            TransactionKind::Airtime => "airtime",
            TransactionKind::Data => "data",
        },
        transaction.phone,
        transaction.network,
        transaction.status,
        transaction.reference
    );
    if let Some(description) = &transaction.description {
        out.push('\n');
        out.push_str(description);
    }
    out
}
