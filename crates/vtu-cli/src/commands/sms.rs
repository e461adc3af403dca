//! Virtual number commands.

use crate::app::App;
use crate::cli::{PollingArgs, SmsCommand};
use crate::commands::{output, CommandHandler};
use crate::error::AppResult;
use crate::render::{format_naira, format_remaining, list};
use async_trait::async_trait;
use chrono::Utc;
use sms_order::{OrderError, OrderRequest, PollEvent};
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};
use vtu_api_client::Order;

#[async_trait]
impl CommandHandler for SmsCommand {
    async fn execute(&self, app: &App) -> AppResult<String> {
        match self {
            SmsCommand::Countries => {
                let countries = app.client.list_countries().await?;
                output(app, &countries, |countries| {
                    list("Countries:", countries, "No countries available.", |c| {
                        match &c.dial_code {
                            Some(dial) => format!("- {} {} ({})", c.code, c.name, dial),
                            None => format!("- {} {}", c.code, c.name),
                        }
                    })
                })
            }
            SmsCommand::Services { country } => {
                let services = app.client.list_services(country).await?;
                output(app, &services, |services| {
                    list("Services:", services, "No services available.", |s| {
                        format!(
                            "- {} {} {}{}",
                            s.code,
                            s.name,
                            format_naira(s.price),
                            if s.available { "" } else { " (unavailable)" }
                        )
                    })
                })
            }
            SmsCommand::Providers { country, service } => {
                let providers = app.client.list_providers(country, service).await?;
                output(app, &providers, |providers| {
                    list("Providers:", providers, "No providers available.", |p| {
                        let rate = p
                            .success_rate
                            .map(|r| format!(" {:.0}% success", r * 100.0))
                            .unwrap_or_default();
                        format!(
                            "- {} {} {}{}{}",
                            p.id,
                            p.name,
                            format_naira(p.price),
                            rate,
                            if p.available { "" } else { " (unavailable)" }
                        )
                    })
                })
            }
            SmsCommand::Order {
                country,
                service,
                mode,
                provider,
                wait,
                polling,
            } => {
                let request = OrderRequest {
                    country: country.clone(),
                    service: service.clone(),
                    mode: *mode,
                    provider: provider.clone(),
                };
                let order = app.requester.request(&request).await?;

                if !*wait {
                    return output(app, &order, describe_order);
                }

                // Show the number before blocking so it can be used right away.
                if !app.json {
                    println!("{}", describe_order(&order));
                }
                let code = wait_for_code(app, &order.id, polling).await?;
                let order = app.requester.cached(&order.id).await.unwrap_or(order);
                output(app, &order, |_| format!("Code: {}", code))
            }
            SmsCommand::Code {
                order_id,
                wait,
                polling,
            } => {
                if *wait {
                    let code = wait_for_code(app, order_id, polling).await?;
                    return output(
                        app,
                        &serde_json::json!({"order_id": order_id, "code": code}),
                        |_| format!("Code: {}", code),
                    );
                }

                let answer = app.client.get_code(order_id).await?;
                output(app, &answer, |answer| match answer.code() {
                    Some(code) => format!("Code: {}", code),
                    None => format!("No code yet (status: {})", answer.status),
                })
            }
            SmsCommand::Cancel { order_id } => {
                let order = app.requester.cancel(order_id).await?;
                output(app, &order, |order| {
                    format!("Order {} is now {}", order.id, order.status)
                })
            }
            SmsCommand::Stats => {
                let stats = app.client.sms_stats().await?;
                output(app, &stats, |stats| {
                    format!(
                        "Orders: {} total, {} completed, {} pending, {} cancelled\nSpent: {}",
                        stats.total_orders,
                        stats.completed_orders,
                        stats.pending_orders,
                        stats.cancelled_orders,
                        format_naira(stats.total_spent)
                    )
                })
            }
        }
    }
}

fn describe_order(order: &Order) -> String {
    let mut lines = vec![
        format!("Order:    {}", order.id),
        format!("Number:   {}", order.phone_number),
        format!("Service:  {} ({})", order.service, order.country),
        format!("Cost:     {}", format_naira(order.cost)),
        format!("Status:   {}", order.status),
        format!("Expires:  in {}", format_remaining(order.remaining(Utc::now()))),
    ];
    if let Some(provider) = &order.provider {
        lines.push(format!("Provider: {} ({})", provider, order.mode));
    }
    if let Some(code) = &order.code {
        lines.push(format!("Code:     {}", code));
    }
    lines.join("\n")
}

/// Poll until the code arrives, reporting progress through the log.
///
/// When Ctrl-C interrupts the wait the order is cancelled on the backend
/// if `sms.cancel_on_abort` is set.
async fn wait_for_code(app: &App, order_id: &str, polling: &PollingArgs) -> AppResult<String> {
    let config = app.poll_config(polling)?;
    let poller = app.requester.poller(config);
    let events = poller.events(order_id, app.shutdown.child_token());
    tokio::pin!(events);

    info!(
        order_id,
        max_attempts = config.max_attempts,
        budget = ?config.budget(),
        "Waiting for code"
    );

    while let Some(event) = events.next().await {
        match event {
            Ok(PollEvent::Waiting {
                attempt,
                max_attempts,
            }) => debug!(order_id, attempt, max_attempts, "No code yet"),
            Ok(PollEvent::RequestFailed { attempt, .. }) => {
                debug!(order_id, attempt, "Retrying after failed code request")
            }
            Ok(PollEvent::CodeReceived { code, .. }) => return Ok(code),
            Err(OrderError::Cancelled) => {
                if app.cancel_on_abort {
                    if let Err(e) = app.requester.cancel(order_id).await {
                        warn!(order_id, "Could not cancel order: {}", e);
                    }
                }
                return Err(OrderError::Cancelled.into());
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(OrderError::Timeout {
        attempts: config.max_attempts,
    }
    .into())
}
