//! Residential proxy commands.

use crate::app::App;
use crate::cli::ProxyCommand;
use crate::commands::{output, CommandHandler};
use crate::error::AppResult;
use crate::render::{format_naira, list};
use async_trait::async_trait;
use tracing::info;

#[async_trait]
impl CommandHandler for ProxyCommand {
    async fn execute(&self, app: &App) -> AppResult<String> {
        match self {
            ProxyCommand::Profile => {
                let profile = app.client.proxy_profile().await?;
                output(app, &profile, |p| {
                    let mut lines = vec![
                        format!("User:      {}", p.username),
                        format!("Plan:      {}", p.plan.as_deref().unwrap_or("none")),
                        format!("Balance:   {}", format_naira(p.balance)),
                    ];
                    lines.push(match (p.bandwidth_limit_mb, p.bandwidth_remaining_mb()) {
                        (Some(limit), Some(left)) => {
                            format!("Bandwidth: {} MB of {} MB left", left, limit)
                        }
                        _ => format!("Bandwidth: {} MB used (unmetered)", p.bandwidth_used_mb),
                    });
                    if let Some(expires) = p.expires_at {
                        lines.push(format!("Expires:   {}", expires.format("%Y-%m-%d %H:%M UTC")));
                    }
                    lines.join("\n")
                })
            }
            ProxyCommand::List => {
                let proxies = app.client.list_proxies().await?;
                output(app, &proxies, |proxies| {
                    list("Proxies:", proxies, "No proxies assigned.", |p| {
                        format!(
                            "- {} {} [{:?}]{}",
                            p.id,
                            p.url(),
                            p.status,
                            p.country
                                .as_deref()
                                .map(|c| format!(" {}", c))
                                .unwrap_or_default()
                        )
                    })
                })
            }
            ProxyCommand::Stats => {
                let stats = app.client.proxy_stats().await?;
                output(app, &stats, |s| {
                    let rate = s
                        .success_rate()
                        .map(|r| format!("{:.1}%", r * 100.0))
                        .unwrap_or_else(|| "n/a".into());
                    format!(
                        "Requests: {} ({} ok, {} failed, success {})\nBandwidth: {} MB\nActive proxies: {}",
                        s.total_requests,
                        s.successful_requests,
                        s.failed_requests,
                        rate,
                        s.bandwidth_used_mb,
                        s.active_proxies
                    )
                })
            }
            ProxyCommand::Plans => {
                let plans = app.client.proxy_plans().await?;
                output(app, &plans, |plans| {
                    list("Plans:", plans, "No plans available.", |p| {
                        let bandwidth = p
                            .bandwidth_mb
                            .map(|mb| format!("{} MB", mb))
                            .unwrap_or_else(|| "unmetered".into());
                        format!(
                            "- {} {} {} / {} days, {}",
                            p.id,
                            p.name,
                            format_naira(p.price),
                            p.duration_days,
                            bandwidth
                        )
                    })
                })
            }
            ProxyCommand::Config => {
                let settings = app.client.proxy_settings().await?;
                output(app, &settings, |s| {
                    let countries = if s.allowed_countries.is_empty() {
                        "any".to_string()
                    } else {
                        s.allowed_countries.join(", ")
                    };
                    format!(
                        "Rotation: {}\nSticky session: {}\nDefault protocol: {}\nCountries: {}",
                        s.rotation.as_deref().unwrap_or("default"),
                        s.sticky_session_minutes
                            .map(|m| format!("{} min", m))
                            .unwrap_or_else(|| "off".into()),
                        s.default_protocol
                            .map(|p| format!("{:?}", p).to_lowercase())
                            .unwrap_or_else(|| "default".into()),
                        countries
                    )
                })
            }
            ProxyCommand::AuthorizedIps => {
                let ips = app.client.authorized_ips().await?;
                output(app, &ips, |ips| {
                    list("Authorized IPs:", ips, "No authorized IPs.", |a| {
                        match &a.label {
                            Some(label) => format!("- {} ({})", a.ip, label),
                            None => format!("- {}", a.ip),
                        }
                    })
                })
            }
            ProxyCommand::AuthorizeIp { ip, label } => {
                let authorization = app.client.authorize_ip(ip, label.as_deref()).await?;
                info!(ip = %authorization.ip, "IP authorized");
                output(app, &authorization, |a| format!("Authorized {}", a.ip))
            }
            ProxyCommand::RevokeIp { ip } => {
                app.client.revoke_ip(ip).await?;
                info!(ip = %ip, "IP revoked");
                output(app, &serde_json::json!({"ip": ip, "revoked": true}), |_| {
                    format!("Revoked {}", ip)
                })
            }
            ProxyCommand::Activities { limit } => {
                let activities = app.client.proxy_activities(*limit).await?;
                output(app, &activities, |activities| {
                    list("Recent activity:", activities, "No activity yet.", |a| {
                        let mut line = format!(
                            "- {} {}",
                            a.timestamp.format("%Y-%m-%d %H:%M"),
                            a.action
                        );
                        if let Some(ip) = &a.ip {
                            line.push_str(&format!(" from {}", ip));
                        }
                        if let Some(details) = &a.details {
                            line.push_str(&format!(": {}", details));
                        }
                        line
                    })
                })
            }
        }
    }
}
