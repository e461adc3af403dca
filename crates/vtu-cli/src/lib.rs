//! Terminal front-end for airtime/data top-ups, SMS verification numbers,
//! residential proxies and the wallet behind them.

pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod render;

pub use app::App;
pub use cli::Cli;
pub use commands::CommandHandler;
pub use config::{Config, LogFormat};
pub use error::{AppError, AppResult};
