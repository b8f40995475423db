//! # Courier Bot Library
//!
//! This crate runs Courier as a Telegram bot: a single authorized user
//! browses the host's filesystem through inline keyboards and fetches files
//! with live upload progress.
//!
//! ## Overview
//!
//! - **Configuration**: TOML file plus environment overrides
//! - **Chat seam**: the [`ChatClient`] trait and the interactions it delivers
//! - **Router**: access checks, commands, navigation and file sends
//! - **Transfer**: throttled progress edits while a file uploads
//! - **Telegram**: Bot API client and long polling
//! - **Service**: lifecycle and the poll loop
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                       BotService                         │
//! │                                                          │
//! │  getUpdates ──▶ Inbound ──▶ tokio::spawn ──▶ BotRouter   │
//! │                                               │          │
//! │                      ┌────────────────────────┤          │
//! │                      ▼                        ▼          │
//! │             explorer (listing,       ProgressReporter    │
//! │             paging, screens)                  │          │
//! │                      │                        │          │
//! │                      └──────▶ ChatClient ◀────┘          │
//! │                               (Telegram)                 │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bot::{BotService, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut config = Config::load_default()?;
//!     config.apply_env_overrides();
//!     config.validate()?;
//!
//!     let mut service = BotService::new(config)?;
//!     service.start().await?;
//!
//!     tokio::signal::ctrl_c().await?;
//!
//!     service.stop().await?;
//!     Ok(())
//! }
//! ```

pub mod chat;
pub mod config;
pub mod router;
pub mod service;
pub mod telegram;
pub mod transfer;

#[cfg(test)]
mod testing;

pub use chat::{
    ChatClient, ChatError, ChatId, Command, FileUpload, Inbound, MediaKind, MessageRef,
};
pub use config::{Config, ConfigError};
pub use router::{BotRouter, RouterSettings, View};
pub use service::{run_polling, BotService, ServiceState, UpdateSource};
pub use telegram::TelegramClient;
pub use transfer::{ProgressReporter, Throttle};
