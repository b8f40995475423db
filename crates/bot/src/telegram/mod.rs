//! Telegram Bot API transport.
//!
//! [`TelegramClient`] implements [`ChatClient`](crate::chat::ChatClient) with
//! HTML-formatted messages and inline keyboards, and long-polls for updates.
//! Pointing `api_url` at a local Bot API server lifts the upload limit.

mod client;
pub mod types;

pub use client::TelegramClient;
pub use types::{Update, User};
