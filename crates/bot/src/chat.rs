//! The chat platform seam.
//!
//! Everything the bot needs from a chat service goes through [`ChatClient`]:
//! posting, editing and deleting messages, answering button presses and
//! uploading files. Inbound traffic arrives as [`Inbound`] values, already
//! stripped of platform detail.

use std::future::Future;
use std::path::PathBuf;

use explorer::{Category, Keyboard, TransferProgress, UserId};
use thiserror::Error;
use tokio::sync::watch;

/// Images larger than this are sent as plain documents.
pub const PHOTO_SIZE_LIMIT: u64 = 10 * 1024 * 1024;

/// A conversation the bot can post into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

impl std::fmt::Display for ChatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A message previously posted by the bot or received from the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageRef {
    pub chat: ChatId,
    pub message_id: i64,
}

impl MessageRef {
    pub fn new(chat: ChatId, message_id: i64) -> Self {
        Self { chat, message_id }
    }
}

/// How a file is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Photo,
    Video,
    Audio,
    Document,
}

impl MediaKind {
    /// Pick the delivery for a file of the given category and size.
    pub fn for_file(category: Category, size: u64) -> Self {
        match category {
            Category::Image if size <= PHOTO_SIZE_LIMIT => MediaKind::Photo,
            Category::Video => MediaKind::Video,
            Category::Audio => MediaKind::Audio,
            _ => MediaKind::Document,
        }
    }
}

/// A file to send, with the caption to attach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub path: PathBuf,
    pub file_name: String,
    pub size: u64,
    pub kind: MediaKind,
    pub caption: String,
}

/// Slash commands the bot understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Browse,
}

impl Command {
    /// Parse a message text such as `/browse` or `/help@my_bot extra`.
    pub fn parse(text: &str) -> Option<Self> {
        let word = text.split_whitespace().next()?;
        let name = word.strip_prefix('/')?;
        let name = name.split('@').next().unwrap_or(name);

        match name.to_ascii_lowercase().as_str() {
            "start" => Some(Command::Start),
            "help" => Some(Command::Help),
            "browse" => Some(Command::Browse),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Help => "help",
            Command::Browse => "browse",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Command::Start => "Start the bot",
            Command::Help => "Show help information",
            Command::Browse => "Browse files and folders",
        }
    }

    pub const ALL: [Command; 3] = [Command::Start, Command::Browse, Command::Help];
}

/// An interaction from a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A slash command sent as a message.
    Command {
        caller: UserId,
        message: MessageRef,
        command: Command,
    },
    /// A press on an inline keyboard button attached to `message`.
    ButtonPress {
        caller: UserId,
        message: MessageRef,
        callback_id: String,
        data: String,
    },
}

impl Inbound {
    pub fn caller(&self) -> UserId {
        match self {
            Inbound::Command { caller, .. } | Inbound::ButtonPress { caller, .. } => *caller,
        }
    }

    pub fn message(&self) -> MessageRef {
        match self {
            Inbound::Command { message, .. } | Inbound::ButtonPress { message, .. } => *message,
        }
    }
}

/// Errors reported by a chat client.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The request never got a usable response.
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// The platform rejected the request.
    #[error("API error {code}: {description}")]
    Api { code: i64, description: String },

    /// Too many requests; retry after the given number of seconds.
    #[error("rate limited, retry after {0}s")]
    RateLimited(u64),

    /// Reading the file to upload failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The response could not be understood.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        // Request URLs carry the bot token.
        ChatError::Http(err.without_url())
    }
}

/// Operations the bot performs against the chat platform.
///
/// Futures are `Send` so handlers can run on spawned tasks.
pub trait ChatClient: Send + Sync {
    /// Post a message, optionally as a reply and with a keyboard.
    fn send_message(
        &self,
        chat: ChatId,
        text: &str,
        keyboard: Option<&Keyboard>,
        reply_to: Option<i64>,
    ) -> impl Future<Output = Result<MessageRef, ChatError>> + Send;

    /// Replace the text and keyboard of a message the bot posted.
    fn edit_message(
        &self,
        message: &MessageRef,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> impl Future<Output = Result<(), ChatError>> + Send;

    fn delete_message(
        &self,
        message: &MessageRef,
    ) -> impl Future<Output = Result<(), ChatError>> + Send;

    /// Acknowledge a button press, optionally with a toast or alert.
    fn answer_button(
        &self,
        callback_id: &str,
        text: Option<&str>,
        show_alert: bool,
    ) -> impl Future<Output = Result<(), ChatError>> + Send;

    /// Upload a file, publishing progress samples as bytes go out.
    fn send_file(
        &self,
        chat: ChatId,
        reply_to: Option<i64>,
        upload: FileUpload,
        progress: watch::Sender<TransferProgress>,
    ) -> impl Future<Output = Result<(), ChatError>> + Send;
}
