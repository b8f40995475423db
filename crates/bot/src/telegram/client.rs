//! Bot API client over HTTPS.

use std::time::Duration;

use explorer::{content_type, Keyboard, TransferProgress};
use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::Body;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::watch;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

use super::types::{
    AnswerCallbackQuery, ApiResponse, BotCommand, DeleteMessage, EditMessageText, GetUpdates,
    InlineKeyboardMarkup, Message, ReplyParameters, SendMessage, SetMyCommands, Update, User,
};
use crate::chat::{ChatClient, ChatError, ChatId, Command, FileUpload, MediaKind, MessageRef};
use crate::config::TelegramConfig;

const PARSE_MODE: &str = "HTML";

/// Timeout for ordinary requests. Long polls add the poll timeout on top.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Updates the bot subscribes to.
const ALLOWED_UPDATES: &[&str] = &["message", "callback_query"];

/// Edits that change nothing are rejected with this description.
const NOT_MODIFIED: &str = "message is not modified";

/// HTTP client for one bot.
pub struct TelegramClient {
    http: reqwest::Client,
    /// `{api_url}/bot{token}`; never logged.
    base_url: String,
    poll_timeout: Duration,
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("poll_timeout", &self.poll_timeout)
            .finish_non_exhaustive()
    }
}

impl TelegramClient {
    pub fn new(config: &TelegramConfig) -> Result<Self, ChatError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("courier-bot/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: format!(
                "{}/bot{}",
                config.api_url.trim_end_matches('/'),
                config.bot_token
            ),
            poll_timeout: Duration::from_secs(config.poll_timeout_secs),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    async fn call<P, T>(&self, method: &str, params: &P, timeout: Duration) -> Result<T, ChatError>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .http
            .post(self.method_url(method))
            .json(params)
            .timeout(timeout)
            .send()
            .await?;

        let body: ApiResponse<T> = response.json().await?;
        body.into_result()
    }

    /// Identity of the bot behind the token.
    pub async fn get_me(&self) -> Result<User, ChatError> {
        self.call("getMe", &serde_json::json!({}), REQUEST_TIMEOUT)
            .await
    }

    /// Long-poll for updates with ids at or above `offset`.
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, ChatError> {
        let params = GetUpdates {
            offset,
            timeout: self.poll_timeout.as_secs(),
            allowed_updates: ALLOWED_UPDATES,
        };
        self.call("getUpdates", &params, REQUEST_TIMEOUT + self.poll_timeout)
            .await
    }

    /// Publish the command menu.
    pub async fn set_my_commands(&self) -> Result<(), ChatError> {
        let params = SetMyCommands {
            commands: Command::ALL
                .iter()
                .map(|c| BotCommand {
                    command: c.name(),
                    description: c.description(),
                })
                .collect(),
        };
        let _: bool = self.call("setMyCommands", &params, REQUEST_TIMEOUT).await?;
        Ok(())
    }
}

/// Method name and form field for each delivery kind.
fn upload_method(kind: MediaKind) -> (&'static str, &'static str) {
    match kind {
        MediaKind::Photo => ("sendPhoto", "photo"),
        MediaKind::Video => ("sendVideo", "video"),
        MediaKind::Audio => ("sendAudio", "audio"),
        MediaKind::Document => ("sendDocument", "document"),
    }
}

impl ChatClient for TelegramClient {
    async fn send_message(
        &self,
        chat: ChatId,
        text: &str,
        keyboard: Option<&Keyboard>,
        reply_to: Option<i64>,
    ) -> Result<MessageRef, ChatError> {
        let params = SendMessage {
            chat_id: chat.0,
            text,
            parse_mode: PARSE_MODE,
            reply_markup: keyboard.map(InlineKeyboardMarkup::from),
            reply_parameters: reply_to.map(ReplyParameters::to),
        };
        let message: Message = self.call("sendMessage", &params, REQUEST_TIMEOUT).await?;
        Ok(MessageRef::new(ChatId(message.chat.id), message.message_id))
    }

    async fn edit_message(
        &self,
        message: &MessageRef,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), ChatError> {
        let params = EditMessageText {
            chat_id: message.chat.0,
            message_id: message.message_id,
            text,
            parse_mode: PARSE_MODE,
            reply_markup: keyboard.map(InlineKeyboardMarkup::from),
        };

        // The result is the edited message, or `true` for inline messages.
        match self
            .call::<_, serde_json::Value>("editMessageText", &params, REQUEST_TIMEOUT)
            .await
        {
            Ok(_) => Ok(()),
            Err(ChatError::Api { description, .. }) if description.contains(NOT_MODIFIED) => {
                debug!(message_id = message.message_id, "Edit left message unchanged");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn delete_message(&self, message: &MessageRef) -> Result<(), ChatError> {
        let params = DeleteMessage {
            chat_id: message.chat.0,
            message_id: message.message_id,
        };
        let _: bool = self.call("deleteMessage", &params, REQUEST_TIMEOUT).await?;
        Ok(())
    }

    async fn answer_button(
        &self,
        callback_id: &str,
        text: Option<&str>,
        show_alert: bool,
    ) -> Result<(), ChatError> {
        let params = AnswerCallbackQuery {
            callback_query_id: callback_id,
            text,
            show_alert,
        };
        let _: bool = self
            .call("answerCallbackQuery", &params, REQUEST_TIMEOUT)
            .await?;
        Ok(())
    }

    async fn send_file(
        &self,
        chat: ChatId,
        reply_to: Option<i64>,
        upload: FileUpload,
        progress: watch::Sender<TransferProgress>,
    ) -> Result<(), ChatError> {
        let (method, field) = upload_method(upload.kind);
        let file = tokio::fs::File::open(&upload.path).await?;

        let total = upload.size;
        let mut sent = 0u64;
        let stream = ReaderStream::new(file).map(move |chunk| {
            if let Ok(bytes) = &chunk {
                sent += bytes.len() as u64;
                progress.send_replace(TransferProgress::new(sent, total));
            }
            chunk
        });

        let part = Part::stream_with_length(Body::wrap_stream(stream), total)
            .file_name(upload.file_name.clone())
            .mime_str(&content_type(&upload.file_name))?;

        let mut form = Form::new()
            .text("chat_id", chat.0.to_string())
            .text("caption", upload.caption)
            .text("parse_mode", PARSE_MODE);

        if let Some(message_id) = reply_to {
            let reply = serde_json::to_string(&ReplyParameters::to(message_id))
                .map_err(|e| ChatError::Decode(e.to_string()))?;
            form = form.text("reply_parameters", reply);
        }
        if upload.kind == MediaKind::Video {
            form = form.text("supports_streaming", "true");
        }
        let form = form.part(field, part);

        info!(method, file = %upload.file_name, size = total, "Uploading file");

        // No timeout: large files legitimately take a long time.
        let response = self
            .http
            .post(self.method_url(method))
            .multipart(form)
            .send()
            .await?;

        let body: ApiResponse<Message> = response.json().await?;
        body.into_result()?;
        Ok(())
    }
}
