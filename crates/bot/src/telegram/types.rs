//! Bot API wire types.
//!
//! Only the fields the bot reads are modelled; serde ignores the rest.

use explorer::{Keyboard, UserId};
use serde::{Deserialize, Serialize};

use crate::chat::{ChatError, ChatId, Command, Inbound, MessageRef};

/// Chat type of one-to-one conversations.
const PRIVATE_CHAT: &str = "private";

/// Envelope around every Bot API result.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub error_code: Option<i64>,
    #[serde(default)]
    pub parameters: Option<ResponseParameters>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseParameters {
    #[serde(default)]
    pub retry_after: Option<u64>,
}

impl<T> ApiResponse<T> {
    /// Unwrap the result or turn the failure into a [`ChatError`].
    pub fn into_result(self) -> Result<T, ChatError> {
        if let Some(retry_after) = self.parameters.as_ref().and_then(|p| p.retry_after) {
            return Err(ChatError::RateLimited(retry_after));
        }

        if !self.ok {
            return Err(ChatError::Api {
                code: self.error_code.unwrap_or_default(),
                description: self.description.unwrap_or_default(),
            });
        }

        self.result
            .ok_or_else(|| ChatError::Decode("response has no result".to_string()))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    #[serde(default)]
    pub from: Option<User>,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub data: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

impl Update {
    /// Convert to an [`Inbound`] interaction.
    ///
    /// Only private chats are served. Plain text, unknown commands and
    /// button presses whose message is gone yield `None`.
    pub fn into_inbound(self) -> Option<Inbound> {
        if let Some(query) = self.callback_query {
            let message = query.message?;
            if message.chat.kind != PRIVATE_CHAT {
                return None;
            }
            return Some(Inbound::ButtonPress {
                caller: UserId(query.from.id),
                message: MessageRef::new(ChatId(message.chat.id), message.message_id),
                callback_id: query.id,
                data: query.data.unwrap_or_default(),
            });
        }

        let message = self.message?;
        if message.chat.kind != PRIVATE_CHAT {
            return None;
        }
        let caller = message.from.as_ref()?.id;
        let command = Command::parse(message.text.as_deref()?)?;

        Some(Inbound::Command {
            caller: UserId(caller),
            message: MessageRef::new(ChatId(message.chat.id), message.message_id),
            command,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

impl From<&Keyboard> for InlineKeyboardMarkup {
    fn from(keyboard: &Keyboard) -> Self {
        let inline_keyboard = keyboard
            .iter()
            .map(|row| {
                row.iter()
                    .map(|button| InlineKeyboardButton {
                        text: button.label.clone(),
                        callback_data: button.action.encode(),
                    })
                    .collect()
            })
            .collect();
        Self { inline_keyboard }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplyParameters {
    pub message_id: i64,
    pub allow_sending_without_reply: bool,
}

impl ReplyParameters {
    pub fn to(message_id: i64) -> Self {
        Self {
            message_id,
            allow_sending_without_reply: true,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SendMessage<'a> {
    pub chat_id: i64,
    pub text: &'a str,
    pub parse_mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_parameters: Option<ReplyParameters>,
}

#[derive(Debug, Serialize)]
pub struct EditMessageText<'a> {
    pub chat_id: i64,
    pub message_id: i64,
    pub text: &'a str,
    pub parse_mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

#[derive(Debug, Serialize)]
pub struct DeleteMessage {
    pub chat_id: i64,
    pub message_id: i64,
}

#[derive(Debug, Serialize)]
pub struct AnswerCallbackQuery<'a> {
    pub callback_query_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<&'a str>,
    pub show_alert: bool,
}

#[derive(Debug, Serialize)]
pub struct GetUpdates {
    pub offset: i64,
    pub timeout: u64,
    pub allowed_updates: &'static [&'static str],
}

#[derive(Debug, Serialize)]
pub struct BotCommand {
    pub command: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SetMyCommands {
    pub commands: Vec<BotCommand>,
}
