//! Recording chat client for unit tests.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Mutex;

use explorer::{Keyboard, TransferProgress};
use tokio::sync::watch;

use crate::chat::{ChatClient, ChatError, ChatId, FileUpload, MessageRef};

/// One recorded call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Send {
        chat: ChatId,
        text: String,
        keyboard: Option<Keyboard>,
        reply_to: Option<i64>,
    },
    Edit {
        message_id: i64,
        text: String,
        keyboard: Option<Keyboard>,
    },
    Delete {
        message_id: i64,
    },
    Answer {
        text: Option<String>,
        show_alert: bool,
    },
    Upload(FileUpload),
}

#[derive(Debug, Default)]
pub struct MockChat {
    calls: Mutex<Vec<Call>>,
    next_id: AtomicI64,
    pub fail_edits: AtomicBool,
    /// Reject messages that carry a keyboard.
    pub fail_keyboard_sends: AtomicBool,
    pub fail_uploads: AtomicBool,
}

impl MockChat {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(100),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Texts of all sent messages, in order.
    pub fn sent_texts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Send { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Texts of all edits, in order.
    pub fn edited_texts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Edit { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl ChatClient for MockChat {
    async fn send_message(
        &self,
        chat: ChatId,
        text: &str,
        keyboard: Option<&Keyboard>,
        reply_to: Option<i64>,
    ) -> Result<MessageRef, ChatError> {
        self.record(Call::Send {
            chat,
            text: text.to_string(),
            keyboard: keyboard.cloned(),
            reply_to,
        });
        if keyboard.is_some() && self.fail_keyboard_sends.load(Ordering::SeqCst) {
            return Err(ChatError::Api {
                code: 400,
                description: "Bad Request: BUTTON_DATA_INVALID".to_string(),
            });
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(MessageRef::new(chat, id))
    }

    async fn edit_message(
        &self,
        message: &MessageRef,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), ChatError> {
        self.record(Call::Edit {
            message_id: message.message_id,
            text: text.to_string(),
            keyboard: keyboard.cloned(),
        });
        if self.fail_edits.load(Ordering::SeqCst) {
            return Err(ChatError::Api {
                code: 400,
                description: "Bad Request: message can't be edited".to_string(),
            });
        }
        Ok(())
    }

    async fn delete_message(&self, message: &MessageRef) -> Result<(), ChatError> {
        self.record(Call::Delete {
            message_id: message.message_id,
        });
        Ok(())
    }

    async fn answer_button(
        &self,
        _callback_id: &str,
        text: Option<&str>,
        show_alert: bool,
    ) -> Result<(), ChatError> {
        self.record(Call::Answer {
            text: text.map(str::to_string),
            show_alert,
        });
        Ok(())
    }

    async fn send_file(
        &self,
        _chat: ChatId,
        _reply_to: Option<i64>,
        upload: FileUpload,
        progress: watch::Sender<TransferProgress>,
    ) -> Result<(), ChatError> {
        let total = upload.size;
        self.record(Call::Upload(upload));

        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(ChatError::Api {
                code: 413,
                description: "Request Entity Too Large".to_string(),
            });
        }

        progress.send_replace(TransferProgress::new(total / 2, total));
        tokio::task::yield_now().await;
        progress.send_replace(TransferProgress::new(total, total));
        tokio::task::yield_now().await;
        Ok(())
    }
}
