//! Interaction router.
//!
//! This module provides the `BotRouter` struct that receives user
//! interactions and turns them into chat operations: command replies,
//! directory pages and file uploads. Every interaction passes the access
//! guard before anything else happens.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use explorer::{
    classify, denial_alert, denial_text, file_caption, help_text, paginate, upload_started_text,
    welcome_text, AccessGuard, Action, DirectoryLister, DirectoryScreen, ListError, Location,
    Notice, Paged, PathRegistry, Screen, TransferProgress, UserId,
};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::chat::{ChatClient, ChatError, Command, FileUpload, Inbound, MediaKind, MessageRef};
use crate::config::Config;
use crate::transfer::ProgressReporter;

/// Toast shown when a file button is pressed.
const UPLOAD_STARTING: &str = "📤 Starting file upload...";

/// Browsing and transfer settings the router needs.
#[derive(Debug, Clone)]
pub struct RouterSettings {
    pub root: PathBuf,
    pub allowed_user: UserId,
    pub items_per_page: usize,
    pub show_hidden: bool,
    pub max_file_size: u64,
    pub progress_interval: Duration,
}

impl From<&Config> for RouterSettings {
    fn from(config: &Config) -> Self {
        Self {
            root: config.browse.root_path.clone(),
            allowed_user: UserId(config.access.allowed_user_id),
            items_per_page: config.browse.items_per_page,
            show_hidden: config.browse.show_hidden,
            max_file_size: config.transfer.max_file_size,
            progress_interval: Duration::from_millis(config.transfer.progress_interval_ms),
        }
    }
}

/// What to show for a directory location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Screen(Screen),
    Notice(Notice),
}

/// Notice shown when a directory cannot be listed.
fn listing_notice(err: ListError) -> Notice {
    match err {
        ListError::NotFound(_) => Notice::PathNotFound,
        ListError::PermissionDenied(_) => Notice::FolderAccessDenied,
        other => Notice::Error(other.to_string()),
    }
}

/// Where a directory page goes.
#[derive(Debug, Clone, Copy)]
enum Delivery {
    /// A new message replying to this one.
    Reply(MessageRef),
    /// Replace this bot message in place.
    Replace(MessageRef),
}

impl Delivery {
    fn anchor(self) -> MessageRef {
        match self {
            Delivery::Reply(message) | Delivery::Replace(message) => message,
        }
    }
}

/// Routes interactions from one chat client.
pub struct BotRouter<C: ChatClient> {
    chat: Arc<C>,
    guard: AccessGuard,
    registry: Arc<PathRegistry>,
    lister: DirectoryLister,
    settings: RouterSettings,
}

impl<C: ChatClient> BotRouter<C> {
    pub fn new(chat: Arc<C>, settings: RouterSettings) -> Self {
        let registry = Arc::new(PathRegistry::new(&settings.root));
        Self::with_registry(chat, registry, settings)
    }

    /// Build a router around an existing registry.
    pub fn with_registry(
        chat: Arc<C>,
        registry: Arc<PathRegistry>,
        settings: RouterSettings,
    ) -> Self {
        Self {
            chat,
            guard: AccessGuard::new(settings.allowed_user),
            registry,
            lister: DirectoryLister::new().include_hidden(settings.show_hidden),
            settings,
        }
    }

    pub fn from_config(chat: Arc<C>, config: &Config) -> Self {
        Self::new(chat, RouterSettings::from(config))
    }

    pub fn registry(&self) -> &PathRegistry {
        &self.registry
    }

    /// Handle one interaction, logging any failure to talk to the chat.
    pub async fn handle(&self, inbound: Inbound) {
        let caller = inbound.caller();
        if let Err(e) = self.dispatch(inbound).await {
            error!(caller = %caller, error = %e, "Failed to handle interaction");
        }
    }

    /// Handle one interaction.
    ///
    /// Problems with the filesystem are reported to the user as notices;
    /// only failures to reach the chat itself come back as errors.
    pub async fn dispatch(&self, inbound: Inbound) -> Result<(), ChatError> {
        match inbound {
            Inbound::Command {
                caller,
                message,
                command,
            } => {
                if !self.guard.is_authorized(caller) {
                    warn!(
                        caller = %caller,
                        command = command.name(),
                        "Rejected command from unauthorized user"
                    );
                    let text = denial_text(caller);
                    self.chat
                        .send_message(message.chat, &text, None, Some(message.message_id))
                        .await?;
                    return Ok(());
                }

                info!(command = command.name(), "Handling command");
                self.handle_command(message, command).await
            }
            Inbound::ButtonPress {
                caller,
                message,
                callback_id,
                data,
            } => {
                if !self.guard.is_authorized(caller) {
                    warn!(caller = %caller, "Rejected button press from unauthorized user");
                    let alert = denial_alert(caller);
                    self.chat
                        .answer_button(&callback_id, Some(alert.as_str()), true)
                        .await?;
                    return Ok(());
                }

                self.handle_button(message, &callback_id, &data).await
            }
        }
    }

    async fn handle_command(&self, message: MessageRef, command: Command) -> Result<(), ChatError> {
        let reply_to = Some(message.message_id);
        let max = self.settings.max_file_size;
        match command {
            Command::Start => {
                self.chat
                    .send_message(message.chat, &welcome_text(max), None, reply_to)
                    .await?;
                Ok(())
            }
            Command::Help => {
                self.chat
                    .send_message(message.chat, &help_text(max), None, reply_to)
                    .await?;
                Ok(())
            }
            Command::Browse => {
                let home = Location::first_page(&self.settings.root);
                self.show_directory(Delivery::Reply(message), home).await
            }
        }
    }

    async fn handle_button(
        &self,
        message: MessageRef,
        callback_id: &str,
        data: &str,
    ) -> Result<(), ChatError> {
        match Action::parse(data) {
            Some(Action::Navigate { token, page }) => {
                self.acknowledge(callback_id, None).await;
                let path = self.registry.resolve(&token);
                debug!(path = %path.display(), page, "Navigating");
                self.show_directory(Delivery::Replace(message), Location::new(path, page))
                    .await
            }
            Some(Action::SendFile { token }) => {
                self.acknowledge(callback_id, Some(UPLOAD_STARTING)).await;
                let path = self.registry.resolve(&token);
                self.send_file(message, path).await
            }
            Some(Action::Ignore) => {
                self.acknowledge(callback_id, None).await;
                Ok(())
            }
            None => {
                debug!(data, "Unrecognized button payload");
                self.acknowledge(callback_id, None).await;
                Ok(())
            }
        }
    }

    /// Answer a button press. Presses expire, so failures are only logged.
    async fn acknowledge(&self, callback_id: &str, text: Option<&str>) {
        if let Err(e) = self.chat.answer_button(callback_id, text, false).await {
            debug!(error = %e, "Failed to answer button press");
        }
    }

    /// Build the view for a location.
    pub fn render(&self, location: &Location) -> View {
        let listing = match self.lister.list(&location.path) {
            Ok(listing) => listing,
            Err(e) => return View::Notice(listing_notice(e)),
        };

        match paginate(&listing.entries, location.page, self.settings.items_per_page) {
            Paged::Empty => View::Notice(Notice::FolderEmpty),
            Paged::Page(page) => View::Screen(
                DirectoryScreen::new(&self.settings.root, &self.registry).render(
                    &location.path,
                    &listing,
                    &page,
                ),
            ),
        }
    }

    async fn show_directory(
        &self,
        delivery: Delivery,
        location: Location,
    ) -> Result<(), ChatError> {
        let anchor = delivery.anchor();

        let screen = match self.render(&location) {
            View::Screen(screen) => screen,
            View::Notice(notice) => {
                debug!(path = %location.path.display(), ?notice, "Directory not shown");
                return self.notify(anchor, &notice).await;
            }
        };

        if let Delivery::Replace(message) = delivery {
            match self
                .chat
                .edit_message(&message, &screen.text, Some(&screen.keyboard))
                .await
            {
                Ok(()) => return Ok(()),
                Err(e) => {
                    warn!(error = %e, "Failed to edit directory message, sending a new one");
                }
            }
        }

        let sent = self
            .chat
            .send_message(
                anchor.chat,
                &screen.text,
                Some(&screen.keyboard),
                Some(anchor.message_id),
            )
            .await;

        if let Err(e) = sent {
            // One plain reply so the user is not left without an answer.
            if let Err(notify_err) = self.notify(anchor, &Notice::Error(e.to_string())).await {
                debug!(error = %notify_err, "Failed to report page delivery failure");
            }
            return Err(e);
        }
        Ok(())
    }

    async fn notify(&self, anchor: MessageRef, notice: &Notice) -> Result<(), ChatError> {
        self.chat
            .send_message(anchor.chat, &notice.text(), None, Some(anchor.message_id))
            .await?;
        Ok(())
    }

    async fn send_file(&self, origin: MessageRef, path: PathBuf) -> Result<(), ChatError> {
        let metadata = match tokio::fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "File to send is gone");
                return self.notify(origin, &Notice::FileNotFound).await;
            }
            Err(e) => return self.notify(origin, &Notice::Error(e.to_string())).await,
        };

        // Unknown tokens resolve to the root, which is a directory.
        if metadata.is_dir() {
            return self
                .show_directory(Delivery::Replace(origin), Location::first_page(path))
                .await;
        }

        let size = metadata.len();
        if size > self.settings.max_file_size {
            info!(path = %path.display(), size, "File exceeds upload limit");
            let notice = Notice::FileTooLarge {
                size,
                max: self.settings.max_file_size,
            };
            return self.notify(origin, &notice).await;
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let status = self
            .chat
            .send_message(
                origin.chat,
                &upload_started_text(&file_name, size),
                None,
                Some(origin.message_id),
            )
            .await?;

        let upload = FileUpload {
            kind: MediaKind::for_file(classify(&file_name), size),
            caption: file_caption(&file_name, size),
            path: path.clone(),
            file_name: file_name.clone(),
            size,
        };

        info!(path = %path.display(), size, kind = ?upload.kind, "Sending file");

        let (progress_tx, progress_rx) = watch::channel(TransferProgress::new(0, size));
        let reporter = ProgressReporter::new(
            self.chat.as_ref(),
            status,
            &file_name,
            size,
            self.settings.progress_interval,
        );

        let (result, ()) = tokio::join!(
            self.chat
                .send_file(origin.chat, Some(origin.message_id), upload, progress_tx),
            reporter.run(progress_rx),
        );

        match result {
            Ok(()) => {
                info!(file = %file_name, "File sent");
                if let Err(e) = self.chat.delete_message(&status).await {
                    debug!(error = %e, "Failed to delete status message");
                }
            }
            Err(e) => {
                error!(file = %file_name, error = %e, "Upload failed");
                let text = Notice::UploadFailed(e.to_string()).text();
                if let Err(e) = self.chat.edit_message(&status, &text, None).await {
                    warn!(error = %e, "Failed to report upload failure");
                }
            }
        }

        Ok(())
    }
}
