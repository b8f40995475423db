//! Rendering of directory pages and notices into chat screens.
//!
//! Everything here is pure text and layout. Texts use Telegram's HTML parse
//! mode, so every piece of user-controlled text (file names, paths, error
//! details) goes through [`escape_html`].

use std::path::{Path, PathBuf};

use crate::action::Action;
use crate::category::{classify, Category};
use crate::format::{escape_html, format_size, truncate_end, truncate_start};
use crate::lister::{DirectoryEntry, Listing};
use crate::pager::Page;
use crate::registry::PathRegistry;

/// Longest folder name shown before truncation.
pub const FOLDER_NAME_MAX: usize = 30;

/// Longest file name shown before truncation.
pub const FILE_NAME_MAX: usize = 25;

/// Longest path shown in a caption before truncation.
pub const CAPTION_PATH_MAX: usize = 50;

/// The directory and page an interaction is looking at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: PathBuf,
    pub page: i64,
}

impl Location {
    pub fn new(path: impl Into<PathBuf>, page: i64) -> Self {
        Self {
            path: path.into(),
            page,
        }
    }

    /// First page of a directory.
    pub fn first_page(path: impl Into<PathBuf>) -> Self {
        Self::new(path, 0)
    }
}

/// An inline button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub action: Action,
}

impl Button {
    pub fn new(label: impl Into<String>, action: Action) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }
}

/// Rows of inline buttons.
pub type Keyboard = Vec<Vec<Button>>;

/// A message body with its keyboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    pub text: String,
    pub keyboard: Keyboard,
}

/// Renders directory pages relative to the browsing root.
///
/// Every path that ends up behind a button is registered in the registry.
pub struct DirectoryScreen<'a> {
    root: &'a Path,
    registry: &'a PathRegistry,
}

impl<'a> DirectoryScreen<'a> {
    pub fn new(root: &'a Path, registry: &'a PathRegistry) -> Self {
        Self { root, registry }
    }

    /// Render one page of `dir`.
    pub fn render(&self, dir: &Path, listing: &Listing, page: &Page<'_>) -> Screen {
        let mut keyboard: Keyboard = page
            .entries
            .iter()
            .map(|entry| vec![self.entry_button(entry)])
            .collect();

        if page.is_paginated() {
            keyboard.push(self.page_row(dir, page));
        }
        keyboard.push(self.nav_row(dir));

        Screen {
            text: self.caption(dir, listing, page),
            keyboard,
        }
    }

    fn entry_button(&self, entry: &DirectoryEntry) -> Button {
        let token = self.registry.register(entry.path());
        match entry {
            DirectoryEntry::Folder { name, .. } => Button::new(
                format!(
                    "{} {}/",
                    Category::Folder.icon(),
                    truncate_end(name, FOLDER_NAME_MAX)
                ),
                Action::Navigate { token, page: 0 },
            ),
            DirectoryEntry::File { name, size, .. } => Button::new(
                format!(
                    "{} {} ({})",
                    classify(name).icon(),
                    truncate_end(name, FILE_NAME_MAX),
                    format_size(*size)
                ),
                Action::SendFile { token },
            ),
        }
    }

    fn page_row(&self, dir: &Path, page: &Page<'_>) -> Vec<Button> {
        let mut row = Vec::with_capacity(3);
        let index = page.index as i64;

        if !page.is_first() {
            row.push(Button::new(
                "◀️ Previous",
                Action::Navigate {
                    token: self.registry.register(dir),
                    page: index - 1,
                },
            ));
        }

        row.push(Button::new(
            format!("📄 {}/{}", page.index + 1, page.total_pages),
            Action::Ignore,
        ));

        if !page.is_last() {
            row.push(Button::new(
                "Next ▶️",
                Action::Navigate {
                    token: self.registry.register(dir),
                    page: index + 1,
                },
            ));
        }

        row
    }

    fn nav_row(&self, dir: &Path) -> Vec<Button> {
        let mut row = Vec::with_capacity(2);

        if dir != self.root {
            let parent = dir.parent().unwrap_or(self.root);
            row.push(Button::new(
                "🔙 Back",
                Action::Navigate {
                    token: self.registry.register(parent),
                    page: 0,
                },
            ));
        }

        row.push(Button::new(
            "🏠 Home",
            Action::Navigate {
                token: self.registry.register(self.root),
                page: 0,
            },
        ));

        row
    }

    fn caption(&self, dir: &Path, listing: &Listing, page: &Page<'_>) -> String {
        let mut text = format!(
            "📂 <b>Current Path:</b>\n<code>{}</code>\n\n📊 Total: {} folders, {} files",
            escape_html(&display_path(dir, self.root)),
            listing.folder_count,
            listing.file_count
        );

        if page.is_paginated() {
            let (first, last) = page.showing();
            text.push_str(&format!(
                "\n📄 Showing: {}-{} (of {})",
                first, last, page.total_items
            ));
        }

        text
    }
}

/// Path relative to the root for captions.
///
/// The root itself shows as `/`. Paths outside the root are shown in full.
/// Long paths keep their tail.
pub fn display_path(path: &Path, root: &Path) -> String {
    let shown = match path.strip_prefix(root) {
        Ok(rel) if rel.as_os_str().is_empty() => "/".to_string(),
        Ok(rel) => format!("/{}", rel.display()),
        Err(_) => path.display().to_string(),
    };
    truncate_start(&shown, CAPTION_PATH_MAX)
}

/// Short informational or error replies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The directory has no visible entries.
    FolderEmpty,
    /// The directory to show does not exist.
    PathNotFound,
    /// The directory exists but cannot be read.
    FolderAccessDenied,
    /// The file to send does not exist.
    FileNotFound,
    /// The file exceeds the configured maximum.
    FileTooLarge { size: u64, max: u64 },
    /// The upload itself failed.
    UploadFailed(String),
    /// Anything else.
    Error(String),
}

impl Notice {
    pub fn text(&self) -> String {
        match self {
            Notice::FolderEmpty => "📭 This folder is empty!".to_string(),
            Notice::PathNotFound => "❌ Path not found!".to_string(),
            Notice::FolderAccessDenied => "❌ Access denied to this folder!".to_string(),
            Notice::FileNotFound => "❌ File not found!".to_string(),
            Notice::FileTooLarge { size, max } => format!(
                "❌ File too large ({})!\nMaximum supported size: {}",
                format_size(*size),
                format_size(*max)
            ),
            Notice::UploadFailed(details) => {
                format!("❌ Upload failed: {}", escape_html(details))
            }
            Notice::Error(details) => format!("❌ Error: {}", escape_html(details)),
        }
    }
}

/// Reply to `/start`.
pub fn welcome_text(max_file_size: u64) -> String {
    format!(
        "✅ <b>File Manager Bot is Running!</b>\n\n\
         📱 Use /browse to access your device storage.\n\n\
         <b>Available Commands:</b>\n\
         • /browse - Browse files and folders\n\
         • /help - Show help information\n\n\
         <b>⚡ Upload files up to {}!</b>",
        format_size(max_file_size)
    )
}

/// Reply to `/help`.
pub fn help_text(max_file_size: u64) -> String {
    format!(
        "<b>📚 File Manager Bot - Help</b>\n\n\
         <b>Commands:</b>\n\
         • /start - Start the bot\n\
         • /browse - Start browsing files\n\
         • /help - Show this help message\n\n\
         <b>Features:</b>\n\
         • 📁 Browse folders page by page\n\
         • 📄 Download files up to {}\n\
         • 📊 Live upload progress bar\n\
         • 🎨 File type icons\n\
         • 🔙 Back/Home navigation\n\n\
         <b>Tips:</b>\n\
         • Tap folders to open them\n\
         • Tap files to download them\n\
         • Use Previous/Next for long folders\n\
         • Hidden files (starting with .) are skipped",
        format_size(max_file_size)
    )
}

/// Caption attached to a sent file.
pub fn file_caption(file_name: &str, size: u64) -> String {
    format!(
        "📄 <b>{}</b>\n📊 Size: {}",
        escape_html(file_name),
        format_size(size)
    )
}
