//! # Courier Explorer Library
//!
//! This crate holds the chat-independent core of Courier, the remote file
//! browsing bot.
//!
//! ## Overview
//!
//! - **Path Registry**: short tokens for paths so they fit in button payloads
//! - **Directory Lister**: visible entries of a directory, folders first
//! - **Pager**: fixed-size pages with clamped page numbers
//! - **Presentation**: button layouts and captions for a page
//! - **Progress**: percentage and bar text for uploads
//! - **Access Guard**: single-user allow list
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────┐   ┌──────────────────┐
//! │   Lister     │──▶│  Pager   │──▶│  DirectoryScreen │──▶ text + keyboard
//! └──────────────┘   └──────────┘   └────────┬─────────┘
//!                                            │ register
//!                                   ┌────────▼─────────┐
//!                                   │   PathRegistry   │◀── Action::parse
//!                                   └──────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use explorer::{paginate, DirectoryLister, DirectoryScreen, Paged, PathRegistry};
//!
//! let root = Path::new("/sdcard");
//! let registry = PathRegistry::new(root);
//! let listing = DirectoryLister::new().list(root).unwrap();
//!
//! if let Paged::Page(page) = paginate(&listing.entries, 0, 12) {
//!     let screen = DirectoryScreen::new(root, &registry).render(root, &listing, &page);
//!     println!("{}", screen.text);
//! }
//! ```

pub mod action;
pub mod category;
pub mod error;
pub mod format;
pub mod guard;
pub mod lister;
pub mod pager;
pub mod presentation;
pub mod progress;
pub mod registry;

pub use action::Action;
pub use category::{classify, content_type, Category};
pub use error::{ListError, Result};
pub use format::{escape_html, format_size};
pub use guard::{denial_alert, denial_text, AccessGuard, UserId};
pub use lister::{DirectoryEntry, DirectoryLister, Listing};
pub use pager::{paginate, Page, Paged, DEFAULT_ITEMS_PER_PAGE};
pub use presentation::{
    display_path, file_caption, help_text, welcome_text, Button, DirectoryScreen, Keyboard,
    Location, Notice, Screen,
};
pub use progress::{upload_progress_text, upload_started_text, TransferProgress, BAR_WIDTH};
pub use registry::{PathRegistry, PathToken, TOKEN_LENGTH};
