//! File type classification.
//!
//! The category decides both the icon shown next to an entry and how a file
//! is sent (photo, video, audio or plain document).

use mime_guess::mime;

/// Suffix of Android install packages.
const PACKAGE_SUFFIX: &str = ".apk";

/// Broad type of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Folder,
    Image,
    Video,
    Audio,
    Document,
    Archive,
    Package,
    Unknown,
}

impl Category {
    /// Icon shown in button labels.
    pub fn icon(self) -> &'static str {
        match self {
            Category::Folder => "📁",
            Category::Image => "🖼",
            Category::Video => "🎥",
            Category::Audio => "🎵",
            Category::Document => "📄",
            Category::Archive => "🗜",
            Category::Package => "📦",
            Category::Unknown => "📎",
        }
    }
}

/// Classify a file by its name.
///
/// The guessed content type decides first; names ending in `.apk` that the
/// content type did not place are install packages. Never returns
/// [`Category::Folder`]: callers know when an entry is a directory.
pub fn classify(name: &str) -> Category {
    if let Some(guess) = mime_guess::from_path(name).first() {
        let top = guess.type_();
        if top == mime::IMAGE {
            return Category::Image;
        }
        if top == mime::VIDEO {
            return Category::Video;
        }
        if top == mime::AUDIO {
            return Category::Audio;
        }
        if top == mime::TEXT || guess.subtype() == mime::PDF {
            return Category::Document;
        }

        let essence = guess.essence_str();
        if essence.contains("zip") || essence.contains("rar") {
            return Category::Archive;
        }
    }

    if name.to_ascii_lowercase().ends_with(PACKAGE_SUFFIX) {
        return Category::Package;
    }

    Category::Unknown
}

/// Content type to declare when uploading a file.
pub fn content_type(name: &str) -> String {
    mime_guess::from_path(name)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}
