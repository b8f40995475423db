//! Upload progress reporting.

use crate::format::{escape_html, format_size};

/// Number of segments in the progress bar.
pub const BAR_WIDTH: usize = 20;

const FILLED: char = '█';
const EMPTY: char = '░';

/// A progress sample: bytes sent so far out of the total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferProgress {
    pub sent: u64,
    pub total: u64,
}

impl TransferProgress {
    pub fn new(sent: u64, total: u64) -> Self {
        Self { sent, total }
    }

    /// Fraction complete in `[0, 1]`. A zero-byte transfer is complete.
    fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        (self.sent as f64 / self.total as f64).min(1.0)
    }

    /// Percentage complete.
    pub fn percent(&self) -> f64 {
        self.fraction() * 100.0
    }

    /// Fixed-width bar of filled and empty segments.
    pub fn bar(&self) -> String {
        let filled = if self.total == 0 {
            BAR_WIDTH
        } else {
            let scaled = (BAR_WIDTH as u128 * self.sent as u128) / self.total as u128;
            (scaled as usize).min(BAR_WIDTH)
        };

        let mut bar = String::with_capacity(BAR_WIDTH * FILLED.len_utf8());
        bar.extend(std::iter::repeat_n(FILLED, filled));
        bar.extend(std::iter::repeat_n(EMPTY, BAR_WIDTH - filled));
        bar
    }
}

/// Status text shown before the first progress sample arrives.
pub fn upload_started_text(file_name: &str, file_size: u64) -> String {
    format!(
        "📤 <b>Uploading...</b>\n\n📄 File: <code>{}</code>\n📊 Size: <b>{}</b>\n⏳ Please wait...",
        escape_html(file_name),
        format_size(file_size)
    )
}

/// Status text for a progress sample.
pub fn upload_progress_text(file_name: &str, file_size: u64, progress: TransferProgress) -> String {
    format!(
        "📤 <b>Uploading...</b>\n\n📄 File: <code>{}</code>\n📊 Size: <b>{}</b>\n\n\
         Progress: <code>{}</code> {:.1}%\nUploaded: {} / {}",
        escape_html(file_name),
        format_size(file_size),
        progress.bar(),
        progress.percent(),
        format_size(progress.sent),
        format_size(progress.total)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent() {
        assert_eq!(TransferProgress::new(0, 200).percent(), 0.0);
        assert_eq!(TransferProgress::new(50, 200).percent(), 25.0);
        assert_eq!(TransferProgress::new(200, 200).percent(), 100.0);
    }

    #[test]
    fn test_zero_total_is_complete() {
        let progress = TransferProgress::new(0, 0);
        assert_eq!(progress.percent(), 100.0);
        assert_eq!(progress.bar(), "█".repeat(BAR_WIDTH));
    }

    #[test]
    fn test_bar_segments() {
        assert_eq!(TransferProgress::new(0, 100).bar(), "░".repeat(20));
        assert_eq!(
            TransferProgress::new(50, 100).bar(),
            format!("{}{}", "█".repeat(10), "░".repeat(10))
        );
        // Partial segments round down.
        assert_eq!(
            TransferProgress::new(99, 100).bar(),
            format!("{}{}", "█".repeat(19), "░")
        );
        assert_eq!(TransferProgress::new(100, 100).bar(), "█".repeat(20));
    }

    #[test]
    fn test_overshoot_is_capped() {
        let progress = TransferProgress::new(150, 100);
        assert_eq!(progress.percent(), 100.0);
        assert_eq!(progress.bar(), "█".repeat(20));
    }

    #[test]
    fn test_bar_width_is_constant() {
        for sent in [0, 1, 33, 512, 1000] {
            let bar = TransferProgress::new(sent, 1000).bar();
            assert_eq!(bar.chars().count(), BAR_WIDTH);
        }
    }

    #[test]
    fn test_progress_text() {
        let text = upload_progress_text("movie.mkv", 2048, TransferProgress::new(1024, 2048));
        assert!(text.contains("📄 File: <code>movie.mkv</code>"));
        assert!(text.contains("📊 Size: <b>2.00 KB</b>"));
        assert!(text.contains(&format!(
            "Progress: <code>{}{}</code> 50.0%",
            "█".repeat(10),
            "░".repeat(10)
        )));
        assert!(text.ends_with("Uploaded: 1.00 KB / 2.00 KB"));
    }

    #[test]
    fn test_started_text() {
        let text = upload_started_text("a<b>.zip", 0);
        assert!(text.contains("<code>a&lt;b&gt;.zip</code>"));
        assert!(text.ends_with("⏳ Please wait..."));
    }
}
