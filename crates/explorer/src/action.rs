//! Button payload encoding.
//!
//! Payloads are colon-separated: `d:<token>[:<page>]` opens a directory
//! (page defaults to 0), `f:<token>` sends a file and `ignore` marks inert
//! buttons such as the page indicator.

use std::fmt;

use crate::registry::PathToken;

const NAVIGATE_PREFIX: &str = "d";
const SEND_FILE_PREFIX: &str = "f";
const IGNORE: &str = "ignore";

/// What a button press asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Show a page of a directory.
    Navigate { token: PathToken, page: i64 },
    /// Send a file.
    SendFile { token: PathToken },
    /// Do nothing beyond acknowledging the press.
    Ignore,
}

impl Action {
    /// Encode the action as a button payload.
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Decode a button payload.
    ///
    /// Returns `None` for payloads that are not understood; callers should
    /// acknowledge those without doing anything else. A malformed page number
    /// falls back to the first page.
    pub fn parse(data: &str) -> Option<Self> {
        if data == IGNORE {
            return Some(Action::Ignore);
        }

        let mut parts = data.splitn(3, ':');
        let kind = parts.next()?;
        let token = parts.next().filter(|t| !t.is_empty())?;

        match kind {
            NAVIGATE_PREFIX => {
                let page = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
                Some(Action::Navigate {
                    token: PathToken::from_raw(token),
                    page,
                })
            }
            SEND_FILE_PREFIX => Some(Action::SendFile {
                token: PathToken::from_raw(token),
            }),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Navigate { token, page } => write!(f, "{NAVIGATE_PREFIX}:{token}:{page}"),
            Action::SendFile { token } => write!(f, "{SEND_FILE_PREFIX}:{token}"),
            Action::Ignore => f.write_str(IGNORE),
        }
    }
}
