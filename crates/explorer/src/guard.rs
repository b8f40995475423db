//! Single-user access control.

use std::fmt;

/// Identity of a chat user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Allows exactly one configured user.
#[derive(Debug, Clone, Copy)]
pub struct AccessGuard {
    allowed: UserId,
}

impl AccessGuard {
    pub fn new(allowed: UserId) -> Self {
        Self { allowed }
    }

    pub fn is_authorized(&self, caller: UserId) -> bool {
        caller == self.allowed
    }
}

/// Reply to a message from an unauthorized user.
///
/// Shows the caller's own ID so the owner can copy it into the configuration.
pub fn denial_text(caller: UserId) -> String {
    format!(
        "❌ <b>Access Denied!</b>\n\nYour User ID: <code>{caller}</code>\n\n\
         This bot is private and only authorized users can access it."
    )
}

/// Alert shown for a button press from an unauthorized user.
pub fn denial_alert(caller: UserId) -> String {
    format!("❌ Access denied! Your User ID: {caller}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_configured_user_allowed() {
        let guard = AccessGuard::new(UserId(123456789));
        assert!(guard.is_authorized(UserId(123456789)));
        assert!(!guard.is_authorized(UserId(987654321)));
        assert!(!guard.is_authorized(UserId(-123456789)));
    }

    #[test]
    fn test_denial_shows_caller_id() {
        let text = denial_text(UserId(42));
        assert!(text.contains("<code>42</code>"));
        assert!(denial_alert(UserId(42)).contains("42"));
    }
}
