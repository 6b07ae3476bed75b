//! Transient wishlist notifications.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// How long a toast stays visible unless dismissed earlier.
pub const TOAST_DURATION_MS: i64 = 3_000;

/// What happened to the wishlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastAction {
    Added,
    Removed,
}

/// A notification raised by an add or remove.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub action: ToastAction,
    pub product_name: String,
    pub shown_at: DateTime<Utc>,
}

impl Toast {
    #[must_use]
    pub fn new(action: ToastAction, product_name: impl Into<String>) -> Self {
        Self::shown_at(action, product_name, Utc::now())
    }

    #[must_use]
    pub fn shown_at(
        action: ToastAction,
        product_name: impl Into<String>,
        shown_at: DateTime<Utc>,
    ) -> Self {
        Self {
            action,
            product_name: product_name.into(),
            shown_at,
        }
    }

    /// Instant after which the toast auto-hides.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.shown_at + TimeDelta::milliseconds(TOAST_DURATION_MS)
    }

    #[must_use]
    pub fn is_visible_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_hides_after_three_seconds() {
        let toast = Toast::new(ToastAction::Added, "A");
        assert!(toast.is_visible_at(toast.shown_at));
        assert!(toast.is_visible_at(toast.shown_at + TimeDelta::milliseconds(2_999)));
        assert!(!toast.is_visible_at(toast.shown_at + TimeDelta::seconds(3)));
    }

    #[test]
    fn test_action_serializes_lowercase() {
        let json = serde_json::to_string(&ToastAction::Removed).unwrap_or_default();
        assert_eq!(json, "\"removed\"");
    }
}
