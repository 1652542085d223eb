//! Toast notifications

use derive_more::Display;

/// How long a toast stays on screen
pub const TOAST_DURATION_MS: u32 = 3000;

/// Maximum number of toasts shown at once
pub const MAX_TOASTS: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum ToastKind {
    #[display("info")]
    Info,
    #[display("success")]
    Success,
    #[display("warning")]
    Warning,
    #[display("error")]
    Error,
}

impl ToastKind {
    pub fn icon(&self) -> &'static str {
        match self {
            ToastKind::Info => "ℹ️",
            ToastKind::Success => "✅",
            ToastKind::Warning => "⚠️",
            ToastKind::Error => "❌",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
    pub auto_dismiss_ms: Option<u32>,
}

impl Toast {
    pub fn new(kind: ToastKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            auto_dismiss_ms: Some(TOAST_DURATION_MS),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Error, message)
    }

    /// CSS classes of the toast element, e.g. `notification error`
    pub fn class(&self) -> String {
        format!("notification {}", self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toast_defaults() {
        let toast = Toast::error("boom");
        assert_eq!(toast.kind, ToastKind::Error);
        assert_eq!(toast.auto_dismiss_ms, Some(TOAST_DURATION_MS));
        assert_eq!(toast.class(), "notification error");
        assert_eq!(toast.kind.icon(), "❌");
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ToastKind::Info.to_string(), "info");
        assert_eq!(ToastKind::Success.to_string(), "success");
    }
}
