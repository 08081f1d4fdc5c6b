//! Transient user notifications.

use std::fmt;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Danger,
    Warning,
    Success,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Danger => "danger",
            Severity::Warning => "warning",
            Severity::Success => "success",
            Severity::Info => "info",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct Notifications {
    items: Vec<Notification>,
}

impl Notifications {
    pub fn push(&mut self, severity: Severity, message: impl Into<String>) {
        let message = message.into();
        log::debug!("Notification ({severity}): {message}");
        self.items.push(Notification { severity, message });
    }

    pub fn danger(&mut self, message: impl Into<String>) {
        self.push(Severity::Danger, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(Severity::Warning, message);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(Severity::Success, message);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Severity::Info, message);
    }

    /// Validation problems warn; everything else is a danger notification
    /// carrying the error's message.
    pub fn report(&mut self, error: &AppError) {
        if error.is_validation() {
            self.warning(error.to_string());
        } else {
            self.danger(error.to_string());
        }
    }

    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.items.iter().filter(|n| n.severity == severity).count()
    }

    /// Take all notifications, e.g. once they have been shown.
    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_maps_error_kinds() {
        let mut notifications = Notifications::default();
        notifications.report(&AppError::validation("too short"));
        notifications.report(&AppError::api(500, "database unavailable"));

        assert_eq!(notifications.count(Severity::Warning), 1);
        assert_eq!(notifications.items()[1].message, "database unavailable");
        assert_eq!(notifications.items()[1].severity, Severity::Danger);
    }

    #[test]
    fn test_drain() {
        let mut notifications = Notifications::default();
        notifications.success("saved");
        assert_eq!(notifications.drain().len(), 1);
        assert!(notifications.is_empty());
    }
}
