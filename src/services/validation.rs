// src/services/validation.rs

//! Client-side input checks, run before anything is sent.

use crate::error::{AppError, Result};
use crate::models::{FieldLocale, LengthLimit, LengthLimits, LocaleConfig};

/// Length-checked input fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    ThreadName,
    MessageContent,
    UserName,
    AttachmentName,
    PrivateMessage,
    Comment,
}

impl Field {
    pub fn label(self, labels: &FieldLocale) -> &str {
        match self {
            Field::ThreadName => &labels.thread_name,
            Field::MessageContent => &labels.message_content,
            Field::UserName => &labels.user_name,
            Field::AttachmentName => &labels.attachment_name,
            Field::PrivateMessage => &labels.private_message,
            Field::Comment => &labels.comment,
        }
    }

    pub fn limit(self, limits: &LengthLimits) -> LengthLimit {
        match self {
            Field::ThreadName => limits.thread_name,
            Field::MessageContent => limits.message_content,
            Field::UserName => limits.user_name,
            Field::AttachmentName => limits.attachment_name,
            Field::PrivateMessage => limits.private_message,
            Field::Comment => limits.comment,
        }
    }
}

/// Validates input lengths against the configured limits.
#[derive(Debug, Clone)]
pub struct Validator {
    limits: LengthLimits,
    labels: FieldLocale,
    template: String,
}

impl Validator {
    pub fn new(limits: &LengthLimits, locale: &LocaleConfig) -> Self {
        Self {
            limits: limits.clone(),
            labels: locale.fields.clone(),
            template: locale.errors.invalid_length.clone(),
        }
    }

    /// Check the trimmed length of `value`, in characters.
    pub fn check(&self, field: Field, value: &str) -> Result<()> {
        let limit = field.limit(&self.limits);
        let length = value.trim().chars().count();
        if (limit.min..=limit.max).contains(&length) {
            return Ok(());
        }

        let message = self
            .template
            .replace("{field}", field.label(&self.labels))
            .replace("{min}", &limit.min.to_string())
            .replace("{max}", &limit.max.to_string());
        Err(AppError::validation(message))
    }
}
