//! WhatsApp messaging. There is no transport yet: `MessagingStub` validates
//! and logs what it would send.

pub mod handlers;

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;

// Indian mobile numbers, with or without the country code
fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(?:\+?91)?[6-9]\d{9}$").expect("phone pattern is valid"))
}

/// Drop the separators people type into phone numbers.
pub fn normalize_phone(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.'))
        .collect()
}

pub fn is_valid_phone(raw: &str) -> bool {
    phone_pattern().is_match(&normalize_phone(raw))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentMessage {
    pub message_id: String,
    pub to: String,
    pub status: &'static str,
}

#[derive(Debug, Default)]
pub struct MessagingStub;

impl MessagingStub {
    pub fn new() -> Self {
        Self
    }

    pub fn send(&self, to: &str, body: &str) -> Result<SentMessage, AppError> {
        let to = normalize_phone(to.trim());
        if !phone_pattern().is_match(&to) {
            return Err(AppError::validation("Invalid phone number"));
        }
        let body = body.trim();
        if body.is_empty() {
            return Err(AppError::validation("Message is required"));
        }

        let message_id = format!("wamid.{}", Uuid::new_v4().simple());
        info!(
            message_id = %message_id,
            to = %to,
            chars = body.chars().count(),
            "WhatsApp transport not configured, message logged only: {}",
            body
        );

        Ok(SentMessage {
            message_id,
            to,
            status: "queued",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_validation() {
        assert!(is_valid_phone("9876543210"));
        assert!(is_valid_phone("+91 98765 43210"));
        assert!(is_valid_phone("91-98765-43210"));
        assert!(!is_valid_phone("12345"));
        assert!(!is_valid_phone("5876543210"));
        assert!(!is_valid_phone("98765432101"));
        assert!(!is_valid_phone(""));
    }

    #[test]
    fn test_send_returns_synthetic_id() {
        let sent = MessagingStub::new().send(" 98765 43210 ", "Your booking is confirmed").unwrap();
        assert!(sent.message_id.starts_with("wamid."));
        assert_eq!(sent.to, "9876543210");
        assert_eq!(sent.status, "queued");

        let again = MessagingStub::new().send("9876543210", "hi").unwrap();
        assert_ne!(sent.message_id, again.message_id);
    }

    #[test]
    fn test_send_validation() {
        let err = MessagingStub::new().send("12345", "hello").unwrap_err();
        assert_eq!(err.public_message(), "Invalid phone number");

        let err = MessagingStub::new().send("9876543210", "   ").unwrap_err();
        assert_eq!(err.public_message(), "Message is required");
    }
}
