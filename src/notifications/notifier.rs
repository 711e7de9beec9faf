// src/notifications/notifier.rs

use crate::domain::RecipientConfig;
use crate::notifications::{MessageSender, Notification, TelegramError};
use std::collections::HashMap;

/// Sends a notification only when it differs from the last one the same
/// recipient received. Memory lives for the process only.
pub struct DedupNotifier<S> {
    sender: S,
    last_sent: HashMap<String, String>,
}

impl<S: MessageSender> DedupNotifier<S> {
    pub fn new(sender: S) -> Self {
        Self {
            sender,
            last_sent: HashMap::new(),
        }
    }

    pub fn sender(&self) -> &S {
        &self.sender
    }

    /// Returns `Ok(true)` if a message was actually sent.
    pub fn notify_if_changed(
        &mut self,
        recipient_id: &str,
        notification: Option<&Notification>,
    ) -> Result<bool, TelegramError> {
        let Some(notification) = notification else {
            return Ok(false);
        };

        if self.last_sent.get(recipient_id) == Some(&notification.message) {
            tracing::debug!("Same notification as last time for {recipient_id}, not sending");
            return Ok(false);
        }

        self.sender.send_message(
            recipient_id,
            &notification.message,
            Some(notification.parse_mode),
        )?;

        self.last_sent
            .insert(recipient_id.to_string(), notification.message.clone());
        Ok(true)
    }

    /// Best-effort plain text notice to everyone, outside of dedup tracking.
    /// Returns how many recipients got it.
    pub fn broadcast(&self, recipients: &[RecipientConfig], text: &str) -> usize {
        let mut delivered = 0;

        for recipient in recipients {
            match self.sender.send_message(&recipient.telegram_id, text, None) {
                Ok(()) => delivered += 1,
                Err(e) => tracing::warn!("Could not notify {}: {e}", recipient.label),
            }
        }

        delivered
    }
}
