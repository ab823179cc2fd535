//! Transient, dismissible notifications.

use std::time::{Duration, Instant};

use serde::Serialize;

/// Severity of a flash message; also its CSS modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Error => "error",
            Severity::Info => "info",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FlashId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashMessage {
    pub id: FlashId,
    pub message: String,
    pub severity: Severity,
    pub created_at: Instant,
}

/// Ordered collection of flash messages, newest first.
#[derive(Debug, Clone)]
pub struct FlashBoard {
    messages: Vec<FlashMessage>,
    next_id: u64,
    ttl: Duration,
}

impl FlashBoard {
    pub fn new(ttl: Duration) -> Self {
        Self {
            messages: Vec::new(),
            next_id: 1,
            ttl,
        }
    }

    /// Add a message on top of the existing ones.
    pub fn push(&mut self, message: impl Into<String>, severity: Severity) -> FlashId {
        self.push_at(message, severity, Instant::now())
    }

    pub fn push_at(
        &mut self,
        message: impl Into<String>,
        severity: Severity,
        now: Instant,
    ) -> FlashId {
        let id = FlashId(self.next_id);
        self.next_id += 1;
        self.messages.insert(
            0,
            FlashMessage {
                id,
                message: message.into(),
                severity,
                created_at: now,
            },
        );
        id
    }

    /// Drop every message and show only this one.
    pub fn replace(&mut self, message: impl Into<String>, severity: Severity) -> FlashId {
        self.messages.clear();
        self.push(message, severity)
    }

    /// Remove one message. Returns false if it was already gone.
    pub fn dismiss(&mut self, id: FlashId) -> bool {
        let before = self.messages.len();
        self.messages.retain(|m| m.id != id);
        self.messages.len() != before
    }

    /// Remove messages older than the board's TTL. Returns how many expired.
    pub fn expire(&mut self, now: Instant) -> usize {
        let ttl = self.ttl;
        let before = self.messages.len();
        self.messages
            .retain(|m| now.saturating_duration_since(m.created_at) < ttl);
        before - self.messages.len()
    }

    pub fn messages(&self) -> &[FlashMessage] {
        &self.messages
    }

    pub fn latest(&self) -> Option<&FlashMessage> {
        self.messages.first()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
