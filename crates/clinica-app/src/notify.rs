// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::time::{Duration, Instant};

pub const DEFAULT_TOAST_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Error,
}

impl Level {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::Success => "Éxito",
            Self::Error => "Error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub level: Level,
    pub message: String,
    pub created: Instant,
}

/// Transient toasts, newest last.
#[derive(Debug, Clone)]
pub struct Notifications {
    items: Vec<Notification>,
    next_id: u64,
    ttl: Duration,
}

impl Default for Notifications {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_TTL)
    }
}

impl Notifications {
    pub fn new(ttl: Duration) -> Self {
        Self {
            items: Vec::new(),
            next_id: 1,
            ttl,
        }
    }

    pub fn push(&mut self, level: Level, message: impl Into<String>, now: Instant) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.items.push(Notification {
            id,
            level,
            message: message.into(),
            created: now,
        });
        id
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    pub fn dismiss_latest(&mut self) -> bool {
        self.items.pop().is_some()
    }

    /// Drops every toast older than the TTL; returns whether any expired.
    pub fn expire(&mut self, now: Instant) -> bool {
        let before = self.items.len();
        let ttl = self.ttl;
        self.items
            .retain(|item| now.saturating_duration_since(item.created) < ttl);
        self.items.len() != before
    }

    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
