// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::time::{Duration, Instant};

pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(400);

/// Cancel-and-restart timer for search input. Only the last term entered
/// inside the window fires.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<(String, Instant)>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_DEBOUNCE)
    }
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn input(&mut self, term: impl Into<String>, now: Instant) {
        self.pending = Some((term.into(), now + self.delay));
    }

    /// Returns the pending term once its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let ready = matches!(&self.pending, Some((_, deadline)) if now >= *deadline);
        if !ready {
            return None;
        }
        self.pending.take().map(|(term, _)| term)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}
