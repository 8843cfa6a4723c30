//! Search term helpers: query normalization and input debouncing.
use std::time::{Duration, Instant};

/// Default delay between the last keystroke and the list fetch.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Normalize a raw search term into the `search` query parameter.
/// Blank terms mean "no parameter".
pub fn search_param(term: &str) -> Option<&str> {
    let t = term.trim();
    if t.is_empty() { None } else { Some(t) }
}

/// Fires once after input has been quiet for `delay`.
#[derive(Clone, Debug)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Record an input event; pushes the deadline forward.
    pub fn touch(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Returns true exactly once when the deadline has passed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}
