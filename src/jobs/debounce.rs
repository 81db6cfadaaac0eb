// src/jobs/debounce.rs
//! Per-key debouncing driven by an external clock.
//!
//! Each key holds at most one pending action; re-triggering replaces the
//! action and restarts the delay. Actions come back from [`Debouncer::poll`]
//! once their delay has elapsed.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Adaptive delays in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebounceDelays {
    /// Keys mentioning drag/move.
    pub continuous_ms: u64,
    /// Everything else.
    pub default_ms: u64,
    /// Keys mentioning optimization/analysis.
    pub expensive_ms: u64,
}

impl Default for DebounceDelays {
    fn default() -> Self { Self { continuous_ms: 200, default_ms: 400, expensive_ms: 600 } }
}

impl DebounceDelays {
    pub const ZERO: DebounceDelays = DebounceDelays { continuous_ms: 0, default_ms: 0, expensive_ms: 0 };

    pub fn for_key(&self, key: &str) -> Duration {
        let k = key.to_ascii_lowercase();
        let ms = if k.contains("drag") || k.contains("move") {
            self.continuous_ms
        } else if k.contains("optimi") || k.contains("analy") {
            self.expensive_ms
        } else {
            self.default_ms
        };
        Duration::from_millis(ms)
    }
}

struct Pending<A> {
    due: Duration,
    action: A,
}

pub struct Debouncer<A> {
    delays: DebounceDelays,
    pending: HashMap<String, Pending<A>>,
}

impl<A> Default for Debouncer<A> {
    fn default() -> Self { Self::new(DebounceDelays::default()) }
}

impl<A> Debouncer<A> {
    pub fn new(delays: DebounceDelays) -> Self {
        Self { delays, pending: HashMap::new() }
    }

    #[inline]
    pub fn delays(&self) -> DebounceDelays { self.delays }

    pub fn set_delays(&mut self, delays: DebounceDelays) {
        self.delays = delays;
    }

    /// Schedule `action` for `key`, replacing anything pending under it.
    pub fn trigger(&mut self, key: &str, now: Duration, action: A) {
        let due = now + self.delays.for_key(key);
        self.pending.insert(key.to_string(), Pending { due, action });
    }

    /// Actions whose delay has elapsed, earliest first.
    pub fn poll(&mut self, now: Duration) -> Vec<(String, A)> {
        let ready: Vec<String> = self.pending.iter().filter(|(_, p)| p.due <= now).map(|(k, _)| k.clone()).collect();
        let mut out: Vec<(Duration, String, A)> = ready
            .into_iter()
            .filter_map(|k| self.pending.remove(&k).map(|p| (p.due, k, p.action)))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
        out.into_iter().map(|(_, k, a)| (k, a)).collect()
    }

    pub fn cancel(&mut self, key: &str) -> Option<A> {
        self.pending.remove(key).map(|p| p.action)
    }

    #[inline]
    pub fn is_pending(&self, key: &str) -> bool { self.pending.contains_key(key) }

    #[inline]
    pub fn pending_len(&self) -> usize { self.pending.len() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration { Duration::from_millis(v) }

    #[test]
    fn adaptive_delay_by_key() {
        let d = DebounceDelays::default();
        assert_eq!(d.for_key("drag-aim"), ms(200));
        assert_eq!(d.for_key("moveTarget"), ms(200));
        assert_eq!(d.for_key("optimize-aim"), ms(600));
        assert_eq!(d.for_key("slope-analysis"), ms(600));
        assert_eq!(d.for_key("hole-change"), ms(400));
    }

    #[test]
    fn retrigger_restarts_the_timer() {
        let mut d = Debouncer::new(DebounceDelays::default());
        d.trigger("hole", ms(0), 1);
        d.trigger("hole", ms(300), 2);
        assert!(d.poll(ms(450)).is_empty());
        assert_eq!(d.poll(ms(700)), vec![("hole".to_string(), 2)]);
        assert_eq!(d.pending_len(), 0);
    }

    #[test]
    fn keys_are_independent() {
        let mut d = Debouncer::new(DebounceDelays::default());
        d.trigger("drag-x", ms(0), "a");
        d.trigger("optimize", ms(0), "b");
        assert_eq!(d.poll(ms(250)), vec![("drag-x".to_string(), "a")]);
        assert!(d.is_pending("optimize"));
        assert_eq!(d.cancel("optimize"), Some("b"));
    }
}
