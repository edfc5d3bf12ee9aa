use std::collections::VecDeque;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Size of the rolling window behind [`EpisodeStats::recent_capture_rate`].
const RECENT_WINDOW: usize = 100;

/// Running tally of finished episodes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EpisodeStats {
    pub episodes: u32,
    pub captures: u32,
    pub timeouts: u32,
    pub total_steps: u64,
    /// `true` for captures, newest last.
    pub recent: VecDeque<bool>,
}

impl EpisodeStats {
    pub fn new() -> Self {
        Self {
            episodes: 0,
            captures: 0,
            timeouts: 0,
            total_steps: 0,
            recent: VecDeque::with_capacity(RECENT_WINDOW),
        }
    }

    pub fn record(&mut self, captured: bool, steps: u32) {
        if captured {
            self.captures += 1;
        } else {
            self.timeouts += 1;
        }
        self.episodes += 1;
        self.total_steps += u64::from(steps);

        self.recent.push_back(captured);
        if self.recent.len() > RECENT_WINDOW {
            self.recent.pop_front();
        }
    }

    /// Fraction of all episodes that ended in a capture (0.0 before any).
    pub fn capture_rate(&self) -> f32 {
        if self.episodes == 0 {
            return 0.0;
        }
        self.captures as f32 / self.episodes as f32
    }

    pub fn recent_capture_rate(&self) -> f32 {
        if self.recent.is_empty() {
            return 0.0;
        }
        let caught = self.recent.iter().filter(|&&c| c).count();
        caught as f32 / self.recent.len() as f32
    }

    pub fn mean_length(&self) -> f32 {
        if self.episodes == 0 {
            return 0.0;
        }
        self.total_steps as f32 / self.episodes as f32
    }
}

impl Default for EpisodeStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rates_track_outcomes() {
        let mut s = EpisodeStats::new();
        assert_eq!(s.capture_rate(), 0.0);
        s.record(true, 10);
        s.record(false, 300);
        s.record(true, 20);
        assert_eq!(s.episodes, 3);
        assert_eq!(s.captures, 2);
        assert_eq!(s.timeouts, 1);
        assert!((s.capture_rate() - 2.0 / 3.0).abs() < 1e-6);
        assert!((s.mean_length() - 110.0).abs() < 1e-4);
    }

    #[test]
    fn recent_window_is_bounded() {
        let mut s = EpisodeStats::new();
        for _ in 0..RECENT_WINDOW {
            s.record(false, 1);
        }
        for _ in 0..RECENT_WINDOW {
            s.record(true, 1);
        }
        assert_eq!(s.recent.len(), RECENT_WINDOW);
        assert_eq!(s.recent_capture_rate(), 1.0);
        assert_eq!(s.capture_rate(), 0.5);
    }
}
