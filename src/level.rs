//! Level classification and progress
//!
//! Accumulated detection minutes map onto ascending threshold bands. A user
//! below the first threshold is level 1; a user past the last threshold sits in
//! an uncapped terminal level `thresholds.len() + 1`.

use serde::{Deserialize, Serialize};

/// Default level thresholds in minutes
pub const DEFAULT_LEVEL_THRESHOLDS: [u32; 6] = [30, 60, 120, 360, 720, 1440];

/// A level and the fractional position inside its band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelStanding {
    pub level: u32,
    pub progress: f64,
}

/// Ordered level thresholds plus the progress clamping policy.
///
/// Built from a validated [`EngineConfig`](crate::config::EngineConfig) or
/// directly through [`LevelScale::new`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelScale {
    thresholds: Vec<u32>,
    clamp_progress: bool,
}

impl Default for LevelScale {
    fn default() -> Self {
        Self::new(DEFAULT_LEVEL_THRESHOLDS.to_vec())
    }
}

impl LevelScale {
    /// Create a scale from ascending minute thresholds, clamping progress
    pub fn new(thresholds: Vec<u32>) -> Self {
        Self {
            thresholds,
            clamp_progress: true,
        }
    }

    /// Toggle clamping of progress into `[0, 1]`
    pub fn with_clamp_progress(mut self, clamp: bool) -> Self {
        self.clamp_progress = clamp;
        self
    }

    pub fn thresholds(&self) -> &[u32] {
        &self.thresholds
    }

    /// The uncapped top level
    pub fn terminal_level(&self) -> u32 {
        self.thresholds.len() as u32 + 1
    }

    /// Level for an accumulated minute count
    pub fn level(&self, total_minutes: u64) -> u32 {
        self.thresholds
            .iter()
            .position(|&t| total_minutes < u64::from(t))
            .map(|idx| idx as u32 + 1)
            .unwrap_or_else(|| self.terminal_level())
    }

    /// Fractional position of `total_minutes` inside `level`'s band.
    ///
    /// `level` must come from [`LevelScale::level`] on the same minutes.
    pub fn progress(&self, total_minutes: u64, level: u32) -> f64 {
        if level >= self.terminal_level() {
            return 1.0;
        }

        let idx = level.max(1) as usize - 1;
        let lower = if idx == 0 {
            0.0
        } else {
            f64::from(self.thresholds[idx - 1])
        };
        let upper = f64::from(self.thresholds[idx]);

        let width = upper - lower;
        if width <= 0.0 {
            return 1.0;
        }

        let progress = (total_minutes as f64 - lower) / width;
        if self.clamp_progress {
            progress.clamp(0.0, 1.0)
        } else {
            progress
        }
    }

    /// Level and progress computed together from one minute count
    pub fn standing(&self, total_minutes: u64) -> LevelStanding {
        let level = self.level(total_minutes);
        LevelStanding {
            level,
            progress: self.progress(total_minutes, level),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_level_boundaries() {
        let scale = LevelScale::default();
        assert_eq!(scale.level(0), 1);
        assert_eq!(scale.level(29), 1);
        assert_eq!(scale.level(30), 2);
        assert_eq!(scale.level(59), 2);
        assert_eq!(scale.level(60), 3);
        assert_eq!(scale.level(1439), 6);
        assert_eq!(scale.level(1440), 7);
        assert_eq!(scale.level(1441), 7);
        assert_eq!(scale.level(100_000), 7);
    }

    #[test]
    fn test_progress_examples() {
        let scale = LevelScale::default();
        assert_eq!(scale.progress(15, 1), 0.5);
        assert_eq!(scale.progress(30, 2), 0.0);
        assert_eq!(scale.progress(45, 2), 0.5);
        assert_eq!(scale.progress(2000, scale.terminal_level()), 1.0);
        assert_eq!(scale.progress(240, 4), 0.5);
    }

    #[test]
    fn test_progress_clamps_stale_level() {
        let scale = LevelScale::default();
        // 90 minutes belongs to level 3, not 2
        assert_eq!(scale.progress(90, 2), 1.0);

        let raw = LevelScale::default().with_clamp_progress(false);
        assert_eq!(raw.progress(90, 2), 2.0);
    }

    #[test]
    fn test_standing_is_idempotent() {
        let scale = LevelScale::default();
        for minutes in [0, 15, 30, 45, 500, 1440, 5000] {
            let first = scale.standing(minutes);
            let second = scale.standing(minutes);
            assert_eq!(first, second);
            assert!((0.0..=1.0).contains(&first.progress));
            assert_eq!(first.level, scale.level(minutes));
        }
    }

    #[test]
    fn test_custom_thresholds() {
        let scale = LevelScale::new(vec![10, 100]);
        assert_eq!(scale.terminal_level(), 3);
        assert_eq!(scale.standing(5), LevelStanding { level: 1, progress: 0.5 });
        assert_eq!(scale.standing(55), LevelStanding { level: 2, progress: 0.5 });
        assert_eq!(scale.standing(100), LevelStanding { level: 3, progress: 1.0 });
    }

    #[test]
    fn test_empty_scale_is_always_terminal() {
        let scale = LevelScale::new(Vec::new());
        assert_eq!(scale.standing(0), LevelStanding { level: 1, progress: 1.0 });
    }
}
