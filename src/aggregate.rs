//! Per-user aggregate folding
//!
//! Folds each scored session into the user's running state. The all-time score
//! is a running mean weighted by prediction count, so longer sessions carry
//! proportionally more weight than short ones.

use crate::types::{ScoredDetection, SessionDuration, UserAggregate};

/// Fold a new session score into a prediction-weighted running mean.
///
/// Returns `(updated_score, updated_count)`. When both counts are zero the
/// prior score is returned unchanged.
pub fn update_all_time_score(
    prior_score: f64,
    prior_count: u64,
    new_score: f64,
    new_count: u64,
) -> (f64, u64) {
    let updated_count = prior_count + new_count;
    if updated_count == 0 {
        return (prior_score, 0);
    }

    let weighted =
        prior_score * prior_count as f64 + new_score * new_count as f64;
    (weighted / updated_count as f64, updated_count)
}

impl UserAggregate {
    /// Aggregate after recording one more session.
    ///
    /// Callers persist the returned value in the same transaction they read
    /// `self` from; two interleaved updates would drop a session.
    pub fn record(
        &self,
        session_score: f64,
        predictions: u64,
        duration: SessionDuration,
    ) -> UserAggregate {
        let (all_time_score, total_prediction_count) = update_all_time_score(
            self.all_time_score,
            self.total_prediction_count,
            session_score,
            predictions,
        );

        UserAggregate {
            all_time_score,
            total_prediction_count,
            total_detection_time: self.total_detection_time + duration,
        }
    }

    /// Aggregate after recording a scored detection
    pub fn record_detection(&self, detection: &ScoredDetection) -> UserAggregate {
        self.record(
            detection.score,
            u64::from(detection.session.total_predictions),
            detection.session.total_time,
        )
    }

    /// Accumulated detection time in whole minutes
    pub fn total_minutes(&self) -> u64 {
        self.total_detection_time.total_minutes()
    }

    /// Load an aggregate from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the aggregate to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_first_session_sets_score() {
        let (score, count) = update_all_time_score(0.0, 0, 0.82, 100);
        assert!((score - 0.82).abs() < 1e-9);
        assert_eq!(count, 100);
    }

    #[test]
    fn test_weighted_by_prediction_count() {
        let (score, count) = update_all_time_score(0.82, 100, 0.5, 50);
        assert_eq!(count, 150);
        assert!((score - 107.0 / 150.0).abs() < 1e-9);
        assert!((score - 0.7133).abs() < 1e-4);
    }

    #[test]
    fn test_zero_counts_keep_prior_score() {
        assert_eq!(update_all_time_score(0.4, 0, 0.9, 0), (0.4, 0));
    }

    #[test]
    fn test_zero_new_count_leaves_score_unchanged() {
        let (score, count) = update_all_time_score(0.6, 40, 1.0, 0);
        assert_eq!(count, 40);
        assert!((score - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_record_accumulates_time_and_count() {
        let aggregate = UserAggregate::default()
            .record(0.82, 100, SessionDuration::from_hms(0, 45, 30))
            .record(0.5, 50, SessionDuration::from_hms(1, 20, 45));

        assert_eq!(aggregate.total_prediction_count, 150);
        assert_eq!(
            aggregate.total_detection_time,
            SessionDuration::from_hms(2, 6, 15)
        );
        assert_eq!(aggregate.total_minutes(), 126);
        assert!((aggregate.all_time_score - 107.0 / 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_record_never_decreases_totals() {
        let mut aggregate = UserAggregate::default();
        for (score, count, secs) in [(0.9, 10, 60), (0.1, 200, 0), (0.5, 1, 3600)] {
            let next = aggregate.record(score, count, SessionDuration::from_seconds(secs));
            assert!(next.total_prediction_count >= aggregate.total_prediction_count);
            assert!(next.total_detection_time >= aggregate.total_detection_time);
            assert!((0.0..=1.0).contains(&next.all_time_score));
            aggregate = next;
        }
    }

    #[test]
    fn test_json_round_trip() {
        let aggregate = UserAggregate::default().record(0.75, 80, SessionDuration::from_hms(0, 30, 0));
        let json = aggregate.to_json().unwrap();
        assert!(json.contains("\"total_detection_time\":\"00:30:00\""));

        let loaded = UserAggregate::from_json(&json).unwrap();
        assert_eq!(loaded, aggregate);
    }
}
