//! Session scoring
//!
//! Converts raw per-body-part classification counts into partial scores and
//! averages them into a single session score.

use crate::types::{BodyPartCounts, DetectionSession, PartialScores, ScoredDetection};

/// Ratio of correct classifications to total predictions.
///
/// Returns `0.0` when no predictions were made.
pub fn partial_score(correct_count: u32, total_predictions: u32) -> f64 {
    if total_predictions == 0 {
        return 0.0;
    }
    f64::from(correct_count) / f64::from(total_predictions)
}

/// Unweighted mean of the five body-part partial scores
pub fn session_score(torso: f64, feet: f64, head: f64, shoulder: f64, neck: f64) -> f64 {
    (torso + feet + head + shoulder + neck) / 5.0
}

/// Partial score for one body part's counters against the session's prediction total
pub fn body_part_score<C: BodyPartCounts>(counts: &C, total_predictions: u32) -> f64 {
    partial_score(counts.correct_count(), total_predictions)
}

/// Scorer for completed detection sessions
pub struct SessionScorer;

impl SessionScorer {
    /// Compute partial scores for every body part
    pub fn partial_scores(session: &DetectionSession) -> PartialScores {
        let total = session.total_predictions;
        PartialScores {
            head: body_part_score(&session.head, total),
            neck: body_part_score(&session.neck, total),
            shoulder: body_part_score(&session.shoulder, total),
            torso: body_part_score(&session.torso, total),
            feet: body_part_score(&session.feet, total),
        }
    }

    /// Score a session. The score is fixed here and never recomputed.
    pub fn score(session: DetectionSession) -> ScoredDetection {
        let partial_scores = Self::partial_scores(&session);
        let score = session_score(
            partial_scores.torso,
            partial_scores.feet,
            partial_scores.head,
            partial_scores.shoulder,
            partial_scores.neck,
        );

        tracing::debug!(
            total_predictions = session.total_predictions,
            score,
            "scored detection session"
        );

        ScoredDetection {
            session,
            partial_scores,
            score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        BodyPart, FeetCounts, HeadCounts, NeckCounts, SessionDuration, ShoulderCounts,
        TorsoCounts,
    };
    use chrono::{TimeZone, Utc};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn make_session(total: u32) -> DetectionSession {
        DetectionSession {
            start_time: Utc.with_ymd_and_hms(2024, 12, 1, 9, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2024, 12, 1, 9, 30, 0).unwrap(),
            total_time: SessionDuration::from_hms(0, 30, 0),
            total_predictions: total,
            head: HeadCounts {
                bowed_count: 10,
                neutral_count: 80,
                tilt_back_count: 5,
                ambiguous_count: 5,
            },
            neck: NeckCounts {
                forward_count: 20,
                neutral_count: 80,
                ambiguous_count: 0,
            },
            shoulder: ShoulderCounts {
                hunched_count: 10,
                neutral_count: 85,
                shrug_count: 5,
                ambiguous_count: 0,
            },
            torso: TorsoCounts {
                backward_count: 10,
                forward_count: 15,
                neutral_count: 70,
                ambiguous_count: 5,
            },
            feet: FeetCounts {
                ankle_on_knee_count: 5,
                flat_count: 95,
                ambiguous_count: 0,
            },
        }
    }

    #[test]
    fn test_partial_score_edge_cases() {
        assert_eq!(partial_score(0, 0), 0.0);
        assert_eq!(partial_score(5, 10), 0.5);
        assert_eq!(partial_score(10, 10), 1.0);
        assert_eq!(partial_score(0, 10), 0.0);
    }

    #[test]
    fn test_partial_score_stays_in_unit_range() {
        let total = 37;
        for correct in 0..=total {
            let p = partial_score(correct, total);
            assert!((0.0..=1.0).contains(&p), "{correct}/{total} gave {p}");
        }
    }

    #[test]
    fn test_session_score_of_equal_partials() {
        for p in [0.0, 0.25, 0.5, 0.9, 1.0] {
            assert!(approx(session_score(p, p, p, p, p), p));
        }
    }

    #[test]
    fn test_session_score_example() {
        let score = session_score(0.7, 0.95, 0.8, 0.85, 0.8);
        assert!(approx(score, 0.82));
    }

    #[test]
    fn test_scorer_uses_correct_category_per_part() {
        let scored = SessionScorer::score(make_session(100));

        assert!(approx(scored.partial_scores.get(BodyPart::Torso), 0.7));
        assert!(approx(scored.partial_scores.get(BodyPart::Feet), 0.95));
        assert!(approx(scored.partial_scores.get(BodyPart::Head), 0.8));
        assert!(approx(scored.partial_scores.get(BodyPart::Shoulder), 0.85));
        assert!(approx(scored.partial_scores.get(BodyPart::Neck), 0.8));
        assert!(approx(scored.score, 0.82));
    }

    #[test]
    fn test_scorer_zero_predictions_scores_zero() {
        let scored = SessionScorer::score(make_session(0));
        assert_eq!(scored.partial_scores, PartialScores::default());
        assert_eq!(scored.score, 0.0);
    }
}
