//! Pipeline orchestration
//!
//! This module provides the public API of the engine. It runs a detection
//! record through parsing, validation, scoring and aggregate folding, and
//! produces JSON reports.

use crate::aggregate::update_all_time_score;
use crate::config::EngineConfig;
use crate::encoder::{DetectionReport, ReportEncoder};
use crate::error::EngineError;
use crate::level::LevelScale;
use crate::ranking::{build_leaderboard, profile_stats, LeaderboardSort};
use crate::schema::{DetectionAdapter, DetectionRecord};
use crate::scoring::SessionScorer;
use crate::types::{LeaderboardMember, ProfileStats, ScoredDetection, UserAggregate};

/// Score one detection record JSON and return a detection report (stateless).
///
/// # Example
/// ```ignore
/// let report_json = score_detection(record_json)?;
/// ```
pub fn score_detection(record_json: String) -> Result<String, EngineError> {
    // Stage 1: Parse record
    let record = DetectionAdapter::parse(&record_json)?;

    // Stage 2: Validate and convert to a session
    let session = DetectionAdapter::to_session(&record)?;

    // Stage 3: Score
    let scored = SessionScorer::score(session);

    // Stage 4: Encode
    let encoder = ReportEncoder::new();
    encoder.to_json(&encoder.encode_detection(record.detection_id, &scored, None))
}

/// Rank a JSON array of leaderboard members and return a leaderboard report
pub fn rank_leaderboard(
    members_json: &str,
    sort_key: &str,
    config: &EngineConfig,
) -> Result<String, EngineError> {
    let sort: LeaderboardSort = sort_key.parse()?;
    let members: Vec<LeaderboardMember> = serde_json::from_str(members_json)?;
    let entries = build_leaderboard(&members, &config.level_scale(), sort);

    let encoder = ReportEncoder::new();
    encoder.to_json(&encoder.encode_leaderboard(sort, entries))
}

/// Stateful processor owning one user's aggregate.
///
/// Use this when folding a sequence of sessions for the same user.
pub struct PostureProcessor {
    scale: LevelScale,
    aggregate: UserAggregate,
    encoder: ReportEncoder,
}

impl Default for PostureProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl PostureProcessor {
    /// Create a new processor with default settings and an empty aggregate
    pub fn new() -> Self {
        Self::with_config(&EngineConfig::default())
    }

    /// Create a processor using a specific configuration
    pub fn with_config(config: &EngineConfig) -> Self {
        Self {
            scale: config.level_scale(),
            aggregate: UserAggregate::default(),
            encoder: ReportEncoder::new(),
        }
    }

    pub fn aggregate(&self) -> &UserAggregate {
        &self.aggregate
    }

    pub fn level_scale(&self) -> &LevelScale {
        &self.scale
    }

    /// Score a detection record, fold it into the aggregate, and return a
    /// report carrying the updated aggregate
    pub fn process(&mut self, record_json: &str) -> Result<String, EngineError> {
        let record = DetectionAdapter::parse(record_json)?;
        let report = self.process_record(&record)?;
        self.encoder.to_json(&report)
    }

    /// Same as [`process`](Self::process) for an already parsed record
    pub fn process_record(&mut self, record: &DetectionRecord) -> Result<DetectionReport, EngineError> {
        let session = DetectionAdapter::to_session(record)?;
        let scored = self.record(SessionScorer::score(session));

        Ok(self
            .encoder
            .encode_detection(record.detection_id, &scored, Some(&self.aggregate)))
    }

    /// Fold an already scored detection into the aggregate
    pub fn record(&mut self, scored: ScoredDetection) -> ScoredDetection {
        let prior = self.aggregate;
        self.aggregate = prior.record_detection(&scored);

        tracing::debug!(
            prior_score = prior.all_time_score,
            all_time_score = self.aggregate.all_time_score,
            total_prediction_count = self.aggregate.total_prediction_count,
            total_detection_time = %self.aggregate.total_detection_time,
            "updated user aggregate"
        );

        scored
    }

    /// Fold a bare session score and prediction count, leaving detection time unchanged
    pub fn record_score(&mut self, session_score: f64, predictions: u64) {
        let (score, count) = update_all_time_score(
            self.aggregate.all_time_score,
            self.aggregate.total_prediction_count,
            session_score,
            predictions,
        );
        self.aggregate.all_time_score = score;
        self.aggregate.total_prediction_count = count;
    }

    /// Level, progress and percentile rank against a population of all-time scores
    pub fn profile(&self, population: &[f64]) -> ProfileStats {
        profile_stats(&self.aggregate, population, &self.scale)
    }

    /// Profile report as JSON
    pub fn profile_json(&self, population: &[f64]) -> Result<String, EngineError> {
        let report = self
            .encoder
            .encode_profile(&self.aggregate, self.profile(population));
        self.encoder.to_json(&report)
    }

    /// Save the aggregate to JSON for persistence
    pub fn save_aggregate(&self) -> Result<String, EngineError> {
        self.aggregate
            .to_json()
            .map_err(|e| EngineError::EncodingError(e.to_string()))
    }

    /// Load the aggregate from JSON
    pub fn load_aggregate(&mut self, json: &str) -> Result<(), EngineError> {
        self.aggregate =
            UserAggregate::from_json(json).map_err(|e| EngineError::ParseError(e.to_string()))?;
        Ok(())
    }

    /// Reset to an empty aggregate
    pub fn clear_aggregate(&mut self) {
        self.aggregate = UserAggregate::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SessionDuration;
    use pretty_assertions::assert_eq;

    fn sample_record_json() -> &'static str {
        r#"{
            "DetectionID": 7,
            "StartTime": "2024-12-01T09:00:00Z",
            "EndTime": "2024-12-01T09:45:00Z",
            "TotalTime": "00:45:00",
            "TotalPredictions": 100,
            "Torso": {"BackwardCount": 10, "ForwardCount": 15, "NeutralCount": 70, "AmbiguousCount": 5},
            "Feet": {"AnkleOnKneeCount": 5, "FlatCount": 95, "AmbiguousCount": 0},
            "Head": {"BowedCount": 10, "NeutralCount": 80, "TiltBackCount": 5, "AmbiguousCount": 5},
            "Shoulder": {"HunchedCount": 10, "NeutralCount": 85, "ShrugCount": 5, "AmbiguousCount": 0},
            "Neck": {"ForwardCount": 20, "NeutralCount": 80, "AmbiguousCount": 0}
        }"#
    }

    fn second_record_json() -> &'static str {
        r#"{
            "StartTime": "2024-12-02T09:00:00Z",
            "EndTime": "2024-12-02T09:20:00Z",
            "TotalTime": "00:20:30",
            "TotalPredictions": 50,
            "Torso": {"NeutralCount": 25},
            "Feet": {"FlatCount": 25},
            "Head": {"NeutralCount": 25},
            "Shoulder": {"NeutralCount": 25},
            "Neck": {"NeutralCount": 25}
        }"#
    }

    #[test]
    fn test_score_detection() {
        let json = score_detection(sample_record_json().to_string()).unwrap();
        let report: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(report["report_version"], "1.0.0");
        assert_eq!(report["producer"]["name"], "posture-engine");
        assert_eq!(report["detection"]["DetectionID"], 7);
        assert!((report["detection"]["Score"].as_f64().unwrap() - 0.82).abs() < 1e-9);
        assert!(report.get("aggregate").is_none());
    }

    #[test]
    fn test_score_detection_rejects_invalid() {
        let bad = sample_record_json().replace("\"TotalPredictions\": 100", "\"TotalPredictions\": 0");
        assert!(matches!(
            score_detection(bad),
            Err(EngineError::InvalidDetection(_))
        ));
        assert!(score_detection("not json".to_string()).is_err());
    }

    #[test]
    fn test_score_detection_rejects_overflowing_total_time() {
        let bad = sample_record_json().replace("\"00:45:00\"", "\"9999999999999999:00:00\"");
        assert!(matches!(
            score_detection(bad),
            Err(EngineError::JsonError(_))
        ));
    }

    #[test]
    fn test_processor_folds_sessions() {
        let mut processor = PostureProcessor::new();

        processor.process(sample_record_json()).unwrap();
        let json = processor.process(second_record_json()).unwrap();

        let aggregate = processor.aggregate();
        assert_eq!(aggregate.total_prediction_count, 150);
        assert_eq!(
            aggregate.total_detection_time,
            SessionDuration::from_hms(1, 5, 30)
        );
        assert!((aggregate.all_time_score - 107.0 / 150.0).abs() < 1e-9);

        let report: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(report["aggregate"]["total_prediction_count"], 150);
        assert_eq!(report["aggregate"]["total_detection_time"], "01:05:30");
    }

    #[test]
    fn test_rejected_record_leaves_aggregate_untouched() {
        let mut processor = PostureProcessor::new();
        processor.process(sample_record_json()).unwrap();
        let before = *processor.aggregate();

        let bad = second_record_json().replace("\"TotalPredictions\": 50", "\"TotalPredictions\": 0");
        assert!(processor.process(&bad).is_err());
        assert_eq!(*processor.aggregate(), before);
    }

    #[test]
    fn test_profile_after_sessions() {
        let mut processor = PostureProcessor::new();
        processor.process(sample_record_json()).unwrap();

        // 45 minutes: level 2, halfway from 30 to 60
        let stats = processor.profile(&[0.1, 0.82, 0.95, 0.3]);
        assert_eq!(stats.level, 2);
        assert_eq!(stats.level_progress, 0.5);
        assert_eq!(stats.percentile_rank, 75.0);
    }

    #[test]
    fn test_aggregate_persistence() {
        let mut processor = PostureProcessor::new();
        processor.process(sample_record_json()).unwrap();
        let saved = processor.save_aggregate().unwrap();

        let mut restored = PostureProcessor::new();
        restored.load_aggregate(&saved).unwrap();
        restored.process(second_record_json()).unwrap();

        assert_eq!(restored.aggregate().total_prediction_count, 150);

        restored.clear_aggregate();
        assert_eq!(*restored.aggregate(), UserAggregate::default());
    }

    #[test]
    fn test_record_score_only_touches_score_and_count() {
        let mut processor = PostureProcessor::new();
        processor.record_score(0.82, 100);
        processor.record_score(0.5, 50);

        assert_eq!(processor.aggregate().total_prediction_count, 150);
        assert_eq!(processor.aggregate().total_detection_time, SessionDuration::ZERO);
        assert!((processor.aggregate().all_time_score - 0.71333).abs() < 1e-4);
    }

    #[test]
    fn test_custom_config_changes_levels() {
        let config = EngineConfig::from_json(r#"{"level_thresholds": [10, 40]}"#).unwrap();
        let mut processor = PostureProcessor::with_config(&config);
        processor.process(sample_record_json()).unwrap();

        let stats = processor.profile(&[]);
        assert_eq!(stats.level, 3);
        assert_eq!(stats.level_progress, 1.0);
        assert_eq!(stats.percentile_rank, 0.0);
    }

    #[test]
    fn test_rank_leaderboard() {
        let members = r#"[
            {"user_id": 1, "user_name": "me", "aggregate": {"all_time_score": 0.6, "total_prediction_count": 10, "total_detection_time": "00:10:00"}},
            {"user_id": 2, "user_name": "ana", "photo_url": "a.png", "aggregate": {"all_time_score": 0.9, "total_prediction_count": 10, "total_detection_time": "03:00:00"}}
        ]"#;

        let json = rank_leaderboard(members, "level", &EngineConfig::default()).unwrap();
        let report: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(report["entries"][0]["user_id"], 2);
        assert_eq!(report["entries"][0]["rank"], 1);
        assert_eq!(report["entries"][0]["level"], 4);

        assert!(matches!(
            rank_leaderboard(members, "name", &EngineConfig::default()),
            Err(EngineError::InvalidSortKey(_))
        ));
    }
}
