//! Detection record and response definitions

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{
    BodyPart, BodyPartCounts, DetectionSession, FeetCounts, HeadCounts, NeckCounts,
    ScoredDetection, SessionDuration, ShoulderCounts, TorsoCounts,
};

/// Current detection record schema version
pub const SCHEMA_VERSION: &str = "posture.detection.v1";

/// A completed monitoring session as submitted by a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DetectionRecord {
    /// Identifier assigned by the collaborator's store, if any
    #[serde(rename = "DetectionID", default, skip_serializing_if = "Option::is_none")]
    pub detection_id: Option<i64>,
    #[serde(deserialize_with = "lenient_utc")]
    pub start_time: DateTime<Utc>,
    #[serde(deserialize_with = "lenient_utc")]
    pub end_time: DateTime<Utc>,
    pub total_time: SessionDuration,
    pub total_predictions: u32,
    pub torso: TorsoCounts,
    pub feet: FeetCounts,
    pub head: HeadCounts,
    pub shoulder: ShoulderCounts,
    pub neck: NeckCounts,
}

impl DetectionRecord {
    /// Check the record before it reaches the scoring engine
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.total_predictions == 0 {
            return Err(ValidationError::ZeroPredictions);
        }

        if self.end_time < self.start_time {
            return Err(ValidationError::InvalidTimeRange {
                start: self.start_time.to_rfc3339(),
                end: self.end_time.to_rfc3339(),
            });
        }

        check_counts(&self.head, self.total_predictions)?;
        check_counts(&self.neck, self.total_predictions)?;
        check_counts(&self.shoulder, self.total_predictions)?;
        check_counts(&self.torso, self.total_predictions)?;
        check_counts(&self.feet, self.total_predictions)?;

        Ok(())
    }

    /// Convert into the engine's session type
    pub fn to_session(&self) -> DetectionSession {
        DetectionSession {
            start_time: self.start_time,
            end_time: self.end_time,
            total_time: self.total_time,
            total_predictions: self.total_predictions,
            head: self.head,
            neck: self.neck,
            shoulder: self.shoulder,
            torso: self.torso,
            feet: self.feet,
        }
    }
}

fn check_counts<C: BodyPartCounts>(counts: &C, total: u32) -> Result<(), ValidationError> {
    let sum = counts.total_count();
    if sum > u64::from(total) {
        return Err(ValidationError::CountsExceedPredictions {
            part: C::PART,
            sum,
            total,
        });
    }
    Ok(())
}

/// Accept RFC 3339 timestamps and offset-less ones, which are read as UTC
fn lenient_utc<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
        .map_err(|e| serde::de::Error::custom(format!("invalid timestamp {raw:?}: {e}")))
}

/// Body-part counters echoed back with their partial score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ScoredBodyPart<C> {
    #[serde(flatten)]
    pub counts: C,
    pub partial_score: f64,
}

/// Scored detection in the service's response shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DetectionResponse {
    #[serde(rename = "DetectionID", default, skip_serializing_if = "Option::is_none")]
    pub detection_id: Option<i64>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub total_time: SessionDuration,
    pub total_predictions: u32,
    pub score: f64,
    pub torso: ScoredBodyPart<TorsoCounts>,
    pub feet: ScoredBodyPart<FeetCounts>,
    pub head: ScoredBodyPart<HeadCounts>,
    pub shoulder: ScoredBodyPart<ShoulderCounts>,
    pub neck: ScoredBodyPart<NeckCounts>,
}

impl DetectionResponse {
    pub fn new(detection_id: Option<i64>, scored: &ScoredDetection) -> Self {
        let session = &scored.session;
        let partials = &scored.partial_scores;
        Self {
            detection_id,
            start_time: session.start_time,
            end_time: session.end_time,
            total_time: session.total_time,
            total_predictions: session.total_predictions,
            score: scored.score,
            torso: ScoredBodyPart {
                counts: session.torso,
                partial_score: partials.torso,
            },
            feet: ScoredBodyPart {
                counts: session.feet,
                partial_score: partials.feet,
            },
            head: ScoredBodyPart {
                counts: session.head,
                partial_score: partials.head,
            },
            shoulder: ScoredBodyPart {
                counts: session.shoulder,
                partial_score: partials.shoulder,
            },
            neck: ScoredBodyPart {
                counts: session.neck,
                partial_score: partials.neck,
            },
        }
    }
}

/// Validation errors for detection records
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("TotalPredictions must be greater than zero")]
    ZeroPredictions,

    #[error("EndTime {end} is before StartTime {start}")]
    InvalidTimeRange { start: String, end: String },

    #[error("{part} counts sum to {sum}, more than TotalPredictions ({total})")]
    CountsExceedPredictions { part: BodyPart, sum: u64, total: u32 },
}
