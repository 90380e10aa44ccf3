//! Report encoding
//!
//! This module wraps engine results in JSON report envelopes carrying producer
//! metadata, ready to be embedded in the collaborator's API responses.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineError;
use crate::ranking::LeaderboardSort;
use crate::schema::DetectionResponse;
use crate::types::{LeaderboardEntry, ProfileStats, ScoredDetection, UserAggregate};
use crate::{ENGINE_VERSION, PRODUCER_NAME};

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

/// Producer metadata stamped on every report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// A scored detection, optionally with the aggregate it produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionReport {
    pub report_version: String,
    pub producer: ReportProducer,
    pub computed_at_utc: String,
    pub detection: DetectionResponse,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregate: Option<UserAggregate>,
}

/// Enriched profile fields for one user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileReport {
    pub report_version: String,
    pub producer: ReportProducer,
    pub computed_at_utc: String,
    pub aggregate: UserAggregate,
    pub stats: ProfileStats,
}

/// Ranked friends leaderboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardReport {
    pub report_version: String,
    pub producer: ReportProducer,
    pub computed_at_utc: String,
    pub sort: LeaderboardSort,
    pub entries: Vec<LeaderboardEntry>,
}

/// Report encoder for producing JSON payloads
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    fn producer(&self) -> ReportProducer {
        ReportProducer {
            name: PRODUCER_NAME.to_string(),
            version: ENGINE_VERSION.to_string(),
            instance_id: self.instance_id.clone(),
        }
    }

    pub fn encode_detection(
        &self,
        detection_id: Option<i64>,
        scored: &ScoredDetection,
        aggregate: Option<&UserAggregate>,
    ) -> DetectionReport {
        DetectionReport {
            report_version: REPORT_VERSION.to_string(),
            producer: self.producer(),
            computed_at_utc: Utc::now().to_rfc3339(),
            detection: DetectionResponse::new(detection_id, scored),
            aggregate: aggregate.copied(),
        }
    }

    pub fn encode_profile(&self, aggregate: &UserAggregate, stats: ProfileStats) -> ProfileReport {
        ProfileReport {
            report_version: REPORT_VERSION.to_string(),
            producer: self.producer(),
            computed_at_utc: Utc::now().to_rfc3339(),
            aggregate: *aggregate,
            stats,
        }
    }

    pub fn encode_leaderboard(
        &self,
        sort: LeaderboardSort,
        entries: Vec<LeaderboardEntry>,
    ) -> LeaderboardReport {
        LeaderboardReport {
            report_version: REPORT_VERSION.to_string(),
            producer: self.producer(),
            computed_at_utc: Utc::now().to_rfc3339(),
            sort,
            entries,
        }
    }

    /// Serialize any report to pretty JSON
    pub fn to_json<T: Serialize>(&self, report: &T) -> Result<String, EngineError> {
        serde_json::to_string_pretty(report).map_err(|e| EngineError::EncodingError(e.to_string()))
    }
}
