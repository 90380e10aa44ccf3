//! Adapter for turning detection records into engine sessions
//!
//! Handles single records, JSON arrays, and NDJSON streams, and gates every
//! record through validation before it reaches the scorer.

use crate::error::EngineError;
use crate::schema::detection::*;
use crate::types::DetectionSession;

/// Adapter for converting detection records to sessions
pub struct DetectionAdapter;

impl DetectionAdapter {
    /// Parse a single JSON detection record
    pub fn parse(json: &str) -> Result<DetectionRecord, EngineError> {
        let record: DetectionRecord = serde_json::from_str(json)?;
        Ok(record)
    }

    /// Parse a JSON string containing an array of detection records
    pub fn parse_array(json: &str) -> Result<Vec<DetectionRecord>, EngineError> {
        let records: Vec<DetectionRecord> = serde_json::from_str(json)?;
        Ok(records)
    }

    /// Parse NDJSON (newline-delimited JSON) containing detection records
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<DetectionRecord>, EngineError> {
        let mut records = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<DetectionRecord>(trimmed) {
                Ok(record) => records.push(record),
                Err(e) => {
                    return Err(EngineError::ParseError(format!(
                        "Failed to parse line {}: {}",
                        line_num + 1,
                        e
                    )));
                }
            }
        }
        Ok(records)
    }

    /// Validate a record and convert it to a session
    pub fn to_session(record: &DetectionRecord) -> Result<DetectionSession, EngineError> {
        if let Err(e) = record.validate() {
            tracing::warn!(detection_id = ?record.detection_id, error = %e, "rejected detection record");
            return Err(e.into());
        }
        Ok(record.to_session())
    }

    /// Validate and convert a batch, failing on the first invalid record
    pub fn to_sessions(records: &[DetectionRecord]) -> Result<Vec<DetectionSession>, EngineError> {
        records.iter().map(Self::to_session).collect()
    }

    /// Validate a batch of records, returning only the failures
    pub fn validate_records(records: &[DetectionRecord]) -> Vec<ValidationResult> {
        records
            .iter()
            .enumerate()
            .filter_map(|(idx, record)| {
                record.validate().err().map(|error| ValidationResult {
                    index: idx,
                    detection_id: record.detection_id,
                    error,
                })
            })
            .collect()
    }
}

/// A record that failed validation
#[derive(Debug)]
pub struct ValidationResult {
    pub index: usize,
    pub detection_id: Option<i64>,
    pub error: ValidationError,
}
