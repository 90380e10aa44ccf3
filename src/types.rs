//! Core types for the posture engine
//!
//! This module defines the data that flows through each stage: per-body-part
//! observations, detection sessions, scored detections, the per-user aggregate,
//! and the derived profile and leaderboard views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Add;
use std::str::FromStr;

use crate::error::EngineError;

/// Tracked body part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyPart {
    Head,
    Neck,
    Shoulder,
    Torso,
    Feet,
}

impl BodyPart {
    pub fn as_str(&self) -> &'static str {
        match self {
            BodyPart::Head => "head",
            BodyPart::Neck => "neck",
            BodyPart::Shoulder => "shoulder",
            BodyPart::Torso => "torso",
            BodyPart::Feet => "feet",
        }
    }
}

impl fmt::Display for BodyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification counters collected for one body part during a session.
///
/// Exactly one category per body part counts as correct posture.
pub trait BodyPartCounts {
    /// Which body part these counters describe
    const PART: BodyPart;

    /// Count of the correct/neutral category
    fn correct_count(&self) -> u32;

    /// Sum of every category, ambiguous included
    fn total_count(&self) -> u64;
}

/// Head classification counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct HeadCounts {
    pub bowed_count: u32,
    pub neutral_count: u32,
    pub tilt_back_count: u32,
    pub ambiguous_count: u32,
}

impl BodyPartCounts for HeadCounts {
    const PART: BodyPart = BodyPart::Head;

    fn correct_count(&self) -> u32 {
        self.neutral_count
    }

    fn total_count(&self) -> u64 {
        [
            self.bowed_count,
            self.neutral_count,
            self.tilt_back_count,
            self.ambiguous_count,
        ]
        .iter()
        .map(|c| u64::from(*c))
        .sum()
    }
}

/// Neck classification counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct NeckCounts {
    pub forward_count: u32,
    pub neutral_count: u32,
    pub ambiguous_count: u32,
}

impl BodyPartCounts for NeckCounts {
    const PART: BodyPart = BodyPart::Neck;

    fn correct_count(&self) -> u32 {
        self.neutral_count
    }

    fn total_count(&self) -> u64 {
        u64::from(self.forward_count) + u64::from(self.neutral_count) + u64::from(self.ambiguous_count)
    }
}

/// Shoulder classification counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ShoulderCounts {
    pub hunched_count: u32,
    pub neutral_count: u32,
    pub shrug_count: u32,
    pub ambiguous_count: u32,
}

impl BodyPartCounts for ShoulderCounts {
    const PART: BodyPart = BodyPart::Shoulder;

    fn correct_count(&self) -> u32 {
        self.neutral_count
    }

    fn total_count(&self) -> u64 {
        [
            self.hunched_count,
            self.neutral_count,
            self.shrug_count,
            self.ambiguous_count,
        ]
        .iter()
        .map(|c| u64::from(*c))
        .sum()
    }
}

/// Torso classification counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TorsoCounts {
    pub backward_count: u32,
    pub forward_count: u32,
    pub neutral_count: u32,
    pub ambiguous_count: u32,
}

impl BodyPartCounts for TorsoCounts {
    const PART: BodyPart = BodyPart::Torso;

    fn correct_count(&self) -> u32 {
        self.neutral_count
    }

    fn total_count(&self) -> u64 {
        [
            self.backward_count,
            self.forward_count,
            self.neutral_count,
            self.ambiguous_count,
        ]
        .iter()
        .map(|c| u64::from(*c))
        .sum()
    }
}

/// Feet classification counters. Flat feet is the correct posture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct FeetCounts {
    pub ankle_on_knee_count: u32,
    pub flat_count: u32,
    pub ambiguous_count: u32,
}

impl BodyPartCounts for FeetCounts {
    const PART: BodyPart = BodyPart::Feet;

    fn correct_count(&self) -> u32 {
        self.flat_count
    }

    fn total_count(&self) -> u64 {
        u64::from(self.ankle_on_knee_count) + u64::from(self.flat_count) + u64::from(self.ambiguous_count)
    }
}

/// Whole-second duration rendered as `HH:MM:SS`.
///
/// Hours are not capped at 24, so accumulated detection time keeps growing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionDuration {
    seconds: u64,
}

impl SessionDuration {
    pub const ZERO: SessionDuration = SessionDuration { seconds: 0 };

    pub fn from_seconds(seconds: u64) -> Self {
        Self { seconds }
    }

    /// Saturates at `u64::MAX` seconds
    pub fn from_hms(hours: u64, minutes: u64, seconds: u64) -> Self {
        Self {
            seconds: hours
                .saturating_mul(3600)
                .saturating_add(minutes.saturating_mul(60))
                .saturating_add(seconds),
        }
    }

    pub fn as_seconds(&self) -> u64 {
        self.seconds
    }

    pub fn hours(&self) -> u64 {
        self.seconds / 3600
    }

    pub fn minutes(&self) -> u64 {
        (self.seconds % 3600) / 60
    }

    pub fn seconds(&self) -> u64 {
        self.seconds % 60
    }

    /// `hours * 60 + minutes`, seconds discarded
    pub fn total_minutes(&self) -> u64 {
        self.hours() * 60 + self.minutes()
    }
}

impl Add for SessionDuration {
    type Output = SessionDuration;

    fn add(self, rhs: SessionDuration) -> SessionDuration {
        SessionDuration::from_seconds(self.seconds.saturating_add(rhs.seconds))
    }
}

impl fmt::Display for SessionDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hours(),
            self.minutes(),
            self.seconds()
        )
    }
}

impl FromStr for SessionDuration {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidDuration(s.to_string());

        let mut parts = s.trim().split(':');
        let (Some(h), Some(m), Some(sec), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };

        // Fractional seconds ("00:10:05.250000") are dropped
        let sec = sec.split('.').next().unwrap_or(sec);

        let hours: u64 = h.parse().map_err(|_| invalid())?;
        let minutes: u64 = m.parse().map_err(|_| invalid())?;
        let seconds: u64 = sec.parse().map_err(|_| invalid())?;

        if minutes >= 60 || seconds >= 60 {
            return Err(invalid());
        }

        let total = hours
            .checked_mul(3600)
            .and_then(|h| h.checked_add(minutes * 60 + seconds))
            .ok_or_else(invalid)?;

        Ok(Self::from_seconds(total))
    }
}

impl Serialize for SessionDuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SessionDuration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One completed monitoring session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionSession {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Total elapsed detection time
    pub total_time: SessionDuration,
    /// Classification predictions made during the session
    pub total_predictions: u32,
    pub head: HeadCounts,
    pub neck: NeckCounts,
    pub shoulder: ShoulderCounts,
    pub torso: TorsoCounts,
    pub feet: FeetCounts,
}

/// Per-body-part partial scores, each in `[0, 1]`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialScores {
    pub head: f64,
    pub neck: f64,
    pub shoulder: f64,
    pub torso: f64,
    pub feet: f64,
}

impl PartialScores {
    pub fn get(&self, part: BodyPart) -> f64 {
        match part {
            BodyPart::Head => self.head,
            BodyPart::Neck => self.neck,
            BodyPart::Shoulder => self.shoulder,
            BodyPart::Torso => self.torso,
            BodyPart::Feet => self.feet,
        }
    }
}

/// A session together with its computed scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDetection {
    pub session: DetectionSession,
    pub partial_scores: PartialScores,
    /// Mean of the five partial scores
    pub score: f64,
}

/// Running per-user state, replaced after every recorded session
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UserAggregate {
    /// Prediction-weighted average of every session score (0 with no sessions)
    pub all_time_score: f64,
    pub total_prediction_count: u64,
    pub total_detection_time: SessionDuration,
}

/// Derived fields for an enriched profile read
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileStats {
    pub level: u32,
    pub level_progress: f64,
    /// Percentage of the population at or below this user's score
    pub percentile_rank: f64,
}

/// A user entered into a friends leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardMember {
    pub user_id: i64,
    pub user_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub aggregate: UserAggregate,
}

/// One ranked leaderboard row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub user_id: i64,
    pub user_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    /// 1-based position after sorting
    pub rank: u32,
    pub level: u32,
    pub progress: f64,
    pub all_time_score: f64,
}
