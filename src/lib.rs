//! Posture Engine - scoring and leveling for posture detection sessions
//!
//! The engine turns a completed monitoring session's per-body-part
//! classification counts into a session score, folds sessions into a per-user
//! prediction-weighted all-time score, and gamifies accumulated detection time
//! into a level with fractional progress and a population percentile rank.
//!
//! Pipeline: detection record → validation → scoring → aggregate → report.
//!
//! The scoring core (`scoring`, `aggregate`, `level`, `ranking`) is pure and
//! safe to call from any thread. Callers own the read-modify-write of a user's
//! aggregate and must run it as one atomic unit.

pub mod aggregate;
pub mod config;
pub mod encoder;
pub mod error;
pub mod level;
pub mod pipeline;
pub mod ranking;
pub mod schema;
pub mod scoring;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use aggregate::update_all_time_score;
pub use config::EngineConfig;
pub use error::EngineError;
pub use level::{LevelScale, LevelStanding, DEFAULT_LEVEL_THRESHOLDS};
pub use pipeline::{rank_leaderboard, score_detection, PostureProcessor};
pub use ranking::{build_leaderboard, percentile_rank, profile_stats, LeaderboardSort};
pub use scoring::{partial_score, session_score, SessionScorer};

// Schema exports
pub use schema::{DetectionAdapter, DetectionRecord, SCHEMA_VERSION};

/// Engine version embedded in all reports
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "posture-engine";
