//! Population ranking
//!
//! Percentile rank against every user's all-time score, and the friends
//! leaderboard ordered by level or by score.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::level::LevelScale;
use crate::types::{LeaderboardEntry, LeaderboardMember, ProfileStats, UserAggregate};

/// Percentage of the population scoring at or below `user_score`.
///
/// Ties count, and so does the user's own entry: the unique minimum of a
/// population of N ranks `100 / N`. Returns `0.0` for an empty population.
pub fn percentile_rank(user_score: f64, population: &[f64]) -> f64 {
    if population.is_empty() {
        return 0.0;
    }
    let at_or_below = population.iter().filter(|&&s| s <= user_score).count();
    at_or_below as f64 / population.len() as f64 * 100.0
}

/// Level, progress and percentile rank for a profile read
pub fn profile_stats(
    aggregate: &UserAggregate,
    population: &[f64],
    scale: &LevelScale,
) -> ProfileStats {
    let standing = scale.standing(aggregate.total_minutes());
    ProfileStats {
        level: standing.level,
        level_progress: standing.progress,
        percentile_rank: percentile_rank(aggregate.all_time_score, population),
    }
}

/// Leaderboard ordering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaderboardSort {
    /// Level descending, then progress descending
    #[default]
    Level,
    /// All-time score descending
    Score,
}

impl FromStr for LeaderboardSort {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "level" => Ok(LeaderboardSort::Level),
            "score" => Ok(LeaderboardSort::Score),
            other => Err(EngineError::InvalidSortKey(other.to_string())),
        }
    }
}

/// Rank a set of users. Equal keys keep their input order.
pub fn build_leaderboard(
    members: &[LeaderboardMember],
    scale: &LevelScale,
    sort: LeaderboardSort,
) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = members
        .iter()
        .map(|member| {
            let standing = scale.standing(member.aggregate.total_minutes());
            LeaderboardEntry {
                user_id: member.user_id,
                user_name: member.user_name.clone(),
                photo_url: member.photo_url.clone(),
                rank: 0,
                level: standing.level,
                progress: standing.progress,
                all_time_score: member.aggregate.all_time_score,
            }
        })
        .collect();

    match sort {
        LeaderboardSort::Level => entries.sort_by(|a, b| {
            b.level
                .cmp(&a.level)
                .then_with(|| descending(a.progress, b.progress))
        }),
        LeaderboardSort::Score => {
            entries.sort_by(|a, b| descending(a.all_time_score, b.all_time_score))
        }
    }

    for (idx, entry) in entries.iter_mut().enumerate() {
        entry.rank = idx as u32 + 1;
    }

    entries
}

fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SessionDuration;
    use pretty_assertions::assert_eq;

    fn member(user_id: i64, name: &str, score: f64, minutes: u64) -> LeaderboardMember {
        LeaderboardMember {
            user_id,
            user_name: name.to_string(),
            photo_url: None,
            aggregate: UserAggregate {
                all_time_score: score,
                total_prediction_count: 100,
                total_detection_time: SessionDuration::from_hms(0, minutes, 0),
            },
        }
    }

    #[test]
    fn test_percentile_rank_inclusive() {
        let population = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile_rank(5.0, &population), 100.0);
        assert_eq!(percentile_rank(1.0, &population), 20.0);
        assert_eq!(percentile_rank(3.0, &population), 60.0);
        assert_eq!(percentile_rank(0.5, &population), 0.0);
    }

    #[test]
    fn test_percentile_rank_ties() {
        let population = [0.5, 0.5, 0.5, 0.9];
        assert_eq!(percentile_rank(0.5, &population), 75.0);
    }

    #[test]
    fn test_percentile_rank_empty_population() {
        assert_eq!(percentile_rank(0.7, &[]), 0.0);
    }

    #[test]
    fn test_profile_stats() {
        let aggregate = UserAggregate {
            all_time_score: 0.8,
            total_prediction_count: 500,
            total_detection_time: SessionDuration::from_hms(0, 45, 59),
        };
        let stats = profile_stats(&aggregate, &[0.2, 0.8, 0.9, 0.4], &LevelScale::default());

        assert_eq!(stats.level, 2);
        assert_eq!(stats.level_progress, 0.5);
        assert_eq!(stats.percentile_rank, 75.0);
    }

    #[test]
    fn test_leaderboard_by_level_then_progress() {
        let members = vec![
            member(1, "me", 0.9, 20),
            member(2, "ana", 0.4, 45),
            member(3, "bo", 0.6, 50),
            member(4, "cy", 0.7, 200),
        ];
        let board = build_leaderboard(&members, &LevelScale::default(), LeaderboardSort::Level);

        let order: Vec<(i64, u32)> = board.iter().map(|e| (e.user_id, e.rank)).collect();
        assert_eq!(order, vec![(4, 1), (3, 2), (2, 3), (1, 4)]);
        assert_eq!(board[0].level, 4);
    }

    #[test]
    fn test_leaderboard_by_score() {
        let members = vec![
            member(1, "me", 0.5, 10),
            member(2, "ana", 0.9, 10),
            member(3, "bo", 0.7, 10),
        ];
        let board = build_leaderboard(&members, &LevelScale::default(), LeaderboardSort::Score);

        let ids: Vec<i64> = board.iter().map(|e| e.user_id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
        assert_eq!(board.iter().map(|e| e.rank).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_leaderboard_ties_keep_input_order() {
        let members = vec![member(7, "x", 0.5, 10), member(8, "y", 0.5, 10)];
        let board = build_leaderboard(&members, &LevelScale::default(), LeaderboardSort::Score);
        assert_eq!(board[0].user_id, 7);
        assert_eq!(board[1].user_id, 8);
    }

    #[test]
    fn test_sort_key_parsing() {
        assert_eq!("level".parse::<LeaderboardSort>().unwrap(), LeaderboardSort::Level);
        assert_eq!("score".parse::<LeaderboardSort>().unwrap(), LeaderboardSort::Score);
        assert!(matches!(
            "name".parse::<LeaderboardSort>(),
            Err(EngineError::InvalidSortKey(key)) if key == "name"
        ));
    }
}
