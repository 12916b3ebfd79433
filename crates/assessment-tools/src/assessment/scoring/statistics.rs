use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use super::super::domain::{
    EntityKind, EntitySummary, Expert, ExpertId, Rating, RatingItem, ScoreableEntity,
};

/// Aggregated view of every rating one entity has received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityStatistics {
    pub entity: EntitySummary,
    pub ratings: Vec<ExpertScore>,
    /// Only criteria somebody actually scored appear here.
    pub criteria_stats: Vec<CriterionStatistic>,
    /// Mean of the per-expert totals.
    pub total_score: f64,
    /// Distinct experts that rated the entity.
    pub ratings_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpertScore {
    pub expert_id: ExpertId,
    pub expert_name: String,
    pub items: Vec<RatingItem>,
    pub total_score: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionStatistic {
    pub name: String,
    pub scores: Vec<i64>,
    pub average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntity {
    pub entity: EntitySummary,
    pub total_score: f64,
    pub ratings_count: usize,
}

/// Top-N per kind in one payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub teams: Vec<RankedEntity>,
    pub participants: Vec<RankedEntity>,
}

const UNKNOWN_EXPERT: &str = "Unknown";

/// Builds statistics for every active entity, keeping zero-rating entities in the output.
pub fn compute_statistics(
    entities: &[ScoreableEntity],
    ratings: &[Rating],
    experts: &[Expert],
) -> Vec<EntityStatistics> {
    let names: HashMap<&ExpertId, &str> = experts
        .iter()
        .map(|expert| (&expert.id, expert.full_name.as_str()))
        .collect();

    entities
        .iter()
        .filter(|entity| entity.is_active)
        .map(|entity| {
            let received: Vec<&Rating> = ratings
                .iter()
                .filter(|rating| rating.entity_id == entity.id)
                .collect();
            entity_statistics(entity, &received, &names)
        })
        .collect()
}

fn entity_statistics(
    entity: &ScoreableEntity,
    received: &[&Rating],
    names: &HashMap<&ExpertId, &str>,
) -> EntityStatistics {
    let mut criteria_stats: Vec<CriterionStatistic> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for rating in received {
        for item in &rating.items {
            let index = *positions
                .entry(item.criterion_name.as_str())
                .or_insert_with(|| {
                    criteria_stats.push(CriterionStatistic {
                        name: item.criterion_name.clone(),
                        scores: Vec::new(),
                        average: 0.0,
                    });
                    criteria_stats.len() - 1
                });
            criteria_stats[index].scores.push(item.score);
        }
    }

    for stat in &mut criteria_stats {
        stat.average = mean(stat.scores.iter().copied());
    }

    let experts: BTreeSet<&ExpertId> = received.iter().map(|rating| &rating.expert_id).collect();

    EntityStatistics {
        entity: entity.summary(),
        ratings: received
            .iter()
            .map(|rating| ExpertScore {
                expert_id: rating.expert_id.clone(),
                expert_name: names
                    .get(&rating.expert_id)
                    .copied()
                    .unwrap_or(UNKNOWN_EXPERT)
                    .to_string(),
                items: rating.items.clone(),
                total_score: rating.total_score,
            })
            .collect(),
        criteria_stats,
        total_score: mean(received.iter().map(|rating| rating.total_score)),
        ratings_count: experts.len(),
    }
}

/// Ranks rated entities of `kind`, best first, and keeps at most `n`.
///
/// Equal totals are ordered by `ratings_count` descending, then by entity id ascending.
pub fn rank_top_n(statistics: &[EntityStatistics], kind: EntityKind, n: usize) -> Vec<RankedEntity> {
    let mut ranked: Vec<RankedEntity> = statistics
        .iter()
        .filter(|stat| stat.entity.kind == kind && stat.ratings_count > 0)
        .map(|stat| RankedEntity {
            entity: stat.entity.clone(),
            total_score: stat.total_score,
            ratings_count: stat.ratings_count,
        })
        .collect();

    ranked.sort_by(compare_ranked);
    ranked.truncate(n);
    ranked
}

fn compare_ranked(a: &RankedEntity, b: &RankedEntity) -> Ordering {
    b.total_score
        .total_cmp(&a.total_score)
        .then_with(|| b.ratings_count.cmp(&a.ratings_count))
        .then_with(|| a.entity.id.cmp(&b.entity.id))
}

fn mean(values: impl Iterator<Item = i64>) -> f64 {
    let (sum, count) = values.fold((0i64, 0u64), |(sum, count), value| {
        (sum + value, count + 1)
    });
    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}
