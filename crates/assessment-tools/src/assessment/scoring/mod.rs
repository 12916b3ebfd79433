mod statistics;
mod validation;

pub use statistics::{
    compute_statistics, rank_top_n, CriterionStatistic, EntityStatistics, ExpertScore,
    Leaderboard, RankedEntity,
};

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::criteria::CriteriaResolver;
use super::domain::{EntityKind, EventId, Rating};
use super::error::AssessmentError;
use super::repository::{AssessmentStore, RatingUpsert};
use super::requests::{RatingFilter, RatingSubmission};
use validation::validate_items;

/// Upserts expert ratings and derives statistics and rankings from them.
pub struct RatingAggregator<S> {
    store: Arc<S>,
    resolver: CriteriaResolver<S>,
}

impl<S> RatingAggregator<S>
where
    S: AssessmentStore,
{
    pub fn new(store: Arc<S>) -> Self {
        let resolver = CriteriaResolver::new(store.clone());
        Self { store, resolver }
    }

    /// Create or fully replace the rating of `(expert, entity)`.
    pub fn submit_rating(
        &self,
        submission: RatingSubmission,
    ) -> Result<RatingUpsert, AssessmentError> {
        let RatingSubmission {
            event_id,
            expert_id,
            entity_id,
            items,
        } = submission;

        let expert = self
            .store
            .fetch_expert(&expert_id)?
            .filter(|expert| expert.event_id == event_id)
            .ok_or_else(|| AssessmentError::not_found("expert", &expert_id))?;
        let entity = self
            .store
            .fetch_entity(&entity_id)?
            .filter(|entity| entity.event_id == event_id)
            .ok_or_else(|| AssessmentError::not_found("entity", &entity_id))?;

        if !entity.is_active {
            return Err(AssessmentError::InactiveEntity { entity_id });
        }

        let criteria = self.resolver.criteria_for(&event_id, entity.kind)?;
        validate_items(&items, &criteria)?;

        let now = Utc::now();
        let upsert = self
            .store
            .upsert_rating(&expert.id, &entity.id, |existing| match existing {
                Some(mut rating) => {
                    rating.replace_items(items, now);
                    rating
                }
                None => Rating::new(event_id, expert.id.clone(), entity.id.clone(), items, now),
            })?;

        info!(
            expert_id = %upsert.rating.expert_id,
            entity_id = %upsert.rating.entity_id,
            total_score = upsert.rating.total_score,
            created = upsert.created,
            "rating saved"
        );
        Ok(upsert)
    }

    pub fn ratings(&self, filter: &RatingFilter) -> Result<Vec<Rating>, AssessmentError> {
        Ok(self.store.list_ratings(filter)?)
    }

    /// Statistics for every active entity of the event, optionally restricted to one kind.
    pub fn compute_statistics(
        &self,
        event_id: &EventId,
        kind: Option<EntityKind>,
    ) -> Result<Vec<EntityStatistics>, AssessmentError> {
        let entities = self.store.list_entities(event_id, kind)?;
        let ratings = self.store.list_ratings(&RatingFilter::for_event(event_id.clone()))?;
        let experts = self.store.list_experts(event_id)?;
        Ok(compute_statistics(&entities, &ratings, &experts))
    }

    pub fn compute_top_n(
        &self,
        event_id: &EventId,
        kind: EntityKind,
        n: usize,
    ) -> Result<Vec<RankedEntity>, AssessmentError> {
        let statistics = self.compute_statistics(event_id, Some(kind))?;
        Ok(rank_top_n(&statistics, kind, n))
    }

    /// Top-N for both kinds; a kind filter empties the other list instead of dropping it.
    pub fn leaderboard(
        &self,
        event_id: &EventId,
        kind: Option<EntityKind>,
        n: usize,
    ) -> Result<Leaderboard, AssessmentError> {
        let statistics = self.compute_statistics(event_id, None)?;
        let wants = |candidate: EntityKind| kind.map_or(true, |kind| kind == candidate);

        Ok(Leaderboard {
            teams: if wants(EntityKind::Team) {
                rank_top_n(&statistics, EntityKind::Team, n)
            } else {
                Vec::new()
            },
            participants: if wants(EntityKind::Participant) {
                rank_top_n(&statistics, EntityKind::Participant, n)
            } else {
                Vec::new()
            },
        })
    }
}
