use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::domain::{EntityId, EventId, ScoreableEntity};
use super::error::AssessmentError;
use super::repository::AssessmentStore;

/// Owns the "one entity per event open for scoring" rule.
///
/// Every transition goes through [`AssessmentStore::modify_event_entities`], so the
/// check of the current holder and the hand-over happen in one isolated step.
pub struct VotingOrchestrator<S> {
    store: Arc<S>,
}

/// What an activation changed.
#[derive(Debug, Clone, PartialEq)]
pub struct Handover {
    pub activated: ScoreableEntity,
    pub deactivated: Vec<EntityId>,
}

impl<S> VotingOrchestrator<S>
where
    S: AssessmentStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Open `entity_id` for scoring, closing whichever entity of the same event held it.
    pub fn activate_for_voting(&self, entity_id: &EntityId) -> Result<Handover, AssessmentError> {
        let entity = self
            .store
            .fetch_entity(entity_id)?
            .ok_or_else(|| AssessmentError::not_found("entity", entity_id))?;

        let now = Utc::now();
        let handover = self
            .store
            .modify_event_entities(&entity.event_id, |entities| {
                hand_over(entities, entity_id, now)
            })??;

        info!(
            event_id = %entity.event_id,
            entity_id = %entity_id,
            deactivated = ?handover.deactivated,
            "entity opened for voting"
        );
        Ok(handover)
    }

    /// Close scoring for a single entity. Safe to repeat.
    pub fn stop_voting(&self, entity_id: &EntityId) -> Result<ScoreableEntity, AssessmentError> {
        let entity = self
            .store
            .fetch_entity(entity_id)?
            .ok_or_else(|| AssessmentError::not_found("entity", entity_id))?;

        let now = Utc::now();
        let (stopped, changed) = self
            .store
            .modify_event_entities(&entity.event_id, |entities| {
                entities
                    .iter_mut()
                    .find(|candidate| candidate.id == *entity_id)
                    .map(|target| {
                        let changed = target.finish_evaluation(now);
                        (target.clone(), changed)
                    })
            })?
            .ok_or_else(|| AssessmentError::not_found("entity", entity_id))?;

        if changed {
            info!(event_id = %stopped.event_id, entity_id = %entity_id, "voting stopped");
        }
        Ok(stopped)
    }

    /// Close scoring for every entity of the event, returning how many were open.
    pub fn stop_all_voting(&self, event_id: &EventId) -> Result<usize, AssessmentError> {
        self.store
            .fetch_event(event_id)?
            .ok_or_else(|| AssessmentError::not_found("event", event_id))?;

        let now = Utc::now();
        let stopped = self.store.modify_event_entities(event_id, |entities| {
            entities
                .iter_mut()
                .filter(|entity| entity.is_active_for_voting)
                .map(|entity| entity.finish_evaluation(now))
                .filter(|changed| *changed)
                .count()
        })?;

        info!(event_id = %event_id, stopped, "voting stopped for event");
        Ok(stopped)
    }

    /// The entity currently open for scoring in the event, if any.
    pub fn active_for_voting(
        &self,
        event_id: &EventId,
    ) -> Result<Option<ScoreableEntity>, AssessmentError> {
        let mut active = self
            .store
            .list_entities(event_id, None)?
            .into_iter()
            .filter(|entity| entity.is_active_for_voting);

        let current = active.next();
        if active.next().is_some() {
            warn!(event_id = %event_id, "more than one entity is open for voting");
        }
        Ok(current)
    }
}

/// Re-checks the target inside the isolated section: it may have been removed or
/// disabled since the caller looked it up.
fn hand_over(
    entities: &mut [ScoreableEntity],
    target: &EntityId,
    now: DateTime<Utc>,
) -> Result<Handover, AssessmentError> {
    let index = entities
        .iter()
        .position(|entity| entity.id == *target)
        .ok_or_else(|| AssessmentError::not_found("entity", target))?;

    if !entities[index].is_active {
        return Err(AssessmentError::InactiveEntity {
            entity_id: target.clone(),
        });
    }

    let mut deactivated = Vec::new();
    for entity in entities.iter_mut() {
        if entity.id != *target && entity.is_active_for_voting {
            entity.finish_evaluation(now);
            deactivated.push(entity.id.clone());
        }
    }

    entities[index].begin_evaluation(now);
    Ok(Handover {
        activated: entities[index].clone(),
        deactivated,
    })
}
