//! Process-local document store.
//!
//! Every collection lives behind one `RwLock`, so the atomic primitives of
//! [`AssessmentStore`] run under a single write guard and readers always observe
//! committed state.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::domain::{
    CriteriaBlock, CriteriaBlockId, EntityId, EntityKind, Event, EventId, Expert, ExpertId,
    ExpertToken, Rating, ScoreableEntity,
};
use super::repository::{AssessmentStore, RatingUpsert, RepositoryError};
use super::requests::RatingFilter;

#[derive(Debug, Default)]
struct Collections {
    events: BTreeMap<EventId, Event>,
    entities: BTreeMap<EntityId, ScoreableEntity>,
    experts: BTreeMap<ExpertId, Expert>,
    blocks: BTreeMap<CriteriaBlockId, CriteriaBlock>,
    ratings: BTreeMap<(ExpertId, EntityId), Rating>,
}

#[derive(Debug, Default)]
pub struct InMemoryAssessmentStore {
    collections: RwLock<Collections>,
}

impl InMemoryAssessmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Collections>, RepositoryError> {
        self.collections
            .read()
            .map_err(|_| RepositoryError::Unavailable("store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Collections>, RepositoryError> {
        self.collections
            .write()
            .map_err(|_| RepositoryError::Unavailable("store lock poisoned".to_string()))
    }
}

impl AssessmentStore for InMemoryAssessmentStore {
    fn insert_event(&self, event: Event) -> Result<Event, RepositoryError> {
        let mut guard = self.write()?;
        if guard.events.contains_key(&event.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.events.insert(event.id.clone(), event.clone());
        Ok(event)
    }

    fn update_event(&self, event: Event) -> Result<(), RepositoryError> {
        let mut guard = self.write()?;
        match guard.events.get_mut(&event.id) {
            Some(slot) => {
                *slot = event;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch_event(&self, id: &EventId) -> Result<Option<Event>, RepositoryError> {
        Ok(self.read()?.events.get(id).cloned())
    }

    fn list_events(&self) -> Result<Vec<Event>, RepositoryError> {
        let mut events: Vec<Event> = self.read()?.events.values().cloned().collect();
        events.sort_by(|a, b| b.event_date.cmp(&a.event_date));
        Ok(events)
    }

    fn delete_event(&self, id: &EventId) -> Result<Option<Event>, RepositoryError> {
        Ok(self.write()?.events.remove(id))
    }

    fn insert_entity(&self, entity: ScoreableEntity) -> Result<ScoreableEntity, RepositoryError> {
        let mut guard = self.write()?;
        if guard.entities.contains_key(&entity.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.entities.insert(entity.id.clone(), entity.clone());
        Ok(entity)
    }

    fn fetch_entity(&self, id: &EntityId) -> Result<Option<ScoreableEntity>, RepositoryError> {
        Ok(self.read()?.entities.get(id).cloned())
    }

    fn list_entities(
        &self,
        event_id: &EventId,
        kind: Option<EntityKind>,
    ) -> Result<Vec<ScoreableEntity>, RepositoryError> {
        let guard = self.read()?;
        let mut entities: Vec<ScoreableEntity> = guard
            .entities
            .values()
            .filter(|entity| entity.event_id == *event_id)
            .filter(|entity| kind.map_or(true, |kind| entity.kind == kind))
            .cloned()
            .collect();
        // Newest first; ids break ties between records created in the same instant.
        entities.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(entities)
    }

    fn delete_entity(&self, id: &EntityId) -> Result<Option<ScoreableEntity>, RepositoryError> {
        Ok(self.write()?.entities.remove(id))
    }

    fn modify_event_entities<T, F>(&self, event_id: &EventId, apply: F) -> Result<T, RepositoryError>
    where
        F: FnOnce(&mut Vec<ScoreableEntity>) -> T,
    {
        let mut guard = self.write()?;
        let mut working: Vec<ScoreableEntity> = guard
            .entities
            .values()
            .filter(|entity| entity.event_id == *event_id)
            .cloned()
            .collect();

        let outcome = apply(&mut working);

        for entity in working {
            if let Some(slot) = guard.entities.get_mut(&entity.id) {
                *slot = entity;
            }
        }
        Ok(outcome)
    }

    fn insert_expert(&self, expert: Expert) -> Result<Expert, RepositoryError> {
        let mut guard = self.write()?;
        let token_taken = guard
            .experts
            .values()
            .any(|existing| existing.token == expert.token);
        if token_taken || guard.experts.contains_key(&expert.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.experts.insert(expert.id.clone(), expert.clone());
        Ok(expert)
    }

    fn update_expert(&self, expert: Expert) -> Result<(), RepositoryError> {
        let mut guard = self.write()?;
        match guard.experts.get_mut(&expert.id) {
            Some(slot) => {
                *slot = expert;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch_expert(&self, id: &ExpertId) -> Result<Option<Expert>, RepositoryError> {
        Ok(self.read()?.experts.get(id).cloned())
    }

    fn fetch_expert_by_token(
        &self,
        token: &ExpertToken,
    ) -> Result<Option<Expert>, RepositoryError> {
        let guard = self.read()?;
        Ok(guard
            .experts
            .values()
            .find(|expert| expert.token == *token)
            .cloned())
    }

    fn list_experts(&self, event_id: &EventId) -> Result<Vec<Expert>, RepositoryError> {
        let guard = self.read()?;
        Ok(guard
            .experts
            .values()
            .filter(|expert| expert.event_id == *event_id)
            .cloned()
            .collect())
    }

    fn delete_expert(&self, id: &ExpertId) -> Result<Option<Expert>, RepositoryError> {
        Ok(self.write()?.experts.remove(id))
    }

    fn insert_block(&self, block: CriteriaBlock) -> Result<CriteriaBlock, RepositoryError> {
        let mut guard = self.write()?;
        if guard.blocks.contains_key(&block.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.blocks.insert(block.id.clone(), block.clone());
        Ok(block)
    }

    fn update_block(&self, block: CriteriaBlock) -> Result<(), RepositoryError> {
        let mut guard = self.write()?;
        match guard.blocks.get_mut(&block.id) {
            Some(slot) => {
                *slot = block;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch_block(&self, id: &CriteriaBlockId) -> Result<Option<CriteriaBlock>, RepositoryError> {
        Ok(self.read()?.blocks.get(id).cloned())
    }

    fn list_blocks(&self, event_id: &EventId) -> Result<Vec<CriteriaBlock>, RepositoryError> {
        let guard = self.read()?;
        Ok(guard
            .blocks
            .values()
            .filter(|block| block.event_id == *event_id)
            .cloned()
            .collect())
    }

    fn delete_block(&self, id: &CriteriaBlockId) -> Result<Option<CriteriaBlock>, RepositoryError> {
        Ok(self.write()?.blocks.remove(id))
    }

    fn replace_blocks(
        &self,
        event_id: &EventId,
        blocks: Vec<CriteriaBlock>,
    ) -> Result<Vec<CriteriaBlock>, RepositoryError> {
        let mut guard = self.write()?;
        guard.blocks.retain(|_, block| block.event_id != *event_id);
        for block in &blocks {
            guard.blocks.insert(block.id.clone(), block.clone());
        }
        Ok(blocks)
    }

    fn fetch_rating(
        &self,
        expert_id: &ExpertId,
        entity_id: &EntityId,
    ) -> Result<Option<Rating>, RepositoryError> {
        let guard = self.read()?;
        Ok(guard
            .ratings
            .get(&(expert_id.clone(), entity_id.clone()))
            .cloned())
    }

    fn upsert_rating<F>(
        &self,
        expert_id: &ExpertId,
        entity_id: &EntityId,
        build: F,
    ) -> Result<RatingUpsert, RepositoryError>
    where
        F: FnOnce(Option<Rating>) -> Rating,
    {
        let key = (expert_id.clone(), entity_id.clone());
        let mut guard = self.write()?;
        let existing = guard.ratings.get(&key).cloned();
        let created = existing.is_none();
        let rating = build(existing);
        guard.ratings.insert(key, rating.clone());
        Ok(RatingUpsert { rating, created })
    }

    fn list_ratings(&self, filter: &RatingFilter) -> Result<Vec<Rating>, RepositoryError> {
        let guard = self.read()?;
        let mut ratings: Vec<Rating> = guard
            .ratings
            .values()
            .filter(|rating| filter.matches(rating))
            .cloned()
            .collect();
        ratings.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(ratings)
    }
}
