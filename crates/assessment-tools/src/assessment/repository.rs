use serde::Serialize;

use super::domain::{
    CriteriaBlock, CriteriaBlockId, EntityId, EntityKind, Event, EventId, Expert, ExpertId,
    ExpertToken, Rating, ScoreableEntity,
};
use super::requests::RatingFilter;

/// Storage abstraction over the event document collections.
///
/// Besides plain document access the store provides the two atomic primitives the
/// voting and scoring rules are built on: [`AssessmentStore::modify_event_entities`]
/// and [`AssessmentStore::upsert_rating`]. Implementations must run each of them as a
/// single isolated operation (a transaction or the store's write lock).
pub trait AssessmentStore: Send + Sync {
    fn insert_event(&self, event: Event) -> Result<Event, RepositoryError>;
    fn update_event(&self, event: Event) -> Result<(), RepositoryError>;
    fn fetch_event(&self, id: &EventId) -> Result<Option<Event>, RepositoryError>;
    fn list_events(&self) -> Result<Vec<Event>, RepositoryError>;
    fn delete_event(&self, id: &EventId) -> Result<Option<Event>, RepositoryError>;

    fn insert_entity(&self, entity: ScoreableEntity) -> Result<ScoreableEntity, RepositoryError>;
    fn fetch_entity(&self, id: &EntityId) -> Result<Option<ScoreableEntity>, RepositoryError>;
    fn list_entities(
        &self,
        event_id: &EventId,
        kind: Option<EntityKind>,
    ) -> Result<Vec<ScoreableEntity>, RepositoryError>;
    fn delete_entity(&self, id: &EntityId) -> Result<Option<ScoreableEntity>, RepositoryError>;

    /// Hands every entity of the event to `apply` and persists the mutated records,
    /// with no other write interleaving between the read and the write-back.
    ///
    /// Only records whose id already exists are written back; entities pushed onto or
    /// removed from the vector are ignored.
    fn modify_event_entities<T, F>(&self, event_id: &EventId, apply: F) -> Result<T, RepositoryError>
    where
        F: FnOnce(&mut Vec<ScoreableEntity>) -> T;

    fn insert_expert(&self, expert: Expert) -> Result<Expert, RepositoryError>;
    fn update_expert(&self, expert: Expert) -> Result<(), RepositoryError>;
    fn fetch_expert(&self, id: &ExpertId) -> Result<Option<Expert>, RepositoryError>;
    fn fetch_expert_by_token(&self, token: &ExpertToken)
        -> Result<Option<Expert>, RepositoryError>;
    fn list_experts(&self, event_id: &EventId) -> Result<Vec<Expert>, RepositoryError>;
    fn delete_expert(&self, id: &ExpertId) -> Result<Option<Expert>, RepositoryError>;

    fn insert_block(&self, block: CriteriaBlock) -> Result<CriteriaBlock, RepositoryError>;
    fn update_block(&self, block: CriteriaBlock) -> Result<(), RepositoryError>;
    fn fetch_block(&self, id: &CriteriaBlockId) -> Result<Option<CriteriaBlock>, RepositoryError>;
    fn list_blocks(&self, event_id: &EventId) -> Result<Vec<CriteriaBlock>, RepositoryError>;
    fn delete_block(&self, id: &CriteriaBlockId) -> Result<Option<CriteriaBlock>, RepositoryError>;
    /// Atomically drops every block of the event and stores `blocks` in their place.
    fn replace_blocks(
        &self,
        event_id: &EventId,
        blocks: Vec<CriteriaBlock>,
    ) -> Result<Vec<CriteriaBlock>, RepositoryError>;

    fn fetch_rating(
        &self,
        expert_id: &ExpertId,
        entity_id: &EntityId,
    ) -> Result<Option<Rating>, RepositoryError>;
    /// Find-or-create-or-replace keyed by `(expert_id, entity_id)`.
    ///
    /// `build` receives the stored rating for the pair, if any, and returns the record
    /// to persist. The lookup and the write form one isolated step, so concurrent
    /// upserts for the same pair serialize and the last writer wins.
    fn upsert_rating<F>(
        &self,
        expert_id: &ExpertId,
        entity_id: &EntityId,
        build: F,
    ) -> Result<RatingUpsert, RepositoryError>
    where
        F: FnOnce(Option<Rating>) -> Rating;
    fn list_ratings(&self, filter: &RatingFilter) -> Result<Vec<Rating>, RepositoryError>;
}

/// Result of an upsert: the stored rating and whether it was newly created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RatingUpsert {
    pub rating: Rating,
    pub created: bool,
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
