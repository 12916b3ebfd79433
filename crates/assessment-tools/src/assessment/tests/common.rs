use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::assessment::domain::{
    CriteriaBlock, CriteriaBlockId, CriteriaScope, Criterion, EntityId, EntityKind, Event,
    EventId, Expert, ExpertId, ExpertToken, Rating, RatingItem, ScoreableEntity,
};
use crate::assessment::memory::InMemoryAssessmentStore;
use crate::assessment::repository::{AssessmentStore, RatingUpsert, RepositoryError};
use crate::assessment::requests::{
    NewCriteriaBlock, NewEntity, NewEvent, NewExpert, RatingFilter, RatingSubmission,
};
use crate::assessment::{assessment_router, AssessmentService};
use crate::config::AssessmentConfig;

pub(super) type MemoryService = AssessmentService<InMemoryAssessmentStore>;

pub(super) fn config() -> AssessmentConfig {
    AssessmentConfig {
        public_base_url: "https://jury.example.org/".to_string(),
        leaderboard_size: 3,
    }
}

pub(super) fn build_service() -> (Arc<MemoryService>, Arc<InMemoryAssessmentStore>) {
    let store = Arc::new(InMemoryAssessmentStore::new());
    let service = Arc::new(AssessmentService::new(store.clone(), config()));
    (service, store)
}

pub(super) fn router_with_service(service: Arc<MemoryService>) -> axum::Router {
    assessment_router(service)
}

pub(super) fn new_event(name: &str) -> NewEvent {
    NewEvent {
        name: name.to_string(),
        location: "Innopolis".to_string(),
        ..NewEvent::default()
    }
}

/// A demo-day style rubric: one shared block plus one block per kind.
pub(super) fn rubric() -> Vec<NewCriteriaBlock> {
    vec![
        NewCriteriaBlock {
            block_name: "Product".to_string(),
            applies_to: CriteriaScope::Team,
            criteria: vec![
                criterion("Working solution", 5),
                criterion("Technological complexity", 5),
            ],
            order: 1,
        },
        NewCriteriaBlock {
            block_name: "Pitch".to_string(),
            applies_to: CriteriaScope::All,
            criteria: vec![criterion("Quality of information delivery", 5)],
            order: 0,
        },
        NewCriteriaBlock {
            block_name: "Individual".to_string(),
            applies_to: CriteriaScope::Participant,
            criteria: vec![criterion("Communication skills", 5)],
            order: 2,
        },
    ]
}

pub(super) fn criterion(name: &str, max_score: u32) -> Criterion {
    Criterion {
        name: name.to_string(),
        max_score,
    }
}

pub(super) fn item(name: &str, score: i64) -> RatingItem {
    RatingItem {
        criterion_name: name.to_string(),
        score,
        criteria_block_id: None,
    }
}

pub(super) fn team(name: &str) -> NewEntity {
    NewEntity {
        kind: EntityKind::Team,
        name: name.to_string(),
        project_name: format!("{name} project"),
        case_description: String::new(),
    }
}

pub(super) fn participant(name: &str) -> NewEntity {
    NewEntity {
        kind: EntityKind::Participant,
        name: name.to_string(),
        project_name: String::new(),
        case_description: String::new(),
    }
}

/// Event with the rubric, two teams, one participant, and two experts.
pub(super) struct Fixture {
    pub(super) service: Arc<MemoryService>,
    pub(super) store: Arc<InMemoryAssessmentStore>,
    pub(super) event: Event,
    pub(super) team_one: ScoreableEntity,
    pub(super) team_two: ScoreableEntity,
    pub(super) solo: ScoreableEntity,
    pub(super) alice: Expert,
    pub(super) bob: Expert,
}

impl Fixture {
    pub(super) fn rate(
        &self,
        expert: &Expert,
        entity: &ScoreableEntity,
        items: Vec<RatingItem>,
    ) -> RatingUpsert {
        self.service
            .submit_rating(RatingSubmission {
                event_id: self.event.id.clone(),
                expert_id: expert.id.clone(),
                entity_id: entity.id.clone(),
                items,
            })
            .expect("rating accepted")
    }
}

pub(super) fn fixture() -> Fixture {
    let (service, store) = build_service();
    let event = service
        .create_event(new_event("Demo day"))
        .expect("event created");
    for block in rubric() {
        service
            .create_block(&event.id, block)
            .expect("block created");
    }
    let team_one = service
        .create_entity(&event.id, team("Team1"))
        .expect("team created");
    let team_two = service
        .create_entity(&event.id, team("Team2"))
        .expect("team created");
    let solo = service
        .create_entity(&event.id, participant("Dana"))
        .expect("participant created");
    let alice = service
        .create_expert(
            &event.id,
            NewExpert {
                full_name: "Alice Jury".to_string(),
            },
        )
        .expect("expert created");
    let bob = service
        .create_expert(
            &event.id,
            NewExpert {
                full_name: "Bob Jury".to_string(),
            },
        )
        .expect("expert created");

    Fixture {
        service,
        store,
        event,
        team_one,
        team_two,
        solo,
        alice,
        bob,
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Store whose backend is always down.
pub(super) struct UnavailableStore;

fn offline() -> RepositoryError {
    RepositoryError::Unavailable("document store offline".to_string())
}

impl AssessmentStore for UnavailableStore {
    fn insert_event(&self, _event: Event) -> Result<Event, RepositoryError> {
        Err(offline())
    }

    fn update_event(&self, _event: Event) -> Result<(), RepositoryError> {
        Err(offline())
    }

    fn fetch_event(&self, _id: &EventId) -> Result<Option<Event>, RepositoryError> {
        Err(offline())
    }

    fn list_events(&self) -> Result<Vec<Event>, RepositoryError> {
        Err(offline())
    }

    fn delete_event(&self, _id: &EventId) -> Result<Option<Event>, RepositoryError> {
        Err(offline())
    }

    fn insert_entity(&self, _entity: ScoreableEntity) -> Result<ScoreableEntity, RepositoryError> {
        Err(offline())
    }

    fn fetch_entity(&self, _id: &EntityId) -> Result<Option<ScoreableEntity>, RepositoryError> {
        Err(offline())
    }

    fn list_entities(
        &self,
        _event_id: &EventId,
        _kind: Option<EntityKind>,
    ) -> Result<Vec<ScoreableEntity>, RepositoryError> {
        Err(offline())
    }

    fn delete_entity(&self, _id: &EntityId) -> Result<Option<ScoreableEntity>, RepositoryError> {
        Err(offline())
    }

    fn modify_event_entities<T, F>(
        &self,
        _event_id: &EventId,
        _apply: F,
    ) -> Result<T, RepositoryError>
    where
        F: FnOnce(&mut Vec<ScoreableEntity>) -> T,
    {
        Err(offline())
    }

    fn insert_expert(&self, _expert: Expert) -> Result<Expert, RepositoryError> {
        Err(offline())
    }

    fn update_expert(&self, _expert: Expert) -> Result<(), RepositoryError> {
        Err(offline())
    }

    fn fetch_expert(&self, _id: &ExpertId) -> Result<Option<Expert>, RepositoryError> {
        Err(offline())
    }

    fn fetch_expert_by_token(
        &self,
        _token: &ExpertToken,
    ) -> Result<Option<Expert>, RepositoryError> {
        Err(offline())
    }

    fn list_experts(&self, _event_id: &EventId) -> Result<Vec<Expert>, RepositoryError> {
        Err(offline())
    }

    fn delete_expert(&self, _id: &ExpertId) -> Result<Option<Expert>, RepositoryError> {
        Err(offline())
    }

    fn insert_block(&self, _block: CriteriaBlock) -> Result<CriteriaBlock, RepositoryError> {
        Err(offline())
    }

    fn update_block(&self, _block: CriteriaBlock) -> Result<(), RepositoryError> {
        Err(offline())
    }

    fn fetch_block(&self, _id: &CriteriaBlockId) -> Result<Option<CriteriaBlock>, RepositoryError> {
        Err(offline())
    }

    fn list_blocks(&self, _event_id: &EventId) -> Result<Vec<CriteriaBlock>, RepositoryError> {
        Err(offline())
    }

    fn delete_block(
        &self,
        _id: &CriteriaBlockId,
    ) -> Result<Option<CriteriaBlock>, RepositoryError> {
        Err(offline())
    }

    fn replace_blocks(
        &self,
        _event_id: &EventId,
        _blocks: Vec<CriteriaBlock>,
    ) -> Result<Vec<CriteriaBlock>, RepositoryError> {
        Err(offline())
    }

    fn fetch_rating(
        &self,
        _expert_id: &ExpertId,
        _entity_id: &EntityId,
    ) -> Result<Option<Rating>, RepositoryError> {
        Err(offline())
    }

    fn upsert_rating<F>(
        &self,
        _expert_id: &ExpertId,
        _entity_id: &EntityId,
        _build: F,
    ) -> Result<RatingUpsert, RepositoryError>
    where
        F: FnOnce(Option<Rating>) -> Rating,
    {
        Err(offline())
    }

    fn list_ratings(&self, _filter: &RatingFilter) -> Result<Vec<Rating>, RepositoryError> {
        Err(offline())
    }
}
