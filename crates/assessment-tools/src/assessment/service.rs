use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use super::criteria::{default_blocks, CriteriaResolver};
use super::domain::{
    next_record_id, CriteriaBlock, CriteriaBlockId, Criterion, EntityId, EntityKind, Event,
    EventId, Expert, ExpertId, ExpertToken, Rating, ScoreableEntity, VotingStatus,
};
use super::error::AssessmentError;
use super::repository::{AssessmentStore, RatingUpsert};
use super::requests::{
    CriteriaBlockUpdate, EntityUpdate, EventUpdate, ExpertUpdate, NewCriteriaBlock, NewEntity,
    NewEvent, NewExpert, RatingFilter, RatingSubmission, TokenRatingSubmission,
    MAX_CRITERION_SCORE,
};
use super::scoring::{EntityStatistics, Leaderboard, RankedEntity, RatingAggregator};
use super::voting::VotingOrchestrator;
use crate::config::AssessmentConfig;

/// Service composing the store, criteria resolver, voting orchestrator, and aggregator.
pub struct AssessmentService<S> {
    store: Arc<S>,
    resolver: CriteriaResolver<S>,
    voting: VotingOrchestrator<S>,
    scoring: RatingAggregator<S>,
    config: AssessmentConfig,
}

/// Everything an expert's scoring screen needs, resolved from their token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpertSession {
    pub expert: Expert,
    pub event: Event,
    pub active_entity: Option<ScoreableEntity>,
    pub criteria: Vec<CriteriaBlock>,
    pub existing_rating: Option<Rating>,
}

impl<S> AssessmentService<S>
where
    S: AssessmentStore + 'static,
{
    pub fn new(store: Arc<S>, config: AssessmentConfig) -> Self {
        Self {
            resolver: CriteriaResolver::new(store.clone()),
            voting: VotingOrchestrator::new(store.clone()),
            scoring: RatingAggregator::new(store.clone()),
            store,
            config,
        }
    }

    pub fn config(&self) -> &AssessmentConfig {
        &self.config
    }

    pub fn create_event(&self, request: NewEvent) -> Result<Event, AssessmentError> {
        let now = Utc::now();
        let event = Event {
            id: EventId(next_record_id("event")),
            name: required("name", &request.name)?,
            description: request.description,
            event_date: request.event_date.unwrap_or_else(|| now.date_naive()),
            location: request.location,
            status: request.status.unwrap_or_default(),
            voting_enabled: false,
            created_at: now,
            updated_at: now,
        };
        let stored = self.store.insert_event(event)?;
        info!(event_id = %stored.id, "event created");
        Ok(stored)
    }

    pub fn get_event(&self, id: &EventId) -> Result<Event, AssessmentError> {
        self.store
            .fetch_event(id)?
            .ok_or_else(|| AssessmentError::not_found("event", id))
    }

    pub fn list_events(&self) -> Result<Vec<Event>, AssessmentError> {
        Ok(self.store.list_events()?)
    }

    pub fn update_event(&self, id: &EventId, update: EventUpdate) -> Result<Event, AssessmentError> {
        let mut event = self.get_event(id)?;
        if let Some(name) = update.name {
            event.name = required("name", &name)?;
        }
        if let Some(description) = update.description {
            event.description = description;
        }
        if let Some(event_date) = update.event_date {
            event.event_date = event_date;
        }
        if let Some(location) = update.location {
            event.location = location;
        }
        if let Some(status) = update.status {
            event.status = status;
        }
        event.updated_at = Utc::now();
        self.store.update_event(event.clone())?;
        Ok(event)
    }

    /// Removes the event record only; its entities, experts, and ratings stay in place.
    pub fn delete_event(&self, id: &EventId) -> Result<Event, AssessmentError> {
        self.store
            .delete_event(id)?
            .ok_or_else(|| AssessmentError::not_found("event", id))
    }

    pub fn toggle_voting(&self, id: &EventId) -> Result<Event, AssessmentError> {
        let mut event = self.get_event(id)?;
        event.voting_enabled = !event.voting_enabled;
        event.updated_at = Utc::now();
        self.store.update_event(event.clone())?;
        info!(event_id = %id, voting_enabled = event.voting_enabled, "event voting toggled");
        Ok(event)
    }

    pub fn create_entity(
        &self,
        event_id: &EventId,
        request: NewEntity,
    ) -> Result<ScoreableEntity, AssessmentError> {
        self.get_event(event_id)?;
        let now = Utc::now();
        let entity = ScoreableEntity {
            id: EntityId(next_record_id(request.kind.label())),
            event_id: event_id.clone(),
            kind: request.kind,
            name: required("name", &request.name)?,
            project_name: request.project_name,
            case_description: request.case_description,
            is_active: true,
            is_active_for_voting: false,
            voting_status: VotingStatus::NotEvaluated,
            created_at: now,
            updated_at: now,
        };
        Ok(self.store.insert_entity(entity)?)
    }

    pub fn get_entity(&self, id: &EntityId) -> Result<ScoreableEntity, AssessmentError> {
        self.store
            .fetch_entity(id)?
            .ok_or_else(|| AssessmentError::not_found("entity", id))
    }

    pub fn list_entities(
        &self,
        event_id: &EventId,
        kind: Option<EntityKind>,
    ) -> Result<Vec<ScoreableEntity>, AssessmentError> {
        self.get_event(event_id)?;
        Ok(self.store.list_entities(event_id, kind)?)
    }

    pub fn update_entity(
        &self,
        id: &EntityId,
        update: EntityUpdate,
    ) -> Result<ScoreableEntity, AssessmentError> {
        let name = update
            .name
            .as_deref()
            .map(|name| required("name", name))
            .transpose()?;

        self.mutate_entity(id, |entity| {
            if let Some(kind) = update.kind {
                entity.kind = kind;
            }
            if let Some(name) = name {
                entity.name = name;
            }
            if let Some(project_name) = update.project_name {
                entity.project_name = project_name;
            }
            if let Some(case_description) = update.case_description {
                entity.case_description = case_description;
            }
        })
    }

    pub fn delete_entity(&self, id: &EntityId) -> Result<ScoreableEntity, AssessmentError> {
        self.store
            .delete_entity(id)?
            .ok_or_else(|| AssessmentError::not_found("entity", id))
    }

    /// Flips whether the entity may be scored at all. Voting fields are left untouched.
    pub fn toggle_active(&self, id: &EntityId) -> Result<ScoreableEntity, AssessmentError> {
        let entity = self.mutate_entity(id, |entity| entity.is_active = !entity.is_active)?;
        info!(entity_id = %id, is_active = entity.is_active, "entity availability toggled");
        Ok(entity)
    }

    /// Entity edits share the isolated section with voting transitions so a stale copy
    /// can never overwrite the voting fields.
    fn mutate_entity(
        &self,
        id: &EntityId,
        apply: impl FnOnce(&mut ScoreableEntity),
    ) -> Result<ScoreableEntity, AssessmentError> {
        let entity = self.get_entity(id)?;
        let now = Utc::now();
        self.store
            .modify_event_entities(&entity.event_id, |entities| {
                entities
                    .iter_mut()
                    .find(|candidate| candidate.id == *id)
                    .map(|target| {
                        apply(target);
                        target.updated_at = now;
                        target.clone()
                    })
            })?
            .ok_or_else(|| AssessmentError::not_found("entity", id))
    }

    pub fn activate_for_voting(&self, id: &EntityId) -> Result<ScoreableEntity, AssessmentError> {
        Ok(self.voting.activate_for_voting(id)?.activated)
    }

    pub fn stop_voting(&self, id: &EntityId) -> Result<ScoreableEntity, AssessmentError> {
        self.voting.stop_voting(id)
    }

    pub fn stop_all_voting(&self, event_id: &EventId) -> Result<usize, AssessmentError> {
        self.voting.stop_all_voting(event_id)
    }

    pub fn active_for_voting(
        &self,
        event_id: &EventId,
    ) -> Result<Option<ScoreableEntity>, AssessmentError> {
        self.get_event(event_id)?;
        self.voting.active_for_voting(event_id)
    }

    pub fn create_expert(
        &self,
        event_id: &EventId,
        request: NewExpert,
    ) -> Result<Expert, AssessmentError> {
        self.get_event(event_id)?;
        let now = Utc::now();
        let token = ExpertToken::generate();
        let expert = Expert {
            id: ExpertId(next_record_id("expert")),
            event_id: event_id.clone(),
            full_name: required("full_name", &request.full_name)?,
            access_url: self.access_url(&token),
            token,
            created_at: now,
            updated_at: now,
        };
        let stored = self.store.insert_expert(expert)?;
        info!(event_id = %event_id, expert_id = %stored.id, "expert registered");
        Ok(stored)
    }

    pub fn get_expert(&self, id: &ExpertId) -> Result<Expert, AssessmentError> {
        self.store
            .fetch_expert(id)?
            .ok_or_else(|| AssessmentError::not_found("expert", id))
    }

    pub fn expert_by_token(&self, token: &ExpertToken) -> Result<Expert, AssessmentError> {
        self.store
            .fetch_expert_by_token(token)?
            .ok_or_else(|| AssessmentError::not_found("expert", "token"))
    }

    pub fn list_experts(&self, event_id: &EventId) -> Result<Vec<Expert>, AssessmentError> {
        self.get_event(event_id)?;
        Ok(self.store.list_experts(event_id)?)
    }

    /// Only the display name is editable; the token never changes after creation.
    pub fn update_expert(
        &self,
        id: &ExpertId,
        update: ExpertUpdate,
    ) -> Result<Expert, AssessmentError> {
        let mut expert = self.get_expert(id)?;
        if let Some(full_name) = update.full_name {
            expert.full_name = required("full_name", &full_name)?;
        }
        expert.updated_at = Utc::now();
        self.store.update_expert(expert.clone())?;
        Ok(expert)
    }

    pub fn delete_expert(&self, id: &ExpertId) -> Result<Expert, AssessmentError> {
        self.store
            .delete_expert(id)?
            .ok_or_else(|| AssessmentError::not_found("expert", id))
    }

    fn access_url(&self, token: &ExpertToken) -> String {
        format!(
            "{}/assessment-tools/expert/{}",
            self.config.public_base_url.trim_end_matches('/'),
            token.as_str()
        )
    }

    pub fn list_criteria(
        &self,
        event_id: &EventId,
        kind: Option<EntityKind>,
    ) -> Result<Vec<CriteriaBlock>, AssessmentError> {
        self.get_event(event_id)?;
        Ok(self.resolver.resolve(event_id, kind)?)
    }

    pub fn create_block(
        &self,
        event_id: &EventId,
        request: NewCriteriaBlock,
    ) -> Result<CriteriaBlock, AssessmentError> {
        self.get_event(event_id)?;
        let block = build_block(event_id, request)?;
        Ok(self.store.insert_block(block)?)
    }

    pub fn get_block(&self, id: &CriteriaBlockId) -> Result<CriteriaBlock, AssessmentError> {
        self.store
            .fetch_block(id)?
            .ok_or_else(|| AssessmentError::not_found("criteria block", id))
    }

    pub fn update_block(
        &self,
        id: &CriteriaBlockId,
        update: CriteriaBlockUpdate,
    ) -> Result<CriteriaBlock, AssessmentError> {
        let mut block = self.get_block(id)?;
        if let Some(block_name) = update.block_name {
            block.block_name = required("block_name", &block_name)?;
        }
        if let Some(applies_to) = update.applies_to {
            block.applies_to = applies_to;
        }
        if let Some(criteria) = update.criteria {
            block.criteria = validate_criteria(criteria)?;
        }
        if let Some(order) = update.order {
            block.order = order;
        }
        block.updated_at = Utc::now();
        self.store.update_block(block.clone())?;
        Ok(block)
    }

    pub fn delete_block(&self, id: &CriteriaBlockId) -> Result<CriteriaBlock, AssessmentError> {
        self.store
            .delete_block(id)?
            .ok_or_else(|| AssessmentError::not_found("criteria block", id))
    }

    /// Replaces every block of the event with the built-in rubric.
    pub fn load_default_criteria(
        &self,
        event_id: &EventId,
    ) -> Result<Vec<CriteriaBlock>, AssessmentError> {
        self.get_event(event_id)?;
        let blocks = default_blocks()
            .into_iter()
            .map(|request| build_block(event_id, request))
            .collect::<Result<Vec<_>, _>>()?;
        let stored = self.store.replace_blocks(event_id, blocks)?;
        info!(event_id = %event_id, blocks = stored.len(), "default criteria loaded");
        Ok(stored)
    }

    pub fn submit_rating(
        &self,
        submission: RatingSubmission,
    ) -> Result<RatingUpsert, AssessmentError> {
        self.scoring.submit_rating(submission)
    }

    /// Submission authenticated by token; the expert's own event is always used.
    pub fn submit_as_expert(
        &self,
        token: &ExpertToken,
        submission: TokenRatingSubmission,
    ) -> Result<RatingUpsert, AssessmentError> {
        let expert = self.expert_by_token(token)?;
        self.scoring.submit_rating(RatingSubmission {
            event_id: expert.event_id,
            expert_id: expert.id,
            entity_id: submission.entity_id,
            items: submission.items,
        })
    }

    pub fn ratings(&self, filter: &RatingFilter) -> Result<Vec<Rating>, AssessmentError> {
        self.scoring.ratings(filter)
    }

    pub fn expert_session(&self, token: &ExpertToken) -> Result<ExpertSession, AssessmentError> {
        let expert = self.expert_by_token(token)?;
        let event = self.get_event(&expert.event_id)?;
        let active_entity = self.voting.active_for_voting(&event.id)?;

        let (criteria, existing_rating) = match &active_entity {
            Some(entity) => (
                self.resolver.resolve(&event.id, Some(entity.kind))?,
                self.store.fetch_rating(&expert.id, &entity.id)?,
            ),
            None => (Vec::new(), None),
        };

        Ok(ExpertSession {
            expert,
            event,
            active_entity,
            criteria,
            existing_rating,
        })
    }

    pub fn statistics(
        &self,
        event_id: &EventId,
        kind: Option<EntityKind>,
    ) -> Result<Vec<EntityStatistics>, AssessmentError> {
        self.get_event(event_id)?;
        self.scoring.compute_statistics(event_id, kind)
    }

    /// `n` defaults to the configured leaderboard size.
    pub fn top_n(
        &self,
        event_id: &EventId,
        kind: EntityKind,
        n: Option<usize>,
    ) -> Result<Vec<RankedEntity>, AssessmentError> {
        self.get_event(event_id)?;
        let n = self.ranking_size(n)?;
        self.scoring.compute_top_n(event_id, kind, n)
    }

    pub fn leaderboard(
        &self,
        event_id: &EventId,
        kind: Option<EntityKind>,
        n: Option<usize>,
    ) -> Result<Leaderboard, AssessmentError> {
        self.get_event(event_id)?;
        let n = self.ranking_size(n)?;
        self.scoring.leaderboard(event_id, kind, n)
    }

    fn ranking_size(&self, n: Option<usize>) -> Result<usize, AssessmentError> {
        match n.unwrap_or(self.config.leaderboard_size) {
            0 => Err(AssessmentError::Validation(
                "n must be at least 1".to_string(),
            )),
            n => Ok(n),
        }
    }
}

fn build_block(
    event_id: &EventId,
    request: NewCriteriaBlock,
) -> Result<CriteriaBlock, AssessmentError> {
    let now = Utc::now();
    Ok(CriteriaBlock {
        id: CriteriaBlockId(next_record_id("criteria")),
        event_id: event_id.clone(),
        block_name: required("block_name", &request.block_name)?,
        applies_to: request.applies_to,
        criteria: validate_criteria(request.criteria)?,
        order: request.order,
        created_at: now,
        updated_at: now,
    })
}

fn validate_criteria(criteria: Vec<Criterion>) -> Result<Vec<Criterion>, AssessmentError> {
    if criteria.is_empty() {
        return Err(AssessmentError::Validation(
            "criteria must not be empty".to_string(),
        ));
    }
    criteria
        .into_iter()
        .map(|criterion| {
            let name = required("criteria.name", &criterion.name)?;
            if criterion.max_score > MAX_CRITERION_SCORE {
                return Err(AssessmentError::Validation(format!(
                    "criterion '{name}' max_score must be at most {MAX_CRITERION_SCORE}"
                )));
            }
            Ok(Criterion {
                name,
                max_score: criterion.max_score,
            })
        })
        .collect()
}

fn required(field: &str, value: &str) -> Result<String, AssessmentError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(AssessmentError::Validation(format!("{field} is required")))
    } else {
        Ok(trimmed.to_string())
    }
}
