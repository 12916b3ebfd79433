use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{CriteriaBlockId, EntityId, EntityKind, EventId, ExpertId, ExpertToken};
use super::error::AssessmentError;
use super::extract::{ApiJson, ApiQuery};
use super::repository::{AssessmentStore, RatingUpsert};
use super::requests::{
    CriteriaBlockUpdate, EntityUpdate, EventUpdate, ExpertUpdate, NewCriteriaBlock, NewEntity,
    NewEvent, NewExpert, RatingFilter, RatingSubmission, TokenRatingSubmission,
};
use super::service::AssessmentService;

type ServiceState<S> = State<Arc<AssessmentService<S>>>;
type ApiResult = Result<Response, AssessmentError>;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct KindQuery {
    pub(crate) kind: Option<EntityKind>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TopQuery {
    pub(crate) kind: EntityKind,
    pub(crate) n: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LeaderboardQuery {
    pub(crate) kind: Option<EntityKind>,
    pub(crate) n: Option<usize>,
}

/// Router builder exposing the administrative, expert, and ranking endpoints.
pub fn assessment_router<S>(service: Arc<AssessmentService<S>>) -> Router
where
    S: AssessmentStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/events",
            get(list_events::<S>).post(create_event::<S>),
        )
        .route(
            "/api/v1/events/:event_id",
            get(get_event::<S>)
                .put(update_event::<S>)
                .delete(delete_event::<S>),
        )
        .route(
            "/api/v1/events/:event_id/toggle-voting",
            patch(toggle_voting::<S>),
        )
        .route(
            "/api/v1/events/:event_id/entities",
            get(list_entities::<S>).post(create_entity::<S>),
        )
        .route(
            "/api/v1/events/:event_id/active-entity",
            get(active_entity::<S>),
        )
        .route(
            "/api/v1/events/:event_id/stop-all-voting",
            patch(stop_all_voting::<S>),
        )
        .route(
            "/api/v1/events/:event_id/experts",
            get(list_experts::<S>).post(create_expert::<S>),
        )
        .route(
            "/api/v1/events/:event_id/criteria",
            get(list_criteria::<S>).post(create_block::<S>),
        )
        .route(
            "/api/v1/events/:event_id/criteria/default",
            post(load_default_criteria::<S>),
        )
        .route(
            "/api/v1/events/:event_id/statistics",
            get(statistics::<S>),
        )
        .route("/api/v1/events/:event_id/top", get(top_n::<S>))
        .route(
            "/api/v1/events/:event_id/leaderboard",
            get(leaderboard::<S>),
        )
        .route(
            "/api/v1/entities/:entity_id",
            get(get_entity::<S>)
                .put(update_entity::<S>)
                .delete(delete_entity::<S>),
        )
        .route(
            "/api/v1/entities/:entity_id/toggle-active",
            patch(toggle_active::<S>),
        )
        .route(
            "/api/v1/entities/:entity_id/activate-for-voting",
            patch(activate_for_voting::<S>),
        )
        .route(
            "/api/v1/entities/:entity_id/stop-voting",
            patch(stop_voting::<S>),
        )
        .route(
            "/api/v1/entities/:entity_id/ratings",
            get(entity_ratings::<S>),
        )
        .route(
            "/api/v1/experts/:expert_id",
            get(get_expert::<S>)
                .put(update_expert::<S>)
                .delete(delete_expert::<S>),
        )
        .route(
            "/api/v1/experts/:expert_id/ratings",
            get(expert_ratings::<S>),
        )
        .route(
            "/api/v1/criteria/:block_id",
            get(get_block::<S>)
                .put(update_block::<S>)
                .delete(delete_block::<S>),
        )
        .route(
            "/api/v1/ratings",
            get(list_ratings::<S>).post(submit_rating::<S>),
        )
        .route("/api/v1/sessions/:token", get(expert_session::<S>))
        .route(
            "/api/v1/sessions/:token/ratings",
            get(session_ratings::<S>).post(submit_session_rating::<S>),
        )
        .with_state(service)
}

fn ok<T: serde::Serialize>(value: T) -> ApiResult {
    Ok((StatusCode::OK, Json(value)).into_response())
}

fn created<T: serde::Serialize>(value: T) -> ApiResult {
    Ok((StatusCode::CREATED, Json(value)).into_response())
}

fn saved(upsert: RatingUpsert) -> ApiResult {
    let status = if upsert.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(upsert.rating)).into_response())
}

pub(crate) async fn list_events<S: AssessmentStore + 'static>(
    State(service): ServiceState<S>,
) -> ApiResult {
    ok(service.list_events()?)
}

pub(crate) async fn create_event<S: AssessmentStore + 'static>(
    State(service): ServiceState<S>,
    ApiJson(request): ApiJson<NewEvent>,
) -> ApiResult {
    created(service.create_event(request)?)
}

pub(crate) async fn get_event<S: AssessmentStore + 'static>(
    State(service): ServiceState<S>,
    Path(event_id): Path<String>,
) -> ApiResult {
    ok(service.get_event(&EventId(event_id))?)
}

pub(crate) async fn update_event<S: AssessmentStore + 'static>(
    State(service): ServiceState<S>,
    Path(event_id): Path<String>,
    ApiJson(update): ApiJson<EventUpdate>,
) -> ApiResult {
    ok(service.update_event(&EventId(event_id), update)?)
}

pub(crate) async fn delete_event<S: AssessmentStore + 'static>(
    State(service): ServiceState<S>,
    Path(event_id): Path<String>,
) -> ApiResult {
    ok(service.delete_event(&EventId(event_id))?)
}

pub(crate) async fn toggle_voting<S: AssessmentStore + 'static>(
    State(service): ServiceState<S>,
    Path(event_id): Path<String>,
) -> ApiResult {
    ok(service.toggle_voting(&EventId(event_id))?)
}

pub(crate) async fn list_entities<S: AssessmentStore + 'static>(
    State(service): ServiceState<S>,
    Path(event_id): Path<String>,
    ApiQuery(query): ApiQuery<KindQuery>,
) -> ApiResult {
    ok(service.list_entities(&EventId(event_id), query.kind)?)
}

pub(crate) async fn create_entity<S: AssessmentStore + 'static>(
    State(service): ServiceState<S>,
    Path(event_id): Path<String>,
    ApiJson(request): ApiJson<NewEntity>,
) -> ApiResult {
    created(service.create_entity(&EventId(event_id), request)?)
}

pub(crate) async fn active_entity<S: AssessmentStore + 'static>(
    State(service): ServiceState<S>,
    Path(event_id): Path<String>,
) -> ApiResult {
    ok(service.active_for_voting(&EventId(event_id))?)
}

pub(crate) async fn stop_all_voting<S: AssessmentStore + 'static>(
    State(service): ServiceState<S>,
    Path(event_id): Path<String>,
) -> ApiResult {
    let modified_count = service.stop_all_voting(&EventId(event_id))?;
    ok(json!({ "modified_count": modified_count }))
}

pub(crate) async fn get_entity<S: AssessmentStore + 'static>(
    State(service): ServiceState<S>,
    Path(entity_id): Path<String>,
) -> ApiResult {
    ok(service.get_entity(&EntityId(entity_id))?)
}

pub(crate) async fn update_entity<S: AssessmentStore + 'static>(
    State(service): ServiceState<S>,
    Path(entity_id): Path<String>,
    ApiJson(update): ApiJson<EntityUpdate>,
) -> ApiResult {
    ok(service.update_entity(&EntityId(entity_id), update)?)
}

pub(crate) async fn delete_entity<S: AssessmentStore + 'static>(
    State(service): ServiceState<S>,
    Path(entity_id): Path<String>,
) -> ApiResult {
    ok(service.delete_entity(&EntityId(entity_id))?)
}

pub(crate) async fn toggle_active<S: AssessmentStore + 'static>(
    State(service): ServiceState<S>,
    Path(entity_id): Path<String>,
) -> ApiResult {
    ok(service.toggle_active(&EntityId(entity_id))?)
}

pub(crate) async fn activate_for_voting<S: AssessmentStore + 'static>(
    State(service): ServiceState<S>,
    Path(entity_id): Path<String>,
) -> ApiResult {
    ok(service.activate_for_voting(&EntityId(entity_id))?)
}

pub(crate) async fn stop_voting<S: AssessmentStore + 'static>(
    State(service): ServiceState<S>,
    Path(entity_id): Path<String>,
) -> ApiResult {
    ok(service.stop_voting(&EntityId(entity_id))?)
}

pub(crate) async fn entity_ratings<S: AssessmentStore + 'static>(
    State(service): ServiceState<S>,
    Path(entity_id): Path<String>,
) -> ApiResult {
    ok(service.ratings(&RatingFilter::for_entity(EntityId(entity_id)))?)
}

pub(crate) async fn list_experts<S: AssessmentStore + 'static>(
    State(service): ServiceState<S>,
    Path(event_id): Path<String>,
) -> ApiResult {
    ok(service.list_experts(&EventId(event_id))?)
}

pub(crate) async fn create_expert<S: AssessmentStore + 'static>(
    State(service): ServiceState<S>,
    Path(event_id): Path<String>,
    ApiJson(request): ApiJson<NewExpert>,
) -> ApiResult {
    created(service.create_expert(&EventId(event_id), request)?)
}

pub(crate) async fn get_expert<S: AssessmentStore + 'static>(
    State(service): ServiceState<S>,
    Path(expert_id): Path<String>,
) -> ApiResult {
    ok(service.get_expert(&ExpertId(expert_id))?)
}

pub(crate) async fn update_expert<S: AssessmentStore + 'static>(
    State(service): ServiceState<S>,
    Path(expert_id): Path<String>,
    ApiJson(update): ApiJson<ExpertUpdate>,
) -> ApiResult {
    ok(service.update_expert(&ExpertId(expert_id), update)?)
}

pub(crate) async fn delete_expert<S: AssessmentStore + 'static>(
    State(service): ServiceState<S>,
    Path(expert_id): Path<String>,
) -> ApiResult {
    ok(service.delete_expert(&ExpertId(expert_id))?)
}

pub(crate) async fn expert_ratings<S: AssessmentStore + 'static>(
    State(service): ServiceState<S>,
    Path(expert_id): Path<String>,
) -> ApiResult {
    ok(service.ratings(&RatingFilter::for_expert(ExpertId(expert_id)))?)
}

pub(crate) async fn list_criteria<S: AssessmentStore + 'static>(
    State(service): ServiceState<S>,
    Path(event_id): Path<String>,
    ApiQuery(query): ApiQuery<KindQuery>,
) -> ApiResult {
    ok(service.list_criteria(&EventId(event_id), query.kind)?)
}

pub(crate) async fn create_block<S: AssessmentStore + 'static>(
    State(service): ServiceState<S>,
    Path(event_id): Path<String>,
    ApiJson(request): ApiJson<NewCriteriaBlock>,
) -> ApiResult {
    created(service.create_block(&EventId(event_id), request)?)
}

pub(crate) async fn load_default_criteria<S: AssessmentStore + 'static>(
    State(service): ServiceState<S>,
    Path(event_id): Path<String>,
) -> ApiResult {
    created(service.load_default_criteria(&EventId(event_id))?)
}

pub(crate) async fn get_block<S: AssessmentStore + 'static>(
    State(service): ServiceState<S>,
    Path(block_id): Path<String>,
) -> ApiResult {
    ok(service.get_block(&CriteriaBlockId(block_id))?)
}

pub(crate) async fn update_block<S: AssessmentStore + 'static>(
    State(service): ServiceState<S>,
    Path(block_id): Path<String>,
    ApiJson(update): ApiJson<CriteriaBlockUpdate>,
) -> ApiResult {
    ok(service.update_block(&CriteriaBlockId(block_id), update)?)
}

pub(crate) async fn delete_block<S: AssessmentStore + 'static>(
    State(service): ServiceState<S>,
    Path(block_id): Path<String>,
) -> ApiResult {
    ok(service.delete_block(&CriteriaBlockId(block_id))?)
}

pub(crate) async fn list_ratings<S: AssessmentStore + 'static>(
    State(service): ServiceState<S>,
    ApiQuery(filter): ApiQuery<RatingFilter>,
) -> ApiResult {
    ok(service.ratings(&filter)?)
}

pub(crate) async fn submit_rating<S: AssessmentStore + 'static>(
    State(service): ServiceState<S>,
    ApiJson(submission): ApiJson<RatingSubmission>,
) -> ApiResult {
    saved(service.submit_rating(submission)?)
}

pub(crate) async fn expert_session<S: AssessmentStore + 'static>(
    State(service): ServiceState<S>,
    Path(token): Path<String>,
) -> ApiResult {
    ok(service.expert_session(&ExpertToken(token))?)
}

pub(crate) async fn session_ratings<S: AssessmentStore + 'static>(
    State(service): ServiceState<S>,
    Path(token): Path<String>,
) -> ApiResult {
    let expert = service.expert_by_token(&ExpertToken(token))?;
    ok(service.ratings(&RatingFilter::for_expert(expert.id))?)
}

pub(crate) async fn submit_session_rating<S: AssessmentStore + 'static>(
    State(service): ServiceState<S>,
    Path(token): Path<String>,
    ApiJson(submission): ApiJson<TokenRatingSubmission>,
) -> ApiResult {
    saved(service.submit_as_expert(&ExpertToken(token), submission)?)
}

pub(crate) async fn statistics<S: AssessmentStore + 'static>(
    State(service): ServiceState<S>,
    Path(event_id): Path<String>,
    ApiQuery(query): ApiQuery<KindQuery>,
) -> ApiResult {
    ok(service.statistics(&EventId(event_id), query.kind)?)
}

pub(crate) async fn top_n<S: AssessmentStore + 'static>(
    State(service): ServiceState<S>,
    Path(event_id): Path<String>,
    ApiQuery(query): ApiQuery<TopQuery>,
) -> ApiResult {
    ok(service.top_n(&EventId(event_id), query.kind, query.n)?)
}

pub(crate) async fn leaderboard<S: AssessmentStore + 'static>(
    State(service): ServiceState<S>,
    Path(event_id): Path<String>,
    ApiQuery(query): ApiQuery<LeaderboardQuery>,
) -> ApiResult {
    ok(service.leaderboard(&EventId(event_id), query.kind, query.n)?)
}
