//! Live expert scoring for hackathon-style events.
//!
//! Organizers register teams and participants, experts receive a personal token, and
//! exactly one entity per event is open for scoring at a time. Experts submit one
//! rating per entity (resubmissions replace it) and the aggregator turns the stored
//! ratings into per-criterion statistics, top-N rankings, and a leaderboard.

pub mod criteria;
pub mod domain;
pub mod error;
mod extract;
pub mod memory;
pub mod repository;
pub mod requests;
pub mod router;
pub mod scoring;
pub mod service;
pub mod voting;

#[cfg(test)]
mod tests;

pub use criteria::{default_blocks, CriteriaResolver, ResolvedCriterion};
pub use domain::{
    CriteriaBlock, CriteriaBlockId, CriteriaScope, Criterion, EntityId, EntityKind,
    EntitySummary, Event, EventId, EventStatus, Expert, ExpertId, ExpertToken, Rating, RatingId,
    RatingItem, ScoreableEntity, VotingStatus,
};
pub use error::AssessmentError;
pub use memory::InMemoryAssessmentStore;
pub use repository::{AssessmentStore, RatingUpsert, RepositoryError};
pub use requests::{
    CriteriaBlockUpdate, EntityUpdate, EventUpdate, ExpertUpdate, NewCriteriaBlock, NewEntity,
    NewEvent, NewExpert, RatingFilter, RatingSubmission, TokenRatingSubmission,
    MAX_CRITERION_SCORE,
};
pub use router::assessment_router;
pub use scoring::{
    CriterionStatistic, EntityStatistics, ExpertScore, Leaderboard, RankedEntity,
    RatingAggregator,
};
pub use service::{AssessmentService, ExpertSession};
pub use voting::{Handover, VotingOrchestrator};
