use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

record_id!(
    /// Identifier wrapper for events.
    EventId
);
record_id!(
    /// Identifier wrapper for teams and participants.
    EntityId
);
record_id!(
    /// Identifier wrapper for experts.
    ExpertId
);
record_id!(
    /// Identifier wrapper for criteria blocks.
    CriteriaBlockId
);
record_id!(
    /// Identifier wrapper for ratings.
    RatingId
);

static RECORD_SEQUENCE: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_record_id(prefix: &str) -> String {
    record_id_for(prefix, RECORD_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

/// Padded to the width of `u64::MAX` so lexical order follows creation order.
fn record_id_for(prefix: &str, sequence: u64) -> String {
    format!("{prefix}-{sequence:020}")
}

/// Opaque credential handed to an expert; the only thing needed to submit scores.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExpertToken(pub String);

impl ExpertToken {
    /// 128 random bits rendered as 32 lowercase hex characters.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Lifecycle of an event as managed by administrators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    #[default]
    Draft,
    Ready,
    Active,
    Completed,
}

impl EventStatus {
    pub const fn label(self) -> &'static str {
        match self {
            EventStatus::Draft => "draft",
            EventStatus::Ready => "ready",
            EventStatus::Active => "active",
            EventStatus::Completed => "completed",
        }
    }
}

/// A scored competition instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    pub description: String,
    pub event_date: NaiveDate,
    pub location: String,
    pub status: EventStatus,
    /// Informational only; the orchestrator never consults it.
    pub voting_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Discriminant shared by every scoreable record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Team,
    Participant,
}

impl EntityKind {
    pub const fn label(self) -> &'static str {
        match self {
            EntityKind::Team => "team",
            EntityKind::Participant => "participant",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VotingStatus {
    #[default]
    NotEvaluated,
    Evaluating,
    Evaluated,
}

impl VotingStatus {
    pub const fn label(self) -> &'static str {
        match self {
            VotingStatus::NotEvaluated => "not_evaluated",
            VotingStatus::Evaluating => "evaluating",
            VotingStatus::Evaluated => "evaluated",
        }
    }
}

/// A team or a participant that experts score.
///
/// `is_active` decides whether the entity may be scored at all, while
/// `is_active_for_voting` marks the single entity of an event that is open for
/// scoring right now. The two voting fields only change together through
/// [`ScoreableEntity::begin_evaluation`] and [`ScoreableEntity::finish_evaluation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreableEntity {
    pub id: EntityId,
    pub event_id: EventId,
    pub kind: EntityKind,
    pub name: String,
    pub project_name: String,
    pub case_description: String,
    pub is_active: bool,
    pub is_active_for_voting: bool,
    pub voting_status: VotingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ScoreableEntity {
    /// Opens the entity for scoring. Returns `false` when it already was open.
    pub fn begin_evaluation(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_active_for_voting && self.voting_status == VotingStatus::Evaluating {
            return false;
        }
        self.is_active_for_voting = true;
        self.voting_status = VotingStatus::Evaluating;
        self.updated_at = now;
        true
    }

    /// Closes scoring. Returns `false` when the entity was already closed.
    pub fn finish_evaluation(&mut self, now: DateTime<Utc>) -> bool {
        if !self.is_active_for_voting && self.voting_status == VotingStatus::Evaluated {
            return false;
        }
        self.is_active_for_voting = false;
        self.voting_status = VotingStatus::Evaluated;
        self.updated_at = now;
        true
    }

    pub fn summary(&self) -> EntitySummary {
        EntitySummary {
            id: self.id.clone(),
            name: self.name.clone(),
            kind: self.kind,
            project_name: self.project_name.clone(),
        }
    }
}

/// Compact entity description embedded in statistics and rankings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySummary {
    pub id: EntityId,
    pub name: String,
    pub kind: EntityKind,
    pub project_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expert {
    pub id: ExpertId,
    pub event_id: EventId,
    pub full_name: String,
    pub token: ExpertToken,
    /// Link encoded into the expert's QR code.
    pub access_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Which entity kinds a criteria block applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriteriaScope {
    #[default]
    All,
    Team,
    Participant,
}

impl CriteriaScope {
    pub fn covers(self, kind: EntityKind) -> bool {
        match self {
            CriteriaScope::All => true,
            CriteriaScope::Team => kind == EntityKind::Team,
            CriteriaScope::Participant => kind == EntityKind::Participant,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criterion {
    pub name: String,
    pub max_score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriteriaBlock {
    pub id: CriteriaBlockId,
    pub event_id: EventId,
    pub block_name: String,
    pub applies_to: CriteriaScope,
    pub criteria: Vec<Criterion>,
    pub order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One criterion score inside a rating, addressed by criterion name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingItem {
    pub criterion_name: String,
    pub score: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criteria_block_id: Option<CriteriaBlockId>,
}

/// An expert's latest scores for one entity. `total_score` is always derived from `items`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub id: RatingId,
    pub event_id: EventId,
    pub expert_id: ExpertId,
    pub entity_id: EntityId,
    pub items: Vec<RatingItem>,
    pub total_score: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Rating {
    pub fn new(
        event_id: EventId,
        expert_id: ExpertId,
        entity_id: EntityId,
        items: Vec<RatingItem>,
        now: DateTime<Utc>,
    ) -> Self {
        let total_score = Self::total_of(&items);
        Self {
            id: RatingId(next_record_id("rating")),
            event_id,
            expert_id,
            entity_id,
            items,
            total_score,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn total_of(items: &[RatingItem]) -> i64 {
        items.iter().map(|item| item.score).sum()
    }

    /// Full replace of the item list; totals are never merged across submissions.
    pub fn replace_items(&mut self, items: Vec<RatingItem>, now: DateTime<Utc>) {
        self.total_score = Self::total_of(&items);
        self.items = items;
        self.updated_at = now;
    }
}
