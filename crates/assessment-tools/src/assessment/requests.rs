use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{
    CriteriaScope, Criterion, EntityId, EntityKind, EventId, EventStatus, ExpertId, RatingItem,
};

/// Upper bound for a single criterion, matching the star widget experts use.
pub const MAX_CRITERION_SCORE: u32 = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEvent {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub event_date: Option<NaiveDate>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub status: Option<EventStatus>,
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub event_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub status: Option<EventStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEntity {
    pub kind: EntityKind,
    pub name: String,
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub case_description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityUpdate {
    pub kind: Option<EntityKind>,
    pub name: Option<String>,
    pub project_name: Option<String>,
    pub case_description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewExpert {
    pub full_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpertUpdate {
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCriteriaBlock {
    pub block_name: String,
    #[serde(default)]
    pub applies_to: CriteriaScope,
    pub criteria: Vec<Criterion>,
    #[serde(default)]
    pub order: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriteriaBlockUpdate {
    pub block_name: Option<String>,
    pub applies_to: Option<CriteriaScope>,
    pub criteria: Option<Vec<Criterion>>,
    pub order: Option<i32>,
}

/// Administrative submission naming every party explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingSubmission {
    pub event_id: EventId,
    pub expert_id: ExpertId,
    pub entity_id: EntityId,
    pub items: Vec<RatingItem>,
}

/// Submission made through an expert token; event and expert come from the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRatingSubmission {
    pub entity_id: EntityId,
    pub items: Vec<RatingItem>,
}

/// Optional filters for rating listings; all present filters must match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingFilter {
    pub event_id: Option<EventId>,
    pub expert_id: Option<ExpertId>,
    pub entity_id: Option<EntityId>,
}

impl RatingFilter {
    pub fn for_expert(expert_id: ExpertId) -> Self {
        Self {
            expert_id: Some(expert_id),
            ..Self::default()
        }
    }

    pub fn for_entity(entity_id: EntityId) -> Self {
        Self {
            entity_id: Some(entity_id),
            ..Self::default()
        }
    }

    pub fn for_event(event_id: EventId) -> Self {
        Self {
            event_id: Some(event_id),
            ..Self::default()
        }
    }

    pub fn matches(&self, rating: &super::domain::Rating) -> bool {
        self.event_id
            .as_ref()
            .map_or(true, |id| *id == rating.event_id)
            && self
                .expert_id
                .as_ref()
                .map_or(true, |id| *id == rating.expert_id)
            && self
                .entity_id
                .as_ref()
                .map_or(true, |id| *id == rating.entity_id)
    }
}
