use std::sync::Arc;

use serde::Serialize;

use super::domain::{CriteriaBlock, CriteriaBlockId, CriteriaScope, Criterion, EntityKind, EventId};
use super::repository::{AssessmentStore, RepositoryError};
use super::requests::NewCriteriaBlock;

/// Determines which criteria apply to an entity kind within an event.
pub struct CriteriaResolver<S> {
    store: Arc<S>,
}

impl<S> CriteriaResolver<S>
where
    S: AssessmentStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Blocks of the event in display order, restricted to `kind` when given.
    pub fn resolve(
        &self,
        event_id: &EventId,
        kind: Option<EntityKind>,
    ) -> Result<Vec<CriteriaBlock>, RepositoryError> {
        let blocks = self.store.list_blocks(event_id)?;
        Ok(select_blocks(blocks, kind))
    }

    /// Resolve and flatten in one step.
    pub fn criteria_for(
        &self,
        event_id: &EventId,
        kind: EntityKind,
    ) -> Result<Vec<ResolvedCriterion>, RepositoryError> {
        let blocks = self.resolve(event_id, Some(kind))?;
        Ok(flatten(&blocks))
    }
}

/// Orders blocks by `order` ascending. The sort is stable, so blocks sharing an
/// `order` keep the order the store returned them in.
pub fn select_blocks(mut blocks: Vec<CriteriaBlock>, kind: Option<EntityKind>) -> Vec<CriteriaBlock> {
    if let Some(kind) = kind {
        blocks.retain(|block| block.applies_to.covers(kind));
    }
    blocks.sort_by_key(|block| block.order);
    blocks
}

/// A criterion lifted out of its block, remembering where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedCriterion {
    pub block_id: CriteriaBlockId,
    pub name: String,
    pub max_score: u32,
}

pub fn flatten(blocks: &[CriteriaBlock]) -> Vec<ResolvedCriterion> {
    blocks
        .iter()
        .flat_map(|block| {
            block.criteria.iter().map(move |criterion| ResolvedCriterion {
                block_id: block.id.clone(),
                name: criterion.name.clone(),
                max_score: criterion.max_score,
            })
        })
        .collect()
}

/// Built-in hackathon rubric: one block for team projects, one for individual pitches.
pub fn default_blocks() -> Vec<NewCriteriaBlock> {
    vec![
        NewCriteriaBlock {
            block_name: "Team project assessment".to_string(),
            applies_to: CriteriaScope::Team,
            criteria: criteria(&[
                ("Solution fits the assigned task", 5),
                ("Originality of technical and project approaches", 5),
                ("Working solution", 1),
                ("Technological complexity", 2),
                ("Breadth of functionality", 2),
                ("Justification of the chosen solution", 5),
                ("Quality of information delivery", 5),
                ("Convenient UX/UI", 5),
                ("At least five AI agents", 5),
            ]),
            order: 0,
        },
        NewCriteriaBlock {
            block_name: "Participant pitch assessment".to_string(),
            applies_to: CriteriaScope::Participant,
            criteria: criteria(&[
                ("Quality of presentation and delivery of the idea", 5),
                ("Understanding of the technology and solution", 5),
                ("Justification of the chosen approach", 5),
                ("Answers to jury questions", 5),
                ("Communication skills", 5),
            ]),
            order: 1,
        },
    ]
}

fn criteria(entries: &[(&str, u32)]) -> Vec<Criterion> {
    entries
        .iter()
        .map(|(name, max_score)| Criterion {
            name: (*name).to_string(),
            max_score: *max_score,
        })
        .collect()
}
