use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use tracing::warn;

use super::super::criteria::ResolvedCriterion;
use super::super::domain::RatingItem;
use super::super::error::AssessmentError;

/// Checks every submitted item against the criteria resolved for the entity's kind.
///
/// Items may cover a subset of the criteria. Each criterion may appear once, must
/// exist for the entity's kind, and its score must lie within `0..=max_score`.
/// When two applicable blocks define the same criterion name, the block that
/// resolves first (lowest `order`) sets the limit.
pub(crate) fn validate_items(
    items: &[RatingItem],
    criteria: &[ResolvedCriterion],
) -> Result<(), AssessmentError> {
    let mut limits: HashMap<&str, u32> = HashMap::with_capacity(criteria.len());
    for criterion in criteria {
        match limits.entry(criterion.name.as_str()) {
            Entry::Vacant(slot) => {
                slot.insert(criterion.max_score);
            }
            Entry::Occupied(slot) => warn!(
                criterion = %criterion.name,
                block_id = %criterion.block_id,
                kept_max_score = *slot.get(),
                ignored_max_score = criterion.max_score,
                "criterion name defined by more than one block"
            ),
        }
    }
    let mut seen = HashSet::new();

    for item in items {
        let name = item.criterion_name.as_str();
        let max_score = limits
            .get(name)
            .copied()
            .ok_or_else(|| invalid(name, "criterion does not apply to this entity"))?;

        if !seen.insert(name) {
            return Err(invalid(name, "criterion scored more than once"));
        }

        if item.score < 0 {
            return Err(invalid(
                name,
                &format!("score {} is below zero", item.score),
            ));
        }

        if item.score > i64::from(max_score) {
            return Err(invalid(
                name,
                &format!("score {} exceeds maximum {}", item.score, max_score),
            ));
        }
    }

    Ok(())
}

fn invalid(criterion: &str, reason: &str) -> AssessmentError {
    AssessmentError::InvalidScore {
        criterion: criterion.to_string(),
        reason: reason.to_string(),
    }
}
