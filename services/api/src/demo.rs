use crate::infra::{in_memory_service, MemoryAssessmentService};
use assessment_tools::assessment::{
    CriteriaBlock, EntityKind, EventId, NewEntity, NewEvent, NewExpert, RankedEntity,
    RatingItem, TokenRatingSubmission,
};
use assessment_tools::config::AssessmentConfig;
use assessment_tools::error::AppError;
use chrono::{Local, NaiveDate};
use clap::Args;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Event date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) event_date: Option<NaiveDate>,
    /// Number of teams presenting
    #[arg(long, default_value_t = 4)]
    pub(crate) teams: usize,
    /// Number of individual participants pitching
    #[arg(long, default_value_t = 2)]
    pub(crate) participants: usize,
    /// Number of experts on the jury
    #[arg(long, default_value_t = 3)]
    pub(crate) experts: usize,
    /// How many entries each leaderboard shows
    #[arg(long, default_value_t = 3)]
    pub(crate) top: usize,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        event_date,
        teams,
        participants,
        experts,
        top,
    } = args;

    let event_date = event_date.unwrap_or_else(|| Local::now().date_naive());
    let service = in_memory_service(AssessmentConfig::default());

    let event = service.create_event(NewEvent {
        name: "Demo day".to_string(),
        event_date: Some(event_date),
        location: "Main hall".to_string(),
        ..NewEvent::default()
    })?;
    let blocks = service.load_default_criteria(&event.id)?;
    println!("Assessment demo: {} on {}", event.name, event.event_date);
    println!("- {} criteria blocks loaded", blocks.len());

    let mut lineup = Vec::new();
    for index in 1..=teams {
        lineup.push(service.create_entity(
            &event.id,
            NewEntity {
                kind: EntityKind::Team,
                name: format!("Team {index}"),
                project_name: format!("Project {index}"),
                case_description: String::new(),
            },
        )?);
    }
    for index in 1..=participants {
        lineup.push(service.create_entity(
            &event.id,
            NewEntity {
                kind: EntityKind::Participant,
                name: format!("Speaker {index}"),
                project_name: String::new(),
                case_description: String::new(),
            },
        )?);
    }

    let mut jury = Vec::new();
    for index in 1..=experts {
        let expert = service.create_expert(
            &event.id,
            NewExpert {
                full_name: format!("Expert {index}"),
            },
        )?;
        println!("- {} joins via {}", expert.full_name, expert.access_url);
        jury.push(expert);
    }

    println!("\nScoring");
    let mut previous: Option<&str> = None;
    for (position, entity) in lineup.iter().enumerate() {
        let opened = service.activate_for_voting(&entity.id)?;
        match previous.replace(entity.name.as_str()) {
            Some(closed) => println!("- {} opened for voting, {closed} closed", opened.name),
            None => println!("- {} opened for voting", opened.name),
        }
        for (seat, expert) in jury.iter().enumerate() {
            let session = service.expert_session(&expert.token)?;
            let items = demo_scores(&session.criteria, position + seat);
            service.submit_as_expert(
                &expert.token,
                TokenRatingSubmission {
                    entity_id: entity.id.clone(),
                    items,
                },
            )?;
        }
        println!(
            "  {} ({}) scored by {} experts",
            entity.name,
            entity.kind.label(),
            jury.len()
        );
    }
    let closed = service.stop_all_voting(&event.id)?;
    println!("- voting closed, {closed} entity was still open");

    render_statistics(&service, &event.id)?;

    let board = service.leaderboard(&event.id, None, Some(top.max(1)))?;
    println!("\nLeaderboard");
    render_ranking("Teams", &board.teams);
    render_ranking("Participants", &board.participants);

    Ok(())
}

/// Deterministic scores that spread entities apart without any randomness.
fn demo_scores(blocks: &[CriteriaBlock], offset: usize) -> Vec<RatingItem> {
    blocks
        .iter()
        .flat_map(|block| block.criteria.iter())
        .enumerate()
        .map(|(index, criterion)| {
            let span = criterion.max_score as usize + 1;
            RatingItem {
                criterion_name: criterion.name.clone(),
                score: ((offset * 7 + index * 3) % span) as i64,
                criteria_block_id: None,
            }
        })
        .collect()
}

fn render_statistics(
    service: &MemoryAssessmentService,
    event_id: &EventId,
) -> Result<(), AppError> {
    println!("\nStatistics");
    for stat in service.statistics(event_id, None)? {
        let strongest = stat
            .criteria_stats
            .iter()
            .max_by(|a, b| a.average.total_cmp(&b.average))
            .map(|criterion| format!("{} ({:.1})", criterion.name, criterion.average))
            .unwrap_or_else(|| "n/a".to_string());
        println!(
            "- {}: {:.2} average from {} experts | strongest: {}",
            stat.entity.name, stat.total_score, stat.ratings_count, strongest
        );
    }
    Ok(())
}

fn render_ranking(title: &str, entries: &[RankedEntity]) {
    println!("{title}:");
    if entries.is_empty() {
        println!("  (no ratings)");
    }
    for (place, entry) in entries.iter().enumerate() {
        println!(
            "  {}. {} {:.2} ({} ratings)",
            place + 1,
            entry.entity.name,
            entry.total_score,
            entry.ratings_count
        );
    }
}
