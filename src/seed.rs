//! Sample content for a fresh site. Seeded items are published right away.

use tracing::info;
use crate::db::SiteDb;
use crate::entities::*;
use crate::error::SiteResult;
use crate::mentions;
use crate::services::records::parse_date_achieved;

struct SampleTerm {
    title: &'static str,
    definition: &'static str,
    category: TermCategory,
    example_usage: &'static str,
    skill_level: SkillLevel,
    submitted_by: &'static str,
}

struct SampleRecord {
    title: &'static str,
    description: &'static str,
    category: RecordCategory,
    record_holder_name: &'static str,
    proof_url: &'static str,
    date_achieved: &'static str,
    submitted_by: &'static str,
}

const SAMPLE_TERMS: &[SampleTerm] = &[
    SampleTerm {
        title: "Air Dribble",
        definition: "A technique where a player keeps the ball in the air while driving up the wall and then continues to control it in the air.",
        category: TermCategory::Mechanics,
        example_usage: "I just hit a perfect air dribble from midfield to score!",
        skill_level: SkillLevel::Intermediate,
        submitted_by: "RocketLeaguePro",
    },
    SampleTerm {
        title: "Flip Reset",
        definition: "A mechanic where a player touches all four wheels to the ball while in the air, resetting their flip and allowing them to perform another aerial maneuver.",
        category: TermCategory::Mechanics,
        example_usage: "That flip reset goal was absolutely insane!",
        skill_level: SkillLevel::Pro,
        submitted_by: "MechanicMaster",
    },
    SampleTerm {
        title: "Wave Dash",
        definition: "A technique where a player diagonally flips and then cancels the flip while touching the ground, creating a speed boost.",
        category: TermCategory::Mechanics,
        example_usage: "Use wave dash to maintain momentum after landing.",
        skill_level: SkillLevel::Intermediate,
        submitted_by: "SpeedDemon",
    },
    SampleTerm {
        title: "What a Save!",
        definition: "A quick chat message used sarcastically when an opponent misses an easy save or when celebrating a goal.",
        category: TermCategory::Slang,
        example_usage: "After scoring an open net goal, spam 'What a Save!'",
        skill_level: SkillLevel::Beginner,
        submitted_by: "ChatSpammer",
    },
    SampleTerm {
        title: "Rotation",
        definition: "The systematic movement of players between offensive and defensive positions to maintain proper field coverage.",
        category: TermCategory::Strategy,
        example_usage: "Good rotation is key to winning at higher ranks.",
        skill_level: SkillLevel::Beginner,
        submitted_by: "CoachRL",
    },
    SampleTerm {
        title: "Demo",
        definition: "Short for demolition - when a player destroys an opponent's car by hitting them at supersonic speed.",
        category: TermCategory::Tactics,
        example_usage: "I got demoed right before the ball went in!",
        skill_level: SkillLevel::Beginner,
        submitted_by: "DemoKing",
    },
];

const SAMPLE_RECORDS: &[SampleRecord] = &[
    SampleRecord {
        title: "Fastest Goal from Kickoff",
        description: "Scored a goal in just 1.2 seconds from the initial kickoff, beating the previous record of 1.5 seconds.",
        category: RecordCategory::FastestGoal,
        record_holder_name: "SpeedDemon99",
        proof_url: "https://youtube.com/watch?v=example1",
        date_achieved: "2024-01-15",
        submitted_by: "RecordKeeper",
    },
    SampleRecord {
        title: "Longest Air Dribble",
        description: "Maintained an air dribble for 47 seconds across the entire field, setting a new world record.",
        category: RecordCategory::LongestAirDribble,
        record_holder_name: "AirMaster",
        proof_url: "https://youtube.com/watch?v=example2",
        date_achieved: "2024-02-20",
        submitted_by: "MechanicFan",
    },
    SampleRecord {
        title: "Highest MMR in 1v1",
        description: "Achieved the highest MMR ever recorded in 1v1 competitive play at 2,847 points.",
        category: RecordCategory::HighestMmr,
        record_holder_name: "ProPlayer123",
        proof_url: "https://youtube.com/watch?v=example3",
        date_achieved: "2024-03-10",
        submitted_by: "RankTracker",
    },
    SampleRecord {
        title: "Most Goals in a Single Match",
        description: "Scored 12 goals in a single competitive match, breaking the previous record of 10 goals.",
        category: RecordCategory::MostGoalsInMatch,
        record_holder_name: "GoalMachine",
        proof_url: "https://youtube.com/watch?v=example4",
        date_achieved: "2024-01-30",
        submitted_by: "MatchRecorder",
    },
];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub terms: usize,
    pub records: usize,
}

fn published_meta(submitted_by: &str) -> SubmissionMeta {
    let mut meta = SubmissionMeta::new(Some(submitted_by.to_string()));
    meta.status = Status::Published;
    meta
}

/// Adds every sample whose title is not in the database yet.
pub async fn seed(db: &mut SiteDb) -> SiteResult<SeedReport> {
    let mut report = SeedReport::default();

    for sample in SAMPLE_TERMS {
        if !db.terms().find(|x| x.title == sample.title).is_empty() {
            continue;
        }
        let extracted = mentions::extract_mentions(sample.definition, sample.example_usage);
        db.create(Term {
            meta: published_meta(sample.submitted_by),
            title: sample.title.to_string(),
            definition: extracted.definition,
            category: sample.category,
            example_usage: extracted.example_usage,
            skill_level: sample.skill_level,
            tags: extracted.tags,
        }).await?;
        report.terms += 1;
    }

    for sample in SAMPLE_RECORDS {
        if !db.records().find(|x| x.title == sample.title).is_empty() {
            continue;
        }
        db.create(Record {
            meta: published_meta(sample.submitted_by),
            title: sample.title.to_string(),
            description: sample.description.to_string(),
            category: sample.category,
            record_holder_name: sample.record_holder_name.to_string(),
            proof_url: sample.proof_url.to_string(),
            date_achieved: parse_date_achieved(sample.date_achieved)?,
        }).await?;
        report.records += 1;
    }

    info!("Seeded {} terms and {} records", report.terms, report.records);
    Ok(report)
}
