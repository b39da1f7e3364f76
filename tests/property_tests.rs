//! Property tests for the entry pipeline.
//!
//! Random sequences of creates, updates and deletes are run through
//! `apply_entry_mutation`; after every step the daily cap, the week total
//! and the derived status must hold, and rejected steps must not change
//! anything.

use chrono::NaiveDate;
use proptest::prelude::*;
use timesheet::engine::{self, DAILY_CAP, Mutation, WEEKLY_TARGET};
use timesheet::types::{EntryDraft, EntryPatch, Status, TaskEntry, WeekRecord};

#[derive(Clone, Debug)]
enum Op {
    Create { day: u32, hours: u32 },
    Update { pick: usize, day: Option<u32>, hours: Option<u32> },
    Delete { pick: usize },
}

fn hours() -> impl Strategy<Value = u32> {
    prop::sample::select(vec![0u32, 1, 2, 3, 4, 8])
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0u32..5, hours()).prop_map(|(day, hours)| Op::Create { day, hours }),
        2 => (any::<usize>(), prop::option::of(0u32..5), prop::option::of(hours()))
            .prop_map(|(pick, day, hours)| Op::Update { pick, day, hours }),
        1 => any::<usize>().prop_map(|pick| Op::Delete { pick }),
    ]
}

fn week() -> WeekRecord {
    WeekRecord::new("w".into(), NaiveDate::from_ymd_opt(2025, 12, 1).unwrap())
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 12, 1 + day).unwrap()
}

fn to_mutation(op: &Op, step: usize, entries: &[TaskEntry]) -> Mutation {
    let pick_id = |pick: usize| {
        if entries.is_empty() {
            "missing".to_string()
        } else {
            entries[pick % entries.len()].id.clone()
        }
    };
    match op {
        Op::Create { day, hours } => Mutation::Create {
            id: format!("e{step}"),
            draft: EntryDraft {
                date: date(*day),
                project: "Beta".into(),
                work_type: None,
                description: "task".into(),
                hours: *hours,
            },
        },
        Op::Update { pick, day, hours } => Mutation::Update {
            id: pick_id(*pick),
            patch: EntryPatch {
                date: day.map(date),
                hours: *hours,
                ..Default::default()
            },
        },
        Op::Delete { pick } => Mutation::Delete { id: pick_id(*pick) },
    }
}

fn check_invariants(week: &WeekRecord, entries: &[TaskEntry]) -> Result<(), TestCaseError> {
    for day in 0..5 {
        let booked: u32 = entries
            .iter()
            .filter(|e| e.date == date(day))
            .map(|e| e.hours)
            .sum();
        prop_assert!(booked <= DAILY_CAP);
    }
    let total: u32 = entries.iter().map(|e| e.hours).sum();
    prop_assert_eq!(week.total_hours, total);
    prop_assert_eq!(week.status == Status::Missing, total == 0);
    prop_assert_eq!(week.status == Status::Completed, total >= WEEKLY_TARGET);
    Ok(())
}

proptest! {
    #[test]
    fn prop_pipeline_keeps_invariants(ops in prop::collection::vec(op(), 1..60)) {
        let mut week = week();
        let mut entries: Vec<TaskEntry> = Vec::new();
        for (step, op) in ops.iter().enumerate() {
            let mutation = to_mutation(op, step, &entries);
            match engine::apply_entry_mutation(mutation, &week, &entries) {
                Ok(applied) => {
                    week = applied.week;
                    entries = applied.entries;
                }
                Err(_) => {
                    // Nothing to roll back: the inputs were only borrowed.
                    let (same, _) = engine::refresh_week(&week, &entries);
                    prop_assert_eq!(&same, &week);
                }
            }
            check_invariants(&week, &entries)?;
        }
    }

    #[test]
    fn prop_refresh_is_idempotent(ops in prop::collection::vec(op(), 1..30)) {
        let mut week = week();
        let mut entries: Vec<TaskEntry> = Vec::new();
        for (step, op) in ops.iter().enumerate() {
            if let Ok(applied) = engine::apply_entry_mutation(to_mutation(op, step, &entries), &week, &entries) {
                week = applied.week;
                entries = applied.entries;
            }
        }
        let first = engine::refresh_week(&week, &entries);
        let second = engine::refresh_week(&first.0, &entries);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_classify_partitions_totals(total in 0u32..200) {
        let status = engine::classify(total);
        let expected = if total == 0 {
            Status::Missing
        } else if total < WEEKLY_TARGET {
            Status::Incompleted
        } else {
            Status::Completed
        };
        prop_assert_eq!(status, expected);
    }
}
