//! End-to-end entry scenarios through the service on an in-memory store.

use chrono::NaiveDate;
use timesheet::auth::{Principal, authenticate, register_user};
use timesheet::service::Timesheets;
use timesheet::store::{EntryStore, MemoryStore};
use timesheet::types::{EntryDraft, EntryPatch, Status, WeekRecord};
use timesheet::{Reject, TimesheetError};

struct Fixture {
    service: Timesheets<MemoryStore>,
    principal: Principal,
    week: WeekRecord,
}

fn fixture() -> Fixture {
    let store = MemoryStore::new();
    register_user(&store, "lee@example.com", Some("Lee".into()), "hunter2").unwrap();
    let principal = authenticate(&store, "lee@example.com", "hunter2")
        .unwrap()
        .unwrap();
    let service = Timesheets::new(store);
    let week = service
        .create_week(&principal, NaiveDate::from_ymd_opt(2025, 12, 1).unwrap())
        .unwrap();
    Fixture {
        service,
        principal,
        week,
    }
}

fn draft(day: u32, hours: u32) -> EntryDraft {
    EntryDraft {
        date: NaiveDate::from_ymd_opt(2025, 12, day).unwrap(),
        project: "Alpha 12".into(),
        work_type: Some("Development".into()),
        description: "feature work".into(),
        hours,
    }
}

impl Fixture {
    fn add(&self, day: u32, hours: u32) -> Result<String, TimesheetError> {
        let applied = self
            .service
            .add_entry(&self.principal, &self.week.id, draft(day, hours))?;
        Ok(applied.entry.unwrap().id)
    }

    fn day_total(&self, day: u32) -> u32 {
        self.service.week_detail(&self.week.id).unwrap().days[day as usize - 1].total
    }

    fn stored(&self) -> WeekRecord {
        self.service.week(&self.week.id).unwrap()
    }
}

#[test]
fn empty_week_is_missing() {
    let f = fixture();
    let week = f.stored();
    assert_eq!(week.total_hours, 0);
    assert_eq!(week.status, Status::Missing);
}

#[test]
fn thirty_nine_hours_is_incompleted() {
    let f = fixture();
    for day in 1..=4 {
        f.add(day, 8).unwrap();
    }
    f.add(5, 4).unwrap();
    f.add(5, 2).unwrap();
    f.add(5, 1).unwrap();
    let week = f.stored();
    assert_eq!(week.total_hours, 39);
    assert_eq!(week.status, Status::Incompleted);
}

#[test]
fn forty_hours_is_completed() {
    let f = fixture();
    for day in 1..=5 {
        f.add(day, 8).unwrap();
    }
    let week = f.stored();
    assert_eq!(week.total_hours, 40);
    assert_eq!(week.status, Status::Completed);
}

#[test]
fn adding_over_the_cap_is_rejected() {
    let f = fixture();
    f.add(2, 4).unwrap();
    f.add(2, 2).unwrap();

    let err = f.add(2, 4).unwrap_err();
    assert!(matches!(
        err,
        TimesheetError::Rejected(Reject::DailyCapExceeded {
            booked: 6,
            projected: 10,
            ..
        })
    ));
    assert_eq!(f.day_total(2), 6);
    assert_eq!(f.stored().total_hours, 6);
}

#[test]
fn editing_over_the_cap_is_rejected() {
    let f = fixture();
    f.add(3, 4).unwrap();
    f.add(3, 2).unwrap();
    let edited = f.add(3, 2).unwrap();

    let patch = EntryPatch {
        hours: Some(4),
        ..Default::default()
    };
    let err = f
        .service
        .edit_entry(&f.principal, &edited, patch)
        .unwrap_err();
    assert!(matches!(
        err.rejection(),
        Some(Reject::DailyCapExceeded { projected: 10, .. })
    ));
    assert_eq!(f.service.find_entry(&edited).unwrap().hours, 2);
    assert_eq!(f.day_total(3), 8);
}

#[test]
fn editing_within_the_cap_excludes_the_entry_itself() {
    let f = fixture();
    f.add(3, 4).unwrap();
    let edited = f.add(3, 4).unwrap();

    let patch = EntryPatch {
        hours: Some(4),
        description: Some("pairing".into()),
        ..Default::default()
    };
    let applied = f.service.edit_entry(&f.principal, &edited, patch).unwrap();
    assert_eq!(applied.entry.unwrap().description, "pairing");
    assert_eq!(f.day_total(3), 8);
}

#[test]
fn deleting_a_full_day_reopens_the_week() {
    let f = fixture();
    let ids: Vec<String> = (1..=5).map(|day| f.add(day, 8).unwrap()).collect();
    assert_eq!(f.stored().status, Status::Completed);

    let applied = f.service.delete_entry(&f.principal, &ids[4]).unwrap();
    assert_eq!(applied.week.total_hours, 32);
    assert_eq!(applied.week.status, Status::Incompleted);
    assert_eq!(f.stored(), applied.week);
    assert_eq!(
        f.service.store().load_entries(&f.week.id).unwrap().len(),
        4
    );
}

#[test]
fn invalid_fields_are_rejected_without_writing() {
    let f = fixture();
    let mut bad = draft(1, 0);
    let err = f
        .service
        .add_entry(&f.principal, &f.week.id, bad.clone())
        .unwrap_err();
    assert!(matches!(
        err.rejection(),
        Some(Reject::InvalidField { field: "hours", .. })
    ));

    bad.hours = 2;
    bad.description.clear();
    assert!(f.service.add_entry(&f.principal, &f.week.id, bad).is_err());

    assert!(f.service.store().load_entries(&f.week.id).unwrap().is_empty());
    assert_eq!(f.stored().status, Status::Missing);
}
