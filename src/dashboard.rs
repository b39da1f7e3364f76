/// Week overview and per-week detail, as plain data for the CLI to print.
use chrono::{Datelike, NaiveDate};

use crate::engine::{self, DAILY_CAP, WEEKLY_TARGET};
use crate::error::Reject;
use crate::types::{Status, TaskEntry, WeekRecord};

pub const PAGE_SIZES: [usize; 3] = [5, 10, 20];
pub const DEFAULT_PAGE_SIZE: usize = 5;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WeekFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub status: Option<Status>,
}

impl WeekFilter {
    /// A week matches when its span overlaps `[from, to]` and its status
    /// equals the requested one. Missing bounds are open.
    pub fn matches(&self, week: &WeekRecord) -> bool {
        if self.from.is_some_and(|from| week.end_date < from) {
            return false;
        }
        if self.to.is_some_and(|to| week.start_date > to) {
            return false;
        }
        self.status.is_none_or(|status| week.status == status)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based.
    pub page: usize,
    pub per_page: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeekPage {
    pub items: Vec<WeekRecord>,
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
    /// 1-based position of the first item shown, 0 when the page is empty.
    pub first_item: usize,
    pub last_item: usize,
}

pub fn list_weeks(
    mut weeks: Vec<WeekRecord>,
    filter: &WeekFilter,
    request: PageRequest,
) -> Result<WeekPage, Reject> {
    if !PAGE_SIZES.contains(&request.per_page) {
        return Err(Reject::invalid(
            "page size",
            format!("{} is not one of {:?}", request.per_page, PAGE_SIZES),
        ));
    }
    if request.page == 0 {
        return Err(Reject::invalid("page", "pages are numbered from 1"));
    }

    weeks.retain(|w| filter.matches(w));
    weeks.sort_by_key(|w| w.start_date);
    let total_items = weeks.len();
    let total_pages = total_items.div_ceil(request.per_page);
    let skip = (request.page - 1) * request.per_page;
    let items: Vec<WeekRecord> = weeks.into_iter().skip(skip).take(request.per_page).collect();
    let (first_item, last_item) = if items.is_empty() {
        (0, 0)
    } else {
        (skip + 1, skip + items.len())
    };

    Ok(WeekPage {
        items,
        page: request.page,
        per_page: request.per_page,
        total_items,
        total_pages,
        first_item,
        last_item,
    })
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DayRow {
    pub date: NaiveDate,
    pub entries: Vec<TaskEntry>,
    pub total: u32,
    pub can_add_more: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WeekDetail {
    pub week: WeekRecord,
    pub days: Vec<DayRow>,
    /// Entries dated outside the working days.
    pub off_grid: Vec<TaskEntry>,
    pub total_hours: u32,
    pub status: Status,
    /// Share of the weekly target reached, capped at 1.0.
    pub progress: f64,
}

/// Builds the day grid of a week. Totals are recomputed from `entries`, so
/// the detail is exact even if the stored week record drifted.
pub fn week_detail(week: &WeekRecord, entries: &[TaskEntry]) -> WeekDetail {
    let (refreshed, totals) = engine::refresh_week(week, entries);
    let grid = engine::work_dates(week.start_date);

    let days = grid
        .iter()
        .map(|date| {
            let total = totals.day(*date);
            DayRow {
                date: *date,
                entries: entries.iter().filter(|e| e.date == *date).cloned().collect(),
                total,
                can_add_more: total < DAILY_CAP,
            }
        })
        .collect();
    let off_grid = entries
        .iter()
        .filter(|e| !grid.contains(&e.date))
        .cloned()
        .collect();

    WeekDetail {
        week: week.clone(),
        days,
        off_grid,
        total_hours: refreshed.total_hours,
        status: refreshed.status,
        progress: (f64::from(refreshed.total_hours) / f64::from(WEEKLY_TARGET)).min(1.0),
    }
}

/// `1 - 5 December, 2025`
pub fn format_range(start: NaiveDate, end: NaiveDate) -> String {
    format!("{} - {}", start.day(), end.format("%-d %B, %Y"))
}

/// `Dec 1`
pub fn format_day(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn week(id: &str, month: u32, day: u32, total: u32) -> WeekRecord {
        let mut week = WeekRecord::new(id.into(), NaiveDate::from_ymd_opt(2025, month, day).unwrap());
        week.total_hours = total;
        week.status = engine::classify(total);
        week
    }

    fn weeks() -> Vec<WeekRecord> {
        vec![
            week("w4", 12, 22, 0),
            week("w1", 12, 1, 40),
            week("w2", 12, 8, 12),
            week("w3", 12, 15, 40),
        ]
    }

    fn ids(page: &WeekPage) -> Vec<&str> {
        page.items.iter().map(|w| w.id.as_str()).collect()
    }

    #[test]
    fn lists_by_start_date() {
        let page = list_weeks(weeks(), &WeekFilter::default(), PageRequest::default()).unwrap();
        assert_eq!(ids(&page), vec!["w1", "w2", "w3", "w4"]);
        assert_eq!(page.total_pages, 1);
        assert_eq!((page.first_item, page.last_item), (1, 4));
    }

    #[test]
    fn filters_by_status() {
        let filter = WeekFilter {
            status: Some(Status::Completed),
            ..Default::default()
        };
        let page = list_weeks(weeks(), &filter, PageRequest::default()).unwrap();
        assert_eq!(ids(&page), vec!["w1", "w3"]);
    }

    #[test]
    fn range_filter_keeps_overlapping_weeks() {
        let filter = WeekFilter {
            from: NaiveDate::from_ymd_opt(2025, 12, 5),
            to: NaiveDate::from_ymd_opt(2025, 12, 9),
            status: None,
        };
        let page = list_weeks(weeks(), &filter, PageRequest::default()).unwrap();
        assert_eq!(ids(&page), vec!["w1", "w2"]);
    }

    #[test]
    fn paginates() {
        let many: Vec<_> = (0..12)
            .map(|i| {
                let start = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap() + chrono::Days::new(7 * i);
                WeekRecord::new(format!("w{i:02}"), start)
            })
            .collect();
        let request = PageRequest {
            page: 3,
            per_page: 5,
        };
        let page = list_weeks(many.clone(), &WeekFilter::default(), request).unwrap();
        assert_eq!(ids(&page), vec!["w10", "w11"]);
        assert_eq!(page.total_pages, 3);
        assert_eq!((page.first_item, page.last_item), (11, 12));

        let past_end = PageRequest {
            page: 4,
            per_page: 5,
        };
        let page = list_weeks(many, &WeekFilter::default(), past_end).unwrap();
        assert!(page.items.is_empty());
        assert_eq!((page.first_item, page.last_item), (0, 0));
    }

    #[test]
    fn rejects_odd_page_sizes() {
        let request = PageRequest {
            page: 1,
            per_page: 7,
        };
        assert!(list_weeks(weeks(), &WeekFilter::default(), request).is_err());
        let request = PageRequest {
            page: 0,
            per_page: 5,
        };
        assert!(list_weeks(weeks(), &WeekFilter::default(), request).is_err());
    }

    #[test]
    fn detail_marks_full_days() {
        let w = week("w1", 12, 1, 0);
        let entry = |id: &str, day: u32, hours: u32| TaskEntry {
            id: id.into(),
            week_id: "w1".into(),
            date: NaiveDate::from_ymd_opt(2025, 12, day).unwrap(),
            project: "Alpha 12".into(),
            work_type: None,
            description: "build".into(),
            hours,
        };
        let detail = week_detail(&w, &[entry("a", 1, 8), entry("b", 2, 4), entry("c", 7, 2)]);

        assert_eq!(detail.days.len(), 5);
        assert!(!detail.days[0].can_add_more);
        assert!(detail.days[1].can_add_more);
        assert_eq!(detail.days[1].total, 4);
        assert_eq!(detail.off_grid.len(), 1);
        assert_eq!(detail.total_hours, 14);
        assert_eq!(detail.status, Status::Incompleted);
        assert!((detail.progress - 0.35).abs() < f64::EPSILON);
    }

    #[test]
    fn formats_like_the_week_header() {
        let start = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 12, 5).unwrap();
        assert_eq!(format_range(start, end), "1 - 5 December, 2025");
        assert_eq!(format_day(start), "Dec 1");
    }
}
