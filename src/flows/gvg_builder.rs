use std::time::Duration;

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;
use uuid::Uuid;

use super::FlowState;

pub const BUILDER_TIMEOUT: Duration = Duration::from_secs(300);
pub const DATE_OPTIONS: u64 = 14;
pub const TIME_OPTIONS: u32 = 24;
/// First offered battle time, in minutes after midnight (12:00).
const FIRST_TIME_MINUTES: u32 = 12 * 60;
const TIME_STEP_MINUTES: u32 = 30;

const DATE_LABEL: &str = "%a, %b %d (%Y-%m-%d)";
const DATE_VALUE: &str = "%Y-%m-%d";
const TIME_VALUE: &str = "%H:%M";

pub const ACTION_DATE: &str = "date";
pub const ACTION_TIME: &str = "time";
pub const ACTION_ADD: &str = "add";
pub const ACTION_REMOVE: &str = "pop";
pub const ACTION_POST: &str = "post";

/// `(label, value)` pairs for the next 14 days starting at `today`.
pub fn date_options(today: NaiveDate) -> Vec<(String, String)> {
    (0..DATE_OPTIONS)
        .filter_map(|i| today.checked_add_days(Days::new(i)))
        .map(|d| (d.format(DATE_LABEL).to_string(), d.format(DATE_VALUE).to_string()))
        .collect()
}

/// `(label, value)` pairs from 12:00 to 23:30 in 30 minute steps.
pub fn time_options() -> Vec<(String, String)> {
    (0..TIME_OPTIONS)
        .map(|i| {
            let m = FIRST_TIME_MINUTES + TIME_STEP_MINUTES * i;
            let hhmm = format!("{:02}:{:02}", m / 60, m % 60);
            (hhmm.clone(), hhmm)
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuilderEvent {
    PickDate(String),
    PickTime(String),
    Add,
    RemoveTop,
    Post,
    Timeout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuilderStep {
    Redraw,
    /// Unix timestamps, ascending.
    Post(Vec<i64>),
    /// Post pressed with nothing added.
    Cancelled,
    Expired,
    Ignored,
}

/// Collects battle times for a new signup post.
#[derive(Debug, Clone)]
pub struct GvgBuilder {
    pub id: Uuid,
    tz: Tz,
    today: NaiveDate,
    date: Option<NaiveDate>,
    time: Option<NaiveTime>,
    slots: Vec<i64>,
    state: FlowState,
}

impl GvgBuilder {
    pub fn new(tz: Tz, today: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            tz,
            today,
            date: None,
            time: None,
            slots: Vec::new(),
            state: FlowState::Open,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn slots(&self) -> &[i64] {
        &self.slots
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn date_value(&self) -> Option<String> {
        self.date.map(|d| d.format(DATE_VALUE).to_string())
    }

    pub fn time_value(&self) -> Option<String> {
        self.time.map(|t| t.format(TIME_VALUE).to_string())
    }

    fn current_timestamp(&self) -> Option<i64> {
        let naive = NaiveDateTime::new(self.date?, self.time?);
        // A time skipped by a DST jump has no local instant.
        self.tz.from_local_datetime(&naive).earliest().map(|dt| dt.timestamp())
    }

    pub fn handle(&mut self, event: BuilderEvent) -> BuilderStep {
        if self.state != FlowState::Open {
            return BuilderStep::Ignored;
        }
        match event {
            BuilderEvent::PickDate(v) => {
                if let Ok(d) = NaiveDate::parse_from_str(&v, DATE_VALUE) {
                    self.date = Some(d);
                }
                BuilderStep::Redraw
            }
            BuilderEvent::PickTime(v) => {
                if let Ok(t) = NaiveTime::parse_from_str(&v, TIME_VALUE) {
                    self.time = Some(t);
                }
                BuilderStep::Redraw
            }
            BuilderEvent::Add => {
                if let Some(ts) = self.current_timestamp() {
                    if !self.slots.contains(&ts) {
                        self.slots.push(ts);
                        self.slots.sort_unstable();
                    }
                }
                BuilderStep::Redraw
            }
            BuilderEvent::RemoveTop => {
                self.slots.pop();
                BuilderStep::Redraw
            }
            BuilderEvent::Post => {
                self.state = FlowState::Finished;
                if self.slots.is_empty() {
                    BuilderStep::Cancelled
                } else {
                    BuilderStep::Post(self.slots.clone())
                }
            }
            BuilderEvent::Timeout => {
                self.state = FlowState::TimedOut;
                BuilderStep::Expired
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 6).unwrap()
    }

    #[test]
    fn fourteen_dates_from_today() {
        let opts = date_options(today());
        assert_eq!(opts.len(), 14);
        assert_eq!(opts[0], ("Mon, May 06 (2024-05-06)".to_string(), "2024-05-06".to_string()));
        assert_eq!(opts[13].1, "2024-05-19");
    }

    #[test]
    fn times_run_noon_to_half_eleven() {
        let opts = time_options();
        assert_eq!(opts.len(), 24);
        assert_eq!(opts[0].1, "12:00");
        assert_eq!(opts[1].1, "12:30");
        assert_eq!(opts[23].1, "23:30");
    }

    #[test]
    fn add_needs_both_date_and_time() {
        let mut b = GvgBuilder::new(chrono_tz::UTC, today());
        b.handle(BuilderEvent::PickDate("2024-05-06".into()));
        assert_eq!(b.handle(BuilderEvent::Add), BuilderStep::Redraw);
        assert!(b.slots().is_empty());
        b.handle(BuilderEvent::PickTime("18:00".into()));
        b.handle(BuilderEvent::Add);
        assert_eq!(b.slots(), &[1715018400]);
    }

    #[test]
    fn slots_stay_sorted_and_unique() {
        let mut b = GvgBuilder::new(chrono_tz::UTC, today());
        b.handle(BuilderEvent::PickDate("2024-05-06".into()));
        b.handle(BuilderEvent::PickTime("18:00".into()));
        b.handle(BuilderEvent::Add);
        b.handle(BuilderEvent::Add);
        b.handle(BuilderEvent::PickTime("12:30".into()));
        b.handle(BuilderEvent::Add);
        assert_eq!(b.slots(), &[1714998600, 1715018400]);
        b.handle(BuilderEvent::RemoveTop);
        assert_eq!(b.slots(), &[1714998600]);
        assert_eq!(b.handle(BuilderEvent::Post), BuilderStep::Post(vec![1714998600]));
        assert_eq!(b.handle(BuilderEvent::Add), BuilderStep::Ignored);
    }

    #[test]
    fn times_are_local_to_the_configured_zone() {
        let mut b = GvgBuilder::new(chrono_tz::Europe::Warsaw, today());
        b.handle(BuilderEvent::PickDate("2024-05-06".into()));
        b.handle(BuilderEvent::PickTime("18:00".into()));
        b.handle(BuilderEvent::Add);
        assert_eq!(b.slots(), &[1715011200]);
    }

    #[test]
    fn posting_nothing_cancels() {
        let mut b = GvgBuilder::new(chrono_tz::UTC, today());
        assert_eq!(b.handle(BuilderEvent::Post), BuilderStep::Cancelled);
    }

    #[test]
    fn timeout_expires() {
        let mut b = GvgBuilder::new(chrono_tz::UTC, today());
        assert_eq!(b.handle(BuilderEvent::Timeout), BuilderStep::Expired);
        assert_eq!(b.state(), FlowState::TimedOut);
    }
}
