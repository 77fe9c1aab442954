//! Calendar resolution
//!
//! Evaluates a worker's declared constraints against the site rules, one
//! date at a time, and produces the concrete open intervals the placement
//! solver draws from. Everything here is a pure function of its arguments.
//!
//! Per date:
//! 1. Blackout dates (and weekdays under a site-wide weekends-only rule)
//!    are closed for everyone.
//! 2. An explicit override for the date supplies its open slots verbatim;
//!    otherwise the worker's default hours are used, narrowed by the
//!    worker's day shape.
//! 3. The result is clipped to the site's allowed hours for the day type,
//!    the quiet-hours window and, unless night work is allowed, the daytime
//!    window.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use diyplan_core::{
    is_weekend, DayShape, Duration, Interval, SiteConstraints, TimeRange, Worker,
};

use crate::config::EngineConfig;

/// Weekday-evening workers never start before this time
pub const EVENING_START: u16 = 17 * 60;

/// Resolves worker availability under one set of site rules
#[derive(Debug, Clone, Copy)]
pub struct CalendarResolver<'a> {
    site: &'a SiteConstraints,
    day_window: TimeRange,
}

impl<'a> CalendarResolver<'a> {
    pub fn new(site: &'a SiteConstraints, config: &EngineConfig) -> Self {
        Self {
            site,
            day_window: config.day_window(),
        }
    }

    /// Open time-of-day ranges for one worker on one date, sorted and merged
    pub fn daily_ranges(&self, worker: &Worker, date: NaiveDate) -> Vec<TimeRange> {
        let site = self.site;
        let weekend = is_weekend(date);

        if site.is_blackout(date) || (site.weekends_only && !weekend) {
            return Vec::new();
        }

        let declared: Vec<TimeRange> = match worker.availability.get(&date) {
            Some(slots) => slots
                .iter()
                .filter(|s| s.available)
                .map(|s| s.range())
                .collect(),
            None => match worker.day_shape() {
                DayShape::WeekendsOnly if !weekend => Vec::new(),
                DayShape::WeekdayEvenings if !weekend => {
                    let hours = worker.working_hours;
                    vec![TimeRange::new(hours.start.max(EVENING_START), hours.end)]
                }
                _ => vec![worker.working_hours],
            },
        };

        let Some(allowed) = site.allowed_hours(date) else {
            return Vec::new();
        };

        let mut windows = vec![allowed];
        if let Some(quiet) = site.quiet_hours {
            windows.push(quiet.allowed_window());
        }
        if !site.allow_night_work {
            windows.push(self.day_window);
        }

        let clipped: Vec<TimeRange> = declared
            .into_iter()
            .filter_map(|range| {
                windows
                    .iter()
                    .try_fold(range, |acc, window| acc.intersect(window))
            })
            .collect();

        merge_ranges(clipped)
    }

    /// Open intervals for one worker between `horizon_start` and `horizon_end`
    pub fn availability(
        &self,
        worker: &Worker,
        horizon_start: NaiveDateTime,
        horizon_end: NaiveDateTime,
    ) -> Vec<Interval> {
        let mut intervals = Vec::new();
        if horizon_end <= horizon_start {
            return intervals;
        }

        let mut date = horizon_start.date();
        while date.and_time(NaiveTime::MIN) < horizon_end {
            for range in self.daily_ranges(worker, date) {
                let interval = Interval::new(
                    at_minute(date, range.start).max(horizon_start),
                    at_minute(date, range.end).min(horizon_end),
                );
                if !interval.is_empty() {
                    intervals.push(interval);
                }
            }
            let Some(next) = date.succ_opt() else { break };
            date = next;
        }

        intervals
    }
}

/// Open intervals for `worker` over the horizon with the default night window
pub fn availability(
    worker: &Worker,
    site: &SiteConstraints,
    horizon_start: NaiveDateTime,
    horizon_end: NaiveDateTime,
) -> Vec<Interval> {
    CalendarResolver::new(site, &EngineConfig::default()).availability(
        worker,
        horizon_start,
        horizon_end,
    )
}

/// Wall-clock time `minutes` after midnight of `date` (24:00 is next midnight)
pub fn at_minute(date: NaiveDate, minutes: u16) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN) + chrono::Duration::minutes(i64::from(minutes))
}

/// Sort ranges and merge the ones that overlap or touch
fn merge_ranges(mut ranges: Vec<TimeRange>) -> Vec<TimeRange> {
    ranges.sort_by_key(|r| (r.start, r.end));
    let mut merged: Vec<TimeRange> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(last) if range.start <= last.end => last.end = last.end.max(range.end),
            _ => merged.push(range),
        }
    }
    merged
}

/// Longest single interval in a list
pub fn longest_window(intervals: &[Interval]) -> Duration {
    intervals
        .iter()
        .map(Interval::duration)
        .max()
        .unwrap_or_default()
}

/// Total open time at or after `from`
pub fn open_time_after(intervals: &[Interval], from: NaiveDateTime) -> Duration {
    intervals
        .iter()
        .filter(|iv| iv.end > from)
        .map(|iv| Interval::new(iv.start.max(from), iv.end).duration())
        .sum()
}

/// Remove `used` from a sorted list of disjoint intervals
pub fn subtract(free: &mut Vec<Interval>, used: Interval) {
    let mut result = Vec::with_capacity(free.len() + 1);
    for iv in free.drain(..) {
        if !iv.overlaps(&used) {
            result.push(iv);
            continue;
        }
        if iv.start < used.start {
            result.push(Interval::new(iv.start, used.start));
        }
        if used.end < iv.end {
            result.push(Interval::new(used.end, iv.end));
        }
    }
    *free = result;
}
