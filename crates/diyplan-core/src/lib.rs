//! # diyplan-core
//!
//! Core domain model and traits for the diyplan scheduling engine.
//!
//! This crate provides:
//! - Input types: `Task`, `Worker`, `SiteConstraints`, `SchedulingInputs`
//! - Output types: `ScheduledTask`, `SchedulingResult`, `RemediationSuggestion`
//! - The `ScheduleSink` persistence seam
//! - Error types for fatal input errors and lifecycle misuse
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use diyplan_core::{SchedulingInputs, Task, Worker, TimeRange};
//!
//! let start = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap().and_hms_opt(8, 0, 0).unwrap();
//! let deadline = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
//!
//! let mut inputs = SchedulingInputs::new(start, deadline, deadline);
//! inputs.tasks.push(Task::new("demo").hours(4.0).min_block(2.0));
//! inputs.tasks.push(Task::new("frame").hours(6.0).min_block(3.0).depends_on("demo"));
//! inputs.workers.push(Worker::new("sam").working_hours(TimeRange::hours(9, 17)));
//! assert_eq!(inputs.tasks.len(), 2);
//! ```

pub mod schedule;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::hash::{Hash, Hasher};
use thiserror::Error;

pub use schedule::{
    ConflictReason, MemorySink, RemediationKind, RemediationSuggestion, ScheduleSink,
    ScheduleStatus, ScheduledTask, SchedulingResult,
};

// ============================================================================
// Type Aliases
// ============================================================================

/// Unique identifier for a task
pub type TaskId = String;

/// Unique identifier for a worker
pub type WorkerId = String;

/// Grouping key shared by the tasks of one project phase
pub type PhaseId = String;

/// Minutes in a day; the exclusive end of a full-day `TimeRange`
pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// Working time, stored in whole minutes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Duration {
    /// Number of minutes
    pub minutes: i64,
}

impl Duration {
    pub const fn zero() -> Self {
        Self { minutes: 0 }
    }

    pub const fn minutes(m: i64) -> Self {
        Self { minutes: m }
    }

    pub const fn hours(h: i64) -> Self {
        Self { minutes: h * 60 }
    }

    /// Convert fractional hours to minutes, rounding up so that a
    /// requirement is never silently shortened.
    pub fn from_hours_f64(hours: f64) -> Self {
        // Strip float noise (4.4 * 60 = 264.00000000000006) before the ceil
        let minutes = (hours * 60.0 * 1e6).round() / 1e6;
        Self {
            minutes: minutes.ceil().max(0.0) as i64,
        }
    }

    pub fn as_hours(&self) -> f64 {
        self.minutes as f64 / 60.0
    }

    pub fn is_zero(&self) -> bool {
        self.minutes == 0
    }

    /// Round up to the next multiple of `step` (no-op for a zero step)
    pub fn round_up_to(self, step: Duration) -> Self {
        if step.minutes <= 0 {
            return self;
        }
        let rem = self.minutes % step.minutes;
        if rem == 0 {
            self
        } else {
            Self::minutes(self.minutes + step.minutes - rem)
        }
    }

    pub fn to_chrono(self) -> chrono::Duration {
        chrono::Duration::minutes(self.minutes)
    }
}

impl std::ops::Add for Duration {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self { minutes: self.minutes + rhs.minutes }
    }
}

impl std::ops::Sub for Duration {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self { minutes: self.minutes - rhs.minutes }
    }
}

impl std::ops::AddAssign for Duration {
    fn add_assign(&mut self, rhs: Self) {
        self.minutes += rhs.minutes;
    }
}

impl std::ops::SubAssign for Duration {
    fn sub_assign(&mut self, rhs: Self) {
        self.minutes -= rhs.minutes;
    }
}

impl std::iter::Sum for Duration {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, d| acc + d)
    }
}

impl std::fmt::Display for Duration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}h{:02}m", self.minutes / 60, self.minutes % 60)
    }
}

/// "HH:MM" (de)serialization for minutes-from-midnight fields
pub mod clock {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(minutes: &u16, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format!("{:02}:{:02}", minutes / 60, minutes % 60))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u16, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid time of day '{raw}'")))
    }

    pub fn parse(raw: &str) -> Option<u16> {
        let (h, m) = raw.trim().split_once(':')?;
        let h: u16 = h.parse().ok()?;
        let m: u16 = m.parse().ok()?;
        if m >= 60 || h > 24 || (h == 24 && m != 0) {
            return None;
        }
        Some(h * 60 + m)
    }
}

// ============================================================================
// Time of day
// ============================================================================

/// Time range within a day (in minutes from midnight, end exclusive)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    #[serde(with = "clock")]
    pub start: u16,
    #[serde(with = "clock")]
    pub end: u16,
}

impl TimeRange {
    pub fn new(start: u16, end: u16) -> Self {
        Self {
            start,
            end: end.min(MINUTES_PER_DAY),
        }
    }

    /// Whole-hour range, e.g. `TimeRange::hours(9, 17)`
    pub fn hours(start: u16, end: u16) -> Self {
        Self::new(start * 60, end * 60)
    }

    /// The full day, 00:00–24:00
    pub fn all_day() -> Self {
        Self::new(0, MINUTES_PER_DAY)
    }

    pub fn minutes(&self) -> u16 {
        self.end.saturating_sub(self.start)
    }

    pub fn duration_hours(&self) -> f64 {
        self.minutes() as f64 / 60.0
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Overlap with another range; `None` when the overlap has zero length
    pub fn intersect(&self, other: &TimeRange) -> Option<TimeRange> {
        let clipped = TimeRange::new(self.start.max(other.start), self.end.min(other.end));
        (!clipped.is_empty()).then_some(clipped)
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:02}:{:02}-{:02}:{:02}",
            self.start / 60,
            self.start % 60,
            self.end / 60,
            self.end % 60
        )
    }
}

/// One entry of a per-date availability override
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slot {
    #[serde(with = "clock")]
    pub start: u16,
    #[serde(with = "clock")]
    pub end: u16,
    pub available: bool,
}

impl Slot {
    pub fn open(range: TimeRange) -> Self {
        Self {
            start: range.start,
            end: range.end,
            available: true,
        }
    }

    pub fn closed(range: TimeRange) -> Self {
        Self {
            start: range.start,
            end: range.end,
            available: false,
        }
    }

    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start, self.end)
    }
}

/// Concrete span of wall-clock time in the site's local timezone
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Interval {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> Duration {
        Duration::minutes((self.end - self.start).num_minutes().max(0))
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Whether a date falls on Saturday or Sunday
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

// ============================================================================
// Task
// ============================================================================

/// A schedulable unit of work
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier
    pub id: TaskId,
    /// Human-readable title
    #[serde(default)]
    pub title: String,
    /// Nominal effort in hours, before any risk buffer
    pub estimated_hours: f64,
    /// Shortest block the task may be split into
    pub min_contiguous_hours: f64,
    /// Predecessor task ids
    #[serde(default)]
    pub dependencies: Vec<TaskId>,
    /// Free-form tags; `skill:<level>` tags gate worker selection
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Estimate confidence in 0.0..=1.0
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    #[serde(default)]
    pub phase_id: Option<PhaseId>,
    #[serde(default)]
    pub operation_id: Option<String>,
}

fn default_confidence() -> f64 {
    0.5
}

/// Tag prefix that declares the minimum skill a task needs
pub const SKILL_TAG_PREFIX: &str = "skill:";

impl Task {
    /// Create a new one-hour task with the given ID
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            title: id.clone(),
            id,
            estimated_hours: 1.0,
            min_contiguous_hours: 1.0,
            dependencies: Vec::new(),
            tags: BTreeSet::new(),
            confidence: default_confidence(),
            phase_id: None,
            operation_id: None,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the estimated hours; the minimum block is clamped to stay within it
    pub fn hours(mut self, hours: f64) -> Self {
        self.estimated_hours = hours;
        self.min_contiguous_hours = self.min_contiguous_hours.min(hours);
        self
    }

    pub fn min_block(mut self, hours: f64) -> Self {
        self.min_contiguous_hours = hours;
        self
    }

    pub fn depends_on(mut self, predecessor: impl Into<String>) -> Self {
        self.dependencies.push(predecessor.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn phase(mut self, phase: impl Into<String>) -> Self {
        self.phase_id = Some(phase.into());
        self
    }

    pub fn operation(mut self, operation: impl Into<String>) -> Self {
        self.operation_id = Some(operation.into());
        self
    }

    /// Minimum skill implied by the task's `skill:<level>` tags.
    /// Unknown levels are ignored; no tag means any worker qualifies.
    pub fn required_skill(&self) -> Option<SkillLevel> {
        self.tags
            .iter()
            .filter_map(|t| t.strip_prefix(SKILL_TAG_PREFIX))
            .filter_map(|level| level.parse().ok())
            .max()
    }
}

// ============================================================================
// Worker
// ============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Owner,
    Helper,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Owner => write!(f, "owner"),
            Role::Helper => write!(f, "helper"),
        }
    }
}

/// Worker skill, ordered novice < intermediate < expert
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    Novice,
    #[default]
    Intermediate,
    Expert,
}

impl std::str::FromStr for SkillLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "novice" => Ok(SkillLevel::Novice),
            "intermediate" => Ok(SkillLevel::Intermediate),
            "expert" => Ok(SkillLevel::Expert),
            other => Err(format!("unknown skill level '{other}'")),
        }
    }
}

impl std::fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkillLevel::Novice => write!(f, "novice"),
            SkillLevel::Intermediate => write!(f, "intermediate"),
            SkillLevel::Expert => write!(f, "expert"),
        }
    }
}

/// A person who can be assigned to tasks
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Worker {
    pub id: WorkerId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub skill_level: SkillLevel,
    /// Hard cap on hours assignable across the whole horizon
    pub max_total_hours: f64,
    #[serde(default)]
    pub weekends_only: bool,
    #[serde(default)]
    pub weekdays_after_five_pm: bool,
    /// Default daily window, used for dates without an override
    pub working_hours: TimeRange,
    /// Per-date overrides of `working_hours`
    #[serde(default)]
    pub availability: BTreeMap<NaiveDate, Vec<Slot>>,
    /// Reporting only
    #[serde(default)]
    pub cost_per_hour: Decimal,
}

impl Worker {
    /// Create an owner with 09:00–17:00 hours and a 40 hour budget
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            role: Role::Owner,
            skill_level: SkillLevel::Intermediate,
            max_total_hours: 40.0,
            weekends_only: false,
            weekdays_after_five_pm: false,
            working_hours: TimeRange::hours(9, 17),
            availability: BTreeMap::new(),
            cost_per_hour: Decimal::ZERO,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn skill(mut self, skill: SkillLevel) -> Self {
        self.skill_level = skill;
        self
    }

    pub fn max_hours(mut self, hours: f64) -> Self {
        self.max_total_hours = hours;
        self
    }

    pub fn working_hours(mut self, range: TimeRange) -> Self {
        self.working_hours = range;
        self
    }

    pub fn weekends_only(mut self) -> Self {
        self.weekends_only = true;
        self
    }

    pub fn weekdays_after_five_pm(mut self) -> Self {
        self.weekdays_after_five_pm = true;
        self
    }

    /// Replace the default hours on one date with explicit slots
    pub fn override_date(mut self, date: NaiveDate, slots: Vec<Slot>) -> Self {
        self.availability.insert(date, slots);
        self
    }

    pub fn cost_per_hour(mut self, rate: Decimal) -> Self {
        self.cost_per_hour = rate;
        self
    }

    /// Day-shape restriction with the documented precedence applied:
    /// `weekends_only` wins when both flags are set.
    pub fn day_shape(&self) -> DayShape {
        if self.weekends_only {
            DayShape::WeekendsOnly
        } else if self.weekdays_after_five_pm {
            DayShape::WeekdayEvenings
        } else {
            DayShape::Any
        }
    }
}

/// Resolved day-shape restriction of a worker
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DayShape {
    Any,
    WeekendsOnly,
    WeekdayEvenings,
}

// ============================================================================
// Site
// ============================================================================

/// Noise curfew: no work after `after` and none before `before`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuietHours {
    #[serde(with = "clock")]
    pub after: u16,
    #[serde(with = "clock")]
    pub before: u16,
}

impl QuietHours {
    pub fn new(after: u16, before: u16) -> Self {
        Self { after, before }
    }

    /// The daytime window in which work is allowed
    pub fn allowed_window(&self) -> TimeRange {
        TimeRange::new(self.before, self.after)
    }
}

/// Global rules independent of any one worker
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConstraints {
    pub weekday_hours: TimeRange,
    /// `None` means no work on weekends
    pub weekend_hours: Option<TimeRange>,
    #[serde(default)]
    pub weekends_only: bool,
    #[serde(default)]
    pub allow_night_work: bool,
    #[serde(default)]
    pub quiet_hours: Option<QuietHours>,
    #[serde(default)]
    pub blackout_dates: BTreeSet<NaiveDate>,
}

impl Default for SiteConstraints {
    fn default() -> Self {
        Self {
            weekday_hours: TimeRange::hours(7, 20),
            weekend_hours: Some(TimeRange::hours(8, 18)),
            weekends_only: false,
            allow_night_work: false,
            quiet_hours: None,
            blackout_dates: BTreeSet::new(),
        }
    }
}

impl SiteConstraints {
    /// Allowed window for the day type of `date`
    pub fn allowed_hours(&self, date: NaiveDate) -> Option<TimeRange> {
        if is_weekend(date) {
            self.weekend_hours
        } else {
            Some(self.weekday_hours)
        }
    }

    pub fn is_blackout(&self, date: NaiveDate) -> bool {
        self.blackout_dates.contains(&date)
    }

    pub fn blackout(mut self, date: NaiveDate) -> Self {
        self.blackout_dates.insert(date);
        self
    }
}

// ============================================================================
// Policy knobs
// ============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTolerance {
    Conservative,
    #[default]
    Moderate,
    Aggressive,
}

impl RiskTolerance {
    /// Multiplier applied to nominal hours
    pub fn buffer_multiplier(self) -> f64 {
        match self {
            RiskTolerance::Conservative => 1.3,
            RiskTolerance::Moderate => 1.1,
            RiskTolerance::Aggressive => 1.0,
        }
    }

    /// One step toward aggressive, `None` when already there
    pub fn relaxed(self) -> Option<Self> {
        match self {
            RiskTolerance::Conservative => Some(RiskTolerance::Moderate),
            RiskTolerance::Moderate => Some(RiskTolerance::Aggressive),
            RiskTolerance::Aggressive => None,
        }
    }
}

impl std::fmt::Display for RiskTolerance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskTolerance::Conservative => write!(f, "conservative"),
            RiskTolerance::Moderate => write!(f, "moderate"),
            RiskTolerance::Aggressive => write!(f, "aggressive"),
        }
    }
}

/// Planning granularity
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanningMode {
    /// Phases are scheduled as single blocks, hour slots
    Quick,
    #[default]
    Balanced,
    Detailed,
}

impl PlanningMode {
    /// Slot size every duration is rounded up to
    pub fn granularity(self) -> Duration {
        match self {
            PlanningMode::Quick => Duration::minutes(60),
            PlanningMode::Balanced => Duration::minutes(30),
            PlanningMode::Detailed => Duration::minutes(15),
        }
    }
}

// ============================================================================
// Inputs
// ============================================================================

/// A complete scheduling request
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingInputs {
    /// Start of the planning horizon (usually "now")
    pub planning_start: NaiveDateTime,
    pub target_completion_date: NaiveDate,
    /// Latest acceptable completion; must not precede the target
    pub drop_dead_date: NaiveDate,
    /// IANA timezone name all wall-clock times are expressed in
    #[serde(default = "default_timezone")]
    pub timezone: String,
    pub tasks: Vec<Task>,
    pub workers: Vec<Worker>,
    #[serde(default)]
    pub site_constraints: SiteConstraints,
    #[serde(default)]
    pub risk_tolerance: RiskTolerance,
    #[serde(default)]
    pub prefer_helpers: bool,
    #[serde(default)]
    pub mode: PlanningMode,
}

fn default_timezone() -> String {
    "UTC".into()
}

impl SchedulingInputs {
    pub fn new(planning_start: NaiveDateTime, target: NaiveDate, drop_dead: NaiveDate) -> Self {
        Self {
            planning_start,
            target_completion_date: target,
            drop_dead_date: drop_dead,
            timezone: default_timezone(),
            tasks: Vec::new(),
            workers: Vec::new(),
            site_constraints: SiteConstraints::default(),
            risk_tolerance: RiskTolerance::default(),
            prefer_helpers: false,
            mode: PlanningMode::default(),
        }
    }

    pub fn get_task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn get_worker(&self, id: &str) -> Option<&Worker> {
        self.workers.iter().find(|w| w.id == id)
    }

    /// The configured timezone
    pub fn tz(&self) -> Result<chrono_tz::Tz, ScheduleError> {
        self.timezone
            .parse::<chrono_tz::Tz>()
            .map_err(|_| ScheduleError::UnknownTimezone(self.timezone.clone()))
    }

    /// Deterministic digest of the request.
    ///
    /// Every collection in the inputs is ordered, so the JSON encoding and
    /// therefore the digest is stable for equal inputs.
    pub fn fingerprint(&self) -> u64 {
        let encoded = serde_json::to_vec(self).unwrap_or_default();
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        encoded.hash(&mut hasher);
        hasher.finish()
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Fatal input error; aborts `compute` entirely
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    #[error("Cyclic dependency detected among tasks: {}", .0.join(", "))]
    CyclicDependency(Vec<TaskId>),

    #[error("Task '{task}' depends on '{missing}' which doesn't exist")]
    UnknownDependency { task: TaskId, missing: TaskId },

    #[error("Duplicate task id: {0}")]
    DuplicateTaskId(TaskId),

    #[error("Drop-dead date {drop_dead} is before target completion date {target}")]
    DeadlineBeforeTarget { target: NaiveDate, drop_dead: NaiveDate },

    #[error("No workers supplied")]
    NoWorkers,

    #[error("Invalid task '{task}': {reason}")]
    InvalidTask { task: TaskId, reason: String },

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),
}

/// Failure reported by a persistence sink
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Sink rejected schedule: {0}")]
    Rejected(String),
}

/// Caller misuse of the draft/commit lifecycle
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Draft {0:016x} is stale: a newer schedule has been computed since")]
    StaleDraft(u64),

    #[error("Draft {0:016x} has already been committed")]
    AlreadyCommitted(u64),

    #[error("Persisting schedule failed: {0}")]
    Sink(#[from] SinkError),
}

// ============================================================================
// Tests
// ============================================================================
