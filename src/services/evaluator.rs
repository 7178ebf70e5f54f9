use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, Utc, Weekday};
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::db::repository;
use crate::error::AppError;
use crate::events::{AchievementEvent, EventSink};
use crate::models::{AchievementUnlock, NewUnlock, Penalty, PenaltyStatus, Task, TaskStatus, User};
use crate::services::catalog::{CATALOG, Trigger};
use crate::services::streak::{self, ACHIEVEMENT_HORIZON_DAYS};

/// Everything a trigger predicate may look at, gathered once per evaluation
/// call rather than once per rule.
pub struct EvalContext<'a> {
    pub user: &'a User,
    pub as_of: NaiveDate,
    /// The evaluated user's tasks only.
    pub tasks: Vec<&'a Task>,
    /// All penalties, every user's. Needed for the weekly-maximum rule.
    pub penalties: &'a [Penalty],
    pub streak: u32,
}

impl<'a> EvalContext<'a> {
    pub fn new(
        user: &'a User,
        all_tasks: &'a [Task],
        penalties: &'a [Penalty],
        as_of: NaiveDate,
    ) -> Self {
        let tasks: Vec<&Task> = all_tasks.iter().filter(|t| t.user_id == user.id).collect();
        let streak = streak::current_streak(&user.id, all_tasks, as_of, ACHIEVEMENT_HORIZON_DAYS);
        Self {
            user,
            as_of,
            tasks,
            penalties,
            streak,
        }
    }

    fn completed(&self) -> impl Iterator<Item = &&'a Task> {
        self.tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Completed)
    }

    fn tasks_on(&self, date: &str) -> Vec<&'a Task> {
        self.tasks
            .iter()
            .filter(|t| t.date == date)
            .copied()
            .collect()
    }

    /// Completion rate for a date, or `None` when nothing was scheduled.
    fn rate_on(&self, date: &str) -> Option<f64> {
        let day = self.tasks_on(date);
        if day.is_empty() {
            return None;
        }
        let done = day
            .iter()
            .filter(|t| t.status == TaskStatus::Completed)
            .count();
        Some(done as f64 / day.len() as f64)
    }

    fn day_fully_completed(&self, date: &str) -> bool {
        self.rate_on(date) == Some(1.0)
    }
}

fn iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Hour from an `HH:MM` time-of-day string.
fn hour_of(task: &Task) -> Option<u32> {
    let time = task.time.as_deref()?;
    time.get(0..2)?.parse().ok()
}

fn completed_on_hour_pred(ctx: &EvalContext, pred: impl Fn(u32) -> bool) -> usize {
    ctx.completed()
        .filter(|t| hour_of(t).is_some_and(&pred))
        .count()
}

/// Completed-task counts per calendar date.
fn completed_per_date<'a>(ctx: &'a EvalContext) -> HashMap<&'a str, usize> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for task in ctx.completed() {
        *counts.entry(task.date.as_str()).or_default() += 1;
    }
    counts
}

fn parse_task_date(task: &Task) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&task.date, "%Y-%m-%d").ok()
}

/// Most recent Saturday on or before `date`.
fn previous_saturday(date: NaiveDate) -> Option<NaiveDate> {
    let back = (date.weekday().num_days_from_monday() + 2) % 7;
    date.checked_sub_days(Days::new(back as u64))
}

/// Monday of the week containing `date`.
fn week_start(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_sub_days(Days::new(date.weekday().num_days_from_monday() as u64))
}

pub fn trigger_met(trigger: &Trigger, ctx: &EvalContext) -> bool {
    match trigger {
        Trigger::PerfectDay => ctx.day_fully_completed(&iso(ctx.as_of)),
        Trigger::PerfectWeekendDay => {
            matches!(ctx.as_of.weekday(), Weekday::Sat | Weekday::Sun)
                && ctx.day_fully_completed(&iso(ctx.as_of))
        }
        Trigger::WeekendRun { weekends } => {
            let Some(first_sat) = previous_saturday(ctx.as_of) else {
                return false;
            };
            (0..*weekends).all(|w| {
                let Some(sat) = first_sat.checked_sub_days(Days::new(7 * w as u64)) else {
                    return false;
                };
                let sun = sat.checked_add_days(Days::new(1));
                let mut scheduled = 0;
                for day in [Some(sat), sun].into_iter().flatten() {
                    if day > ctx.as_of {
                        continue;
                    }
                    let date = iso(day);
                    let day_tasks = ctx.tasks_on(&date);
                    scheduled += day_tasks.len();
                    if !day_tasks.is_empty() && !ctx.day_fully_completed(&date) {
                        return false;
                    }
                }
                scheduled > 0
            })
        }
        Trigger::Streak { days } => ctx.streak >= *days,
        Trigger::CompletedInOneDay { count } => {
            completed_per_date(ctx).values().any(|&n| n >= *count)
        }
        Trigger::TotalCompleted { count } => ctx.completed().count() >= *count,
        Trigger::TotalPoints { points } => ctx.user.points >= *points,
        Trigger::CompletedBeforeHour { hour, count } => {
            completed_on_hour_pred(ctx, |h| h < *hour) >= *count
        }
        Trigger::CompletedAfterHour { hour, count } => {
            completed_on_hour_pred(ctx, |h| h >= *hour) >= *count
        }
        Trigger::AllDoneBeforeNoon => {
            let today = ctx.tasks_on(&iso(ctx.as_of));
            !today.is_empty()
                && today.iter().all(|t| t.status == TaskStatus::Completed)
                && today.iter().all(|t| hour_of(t).is_none_or(|h| h < 12))
        }
        Trigger::CompletedAtExactTime { time } => ctx
            .completed()
            .any(|t| t.time.as_deref() == Some(*time)),
        Trigger::ProofCount { count } => ctx.tasks.iter().filter(|t| t.has_proof()).count() >= *count,
        Trigger::CompletedWithinHours { count, hours } => {
            let mut stamps: Vec<DateTime<Utc>> = ctx
                .completed()
                .filter_map(|t| t.completed_at.as_deref())
                .filter_map(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| dt.with_timezone(&Utc))
                .collect();
            if stamps.len() < *count {
                return false;
            }
            stamps.sort();
            stamps
                .windows(*count)
                .any(|w| w[w.len() - 1] - w[0] <= Duration::hours(*hours))
        }
        Trigger::SameHourRun { days } => (0..24).any(|hour| {
            (0..*days).all(|i| {
                let Some(day) = ctx.as_of.checked_sub_days(Days::new(i as u64)) else {
                    return false;
                };
                let date = iso(day);
                ctx.completed()
                    .any(|t| t.date == date && hour_of(t) == Some(hour))
            })
        }),
        Trigger::SameTitleRun { days } => {
            let today = iso(ctx.as_of);
            let candidates: HashSet<&str> = ctx
                .completed()
                .filter(|t| t.date == today)
                .map(|t| t.title.as_str())
                .collect();
            candidates.iter().any(|title| {
                (0..*days).all(|i| {
                    let Some(day) = ctx.as_of.checked_sub_days(Days::new(i as u64)) else {
                        return false;
                    };
                    let date = iso(day);
                    ctx.completed()
                        .any(|t| t.date == date && t.title == *title)
                })
            })
        }
        Trigger::OnMonthDay {
            month,
            day,
            min_completed,
        } => completed_per_date(ctx).iter().any(|(date, &n)| {
            n >= *min_completed
                && NaiveDate::parse_from_str(date, "%Y-%m-%d")
                    .is_ok_and(|d| d.month() == *month && d.day() == *day)
        }),
        Trigger::PalindromeDate => ctx.completed().any(|t| {
            let digits: String = t.date.chars().filter(char::is_ascii_digit).collect();
            !digits.is_empty() && digits.chars().rev().collect::<String>() == digits
        }),
        Trigger::LeapDay => ctx
            .completed()
            .filter_map(|t| parse_task_date(t))
            .any(|d| d.month() == 2 && d.day() == 29),
        Trigger::OnDayOfMonth { days } => ctx
            .completed()
            .filter_map(|t| parse_task_date(t))
            .any(|d| days.contains(&d.day())),
        Trigger::Comeback => {
            let Some(yesterday) = ctx.as_of.checked_sub_days(Days::new(1)) else {
                return false;
            };
            match (ctx.rate_on(&iso(yesterday)), ctx.rate_on(&iso(ctx.as_of))) {
                (Some(prior), Some(current)) => prior < 0.5 && current == 1.0,
                _ => false,
            }
        }
        Trigger::MostPenaltiesThisWeek { min_count } => {
            let Some(start) = week_start(ctx.as_of) else {
                return false;
            };
            let Some(end) = start.checked_add_days(Days::new(6)) else {
                return false;
            };
            let (start, end) = (iso(start), iso(end));

            let mut per_user: HashMap<&str, usize> = HashMap::new();
            for penalty in ctx.penalties {
                if penalty.status == PenaltyStatus::Pending
                    && penalty.date.as_str() >= start.as_str()
                    && penalty.date.as_str() <= end.as_str()
                {
                    *per_user.entry(penalty.from_user_id.as_str()).or_default() += 1;
                }
            }

            let max = per_user.values().copied().max().unwrap_or(0);
            max >= *min_count && per_user.get(ctx.user.id.as_str()) == Some(&max)
        }
    }
}

/// Scans the catalog for a user and persists any newly earned unlocks.
///
/// Callers fire this in the background of the user action that triggered it;
/// failures are theirs to log, never to surface.
pub struct AchievementService {
    db: SqlitePool,
    events: Arc<dyn EventSink>,
}

impl AchievementService {
    pub fn new(db: SqlitePool, events: Arc<dyn EventSink>) -> Self {
        Self { db, events }
    }

    /// Evaluate every catalog rule for `user_id` as of `date` and return the
    /// unlocks created by this call.
    ///
    /// History and the existing unlock set are loaded once up front; rules
    /// already unlocked are skipped without touching their predicate, which
    /// makes repeat calls idempotent by construction.
    pub async fn evaluate_all(
        &self,
        user_id: &str,
        date: &str,
    ) -> Result<Vec<AchievementUnlock>, AppError> {
        let as_of = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| AppError::BadRequest(format!("invalid date: {}", date)))?;

        let users = repository::fetch_users(&self.db).await?;
        let Some(user) = users.iter().find(|u| u.id == user_id) else {
            warn!("skipping achievement evaluation for unknown user {}", user_id);
            return Ok(Vec::new());
        };

        let tasks = repository::fetch_tasks(&self.db).await?;
        let penalties = repository::fetch_penalties(&self.db).await?;
        let existing = repository::fetch_unlocks_for_user(&self.db, user_id).await?;
        let unlocked: HashSet<&str> = existing.iter().map(|u| u.achievement_id.as_str()).collect();

        let ctx = EvalContext::new(user, &tasks, &penalties, as_of);

        let mut newly = Vec::new();
        for def in CATALOG {
            if unlocked.contains(def.key) {
                continue;
            }
            if !trigger_met(&def.trigger, &ctx) {
                continue;
            }

            // The unique (user, key) index makes this a conditional write;
            // a concurrent evaluator losing the race simply gets None back.
            let inserted = repository::insert_unlock(
                &self.db,
                NewUnlock {
                    user_id: user.id.clone(),
                    achievement_id: def.key.to_string(),
                    title: def.title.to_string(),
                    description: def.description.to_string(),
                    icon: def.icon.to_string(),
                    points: def.points,
                },
            )
            .await?;

            if let Some(unlock) = inserted {
                info!("{} unlocked {}", user.name, unlock.achievement_id);
                let event = AchievementEvent {
                    achievement: unlock.clone(),
                    user: user.clone(),
                };
                if let Err(e) = self.events.emit(event).await {
                    warn!("achievement notification failed: {}", e);
                }
                newly.push(unlock);
            }
        }

        Ok(newly)
    }
}
