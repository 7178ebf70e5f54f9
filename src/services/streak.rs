use chrono::{Days, NaiveDate};

use crate::models::{Task, TaskStatus};

/// Horizon used for the cached per-user streak shown in day-to-day stats.
pub const STATS_HORIZON_DAYS: u32 = 30;

/// Horizon wide enough for every streak-based achievement, including the
/// full-year one.
pub const ACHIEVEMENT_HORIZON_DAYS: u32 = 366;

/// Length of the consecutive-day streak ending at `today`.
///
/// A day counts only if the user had at least one task scheduled and every
/// one of them is completed. A day with zero tasks breaks the streak rather
/// than being skipped: the streak is about having shown up and finished every
/// scheduled day. Returns 0 when `today` itself has no tasks or is
/// incomplete.
pub fn current_streak(user_id: &str, tasks: &[Task], today: NaiveDate, horizon: u32) -> u32 {
    let mut streak = 0;

    for offset in 0..horizon {
        let day = match today.checked_sub_days(Days::new(offset as u64)) {
            Some(day) => day,
            None => break,
        };
        let date = day.format("%Y-%m-%d").to_string();

        let mut scheduled = 0;
        let mut all_completed = true;
        for task in tasks {
            if task.user_id == user_id && task.date == date {
                scheduled += 1;
                if task.status != TaskStatus::Completed {
                    all_completed = false;
                }
            }
        }

        if scheduled == 0 || !all_completed {
            break;
        }
        streak += 1;
    }

    streak
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(user_id: &str, date: &str, status: TaskStatus) -> Task {
        Task {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            title: "Dishes".to_string(),
            description: None,
            date: date.to_string(),
            time: None,
            status,
            icon: None,
            proof: None,
            completed_at: None,
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn three_full_days_then_gap() {
        let tasks = vec![
            task("alice", "2024-01-01", TaskStatus::Completed),
            task("alice", "2024-01-02", TaskStatus::Completed),
            task("alice", "2024-01-03", TaskStatus::Completed),
            // nothing on 2023-12-31
        ];
        assert_eq!(current_streak("alice", &tasks, day("2024-01-03"), 30), 3);
    }

    #[test]
    fn incomplete_yesterday_limits_streak_to_today() {
        let tasks = vec![
            task("alice", "2024-01-02", TaskStatus::Pending),
            task("alice", "2024-01-02", TaskStatus::Completed),
            task("alice", "2024-01-03", TaskStatus::Completed),
        ];
        assert_eq!(current_streak("alice", &tasks, day("2024-01-03"), 30), 1);
    }

    #[test]
    fn incomplete_today_is_zero() {
        let tasks = vec![
            task("alice", "2024-01-02", TaskStatus::Completed),
            task("alice", "2024-01-03", TaskStatus::Pending),
        ];
        assert_eq!(current_streak("alice", &tasks, day("2024-01-03"), 30), 0);
    }

    #[test]
    fn empty_today_is_zero() {
        let tasks = vec![task("alice", "2024-01-02", TaskStatus::Completed)];
        assert_eq!(current_streak("alice", &tasks, day("2024-01-03"), 30), 0);
    }

    #[test]
    fn other_users_do_not_count() {
        let tasks = vec![
            task("alice", "2024-01-03", TaskStatus::Completed),
            task("bob", "2024-01-03", TaskStatus::Pending),
        ];
        assert_eq!(current_streak("alice", &tasks, day("2024-01-03"), 30), 1);
    }

    #[test]
    fn horizon_caps_the_walk() {
        let mut tasks = Vec::new();
        for i in 0..40 {
            let date = day("2024-02-29").checked_sub_days(Days::new(i)).unwrap();
            tasks.push(task(
                "alice",
                &date.format("%Y-%m-%d").to_string(),
                TaskStatus::Completed,
            ));
        }
        assert_eq!(current_streak("alice", &tasks, day("2024-02-29"), 30), 30);
        assert_eq!(current_streak("alice", &tasks, day("2024-02-29"), 366), 40);
    }
}
