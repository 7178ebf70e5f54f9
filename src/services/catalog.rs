//! Static achievement catalog.
//!
//! Each entry pairs fixed metadata with a declarative [`Trigger`]; the
//! evaluator interprets the trigger against a user's task history. Keeping
//! the rules as data makes the whole catalog inspectable and lets triggers be
//! tested without the persistence layer.

/// Declarative trigger condition, evaluated against a user's history as of a
/// given date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Every task on the evaluation date is completed (and at least one
    /// exists).
    PerfectDay,
    /// Like `PerfectDay`, but only on a Saturday or Sunday.
    PerfectWeekendDay,
    /// Every weekend day with tasks across the last `weekends` weekends is
    /// fully completed, with at least one weekend task per weekend.
    WeekendRun { weekends: u32 },
    /// Current consecutive fully-completed-day streak reaches `days`.
    Streak { days: u32 },
    /// Some single date has at least `count` completed tasks.
    CompletedInOneDay { count: usize },
    /// Lifetime completed-task count reaches `count`.
    TotalCompleted { count: usize },
    /// The user's cumulative point total reaches `points`.
    TotalPoints { points: i64 },
    /// At least `count` completed tasks scheduled strictly before `hour`.
    CompletedBeforeHour { hour: u32, count: usize },
    /// At least `count` completed tasks scheduled at `hour` or later.
    CompletedAfterHour { hour: u32, count: usize },
    /// Every task on the evaluation date is completed and none is scheduled
    /// at noon or later.
    AllDoneBeforeNoon,
    /// A completed task scheduled at exactly `time`.
    CompletedAtExactTime { time: &'static str },
    /// Lifetime count of completed tasks with real proof reaches `count`.
    ProofCount { count: usize },
    /// `count` completion timestamps within a rolling window of `hours`.
    CompletedWithinHours { count: usize, hours: i64 },
    /// Some hour of day has a completed task on each of the last `days`
    /// consecutive days.
    SameHourRun { days: u32 },
    /// Some task title is completed on each of the last `days` consecutive
    /// days.
    SameTitleRun { days: u32 },
    /// At least `min_completed` completed tasks on any date falling on the
    /// given month/day.
    OnMonthDay { month: u32, day: u32, min_completed: usize },
    /// A completed task on a date whose digits read the same reversed.
    PalindromeDate,
    /// A completed task on February 29th.
    LeapDay,
    /// A completed task on a day of the month in `days`.
    OnDayOfMonth { days: &'static [u32] },
    /// Prior day finished below 50% while the evaluation date hit 100%.
    Comeback,
    /// Most pending penalties of any user in the current week, at least
    /// `min_count` of them.
    MostPenaltiesThisWeek { min_count: usize },
}

#[derive(Debug, Clone, Copy)]
pub struct AchievementDef {
    pub key: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub points: i64,
    pub color: &'static str,
    pub trigger: Trigger,
}

pub fn find(key: &str) -> Option<&'static AchievementDef> {
    CATALOG.iter().find(|def| def.key == key)
}

/// The full rule set. Evaluation order is table order; no rule depends on
/// another rule having fired.
pub static CATALOG: &[AchievementDef] = &[
    // Daily & streak
    AchievementDef {
        key: "perfect_day",
        title: "Perfect Day",
        description: "Complete all tasks for the day",
        icon: "🌟",
        points: 10,
        color: "yellow",
        trigger: Trigger::PerfectDay,
    },
    AchievementDef {
        key: "consistency_king",
        title: "Consistency King",
        description: "Complete all tasks for 3 days in a row",
        icon: "👑",
        points: 30,
        color: "purple",
        trigger: Trigger::Streak { days: 3 },
    },
    AchievementDef {
        key: "streak_7",
        title: "Week Warrior",
        description: "Maintain a 7-day streak",
        icon: "🔥",
        points: 25,
        color: "orange",
        trigger: Trigger::Streak { days: 7 },
    },
    AchievementDef {
        key: "perfect_week",
        title: "Perfect Week",
        description: "Complete all tasks for 7 consecutive days",
        icon: "⭐",
        points: 100,
        color: "yellow",
        trigger: Trigger::Streak { days: 7 },
    },
    AchievementDef {
        key: "streak_14",
        title: "Fortnight Fighter",
        description: "Maintain a 14-day streak",
        icon: "⚔️",
        points: 75,
        color: "red",
        trigger: Trigger::Streak { days: 14 },
    },
    AchievementDef {
        key: "fortnight_fighter",
        title: "Fortnight Fighter",
        description: "Complete all tasks for 14 days in a row",
        icon: "⚔️",
        points: 150,
        color: "red",
        trigger: Trigger::Streak { days: 14 },
    },
    AchievementDef {
        key: "habit_former",
        title: "Habit Former",
        description: "Complete tasks for 21 consecutive days",
        icon: "🧠",
        points: 150,
        color: "green",
        trigger: Trigger::Streak { days: 21 },
    },
    AchievementDef {
        key: "streak_30",
        title: "Month Master",
        description: "Maintain a 30-day streak",
        icon: "💎",
        points: 100,
        color: "purple",
        trigger: Trigger::Streak { days: 30 },
    },
    AchievementDef {
        key: "perfect_month",
        title: "Perfect Month",
        description: "Complete all tasks for 30 consecutive days",
        icon: "💫",
        points: 400,
        color: "yellow",
        trigger: Trigger::Streak { days: 30 },
    },
    AchievementDef {
        key: "quarterly_queen",
        title: "Quarterly Queen",
        description: "Complete all tasks for 90 days in a row",
        icon: "👸",
        points: 500,
        color: "purple",
        trigger: Trigger::Streak { days: 90 },
    },
    AchievementDef {
        key: "streak_100",
        title: "Century Streak",
        description: "Maintain a 100-day streak",
        icon: "💎",
        points: 500,
        color: "gold",
        trigger: Trigger::Streak { days: 100 },
    },
    AchievementDef {
        key: "iron_will",
        title: "Iron Will",
        description: "Complete all tasks for 100 consecutive days",
        icon: "🦾",
        points: 1000,
        color: "gold",
        trigger: Trigger::Streak { days: 100 },
    },
    AchievementDef {
        key: "perfect_year",
        title: "Perfect Year",
        description: "Complete all tasks for an entire year",
        icon: "📅",
        points: 5000,
        color: "gold",
        trigger: Trigger::Streak { days: 365 },
    },
    // Count in a day
    AchievementDef {
        key: "productivity_pro",
        title: "Productivity Pro",
        description: "Complete 10 tasks in a day",
        icon: "🚀",
        points: 50,
        color: "blue",
        trigger: Trigger::CompletedInOneDay { count: 10 },
    },
    AchievementDef {
        key: "task_champion",
        title: "Task Champion",
        description: "Complete 20 tasks in a day",
        icon: "🏅",
        points: 100,
        color: "orange",
        trigger: Trigger::CompletedInOneDay { count: 20 },
    },
    // Cumulative task totals
    AchievementDef {
        key: "first_completion",
        title: "First Steps",
        description: "Complete your first task",
        icon: "🎯",
        points: 5,
        color: "green",
        trigger: Trigger::TotalCompleted { count: 1 },
    },
    AchievementDef {
        key: "task_novice",
        title: "Task Novice",
        description: "Complete 25 total tasks",
        icon: "🎓",
        points: 50,
        color: "green",
        trigger: Trigger::TotalCompleted { count: 25 },
    },
    AchievementDef {
        key: "task_master",
        title: "Task Master",
        description: "Complete 50 tasks total",
        icon: "👑",
        points: 50,
        color: "purple",
        trigger: Trigger::TotalCompleted { count: 50 },
    },
    AchievementDef {
        key: "task_apprentice",
        title: "Task Apprentice",
        description: "Complete 100 total tasks",
        icon: "📚",
        points: 150,
        color: "blue",
        trigger: Trigger::TotalCompleted { count: 100 },
    },
    AchievementDef {
        key: "century_club",
        title: "Century Club",
        description: "Complete your 100th task",
        icon: "💯",
        points: 75,
        color: "purple",
        trigger: Trigger::TotalCompleted { count: 100 },
    },
    AchievementDef {
        key: "task_expert",
        title: "Task Expert",
        description: "Complete 500 total tasks",
        icon: "🎖️",
        points: 300,
        color: "purple",
        trigger: Trigger::TotalCompleted { count: 500 },
    },
    AchievementDef {
        key: "millennium_maker",
        title: "Millennium Maker",
        description: "Complete your 1000th task",
        icon: "🎯",
        points: 200,
        color: "gold",
        trigger: Trigger::TotalCompleted { count: 1000 },
    },
    AchievementDef {
        key: "task_legend",
        title: "Task Legend",
        description: "Complete 5000 total tasks",
        icon: "🏆",
        points: 1000,
        color: "gold",
        trigger: Trigger::TotalCompleted { count: 5000 },
    },
    AchievementDef {
        key: "task_titan",
        title: "Task Titan",
        description: "Complete 10,000 total tasks",
        icon: "🏛️",
        points: 2000,
        color: "gold",
        trigger: Trigger::TotalCompleted { count: 10000 },
    },
    // Cumulative point totals
    AchievementDef {
        key: "point_collector",
        title: "Point Collector",
        description: "Earn 100 total points",
        icon: "💰",
        points: 25,
        color: "green",
        trigger: Trigger::TotalPoints { points: 100 },
    },
    AchievementDef {
        key: "point_hunter",
        title: "Point Hunter",
        description: "Earn 500 total points",
        icon: "🎯",
        points: 75,
        color: "blue",
        trigger: Trigger::TotalPoints { points: 500 },
    },
    AchievementDef {
        key: "point_master",
        title: "Point Master",
        description: "Earn 1000 total points",
        icon: "💎",
        points: 150,
        color: "purple",
        trigger: Trigger::TotalPoints { points: 1000 },
    },
    AchievementDef {
        key: "point_legend",
        title: "Point Legend",
        description: "Earn 5000 total points",
        icon: "👑",
        points: 500,
        color: "gold",
        trigger: Trigger::TotalPoints { points: 5000 },
    },
    AchievementDef {
        key: "accountability_legend",
        title: "Accountability Legend",
        description: "Earn 10,000 total points",
        icon: "🌟",
        points: 2500,
        color: "gold",
        trigger: Trigger::TotalPoints { points: 10000 },
    },
    // Time of day
    AchievementDef {
        key: "early_bird",
        title: "Early Bird",
        description: "Complete all tasks before noon",
        icon: "🌅",
        points: 15,
        color: "orange",
        trigger: Trigger::AllDoneBeforeNoon,
    },
    AchievementDef {
        key: "dawn_patrol",
        title: "Dawn Patrol",
        description: "Complete 3 tasks before 9 AM",
        icon: "🌄",
        points: 40,
        color: "orange",
        trigger: Trigger::CompletedBeforeHour { hour: 9, count: 3 },
    },
    AchievementDef {
        key: "sunrise_warrior",
        title: "Sunrise Warrior",
        description: "Complete 5 tasks before 9 AM",
        icon: "🌅",
        points: 75,
        color: "orange",
        trigger: Trigger::CompletedBeforeHour { hour: 9, count: 5 },
    },
    AchievementDef {
        key: "night_owl",
        title: "Night Owl",
        description: "Complete tasks after 10 PM",
        icon: "🦉",
        points: 10,
        color: "blue",
        trigger: Trigger::CompletedAfterHour { hour: 22, count: 1 },
    },
    AchievementDef {
        key: "midnight_master",
        title: "Midnight Master",
        description: "Complete 3 tasks after 10 PM",
        icon: "🌙",
        points: 40,
        color: "blue",
        trigger: Trigger::CompletedAfterHour { hour: 22, count: 3 },
    },
    AchievementDef {
        key: "late_night_legend",
        title: "Late Night Legend",
        description: "Complete 5 tasks after 10 PM",
        icon: "🦇",
        points: 75,
        color: "blue",
        trigger: Trigger::CompletedAfterHour { hour: 22, count: 5 },
    },
    AchievementDef {
        key: "midnight_magic",
        title: "Midnight Magic",
        description: "Complete a task at exactly midnight (12:00 AM)",
        icon: "✨",
        points: 30,
        color: "purple",
        trigger: Trigger::CompletedAtExactTime { time: "00:00" },
    },
    // Weekend
    AchievementDef {
        key: "weekend_warrior",
        title: "Weekend Warrior",
        description: "Complete all weekend tasks",
        icon: "🏆",
        points: 20,
        color: "green",
        trigger: Trigger::PerfectWeekendDay,
    },
    AchievementDef {
        key: "weekend_master",
        title: "Weekend Master",
        description: "Complete all weekend tasks for 4 weeks",
        icon: "🎉",
        points: 100,
        color: "green",
        trigger: Trigger::WeekendRun { weekends: 4 },
    },
    // Proof
    AchievementDef {
        key: "proof_provider",
        title: "Proof Provider",
        description: "Upload proof for 5 tasks",
        icon: "📸",
        points: 30,
        color: "green",
        trigger: Trigger::ProofCount { count: 5 },
    },
    AchievementDef {
        key: "evidence_expert",
        title: "Evidence Expert",
        description: "Upload proof for 20 tasks",
        icon: "🔍",
        points: 100,
        color: "blue",
        trigger: Trigger::ProofCount { count: 20 },
    },
    AchievementDef {
        key: "documentation_master",
        title: "Documentation Master",
        description: "Upload proof for 50 tasks",
        icon: "📋",
        points: 200,
        color: "purple",
        trigger: Trigger::ProofCount { count: 50 },
    },
    // Speed
    AchievementDef {
        key: "speed_demon",
        title: "Speed Demon",
        description: "Complete 3 tasks within 1 hour",
        icon: "⚡",
        points: 40,
        color: "orange",
        trigger: Trigger::CompletedWithinHours { count: 3, hours: 1 },
    },
    AchievementDef {
        key: "lightning_fast",
        title: "Lightning Fast",
        description: "Complete 5 tasks within 2 hours",
        icon: "🌩️",
        points: 75,
        color: "blue",
        trigger: Trigger::CompletedWithinHours { count: 5, hours: 2 },
    },
    AchievementDef {
        key: "supersonic",
        title: "Supersonic",
        description: "Complete 10 tasks within 4 hours",
        icon: "🚀",
        points: 150,
        color: "purple",
        trigger: Trigger::CompletedWithinHours { count: 10, hours: 4 },
    },
    // Consistency
    AchievementDef {
        key: "same_time_same_place",
        title: "Same Time, Same Place",
        description: "Complete tasks at the same hour for 7 consecutive days",
        icon: "⏰",
        points: 80,
        color: "blue",
        trigger: Trigger::SameHourRun { days: 7 },
    },
    AchievementDef {
        key: "routine_master",
        title: "Routine Master",
        description: "Complete the same task title for 14 consecutive days",
        icon: "🔄",
        points: 100,
        color: "purple",
        trigger: Trigger::SameTitleRun { days: 14 },
    },
    // Calendar dates
    AchievementDef {
        key: "new_years_resolution",
        title: "New Year's Resolution",
        description: "Complete tasks on January 1st",
        icon: "🎊",
        points: 30,
        color: "gold",
        trigger: Trigger::OnMonthDay { month: 1, day: 1, min_completed: 1 },
    },
    AchievementDef {
        key: "valentines_helper",
        title: "Valentine's Helper",
        description: "Complete tasks on February 14th",
        icon: "💝",
        points: 25,
        color: "pink",
        trigger: Trigger::OnMonthDay { month: 2, day: 14, min_completed: 1 },
    },
    AchievementDef {
        key: "spring_cleaner",
        title: "Spring Cleaner",
        description: "Complete 5 tasks on the first day of spring",
        icon: "🌸",
        points: 40,
        color: "green",
        trigger: Trigger::OnMonthDay { month: 3, day: 20, min_completed: 5 },
    },
    AchievementDef {
        key: "summer_solstice",
        title: "Summer Solstice",
        description: "Complete tasks on the longest day of the year",
        icon: "☀️",
        points: 30,
        color: "orange",
        trigger: Trigger::OnMonthDay { month: 6, day: 21, min_completed: 1 },
    },
    AchievementDef {
        key: "autumn_achiever",
        title: "Autumn Achiever",
        description: "Complete tasks on the first day of autumn",
        icon: "🍂",
        points: 30,
        color: "orange",
        trigger: Trigger::OnMonthDay { month: 9, day: 22, min_completed: 1 },
    },
    AchievementDef {
        key: "winter_warrior",
        title: "Winter Warrior",
        description: "Complete tasks on the shortest day of the year",
        icon: "❄️",
        points: 30,
        color: "blue",
        trigger: Trigger::OnMonthDay { month: 12, day: 21, min_completed: 1 },
    },
    AchievementDef {
        key: "palindrome_day",
        title: "Palindrome Day",
        description: "Complete tasks on a date that reads the same forwards/backwards",
        icon: "🔄",
        points: 30,
        color: "purple",
        trigger: Trigger::PalindromeDate,
    },
    AchievementDef {
        key: "leap_year_legend",
        title: "Leap Year Legend",
        description: "Complete tasks on February 29th",
        icon: "🐸",
        points: 50,
        color: "green",
        trigger: Trigger::LeapDay,
    },
    AchievementDef {
        key: "lucky_seven",
        title: "Lucky Seven",
        description: "Complete a task on the 7th, 17th, or 27th of any month",
        icon: "🍀",
        points: 20,
        color: "green",
        trigger: Trigger::OnDayOfMonth { days: &[7, 17, 27] },
    },
    // Comeback & penalties
    AchievementDef {
        key: "comeback_king",
        title: "Comeback King",
        description: "Go from <50% to 100% completion",
        icon: "⚡",
        points: 15,
        color: "blue",
        trigger: Trigger::Comeback,
    },
    AchievementDef {
        key: "penalty_king",
        title: "Penalty King",
        description: "Most penalties in a week",
        icon: "💸",
        points: 20,
        color: "red",
        trigger: Trigger::MostPenaltiesThisWeek { min_count: 3 },
    },
];
