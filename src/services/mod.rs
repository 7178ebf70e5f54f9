pub mod catalog;
pub mod evaluator;
pub mod penalties;
pub mod scheduler;
pub mod streak;
pub mod tasks;

pub use catalog::{AchievementDef, CATALOG, Trigger};
pub use evaluator::AchievementService;
pub use penalties::{PenaltyService, PenaltySummaryEntry};
pub use scheduler::RolloverScheduler;
pub use tasks::TaskService;
