pub mod habit;
pub mod stats;

pub use habit::Habit;
pub use stats::{DailyCount, DashboardStats, DayMark, HabitProgress, Streak, StreakEntry};
