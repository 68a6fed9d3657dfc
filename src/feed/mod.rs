pub mod query;
pub mod source;

pub use query::{HabitQuery, SortOrder};
pub use source::{find_habit, read_habits};
