pub mod calculator;
pub mod history;
pub mod report;

pub use report::ProgressReporter;
