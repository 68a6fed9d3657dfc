use anyhow::{Context, Result, bail};
use log::{info, warn};
use serde_json::Value;
use std::io::Read;
use std::path::Path;

use crate::models::Habit;

/// Path value that means "read the feed from stdin".
pub const STDIN_MARKER: &str = "-";

/// Parse a habits feed: either a bare array or `{ "habits": [...] }`.
///
/// Records that fail to deserialize are logged and skipped so the remaining
/// habits still load.
pub fn parse_habits(json: &str) -> Result<Vec<Habit>> {
    let payload: Value = serde_json::from_str(json).context("Parsing habits feed")?;
    let records = match payload {
        Value::Array(records) => records,
        Value::Object(mut body) => match body.remove("habits") {
            Some(Value::Array(records)) => records,
            Some(other) => bail!("Expected `habits` to be an array, found {}", kind(&other)),
            None => bail!("Habits feed object has no `habits` array"),
        },
        other => bail!(
            "Expected an array of habits or an object with `habits`, found {}",
            kind(&other)
        ),
    };

    let mut habits = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        match serde_json::from_value::<Habit>(record) {
            Ok(habit) => habits.push(habit),
            Err(e) => warn!("Skipping habit record #{}: {}", index, e),
        }
    }
    Ok(habits)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Read a habits feed from a file, or from stdin when the path is `-`.
pub fn read_habits(path: &Path) -> Result<Vec<Habit>> {
    let content = if path.as_os_str() == STDIN_MARKER {
        let mut buf = String::new();
        std::io::stdin()
            .lock()
            .read_to_string(&mut buf)
            .context("Reading habits feed from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path).with_context(|| format!("Reading {:?}", path))?
    };

    let habits = parse_habits(&content).with_context(|| format!("Loading {:?}", path))?;
    info!("Loaded {} habits from {:?}", habits.len(), path);
    Ok(habits)
}

pub fn find_habit<'a>(habits: &'a [Habit], id: &str) -> Option<&'a Habit> {
    habits.iter().find(|h| h.id == id)
}
