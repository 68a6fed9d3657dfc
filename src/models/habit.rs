use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_CATEGORY: &str = "Other";

/// Projection of a habit record as returned by the habits API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "HabitRecord")]
pub struct Habit {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub reminder_time: Option<String>,
    pub is_public: bool,
    /// Raw `YYYY-MM-DD` (or RFC 3339) strings, parsed lazily so one bad
    /// entry never rejects the whole record.
    pub completion_history: Vec<String>,
    pub current_streak: Option<u32>,
    pub longest_streak: Option<u32>,
    pub created_at: Option<String>,
    pub user_email: Option<String>,
}

impl Habit {
    pub fn category_or_default(&self) -> &str {
        self.category
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(DEFAULT_CATEGORY)
    }

    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            "Habit"
        } else {
            &self.title
        }
    }
}

/// Wire shape of a habit. Every field tolerates `null`, and both `_id` and
/// the `id` virtual may be present at once.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HabitRecord {
    #[serde(rename = "_id")]
    mongo_id: Option<String>,
    id: Option<String>,
    title: Option<String>,
    description: Option<String>,
    category: Option<String>,
    reminder_time: Option<String>,
    is_public: Option<bool>,
    completion_history: Option<Vec<Value>>,
    current_streak: Option<u32>,
    longest_streak: Option<u32>,
    created_at: Option<String>,
    user_email: Option<String>,
}

impl TryFrom<HabitRecord> for Habit {
    type Error = String;

    fn try_from(record: HabitRecord) -> Result<Self, Self::Error> {
        let id = record
            .mongo_id
            .or(record.id)
            .ok_or_else(|| "habit record has neither `_id` nor `id`".to_string())?;

        // Non-string entries keep their JSON text so the history parser
        // counts them as rejected instead of silently dropping them.
        let completion_history = record
            .completion_history
            .unwrap_or_default()
            .into_iter()
            .map(|entry| match entry {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect();

        Ok(Habit {
            id,
            title: record.title.unwrap_or_default(),
            description: record.description,
            category: record.category,
            reminder_time: record.reminder_time,
            is_public: record.is_public.unwrap_or(false),
            completion_history,
            current_streak: record.current_streak,
            longest_streak: record.longest_streak,
            created_at: record.created_at,
            user_email: record.user_email,
        })
    }
}
