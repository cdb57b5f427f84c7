use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A discrete mood rating, 1 (very low) through 5 (great).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct MoodValue(u8);

#[derive(Debug, thiserror::Error)]
#[error("mood value must be between 1 and 5, got {0}")]
pub struct InvalidMood(pub i64);

const LABELS: [&str; 5] = ["very low", "low", "neutral", "good", "great"];
const GLYPHS: [&str; 5] = ["😞", "😕", "😐", "🙂", "😄"];

impl MoodValue {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&value).then_some(Self(value))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn label(self) -> &'static str {
        LABELS[usize::from(self.0 - 1)]
    }

    pub fn glyph(self) -> &'static str {
        GLYPHS[usize::from(self.0 - 1)]
    }
}

impl TryFrom<i64> for MoodValue {
    type Error = InvalidMood;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .ok()
            .and_then(Self::new)
            .ok_or(InvalidMood(value))
    }
}

impl From<MoodValue> for u8 {
    fn from(value: MoodValue) -> Self {
        value.0
    }
}

impl fmt::Display for MoodValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One check-in. Entries are never edited after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodEntry {
    pub value: MoodValue,
    #[serde(default)]
    pub note: String,
    pub date: DateTime<Utc>,
}

impl MoodEntry {
    pub fn new(value: MoodValue, note: impl Into<String>) -> Self {
        Self::at(value, note, Utc::now())
    }

    pub fn at(value: MoodValue, note: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            value,
            note: note.into(),
            date: date.trunc_subsecs(3),
        }
    }
}

/// Everything derived from the log on each render; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedStats {
    pub count: usize,
    pub average: Option<f64>,
    pub streak: u32,
    pub trend: Vec<u8>,
}

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub stats: DerivedStats,
    pub average_display: String,
    pub history_html: String,
    pub stats_html: String,
    pub sparkline_svg: String,
    pub activity_mood: Option<u8>,
    pub activities: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckinRequest {
    pub mood_value: Option<i64>,
    pub note: Option<String>,
    pub range: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckinResponse {
    pub entry: MoodEntry,
    pub dashboard: Dashboard,
    pub feedback: crate::feedback::FeedbackStatus,
}

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub range: Option<String>,
    pub mood: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ActivitiesQuery {
    pub mood: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ActivitiesResponse {
    pub mood: Option<u8>,
    pub activities: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApplyActivityRequest {
    #[serde(default)]
    pub note: String,
    pub label: String,
}

#[derive(Debug, Serialize)]
pub struct ApplyActivityResponse {
    pub note: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClearQuery {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub cleared: bool,
}

/// Body sent to the relay endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayRequest {
    pub mood_value: i64,
    #[serde(default)]
    pub note: String,
}

/// Body returned by the relay endpoint. The reply may be absent when the
/// relay answers with an unexpected shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayReply {
    #[serde(default)]
    pub reply: Option<String>,
}
