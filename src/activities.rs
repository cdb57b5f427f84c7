use crate::models::{MoodEntry, MoodValue};

pub const DEFAULT_ACTIVITIES: &[&str] = &[
    "2-minute breathing",
    "Gratitude: 1 thing",
    "Walk for 5 min",
    "Stretch",
    "Write 1 sentence",
];

const VERY_LOW: &[&str] = &[
    "Slow 2-minute breathing",
    "Drink a glass of water",
    "Message someone you trust",
    "Write 1 thing that’s hard right now",
];

const LOW: &[&str] = &[
    "Short walk (3–5 min)",
    "Note 1 thing that went okay today",
    "Gentle stretching for 2 min",
];

const NEUTRAL: &[&str] = &[
    "Gratitude: 2 small things",
    "Plan 1 nice thing for later",
    "Tidy one small area",
];

const GOOD: &[&str] = &[
    "Celebrate 1 win from today",
    "Do something fun for 5 min",
    "Send a kind message to someone",
];

const GREAT: &[&str] = &[
    "Capture this mood in 1 sentence",
    "Do a quick dance or stretch",
    "Start a small project you’ve been delaying",
];

const SEPARATOR: &str = " | ";

pub fn activities_for(mood: Option<MoodValue>) -> &'static [&'static str] {
    match mood.map(MoodValue::get) {
        Some(1) => VERY_LOW,
        Some(2) => LOW,
        Some(3) => NEUTRAL,
        Some(4) => GOOD,
        Some(5) => GREAT,
        _ => DEFAULT_ACTIVITIES,
    }
}

/// Mood that drives the suggestions: the explicit selection, else the newest
/// logged entry.
pub fn mood_for_activities(selected: Option<MoodValue>, entries: &[MoodEntry]) -> Option<MoodValue> {
    selected.or_else(|| entries.first().map(|entry| entry.value))
}

/// Adds `label` to the note unless the note already contains it.
pub fn append_activity(note: &str, label: &str) -> String {
    let label = label.trim();
    if label.is_empty() || note.contains(label) {
        note.to_string()
    } else if note.is_empty() {
        label.to_string()
    } else {
        format!("{note}{SEPARATOR}{label}")
    }
}
