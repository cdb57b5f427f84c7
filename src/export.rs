use crate::models::MoodEntry;
use chrono::SecondsFormat;

pub const CSV_FILE_NAME: &str = "mood_entries.csv";
pub const CSV_CONTENT_TYPE: &str = "text/csv";

const HEADER: &str = "date,mood,note";

/// Serializes the log oldest-first, one record per line.
pub fn to_csv(entries: &[MoodEntry]) -> String {
    let mut lines = Vec::with_capacity(entries.len() + 1);
    lines.push(HEADER.to_string());

    for entry in entries.iter().rev() {
        lines.push(format!(
            "{},{},{}",
            entry.date.to_rfc3339_opts(SecondsFormat::Millis, true),
            entry.value,
            quote_note(&entry.note)
        ));
    }

    lines.join("\n")
}

fn quote_note(note: &str) -> String {
    let flat = note.replace("\r\n", " ").replace(['\r', '\n'], " ");
    format!("\"{}\"", flat.replace('"', "\"\""))
}
