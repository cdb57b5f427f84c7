use crate::models::{DerivedStats, MoodEntry};
use chrono::{NaiveDate, TimeZone};
use std::collections::HashSet;

/// Number of most recent entries feeding the average and the trend line.
pub const WINDOW: usize = 30;

/// Shown in place of the average when the log is empty.
pub const NO_DATA: &str = "—";

pub fn build_stats_at<Tz: TimeZone>(today: NaiveDate, tz: &Tz, entries: &[MoodEntry]) -> DerivedStats {
    DerivedStats {
        count: entries.len(),
        average: rolling_average(entries),
        streak: streak_at(today, tz, entries),
        trend: trend_series(entries),
    }
}

fn recent(entries: &[MoodEntry]) -> &[MoodEntry] {
    &entries[..entries.len().min(WINDOW)]
}

/// Mean mood of the newest `WINDOW` entries, rounded to two decimals.
pub fn rolling_average(entries: &[MoodEntry]) -> Option<f64> {
    let window = recent(entries);
    if window.is_empty() {
        return None;
    }

    let sum: u32 = window.iter().map(|entry| u32::from(entry.value.get())).sum();
    let mean = f64::from(sum) / window.len() as f64;
    Some((mean * 100.0).round() / 100.0)
}

pub fn format_average(average: Option<f64>) -> String {
    match average {
        Some(value) => format!("{value:.2}"),
        None => NO_DATA.to_string(),
    }
}

/// Consecutive calendar days, ending today, with at least one check-in.
///
/// Entries are bucketed by their date in `tz`; the walk steps back one
/// calendar date at a time, so a DST shift never skips or repeats a day.
pub fn streak_at<Tz: TimeZone>(today: NaiveDate, tz: &Tz, entries: &[MoodEntry]) -> u32 {
    let days: HashSet<NaiveDate> = entries
        .iter()
        .map(|entry| entry.date.with_timezone(tz).date_naive())
        .collect();

    let mut streak = 0;
    let mut day = Some(today);
    while let Some(current) = day.filter(|d| days.contains(d)) {
        streak += 1;
        day = current.pred_opt();
    }
    streak
}

/// Newest `WINDOW` mood values, oldest first for left-to-right plotting.
pub fn trend_series(entries: &[MoodEntry]) -> Vec<u8> {
    recent(entries)
        .iter()
        .rev()
        .map(|entry| entry.value.get())
        .collect()
}
