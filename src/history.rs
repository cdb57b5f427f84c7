use crate::activities::{activities_for, mood_for_activities};
use crate::models::{Dashboard, DerivedStats, MoodEntry, MoodValue};
use crate::sparkline::Sparkline;
use crate::stats::{build_stats_at, format_average};
use chrono::{Local, NaiveDate, SecondsFormat, TimeZone};
use std::{fmt::Write, str::FromStr};

pub const EMPTY_HISTORY: &str = "No entries yet — try a check-in.";
const NO_NOTE: &str = "(no note)";
const TIME_FORMAT: &str = "%b %-d, %Y, %-I:%M %p";

/// How many of the newest entries the history list shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryRange {
    Recent(usize),
    All,
}

impl Default for HistoryRange {
    fn default() -> Self {
        Self::Recent(7)
    }
}

impl FromStr for HistoryRange {
    type Err = std::num::ParseIntError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        match value.parse::<usize>()? {
            365 => Ok(Self::All),
            0 => Ok(Self::default()),
            count => Ok(Self::Recent(count)),
        }
    }
}

impl HistoryRange {
    pub fn from_query(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }

    pub fn slice(self, entries: &[MoodEntry]) -> &[MoodEntry] {
        match self {
            Self::All => entries,
            Self::Recent(count) => &entries[..entries.len().min(count)],
        }
    }
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn render_history<Tz>(entries: &[MoodEntry], range: HistoryRange, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let shown = range.slice(entries);
    if shown.is_empty() {
        return format!(r#"<li class="muted">{EMPTY_HISTORY}</li>"#);
    }

    let mut html = String::new();
    for entry in shown {
        let note = if entry.note.is_empty() {
            format!(r#"<span class="muted">{NO_NOTE}</span>"#)
        } else {
            escape_html(&entry.note)
        };
        let local = entry.date.with_timezone(tz);
        let _ = write!(
            html,
            r#"<li><div><strong title="{label}">{glyph}</strong> {note}</div><div><time datetime="{iso}">{when}</time></div></li>"#,
            label = entry.value.label(),
            glyph = entry.value.glyph(),
            iso = entry.date.to_rfc3339_opts(SecondsFormat::Millis, true),
            when = local.format(TIME_FORMAT),
        );
    }
    html
}

pub fn render_stats_block(stats: &DerivedStats) -> String {
    format!(
        concat!(
            r#"<div class="stat"><span class="label">Entries</span><span class="value" id="entriesCount">{count}</span></div>"#,
            r#"<div class="stat"><span class="label">Avg (last 30)</span><span class="value" id="avgMood">{average}</span></div>"#,
            r#"<div class="stat"><span class="label">Day streak</span><span class="value" id="streak">{streak}</span></div>"#,
        ),
        count = stats.count,
        average = format_average(stats.average),
        streak = stats.streak,
    )
}

pub fn build_dashboard(entries: &[MoodEntry], range: HistoryRange, selected: Option<MoodValue>) -> Dashboard {
    build_dashboard_at(
        entries,
        range,
        selected,
        Local::now().date_naive(),
        &Local,
        &Sparkline::default(),
    )
}

/// Recomputes everything the page shows from the log and the caller's view
/// state.
pub fn build_dashboard_at<Tz>(
    entries: &[MoodEntry],
    range: HistoryRange,
    selected: Option<MoodValue>,
    today: NaiveDate,
    tz: &Tz,
    sparkline: &Sparkline,
) -> Dashboard
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let stats = build_stats_at(today, tz, entries);
    let activity_mood = mood_for_activities(selected, entries);

    Dashboard {
        average_display: format_average(stats.average),
        history_html: render_history(entries, range, tz),
        stats_html: render_stats_block(&stats),
        sparkline_svg: sparkline.to_svg(&stats.trend),
        activity_mood: activity_mood.map(MoodValue::get),
        activities: activities_for(activity_mood)
            .iter()
            .map(|label| label.to_string())
            .collect(),
        stats,
    }
}
