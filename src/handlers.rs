use crate::activities::{activities_for, append_activity};
use crate::errors::AppError;
use crate::export::{to_csv, CSV_CONTENT_TYPE, CSV_FILE_NAME};
use crate::feedback::FeedbackStatus;
use crate::history::{build_dashboard, HistoryRange};
use crate::models::{
    ActivitiesQuery, ActivitiesResponse, ApplyActivityRequest, ApplyActivityResponse,
    CheckinRequest, CheckinResponse, ClearQuery, ClearResponse, Dashboard, DashboardQuery,
    MoodEntry, MoodValue, RelayReply, RelayRequest,
};
use crate::relay::{relay_reply, RELAY_FALLBACK};
use crate::state::AppState;
use crate::ui::render_index;
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::header,
    response::{Html, IntoResponse},
    Json,
};
use tracing::{info, warn};

pub const SELECT_MOOD_PROMPT: &str = "Please select your mood (tap an emoji).";
pub const NOTHING_TO_EXPORT: &str = "No entries to export.";
pub const CONFIRM_CLEAR: &str = "Clear ALL entries? This cannot be undone. Repeat with confirm=true.";

fn selected_mood(raw: Option<&str>) -> Option<MoodValue> {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .and_then(|value| MoodValue::try_from(value).ok())
}

pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Html<String> {
    let entries = state.store.read_all().await;
    let range = HistoryRange::from_query(query.range.as_deref());
    let dashboard = build_dashboard(&entries, range, selected_mood(query.mood.as_deref()));
    Html(render_index(&dashboard, range))
}

pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Json<Dashboard> {
    let entries = state.store.read_all().await;
    let range = HistoryRange::from_query(query.range.as_deref());
    Json(build_dashboard(&entries, range, selected_mood(query.mood.as_deref())))
}

pub async fn checkin(
    State(state): State<AppState>,
    Json(payload): Json<CheckinRequest>,
) -> Result<Json<CheckinResponse>, AppError> {
    let raw = payload
        .mood_value
        .ok_or_else(|| AppError::bad_request(SELECT_MOOD_PROMPT))?;
    let value = MoodValue::try_from(raw)?;

    let in_flight = state
        .feedback
        .begin()
        .map_err(|busy| AppError::conflict(busy.to_string()))?;

    let note = payload.note.unwrap_or_default().trim().to_string();
    let entry = MoodEntry::new(value, note.clone());
    state.store.append(entry.clone()).await;
    info!(mood = value.get(), "check-in saved");

    let _ = in_flight.dispatch(RelayRequest {
        mood_value: i64::from(value.get()),
        note,
    });

    let entries = state.store.read_all().await;
    let range = HistoryRange::from_query(payload.range.as_deref());

    Ok(Json(CheckinResponse {
        entry,
        dashboard: build_dashboard(&entries, range, None),
        feedback: state.feedback.status(),
    }))
}

pub async fn get_feedback(State(state): State<AppState>) -> Json<FeedbackStatus> {
    Json(state.feedback.status())
}

pub async fn get_activities(Query(query): Query<ActivitiesQuery>) -> Json<ActivitiesResponse> {
    let mood = selected_mood(query.mood.as_deref());
    Json(ActivitiesResponse {
        mood: mood.map(MoodValue::get),
        activities: activities_for(mood)
            .iter()
            .map(|label| label.to_string())
            .collect(),
    })
}

pub async fn apply_activity(Json(payload): Json<ApplyActivityRequest>) -> Json<ApplyActivityResponse> {
    Json(ApplyActivityResponse {
        note: append_activity(&payload.note, &payload.label),
    })
}

pub async fn export_csv(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let entries = state.store.read_all().await;
    if entries.is_empty() {
        return Err(AppError::not_found(NOTHING_TO_EXPORT));
    }

    let headers = [
        (header::CONTENT_TYPE, CSV_CONTENT_TYPE.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{CSV_FILE_NAME}\""),
        ),
    ];
    Ok((headers, to_csv(&entries)))
}

pub async fn clear_entries(
    State(state): State<AppState>,
    Query(query): Query<ClearQuery>,
) -> Result<Json<ClearResponse>, AppError> {
    if !query.confirm {
        return Err(AppError::bad_request(CONFIRM_CLEAR));
    }

    state.store.clear_all().await?;
    info!("all entries cleared");
    Ok(Json(ClearResponse { cleared: true }))
}

/// Relay endpoint. Always answers `{ reply }`, even for unreadable bodies.
pub async fn ai_response(
    State(state): State<AppState>,
    payload: Result<Json<RelayRequest>, JsonRejection>,
) -> Json<RelayReply> {
    match payload {
        Ok(Json(request)) => Json(relay_reply(state.generator.as_ref(), &request).await),
        Err(rejection) => {
            warn!(error = %rejection, "unreadable relay request");
            Json(RelayReply {
                reply: Some(RELAY_FALLBACK.to_string()),
            })
        }
    }
}
