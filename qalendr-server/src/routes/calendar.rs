//! Calendar download endpoint

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Router,
};
use chrono::{Datelike, Utc};

use qalendr_core::ics::{generate_calendar_name, generate_filename, generate_ics, IcsOptions};
use qalendr_core::load_events;

use crate::query::CalendarQuery;
use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/calendar", get(download_calendar))
}

/// GET /api/calendar - Resolve the selection and serve an .ics download
async fn download_calendar(
    State(state): State<AppState>,
    Query(query): Query<CalendarQuery>,
) -> Result<impl IntoResponse, AppError> {
    let now = Utc::now();
    let selection = query.into_selection(now.year());
    let data = state.dataset();

    let events = load_events(data, &selection)?;
    if events.is_empty() {
        return Err(AppError::NotFound(
            "Keine Termine für die ausgewählte Konfiguration gefunden".to_string(),
        ));
    }

    let region_names: Vec<String> = selection
        .regions
        .iter()
        .map(|code| {
            data.region_by_code(code)
                .map(|region| region.name.clone())
                .unwrap_or_else(|| code.clone())
        })
        .collect();
    let calendar_name = generate_calendar_name(&region_names, &selection.categories);

    let options = IcsOptions {
        calendar_name: Some(calendar_name),
        calendar_description: Some(
            "Feiertage, Ferien und besondere Tage von Qalendr".to_string(),
        ),
        ..IcsOptions::default()
    };
    let ics = generate_ics(&events, &options, now);
    let filename = generate_filename(&selection.regions, selection.year);

    Ok((
        [
            (
                header::CONTENT_TYPE,
                "text/calendar; charset=utf-8".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
            (
                header::CACHE_CONTROL,
                "public, max-age=3600, stale-while-revalidate=86400".to_string(),
            ),
        ],
        ics,
    ))
}
