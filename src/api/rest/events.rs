//! Event endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{error, info, warn};

use super::ApiError;
use crate::api::state::AppState;
use crate::codec;
use crate::event_store::record::is_storable_type;
use crate::event_store::SharedEventStore;
use crate::types::Event;
use crate::utils::time::{format_instant, parse_instant};

/// POST /events/:type - Append an event and persist the store
///
/// Types containing `,`, `\n` or `\r` are rejected with 400: the record
/// format stores the type unescaped.
pub async fn append_event(
    State(state): State<Arc<AppState>>,
    Path(event_type): Path<String>,
    payload: String,
) -> Result<StatusCode, ApiError> {
    if !is_storable_type(&event_type) {
        warn!(event_type = %event_type.escape_debug(), "rejected event type");
        return Err(ApiError::bad_request(
            "Event type must not contain ',', '\\n' or '\\r'",
        ));
    }

    let store = state.store.clone();
    let event = tokio::task::spawn_blocking(move || store.append_and_persist(&event_type, &payload))
        .await
        .map_err(|e| ApiError::internal(format!("Append task failed: {}", e)))?
        .map_err(|e| {
            error!(error = %e, "event not committed");
            ApiError::internal(format!("Event not stored: {}", e))
        })?;

    info!(
        event_type = %event.event_type(),
        timestamp = %format_instant(&event.timestamp()),
        "stored event"
    );
    Ok(StatusCode::CREATED)
}

/// GET /events - All events
pub async fn list_events(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let events = read_store(&state, |store| store.all_events()).await?;
    Ok(json_response(render_events(&events)))
}

/// GET /events/:type_or_instant - Events from an instant on, or of one type
///
/// The segment is tried as an instant first; anything that does not parse
/// is taken as an event type.
pub async fn query_events(
    State(state): State<Arc<AppState>>,
    Path(type_or_instant): Path<String>,
) -> Result<Response, ApiError> {
    let events = match parse_instant(&type_or_instant) {
        Some(from) => read_store(&state, move |store| store.events_from(from)).await?,
        None => read_store(&state, move |store| store.events_of_type(&type_or_instant)).await?,
    };

    Ok(json_response(render_events(&events)))
}

/// Run a query off the async workers; a writer may hold the lock across fsync
async fn read_store<F>(state: &AppState, query: F) -> Result<Vec<Event>, ApiError>
where
    F: FnOnce(&SharedEventStore) -> Vec<Event> + Send + 'static,
{
    let store = state.store.clone();
    tokio::task::spawn_blocking(move || query(&store))
        .await
        .map_err(|e| ApiError::internal(format!("Query task failed: {}", e)))
}

/// Render events as a pretty-printed JSON array (two-space indent)
///
/// ```text
/// [
///   {
///     "date": "2024-03-01T10:00:00Z",
///     "type": "com.example.type",
///     "data": "payload"
///   }
/// ]
/// ```
pub fn render_events(events: &[Event]) -> String {
    let items: Vec<String> = events.iter().map(render_event).collect();
    format!("[\n{}\n]", items.join(",\n"))
}

fn render_event(event: &Event) -> String {
    format!(
        "  {{\n    \"date\": \"{}\",\n    \"type\": \"{}\",\n    \"data\": \"{}\"\n  }}",
        format_instant(&event.timestamp()),
        codec::serialize(event.event_type()),
        codec::serialize(event.payload())
    )
}

fn json_response(body: String) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_render_empty() {
        assert_eq!(render_events(&[]), "[\n\n]");
    }

    #[test]
    fn test_render_events() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let events = vec![
            Event::new(at, "com.example.typeA", "data0"),
            Event::new(at, "com.example.typeB", "say \"hi\"\n"),
        ];

        assert_eq!(
            render_events(&events),
            "[\n  {\n    \"date\": \"2024-03-01T10:00:00Z\",\n    \"type\": \"com.example.typeA\",\n    \"data\": \"data0\"\n  },\n  {\n    \"date\": \"2024-03-01T10:00:00Z\",\n    \"type\": \"com.example.typeB\",\n    \"data\": \"say \\\"hi\\\"\\n\"\n  }\n]"
        );
    }

    #[test]
    fn test_rendered_output_is_valid_json() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let events = vec![Event::new(at, "t", "a/b\\c\t\u{8}\u{c}\"")];

        let parsed: serde_json::Value = serde_json::from_str(&render_events(&events)).unwrap();

        assert_eq!(parsed[0]["data"], "a/b\\c\t\u{8}\u{c}\"");
        assert_eq!(parsed[0]["type"], "t");
        assert_eq!(parsed[0]["date"], "2024-03-01T10:00:00Z");
    }
}
