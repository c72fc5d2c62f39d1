//! On-disk record format
//!
//! One event per line: `<instant>,<type>,<payload>`. Only the payload is
//! escaped, and only enough to keep it on one line: a newline is written as
//! `\n` and a backslash as `\\`. Everything else, commas included, is raw.
//! Lines are split into at most three fields so payload commas survive.

use super::store::{EventStoreError, EventStoreResult};
use crate::types::Event;
use crate::utils::time::{format_instant, parse_instant};

/// Characters a type cannot carry: the type field is written unescaped
pub const RESERVED_TYPE_CHARS: [char; 3] = [',', '\n', '\r'];

/// Whether a type survives a write and reload unchanged
pub fn is_storable_type(event_type: &str) -> bool {
    !event_type.contains(RESERVED_TYPE_CHARS)
}

/// Encode an event as a single record line, without the line terminator
pub fn encode(event: &Event) -> String {
    format!(
        "{},{},{}",
        format_instant(&event.timestamp()),
        event.event_type(),
        escape_payload(event.payload())
    )
}

/// Decode one record line
///
/// `line_number` is 1-based and only used for error reporting.
pub fn decode(line: &str, line_number: usize) -> EventStoreResult<Event> {
    let mut fields = line.splitn(3, ',');

    let (Some(timestamp), Some(event_type), Some(payload)) =
        (fields.next(), fields.next(), fields.next())
    else {
        return Err(EventStoreError::MalformedRecord {
            line: line_number,
            reason: "expected `timestamp,type,payload`".to_string(),
        });
    };

    let timestamp = parse_instant(timestamp).ok_or_else(|| EventStoreError::InvalidTimestamp {
        line: line_number,
        value: timestamp.to_string(),
    })?;

    Ok(Event::new(timestamp, event_type, unescape_payload(payload)))
}

fn escape_payload(payload: &str) -> String {
    payload.replace('\\', "\\\\").replace('\n', "\\n")
}

/// Inverse of `escape_payload`; unknown backslash sequences are kept verbatim
fn unescape_payload(escaped: &str) -> String {
    let mut payload = String::with_capacity(escaped.len());
    let mut chars = escaped.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            payload.push(c);
            continue;
        }
        match chars.peek() {
            Some('n') => {
                chars.next();
                payload.push('\n');
            }
            Some('\\') => {
                chars.next();
                payload.push('\\');
            }
            _ => payload.push('\\'),
        }
    }

    payload
}
