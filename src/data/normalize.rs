//! Wire-shape normalization
//!
//! The backend is loose about field names and response envelopes. Every
//! record is decoded here, once, into the canonical models; consumers above
//! the gateway never check aliases.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use super::models::{
    Notification, Priority, Rating, Role, StatusHistoryEntry, Ticket, TicketId, TicketStatus,
    UserProfile,
};

/// Ticket record exactly as the backend may send it
///
/// Every field is kept as raw JSON so a value of an unexpected scalar type
/// degrades to text (or to nothing) instead of failing the whole record.
#[derive(Debug, Default, Deserialize)]
pub struct RawTicket {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub ticket_id: Option<Value>,
    #[serde(default)]
    pub ticket_number: Option<Value>,
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default)]
    pub complaint: Option<Value>,
    #[serde(default)]
    pub description: Option<Value>,
    #[serde(default)]
    pub job_type: Option<Value>,
    #[serde(default)]
    pub category: Option<Value>,
    #[serde(default)]
    pub location: Option<Value>,
    #[serde(default)]
    pub priority: Option<Value>,
    #[serde(default)]
    pub status: Option<Value>,
    #[serde(default)]
    pub created_at: Option<Value>,
    #[serde(default)]
    pub resident_name: Option<Value>,
    #[serde(default)]
    pub tenant_name: Option<Value>,
    #[serde(default)]
    pub special_note: Option<Value>,
    #[serde(default)]
    pub technician_name: Option<Value>,
}

/// Render a scalar JSON value as text; objects, arrays and blanks yield None
fn scalar_text(value: &Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(text)) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Some(Value::Number(number)) => Some(number.to_string()),
        _ => None,
    }
}

fn first_text(candidates: &[&Option<Value>]) -> Option<String> {
    candidates.iter().find_map(|c| scalar_text(c))
}

/// Build the canonical ticket
///
/// Returns `None` when the record carries no usable identifier at all.
pub fn ticket(raw: RawTicket) -> Option<Ticket> {
    let reference = scalar_text(&raw.ticket_id).or_else(|| scalar_text(&raw.ticket_number));
    let id = scalar_text(&raw.id).or_else(|| reference.clone())?;

    Some(Ticket {
        reference: reference.unwrap_or_else(|| id.clone()),
        id: TicketId(id),
        title: scalar_text(&raw.title).unwrap_or_default(),
        description: first_text(&[&raw.complaint, &raw.description]).unwrap_or_default(),
        category: first_text(&[&raw.job_type, &raw.category]).unwrap_or_default(),
        location: scalar_text(&raw.location).unwrap_or_default(),
        priority: scalar_text(&raw.priority)
            .map(|p| Priority::parse(&p))
            .unwrap_or_default(),
        status: scalar_text(&raw.status)
            .map(|s| TicketStatus::parse(&s))
            .unwrap_or_default(),
        created_at: scalar_text(&raw.created_at).and_then(|ts| parse_timestamp(&ts)),
        resident_name: first_text(&[&raw.resident_name, &raw.tenant_name]),
        special_note: first_text(&[&raw.special_note]),
        technician_name: first_text(&[&raw.technician_name]),
    })
}

/// Parse RFC 3339 or a naive ISO timestamp (taken as UTC)
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Take the array under `key`, or the body itself when it is already an array
pub fn unwrap_list(body: Value, key: &str) -> Result<Vec<Value>, String> {
    match body {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove(key) {
            Some(Value::Array(items)) => Ok(items),
            Some(Value::Null) | None => Err(format!("response has no `{}` list", key)),
            Some(_) => Err(format!("`{}` is not a list", key)),
        },
        Value::Null => Ok(Vec::new()),
        _ => Err("response is neither a list nor an object".to_string()),
    }
}

/// Take the object under `key`, or the body itself when it has no such key
pub fn unwrap_object(body: Value, key: &str) -> Result<Value, String> {
    match body {
        Value::Object(mut map) => match map.remove(key) {
            Some(inner @ Value::Object(_)) => Ok(inner),
            Some(_) => Err(format!("`{}` is not an object", key)),
            None => Ok(Value::Object(map)),
        },
        _ => Err("response is not an object".to_string()),
    }
}

/// Decode a ticket list, skipping records that cannot be identified
pub fn ticket_list(body: Value) -> Result<Vec<Ticket>, String> {
    let items = unwrap_list(body, "tickets")?;
    let mut tickets = Vec::with_capacity(items.len());

    for item in items {
        let raw: RawTicket = match serde_json::from_value(item) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed ticket record");
                continue;
            }
        };
        match ticket(raw) {
            Some(ticket) => tickets.push(ticket),
            None => tracing::warn!("Skipping ticket record without an identifier"),
        }
    }

    Ok(tickets)
}

/// Decode a single ticket detail
pub fn ticket_detail(body: Value) -> Result<Ticket, String> {
    let record = unwrap_object(body, "ticket")?;
    let raw: RawTicket =
        serde_json::from_value(record).map_err(|e| format!("malformed ticket: {}", e))?;
    ticket(raw).ok_or_else(|| "ticket record has no identifier".to_string())
}

/// Decode a status history body
pub fn status_history(body: Value) -> Result<Vec<StatusHistoryEntry>, String> {
    let items = unwrap_list(body, "history")?;
    items
        .into_iter()
        .map(|item| {
            serde_json::from_value(item).map_err(|e| format!("malformed history entry: {}", e))
        })
        .collect()
}

/// Decode a notification list
pub fn notifications(body: Value) -> Result<Vec<Notification>, String> {
    let items = unwrap_list(body, "notifications")?;
    items
        .into_iter()
        .map(|item| {
            serde_json::from_value(item).map_err(|e| format!("malformed notification: {}", e))
        })
        .collect()
}

/// Decode a rating lookup; a body without a rating means "not rated yet"
pub fn rating(body: Value) -> Result<Option<Rating>, String> {
    let record = match body {
        Value::Object(mut map) => match map.remove("review") {
            Some(inner @ Value::Object(_)) => inner,
            Some(other) => {
                map.insert("review".to_string(), other);
                Value::Object(map)
            }
            None => Value::Object(map),
        },
        Value::Null => return Ok(None),
        _ => return Err("rating response is not an object".to_string()),
    };

    match record.get("rating") {
        None | Some(Value::Null) => Ok(None),
        Some(_) => serde_json::from_value(record)
            .map(Some)
            .map_err(|e| format!("malformed rating: {}", e)),
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawName {
    #[serde(default, alias = "firstName")]
    first_name: Option<Value>,
    #[serde(default, alias = "lastName")]
    last_name: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct RawUser {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    email: Option<Value>,
    #[serde(default)]
    role: Option<Value>,
    #[serde(default, alias = "firstName")]
    first_name: Option<Value>,
    #[serde(default, alias = "lastName")]
    last_name: Option<Value>,
    #[serde(default)]
    profile: Option<RawName>,
}

/// Decode a user record, looking through `{ user: ... }` envelopes
pub fn user(body: Value) -> Result<UserProfile, String> {
    let record = unwrap_object(body, "user")?;
    let raw: RawUser = serde_json::from_value(record).map_err(|e| format!("malformed user: {}", e))?;
    let profile = raw.profile.unwrap_or_default();

    Ok(UserProfile {
        id: scalar_text(&raw.id).unwrap_or_default(),
        email: scalar_text(&raw.email),
        role: scalar_text(&raw.role)
            .map(|role| Role::parse(&role))
            .unwrap_or_else(|| Role::Other(String::new())),
        first_name: first_text(&[&raw.first_name, &profile.first_name]),
        last_name: first_text(&[&raw.last_name, &profile.last_name]),
    })
}

/// Decode a list of users (`{ technicians: [...] }`, `{ users: [...] }` or bare)
pub fn user_list(body: Value) -> Result<Vec<UserProfile>, String> {
    let key = if body.get("technicians").is_some() {
        "technicians"
    } else {
        "users"
    };
    unwrap_list(body, key)?.into_iter().map(user).collect()
}
