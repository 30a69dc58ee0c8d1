//! Data models
//!
//! Canonical records handed to every consumer above the gateway.
//! Wire-shape tolerance lives in `normalize`; nothing here knows about
//! field aliases.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// ID Types
// =============================================================================

/// Accept an identifier written either as a JSON string or a number
pub(crate) fn string_or_number<'de, D: serde::Deserializer<'de>>(
    deserializer: D,
) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    })
}

/// Ticket identifier used in API paths
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TicketId(pub String);

impl<'de> Deserialize<'de> for TicketId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        string_or_number(deserializer).map(Self)
    }
}

impl TicketId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TicketId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<u64> for TicketId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

/// Notification identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct NotificationId(pub String);

impl<'de> Deserialize<'de> for NotificationId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        string_or_number(deserializer).map(Self)
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NotificationId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

// =============================================================================
// Ticket status
// =============================================================================

/// Lifecycle status of a ticket
///
/// Values outside the known set are preserved verbatim in `Other` and get
/// the default display style. They are never rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TicketStatus {
    Open,
    Assigned,
    InProgress,
    Resolved,
    Closed,
    Reopened,
    Other(String),
}

impl TicketStatus {
    /// Parse a backend status, case-insensitively
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "open" => Self::Open,
            "assigned" => Self::Assigned,
            "in_progress" => Self::InProgress,
            "resolved" => Self::Resolved,
            "closed" => Self::Closed,
            "reopened" => Self::Reopened,
            _ => Self::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Open => "open",
            Self::Assigned => "assigned",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
            Self::Reopened => "reopened",
            Self::Other(raw) => raw,
        }
    }

    /// `open`, `assigned` or `in_progress`
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Open | Self::Assigned | Self::InProgress)
    }

    /// Ratings exist only for tickets in these states
    pub fn allows_rating(&self) -> bool {
        matches!(self, Self::Resolved | Self::Closed)
    }

    /// Badge style key; unknown statuses share the default
    pub fn style(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Assigned => "assigned",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
            Self::Reopened => "reopened",
            Self::Other(_) => "default",
        }
    }

    /// Uppercase label with underscores turned into spaces
    pub fn label(&self) -> String {
        status_label(self.as_str())
    }
}

impl Default for TicketStatus {
    fn default() -> Self {
        Self::Open
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TicketStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TicketStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// Render a raw status string for display (`in_progress` -> `IN PROGRESS`)
pub fn status_label(raw: &str) -> String {
    raw.replace('_', " ").to_uppercase()
}

// =============================================================================
// Priority
// =============================================================================

/// Ticket priority
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
    Other(String),
}

impl Priority {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Self::Low,
            "medium" => Self::Medium,
            "high" => Self::High,
            "urgent" => Self::Urgent,
            _ => Self::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
            Self::Other(raw) => raw,
        }
    }

    pub fn style(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
            Self::Other(_) => "default",
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::Low
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Priority {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

// =============================================================================
// Ticket
// =============================================================================

/// A maintenance ticket in canonical shape
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ticket {
    /// Key used in API paths
    pub id: TicketId,
    /// Human-facing ticket number (falls back to `id`)
    pub reference: String,
    pub title: String,
    pub description: String,
    /// Job type
    pub category: String,
    pub location: String,
    pub priority: Priority,
    pub status: TicketStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub resident_name: Option<String>,
    pub special_note: Option<String>,
    pub technician_name: Option<String>,
}

impl Ticket {
    /// Creation time as "YYYY-MM-DD HH:MM:SS", empty when unknown
    pub fn created_display(&self) -> String {
        self.created_at
            .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default()
    }
}

/// Fields a resident submits to open a ticket
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTicket {
    pub title: String,
    pub category: String,
    pub location: String,
    pub description: String,
    pub special_note: Option<String>,
}

// =============================================================================
// Status history
// =============================================================================

/// One immutable entry of a ticket's transition log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    pub status: TicketStatus,
    #[serde(alias = "created_at")]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub updated_by: Option<String>,
}

// =============================================================================
// Notifications
// =============================================================================

/// Ticket summary embedded in a notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketReference {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, alias = "category")]
    pub job_type: Option<String>,
}

/// A notification addressed to the signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub created_at: String,
    #[serde(default, rename = "tickets", alias = "ticket")]
    pub ticket: Option<TicketReference>,
}

impl Notification {
    /// Heading shown for the notification
    pub fn heading(&self) -> &str {
        self.ticket
            .as_ref()
            .and_then(|t| t.title.as_deref())
            .unwrap_or("Notification")
    }
}

// =============================================================================
// Rating
// =============================================================================

/// Resident feedback on a finished ticket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    /// 1 to 5 stars
    pub rating: u8,
    #[serde(default)]
    pub review: Option<String>,
}

impl Rating {
    pub const MAX_STARS: u8 = 5;

    pub fn new(rating: u8, review: Option<String>) -> Result<Self, crate::error::AppError> {
        if rating == 0 || rating > Self::MAX_STARS {
            return Err(crate::error::AppError::InvalidInput(format!(
                "rating must be between 1 and {}",
                Self::MAX_STARS
            )));
        }
        let review = review.filter(|r| !r.trim().is_empty());
        Ok(Self { rating, review })
    }
}

// =============================================================================
// Users
// =============================================================================

/// Caller role
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Role {
    Resident,
    Technician,
    Other(String),
}

impl Role {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "resident" => Self::Resident,
            "technician" => Self::Technician,
            _ => Self::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Resident => "resident",
            Self::Technician => "technician",
            Self::Other(raw) => raw,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Role {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// Signed-in user as reported by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub id: String,
    pub email: Option<String>,
    pub role: Role,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl UserProfile {
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => last.clone(),
            (None, None) => self.email.clone().unwrap_or_else(|| self.id.clone()),
        }
    }
}

/// Login request body
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Registration request body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

/// Filters accepted by the report endpoints
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReportFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TicketStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(rename = "jobType", skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,
    #[serde(rename = "from", skip_serializing_if = "Option::is_none")]
    pub from_date: Option<String>,
    #[serde(rename = "to", skip_serializing_if = "Option::is_none")]
    pub to_date: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_known_values_case_insensitively() {
        assert_eq!(TicketStatus::parse("IN_PROGRESS"), TicketStatus::InProgress);
        assert_eq!(TicketStatus::parse(" resolved "), TicketStatus::Resolved);
        assert_eq!(
            TicketStatus::parse("on_hold"),
            TicketStatus::Other("on_hold".to_string())
        );
    }

    #[test]
    fn unknown_status_uses_default_style_and_keeps_text() {
        let status = TicketStatus::parse("escalated");
        assert_eq!(status.style(), "default");
        assert_eq!(status.as_str(), "escalated");
        assert!(!status.is_active());
    }

    #[test]
    fn status_label_spaces_out_underscores() {
        assert_eq!(TicketStatus::InProgress.label(), "IN PROGRESS");
        assert_eq!(status_label("open"), "OPEN");
    }

    #[test]
    fn rating_rejects_out_of_range_stars() {
        assert!(Rating::new(0, None).is_err());
        assert!(Rating::new(6, None).is_err());
        let rating = Rating::new(4, Some("   ".to_string())).unwrap();
        assert_eq!(rating.review, None);
    }

    #[test]
    fn notification_heading_defaults_without_ticket() {
        let json = serde_json::json!({
            "id": "n1",
            "message": "Your ticket was assigned",
            "created_at": "2025-01-02T10:00:00Z"
        });
        let notification: Notification = serde_json::from_value(json).unwrap();
        assert_eq!(notification.heading(), "Notification");

        let json = serde_json::json!({
            "id": "n2",
            "message": "Resolved",
            "created_at": "2025-01-02T10:00:00Z",
            "tickets": { "title": "Leaking tap", "location": "Kitchen", "job_type": "Plumbing" }
        });
        let notification: Notification = serde_json::from_value(json).unwrap();
        assert_eq!(notification.heading(), "Leaking tap");

        let json = serde_json::json!({
            "id": 31,
            "message": "Closed",
            "created_at": "2025-01-02T10:00:00Z"
        });
        let notification: Notification = serde_json::from_value(json).unwrap();
        assert_eq!(notification.id, NotificationId::from("31"));
    }

    #[test]
    fn display_name_prefers_full_name() {
        let user = UserProfile {
            id: "7".to_string(),
            email: Some("tech@example.com".to_string()),
            role: Role::Technician,
            first_name: Some("Sam".to_string()),
            last_name: None,
        };
        assert_eq!(user.display_name(), "Sam");
    }
}
