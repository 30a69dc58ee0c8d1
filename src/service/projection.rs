//! Ticket projection
//!
//! Filtered views and summary counts derived from the full ticket
//! collection. Pure functions; callers re-run them on every read.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::data::{Ticket, TicketStatus};

/// Dashboard filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketFilter {
    #[default]
    All,
    /// `open`, `assigned`, `in_progress`
    Active,
    /// `resolved` only
    Resolved,
}

impl TicketFilter {
    pub fn matches(self, status: &TicketStatus) -> bool {
        match self {
            Self::All => true,
            Self::Active => status.is_active(),
            Self::Resolved => *status == TicketStatus::Resolved,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Resolved => "resolved",
        }
    }
}

impl fmt::Display for TicketFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "resolved" => Ok(Self::Resolved),
            other => Err(format!("unknown ticket filter: {}", other)),
        }
    }
}

/// Counts shown above the ticket list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TicketSummary {
    pub total: usize,
    pub active: usize,
    pub resolved: usize,
}

/// Tickets matching `filter`, in their original order
pub fn project(tickets: &[Ticket], filter: TicketFilter) -> Vec<&Ticket> {
    tickets
        .iter()
        .filter(|ticket| filter.matches(&ticket.status))
        .collect()
}

pub fn summarize(tickets: &[Ticket]) -> TicketSummary {
    tickets.iter().fold(
        TicketSummary {
            total: tickets.len(),
            ..TicketSummary::default()
        },
        |mut summary, ticket| {
            if TicketFilter::Active.matches(&ticket.status) {
                summary.active += 1;
            } else if TicketFilter::Resolved.matches(&ticket.status) {
                summary.resolved += 1;
            }
            summary
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Priority, TicketId};

    fn ticket(id: &str, status: &str) -> Ticket {
        Ticket {
            id: TicketId::from(id),
            reference: id.to_string(),
            title: format!("Ticket {}", id),
            description: String::new(),
            category: "Plumbing".to_string(),
            location: "Unit 4".to_string(),
            priority: Priority::Low,
            status: TicketStatus::parse(status),
            created_at: None,
            resident_name: None,
            special_note: None,
            technician_name: None,
        }
    }

    fn ids(tickets: &[&Ticket]) -> Vec<String> {
        tickets.iter().map(|t| t.id.to_string()).collect()
    }

    #[test]
    fn open_resolved_assigned_example() {
        let tickets = vec![
            ticket("1", "open"),
            ticket("2", "resolved"),
            ticket("3", "assigned"),
        ];

        assert_eq!(ids(&project(&tickets, TicketFilter::Active)), vec!["1", "3"]);
        assert_eq!(ids(&project(&tickets, TicketFilter::Resolved)), vec!["2"]);
        assert_eq!(project(&tickets, TicketFilter::All).len(), 3);
    }

    #[test]
    fn projection_keeps_relative_order_and_exact_status_sets() {
        let tickets = vec![
            ticket("a", "in_progress"),
            ticket("b", "closed"),
            ticket("c", "reopened"),
            ticket("d", "open"),
            ticket("e", "mystery"),
            ticket("f", "resolved"),
            ticket("g", "assigned"),
        ];

        assert_eq!(
            ids(&project(&tickets, TicketFilter::Active)),
            vec!["a", "d", "g"]
        );
        assert_eq!(ids(&project(&tickets, TicketFilter::Resolved)), vec!["f"]);
        assert_eq!(
            ids(&project(&tickets, TicketFilter::All)),
            vec!["a", "b", "c", "d", "e", "f", "g"]
        );
    }

    #[test]
    fn summary_counts_are_bounded_by_total() {
        let tickets = vec![
            ticket("1", "open"),
            ticket("2", "closed"),
            ticket("3", "resolved"),
            ticket("4", "reopened"),
            ticket("5", "in_progress"),
        ];

        let summary = summarize(&tickets);
        assert_eq!(
            summary,
            TicketSummary {
                total: 5,
                active: 2,
                resolved: 1
            }
        );
        assert!(summary.active + summary.resolved <= summary.total);
    }

    #[test]
    fn empty_collection_projects_to_nothing() {
        assert!(project(&[], TicketFilter::All).is_empty());
        assert_eq!(summarize(&[]), TicketSummary::default());
    }

    #[test]
    fn filter_parses_case_insensitively() {
        assert_eq!("Active".parse::<TicketFilter>(), Ok(TicketFilter::Active));
        assert!("unread".parse::<TicketFilter>().is_err());
    }
}
