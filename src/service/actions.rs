//! Role-gated action panel
//!
//! `{role, status}` is resolved once into a [`PermittedActions`] set; every
//! operation checks membership before sending anything. No action updates
//! local state optimistically: a failure leaves the panel as it was.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use super::refresh::FocusRefresh;
use crate::api::{ApiClient, ResidentGateway, TechnicianGateway};
use crate::data::{Rating, Role, TicketId, TicketStatus};
use crate::error::AppError;

/// Affordances a ticket panel can offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Action {
    /// Technician takes an assigned ticket
    Accept,
    /// Technician marks work done
    Resolve,
    /// Open the rating form
    Rate,
    SubmitRating,
    CancelRating,
    /// Read-only display of the saved rating
    ViewRating,
    Close,
    Reopen,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Accept => "accept",
            Self::Resolve => "resolve",
            Self::Rate => "rate",
            Self::SubmitRating => "submit_rating",
            Self::CancelRating => "cancel_rating",
            Self::ViewRating => "view_rating",
            Self::Close => "close",
            Self::Reopen => "reopen",
        };
        f.write_str(name)
    }
}

/// The actions offered for one ticket, role and panel state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PermittedActions(BTreeSet<Action>);

impl PermittedActions {
    pub fn resolve(
        role: &Role,
        status: &TicketStatus,
        has_saved_rating: bool,
        rating_draft_open: bool,
    ) -> Self {
        let mut actions = BTreeSet::new();

        match (role, status) {
            (Role::Technician, TicketStatus::Assigned) => {
                actions.insert(Action::Accept);
            }
            (Role::Technician, TicketStatus::InProgress) => {
                actions.insert(Action::Resolve);
            }
            (Role::Resident, TicketStatus::Resolved) if rating_draft_open => {
                actions.insert(Action::SubmitRating);
                actions.insert(Action::CancelRating);
            }
            (Role::Resident, TicketStatus::Resolved) => {
                if !has_saved_rating {
                    actions.insert(Action::Rate);
                }
                actions.insert(Action::Close);
            }
            (Role::Resident, TicketStatus::Closed) => {
                actions.insert(Action::Reopen);
            }
            _ => {}
        }

        if *role == Role::Resident && status.allows_rating() && has_saved_rating {
            actions.insert(Action::ViewRating);
        }

        Self(actions)
    }

    pub fn contains(&self, action: Action) -> bool {
        self.0.contains(&action)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Action> + '_ {
        self.0.iter().copied()
    }
}

/// Rating form contents while it is open
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RatingDraft {
    pub stars: u8,
    pub feedback: String,
}

/// What the caller should do after an action succeeded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    /// Nothing beyond what the panel already did
    Stay,
    /// Re-fetch the detail screen
    RefreshDetail,
    /// The list was refreshed; dismiss the detail view
    DismissDetail,
}

pub struct ActionPanel {
    residents: ResidentGateway,
    technicians: TechnicianGateway,
    ticket_id: TicketId,
    role: Role,
    status: TicketStatus,
    saved_rating: Option<Rating>,
    draft: Option<RatingDraft>,
}

impl ActionPanel {
    pub fn new(api: Arc<ApiClient>, ticket_id: TicketId, role: Role, status: TicketStatus) -> Self {
        Self {
            residents: ResidentGateway::new(api.clone()),
            technicians: TechnicianGateway::new(api),
            ticket_id,
            role,
            status,
            saved_rating: None,
            draft: None,
        }
    }

    pub fn permitted(&self) -> PermittedActions {
        PermittedActions::resolve(
            &self.role,
            &self.status,
            self.saved_rating.is_some(),
            self.draft.is_some(),
        )
    }

    pub fn saved_rating(&self) -> Option<&Rating> {
        self.saved_rating.as_ref()
    }

    pub fn draft(&self) -> Option<&RatingDraft> {
        self.draft.as_ref()
    }

    /// Ticket status moved on (after a detail refresh)
    ///
    /// Leaving a ratable status forgets any saved rating and open draft.
    pub fn set_status(&mut self, status: TicketStatus) {
        if !status.allows_rating() {
            self.saved_rating = None;
            self.draft = None;
        }
        self.status = status;
    }

    fn require(&self, action: Action) -> Result<(), AppError> {
        if self.permitted().contains(action) {
            Ok(())
        } else {
            Err(AppError::ActionNotPermitted {
                action: action.to_string(),
                status: self.status.to_string(),
            })
        }
    }

    /// Look up an existing rating
    ///
    /// Only for `resolved` and `closed` tickets. A failed lookup reads as
    /// "not rated yet".
    pub async fn load_saved_rating(&mut self) {
        if !self.status.allows_rating() {
            self.saved_rating = None;
            return;
        }

        self.saved_rating = match self.residents.get_rating(&self.ticket_id).await {
            Ok(rating) => rating,
            Err(e) => {
                tracing::debug!(ticket_id = %self.ticket_id, error = %e, "No rating available");
                None
            }
        };

        if self.saved_rating.is_some() {
            self.draft = None;
        }
    }

    /// Open the rating form
    pub fn start_rating(&mut self) -> Result<(), AppError> {
        self.require(Action::Rate)?;
        self.draft = Some(RatingDraft::default());
        Ok(())
    }

    /// Update the open rating form
    pub fn edit_rating(&mut self, stars: u8, feedback: &str) -> Result<(), AppError> {
        let draft = self.draft.as_mut().ok_or_else(|| AppError::ActionNotPermitted {
            action: Action::SubmitRating.to_string(),
            status: self.status.to_string(),
        })?;
        draft.stars = stars.min(Rating::MAX_STARS);
        draft.feedback = feedback.to_string();
        Ok(())
    }

    pub fn cancel_rating(&mut self) -> Result<(), AppError> {
        self.require(Action::CancelRating)?;
        self.draft = None;
        Ok(())
    }

    /// Submit the open rating form in one call
    ///
    /// On success the rating becomes read-only for the rest of the session.
    pub async fn submit_rating(&mut self) -> Result<(), AppError> {
        self.require(Action::SubmitRating)?;
        let draft = self.draft.clone().unwrap_or_default();
        let rating = Rating::new(draft.stars, Some(draft.feedback))?;

        self.residents
            .add_rating(&self.ticket_id, &rating)
            .await
            .map_err(|e| failed(e, Action::SubmitRating, &self.ticket_id))?;

        self.saved_rating = Some(rating);
        self.draft = None;
        Ok(())
    }

    /// Close a resolved ticket, then refresh `list`
    pub async fn close<L: FocusRefresh>(
        &mut self,
        comment: Option<&str>,
        list: &mut L,
    ) -> Result<FollowUp, AppError> {
        self.require(Action::Close)?;
        let comment = comment.map(str::trim).filter(|c| !c.is_empty());

        self.residents
            .close_ticket(&self.ticket_id, comment)
            .await
            .map_err(|e| failed(e, Action::Close, &self.ticket_id))?;

        list.refresh().await?;
        Ok(FollowUp::DismissDetail)
    }

    /// Reopen a closed ticket with a reason, then refresh `list`
    pub async fn reopen<L: FocusRefresh>(
        &mut self,
        reason: &str,
        list: &mut L,
    ) -> Result<FollowUp, AppError> {
        self.require(Action::Reopen)?;
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::InvalidInput(
                "a reason is required to reopen a ticket".to_string(),
            ));
        }

        self.residents
            .reopen_ticket(&self.ticket_id, reason)
            .await
            .map_err(|e| failed(e, Action::Reopen, &self.ticket_id))?;

        list.refresh().await?;
        Ok(FollowUp::DismissDetail)
    }

    /// Technician accepts an assigned ticket
    pub async fn accept(&mut self) -> Result<FollowUp, AppError> {
        self.require(Action::Accept)?;
        self.technicians
            .start_work(&self.ticket_id)
            .await
            .map_err(|e| failed(e, Action::Accept, &self.ticket_id))?;
        Ok(FollowUp::RefreshDetail)
    }

    /// Technician resolves a ticket in progress
    pub async fn resolve(&mut self, message: Option<&str>) -> Result<FollowUp, AppError> {
        self.require(Action::Resolve)?;
        let message = message.map(str::trim).filter(|m| !m.is_empty());
        self.technicians
            .resolve_ticket(&self.ticket_id, message)
            .await
            .map_err(|e| failed(e, Action::Resolve, &self.ticket_id))?;
        Ok(FollowUp::RefreshDetail)
    }
}

fn failed(e: AppError, action: Action, ticket_id: &TicketId) -> AppError {
    let e = e.into_action_failed();
    tracing::warn!(%action, ticket_id = %ticket_id, error = %e, "Ticket action failed");
    e
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actions(set: &PermittedActions) -> Vec<Action> {
        set.iter().collect()
    }

    #[test]
    fn technician_sees_accept_only_when_assigned() {
        let set = PermittedActions::resolve(&Role::Technician, &TicketStatus::Assigned, false, false);
        assert_eq!(actions(&set), vec![Action::Accept]);

        let set =
            PermittedActions::resolve(&Role::Technician, &TicketStatus::InProgress, false, false);
        assert_eq!(actions(&set), vec![Action::Resolve]);

        let set = PermittedActions::resolve(&Role::Technician, &TicketStatus::Resolved, true, false);
        assert!(set.is_empty());
    }

    #[test]
    fn resident_resolved_offers_rate_and_close() {
        let set = PermittedActions::resolve(&Role::Resident, &TicketStatus::Resolved, false, false);
        assert_eq!(actions(&set), vec![Action::Rate, Action::Close]);
    }

    #[test]
    fn saved_rating_replaces_rate_with_view() {
        let set = PermittedActions::resolve(&Role::Resident, &TicketStatus::Resolved, true, false);
        assert!(!set.contains(Action::Rate));
        assert!(set.contains(Action::ViewRating));
        assert!(set.contains(Action::Close));

        let set = PermittedActions::resolve(&Role::Resident, &TicketStatus::Closed, true, false);
        assert_eq!(actions(&set), vec![Action::ViewRating, Action::Reopen]);
    }

    #[test]
    fn open_draft_hides_close() {
        let set = PermittedActions::resolve(&Role::Resident, &TicketStatus::Resolved, false, true);
        assert_eq!(actions(&set), vec![Action::SubmitRating, Action::CancelRating]);
    }

    #[test]
    fn resident_active_and_unknown_statuses_offer_nothing() {
        for status in ["open", "assigned", "in_progress", "reopened", "escalated"] {
            let set =
                PermittedActions::resolve(&Role::Resident, &TicketStatus::parse(status), false, false);
            assert!(set.is_empty(), "{} should offer no actions", status);
        }

        let set = PermittedActions::resolve(
            &Role::Other("admin".to_string()),
            &TicketStatus::Resolved,
            false,
            false,
        );
        assert!(set.is_empty());
    }

    fn offline_panel(role: Role, status: TicketStatus) -> ActionPanel {
        use crate::auth::{SessionContext, TokenStore};

        let session = Arc::new(SessionContext::new(TokenStore::ephemeral()));
        let api = Arc::new(ApiClient::with_http_client(
            reqwest::Client::new(),
            "http://127.0.0.1:9",
            session,
        ));
        ActionPanel::new(api, TicketId::from("1"), role, status)
    }

    #[tokio::test]
    async fn not_permitted_actions_fail_without_a_request() {
        let mut panel = offline_panel(Role::Resident, TicketStatus::Open);
        assert!(matches!(
            panel.start_rating(),
            Err(AppError::ActionNotPermitted { .. })
        ));
        assert!(matches!(
            panel.accept().await,
            Err(AppError::ActionNotPermitted { .. })
        ));
        assert!(matches!(
            panel.submit_rating().await,
            Err(AppError::ActionNotPermitted { .. })
        ));
    }

    #[test]
    fn rating_draft_lifecycle_is_local() {
        let mut panel = offline_panel(Role::Resident, TicketStatus::Resolved);
        panel.start_rating().unwrap();
        panel.edit_rating(9, "great").unwrap();
        assert_eq!(panel.draft().unwrap().stars, 5);
        assert!(!panel.permitted().contains(Action::Close));

        panel.cancel_rating().unwrap();
        assert!(panel.draft().is_none());
        assert!(panel.permitted().contains(Action::Close));
    }

    #[test]
    fn leaving_ratable_status_drops_saved_rating() {
        let mut panel = offline_panel(Role::Resident, TicketStatus::Closed);
        panel.saved_rating = Some(Rating::new(3, None).unwrap());
        panel.set_status(TicketStatus::Reopened);
        assert!(panel.saved_rating().is_none());
        assert!(panel.permitted().is_empty());
    }
}
