//! # Compliance Calendar API
//!
//! Projects requirements that carry a deadline onto calendar events for
//! the sites the caller may see.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use ecolk_core::{Requirement, RequirementId, RequirementStatus, SiteId};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::CallerIdentity;
use crate::state::AppState;

pub const COLOR_COMPLETED: &str = "#28a745";
pub const COLOR_OVERDUE: &str = "#dc3545";
pub const COLOR_PENDING: &str = "#007bff";

/// One requirement deadline on the calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CalendarEvent {
    pub requirement_id: RequirementId,
    pub site_id: SiteId,
    pub site_name: String,
    pub title: String,
    pub deadline: DateTime<Utc>,
    pub status: RequirementStatus,
    pub color: String,
}

/// Display colour of a requirement at `now`.
pub fn event_color(requirement: &Requirement, now: DateTime<Utc>) -> &'static str {
    if requirement.status == RequirementStatus::Completed {
        COLOR_COMPLETED
    } else if requirement.is_overdue(now) {
        COLOR_OVERDUE
    } else {
        COLOR_PENDING
    }
}

/// Build the calendar router.
pub fn router() -> Router<AppState> {
    Router::new().route("/v1/calendar/events", get(list_events))
}

/// GET /v1/calendar/events: Deadlines of visible requirements.
#[utoipa::path(
    get,
    path = "/v1/calendar/events",
    responses(
        (status = 200, description = "Events ordered by deadline", body = Vec<CalendarEvent>),
    ),
    tag = "calendar"
)]
async fn list_events(State(state): State<AppState>, caller: CallerIdentity) -> Json<Vec<CalendarEvent>> {
    let scope = caller.principal().visible_organizations();
    let site_names: BTreeMap<SiteId, String> = scope
        .filter(state.sites.list())
        .map(|site| (site.id, site.name))
        .collect();

    let now = Utc::now();
    let mut events: Vec<CalendarEvent> = state
        .requirements
        .list_where(|r| r.deadline.is_some() && site_names.contains_key(&r.site_id))
        .into_iter()
        .filter_map(|r| {
            let deadline = r.deadline?;
            Some(CalendarEvent {
                requirement_id: r.id,
                site_id: r.site_id,
                site_name: site_names.get(&r.site_id).cloned().unwrap_or_default(),
                color: event_color(&r, now).to_string(),
                title: r.title,
                deadline,
                status: r.status,
            })
        })
        .collect();
    events.sort_by(|a, b| {
        a.deadline
            .cmp(&b.deadline)
            .then(a.requirement_id.cmp(&b.requirement_id))
    });

    Json(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use ecolk_core::GeneratedRequirement;

    fn requirement(status: RequirementStatus, deadline: Option<DateTime<Utc>>) -> Requirement {
        let mut r = GeneratedRequirement::new("Report", "Law 7-FZ", None)
            .bind(RequirementId::new(1), SiteId::new(1));
        r.status = status;
        r.deadline = deadline;
        r
    }

    #[test]
    fn completed_is_green_even_when_late() {
        let now = Utc::now();
        let r = requirement(RequirementStatus::Completed, Some(now - Duration::days(3)));
        assert_eq!(event_color(&r, now), COLOR_COMPLETED);
    }

    #[test]
    fn past_deadline_is_red() {
        let now = Utc::now();
        let r = requirement(RequirementStatus::InProgress, Some(now - Duration::hours(1)));
        assert_eq!(event_color(&r, now), COLOR_OVERDUE);
    }

    #[test]
    fn future_deadline_is_blue() {
        let now = Utc::now();
        let r = requirement(RequirementStatus::NotStarted, Some(now + Duration::days(1)));
        assert_eq!(event_color(&r, now), COLOR_PENDING);
        let undated = requirement(RequirementStatus::NotStarted, None);
        assert_eq!(event_color(&undated, now), COLOR_PENDING);
    }
}
