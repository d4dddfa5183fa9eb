//! Handlers for the `/admin` resource: dashboard, donations, the aid request
//! review queue, activity log, contact inbox and user roles.
//!
//! The review queue and inbox accept admins and moderators
//! ([`RequireStaff`]); everything touching accounts or money requires
//! [`RequireAdmin`].

use alms_core::aid_request::{validate_aid_status, validate_transition, AID_STATUS_APPROVED};
use alms_core::cause::slugify;
use alms_core::error::CoreError;
use alms_core::roles::Role;
use alms_core::types::DbId;
use alms_db::models::activity::ActivityLogEntry;
use alms_db::models::aid_request::{AidRequest, AidStatusCount, ReviewAidRequest};
use alms_db::models::cause::{CauseStatusCount, CreateCause};
use alms_db::models::contact::ContactSubmission;
use alms_db::models::donation::{Donation, DonationTotals};
use alms_db::models::user::UserResponse;
use alms_db::repositories::{
    ActivityLogRepo, AidRequestRepo, CauseRepo, ContactRepo, DonationRepo, NewsletterRepo,
    UserRepo,
};
use alms_events::bus::{EVENT_AID_REQUEST_REVIEWED, EVENT_CAUSE_CREATED, EVENT_USER_ROLE_CHANGED};
use alms_events::PlatformEvent;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::handlers::causes::CauseResponse;
use crate::middleware::rbac::{RequireAdmin, RequireStaff};
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Entries of the activity feed embedded in the dashboard.
const DASHBOARD_ACTIVITY_LIMIT: i64 = 10;

/// Longest cause summary derived from an aid request description.
const DERIVED_SUMMARY_CHARS: usize = 280;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub donation_totals: Vec<DonationTotals>,
    pub causes_by_status: Vec<CauseStatusCount>,
    pub aid_requests_by_status: Vec<AidStatusCount>,
    pub user_count: i64,
    pub newsletter_subscribers: i64,
    pub unread_contact_submissions: i64,
    pub recent_activity: Vec<ActivityLogEntry>,
}

/// Query parameters for `GET /admin/donations`.
#[derive(Debug, Deserialize)]
pub struct DonationListParams {
    pub cause_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Query parameters for `GET /admin/aid-requests`.
#[derive(Debug, Deserialize)]
pub struct AidRequestListParams {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Request body for `POST /admin/aid-requests/{id}/review`.
#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub status: String,
    pub review_notes: Option<String>,
    /// Publish an approved request as a cause.
    #[serde(default)]
    pub create_cause: bool,
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub aid_request: AidRequest,
    pub cause: Option<CauseResponse>,
}

/// Query parameters for `GET /admin/activity`.
#[derive(Debug, Deserialize)]
pub struct ActivityParams {
    pub event_type: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Paginated activity log response.
#[derive(Debug, Serialize)]
pub struct ActivityPage {
    pub items: Vec<ActivityLogEntry>,
    pub total: i64,
}

/// Query parameters for `GET /admin/contact-submissions`.
#[derive(Debug, Deserialize)]
pub struct ContactListParams {
    #[serde(default)]
    pub unread_only: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Request body for `PUT /admin/users/{id}/role`.
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
) -> AppResult<Json<DataResponse<DashboardResponse>>> {
    let pool = &state.pool;
    let (
        donation_totals,
        causes_by_status,
        aid_requests_by_status,
        user_count,
        newsletter_subscribers,
        unread_contact_submissions,
        recent_activity,
    ) = tokio::try_join!(
        DonationRepo::totals(pool),
        CauseRepo::count_by_status(pool),
        AidRequestRepo::count_by_status(pool),
        UserRepo::count(pool),
        NewsletterRepo::count_active(pool),
        ContactRepo::count_unread(pool),
        ActivityLogRepo::list(pool, None, DASHBOARD_ACTIVITY_LIMIT, 0),
    )?;

    Ok(Json(DataResponse {
        data: DashboardResponse {
            donation_totals,
            causes_by_status,
            aid_requests_by_status,
            user_count,
            newsletter_subscribers,
            unread_contact_submissions,
            recent_activity,
        },
    }))
}

// ---------------------------------------------------------------------------
// Donations
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/donations
pub async fn list_donations(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<DonationListParams>,
) -> AppResult<Json<DataResponse<Vec<Donation>>>> {
    let page = PaginationParams {
        limit: params.limit,
        offset: params.offset,
    };
    let donations =
        DonationRepo::list(&state.pool, params.cause_id, page.limit(), page.offset()).await?;
    Ok(Json(DataResponse { data: donations }))
}

// ---------------------------------------------------------------------------
// Aid request review
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/aid-requests
pub async fn list_aid_requests(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    Query(params): Query<AidRequestListParams>,
) -> AppResult<Json<DataResponse<Vec<AidRequest>>>> {
    if let Some(status) = &params.status {
        validate_aid_status(status)?;
    }
    let page = PaginationParams {
        limit: params.limit,
        offset: params.offset,
    };
    let requests = AidRequestRepo::list(
        &state.pool,
        params.status.as_deref(),
        page.limit(),
        page.offset(),
    )
    .await?;
    Ok(Json(DataResponse { data: requests }))
}

/// GET /api/v1/admin/aid-requests/{id}
pub async fn get_aid_request(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<AidRequest>>> {
    let request = find_aid_request(&state, id).await?;
    Ok(Json(DataResponse { data: request }))
}

/// POST /api/v1/admin/aid-requests/{id}/review
///
/// Move a request to a new status. The update is conditional on the status
/// read here, so two reviewers deciding at once cannot both win: the loser
/// gets 409. Approving with `create_cause: true` also publishes a cause
/// seeded from the request, in the same transaction as the decision.
pub async fn review_aid_request(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<DbId>,
    Json(input): Json<ReviewRequest>,
) -> AppResult<Json<DataResponse<ReviewResponse>>> {
    let current = find_aid_request(&state, id).await?;
    validate_transition(&current.status, &input.status)?;

    if input.create_cause && input.status != AID_STATUS_APPROVED {
        return Err(AppError::Core(CoreError::Validation(
            "create_cause is only allowed when approving".into(),
        )));
    }
    let new_cause = input.create_cause.then(|| cause_from_request(&current));

    let review = ReviewAidRequest {
        expected_status: current.status.clone(),
        new_status: input.status.clone(),
        review_notes: input.review_notes.filter(|n| !n.trim().is_empty()),
        reviewed_by: staff.user_id,
    };

    let mut tx = state.pool.begin().await?;
    let Some(reviewed) = AidRequestRepo::review_with(&mut tx, id, &review).await? else {
        drop(tx);
        // Deleted or decided by someone else since we read it.
        let latest = find_aid_request(&state, id).await?;
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Aid request {id} was changed to '{}' by another reviewer",
            latest.status
        ))));
    };
    let cause = match &new_cause {
        Some(new_cause) => Some(CauseRepo::create_with(&mut tx, new_cause).await?),
        None => None,
    };
    tx.commit().await?;

    tracing::info!(
        aid_request_id = id,
        from = %current.status,
        to = %reviewed.status,
        reviewer = staff.user_id,
        "Aid request reviewed"
    );
    state.event_bus.publish(
        PlatformEvent::new(EVENT_AID_REQUEST_REVIEWED)
            .with_source("aid_request", reviewed.id)
            .with_actor(staff.user_id)
            .with_payload(serde_json::json!({
                "email": reviewed.email,
                "name": reviewed.applicant_name,
                "title": reviewed.title,
                "status": reviewed.status,
                "previous_status": current.status,
                "review_notes": reviewed.review_notes,
            })),
    );

    if let Some(cause) = &cause {
        tracing::info!(cause_id = cause.id, aid_request_id = id, "Cause published from aid request");
        state.event_bus.publish(
            PlatformEvent::new(EVENT_CAUSE_CREATED)
                .with_source("cause", cause.id)
                .with_actor(staff.user_id)
                .with_payload(serde_json::json!({
                    "title": cause.title,
                    "slug": cause.slug,
                    "aid_request_id": id,
                })),
        );
    }

    Ok(Json(DataResponse {
        data: ReviewResponse {
            aid_request: reviewed,
            cause: cause.map(CauseResponse::from),
        },
    }))
}

/// Seed a cause from an approved request. The slug carries the request id
/// so two requests with the same title do not collide; titles without any
/// ASCII letters or digits fall back to `cause-{id}`.
fn cause_from_request(request: &AidRequest) -> CreateCause {
    let slug = match slugify(&request.title) {
        Ok(base) => format!("{base}-{}", request.id),
        Err(_) => format!("cause-{}", request.id),
    };
    let summary: String = request.description.chars().take(DERIVED_SUMMARY_CHARS).collect();

    CreateCause {
        title: request.title.clone(),
        slug,
        summary,
        story: Some(request.description.clone()),
        category: request.category.clone(),
        image_path: None,
        beneficiary_name: Some(request.applicant_name.clone()),
        goal_minor: request.amount_needed_minor,
        currency: request.currency.clone(),
        is_urgent: false,
        aid_request_id: Some(request.id),
    }
}

async fn find_aid_request(state: &AppState, id: DbId) -> AppResult<AidRequest> {
    AidRequestRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "AidRequest",
            id,
        }))
}

// ---------------------------------------------------------------------------
// Activity log
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/activity
pub async fn list_activity(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<ActivityParams>,
) -> AppResult<Json<DataResponse<ActivityPage>>> {
    let page = PaginationParams {
        limit: params.limit,
        offset: params.offset,
    };
    let event_type = params.event_type.as_deref();

    let items = ActivityLogRepo::list(&state.pool, event_type, page.limit(), page.offset()).await?;
    let total = ActivityLogRepo::count(&state.pool, event_type).await?;

    Ok(Json(DataResponse {
        data: ActivityPage { items, total },
    }))
}

// ---------------------------------------------------------------------------
// Contact inbox
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/contact-submissions
pub async fn list_contact_submissions(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    Query(params): Query<ContactListParams>,
) -> AppResult<Json<DataResponse<Vec<ContactSubmission>>>> {
    let page = PaginationParams {
        limit: params.limit,
        offset: params.offset,
    };
    let submissions =
        ContactRepo::list(&state.pool, params.unread_only, page.limit(), page.offset()).await?;
    Ok(Json(DataResponse { data: submissions }))
}

/// POST /api/v1/admin/contact-submissions/{id}/read
pub async fn mark_contact_read(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !ContactRepo::mark_read(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "ContactSubmission",
            id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let users = UserRepo::list(&state.pool, params.limit(), params.offset()).await?;
    Ok(Json(DataResponse {
        data: users.iter().map(UserResponse::from_user).collect(),
    }))
}

/// PUT /api/v1/admin/users/{id}/role
///
/// Admins cannot change their own role.
pub async fn update_user_role(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateRoleRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    if id == admin.user_id {
        return Err(AppError::Core(CoreError::Conflict(
            "You cannot change your own role".into(),
        )));
    }

    let role: Role = input.role.parse()?;

    let user = UserRepo::update_role(&state.pool, id, role.id())
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    tracing::info!(user_id = id, %role, "User role changed");
    state.event_bus.publish(
        PlatformEvent::new(EVENT_USER_ROLE_CHANGED)
            .with_source("user", id)
            .with_actor(admin.user_id)
            .with_payload(serde_json::json!({ "role": role })),
    );

    Ok(Json(DataResponse {
        data: UserResponse::from_user(&user),
    }))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn request(title: &str, description: &str) -> AidRequest {
        AidRequest {
            id: 42,
            user_id: Some(7),
            applicant_name: "Ngozi".into(),
            email: "ngozi@example.com".into(),
            phone: None,
            title: title.into(),
            description: description.into(),
            category: "medical".into(),
            amount_needed_minor: 25_000_000,
            currency: "NGN".into(),
            document_paths: vec![],
            status: AID_STATUS_APPROVED.into(),
            review_notes: None,
            reviewed_by: Some(1),
            reviewed_at: Some(Utc::now()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_derived_cause_copies_the_request() {
        let cause = cause_from_request(&request("Kidney Surgery", "Needs surgery"));
        assert_eq!(cause.slug, "kidney-surgery-42");
        assert_eq!(cause.goal_minor, 25_000_000);
        assert_eq!(cause.beneficiary_name.as_deref(), Some("Ngozi"));
        assert_eq!(cause.aid_request_id, Some(42));
        assert_eq!(cause.summary, "Needs surgery");
    }

    #[test]
    fn test_derived_summary_is_truncated() {
        let long = "x".repeat(DERIVED_SUMMARY_CHARS + 50);
        let cause = cause_from_request(&request("Help", &long));
        assert_eq!(cause.summary.chars().count(), DERIVED_SUMMARY_CHARS);
        assert_eq!(cause.story.as_deref(), Some(long.as_str()));
    }

    #[test]
    fn test_title_without_ascii_falls_back_to_id_slug() {
        let cause = cause_from_request(&request("帮助妈妈", "Needs surgery"));
        assert_eq!(cause.slug, "cause-42");
        assert_eq!(cause.title, "帮助妈妈");
    }
}
