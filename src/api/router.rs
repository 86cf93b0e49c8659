use axum::{
    Router,
    routing::{delete, get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, check_overdue, create_loan, delete_notification, get_loan_by_id, list_loans,
    list_member_loans, list_member_notifications, loan_report, loan_stats,
    mark_all_notifications_read, mark_notification_read, return_loan,
};

/// Creates the API router with all loan management endpoints
///
/// Command endpoints (Write operations):
/// - POST /loans - Create a new loan
/// - POST /loans/:id/return - Return a book
/// - POST /overdue/check - Run the overdue sweep now
///
/// Query endpoints (Read operations):
/// - GET /loans - List loans with filters
/// - GET /loans/:id - Get loan details
/// - GET /members/:id/loans - Loan history of a member
/// - GET /stats/loans - Active and overdue counters
/// - GET /reports/loans - Transaction report over a borrow date range
///
/// Member notifications:
/// - GET /members/:id/notifications - Newest notifications and unread count
/// - PATCH /members/:id/notifications - Mark all as read
/// - POST /members/:id/notifications/:notification_id/read - Mark one as read
/// - DELETE /members/:id/notifications/:notification_id - Delete one
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // Loans
        .route("/loans", post(create_loan).get(list_loans))
        .route("/loans/:id", get(get_loan_by_id))
        .route("/loans/:id/return", post(return_loan))
        .route("/members/:id/loans", get(list_member_loans))
        // Overdue sweep and dashboard counters
        .route("/overdue/check", post(check_overdue))
        .route("/stats/loans", get(loan_stats))
        .route("/reports/loans", get(loan_report))
        // Member notifications
        .route(
            "/members/:id/notifications",
            get(list_member_notifications).patch(mark_all_notifications_read),
        )
        .route(
            "/members/:id/notifications/:notification_id",
            delete(delete_notification),
        )
        .route(
            "/members/:id/notifications/:notification_id/read",
            post(mark_notification_read),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
