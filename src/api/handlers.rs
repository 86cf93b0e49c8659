use crate::application::loan::{self, LoanStats, ServiceDependencies};
use crate::domain::{LoanDays, LoanId, MemberId, commands::ReturnLoan, notification::NotificationId};
use crate::ports::LoanFilter;
use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use super::{
    error::ApiError,
    types::{
        CreateLoanRequest, ListLoansQuery, LoanReportQuery, LoanReportResponse, LoanResponse,
        MarkAllReadResponse, MemberNotificationsResponse, NotificationListQuery,
        OverdueCheckResponse, ReturnLoanRequest,
    },
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
    pub default_loan_days: LoanDays,
}

// ============================================================================
// Command handlers (POST)
// ============================================================================

/// POST /loans - 新しい貸出を作成
///
/// 強制されるビジネスルール:
/// - 書籍が存在し、貸出可能数が1以上であること
/// - 会員が存在し、有効であること
pub async fn create_loan(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateLoanRequest>,
) -> Result<(StatusCode, Json<LoanResponse>), ApiError> {
    let cmd = req.to_command(state.default_loan_days, Utc::now());

    let loan_id = loan::create_loan(&state.service_deps, cmd).await?;

    // 作成された貸出を取得して完全な情報を返す
    let created = loan::get_loan(&state.service_deps, loan_id).await?;

    Ok((StatusCode::CREATED, Json(LoanResponse::from(created))))
}

/// POST /loans/:id/return - 書籍を返却
///
/// 延滞していれば延滞料金を計算し、返却後の貸出を返す。
pub async fn return_loan(
    State(state): State<Arc<AppState>>,
    Path(loan_id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<LoanResponse>, ApiError> {
    let req = ReturnLoanRequest::from_body(&body)?;

    let cmd = ReturnLoan {
        loan_id: LoanId::from_uuid(loan_id),
        returned_at: Utc::now(),
        notes: req.notes,
    };

    let returned = loan::return_loan(&state.service_deps, cmd).await?;

    Ok(Json(LoanResponse::from(returned)))
}

/// POST /overdue/check - 延滞検出を即時実行
pub async fn check_overdue(
    State(state): State<Arc<AppState>>,
) -> Result<Json<OverdueCheckResponse>, ApiError> {
    let notifications_created =
        loan::check_and_notify_overdue(&state.service_deps, Utc::now()).await?;

    Ok(Json(OverdueCheckResponse {
        notifications_created,
    }))
}

// ============================================================================
// Query handlers (GET)
// ============================================================================

/// GET /loans/:id - 貸出詳細をIDで取得
pub async fn get_loan_by_id(
    State(state): State<Arc<AppState>>,
    Path(loan_id): Path<Uuid>,
) -> Result<Json<LoanResponse>, ApiError> {
    let found = loan::get_loan(&state.service_deps, LoanId::from_uuid(loan_id)).await?;
    Ok(Json(LoanResponse::from(found)))
}

/// GET /loans - オプションフィルタ付き貸出一覧取得
///
/// クエリパラメータ:
/// - member_id, book_id: IDでフィルタリング
/// - status: active, returned, overdue
/// - from, to: 貸出日時の範囲（RFC 3339）
pub async fn list_loans(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListLoansQuery>,
) -> Result<Json<Vec<LoanResponse>>, ApiError> {
    let filter = query.to_filter()?;
    let loans = loan::list_loans(&state.service_deps, &filter).await?;

    Ok(Json(loans.into_iter().map(LoanResponse::from).collect()))
}

/// GET /members/:id/loans - 会員の貸出履歴
pub async fn list_member_loans(
    State(state): State<Arc<AppState>>,
    Path(member_id): Path<Uuid>,
) -> Result<Json<Vec<LoanResponse>>, ApiError> {
    let filter = LoanFilter::for_member(MemberId::from_uuid(member_id));
    let loans = loan::list_loans(&state.service_deps, &filter).await?;

    Ok(Json(loans.into_iter().map(LoanResponse::from).collect()))
}

/// GET /stats/loans - 貸出中・延滞中の件数
pub async fn loan_stats(State(state): State<Arc<AppState>>) -> Result<Json<LoanStats>, ApiError> {
    let stats = loan::loan_stats(&state.service_deps, Utc::now()).await?;
    Ok(Json(stats))
}

/// GET /reports/loans - 貸出日の範囲での取引レポート
///
/// クエリパラメータ:
/// - from, to: 貸出日時の範囲（RFC 3339、どちらも省略可）
pub async fn loan_report(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LoanReportQuery>,
) -> Result<Json<LoanReportResponse>, ApiError> {
    let report = loan::loan_report(&state.service_deps, query.from, query.to).await?;
    Ok(Json(LoanReportResponse::new(&query, report)))
}

// ============================================================================
// Member notifications
// ============================================================================

/// GET /members/:id/notifications - 会員の通知一覧と未読件数
pub async fn list_member_notifications(
    State(state): State<Arc<AppState>>,
    Path(member_id): Path<Uuid>,
    Query(query): Query<NotificationListQuery>,
) -> Result<Json<MemberNotificationsResponse>, ApiError> {
    let inbox = loan::list_member_notifications(
        &state.service_deps,
        MemberId::from_uuid(member_id),
        query.limit,
    )
    .await?;

    Ok(Json(MemberNotificationsResponse::from(inbox)))
}

/// PATCH /members/:id/notifications - 会員の通知をすべて既読にする
pub async fn mark_all_notifications_read(
    State(state): State<Arc<AppState>>,
    Path(member_id): Path<Uuid>,
) -> Result<Json<MarkAllReadResponse>, ApiError> {
    let updated =
        loan::mark_all_notifications_read(&state.service_deps, MemberId::from_uuid(member_id))
            .await?;

    Ok(Json(MarkAllReadResponse { updated }))
}

/// POST /members/:id/notifications/:notification_id/read - 通知を既読にする
pub async fn mark_notification_read(
    State(state): State<Arc<AppState>>,
    Path((member_id, notification_id)): Path<(Uuid, i64)>,
) -> Result<StatusCode, ApiError> {
    loan::mark_notification_read(
        &state.service_deps,
        MemberId::from_uuid(member_id),
        NotificationId::new(notification_id),
    )
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /members/:id/notifications/:notification_id - 通知を削除する
pub async fn delete_notification(
    State(state): State<Arc<AppState>>,
    Path((member_id, notification_id)): Path<(Uuid, i64)>,
) -> Result<StatusCode, ApiError> {
    loan::delete_notification(
        &state.service_deps,
        MemberId::from_uuid(member_id),
        NotificationId::new(notification_id),
    )
    .await?;

    Ok(StatusCode::NO_CONTENT)
}
