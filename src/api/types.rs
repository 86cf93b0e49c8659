use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::loan::{LoanApplicationError, LoanReport, MemberNotifications};
use crate::domain::{
    BookId, LoanDays, MemberId, StaffId, commands::CreateLoan, loan::Loan, loan::LoanStatus,
    notification::Notification,
};
use crate::ports::LoanFilter;

/// 貸出作成リクエスト（POST /loans）
#[derive(Debug, Deserialize)]
pub struct CreateLoanRequest {
    pub member_id: Uuid,
    pub book_id: Uuid,
    /// 貸出日数。省略または0以下の場合は既定値
    pub loan_days: Option<i64>,
    pub staff_id: Option<Uuid>,
    #[serde(default)]
    pub notes: String,
}

impl CreateLoanRequest {
    /// リクエストを貸出コマンドに変換する
    pub fn to_command(&self, default_days: LoanDays, borrowed_at: DateTime<Utc>) -> CreateLoan {
        let loan_days = match self.loan_days {
            Some(days) if days > 0 => LoanDays::from_requested(days),
            _ => default_days,
        };

        CreateLoan {
            member_id: MemberId::from_uuid(self.member_id),
            book_id: BookId::from_uuid(self.book_id),
            loan_days,
            recorded_by: self.staff_id.map(StaffId::from_uuid),
            notes: self.notes.clone(),
            borrowed_at,
        }
    }
}

/// 返却リクエスト（POST /loans/:id/return、ボディは省略可）
#[derive(Debug, Default, Deserialize)]
pub struct ReturnLoanRequest {
    pub notes: Option<String>,
}

impl ReturnLoanRequest {
    /// リクエストボディをパースする
    ///
    /// 空のボディはメモなしの返却として扱う。不正なJSONは Validation。
    pub fn from_body(body: &[u8]) -> Result<Self, LoanApplicationError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        serde_json::from_slice(body)
            .map_err(|e| LoanApplicationError::Validation(format!("invalid request body: {}", e)))
    }
}

/// 貸出一覧取得のクエリパラメータ
#[derive(Debug, Default, Deserialize)]
pub struct ListLoansQuery {
    pub member_id: Option<Uuid>,
    pub book_id: Option<Uuid>,
    /// active, returned, overdue
    pub status: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl ListLoansQuery {
    pub fn to_filter(&self) -> Result<LoanFilter, LoanApplicationError> {
        let status = self
            .status
            .as_deref()
            .map(parse_status_filter)
            .transpose()
            .map_err(LoanApplicationError::Validation)?;

        Ok(LoanFilter {
            member_id: self.member_id.map(MemberId::from_uuid),
            book_id: self.book_id.map(BookId::from_uuid),
            status,
            borrowed_from: self.from,
            borrowed_to: self.to,
        })
    }
}

/// 貸出レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct LoanResponse {
    pub loan_id: Uuid,
    pub member_id: Uuid,
    pub book_id: Uuid,
    pub staff_id: Option<Uuid>,
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: String,
    pub fine: Decimal,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl From<Loan> for LoanResponse {
    fn from(loan: Loan) -> Self {
        Self {
            loan_id: loan.loan_id.value(),
            member_id: loan.member_id.value(),
            book_id: loan.book_id.value(),
            staff_id: loan.recorded_by.map(|id| id.value()),
            borrow_date: loan.borrowed_at,
            due_date: loan.due_date,
            return_date: loan.returned_at,
            status: loan.status.as_str().to_string(),
            fine: loan.fine,
            notes: loan.notes,
            created_at: loan.created_at,
        }
    }
}

/// 取引レポートのクエリパラメータ（貸出日時の範囲、RFC 3339）
#[derive(Debug, Default, Deserialize)]
pub struct LoanReportQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// 取引レポートレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct LoanReportResponse {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub total: usize,
    pub active: usize,
    pub returned: usize,
    pub overdue: usize,
    pub total_fine: Decimal,
    pub loans: Vec<LoanResponse>,
}

impl LoanReportResponse {
    pub fn new(query: &LoanReportQuery, report: LoanReport) -> Self {
        Self {
            from: query.from,
            to: query.to,
            total: report.total,
            active: report.active,
            returned: report.returned,
            overdue: report.overdue,
            total_fine: report.total_fine,
            loans: report.loans.into_iter().map(LoanResponse::from).collect(),
        }
    }
}

/// 通知一覧のクエリパラメータ
#[derive(Debug, Default, Deserialize)]
pub struct NotificationListQuery {
    /// 省略時は20件
    pub limit: Option<u32>,
}

/// 通知レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct NotificationResponse {
    pub notification_id: i64,
    pub loan_id: Uuid,
    pub member_id: Uuid,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationResponse {
    fn from(notification: Notification) -> Self {
        Self {
            notification_id: notification.notification_id.value(),
            loan_id: notification.loan_id.value(),
            member_id: notification.member_id.value(),
            kind: notification.kind.as_str().to_string(),
            title: notification.title,
            message: notification.message,
            is_read: notification.is_read,
            created_at: notification.created_at,
        }
    }
}

/// 会員の通知一覧レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct MemberNotificationsResponse {
    pub unread: i64,
    pub notifications: Vec<NotificationResponse>,
}

impl From<MemberNotifications> for MemberNotificationsResponse {
    fn from(inbox: MemberNotifications) -> Self {
        Self {
            unread: inbox.unread,
            notifications: inbox
                .notifications
                .into_iter()
                .map(NotificationResponse::from)
                .collect(),
        }
    }
}

/// 一括既読のレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct MarkAllReadResponse {
    pub updated: u64,
}

/// 延滞検出の結果レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct OverdueCheckResponse {
    pub notifications_created: usize,
}

/// エラーレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

/// ステータスクエリパラメータのパースとバリデーション
pub fn parse_status_filter(status: &str) -> Result<LoanStatus, String> {
    status.parse::<LoanStatus>()
}
