use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{LoanId, MemberId};

/// 通知の種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// 延滞
    Overdue,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Overdue => "overdue",
        }
    }
}

impl std::str::FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "overdue" => Ok(NotificationKind::Overdue),
            _ => Err(format!("Invalid notification kind: {}", s)),
        }
    }
}

/// 作成する通知
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNotification {
    pub loan_id: LoanId,
    pub member_id: MemberId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// 通知ID - 保存時に採番される連番
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NotificationId(i64);

impl NotificationId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for NotificationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// 保存済みの通知（会員の受信箱の1件）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub notification_id: NotificationId,
    pub loan_id: LoanId,
    pub member_id: MemberId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// 採番されたIDで未読の通知として保存する
    pub fn unread(notification_id: NotificationId, new: &NewNotification) -> Self {
        Self {
            notification_id,
            loan_id: new.loan_id,
            member_id: new.member_id,
            kind: new.kind,
            title: new.title.clone(),
            message: new.message.clone(),
            is_read: false,
            created_at: new.created_at,
        }
    }
}

/// 純粋関数：延滞通知を組み立てる
pub fn overdue_notification(
    loan_id: LoanId,
    member_id: MemberId,
    book_title: &str,
    days_overdue: i64,
    fine: Decimal,
    now: DateTime<Utc>,
) -> NewNotification {
    NewNotification {
        loan_id,
        member_id,
        kind: NotificationKind::Overdue,
        title: "Book Returned Late".to_string(),
        message: format!(
            "Book '{}' is {} day(s) overdue. Fine: Rp {}",
            book_title,
            days_overdue,
            fine.round()
        ),
        created_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overdue_notification_message() {
        let loan_id = LoanId::new();
        let member_id = MemberId::new();
        let now = Utc::now();

        let n = overdue_notification(
            loan_id,
            member_id,
            "Negeri 5 Menara",
            3,
            Decimal::from(3000),
            now,
        );

        assert_eq!(n.kind, NotificationKind::Overdue);
        assert_eq!(n.loan_id, loan_id);
        assert_eq!(n.member_id, member_id);
        assert_eq!(
            n.message,
            "Book 'Negeri 5 Menara' is 3 day(s) overdue. Fine: Rp 3000"
        );
    }

    #[test]
    fn test_stored_notification_starts_unread() {
        let new = overdue_notification(
            LoanId::new(),
            MemberId::new(),
            "Saman",
            1,
            Decimal::from(1000),
            Utc::now(),
        );

        let stored = Notification::unread(NotificationId::new(7), &new);

        assert!(!stored.is_read);
        assert_eq!(stored.notification_id.value(), 7);
        assert_eq!(stored.message, new.message);
        assert_eq!(stored.created_at, new.created_at);
    }

    #[test]
    fn test_notification_kind_round_trip_from_str() {
        let kind: NotificationKind = "overdue".parse().unwrap();
        assert_eq!(kind.as_str(), "overdue");
        assert!("reminder".parse::<NotificationKind>().is_err());
    }
}
