use crate::domain::{
    MemberId,
    notification::{Notification, NotificationId},
};
use crate::ports::*;

use super::errors::{LoanApplicationError, Result};
use super::loan_service::ServiceDependencies;

/// 一覧の既定件数
pub const DEFAULT_NOTIFICATION_LIMIT: u32 = 20;

/// 一覧の最大件数
const MAX_NOTIFICATION_LIMIT: u32 = 100;

/// 会員の通知一覧と未読件数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberNotifications {
    pub unread: i64,
    pub notifications: Vec<Notification>,
}

/// 会員の通知を新しい順に取得する
///
/// limit が省略または0の場合は20件。100件を超える指定は100件に切り詰める。
pub async fn list_member_notifications(
    deps: &ServiceDependencies,
    member_id: MemberId,
    limit: Option<u32>,
) -> Result<MemberNotifications> {
    let limit = match limit {
        None | Some(0) => DEFAULT_NOTIFICATION_LIMIT,
        Some(limit) => limit.min(MAX_NOTIFICATION_LIMIT),
    };

    let inbox = &deps.notification_inbox;
    let (notifications, unread) = futures::try_join!(
        inbox.find_by_member(member_id, limit),
        inbox.count_unread(member_id),
    )
    .map_err(LoanApplicationError::NotificationError)?;

    Ok(MemberNotifications {
        unread,
        notifications,
    })
}

/// 通知を既読にする
pub async fn mark_notification_read(
    deps: &ServiceDependencies,
    member_id: MemberId,
    notification_id: NotificationId,
) -> Result<()> {
    let updated = deps
        .notification_inbox
        .mark_as_read(member_id, notification_id)
        .await
        .map_err(LoanApplicationError::NotificationError)?;

    if !updated {
        return Err(LoanApplicationError::NotificationNotFound);
    }
    Ok(())
}

/// 会員の通知をすべて既読にし、既読にした件数を返す
pub async fn mark_all_notifications_read(
    deps: &ServiceDependencies,
    member_id: MemberId,
) -> Result<u64> {
    deps.notification_inbox
        .mark_all_as_read(member_id)
        .await
        .map_err(LoanApplicationError::NotificationError)
}

/// 通知を削除する
///
/// 延滞中の貸出の通知を削除した場合、次回の延滞検出で再び作成される。
pub async fn delete_notification(
    deps: &ServiceDependencies,
    member_id: MemberId,
    notification_id: NotificationId,
) -> Result<()> {
    let deleted = deps
        .notification_inbox
        .delete(member_id, notification_id)
        .await
        .map_err(LoanApplicationError::NotificationError)?;

    if !deleted {
        return Err(LoanApplicationError::NotificationNotFound);
    }

    tracing::debug!(%member_id, %notification_id, "notification deleted");
    Ok(())
}
