use crate::domain::{
    LoanId, MemberId,
    notification::{NewNotification, Notification, NotificationId, NotificationKind},
};
use crate::ports::notification_inbox::{
    NotificationInbox as NotificationInboxTrait, Result as InboxResult,
};
use crate::ports::notification_sink::{
    NotificationOutcome, NotificationSink as NotificationSinkTrait, Result,
};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use std::str::FromStr;

/// Maps a notifications row, rejecting unknown kinds
fn map_row_to_notification(row: &PgRow) -> InboxResult<Notification> {
    let kind_str: &str = row.get("kind");
    let kind = NotificationKind::from_str(kind_str).map_err(|e| {
        Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
            as Box<dyn std::error::Error + Send + Sync>
    })?;

    Ok(Notification {
        notification_id: NotificationId::new(row.get("id")),
        loan_id: LoanId::from_uuid(row.get("loan_id")),
        member_id: MemberId::from_uuid(row.get("member_id")),
        kind,
        title: row.get("title"),
        message: row.get("message"),
        is_read: row.get("is_read"),
        created_at: row.get("created_at"),
    })
}

/// PostgreSQL implementation of NotificationSink and NotificationInbox
///
/// Relies on the (loan_id, kind) unique constraint of the notifications
/// table: a conflicting insert is skipped and reported as already sent.
pub struct NotificationSink {
    pool: PgPool,
}

impl NotificationSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationSinkTrait for NotificationSink {
    async fn create(&self, notification: &NewNotification) -> Result<NotificationOutcome> {
        let result = sqlx::query(
            r#"
            INSERT INTO notifications (loan_id, member_id, kind, title, message, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (loan_id, kind) DO NOTHING
            "#,
        )
        .bind(notification.loan_id.value())
        .bind(notification.member_id.value())
        .bind(notification.kind.as_str())
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.created_at)
        .execute(&self.pool)
        .await?;

        Ok(if result.rows_affected() == 1 {
            NotificationOutcome::Created
        } else {
            NotificationOutcome::AlreadySent
        })
    }
}

#[async_trait]
impl NotificationInboxTrait for NotificationSink {
    async fn find_by_member(
        &self,
        member_id: MemberId,
        limit: u32,
    ) -> InboxResult<Vec<Notification>> {
        let rows = sqlx::query(
            r#"
            SELECT id, loan_id, member_id, kind, title, message, is_read, created_at
            FROM notifications
            WHERE member_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(member_id.value())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_notification).collect()
    }

    async fn mark_as_read(
        &self,
        member_id: MemberId,
        notification_id: NotificationId,
    ) -> InboxResult<bool> {
        let result =
            sqlx::query("UPDATE notifications SET is_read = TRUE WHERE id = $1 AND member_id = $2")
                .bind(notification_id.value())
                .bind(member_id.value())
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn mark_all_as_read(&self, member_id: MemberId) -> InboxResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE member_id = $1 AND is_read = FALSE",
        )
        .bind(member_id.value())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn count_unread(&self, member_id: MemberId) -> InboxResult<i64> {
        let count = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE member_id = $1 AND is_read = FALSE",
        )
        .bind(member_id.value())
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn delete(
        &self,
        member_id: MemberId,
        notification_id: NotificationId,
    ) -> InboxResult<bool> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND member_id = $2")
            .bind(notification_id.value())
            .bind(member_id.value())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }
}
