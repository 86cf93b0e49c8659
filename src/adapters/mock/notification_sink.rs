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
use std::collections::HashSet;
use std::sync::Mutex;

#[derive(Default)]
struct Inbox {
    sent: HashSet<(LoanId, NotificationKind)>,
    notifications: Vec<Notification>,
    last_id: i64,
}

impl Inbox {
    fn owned_by(
        &mut self,
        member_id: MemberId,
        notification_id: NotificationId,
    ) -> Option<&mut Notification> {
        self.notifications
            .iter_mut()
            .find(|n| n.notification_id == notification_id && n.member_id == member_id)
    }
}

/// Mock implementation of NotificationSink and NotificationInbox
///
/// Keeps notifications in memory. A second notification for the same
/// (loan, kind) pair is dropped, mirroring the unique constraint of the
/// notifications table, until the earlier one is deleted. Ids are
/// assigned sequentially from 1.
pub struct NotificationSink {
    inbox: Mutex<Inbox>,
}

impl NotificationSink {
    pub fn new() -> Self {
        Self {
            inbox: Mutex::new(Inbox::default()),
        }
    }

    /// All notifications created so far, oldest first
    pub fn notifications(&self) -> Vec<Notification> {
        self.inbox.lock().unwrap().notifications.clone()
    }
}

impl Default for NotificationSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationSinkTrait for NotificationSink {
    async fn create(&self, notification: &NewNotification) -> Result<NotificationOutcome> {
        let mut inbox = self.inbox.lock().unwrap();

        if !inbox.sent.insert((notification.loan_id, notification.kind)) {
            return Ok(NotificationOutcome::AlreadySent);
        }

        inbox.last_id += 1;
        let id = NotificationId::new(inbox.last_id);
        inbox
            .notifications
            .push(Notification::unread(id, notification));
        Ok(NotificationOutcome::Created)
    }
}

#[async_trait]
impl NotificationInboxTrait for NotificationSink {
    async fn find_by_member(
        &self,
        member_id: MemberId,
        limit: u32,
    ) -> InboxResult<Vec<Notification>> {
        let inbox = self.inbox.lock().unwrap();
        let mut found: Vec<Notification> = inbox
            .notifications
            .iter()
            .filter(|n| n.member_id == member_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.notification_id.cmp(&a.notification_id))
        });
        found.truncate(limit as usize);
        Ok(found)
    }

    async fn mark_as_read(
        &self,
        member_id: MemberId,
        notification_id: NotificationId,
    ) -> InboxResult<bool> {
        let mut inbox = self.inbox.lock().unwrap();
        Ok(match inbox.owned_by(member_id, notification_id) {
            Some(notification) => {
                notification.is_read = true;
                true
            }
            None => false,
        })
    }

    async fn mark_all_as_read(&self, member_id: MemberId) -> InboxResult<u64> {
        let mut inbox = self.inbox.lock().unwrap();
        let mut updated = 0;
        for notification in inbox
            .notifications
            .iter_mut()
            .filter(|n| n.member_id == member_id && !n.is_read)
        {
            notification.is_read = true;
            updated += 1;
        }
        Ok(updated)
    }

    async fn count_unread(&self, member_id: MemberId) -> InboxResult<i64> {
        let inbox = self.inbox.lock().unwrap();
        Ok(inbox
            .notifications
            .iter()
            .filter(|n| n.member_id == member_id && !n.is_read)
            .count() as i64)
    }

    async fn delete(
        &self,
        member_id: MemberId,
        notification_id: NotificationId,
    ) -> InboxResult<bool> {
        let mut inbox = self.inbox.lock().unwrap();
        let Some(position) = inbox
            .notifications
            .iter()
            .position(|n| n.notification_id == notification_id && n.member_id == member_id)
        else {
            return Ok(false);
        };

        // Like the table, a deleted notification no longer blocks a new one
        let removed = inbox.notifications.remove(position);
        inbox.sent.remove(&(removed.loan_id, removed.kind));
        Ok(true)
    }
}
