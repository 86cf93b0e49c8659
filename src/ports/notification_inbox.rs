use crate::domain::{
    MemberId,
    notification::{Notification, NotificationId},
};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 会員の通知受信箱ポート
///
/// NotificationSink が作成した通知を会員ごとに参照・既読化・削除する。
/// 個別の通知に対する操作は、その通知が指定された会員のものである場合のみ適用する。
#[async_trait]
pub trait NotificationInbox: Send + Sync {
    /// 会員の通知を新しい順に最大 limit 件取得する
    async fn find_by_member(&self, member_id: MemberId, limit: u32) -> Result<Vec<Notification>>;

    /// 通知を既読にする。該当する通知がなければ false
    async fn mark_as_read(
        &self,
        member_id: MemberId,
        notification_id: NotificationId,
    ) -> Result<bool>;

    /// 会員の未読通知をすべて既読にし、更新件数を返す
    async fn mark_all_as_read(&self, member_id: MemberId) -> Result<u64>;

    /// 会員の未読通知の件数
    async fn count_unread(&self, member_id: MemberId) -> Result<i64>;

    /// 通知を削除する。該当する通知がなければ false
    async fn delete(&self, member_id: MemberId, notification_id: NotificationId) -> Result<bool>;
}
