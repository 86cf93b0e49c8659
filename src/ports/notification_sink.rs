use crate::domain::notification::NewNotification;
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 通知作成の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationOutcome {
    /// 新しく作成した
    Created,
    /// 同じ貸出・種別の通知が既にあるため作成しなかった
    AlreadySent,
}

/// 通知シンクポート
///
/// 会員への通知の保存・配信メカニズムを抽象化する。
/// 実装は (loan_id, kind) ごとに通知を1件に限定する。
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// 通知を作成する
    ///
    /// 延滞検出バッチから呼ばれる。
    async fn create(&self, notification: &NewNotification) -> Result<NotificationOutcome>;
}
