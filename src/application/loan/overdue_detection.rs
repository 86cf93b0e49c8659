use crate::domain::{self, notification};
use crate::ports::*;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::errors::{LoanApplicationError, Result};
use super::loan_service::ServiceDependencies;

/// 書籍が見つからない場合に通知で使うタイトル
const UNKNOWN_TITLE: &str = "(unknown title)";

/// 延滞検出と通知（純粋な関数）
///
/// 返却期限を過ぎたActive状態の貸出を検出し、延滞通知を作成する。
///
/// ビジネスルール：
/// - due_date < now かつ Active の貸出を延滞とみなす
/// - 延滞料金は返却時と同じ計算でプレビューするだけで、貸出の
///   ステータスや延滞料金は変更しない（返却時に確定する）
/// - 通知は (貸出, 種別) ごとに1件。既に通知済みの貸出は数えない
///
/// # 戻り値
/// 新しく作成した通知の件数
///
/// # エラー
/// 延滞候補の取得に失敗した場合のみ。個々の通知作成の失敗は記録して続行する。
pub async fn check_and_notify_overdue(
    deps: &ServiceDependencies,
    now: DateTime<Utc>,
) -> Result<usize> {
    let mut created = 0;

    // 1. 延滞候補を取得
    let candidates = deps
        .loan_repository
        .find_overdue_candidates(now)
        .await
        .map_err(LoanApplicationError::LoanRepositoryError)?;

    // 2. 各候補について通知を作成
    for loan in candidates {
        if !domain::loan::is_overdue(&loan, now) {
            continue;
        }

        let title = match deps.book_store.find_by_id(loan.book_id).await {
            Ok(Some(book)) => book.title,
            Ok(None) => UNKNOWN_TITLE.to_string(),
            Err(e) => {
                tracing::warn!(loan_id = %loan.loan_id, "failed to look up book title: {}", e);
                UNKNOWN_TITLE.to_string()
            }
        };

        let days = domain::fine::days_overdue(loan.due_date, now);
        let fine = domain::fine::compute_fine(loan.due_date, now);
        let notification = notification::overdue_notification(
            loan.loan_id,
            loan.member_id,
            &title,
            days,
            fine,
            now,
        );

        match deps.notification_sink.create(&notification).await {
            Ok(NotificationOutcome::Created) => created += 1,
            Ok(NotificationOutcome::AlreadySent) => {
                tracing::debug!(loan_id = %loan.loan_id, "overdue notification already sent");
            }
            Err(e) => {
                tracing::warn!(loan_id = %loan.loan_id, "failed to create overdue notification: {}", e);
            }
        }
    }

    Ok(created)
}

/// 延滞検出の定期実行
///
/// `period` ごとに check_and_notify_overdue を実行する。リクエスト処理とは
/// 独立したタスクとして起動し、`shutdown` がキャンセルされると終了する。
pub async fn run_overdue_sweeper(
    deps: ServiceDependencies,
    period: Duration,
    shutdown: CancellationToken,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    tracing::info!(period_secs = period.as_secs(), "overdue sweeper started");

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {
                match check_and_notify_overdue(&deps, Utc::now()).await {
                    Ok(0) => tracing::debug!("overdue sweep finished, no new notifications"),
                    Ok(count) => tracing::info!(count, "overdue sweep created notifications"),
                    Err(e) => tracing::error!("overdue sweep failed: {}", e),
                }
            }
        }
    }

    tracing::info!("overdue sweeper stopped");
}
