use crate::domain::{BookId, book::Book};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 貸出可能数の増減結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjustment {
    /// 増減を適用した
    Applied,
    /// 0..=stock の範囲外になるため適用しなかった
    Rejected,
    /// 書籍が存在しない
    BookMissing,
}

/// 書籍貸出可能数ストアポート
///
/// 貸出コンテキストとカタログコンテキストの境界を維持する。
/// 貸出可能数はこのポートの条件付き更新でのみ変更される。
#[async_trait]
pub trait BookAvailabilityStore: Send + Sync {
    /// IDで書籍を取得する
    ///
    /// 貸出前の存在確認と、通知メッセージの書籍タイトルに使用される。
    async fn find_by_id(&self, book_id: BookId) -> Result<Option<Book>>;

    /// 貸出可能数を delta だけ増減する
    ///
    /// 結果が 0 以上かつ在庫数以下の場合のみ適用する。
    /// 同じ書籍への同時呼び出しに対してアトミックでなければならない。
    async fn adjust_availability(&self, book_id: BookId, delta: i32) -> Result<Adjustment>;
}
