use crate::domain::{MemberId, member::Member};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 会員参照ポート
///
/// 貸出コンテキストと会員コンテキストの境界を維持する。
/// 貸出コンテキストは会員の有効フラグのみを必要とする。
#[async_trait]
pub trait MemberLookup: Send + Sync {
    /// IDで会員を取得する
    ///
    /// 貸出作成前の会員バリデーション（存在・有効）に使用される。
    async fn find_by_id(&self, member_id: MemberId) -> Result<Option<Member>>;
}
